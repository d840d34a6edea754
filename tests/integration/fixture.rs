use std::path::{Path, PathBuf};

use scss_nav_mcp::config::repository::RepositoryEntry;
use scss_nav_mcp::indexer::{Location, Position};
use scss_nav_mcp::workspace::Workspace;
use tempfile::TempDir;

/// A workspace written to a temporary directory.
pub struct Fixture {
    _dir: TempDir,
    root: PathBuf,
}

impl Fixture {
    pub fn new(files: &[(&str, &str)]) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let root = dir.path().canonicalize().expect("Failed to canonicalize temp dir");
        let fixture = Self { _dir: dir, root };
        for (path, text) in files {
            fixture.write(path, text);
        }
        fixture
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    pub fn write(&self, relative: &str, text: &str) {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create fixture dir");
        }
        std::fs::write(&path, text).expect("Failed to write fixture file");
    }

    pub fn remove(&self, relative: &str) {
        std::fs::remove_file(self.path(relative)).expect("Failed to remove fixture file");
    }

    pub fn workspace(&self, repositories: &[&str]) -> Workspace {
        let entries = repositories
            .iter()
            .map(|r| RepositoryEntry::Directory(PathBuf::from(r)))
            .collect();
        Workspace::open(&self.root, entries)
    }
}

pub const SITE_APP: &str = r#"@use "sass:math";
@use "@/vars" as v;
@use "@/index" as theme;
@use "@/components/button";
.card {
  margin: v.$gap;
  color: theme.$brand;
  padding: button.$button-pad;
  @include v.respond(md);
  width: math.div(10px, 2);
  gap: theme.$gap;
}
"#;

/// Two repositories that both alias `@/*`, to different directories.
pub fn monorepo() -> Fixture {
    Fixture::new(&[
        (
            "packages/site/tsconfig.json",
            r#"{
  // Style aliases
  "compilerOptions": {
    "baseUrl": ".",
    "paths": {
      "@/*": ["src/styles/*"],
      "@/components/*": ["src/components/*"],
    },
  },
  "references": [{ "path": "." }],
}"#,
        ),
        (
            "packages/site/src/styles/_vars.scss",
            "// Base gap\n$gap: 8px;\n$_secret: 1;\n@mixin respond($bp) {}\n@function rem($px) { @return $px / 16 * 1rem; }\n",
        ),
        (
            "packages/site/src/styles/_index.scss",
            "@forward \"vars\";\n@forward \"theme\";\n",
        ),
        (
            "packages/site/src/styles/_theme.scss",
            "@forward \"index\";\n$brand: #f00;\n",
        ),
        ("packages/site/src/components/_button.scss", "$button-pad: 4px;\n"),
        ("packages/site/src/app.scss", SITE_APP),
        (
            "packages/admin/tsconfig.json",
            r#"{ "compilerOptions": { "paths": { "@/*": ["theme/*"] } } }"#,
        ),
        ("packages/admin/theme/_vars.scss", "$gap: 24px;\n"),
        ("packages/admin/main.scss", "@use \"@/vars\" as v;\n.x { margin: v.$gap; }\n"),
    ])
}

pub const REPOSITORIES: &[&str] = &["packages/site", "packages/admin"];

/// File (relative to the fixture root) and line of a definition.
pub fn definition(
    fixture: &Fixture,
    workspace: &Workspace,
    file: &str,
    line: usize,
    column: usize,
) -> Option<(String, usize)> {
    workspace
        .definition(&fixture.path(file), Position::new(line, column))
        .map(|Location { file, line, .. }| {
            let relative = file
                .strip_prefix(fixture.root())
                .unwrap_or(&file)
                .to_string_lossy()
                .replace('\\', "/");
            (relative, line)
        })
}
