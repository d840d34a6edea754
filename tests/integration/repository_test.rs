use pretty_assertions::assert_eq;

use crate::fixture::{definition, monorepo, Fixture, REPOSITORIES};

#[test]
fn test_same_alias_resolves_per_repository() {
    let fixture = monorepo();
    let ws = fixture.workspace(REPOSITORIES);

    assert_eq!(
        definition(&fixture, &ws, "packages/admin/main.scss", 1, 16),
        Some(("packages/admin/theme/_vars.scss".to_string(), 0))
    );
    assert_eq!(
        definition(&fixture, &ws, "packages/site/src/app.scss", 5, 13),
        Some(("packages/site/src/styles/_vars.scss".to_string(), 1))
    );
}

#[test]
fn test_nested_root_is_more_specific() {
    let fixture = monorepo();
    let ws = fixture.workspace(&[".", "packages/site"]);

    let ctx = ws.context_for(&fixture.path("packages/site/src/app.scss"));
    assert_eq!(ctx.root, fixture.path("packages/site"));
    assert_eq!(ctx.aliases.len(), 2);

    let ctx = ws.context_for(&fixture.path("packages/admin/main.scss"));
    assert_eq!(ctx.root, fixture.root());
    assert!(ctx.aliases.is_empty());
}

#[test]
fn test_config_references_and_extends() {
    let fixture = Fixture::new(&[
        (
            "tsconfig.base.json",
            r#"{ "compilerOptions": { "paths": { "@theme/*": ["base-theme/*"], "@ui/*": ["ui/*"] } } }"#,
        ),
        (
            "tsconfig.json",
            r#"{
  "extends": "./tsconfig.base",
  "compilerOptions": { "paths": { "@theme/*": ["theme/*"] } },
  "references": [{ "path": "./tsconfig.extra.json" }]
}"#,
        ),
        (
            "tsconfig.extra.json",
            r#"{ "compilerOptions": { "paths": { "@ui/*": ["shared-ui/*"] }, }, "references": [{ "path": "." }] }"#,
        ),
        ("theme/_colors.scss", "$ink: #000;\n"),
        ("shared-ui/_box.scss", "@mixin box {}\n"),
        (
            "main.scss",
            "@use \"@theme/colors\";\n@use \"@ui/box\";\n.a { color: colors.$ink; @include box.box; }\n",
        ),
    ]);
    let ws = fixture.workspace(&[]);

    let ctx = ws.context_for(&fixture.path("main.scss"));
    assert_eq!(ctx.config_sources.len(), 3);

    assert_eq!(
        definition(&fixture, &ws, "main.scss", 2, 20),
        Some(("theme/_colors.scss".to_string(), 0))
    );
    assert_eq!(
        definition(&fixture, &ws, "main.scss", 2, 38),
        Some(("shared-ui/_box.scss".to_string(), 0))
    );
}

#[test]
fn test_explicit_config_file_from_settings() {
    let fixture = Fixture::new(&[
        ("app/tsconfig.app.json", r#"{ "compilerOptions": { "paths": { "~/*": ["styles/*"] } } }"#),
        ("app/styles/_grid.scss", "$columns: 12;\n"),
        ("app/main.scss", "@use \"~/grid\";\n.a { n: grid.$columns; }\n"),
        (
            "settings.json",
            r#"{
  // one explicit entry
  "repositories": [{ "root": "app", "tsconfig": "app/tsconfig.app.json" }],
}"#,
        ),
    ]);
    let settings =
        scss_nav_mcp::config::settings::Settings::load(&fixture.path("settings.json")).unwrap();
    let ws = scss_nav_mcp::workspace::Workspace::open(fixture.root(), settings.repositories);

    assert_eq!(
        definition(&fixture, &ws, "app/main.scss", 1, 16),
        Some(("app/styles/_grid.scss".to_string(), 0))
    );
}
