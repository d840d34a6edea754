use pretty_assertions::assert_eq;

use crate::fixture::{definition, monorepo, Fixture, REPOSITORIES};

const APP: &str = "packages/site/src/app.scss";
const VARS: &str = "packages/site/src/styles/_vars.scss";

fn at(file: &str, line: usize) -> Option<(String, usize)> {
    Some((file.to_string(), line))
}

#[test]
fn test_namespaced_variable_through_alias() {
    let fixture = monorepo();
    let ws = fixture.workspace(REPOSITORIES);
    assert_eq!(definition(&fixture, &ws, APP, 5, 13), at(VARS, 1));
}

#[test]
fn test_longest_alias_prefix_wins() {
    let fixture = monorepo();
    let ws = fixture.workspace(REPOSITORIES);
    assert_eq!(
        definition(&fixture, &ws, APP, 7, 19),
        at("packages/site/src/components/_button.scss", 0)
    );
}

#[test]
fn test_forward_chains_are_followed() {
    let fixture = monorepo();
    let ws = fixture.workspace(REPOSITORIES);
    // theme -> _index -> _theme
    assert_eq!(
        definition(&fixture, &ws, APP, 6, 16),
        at("packages/site/src/styles/_theme.scss", 1)
    );
    // theme -> _index -> _vars
    assert_eq!(definition(&fixture, &ws, APP, 10, 14), at(VARS, 1));
}

#[test]
fn test_namespaced_mixin() {
    let fixture = monorepo();
    let ws = fixture.workspace(REPOSITORIES);
    assert_eq!(definition(&fixture, &ws, APP, 8, 14), at(VARS, 3));
}

#[test]
fn test_builtin_module_has_no_definition() {
    let fixture = monorepo();
    let ws = fixture.workspace(REPOSITORIES);
    assert_eq!(definition(&fixture, &ws, APP, 9, 14), None);
    assert_eq!(definition(&fixture, &ws, APP, 0, 8), None);
}

#[test]
fn test_import_path_jumps_to_file() {
    let fixture = monorepo();
    let ws = fixture.workspace(REPOSITORIES);
    assert_eq!(definition(&fixture, &ws, APP, 1, 8), at(VARS, 0));
    assert_eq!(
        definition(&fixture, &ws, APP, 2, 8),
        at("packages/site/src/styles/_index.scss", 0)
    );
}

#[test]
fn test_private_members_are_invisible_to_importers() {
    let fixture = Fixture::new(&[
        ("lib.scss", "$_hidden: 1;\n$-also-hidden: 2;\n.x { a: $_hidden; }\n"),
        ("app.scss", "@use \"lib\";\n.a { b: lib.$_hidden; c: lib.$-also-hidden; }\n"),
    ]);
    let ws = fixture.workspace(&[]);

    assert_eq!(definition(&fixture, &ws, "app.scss", 1, 14), None);
    assert_eq!(definition(&fixture, &ws, "app.scss", 1, 31), None);
    // Still visible inside the declaring file
    assert_eq!(definition(&fixture, &ws, "lib.scss", 2, 10), at("lib.scss", 0));
}

#[test]
fn test_first_declaration_wins() {
    let fixture = Fixture::new(&[
        ("vars.scss", "$gap: 1px;\n@if true {\n  $gap: 2px;\n}\n"),
        ("main.scss", "@use \"vars\" as v;\n.a { margin: v.$gap; }\n"),
    ]);
    let ws = fixture.workspace(&[]);
    assert_eq!(definition(&fixture, &ws, "main.scss", 1, 17), at("vars.scss", 0));
}

#[test]
fn test_unscoped_use_and_import() {
    let fixture = Fixture::new(&[
        ("_mixins.scss", "@mixin center {}\n"),
        ("_legacy.scss", "@function legacy-rem($px) { @return $px; }\n"),
        (
            "main.scss",
            "@use \"mixins\" as *;\n@import \"legacy\";\n.a {\n  @include center;\n  width: legacy-rem(4px);\n}\n",
        ),
    ]);
    let ws = fixture.workspace(&[]);
    assert_eq!(definition(&fixture, &ws, "main.scss", 3, 13), at("_mixins.scss", 0));
    assert_eq!(definition(&fixture, &ws, "main.scss", 4, 12), at("_legacy.scss", 0));
}

#[test]
fn test_index_file_convention() {
    let fixture = Fixture::new(&[
        ("tokens/_index.scss", "@forward \"colors\";\n"),
        ("tokens/_colors.scss", "$ink: #111;\n"),
        ("main.scss", "@use \"./tokens\";\n.a { color: tokens.$ink; }\n"),
    ]);
    let ws = fixture.workspace(&[]);
    assert_eq!(
        definition(&fixture, &ws, "main.scss", 1, 20),
        at("tokens/_colors.scss", 0)
    );
}
