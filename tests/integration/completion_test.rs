use pretty_assertions::assert_eq;

use scss_nav_mcp::indexer::{Position, SymbolKind};

use crate::fixture::{monorepo, Fixture, REPOSITORIES};

const APP: &str = "packages/site/src/app.scss";

fn labels(fixture: &Fixture, ws: &scss_nav_mcp::workspace::Workspace, file: &str, line: usize, column: usize) -> Vec<String> {
    ws.completion(&fixture.path(file), Position::new(line, column))
        .into_iter()
        .map(|item| item.label)
        .collect()
}

#[test]
fn test_namespaced_variables_exclude_privates() {
    let fixture = monorepo();
    let ws = fixture.workspace(REPOSITORIES);
    // "  margin: v.$"
    assert_eq!(labels(&fixture, &ws, APP, 5, 13), vec!["$gap"]);
}

#[test]
fn test_forwarded_members_join_the_namespace() {
    let fixture = monorepo();
    let ws = fixture.workspace(REPOSITORIES);
    // "  color: theme.$"
    assert_eq!(labels(&fixture, &ws, APP, 6, 16), vec!["$gap", "$brand"]);
}

#[test]
fn test_namespaced_mixins() {
    let fixture = monorepo();
    let ws = fixture.workspace(REPOSITORIES);
    let items = ws.completion(&fixture.path(APP), Position::new(8, 13));
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].label, "respond");
    assert_eq!(items[0].kind, SymbolKind::Mixin);
    assert_eq!(items[0].detail, "($bp)");
}

#[test]
fn test_namespaced_functions_with_prefix() {
    let fixture = monorepo();
    let ws = fixture.workspace(REPOSITORIES);
    ws.did_change(
        &fixture.path(APP),
        "@use \"@/vars\" as v;\n.a { width: v.r }\n",
    );
    let items = ws.completion(&fixture.path(APP), Position::new(1, 15));
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].label, "rem");
    assert_eq!(items[0].kind, SymbolKind::Function);
}

#[test]
fn test_variable_items_carry_docs_and_insert_text() {
    let fixture = monorepo();
    let ws = fixture.workspace(REPOSITORIES);
    let items = ws.completion(&fixture.path(APP), Position::new(5, 13));
    assert_eq!(items[0].insert_text, "gap");
    assert_eq!(items[0].detail, "8px");
    assert_eq!(items[0].documentation.as_deref(), Some("Base gap"));
    assert_eq!(
        items[0].source_file,
        fixture.path("packages/site/src/styles/_vars.scss")
    );
}

#[test]
fn test_unscoped_completion_from_glob_use() {
    let fixture = Fixture::new(&[
        ("_a.scss", "$size: 1;\n$space: 2;\n"),
        ("_b.scss", "$size: 3;\n"),
        ("main.scss", "@use \"a\" as *;\n@use \"b\" as *;\n$shade: 0;\n.x { width: $s }\n"),
    ]);
    let ws = fixture.workspace(&[]);
    let items = ws.completion(&fixture.path("main.scss"), Position::new(3, 14));
    let labels: Vec<&str> = items.iter().map(|i| i.label.as_str()).collect();
    assert_eq!(labels, vec!["$shade", "$size", "$space"]);
    assert_eq!(items[1].source_file, fixture.path("_a.scss"));
}

#[test]
fn test_no_context_no_items() {
    let fixture = monorepo();
    let ws = fixture.workspace(REPOSITORIES);
    // ".card {"
    assert!(labels(&fixture, &ws, APP, 4, 7).is_empty());
}
