use pretty_assertions::assert_eq;
use scss_nav_mcp::indexer::Position;

use crate::fixture::{definition, monorepo, Fixture, REPOSITORIES};

#[test]
fn test_repeated_lookups_hit_the_cache() {
    let fixture = monorepo();
    let ws = fixture.workspace(REPOSITORIES);
    let app = "packages/site/src/app.scss";

    definition(&fixture, &ws, app, 5, 13);
    let first = ws.cache_stats();
    definition(&fixture, &ws, app, 5, 13);
    let second = ws.cache_stats();

    assert_eq!(second.misses, first.misses);
    assert!(second.hits > first.hits);
}

#[test]
fn test_disk_edit_needs_invalidation() {
    let fixture = Fixture::new(&[
        ("vars.scss", "$gap: 1px;\n"),
        ("main.scss", "@use \"vars\" as v;\n.a { margin: v.$gap; }\n"),
    ]);
    let ws = fixture.workspace(&[]);
    let expected = |line| Some(("vars.scss".to_string(), line));

    assert_eq!(definition(&fixture, &ws, "main.scss", 1, 17), expected(0));

    fixture.write("vars.scss", "$other: 0;\n$gap: 1px;\n");
    assert_eq!(definition(&fixture, &ws, "main.scss", 1, 17), expected(0));

    ws.did_save(&fixture.path("vars.scss"));
    assert_eq!(definition(&fixture, &ws, "main.scss", 1, 17), expected(1));
}

#[test]
fn test_invalidate_file_keeps_other_files() {
    let fixture = Fixture::new(&[
        ("a.scss", "$a: 1;\n"),
        ("b.scss", "$b: 1;\n"),
        ("main.scss", "@use \"a\";\n@use \"b\";\n.x { p: a.$a; q: b.$b; }\n"),
    ]);
    let ws = fixture.workspace(&[]);
    definition(&fixture, &ws, "main.scss", 2, 11);
    definition(&fixture, &ws, "main.scss", 2, 20);
    // Completion walks the exports of both modules, caching their edges
    ws.completion(&fixture.path("main.scss"), Position::new(2, 10));

    let before = ws.cache_stats().repositories[0].clone();
    ws.invalidate_file(&fixture.path("a.scss"));
    let after = ws.cache_stats().repositories[0].clone();

    assert_eq!(after.symbols, before.symbols - 1);
    assert_eq!(after.imports, before.imports - 1);
    assert_eq!(after.forwards, before.forwards - 1);
    assert_eq!(after.definitions, 0);
}

#[test]
fn test_invalidate_repository_is_isolated() {
    let fixture = monorepo();
    let ws = fixture.workspace(REPOSITORIES);

    definition(&fixture, &ws, "packages/site/src/app.scss", 5, 13);
    definition(&fixture, &ws, "packages/admin/main.scss", 1, 16);

    assert!(ws.invalidate_repository(&fixture.path("packages/site")));

    let stats = ws.cache_stats();
    let total_for = |repo: &str| {
        stats
            .repositories
            .iter()
            .filter(|p| p.root == fixture.path(repo))
            .map(|p| p.total())
            .sum::<usize>()
    };
    assert_eq!(total_for("packages/site"), 0);
    assert!(total_for("packages/admin") > 0);
}

#[test]
fn test_reconfigure_clears_everything() {
    let fixture = monorepo();
    let ws = fixture.workspace(&["packages/site"]);
    definition(&fixture, &ws, "packages/site/src/app.scss", 5, 13);
    assert!(ws.cache_stats().repositories.iter().any(|p| p.total() > 0));

    ws.reconfigure(Vec::new());
    assert!(ws.cache_stats().repositories.iter().all(|p| p.total() == 0));
    assert_eq!(ws.repositories().len(), 1);
    assert_eq!(ws.repositories()[0].root, fixture.root());
}
