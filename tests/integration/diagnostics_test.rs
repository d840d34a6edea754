use pretty_assertions::assert_eq;

use scss_nav_mcp::tools::diagnostics::Severity;

use crate::fixture::{monorepo, REPOSITORIES};

#[test]
fn test_clean_monorepo_has_no_problems() {
    let fixture = monorepo();
    let ws = fixture.workspace(REPOSITORIES);
    // `sass:math` is a built-in, not an unresolved import
    assert_eq!(ws.check_repositories(), Vec::new());
}

#[test]
fn test_problems_are_reported_per_file() {
    let fixture = monorepo();
    fixture.write(
        "packages/admin/broken.scss",
        "@use \"@/missing\" as m;\n@use \"@/vars\" as v;\n.a { x: v.$nope; y: z.$gap; w: m.$q; }\n",
    );
    let ws = fixture.workspace(REPOSITORIES);

    let diagnostics = ws.diagnostics(&fixture.path("packages/admin/broken.scss"));
    let summary: Vec<(usize, Severity, &str)> = diagnostics
        .iter()
        .map(|d| (d.line, d.severity, d.message.as_str()))
        .collect();
    assert_eq!(
        summary,
        vec![
            (0, Severity::Error, "Cannot resolve @use \"@/missing\""),
            (2, Severity::Warning, "Cannot find variable `$nope` in namespace `v`"),
            (2, Severity::Error, "Unknown namespace `z`"),
        ]
    );

    let all = ws.check_repositories();
    assert_eq!(all.len(), 3);
    assert!(all
        .iter()
        .all(|d| d.file == fixture.path("packages/admin/broken.scss")));
}

#[test]
fn test_open_buffer_is_checked_instead_of_disk() {
    let fixture = monorepo();
    let ws = fixture.workspace(REPOSITORIES);
    let app = fixture.path("packages/site/src/app.scss");

    ws.did_change(&app, "@use \"@/nowhere\";\n");
    assert_eq!(ws.diagnostics(&app).len(), 1);

    ws.did_close(&app);
    assert!(ws.diagnostics(&app).is_empty());
}
