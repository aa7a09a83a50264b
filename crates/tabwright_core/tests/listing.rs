use std::collections::BTreeSet;

use pretty_assertions::assert_eq;
use tabwright_core::{
    extract_kept_urls, group_by_window, parse_listing, render_checkpoint, render_export,
    render_fast_listing, tabs_to_close, FetchResult, RunReport, TabRef,
};

fn tabs() -> Vec<TabRef> {
    vec![
        TabRef::new("Rust [book]", "https://doc.rust-lang.org/book/", 1, 1),
        TabRef::new(
            "Rust (programming language)",
            "https://en.wikipedia.org/wiki/Rust_(programming_language)",
            1,
            2,
        ),
        TabRef::new("New Tab", "chrome://newtab/", 2, 1),
    ]
}

#[test]
fn fast_listing_groups_by_window() {
    let doc = render_fast_listing(&tabs(), "2025-01-01 10:00");

    assert!(doc.starts_with("# Tabs Fast Dump - 2025-01-01 10:00\n"));
    assert!(doc.contains("**3 tabs across 2 windows**"));
    assert!(doc.contains("## Window 1 (2 tabs)"));
    assert!(doc.contains("## Window 2 (1 tab)"));
    assert!(doc.contains("- [Rust \\[book\\]](https://doc.rust-lang.org/book/) (doc.rust-lang.org)\n"));
    assert!(doc.contains("- [New Tab](chrome://newtab/) (newtab)\n"));
}

#[test]
fn fast_listing_parses_back() {
    let doc = render_fast_listing(&tabs(), "now");
    let windows = parse_listing(&doc);

    assert_eq!(windows.len(), 2);
    assert_eq!(windows[0].window_index, 1);
    assert_eq!(windows[0].declared_tab_count, 2);
    assert_eq!(windows[0].tabs[0].title, "Rust [book]");
    assert_eq!(
        windows[0].tabs[1].url,
        "https://en.wikipedia.org/wiki/Rust_(programming_language)"
    );
    assert_eq!(windows[0].tabs[1].domain, "en.wikipedia.org");
    assert_eq!(windows[1].tabs[0].url, "chrome://newtab/");
}

#[test]
fn export_annotates_summaries_and_skips() {
    let all = tabs();
    let results = vec![
        FetchResult::fetched(all[0].clone(), "words".into(), 300, 100)
            .with_summary("The **Rust** book.\nSecond line."),
        FetchResult::fetched(all[1].clone(), "words".into(), 150, 100),
        FetchResult::skipped(all[2].clone(), "Domain skipped", 0),
    ];
    let report = RunReport::from_results(&results);
    let doc = render_export(&group_by_window(results), &report, "now");

    assert!(doc.contains("**3 tabs across 2 windows**"));
    assert!(doc.contains("- Content read: 2 tabs"));
    assert!(doc.contains("- Skipped: 1 tabs"));
    assert!(doc.contains("- Summaries generated: 1 tabs"));
    assert!(doc.contains("(doc.rust-lang.org) - The **Rust** book. Second line.\n"));
    assert!(doc.contains("(en.wikipedia.org)\n"));
    assert!(doc.contains("(newtab) - *Domain skipped*\n"));

    let windows = parse_listing(&doc);
    assert_eq!(
        windows[0].tabs[0].summary.as_deref(),
        Some("The **Rust** book. Second line.")
    );
    assert_eq!(windows[1].tabs[0].note.as_deref(), Some("Domain skipped"));
    assert_eq!(windows[1].tabs[0].summary, None);
}

#[test]
fn summaries_starting_with_italics_stay_summaries() {
    let all = tabs();
    let emphasized = r#"*42%* of **Rust** users prefer *"fearless concurrency"*"#;
    let results = vec![
        FetchResult::fetched(all[0].clone(), "words".into(), 300, 100).with_summary(emphasized),
        FetchResult::fetched(all[1].clone(), "words".into(), 300, 100)
            .with_summary("*A single italic sentence.*"),
        FetchResult::skipped(all[2].clone(), "Too *little* content", 0),
    ];
    let report = RunReport::from_results(&results);
    let doc = render_export(&group_by_window(results), &report, "now");

    assert!(doc.contains("(en.wikipedia.org) - _A single italic sentence._\n"));
    assert!(doc.contains("(newtab) - *Too little content*\n"));

    let windows = parse_listing(&doc);
    assert_eq!(windows[0].tabs[0].summary.as_deref(), Some(emphasized));
    assert_eq!(windows[0].tabs[0].note, None);
    assert_eq!(
        windows[0].tabs[1].summary.as_deref(),
        Some("_A single italic sentence._")
    );
    assert_eq!(windows[0].tabs[1].note, None);
    assert_eq!(windows[1].tabs[0].note.as_deref(), Some("Too little content"));
    assert_eq!(windows[1].tabs[0].summary, None);
}

#[test]
fn checkpoint_reports_progress_counters() {
    let all = tabs();
    let results = vec![
        FetchResult::fetched(all[0].clone(), "words".into(), 300, 100).with_summary("S"),
        FetchResult::failed(all[1].clone(), "HTTP 500"),
    ];
    let doc = render_checkpoint(&results, 2, 3, "now");

    assert!(doc.contains("Progress: 2/3 tabs processed"));
    assert!(doc.contains("Successful: 1, Skipped: 0, Failed: 1, Summaries: 1"));
    assert!(doc.contains(" - *HTTP 500*"));
    assert_eq!(parse_listing(&doc)[0].tabs.len(), 2);
}

#[test]
fn bullet_style_window_headers_are_accepted() {
    let doc = "\
- **Window 3** (2 tabs)
    - [A](https://a.example.com/) (a.example.com) - First summary
    - [B](https://b.example.com/) (b.example.com)
";
    let windows = parse_listing(doc);
    assert_eq!(windows.len(), 1);
    assert_eq!(windows[0].window_index, 3);
    assert_eq!(windows[0].tabs[0].summary.as_deref(), Some("First summary"));
    assert_eq!(windows[0].tabs[1].summary, None);
}

#[test]
fn kept_urls_cover_links_bare_urls_and_parentheses() {
    let doc = "\
## Window 1 (2 tabs)

- [Rust](https://en.wikipedia.org/wiki/Rust_(programming_language)) (en.wikipedia.org)
- [New Tab](chrome://newtab/) (newtab)

Also see https://example.com/notes. And [docs](https://docs.rs/regex).
";
    let urls = extract_kept_urls(doc);
    let expected: BTreeSet<String> = [
        "chrome://newtab/",
        "https://docs.rs/regex",
        "https://en.wikipedia.org/wiki/Rust_(programming_language)",
        "https://example.com/notes",
    ]
    .into_iter()
    .map(String::from)
    .collect();
    assert_eq!(urls, expected);
}

#[test]
fn tabs_absent_from_listing_are_selected_for_closing() {
    let kept: BTreeSet<String> = ["https://doc.rust-lang.org/book/".to_string()].into();
    let closing = tabs_to_close(&tabs(), &kept);
    let urls: Vec<&str> = closing.iter().map(|t| t.url.as_str()).collect();
    assert_eq!(
        urls,
        vec![
            "https://en.wikipedia.org/wiki/Rust_(programming_language)",
            "chrome://newtab/"
        ]
    );
}
