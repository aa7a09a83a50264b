use std::sync::Once;

use pretty_assertions::assert_eq;
use tabwright_core::{
    match_domain, normalize_pattern, MatchKind, MatchedBy, Planner, PlannerOptions, Selector,
    TabRef, UrlChoice, WindowAction, WindowRecommendation,
};

fn current_tabs() -> Vec<TabRef> {
    vec![
        TabRef::new("Docs", "https://docs.example.com/x", 1, 1),
        TabRef::new("Shop", "https://shop.example.com/y", 1, 2),
        TabRef::new("Other", "https://unrelated.com/z", 2, 1),
    ]
}

fn urls(tabs: &[tabwright_core::PlannedTab]) -> Vec<&str> {
    tabs.iter().map(|planned| planned.tab.url.as_str()).collect()
}

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

#[test]
fn domain_targets_select_only_their_tabs() {
    init_logging();
    let recommendations = vec![
        WindowRecommendation::with_domains("A", &["docs.example.com"]),
        WindowRecommendation::with_domains("B", &["shop.example.com"]),
    ];
    let plan = Planner::default().plan(&current_tabs(), &recommendations);

    assert_eq!(plan.targets.len(), 2);
    assert_eq!(plan.targets[0].target.name, "A");
    assert_eq!(urls(&plan.targets[0].tabs), vec!["https://docs.example.com/x"]);
    assert_eq!(plan.targets[1].target.name, "B");
    assert_eq!(urls(&plan.targets[1].tabs), vec!["https://shop.example.com/y"]);
    assert_eq!(plan.unmatched.len(), 1);
    assert_eq!(plan.unmatched[0].url, "https://unrelated.com/z");
    assert_eq!(plan.tab_count(), 2);
}

#[test]
fn first_recommendation_reuses_window_one() {
    let recommendations = vec![
        WindowRecommendation::with_domains("A", &["docs.example.com"]),
        WindowRecommendation::with_domains("B", &["shop.example.com"]),
    ];
    let plan = Planner::default().plan(&current_tabs(), &recommendations);

    assert_eq!(plan.targets[0].target.action, WindowAction::UseExistingWindow);
    assert_eq!(plan.targets[0].target.existing_window_index, Some(1));
    assert_eq!(plan.targets[1].target.action, WindowAction::CreateNewWindow);
    assert_eq!(plan.targets[1].target.existing_window_index, None);
    assert_eq!(plan.new_window_count(), 1);
}

#[test]
fn empty_targets_are_dropped_and_not_counted() {
    let recommendations = vec![
        WindowRecommendation::with_domains("Nothing", &["nowhere.invalid"]),
        WindowRecommendation::with_domains("Shop", &["shop.example.com"]),
        WindowRecommendation::with_domains("Blank", &["  "]),
    ];
    let plan = Planner::default().plan(&current_tabs(), &recommendations);

    assert_eq!(plan.targets.len(), 1);
    assert_eq!(plan.targets[0].target.name, "Shop");
    assert_eq!(plan.targets[0].target.action, WindowAction::CreateNewWindow);
    assert_eq!(plan.new_window_count(), 1);
}

#[test]
fn overlapping_patterns_assign_tab_to_first_target() {
    let recommendations = vec![
        WindowRecommendation::with_domains("Everything example", &["example.com"]),
        WindowRecommendation::with_domains("Docs", &["docs.example.com"]),
    ];
    let plan = Planner::default().plan(&current_tabs(), &recommendations);

    assert_eq!(plan.targets.len(), 1);
    assert_eq!(
        urls(&plan.targets[0].tabs),
        vec!["https://docs.example.com/x", "https://shop.example.com/y"]
    );
    assert_eq!(
        plan.targets[0].tabs[0].matched_by,
        MatchedBy::Pattern {
            pattern: "example.com".into(),
            kind: MatchKind::Subdomain
        }
    );
}

#[test]
fn url_targets_match_exactly_and_report_missing_urls() {
    let mut tabs = current_tabs();
    tabs.push(TabRef::new("Shop again", "https://shop.example.com/y", 2, 2));
    let recommendations = vec![WindowRecommendation::with_urls(
        "Shopping",
        vec![
            UrlChoice {
                url: "https://shop.example.com/y".into(),
                reason: "cart".into(),
            },
            UrlChoice {
                url: "https://shop.example.com/y".into(),
                reason: "duplicate".into(),
            },
            UrlChoice {
                url: "https://gone.example.com/".into(),
                reason: "closed".into(),
            },
        ],
    )];
    let plan = Planner::new(PlannerOptions { reuse_window: None }).plan(&tabs, &recommendations);

    let target = &plan.targets[0];
    assert!(matches!(target.target.selector, Selector::Urls(_)));
    assert_eq!(target.target.action, WindowAction::CreateNewWindow);
    assert_eq!(target.tabs.len(), 2);
    assert_eq!(target.tabs[0].tab.window_position, 1);
    assert_eq!(target.tabs[1].tab.window_position, 2);
    assert_eq!(target.unresolved_urls, vec!["https://gone.example.com/"]);
}

#[test]
fn domain_match_precedence() {
    assert_eq!(match_domain("docs.rs", "docs.rs"), Some(MatchKind::Exact));
    assert_eq!(match_domain("www.docs.rs", "docs.rs"), Some(MatchKind::Subdomain));
    assert_eq!(
        match_domain("mydocs-example.com", "docs"),
        Some(MatchKind::Substring)
    );
    assert_eq!(match_domain("example.org", "docs"), None);
}

#[test]
fn patterns_are_normalized() {
    assert_eq!(normalize_pattern(" HTTPS://Docs.rs/tokio "), Some("docs.rs".into()));
    assert_eq!(normalize_pattern("github.com"), Some("github.com".into()));
    assert_eq!(normalize_pattern("   "), None);
    assert_eq!(normalize_pattern("https://"), None);
}
