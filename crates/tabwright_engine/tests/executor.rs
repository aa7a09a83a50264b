use std::sync::Once;
use std::time::Duration;

use pretty_assertions::assert_eq;
use tabwright_core::{Plan, Planner, PlannerOptions, UrlChoice, WindowRecommendation};
use tabwright_engine::{
    DirectoryError, ExecutorSettings, InMemoryDirectory, ReorgExecutor, TabDirectory,
};

const DOCS_A: &str = "https://docs.rs/serde";
const DOCS_B: &str = "https://docs.rs/tokio";
const NEWS: &str = "https://news.example/today";
const SHOP: &str = "https://shop.example/cart";

fn unpaced() -> ExecutorSettings {
    ExecutorSettings {
        pacing: Duration::ZERO,
    }
}

fn browser() -> InMemoryDirectory {
    let directory = InMemoryDirectory::new();
    directory.push_window(&[("serde", DOCS_A), ("News", NEWS)]);
    directory.push_window(&[("tokio", DOCS_B), ("Cart", SHOP)]);
    directory
}

fn recommendations() -> Vec<WindowRecommendation> {
    vec![
        WindowRecommendation::with_domains("Rust docs", &["docs.rs"]),
        WindowRecommendation::with_domains("Shopping", &["shop.example"]),
    ]
}

async fn plan_for(directory: &InMemoryDirectory, options: PlannerOptions) -> Plan {
    let tabs = directory.list().await.unwrap();
    Planner::new(options).plan(&tabs, &recommendations())
}

fn urls_by_window(directory: &InMemoryDirectory) -> Vec<Vec<String>> {
    let mut windows: Vec<Vec<String>> = Vec::new();
    for tab in directory.snapshot() {
        let index = tab.window_position as usize - 1;
        if windows.len() <= index {
            windows.resize(index + 1, Vec::new());
        }
        windows[index].push(tab.url);
    }
    windows
}

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

#[tokio::test]
async fn executes_plan_with_reuse_and_new_window() {
    init_logging();
    let directory = browser();
    let plan = plan_for(&directory, PlannerOptions::default()).await;

    let report = ReorgExecutor::new(&directory, unpaced())
        .execute(&plan)
        .await
        .unwrap();

    assert_eq!(report.tabs_moved, 2);
    assert_eq!(report.windows_created, 1);
    assert_eq!(report.already_in_place, 1);
    assert!(report.failures.is_empty());
    assert_eq!(
        urls_by_window(&directory),
        vec![
            vec!["chrome://newtab/".to_string(), SHOP.to_string()],
            vec![DOCS_A.to_string(), NEWS.to_string(), DOCS_B.to_string()],
        ]
    );
    assert_eq!(directory.mutation_count(), 3);
}

#[tokio::test]
async fn closed_tab_is_reported_and_others_continue() {
    init_logging();
    let directory = browser();
    let plan = plan_for(&directory, PlannerOptions::default()).await;
    assert!(directory.remove_url(DOCS_B));

    let report = ReorgExecutor::new(&directory, unpaced())
        .execute(&plan)
        .await
        .unwrap();

    assert_eq!(report.tabs_moved, 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].url, DOCS_B);
    assert_eq!(report.failures[0].target, "Rust docs");
    assert_eq!(report.failures[0].reason, "tab no longer open");
    let snapshot = directory.snapshot();
    let cart = snapshot.iter().find(|tab| tab.url == SHOP).unwrap();
    assert_eq!(cart.window_position, 1);
}

#[tokio::test]
async fn failed_move_is_recorded_per_tab() {
    let directory = browser();
    directory.fail_mutations_for(DOCS_B);
    let plan = plan_for(&directory, PlannerOptions::default()).await;

    let report = ReorgExecutor::new(&directory, unpaced())
        .execute(&plan)
        .await
        .unwrap();

    assert_eq!(report.tabs_moved, 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].url, DOCS_B);
    assert!(report.failures[0].reason.contains("refused"));
}

#[tokio::test]
async fn unreadable_directory_aborts_before_mutating() {
    let directory = browser();
    let plan = plan_for(&directory, PlannerOptions::default()).await;
    directory.set_unavailable(true);

    let result = ReorgExecutor::new(&directory, unpaced())
        .execute(&plan)
        .await;

    assert!(matches!(result, Err(DirectoryError::Unavailable(_))));
    assert_eq!(directory.mutation_count(), 0);
}

#[tokio::test]
async fn missing_reuse_window_falls_back_to_new_window() {
    let directory = browser();
    let plan = plan_for(
        &directory,
        PlannerOptions {
            reuse_window: Some(7),
        },
    )
    .await;

    let report = ReorgExecutor::new(&directory, unpaced())
        .execute(&plan)
        .await
        .unwrap();

    assert_eq!(report.windows_created, 2);
    assert_eq!(report.tabs_moved, 3);
    assert_eq!(report.already_in_place, 0);
    let snapshot = directory.snapshot();
    let docs_windows: Vec<u32> = snapshot
        .iter()
        .filter(|tab| tab.url.starts_with("https://docs.rs"))
        .map(|tab| tab.window_position)
        .collect();
    assert_eq!(docs_windows.len(), 2);
    assert_eq!(docs_windows[0], docs_windows[1]);
}

#[tokio::test]
async fn duplicate_urls_each_move_once() {
    let directory = InMemoryDirectory::new();
    directory.push_window(&[("Keep", NEWS)]);
    directory.push_window(&[("serde", DOCS_A), ("serde again", DOCS_A)]);
    let tabs = directory.list().await.unwrap();
    let plan = Planner::new(PlannerOptions::default()).plan(
        &tabs,
        &[WindowRecommendation::with_domains("Rust docs", &["docs.rs"])],
    );
    assert_eq!(plan.tab_count(), 2);

    let report = ReorgExecutor::new(&directory, unpaced())
        .execute(&plan)
        .await
        .unwrap();

    assert_eq!(report.tabs_moved, 2);
    assert_eq!(
        urls_by_window(&directory),
        vec![vec![NEWS.to_string(), DOCS_A.to_string(), DOCS_A.to_string()]]
    );
}

#[tokio::test]
async fn later_target_leaves_earlier_copy_in_place() {
    init_logging();
    let directory = InMemoryDirectory::new();
    directory.push_window(&[("Keep", NEWS)]);
    directory.push_window(&[("serde", DOCS_A), ("serde again", DOCS_A)]);
    let tabs = directory.list().await.unwrap();
    let choice = || {
        vec![UrlChoice {
            url: DOCS_A.to_string(),
            reason: "reference".to_string(),
        }]
    };
    let plan = Planner::new(PlannerOptions { reuse_window: None }).plan(
        &tabs,
        &[
            WindowRecommendation::with_urls("Reading", choice()),
            WindowRecommendation::with_urls("Reference", choice()),
        ],
    );
    assert_eq!(plan.targets.len(), 2);

    let report = ReorgExecutor::new(&directory, unpaced())
        .execute(&plan)
        .await
        .unwrap();

    assert_eq!(report.tabs_moved, 2);
    assert_eq!(report.windows_created, 2);
    assert!(report.failures.is_empty());
    let copy = || vec!["chrome://newtab/".to_string(), DOCS_A.to_string()];
    assert_eq!(
        urls_by_window(&directory),
        vec![copy(), copy(), vec![NEWS.to_string()]]
    );
}

#[tokio::test]
async fn copy_held_by_earlier_target_is_not_taken_again() {
    let directory = InMemoryDirectory::new();
    directory.push_window(&[("serde", DOCS_A), ("tokio", DOCS_B)]);
    let tabs = directory.list().await.unwrap();
    let mut plan = Planner::new(PlannerOptions { reuse_window: None }).plan(
        &tabs,
        &[WindowRecommendation::with_domains("Rust docs", &["docs.rs"])],
    );
    // Second target naming the same single tab, as a hand-edited plan might.
    let mut duplicate = plan.targets[0].clone();
    duplicate.target.name = "Again".to_string();
    duplicate.tabs.truncate(1);
    plan.targets.push(duplicate);

    let report = ReorgExecutor::new(&directory, unpaced())
        .execute(&plan)
        .await
        .unwrap();

    assert_eq!(report.tabs_moved, 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].target, "Again");
    assert_eq!(report.failures[0].url, DOCS_A);
    assert_eq!(
        report.failures[0].reason,
        "every open copy is held by an earlier target"
    );
    assert_eq!(
        urls_by_window(&directory)[1],
        vec![
            "chrome://newtab/".to_string(),
            DOCS_A.to_string(),
            DOCS_B.to_string()
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn mutations_are_paced() {
    let directory = browser();
    let plan = plan_for(&directory, PlannerOptions::default()).await;
    let started = tokio::time::Instant::now();

    ReorgExecutor::new(&directory, ExecutorSettings::default())
        .execute(&plan)
        .await
        .unwrap();

    // move, create, move: two pauses between three mutations
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_millis(500), "{elapsed:?}");
    assert!(elapsed < Duration::from_millis(750), "{elapsed:?}");
}
