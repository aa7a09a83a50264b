//! Confirmation-gated flows over a [`TabDirectory`]: closing tabs missing
//! from a listing, and applying a reorganization plan.

use engine_logging::{engine_info, engine_warn};
use tabwright_core::{
    extract_kept_urls, tabs_to_close, Plan, Planner, PlannerOptions, WindowRecommendation,
};

use crate::closer::{CloseReport, TabCloser};
use crate::confirm::Confirm;
use crate::directory::{DirectoryError, TabDirectory};
use crate::executor::{ExecutionReport, ExecutorSettings, ReorgExecutor};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeepOutcome {
    /// The listing holds no URLs; nothing is touched.
    EmptyListing,
    NothingToClose,
    Cancelled { candidates: usize },
    Closed(CloseReport),
}

/// Closes every open tab whose URL does not appear in `listing`.
pub async fn keep_listed(
    directory: &dyn TabDirectory,
    confirm: &dyn Confirm,
    listing: &str,
    settings: ExecutorSettings,
) -> Result<KeepOutcome, DirectoryError> {
    let kept = extract_kept_urls(listing);
    if kept.is_empty() {
        engine_warn!("No URLs found in the listing");
        return Ok(KeepOutcome::EmptyListing);
    }
    engine_info!("Found {} URLs in the listing", kept.len());

    let current = directory.list().await?;
    let closing = tabs_to_close(&current, &kept);
    if closing.is_empty() {
        engine_info!("All {} open tabs are in the listing", current.len());
        return Ok(KeepOutcome::NothingToClose);
    }

    engine_info!("{} tabs are not in the listing:", closing.len());
    for tab in &closing {
        engine_info!("  - {} ({})", tab.title, tab.url);
    }
    let question = format!("Close these {} tabs?", closing.len());
    if !confirm.confirm(&question, true).await {
        engine_info!("Operation cancelled");
        return Ok(KeepOutcome::Cancelled {
            candidates: closing.len(),
        });
    }

    let urls: Vec<String> = closing.into_iter().map(|tab| tab.url).collect();
    let report = TabCloser::new(directory, settings).close(&urls).await?;
    engine_info!(
        "Closed {} tabs, {} failed",
        report.closed.len(),
        report.failed.len()
    );
    Ok(KeepOutcome::Closed(report))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReorgOutcome {
    NothingMatched(Plan),
    Cancelled(Plan),
    Executed { plan: Plan, report: ExecutionReport },
}

/// Plans against the live tabs, shows the plan, and executes it once confirmed.
pub async fn reorganize(
    directory: &dyn TabDirectory,
    confirm: &dyn Confirm,
    recommendations: &[WindowRecommendation],
    options: PlannerOptions,
    settings: ExecutorSettings,
) -> Result<ReorgOutcome, DirectoryError> {
    let current = directory.list().await?;
    engine_info!("Found {} open tabs", current.len());
    let plan = Planner::new(options).plan(&current, recommendations);
    if plan.is_empty() {
        engine_warn!("No tabs matched the recommended windows");
        return Ok(ReorgOutcome::NothingMatched(plan));
    }

    log_plan(&plan);
    let question = format!(
        "Execute this reorganization plan? This will create {} new windows and move {} tabs.",
        plan.new_window_count(),
        plan.tab_count()
    );
    if !confirm.confirm(&question, false).await {
        engine_info!("Reorganization cancelled");
        return Ok(ReorgOutcome::Cancelled(plan));
    }

    let report = ReorgExecutor::new(directory, settings).execute(&plan).await?;
    engine_info!(
        "Reorganization complete: {} windows created, {} tabs moved, {} failures",
        report.windows_created,
        report.tabs_moved,
        report.failures.len()
    );
    Ok(ReorgOutcome::Executed { plan, report })
}

fn log_plan(plan: &Plan) {
    for planned in &plan.targets {
        let target = &planned.target;
        engine_info!("{}", target.name);
        engine_info!("   Purpose: {}", target.purpose);
        engine_info!("   Priority: {}", target.priority);
        engine_info!("   Matched tabs: {}", planned.tabs.len());
        for tab in &planned.tabs {
            let title: String = tab.tab.title.chars().take(60).collect();
            engine_info!("     - {} ({})", title, tab.tab.display_domain());
        }
        for url in &planned.unresolved_urls {
            engine_warn!("     not open: {}", url);
        }
    }
    if !plan.unmatched.is_empty() {
        engine_info!("{} tabs match no window and stay where they are", plan.unmatched.len());
    }
}
