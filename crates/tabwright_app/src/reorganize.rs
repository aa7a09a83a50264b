use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use engine_logging::{engine_info, engine_warn};
use tabwright_core::{listed_windows_from_tabs, parse_plan_document, PlannerOptions};
use tabwright_engine::{
    reorganize, AssumeYes, Confirm, ExecutionReport, ExecutorSettings, InMemoryDirectory,
    ReorgOutcome, TabDirectory, TerminalConfirm,
};

use crate::config::AppConfig;
use crate::output::read_input;
use crate::recommend::write_plan;

pub struct ReorganizeArgs<'a> {
    pub plan: Option<&'a Path>,
    pub live: bool,
    pub dry_run: bool,
    pub yes: bool,
}

pub async fn run(config: &AppConfig, args: ReorganizeArgs<'_>) -> anyhow::Result<()> {
    let browser = config.browser();

    let recommendations = match args.plan {
        Some(path) if !args.live => {
            let text = read_input(path, "plan")?;
            parse_plan_document(&text)
                .with_context(|| format!("no window recommendations in {}", path.display()))?
        }
        _ => {
            let tabs = browser.list().await.context("could not read open tabs")?;
            let windows = listed_windows_from_tabs(&tabs);
            let (_, recommendations) = write_plan(config, &windows, "live browser tabs").await?;
            recommendations
        }
    };
    engine_info!("Plan recommends {} windows", recommendations.len());

    let outcome = if args.dry_run {
        let snapshot = browser.list().await.context("could not read open tabs")?;
        engine_info!(
            "Dry run: applying the plan to an in-memory copy of {} tabs",
            snapshot.len()
        );
        let sandbox = InMemoryDirectory::from_tabs(&snapshot);
        let outcome = reorganize(
            &sandbox,
            &AssumeYes,
            &recommendations,
            PlannerOptions::default(),
            ExecutorSettings {
                pacing: Duration::ZERO,
            },
        )
        .await?;
        log_layout(&sandbox.list().await?);
        outcome
    } else {
        let confirm: &dyn Confirm = if args.yes { &AssumeYes } else { &TerminalConfirm };
        reorganize(
            &browser,
            confirm,
            &recommendations,
            PlannerOptions::default(),
            ExecutorSettings::default(),
        )
        .await
        .context("could not read open tabs")?
    };

    match outcome {
        ReorgOutcome::NothingMatched(_) => {
            engine_warn!("None of the recommended windows matched an open tab")
        }
        ReorgOutcome::Cancelled(_) => {}
        ReorgOutcome::Executed { report, .. } => {
            log_report(&report);
            if !args.dry_run {
                engine_info!(
                    "Review the new windows, export them with `tabwright dump --fast`, then \
                     close what you no longer need with `tabwright keep <listing>`"
                );
            }
        }
    }
    Ok(())
}

fn log_report(report: &ExecutionReport) {
    engine_info!("Windows created: {}", report.windows_created);
    engine_info!("Tabs moved: {}", report.tabs_moved);
    if report.already_in_place > 0 {
        engine_info!("Already in place: {}", report.already_in_place);
    }
    if !report.failures.is_empty() {
        engine_warn!("{} tabs could not be moved:", report.failures.len());
        for failure in &report.failures {
            engine_warn!("  [{}] {}: {}", failure.target, failure.url, failure.reason);
        }
    }
}

fn log_layout(tabs: &[tabwright_core::TabRef]) {
    for window in listed_windows_from_tabs(tabs) {
        engine_info!("Window {} ({} tabs)", window.window_index, window.tabs.len());
        for tab in &window.tabs {
            engine_info!("  - {} ({})", tab.title, tab.domain);
        }
    }
}
