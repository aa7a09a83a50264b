use std::sync::Arc;

use anyhow::Context;
use engine_logging::{engine_info, engine_warn};
use tabwright_core::{render_export, render_fast_listing, window_count, DomainFilter, RunReport};
use tabwright_engine::{
    CheckpointStore, LogSink, PipelineRunner, ResilientFetcher, TabDirectory,
};

use crate::config::AppConfig;
use crate::output::{write_document, Stamp};

pub async fn run(config: &AppConfig, fast: bool, resume: bool) -> anyhow::Result<()> {
    let completion = if fast { None } else { Some(config.completion()?) };

    let browser = config.browser();
    let tabs = browser.list().await.context("could not read open tabs")?;
    if tabs.is_empty() {
        engine_warn!("No open tabs found");
        return Ok(());
    }
    engine_info!(
        "Found {} tabs across {} windows",
        tabs.len(),
        window_count(&tabs)
    );

    let stamp = Stamp::now();
    write_document(
        &config.output_dir,
        "open-tabs-fast",
        &stamp,
        &render_fast_listing(&tabs, &stamp.header),
    )?;
    let Some(completion) = completion else {
        return Ok(());
    };

    let store = Arc::new(CheckpointStore::new(config.output_dir.clone()));
    let fetcher = ResilientFetcher::new(
        DomainFilter::default(),
        Arc::new(config.reader()),
        completion,
        config.fetcher_settings(),
    );
    let mut runner = PipelineRunner::new(fetcher).with_checkpoint(store.clone());
    if resume {
        let previous = store.load_previous();
        if previous.is_empty() {
            engine_warn!("No saved progress found; starting from the beginning");
        }
        runner = runner.with_previous_results(previous);
    } else if store.has_saved_state() {
        engine_info!(
            "Progress from an earlier run exists in {}; pass --resume to reuse it",
            store.state_path().display()
        );
    }

    let outcome = runner.run(&tabs, &LogSink).await;
    let stamp = Stamp::now();
    write_document(
        &config.output_dir,
        "open-tabs",
        &stamp,
        &render_export(&outcome.groups, &outcome.report, &stamp.header),
    )?;
    if let Err(err) = store.clear() {
        engine_warn!("Could not remove checkpoint files: {}", err);
    }
    log_report(&outcome.report);
    Ok(())
}

fn log_report(report: &RunReport) {
    engine_info!("Total tabs: {}", report.total);
    engine_info!(
        "Content read: {} ({:.1}%)",
        report.succeeded,
        report.percent(report.succeeded)
    );
    engine_info!(
        "Skipped: {} ({:.1}%)",
        report.skipped,
        report.percent(report.skipped)
    );
    engine_info!(
        "Failed: {} ({:.1}%)",
        report.failed,
        report.percent(report.failed)
    );
    engine_info!("Summaries generated: {}", report.summarized);
}
