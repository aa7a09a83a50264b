use std::path::Path;

use anyhow::{bail, Context};
use engine_logging::{engine_info, engine_warn};
use tabwright_engine::{
    keep_listed, AssumeYes, Confirm, ExecutorSettings, KeepOutcome, TerminalConfirm,
};

use crate::config::AppConfig;
use crate::output::read_input;

pub async fn run(config: &AppConfig, listing: &Path, yes: bool) -> anyhow::Result<()> {
    let text = read_input(listing, "listing")?;
    let browser = config.browser();
    let confirm: &dyn Confirm = if yes { &AssumeYes } else { &TerminalConfirm };

    let outcome = keep_listed(&browser, confirm, &text, ExecutorSettings::default())
        .await
        .context("could not read open tabs")?;
    match outcome {
        KeepOutcome::EmptyListing => bail!("no URLs found in {}", listing.display()),
        KeepOutcome::NothingToClose => engine_info!("Nothing to close"),
        KeepOutcome::Cancelled { candidates } => {
            engine_info!("Left {} tabs open", candidates)
        }
        KeepOutcome::Closed(report) => {
            engine_info!("Closed {} tabs", report.closed.len());
            for (url, reason) in &report.failed {
                engine_warn!("  Not closed: {} ({})", url, reason);
            }
        }
    }
    Ok(())
}
