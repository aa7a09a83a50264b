use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use engine_logging::engine_info;
use tabwright_core::{
    parse_listing, parse_plan_document, render_plan_document, ListedWindow, PlanDocument,
    WindowRecommendation,
};
use tabwright_engine::Analyzer;

use crate::config::AppConfig;
use crate::output::{read_input, write_document, Stamp};

pub async fn run(config: &AppConfig, listing: &Path) -> anyhow::Result<()> {
    let text = read_input(listing, "listing")?;
    let windows = parse_listing(&text);
    if windows.iter().all(|window| window.tabs.is_empty()) {
        bail!("no tabs found in {}", listing.display());
    }
    let (path, recommendations) =
        write_plan(config, &windows, &listing.display().to_string()).await?;
    engine_info!(
        "{} windows recommended; apply them with `tabwright reorganize {}`",
        recommendations.len(),
        path.display()
    );
    Ok(())
}

/// Asks for a plan, writes the plan document, and reads the recommendations
/// back from what was written.
pub async fn write_plan(
    config: &AppConfig,
    windows: &[ListedWindow],
    source: &str,
) -> anyhow::Result<(PathBuf, Vec<WindowRecommendation>)> {
    let analyzer = Analyzer::new(config.completion()?, config.analysis_settings());
    let recommendation = analyzer
        .recommend(windows)
        .await
        .context("tab analysis failed")?;

    let stamp = Stamp::now();
    let document = render_plan_document(&PlanDocument {
        generated_at: &stamp.header,
        source,
        windows,
        narrative: &recommendation.narrative,
        structured: recommendation.structured.as_ref(),
        raw_structured: recommendation.raw_structured.as_deref(),
    });
    let path = write_document(&config.output_dir, "tab-organization-plan", &stamp, &document)?;
    let recommendations = parse_plan_document(&document)
        .with_context(|| format!("the plan in {} has no usable windows", path.display()))?;
    Ok((path, recommendations))
}
