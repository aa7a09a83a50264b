//! Reorganization plan documents.
//!
//! A plan arrives in one of two encodings: a JSON structured block (either
//! domain patterns or explicit URLs per window) or numbered headings followed
//! by `**Purpose:**`-style lines. Both normalize to [`WindowRecommendation`]s.

use std::collections::BTreeMap;
use std::fmt::Write;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::listing::ListedWindow;

static NUMBERED_WINDOW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d+\.\s*\*\*(.+?)\*\*\s*$").expect("valid numbered window regex")
});

static FIRST_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("valid number regex"));

const PURPOSE: &str = "**Purpose:**";
const ESTIMATED: &str = "**Estimated tabs:**";
const PRIORITY: &str = "**Priority:**";
const KEY_DOMAINS: &str = "**Key domains:**";
const TAB: &str = "**Tab:**";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlanError {
    #[error("no window recommendations found in plan document")]
    NoRecommendations,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StructuredPlan {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<PlanAnalysis>,
    #[serde(default)]
    pub recommended_windows: Vec<WindowRecommendation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub specific_actions: Vec<SpecificAction>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub productivity_benefits: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlanAnalysis {
    #[serde(default)]
    pub current_state: String,
    #[serde(default)]
    pub main_issues: Vec<String>,
    #[serde(default)]
    pub identified_patterns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowRecommendation {
    pub window_name: String,
    #[serde(default)]
    pub purpose: String,
    #[serde(default)]
    pub tab_domains: Vec<String>,
    /// Explicit URLs; when present they take precedence over `tab_domains`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tabs: Vec<UrlChoice>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub estimated_tab_count: u32,
    #[serde(default = "default_priority")]
    pub priority: String,
}

impl WindowRecommendation {
    pub fn with_domains(name: impl Into<String>, domains: &[&str]) -> Self {
        Self {
            window_name: name.into(),
            purpose: String::new(),
            tab_domains: domains.iter().map(|d| d.to_string()).collect(),
            tabs: Vec::new(),
            estimated_tab_count: 0,
            priority: default_priority(),
        }
    }

    pub fn with_urls(name: impl Into<String>, tabs: Vec<UrlChoice>) -> Self {
        Self {
            window_name: name.into(),
            purpose: String::new(),
            tab_domains: Vec::new(),
            tabs,
            estimated_tab_count: 0,
            priority: default_priority(),
        }
    }

    fn has_attributes(&self) -> bool {
        !self.purpose.is_empty()
            || !self.tab_domains.is_empty()
            || !self.tabs.is_empty()
            || self.estimated_tab_count > 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlChoice {
    pub url: String,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SpecificAction {
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tabs_affected: Vec<String>,
    #[serde(default)]
    pub reason: String,
}

fn default_priority() -> String {
    "medium".to_string()
}

fn lenient_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n.as_u64().map(|n| n.min(u32::MAX as u64) as u32),
        serde_json::Value::String(s) => FIRST_NUMBER
            .find(&s)
            .and_then(|m| m.as_str().parse().ok()),
        _ => None,
    }
    .unwrap_or(0))
}

/// A plan document, tagged by the encoding it was found in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanSource {
    Structured(StructuredPlan),
    HeadingText(String),
}

impl PlanSource {
    /// Prefers a structured block with at least one window; otherwise keeps
    /// the text for the heading parser.
    pub fn detect(document: &str) -> Self {
        match parse_structured_block(document) {
            Some(plan) => PlanSource::Structured(plan),
            None => PlanSource::HeadingText(document.to_string()),
        }
    }

    pub fn into_recommendations(self) -> Vec<WindowRecommendation> {
        match self {
            PlanSource::Structured(plan) => plan.recommended_windows,
            PlanSource::HeadingText(text) => parse_heading_text(&text),
        }
    }
}

pub fn parse_plan_document(document: &str) -> Result<Vec<WindowRecommendation>, PlanError> {
    let recommendations: Vec<WindowRecommendation> = PlanSource::detect(document)
        .into_recommendations()
        .into_iter()
        .filter(|rec| !rec.window_name.trim().is_empty())
        .collect();
    if recommendations.is_empty() {
        return Err(PlanError::NoRecommendations);
    }
    Ok(recommendations)
}

/// Finds the first JSON object in `text` that carries a non-empty
/// `recommended_windows` list. Works on fenced blocks and bare JSON alike.
pub fn parse_structured_block(text: &str) -> Option<StructuredPlan> {
    if !text.contains("\"recommended_windows\"") {
        return None;
    }
    for (start, _) in text.match_indices('{') {
        let mut stream =
            serde_json::Deserializer::from_str(&text[start..]).into_iter::<serde_json::Value>();
        let Some(Ok(value)) = stream.next() else {
            continue;
        };
        if value.get("recommended_windows").is_none() {
            continue;
        }
        if let Ok(plan) = serde_json::from_value::<StructuredPlan>(value) {
            if !plan.recommended_windows.is_empty() {
                return Some(plan);
            }
        }
    }
    None
}

/// Parses `N. **Name**` headings (optionally prefixed by `#`) and the
/// attribute lines that follow them. Headings without any attribute line
/// are not windows and are dropped.
pub fn parse_heading_text(text: &str) -> Vec<WindowRecommendation> {
    let mut windows: Vec<WindowRecommendation> = Vec::new();
    let mut current: Option<WindowRecommendation> = None;

    for raw in text.lines() {
        let line = raw.trim();
        let is_heading = line.starts_with('#');
        let unprefixed = line.trim_start_matches('#').trim();

        if let Some(caps) = NUMBERED_WINDOW.captures(unprefixed) {
            windows.extend(current.take());
            current = Some(WindowRecommendation::with_domains(caps[1].trim(), &[]));
            continue;
        }
        if is_heading {
            windows.extend(current.take());
            continue;
        }

        let Some(window) = current.as_mut() else {
            continue;
        };
        if let Some(rest) = line.strip_prefix(PURPOSE) {
            window.purpose = rest.trim().to_string();
        } else if let Some(rest) = line.strip_prefix(ESTIMATED) {
            if let Some(found) = FIRST_NUMBER.find(rest) {
                window.estimated_tab_count = found.as_str().parse().unwrap_or(0);
            }
        } else if let Some(rest) = line.strip_prefix(PRIORITY) {
            window.priority = rest.trim().to_string();
        } else if let Some(rest) = line.strip_prefix(KEY_DOMAINS) {
            window.tab_domains = rest
                .split(',')
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string)
                .collect();
        } else if let Some(rest) = line.strip_prefix(TAB) {
            let rest = rest.trim();
            let (url, reason) = match rest.split_once(" - ") {
                Some((url, reason)) => (url.trim(), reason.trim()),
                None => (rest, ""),
            };
            if !url.is_empty() {
                window.tabs.push(UrlChoice {
                    url: url.to_string(),
                    reason: reason.to_string(),
                });
            }
        }
    }
    windows.extend(current);

    windows.retain(WindowRecommendation::has_attributes);
    windows
}

/// Inputs for [`render_plan_document`].
#[derive(Debug, Clone, Copy)]
pub struct PlanDocument<'a> {
    pub generated_at: &'a str,
    pub source: &'a str,
    pub windows: &'a [ListedWindow],
    pub narrative: &'a str,
    pub structured: Option<&'a StructuredPlan>,
    /// Raw structured response when it could not be parsed as JSON.
    pub raw_structured: Option<&'a str>,
}

pub fn render_plan_document(doc: &PlanDocument<'_>) -> String {
    let total_tabs: usize = doc.windows.iter().map(|w| w.tabs.len()).sum();
    let mut out = String::new();
    let _ = writeln!(out, "# Tab Organization Recommendations");
    let _ = writeln!(out, "Generated: {}", doc.generated_at);
    let _ = writeln!(out, "Source: {}", doc.source);
    let _ = writeln!(
        out,
        "Total tabs: {total_tabs} across {} windows\n",
        doc.windows.len()
    );
    let _ = writeln!(out, "## AI Analysis\n\n{}\n", doc.narrative.trim());

    if let Some(plan) = doc.structured {
        render_structured(&mut out, plan);
    } else if let Some(raw) = doc.raw_structured {
        let _ = writeln!(out, "## Structured Recommendations (unparsed)\n\n{}\n", raw.trim());
    }

    let _ = writeln!(out, "## Current Window Details (for reference)\n");
    for window in doc.windows {
        let _ = writeln!(
            out,
            "### Window {} ({} tabs)",
            window.window_index,
            window.tabs.len()
        );
        let mut by_domain: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for tab in &window.tabs {
            by_domain
                .entry(tab.domain.as_str())
                .or_default()
                .push(tab.title.as_str());
        }
        for (domain, titles) in by_domain {
            let _ = writeln!(out, "**{domain}** ({} tabs):", titles.len());
            for title in titles {
                let _ = writeln!(out, "  - {title}");
            }
        }
        out.push('\n');
    }
    out
}

fn render_structured(out: &mut String, plan: &StructuredPlan) {
    let _ = writeln!(out, "## Structured Recommendations\n");

    if let Some(analysis) = &plan.analysis {
        let _ = writeln!(out, "### Current State Analysis");
        let _ = writeln!(out, "**Current Organization:** {}\n", analysis.current_state);
        push_bullets(out, "**Main Issues:**", &analysis.main_issues);
        push_bullets(out, "**Identified Patterns:**", &analysis.identified_patterns);
    }

    let _ = writeln!(out, "### Recommended Window Organization\n");
    for (index, window) in plan.recommended_windows.iter().enumerate() {
        let _ = writeln!(out, "#### {}. **{}**", index + 1, window.window_name);
        let _ = writeln!(out, "{PURPOSE} {}", window.purpose);
        let _ = writeln!(out, "{ESTIMATED} {}", window.estimated_tab_count);
        let _ = writeln!(out, "{PRIORITY} {}", window.priority);
        if !window.tab_domains.is_empty() {
            let _ = writeln!(out, "{KEY_DOMAINS} {}", window.tab_domains.join(", "));
        }
        for choice in &window.tabs {
            if choice.reason.is_empty() {
                let _ = writeln!(out, "{TAB} {}", choice.url);
            } else {
                let _ = writeln!(out, "{TAB} {} - {}", choice.url, choice.reason);
            }
        }
        out.push('\n');
    }

    if !plan.specific_actions.is_empty() {
        let _ = writeln!(out, "### Specific Actions\n");
        for (index, action) in plan.specific_actions.iter().enumerate() {
            let _ = writeln!(
                out,
                "{}. {}",
                index + 1,
                action.action.replace('_', " ").to_uppercase()
            );
            let _ = writeln!(out, "   - Description: {}", action.description);
            if !action.tabs_affected.is_empty() {
                let _ = writeln!(out, "   - Affects: {}", action.tabs_affected.join(", "));
            }
            let _ = writeln!(out, "   - Benefit: {}\n", action.reason);
        }
    }

    push_bullets(
        out,
        "### Expected Productivity Benefits\n",
        &plan.productivity_benefits,
    );

    if let Ok(json) = serde_json::to_string_pretty(plan) {
        let _ = writeln!(out, "### Structured Plan\n\n```json\n{json}\n```\n");
    }
}

fn push_bullets(out: &mut String, heading: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    let _ = writeln!(out, "{heading}");
    for item in items {
        let _ = writeln!(out, "- {item}");
    }
    out.push('\n');
}
