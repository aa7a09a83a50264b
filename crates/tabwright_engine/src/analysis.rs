use std::sync::Arc;

use engine_logging::{engine_info, engine_warn};
use serde_json::json;
use tabwright_core::{categorize, parse_structured_block, ListedWindow, StructuredPlan};

use crate::completion::{CompletionError, CompletionRequest, TextCompletion};

pub const DEFAULT_ANALYSIS_MODEL: &str = "gpt-5";
pub const DEFAULT_PLAN_MODEL: &str = "gpt-4o";

const NARRATIVE_SYSTEM_PROMPT: &str = "You are a productivity expert who helps users organize \
their browser tabs efficiently. You will analyze browser tabs across multiple windows and \
provide structured recommendations for reorganizing them into logical groups.

Your task is to:
1. Think through the tab patterns and relationships step by step
2. Identify natural groupings based on domains, topics, work contexts, etc.
3. Provide specific, actionable recommendations for window organization

Reason through the patterns first, then provide structured output.";

const STRUCTURED_SYSTEM_PROMPT: &str = r#"You are a browser productivity expert. Analyze the provided tabs and create a structured reorganization plan.

Return your response as a JSON object with this exact structure:
{
  "analysis": {
    "current_state": "Brief description of current organization",
    "main_issues": ["Issue 1", "Issue 2", ...],
    "identified_patterns": ["Pattern 1", "Pattern 2", ...]
  },
  "recommended_windows": [
    {
      "window_name": "Descriptive name for this window group",
      "purpose": "What this window is for",
      "tab_domains": ["domain1.com", "domain2.com", ...],
      "estimated_tab_count": number,
      "priority": "high|medium|low"
    }
  ],
  "specific_actions": [
    {
      "action": "create_new_window|move_tabs|close_duplicates",
      "description": "What to do",
      "tabs_affected": ["domain1.com", "domain2.com", ...],
      "reason": "Why this helps productivity"
    }
  ],
  "productivity_benefits": [
    "Benefit 1",
    "Benefit 2",
    ...
  ]
}"#;

const FOCUS_AREAS: &str = "Focus on practical productivity improvements like grouping by:
- General personal (personal vs work vs side projects)
- distinguish between different work projects/contexts
- Research topics
- Social media/entertainment
- Tools/utilities
- Shopping/commerce
- Documentation/references
etc.";

#[derive(Debug, Clone)]
pub struct AnalysisSettings {
    pub analysis_model: String,
    pub plan_model: String,
    pub plan_temperature: f32,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            analysis_model: DEFAULT_ANALYSIS_MODEL.to_string(),
            plan_model: DEFAULT_PLAN_MODEL.to_string(),
            plan_temperature: 0.2,
        }
    }
}

/// Narrative analysis plus the structured plan, when it parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
    pub narrative: String,
    pub structured: Option<StructuredPlan>,
    /// Structured response text that could not be parsed.
    pub raw_structured: Option<String>,
}

/// Asks the completion service how to regroup a set of windows.
pub struct Analyzer {
    completion: Arc<dyn TextCompletion>,
    settings: AnalysisSettings,
}

impl Analyzer {
    pub fn new(completion: Arc<dyn TextCompletion>, settings: AnalysisSettings) -> Self {
        Self {
            completion,
            settings,
        }
    }

    /// Issues the narrative and the structured request concurrently; neither
    /// depends on the other.
    pub async fn recommend(&self, windows: &[ListedWindow]) -> Result<Recommendation, CompletionError> {
        let total_tabs: usize = windows.iter().map(|w| w.tabs.len()).sum();
        engine_info!(
            "Analyzing {} tabs across {} windows",
            total_tabs,
            windows.len()
        );

        let (narrative, structured) = tokio::join!(
            self.completion.complete(self.narrative_request(windows, total_tabs)),
            self.completion.complete(self.structured_request(windows, total_tabs)),
        );
        let narrative = narrative?;
        let structured = structured?;

        let parsed = serde_json::from_str::<StructuredPlan>(&structured)
            .ok()
            .filter(|plan| !plan.recommended_windows.is_empty())
            .or_else(|| parse_structured_block(&structured));
        match parsed {
            Some(plan) => Ok(Recommendation {
                narrative,
                structured: Some(plan),
                raw_structured: None,
            }),
            None => {
                engine_warn!("Structured plan response could not be parsed; keeping raw text");
                Ok(Recommendation {
                    narrative,
                    structured: None,
                    raw_structured: Some(structured),
                })
            }
        }
    }

    fn narrative_request(&self, windows: &[ListedWindow], total_tabs: usize) -> CompletionRequest {
        let payload: Vec<_> = windows
            .iter()
            .map(|window| {
                let tabs: Vec<_> = window
                    .tabs
                    .iter()
                    .map(|tab| {
                        json!({
                            "title": tab.title,
                            "url": tab.url,
                            "domain": tab.domain,
                            "summary": tab.summary,
                        })
                    })
                    .collect();
                json!({
                    "windowIndex": window.window_index,
                    "tabCount": window.tabs.len(),
                    "tabs": tabs,
                })
            })
            .collect();
        let user = format!(
            "Please analyze these browser tabs across {} windows ({total_tabs} total tabs) and \
             provide reorganization recommendations.\n\nCurrent tab organization:\n{}\n\n\
             Please provide:\n1. Step by step analysis of the current tab patterns\n\
             2. Structured recommendations for reorganizing into logical windows\n\
             3. Specific suggestions for which tabs to group together and why\n\n{FOCUS_AREAS}",
            windows.len(),
            pretty(&payload)
        );
        CompletionRequest::new(
            self.settings.analysis_model.as_str(),
            NARRATIVE_SYSTEM_PROMPT,
            user,
        )
    }

    fn structured_request(&self, windows: &[ListedWindow], total_tabs: usize) -> CompletionRequest {
        let payload: Vec<_> = windows
            .iter()
            .map(|window| {
                let mut domains: Vec<&str> = Vec::new();
                for tab in &window.tabs {
                    if !domains.contains(&tab.domain.as_str()) {
                        domains.push(&tab.domain);
                    }
                }
                let tabs: Vec<_> = window
                    .tabs
                    .iter()
                    .map(|tab| {
                        json!({
                            "title": tab.title,
                            "domain": tab.domain,
                            "category": categorize(&tab.domain, &tab.title),
                        })
                    })
                    .collect();
                json!({
                    "windowIndex": window.window_index,
                    "tabCount": window.tabs.len(),
                    "domains": domains,
                    "tabs": tabs,
                })
            })
            .collect();
        let user = format!(
            "Analyze these {} browser windows with {total_tabs} total tabs:\n\n{}\n\n\
             Provide a structured reorganization plan as JSON.",
            windows.len(),
            pretty(&payload)
        );
        CompletionRequest::new(
            self.settings.plan_model.as_str(),
            STRUCTURED_SYSTEM_PROMPT,
            user,
        )
        .with_temperature(self.settings.plan_temperature)
        .json_object()
    }
}

fn pretty(value: &[serde_json::Value]) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "[]".to_string())
}
