use std::collections::HashSet;
use std::fmt;

use crate::plan::{UrlChoice, WindowRecommendation};
use crate::tab::TabRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowAction {
    CreateNewWindow,
    UseExistingWindow,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    Domains(Vec<String>),
    Urls(Vec<UrlChoice>),
}

/// One planned destination window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReorgTarget {
    pub name: String,
    pub purpose: String,
    pub priority: String,
    pub action: WindowAction,
    /// 1-based window position to reuse, read right before execution starts.
    pub existing_window_index: Option<u32>,
    pub selector: Selector,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Exact,
    Subdomain,
    Substring,
}

impl fmt::Display for MatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchKind::Exact => write!(f, "exact"),
            MatchKind::Subdomain => write!(f, "subdomain"),
            MatchKind::Substring => write!(f, "substring"),
        }
    }
}

/// Why a tab was selected for a target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchedBy {
    Pattern { pattern: String, kind: MatchKind },
    Url { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedTab {
    pub tab: TabRef,
    pub matched_by: MatchedBy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedTarget {
    pub target: ReorgTarget,
    /// Tabs to move, in the order they will be moved.
    pub tabs: Vec<PlannedTab>,
    /// Explicit URLs that matched no open tab.
    pub unresolved_urls: Vec<String>,
}

/// Executable plan plus what it left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Plan {
    pub targets: Vec<PlannedTarget>,
    pub unmatched: Vec<TabRef>,
}

impl Plan {
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn tab_count(&self) -> usize {
        self.targets.iter().map(|t| t.tabs.len()).sum()
    }

    pub fn new_window_count(&self) -> usize {
        self.targets
            .iter()
            .filter(|t| t.target.action == WindowAction::CreateNewWindow)
            .count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannerOptions {
    /// Window position reused by the first recommendation of the plan; every
    /// later recommendation gets a new window. `None` creates windows for all.
    pub reuse_window: Option<u32>,
}

impl Default for PlannerOptions {
    fn default() -> Self {
        Self {
            reuse_window: Some(1),
        }
    }
}

/// Turns window recommendations into an executable [`Plan`]. Performs no IO.
#[derive(Debug, Clone, Default)]
pub struct Planner {
    options: PlannerOptions,
}

impl Planner {
    pub fn new(options: PlannerOptions) -> Self {
        Self { options }
    }

    /// Each tab is assigned to the first target that selects it. Targets that
    /// select nothing are dropped.
    pub fn plan(&self, current_tabs: &[TabRef], recommendations: &[WindowRecommendation]) -> Plan {
        let mut claimed: HashSet<usize> = HashSet::new();
        let mut targets = Vec::new();

        for (index, recommendation) in recommendations.iter().enumerate() {
            let target = self.target_for(index, recommendation);
            let (tabs, unresolved_urls) = match &target.selector {
                Selector::Domains(patterns) => {
                    (select_by_patterns(current_tabs, patterns, &mut claimed), Vec::new())
                }
                Selector::Urls(choices) => select_by_urls(current_tabs, choices, &mut claimed),
            };
            if tabs.is_empty() {
                continue;
            }
            targets.push(PlannedTarget {
                target,
                tabs,
                unresolved_urls,
            });
        }

        let unmatched = current_tabs
            .iter()
            .enumerate()
            .filter(|(i, _)| !claimed.contains(i))
            .map(|(_, tab)| tab.clone())
            .collect();

        Plan { targets, unmatched }
    }

    fn target_for(&self, index: usize, recommendation: &WindowRecommendation) -> ReorgTarget {
        let (action, existing_window_index) = match self.options.reuse_window {
            Some(window) if index == 0 => (WindowAction::UseExistingWindow, Some(window)),
            _ => (WindowAction::CreateNewWindow, None),
        };
        let selector = if recommendation.tabs.is_empty() {
            Selector::Domains(recommendation.tab_domains.clone())
        } else {
            Selector::Urls(recommendation.tabs.clone())
        };
        ReorgTarget {
            name: recommendation.window_name.trim().to_string(),
            purpose: recommendation.purpose.clone(),
            priority: recommendation.priority.clone(),
            action,
            existing_window_index,
            selector,
        }
    }
}

fn select_by_patterns(
    tabs: &[TabRef],
    patterns: &[String],
    claimed: &mut HashSet<usize>,
) -> Vec<PlannedTab> {
    let patterns: Vec<(String, String)> = patterns
        .iter()
        .filter_map(|raw| normalize_pattern(raw).map(|p| (raw.clone(), p)))
        .collect();

    let mut selected = Vec::new();
    for (index, tab) in tabs.iter().enumerate() {
        if claimed.contains(&index) {
            continue;
        }
        let Some(host) = tab.host() else {
            continue;
        };
        let hit = patterns
            .iter()
            .find_map(|(raw, pattern)| match_domain(&host, pattern).map(|kind| (raw, kind)));
        if let Some((raw, kind)) = hit {
            claimed.insert(index);
            selected.push(PlannedTab {
                tab: tab.clone(),
                matched_by: MatchedBy::Pattern {
                    pattern: raw.clone(),
                    kind,
                },
            });
        }
    }
    selected
}

fn select_by_urls(
    tabs: &[TabRef],
    choices: &[UrlChoice],
    claimed: &mut HashSet<usize>,
) -> (Vec<PlannedTab>, Vec<String>) {
    let mut selected = Vec::new();
    let mut unresolved = Vec::new();
    for choice in choices {
        let url = choice.url.trim();
        let found = tabs
            .iter()
            .enumerate()
            .find(|(index, tab)| !claimed.contains(index) && tab.url == url);
        match found {
            Some((index, tab)) => {
                claimed.insert(index);
                selected.push(PlannedTab {
                    tab: tab.clone(),
                    matched_by: MatchedBy::Url {
                        reason: choice.reason.clone(),
                    },
                });
            }
            None => unresolved.push(url.to_string()),
        }
    }
    (selected, unresolved)
}

/// Lowercases a domain pattern and strips any scheme or path. Blank
/// patterns yield `None` since they would match every host.
pub fn normalize_pattern(raw: &str) -> Option<String> {
    let lower = raw.trim().to_ascii_lowercase();
    let without_scheme = lower
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(&lower);
    let host = without_scheme
        .split('/')
        .next()
        .unwrap_or_default()
        .trim_matches('.');
    if host.is_empty() {
        None
    } else {
        Some(host.to_string())
    }
}

/// Host matches a pattern when equal, a subdomain of it, or containing it.
/// The substring rule over-matches (`docs` hits `mydocs-example.com`).
pub fn match_domain(host: &str, pattern: &str) -> Option<MatchKind> {
    if host == pattern {
        Some(MatchKind::Exact)
    } else if host.ends_with(&format!(".{pattern}")) {
        Some(MatchKind::Subdomain)
    } else if host.contains(pattern) {
        Some(MatchKind::Substring)
    } else {
        None
    }
}
