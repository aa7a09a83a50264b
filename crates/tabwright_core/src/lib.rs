//! Tabwright core: pure tab model, filtering, documents and planning.
mod category;
mod filter;
mod listing;
mod plan;
mod planner;
mod report;
mod result;
mod tab;

pub use category::{categorize, TabCategory};
pub use filter::{DomainFilter, FilterConfig, SkipReason};
pub use listing::{
    extract_kept_urls, listed_windows_from_tabs, parse_listing, render_checkpoint, render_export,
    render_fast_listing, tab_line, tabs_to_close, ListedTab, ListedWindow,
};
pub use plan::{
    parse_heading_text, parse_plan_document, parse_structured_block, render_plan_document,
    PlanAnalysis, PlanDocument, PlanError, PlanSource, SpecificAction, StructuredPlan, UrlChoice,
    WindowRecommendation,
};
pub use planner::{
    match_domain, normalize_pattern, MatchKind, MatchedBy, Plan, PlannedTab, PlannedTarget,
    Planner, PlannerOptions, ReorgTarget, Selector, WindowAction,
};
pub use report::{group_by_window, RunReport, WindowGroup};
pub use result::{Annotation, FetchResult, FetchStatus, TOO_LITTLE_CONTENT};
pub use tab::{display_domain, host_of, window_count, TabRef, WindowId};
