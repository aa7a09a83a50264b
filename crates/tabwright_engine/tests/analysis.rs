use std::sync::{Arc, Mutex};

use pretty_assertions::assert_eq;
use tabwright_core::parse_listing;
use tabwright_engine::{
    AnalysisSettings, Analyzer, CompletionError, CompletionRequest, TextCompletion,
};

const LISTING: &str = "# Tabs Export\n\n\
## Window 1 (2 tabs)\n\
- [Cart](https://shop.example/cart) (shop.example)\n\
- [API reference](https://docs.rs/tokio) (docs.rs) - The **tokio** runtime docs.\n";

/// Answers the narrative and the JSON request differently.
struct SplitCompletion {
    narrative: Result<String, CompletionError>,
    structured: String,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl SplitCompletion {
    fn new(structured: &str) -> Self {
        Self {
            narrative: Ok("Group shopping apart from documentation.".to_string()),
            structured: structured.to_string(),
            requests: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl TextCompletion for SplitCompletion {
    async fn complete(&self, request: CompletionRequest) -> Result<String, CompletionError> {
        let json = request.json_object;
        self.requests.lock().unwrap().push(request);
        if json {
            Ok(self.structured.clone())
        } else {
            self.narrative.clone()
        }
    }
}

const PLAN_JSON: &str = r#"{
  "analysis": {"current_state": "Mixed", "main_issues": [], "identified_patterns": []},
  "recommended_windows": [
    {"window_name": "Shopping", "purpose": "Buy things", "tab_domains": ["shop.example"],
     "estimated_tab_count": 1, "priority": "low"},
    {"window_name": "Docs", "purpose": "Reference", "tab_domains": ["docs.rs"],
     "estimated_tab_count": "1", "priority": "high"}
  ]
}"#;

#[tokio::test]
async fn structured_plan_is_parsed() {
    let completion = Arc::new(SplitCompletion::new(PLAN_JSON));
    let analyzer = Analyzer::new(completion.clone(), AnalysisSettings::default());

    let recommendation = analyzer.recommend(&parse_listing(LISTING)).await.unwrap();

    assert_eq!(
        recommendation.narrative,
        "Group shopping apart from documentation."
    );
    let plan = recommendation.structured.expect("structured plan");
    let names: Vec<&str> = plan
        .recommended_windows
        .iter()
        .map(|w| w.window_name.as_str())
        .collect();
    assert_eq!(names, vec!["Shopping", "Docs"]);
    assert!(recommendation.raw_structured.is_none());
}

#[tokio::test]
async fn requests_use_configured_models() {
    let completion = Arc::new(SplitCompletion::new(PLAN_JSON));
    let analyzer = Analyzer::new(completion.clone(), AnalysisSettings::default());

    analyzer.recommend(&parse_listing(LISTING)).await.unwrap();

    let requests = completion.requests.lock().unwrap();
    assert_eq!(requests.len(), 2);
    let narrative = requests.iter().find(|r| !r.json_object).unwrap();
    let structured = requests.iter().find(|r| r.json_object).unwrap();
    assert_eq!(narrative.model, "gpt-5");
    assert!(narrative.user.contains("2 total tabs"));
    assert!(narrative.user.contains("The **tokio** runtime docs."));
    assert_eq!(structured.model, "gpt-4o");
    assert_eq!(structured.temperature, Some(0.2));
    assert!(structured.user.contains("\"category\": \"shopping\""));
}

#[tokio::test]
async fn unparseable_plan_is_kept_raw() {
    let completion = Arc::new(SplitCompletion::new("Sorry, I cannot produce JSON today."));
    let analyzer = Analyzer::new(completion, AnalysisSettings::default());

    let recommendation = analyzer.recommend(&parse_listing(LISTING)).await.unwrap();

    assert!(recommendation.structured.is_none());
    assert_eq!(
        recommendation.raw_structured.as_deref(),
        Some("Sorry, I cannot produce JSON today.")
    );
}

#[tokio::test]
async fn narrative_failure_is_an_error() {
    let mut completion = SplitCompletion::new(PLAN_JSON);
    completion.narrative = Err(CompletionError::Network("offline".into()));
    let analyzer = Analyzer::new(Arc::new(completion), AnalysisSettings::default());

    let err = analyzer
        .recommend(&parse_listing(LISTING))
        .await
        .unwrap_err();
    assert_eq!(err, CompletionError::Network("offline".into()));
}
