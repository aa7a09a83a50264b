use std::fmt;

use serde::Serialize;

/// Coarse keyword category, sent along with tabs as a hint for plan generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TabCategory {
    Work,
    Development,
    Social,
    Shopping,
    Reading,
    General,
}

impl fmt::Display for TabCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TabCategory::Work => "work",
            TabCategory::Development => "development",
            TabCategory::Social => "social",
            TabCategory::Shopping => "shopping",
            TabCategory::Reading => "reading",
            TabCategory::General => "general",
        };
        write!(f, "{name}")
    }
}

const WORK_DOMAINS: &[&str] = &["slack", "notion", "trello", "asana", "zoom", "teams"];
const DEV_DOMAINS: &[&str] = &["github", "stackoverflow", "docs"];
const DEV_TITLES: &[&str] = &["api", "documentation"];
const SOCIAL_DOMAINS: &[&str] = &["twitter", "facebook", "instagram", "youtube", "tiktok", "reddit"];
const SHOPPING_DOMAINS: &[&str] = &["amazon", "ebay", "shop"];
const SHOPPING_TITLES: &[&str] = &["cart", "checkout"];
const READING_DOMAINS: &[&str] = &["news", "medium", "blog", "article"];

/// First matching rule wins, in the order work, development, social,
/// shopping, reading.
pub fn categorize(domain: &str, title: &str) -> TabCategory {
    let domain = domain.to_ascii_lowercase();
    let title = title.to_lowercase();
    let any = |haystack: &str, needles: &[&str]| needles.iter().any(|n| haystack.contains(n));

    if any(&domain, WORK_DOMAINS) {
        TabCategory::Work
    } else if any(&domain, DEV_DOMAINS) || any(&title, DEV_TITLES) {
        TabCategory::Development
    } else if any(&domain, SOCIAL_DOMAINS) {
        TabCategory::Social
    } else if any(&domain, SHOPPING_DOMAINS) || any(&title, SHOPPING_TITLES) {
        TabCategory::Shopping
    } else if any(&domain, READING_DOMAINS) {
        TabCategory::Reading
    } else {
        TabCategory::General
    }
}
