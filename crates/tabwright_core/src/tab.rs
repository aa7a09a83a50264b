use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

/// Stable identity of a browser window, as reported by the browser itself.
///
/// Unlike a window position this survives other windows being created,
/// closed or re-ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowId(pub u64);

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One open tab as seen by the browser at one instant.
///
/// `window_position` and `tab_position` are 1-based and only valid until the
/// next mutating call against the browser. `url` is the only key that can be
/// used to find the same tab again later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabRef {
    pub title: String,
    pub url: String,
    pub window_position: u32,
    pub tab_position: u32,
    #[serde(default)]
    pub window_id: Option<WindowId>,
}

impl TabRef {
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        window_position: u32,
        tab_position: u32,
    ) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            window_position,
            tab_position,
            window_id: None,
        }
    }

    pub fn with_window_id(mut self, window_id: WindowId) -> Self {
        self.window_id = Some(window_id);
        self
    }

    /// Lowercased host of the tab URL, if it has one.
    pub fn host(&self) -> Option<String> {
        host_of(&self.url)
    }

    /// Host for display purposes; `unknown` when the URL has none.
    pub fn display_domain(&self) -> String {
        display_domain(&self.url)
    }
}

pub fn host_of(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(str::to_ascii_lowercase))
        .filter(|host| !host.is_empty())
}

pub fn display_domain(url: &str) -> String {
    host_of(url).unwrap_or_else(|| "unknown".to_string())
}

/// Number of distinct windows in a tab list.
pub fn window_count(tabs: &[TabRef]) -> usize {
    let mut positions: Vec<u32> = tabs.iter().map(|tab| tab.window_position).collect();
    positions.sort_unstable();
    positions.dedup();
    positions.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_is_lowercased() {
        assert_eq!(host_of("https://Docs.Example.COM/x"), Some("docs.example.com".into()));
    }

    #[test]
    fn hostless_urls_display_unknown() {
        assert_eq!(display_domain("about:blank"), "unknown");
        assert_eq!(display_domain("not a url"), "unknown");
    }

    #[test]
    fn window_count_ignores_tab_order() {
        let tabs = vec![
            TabRef::new("a", "https://a", 2, 1),
            TabRef::new("b", "https://b", 1, 1),
            TabRef::new("c", "https://c", 2, 2),
        ];
        assert_eq!(window_count(&tabs), 2);
    }
}
