use std::fmt;

use url::Url;

/// Hosts that need a login, are inherently empty, or reliably block readers.
/// Subdomains are blocked too.
const BLOCKED_HOSTS: &[&str] = &[
    // code hosting answers readers with 451
    "github.com",
    "gitlab.com",
    "bitbucket.org",
    // mail
    "gmail.com",
    "outlook.com",
    "yahoo.com",
    // sign-in
    "accounts.google.com",
    "login.microsoftonline.com",
    // auth walls
    "quora.com",
    "facebook.com",
    "instagram.com",
    "tiktok.com",
    // the reader itself
    "r.jina.ai",
    // calendars
    "calendar.google.com",
    "calendly.com",
    "httpstatuses.com",
    "httpstatus.io",
    // local development
    "localhost",
    "127.0.0.1",
    "0.0.0.0",
    // new tab pages
    "newtab",
    "new-tab",
    "start.duckduckgo.com",
    // file sharing
    "drive.google.com",
    "dropbox.com",
    "onedrive.live.com",
    "icloud.com",
];

/// Prefixes matched against the raw URL and against the URL without its
/// scheme, so both pseudo-schemes and path-scoped entries work.
const BLOCKED_PREFIXES: &[&str] = &[
    "about:blank",
    "about:config",
    "chrome://",
    "chrome-extension://",
    "moz-extension://",
    "github.com/login",
    "twitter.com/login",
    "facebook.com/login",
    "x.com/login",
    "linkedin.com/login",
    "medium.com/m/signin",
    "youtube.com/signin",
    "www.google.com/maps",
    "outlook.live.com/calendar",
    "amazon.com/gp/cart",
    "amazon.com/ap/signin",
    "ebay.com/signin",
    "paypal.com/signin",
];

const SKIPPED_EXTENSIONS: &[&str] = &[
    ".pdf", ".doc", ".docx", ".xls", ".xlsx", ".ppt", ".pptx", ".zip", ".rar", ".tar", ".gz",
    ".mp4", ".avi", ".mov", ".mp3", ".wav", ".jpg", ".jpeg", ".png", ".gif", ".svg", ".webp",
];

/// Immutable blocklist configuration injected into [`DomainFilter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterConfig {
    pub blocked_hosts: Vec<String>,
    pub blocked_prefixes: Vec<String>,
    pub skipped_extensions: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            blocked_hosts: to_owned_list(BLOCKED_HOSTS),
            blocked_prefixes: to_owned_list(BLOCKED_PREFIXES),
            skipped_extensions: to_owned_list(SKIPPED_EXTENSIONS),
        }
    }
}

impl FilterConfig {
    /// A configuration that blocks nothing.
    pub fn empty() -> Self {
        Self {
            blocked_hosts: Vec::new(),
            blocked_prefixes: Vec::new(),
            skipped_extensions: Vec::new(),
        }
    }
}

fn to_owned_list(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Host or prefix is on the blocklist.
    Blocklisted,
    /// URL does not parse or has no host to fetch from.
    Unaddressable,
    /// URL points at a document, archive, media or image file.
    NonTextContent,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Blocklisted => write!(f, "Domain skipped"),
            SkipReason::Unaddressable => write!(f, "Unaddressable URL"),
            SkipReason::NonTextContent => write!(f, "Content type skipped"),
        }
    }
}

/// Pure predicate deciding whether a URL is worth fetching.
#[derive(Debug, Clone, Default)]
pub struct DomainFilter {
    config: FilterConfig,
}

impl DomainFilter {
    pub fn new(config: FilterConfig) -> Self {
        let normalize = |items: Vec<String>| {
            items
                .into_iter()
                .map(|item| item.trim().to_ascii_lowercase())
                .filter(|item| !item.is_empty())
                .collect()
        };
        Self {
            config: FilterConfig {
                blocked_hosts: normalize(config.blocked_hosts),
                blocked_prefixes: normalize(config.blocked_prefixes),
                skipped_extensions: normalize(config.skipped_extensions),
            },
        }
    }

    pub fn should_skip(&self, url: &str) -> bool {
        self.skip_reason(url).is_some()
    }

    /// Why a URL is skipped, or `None` when it should be fetched.
    ///
    /// Blocklist prefixes are checked before parsing so pseudo-scheme pages
    /// report as blocklisted rather than unaddressable.
    pub fn skip_reason(&self, url: &str) -> Option<SkipReason> {
        let lower = url.trim().to_ascii_lowercase();
        if self.matches_prefix(&lower) {
            return Some(SkipReason::Blocklisted);
        }

        let parsed = match Url::parse(&lower) {
            Ok(parsed) => parsed,
            Err(_) => return Some(SkipReason::Unaddressable),
        };
        let host = match parsed.host_str() {
            Some(host) if !host.is_empty() => host.to_string(),
            _ => return Some(SkipReason::Unaddressable),
        };

        if self.matches_host(&host) {
            return Some(SkipReason::Blocklisted);
        }
        if self.has_skipped_extension(parsed.path()) {
            return Some(SkipReason::NonTextContent);
        }
        None
    }

    fn matches_prefix(&self, lower_url: &str) -> bool {
        let without_scheme = lower_url
            .split_once("://")
            .map(|(_, rest)| rest)
            .unwrap_or(lower_url);
        self.config
            .blocked_prefixes
            .iter()
            .any(|prefix| lower_url.starts_with(prefix) || without_scheme.starts_with(prefix))
    }

    fn matches_host(&self, host: &str) -> bool {
        self.config.blocked_hosts.iter().any(|blocked| {
            host == blocked
                || host
                    .strip_suffix(blocked.as_str())
                    .is_some_and(|rest| rest.ends_with('.'))
        })
    }

    fn has_skipped_extension(&self, path: &str) -> bool {
        self.config
            .skipped_extensions
            .iter()
            .any(|ext| path.ends_with(ext.as_str()))
    }
}
