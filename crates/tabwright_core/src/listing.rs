//! Tab listing documents: the fast dump, the full export and the checkpoint
//! all share one line format so any of them can be parsed back.
//!
//! ```text
//! ## Window 1 (2 tabs)
//!
//! - [Title](https://example.com/a) (example.com) - Summary text
//! - [Other](https://example.com/b) (example.com) - *Domain skipped*
//! ```

use std::collections::BTreeSet;
use std::fmt::Write;
use std::sync::LazyLock;

use regex::Regex;

use crate::report::{RunReport, WindowGroup};
use crate::result::{Annotation, FetchResult};
use crate::tab::{display_domain, window_count, TabRef};

static WINDOW_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^#{1,6}\s*(?:\*\*)?Window (\d+)(?:\*\*)?\s*\((\d+) tabs?\)")
        .expect("valid window heading regex")
});

static WINDOW_BULLET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*-?\s*\*\*Window (\d+)\*\*\s*\((\d+) tabs?\)")
        .expect("valid window bullet regex")
});

static TAB_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:-|\d+\.)\s*\[((?:\\.|[^\]\\])*)\]\((\S+)\)\s+\(([^()]*)\)(?:\s+-\s+(.+?))?\s*$")
        .expect("valid tab line regex")
});

static BARE_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https?://[^\s<>"`]+"#).expect("valid url regex"));

/// One window recovered from a listing document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedWindow {
    pub window_index: u32,
    pub declared_tab_count: usize,
    pub tabs: Vec<ListedTab>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedTab {
    pub title: String,
    pub url: String,
    pub domain: String,
    pub summary: Option<String>,
    /// Italic skip or failure note, e.g. `*Domain skipped*`.
    pub note: Option<String>,
}

pub fn render_fast_listing(tabs: &[TabRef], generated_at: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Tabs Fast Dump - {generated_at}\n");
    let _ = writeln!(
        out,
        "**{} tabs across {} windows**\n",
        tabs.len(),
        window_count(tabs)
    );

    let mut current_window = None;
    let mut window_tabs: Vec<&TabRef> = Vec::new();
    for tab in tabs {
        if current_window.is_some_and(|window| window != tab.window_position) {
            push_window(&mut out, current_window.unwrap_or_default(), &window_tabs);
            window_tabs.clear();
        }
        current_window = Some(tab.window_position);
        window_tabs.push(tab);
    }
    if let Some(window) = current_window {
        push_window(&mut out, window, &window_tabs);
    }
    out
}

fn push_window(out: &mut String, window_index: u32, tabs: &[&TabRef]) {
    push_window_heading(out, window_index, tabs.len());
    for tab in tabs {
        out.push_str(&tab_line(&tab.title, &tab.url, None));
        out.push('\n');
    }
    out.push('\n');
}

fn push_window_heading(out: &mut String, window_index: u32, tab_count: usize) {
    let noun = if tab_count == 1 { "tab" } else { "tabs" };
    let _ = writeln!(out, "## Window {window_index} ({tab_count} {noun})\n");
}

pub fn render_export(groups: &[WindowGroup], report: &RunReport, generated_at: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Tabs Export - {generated_at}\n");
    let _ = writeln!(
        out,
        "**{} tabs across {} windows**",
        report.total,
        groups.len()
    );
    let _ = writeln!(out, "- Content read: {} tabs", report.succeeded);
    let _ = writeln!(out, "- Skipped: {} tabs", report.skipped);
    let _ = writeln!(out, "- Failed: {} tabs", report.failed);
    let _ = writeln!(out, "- Summaries generated: {} tabs\n", report.summarized);
    push_groups(&mut out, groups);
    out
}

/// Full re-render of everything processed so far.
pub fn render_checkpoint(
    results: &[FetchResult],
    processed: usize,
    total: usize,
    generated_at: &str,
) -> String {
    let report = RunReport::from_results(results);
    let mut out = String::new();
    let _ = writeln!(out, "# Tabs Progress - {generated_at}\n");
    let _ = writeln!(out, "Progress: {processed}/{total} tabs processed");
    let _ = writeln!(
        out,
        "Successful: {}, Skipped: {}, Failed: {}, Summaries: {}\n",
        report.succeeded, report.skipped, report.failed, report.summarized
    );
    let groups = crate::report::group_by_window(results.to_vec());
    push_groups(&mut out, &groups);
    out
}

fn push_groups(out: &mut String, groups: &[WindowGroup]) {
    for group in groups {
        push_window_heading(out, group.window_index, group.tabs.len());
        for result in &group.tabs {
            out.push_str(&tab_line(
                &result.tab.title,
                &result.tab.url,
                result.annotation(),
            ));
            out.push('\n');
        }
        out.push('\n');
    }
}

/// `- [title](url) (domain)` with an optional ` - summary` or ` - *note*`.
pub fn tab_line(title: &str, url: &str, annotation: Option<Annotation<'_>>) -> String {
    let mut line = format!(
        "- [{}]({}) ({})",
        escape_title(title),
        url.trim(),
        display_domain(url)
    );
    match annotation {
        Some(Annotation::Summary(summary)) => {
            let summary = single_line(summary);
            if is_italic_note(&summary) {
                // Same emphasis, but read back as a summary.
                let inner = &summary[1..summary.len() - 1];
                let _ = write!(line, " - _{inner}_");
            } else {
                let _ = write!(line, " - {summary}");
            }
        }
        Some(Annotation::Note(note)) => {
            let _ = write!(line, " - *{}*", single_line(note).replace('*', ""));
        }
        None => {}
    }
    line
}

fn escape_title(title: &str) -> String {
    let title = single_line(title);
    let title = if title.is_empty() { "untitled".to_string() } else { title };
    let mut escaped = String::with_capacity(title.len());
    for c in title.chars() {
        if matches!(c, '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn unescape_title(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    let mut chars = title.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parses a listing document back into windows.
///
/// Accepts both `## Window N (k tabs)` and `- **Window N** (k tabs)` headers.
/// Tab lines before the first header are ignored.
pub fn parse_listing(markdown: &str) -> Vec<ListedWindow> {
    let mut windows: Vec<ListedWindow> = Vec::new();

    for line in markdown.lines() {
        let header = WINDOW_HEADING
            .captures(line)
            .or_else(|| WINDOW_BULLET.captures(line));
        if let Some(caps) = header {
            windows.push(ListedWindow {
                window_index: caps[1].parse().unwrap_or(0),
                declared_tab_count: caps[2].parse().unwrap_or(0),
                tabs: Vec::new(),
            });
            continue;
        }

        let Some(window) = windows.last_mut() else {
            continue;
        };
        if let Some(caps) = TAB_LINE.captures(line) {
            let trailing = caps.get(4).map(|m| m.as_str().trim().to_string());
            let (summary, note) = match trailing {
                Some(text) if is_italic_note(&text) => {
                    (None, Some(text.trim_matches('*').trim().to_string()))
                }
                Some(text) if !text.is_empty() => (Some(text), None),
                _ => (None, None),
            };
            window.tabs.push(ListedTab {
                title: unescape_title(caps[1].trim()),
                url: caps[2].trim().to_string(),
                domain: caps[3].trim().to_string(),
                summary,
                note,
            });
        }
    }

    windows
}

/// Notes are written as one italic span with every `*` stripped from the
/// text, so anything with an inner `*` is a summary.
fn is_italic_note(text: &str) -> bool {
    text.len() > 2
        && text.starts_with('*')
        && text.ends_with('*')
        && !text[1..text.len() - 1].contains('*')
}

/// Converts a live tab snapshot into the same shape a parsed listing has.
pub fn listed_windows_from_tabs(tabs: &[TabRef]) -> Vec<ListedWindow> {
    let mut windows: Vec<ListedWindow> = Vec::new();
    for tab in tabs {
        let listed = ListedTab {
            title: tab.title.clone(),
            url: tab.url.clone(),
            domain: tab.display_domain(),
            summary: None,
            note: None,
        };
        match windows
            .iter_mut()
            .find(|window| window.window_index == tab.window_position)
        {
            Some(window) => {
                window.tabs.push(listed);
                window.declared_tab_count += 1;
            }
            None => windows.push(ListedWindow {
                window_index: tab.window_position,
                declared_tab_count: 1,
                tabs: vec![listed],
            }),
        }
    }
    windows
}

/// Every URL a document mentions: listing lines, markdown links and bare
/// `http(s)` URLs.
pub fn extract_kept_urls(markdown: &str) -> BTreeSet<String> {
    let mut urls: BTreeSet<String> = parse_listing(markdown)
        .into_iter()
        .flat_map(|window| window.tabs)
        .map(|tab| tab.url)
        .collect();

    for found in BARE_URL.find_iter(markdown) {
        let url = trim_url_tail(found.as_str());
        if !url.is_empty() {
            urls.insert(url.to_string());
        }
    }
    urls
}

/// Drops trailing punctuation and closing parens that belong to the
/// surrounding markdown rather than the URL.
fn trim_url_tail(url: &str) -> &str {
    let mut end = url.len();
    loop {
        let current = &url[..end];
        let Some(last) = current.chars().last() else {
            break;
        };
        let trim = match last {
            ')' => current.matches(')').count() > current.matches('(').count(),
            ']' => current.matches(']').count() > current.matches('[').count(),
            '.' | ',' | ';' | ':' | '!' | '?' | '*' | '\'' => true,
            _ => false,
        };
        if !trim {
            break;
        }
        end -= last.len_utf8();
    }
    &url[..end]
}

/// Open tabs whose URL is not in `kept`, in enumeration order.
pub fn tabs_to_close(current: &[TabRef], kept: &BTreeSet<String>) -> Vec<TabRef> {
    current
        .iter()
        .filter(|tab| !kept.contains(&tab.url))
        .cloned()
        .collect()
}
