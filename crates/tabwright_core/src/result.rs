use serde::{Deserialize, Serialize};

use crate::tab::TabRef;

pub const TOO_LITTLE_CONTENT: &str = "Too little content";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FetchStatus {
    Success,
    Skipped,
    Failed,
}

/// Outcome of processing one tab.
///
/// Built only through the constructors below so that `Success` always carries
/// at least the minimum word count and a generated summary implies `Success`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchResult {
    pub tab: TabRef,
    /// Fetched text, truncated to the word budget. Not persisted in resume state.
    #[serde(skip)]
    pub content: String,
    /// Word count of the untruncated text.
    pub word_count: usize,
    pub status: FetchStatus,
    pub skip_reason: Option<String>,
    pub summary: Option<String>,
    pub summary_generated: bool,
    pub last_error: Option<String>,
    pub summary_error: Option<String>,
}

impl FetchResult {
    pub fn skipped(tab: TabRef, reason: impl Into<String>, word_count: usize) -> Self {
        Self {
            tab,
            content: String::new(),
            word_count,
            status: FetchStatus::Skipped,
            skip_reason: Some(reason.into()),
            summary: None,
            summary_generated: false,
            last_error: None,
            summary_error: None,
        }
    }

    pub fn failed(tab: TabRef, error: impl Into<String>) -> Self {
        Self {
            tab,
            content: String::new(),
            word_count: 0,
            status: FetchStatus::Failed,
            skip_reason: None,
            summary: None,
            summary_generated: false,
            last_error: Some(error.into()),
            summary_error: None,
        }
    }

    /// Fetched content without a summary. Falls back to `Skipped` when the
    /// word count is below `min_words`.
    pub fn fetched(tab: TabRef, content: String, word_count: usize, min_words: usize) -> Self {
        if word_count < min_words {
            return Self::skipped(tab, TOO_LITTLE_CONTENT, word_count);
        }
        Self {
            tab,
            content,
            word_count,
            status: FetchStatus::Success,
            skip_reason: None,
            summary: None,
            summary_generated: false,
            last_error: None,
            summary_error: None,
        }
    }

    /// Attaches a summary. Ignored unless the result is a `Success`.
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        if self.status == FetchStatus::Success {
            self.summary = Some(summary.into());
            self.summary_generated = true;
            self.summary_error = None;
        }
        self
    }

    /// Records a summarization failure without touching the fetch status.
    pub fn with_summary_error(mut self, error: impl Into<String>) -> Self {
        self.summary_generated = false;
        self.summary = None;
        self.summary_error = Some(error.into());
        self
    }

    /// Same result, re-addressed to a fresher snapshot of the same tab.
    pub fn relocated(mut self, tab: &TabRef) -> Self {
        self.tab = tab.clone();
        self
    }

    pub fn is_success(&self) -> bool {
        self.status == FetchStatus::Success
    }

    pub fn is_failed(&self) -> bool {
        self.status == FetchStatus::Failed
    }

    /// Text shown after the link in listing documents, if any.
    pub fn annotation(&self) -> Option<Annotation<'_>> {
        match self.status {
            FetchStatus::Success => self
                .summary
                .as_deref()
                .filter(|_| self.summary_generated)
                .map(Annotation::Summary),
            FetchStatus::Skipped => Some(Annotation::Note(
                self.skip_reason.as_deref().unwrap_or("Skipped"),
            )),
            FetchStatus::Failed => Some(Annotation::Note(
                self.last_error.as_deref().unwrap_or("Content unavailable"),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Annotation<'a> {
    Summary(&'a str),
    Note(&'a str),
}
