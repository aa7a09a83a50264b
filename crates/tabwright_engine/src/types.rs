use std::fmt;
use std::time::Duration;

use engine_logging::{engine_debug, engine_info, engine_warn};
use tabwright_core::{FetchStatus, RunReport};

use crate::retry::RetryTrack;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Reading,
    Summarizing,
}

/// Position of the current item within a pipeline run, 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemProgress {
    pub current: usize,
    pub total: usize,
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Stage {
        item: ItemProgress,
        stage: Stage,
    },
    Retrying {
        item: ItemProgress,
        track: RetryTrack,
        attempt: u32,
        delay: Duration,
        error: String,
    },
    ItemCompleted {
        item: ItemProgress,
        status: FetchStatus,
        summary_generated: bool,
    },
    CheckpointSaved {
        processed: usize,
        total: usize,
    },
    RunCompleted(RunReport),
}

/// Receives progress events from the fetcher and the pipeline runner.
pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

/// Drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn emit(&self, _event: EngineEvent) {}
}

/// Turns events into log lines.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl ProgressSink for LogSink {
    fn emit(&self, event: EngineEvent) {
        match event {
            EngineEvent::Stage { item, stage } => match stage {
                Stage::Reading => engine_info!(
                    "[{}/{}] Reading: {} {}",
                    item.current,
                    item.total,
                    clip(&item.url, 40),
                    clip(&item.title, 50)
                ),
                Stage::Summarizing => engine_info!(
                    "[{}/{}] Summarizing: {}",
                    item.current,
                    item.total,
                    clip(&item.title, 50)
                ),
            },
            EngineEvent::Retrying {
                item,
                track,
                attempt,
                delay,
                error,
            } => engine_warn!(
                "[{}/{}] {} failed ({}), {} retry {} in {:.1}s",
                item.current,
                item.total,
                clip(&item.url, 50),
                error,
                track,
                attempt,
                delay.as_secs_f64()
            ),
            EngineEvent::ItemCompleted {
                item,
                status,
                summary_generated,
            } => engine_debug!(
                "[{}/{}] {:?}{}",
                item.current,
                item.total,
                status,
                if summary_generated { " with summary" } else { "" }
            ),
            EngineEvent::CheckpointSaved { processed, total } => engine_info!(
                "Progress saved: {}/{} ({:.1}%)",
                processed,
                total,
                processed as f64 * 100.0 / total.max(1) as f64
            ),
            EngineEvent::RunCompleted(report) => engine_info!(
                "Processing complete: {} read, {} summarized, {} skipped, {} failed",
                report.succeeded,
                report.summarized,
                report.skipped,
                report.failed
            ),
        }
    }
}

fn clip(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let head: String = text.chars().take(max_chars).collect();
        format!("{head}...")
    }
}

/// Failure from the content reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self.kind {
            FailureKind::HttpStatus(code) => Some(code),
            _ => None,
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            FailureKind::HttpStatus(code) => write!(f, "HTTP {code}: {}", self.message),
            _ => write!(f, "{}: {}", self.kind, self.message),
        }
    }
}

impl std::error::Error for FetchError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::Network => write!(f, "network error"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_display_carries_code() {
        let err = FetchError::new(FailureKind::HttpStatus(503), "Service Unavailable");
        assert_eq!(err.to_string(), "HTTP 503: Service Unavailable");
        assert_eq!(err.status(), Some(503));
        assert_eq!(FetchError::new(FailureKind::Timeout, "x").status(), None);
    }

    #[test]
    fn clip_respects_char_boundaries() {
        assert_eq!(clip("héllo wörld", 5), "héllo...");
        assert_eq!(clip("short", 10), "short");
    }
}
