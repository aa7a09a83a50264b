use std::sync::Arc;

use engine_logging::{engine_debug, engine_warn};
use tabwright_core::{DomainFilter, FetchResult, TabRef};

use crate::completion::{CompletionRequest, TextCompletion};
use crate::reader::ContentReader;
use crate::retry::RetryPolicy;
use crate::types::{EngineEvent, ItemProgress, ProgressSink, Stage};

pub const DEFAULT_SUMMARY_MODEL: &str = "gpt-5-nano";

const SUMMARY_SYSTEM_PROMPT: &str = "You are a helpful assistant that creates concise summaries \
of web page content. Provide a 1 sentence (max 2) summary focusing on the main topic and key \
points for the user. Use markdown formatting to **bold** key names and topics, and *italicize* \
key numbers and direct quotes, but don't use bullet points. Be specific and concise and avoid \
tropes and vague fluff.";

#[derive(Debug, Clone)]
pub struct FetcherSettings {
    /// Words kept from the fetched text.
    pub word_limit: usize,
    /// Below this many words the tab is skipped.
    pub min_words: usize,
    /// From this many words on a summary is requested.
    pub summary_min_words: usize,
    /// Characters of content sent with the summary request.
    pub summary_max_chars: usize,
    pub summary_model: String,
    pub retry: RetryPolicy,
}

impl Default for FetcherSettings {
    fn default() -> Self {
        Self {
            word_limit: 30_000,
            min_words: 100,
            summary_min_words: 200,
            summary_max_chars: 10_000,
            summary_model: DEFAULT_SUMMARY_MODEL.to_string(),
            retry: RetryPolicy::default(),
        }
    }
}

/// Produces one [`FetchResult`] per tab: filter, read with retries, then
/// summarize when there is enough text.
pub struct ResilientFetcher {
    filter: DomainFilter,
    reader: Arc<dyn ContentReader>,
    summarizer: Arc<dyn TextCompletion>,
    settings: FetcherSettings,
}

impl ResilientFetcher {
    pub fn new(
        filter: DomainFilter,
        reader: Arc<dyn ContentReader>,
        summarizer: Arc<dyn TextCompletion>,
        settings: FetcherSettings,
    ) -> Self {
        Self {
            filter,
            reader,
            summarizer,
            settings,
        }
    }

    pub async fn fetch(
        &self,
        tab: &TabRef,
        item: &ItemProgress,
        sink: &dyn ProgressSink,
    ) -> FetchResult {
        if let Some(reason) = self.filter.skip_reason(&tab.url) {
            engine_debug!("Skipping {}: {}", tab.url, reason);
            return FetchResult::skipped(tab.clone(), reason.to_string(), 0);
        }

        let mut attempt = 0;
        let text = loop {
            sink.emit(EngineEvent::Stage {
                item: item.clone(),
                stage: Stage::Reading,
            });
            match self.reader.extract(&tab.url).await {
                Ok(text) => break text,
                Err(err) => match self.settings.retry.next_delay(&err, attempt) {
                    Some((track, delay)) => {
                        sink.emit(EngineEvent::Retrying {
                            item: item.clone(),
                            track,
                            attempt: attempt + 1,
                            delay,
                            error: err.to_string(),
                        });
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                    }
                    None => {
                        engine_warn!("Failed to fetch content for {}: {}", tab.url, err);
                        return FetchResult::failed(tab.clone(), err.to_string());
                    }
                },
            }
        };

        let words: Vec<&str> = text.split_whitespace().collect();
        let word_count = words.len();
        let content = words[..word_count.min(self.settings.word_limit)].join(" ");
        let result =
            FetchResult::fetched(tab.clone(), content, word_count, self.settings.min_words);

        if !result.is_success() || word_count < self.settings.summary_min_words {
            return result;
        }

        sink.emit(EngineEvent::Stage {
            item: item.clone(),
            stage: Stage::Summarizing,
        });
        let request = CompletionRequest::new(
            self.settings.summary_model.as_str(),
            SUMMARY_SYSTEM_PROMPT,
            self.summary_prompt(tab, &result.content),
        );
        match self.summarizer.complete(request).await {
            Ok(summary) => result.with_summary(summary),
            Err(err) => {
                engine_warn!("Summary failed for {}: {}", tab.url, err);
                result.with_summary_error(err.to_string())
            }
        }
    }

    fn summary_prompt(&self, tab: &TabRef, content: &str) -> String {
        let head: String = content.chars().take(self.settings.summary_max_chars).collect();
        let ellipsis = if head.len() < content.len() { "..." } else { "" };
        format!(
            "Please summarize this web page content:\n\nTitle: {}\nURL: {}\n\nContent:\n{head}{ellipsis}",
            tab.title, tab.url
        )
    }
}
