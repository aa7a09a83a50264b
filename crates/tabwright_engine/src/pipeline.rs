use std::collections::HashMap;
use std::sync::Arc;

use engine_logging::{engine_debug, engine_info};
use tabwright_core::{group_by_window, FetchResult, RunReport, TabRef, WindowGroup};

use crate::checkpoint::Checkpointer;
use crate::fetcher::ResilientFetcher;
use crate::types::{EngineEvent, ItemProgress, ProgressSink};

const MIN_CHECKPOINT_INTERVAL: usize = 5;
/// One checkpoint per 2.5% of the run.
const CHECKPOINTS_PER_RUN: usize = 40;

/// Everything a finished run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOutcome {
    /// One result per input tab, in input order.
    pub results: Vec<FetchResult>,
    pub report: RunReport,
    pub groups: Vec<WindowGroup>,
}

/// Items between two checkpoints for a run of `total` items.
pub fn checkpoint_interval(total: usize) -> usize {
    (total / CHECKPOINTS_PER_RUN).max(MIN_CHECKPOINT_INTERVAL)
}

/// Drives the fetcher over tabs strictly one at a time.
pub struct PipelineRunner {
    fetcher: ResilientFetcher,
    checkpoint: Option<Arc<dyn Checkpointer>>,
    reusable: HashMap<String, FetchResult>,
}

impl PipelineRunner {
    pub fn new(fetcher: ResilientFetcher) -> Self {
        Self {
            fetcher,
            checkpoint: None,
            reusable: HashMap::new(),
        }
    }

    pub fn with_checkpoint(mut self, checkpoint: Arc<dyn Checkpointer>) -> Self {
        self.checkpoint = Some(checkpoint);
        self
    }

    /// Reuses successful and skipped results of an earlier run for tabs with
    /// the same URL. Failed results are fetched again.
    pub fn with_previous_results(mut self, previous: Vec<FetchResult>) -> Self {
        for result in previous {
            if result.is_failed() {
                continue;
            }
            self.reusable.entry(result.tab.url.clone()).or_insert(result);
        }
        self
    }

    pub async fn run(&self, items: &[TabRef], sink: &dyn ProgressSink) -> PipelineOutcome {
        let total = items.len();
        let interval = checkpoint_interval(total);
        let mut results = Vec::with_capacity(total);
        engine_info!("Processing {} tabs sequentially", total);

        for (index, tab) in items.iter().enumerate() {
            let current = index + 1;
            let item = ItemProgress {
                current,
                total,
                title: tab.title.clone(),
                url: tab.url.clone(),
            };

            let result = match self.reusable.get(&tab.url) {
                Some(previous) => {
                    engine_debug!("[{}/{}] Reusing saved result for {}", current, total, tab.url);
                    previous.clone().relocated(tab)
                }
                None => self.fetcher.fetch(tab, &item, sink).await,
            };
            sink.emit(EngineEvent::ItemCompleted {
                item,
                status: result.status,
                summary_generated: result.summary_generated,
            });
            results.push(result);

            if current % interval == 0 || current == total {
                self.save_checkpoint(&results, current, total, sink);
            }
        }

        let report = RunReport::from_results(&results);
        sink.emit(EngineEvent::RunCompleted(report));
        let groups = group_by_window(results.clone());
        PipelineOutcome {
            results,
            report,
            groups,
        }
    }

    fn save_checkpoint(
        &self,
        results: &[FetchResult],
        processed: usize,
        total: usize,
        sink: &dyn ProgressSink,
    ) {
        let Some(checkpoint) = &self.checkpoint else {
            return;
        };
        match checkpoint.save(results, processed, total) {
            Ok(()) => sink.emit(EngineEvent::CheckpointSaved { processed, total }),
            Err(err) => engine_debug!("Checkpoint write failed: {}", err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::checkpoint_interval;

    #[test]
    fn interval_is_two_and_a_half_percent_with_a_floor() {
        assert_eq!(checkpoint_interval(0), 5);
        assert_eq!(checkpoint_interval(100), 5);
        assert_eq!(checkpoint_interval(400), 10);
        assert_eq!(checkpoint_interval(1000), 25);
    }
}
