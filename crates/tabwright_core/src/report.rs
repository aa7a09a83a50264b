use crate::result::{FetchResult, FetchStatus};

/// Aggregate counts over a run, used for console output and document headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunReport {
    pub total: usize,
    pub succeeded: usize,
    pub skipped: usize,
    pub failed: usize,
    pub summarized: usize,
}

impl RunReport {
    pub fn from_results(results: &[FetchResult]) -> Self {
        let mut report = RunReport {
            total: results.len(),
            ..RunReport::default()
        };
        for result in results {
            match result.status {
                FetchStatus::Success => report.succeeded += 1,
                FetchStatus::Skipped => report.skipped += 1,
                FetchStatus::Failed => report.failed += 1,
            }
            if result.summary_generated {
                report.summarized += 1;
            }
        }
        report
    }

    /// Percentage of `count` over the total, 0 for an empty run.
    pub fn percent(&self, count: usize) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            count as f64 * 100.0 / self.total as f64
        }
    }
}

/// Results of one browser window, in enumeration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowGroup {
    pub window_index: u32,
    pub tabs: Vec<FetchResult>,
}

/// Re-groups a flat result list by the window each tab was enumerated in.
///
/// Windows appear in order of first occurrence; tabs keep their relative order.
pub fn group_by_window(results: Vec<FetchResult>) -> Vec<WindowGroup> {
    let mut groups: Vec<WindowGroup> = Vec::new();
    for result in results {
        let window_index = result.tab.window_position;
        match groups
            .iter_mut()
            .find(|group| group.window_index == window_index)
        {
            Some(group) => group.tabs.push(result),
            None => groups.push(WindowGroup {
                window_index,
                tabs: vec![result],
            }),
        }
    }
    groups
}
