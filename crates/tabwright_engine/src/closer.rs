use engine_logging::{engine_info, engine_warn};

use crate::directory::{DirectoryError, TabDirectory};
use crate::executor::ExecutorSettings;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CloseReport {
    pub closed: Vec<String>,
    /// URL and reason for every tab that could not be closed.
    pub failed: Vec<(String, String)>,
}

/// Closes tabs by URL, one at a time, re-resolving each position first.
pub struct TabCloser<'a> {
    directory: &'a dyn TabDirectory,
    settings: ExecutorSettings,
}

impl<'a> TabCloser<'a> {
    pub fn new(directory: &'a dyn TabDirectory, settings: ExecutorSettings) -> Self {
        Self {
            directory,
            settings,
        }
    }

    /// Closes one tab per entry of `urls`; a URL listed twice closes two
    /// tabs. Fails only when the directory cannot be read before starting.
    pub async fn close(&self, urls: &[String]) -> Result<CloseReport, DirectoryError> {
        self.directory.list().await?;
        let mut report = CloseReport::default();

        for (index, url) in urls.iter().enumerate() {
            let progress = format!("[{}/{}]", index + 1, urls.len());
            if index > 0 && !self.settings.pacing.is_zero() {
                tokio::time::sleep(self.settings.pacing).await;
            }

            let fresh = match self.directory.list().await {
                Ok(tabs) => tabs,
                Err(err) => {
                    engine_warn!("{} Could not read tabs before closing {}: {}", progress, url, err);
                    report.failed.push((url.clone(), err.to_string()));
                    continue;
                }
            };
            let Some(tab) = fresh.iter().find(|tab| &tab.url == url) else {
                engine_warn!("{} Tab no longer open: {}", progress, url);
                report
                    .failed
                    .push((url.clone(), "tab no longer open".to_string()));
                continue;
            };

            match self
                .directory
                .close_tab(tab.window_position, tab.tab_position)
                .await
            {
                Ok(()) => {
                    engine_info!("{} Closed: {}", progress, url);
                    report.closed.push(url.clone());
                }
                Err(err) => {
                    engine_warn!("{} Failed to close {}: {}", progress, url, err);
                    report.failed.push((url.clone(), err.to_string()));
                }
            }
        }
        Ok(report)
    }
}
