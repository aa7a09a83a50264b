use std::time::Duration;

use tabwright_core::{TabRef, WindowId};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    #[error("browser unavailable: {0}")]
    Unavailable(String),
    #[error("automation script failed: {0}")]
    ScriptFailed(String),
    #[error("could not parse browser response: {0}")]
    Parse(String),
    #[error("browser did not answer within {0:?}")]
    Timeout(Duration),
    #[error("no window at {0}")]
    UnknownWindow(String),
}

/// Live view of the browser's windows and tabs.
///
/// Positions are 1-based and only valid until the next mutating call; callers
/// re-run [`TabDirectory::list`] before every mutation. [`WindowId`]s are
/// stable for the lifetime of a window.
#[async_trait::async_trait]
pub trait TabDirectory: Send + Sync {
    /// All tabs, grouped by window, in window then tab order.
    async fn list(&self) -> Result<Vec<TabRef>, DirectoryError>;

    async fn create_window(&self) -> Result<WindowId, DirectoryError>;

    /// Moves a tab to the end of the window identified by `to`.
    async fn move_tab(
        &self,
        window_position: u32,
        tab_position: u32,
        to: WindowId,
    ) -> Result<(), DirectoryError>;

    async fn close_tab(&self, window_position: u32, tab_position: u32)
        -> Result<(), DirectoryError>;

    /// Stable id of the window currently at `window_position`.
    async fn window_id_at(&self, window_position: u32) -> Result<WindowId, DirectoryError> {
        self.list()
            .await?
            .into_iter()
            .find(|tab| tab.window_position == window_position)
            .and_then(|tab| tab.window_id)
            .ok_or_else(|| DirectoryError::UnknownWindow(format!("position {window_position}")))
    }
}
