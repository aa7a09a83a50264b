use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use tabwright_core::{TabRef, WindowId};

use crate::directory::{DirectoryError, TabDirectory};

const NEW_TAB_TITLE: &str = "New Tab";
const NEW_TAB_URL: &str = "chrome://newtab/";

#[derive(Debug, Clone)]
struct Window {
    id: WindowId,
    tabs: Vec<(String, String)>,
}

#[derive(Debug, Default)]
struct State {
    windows: Vec<Window>,
    next_id: u64,
    unavailable: bool,
    failing_urls: HashSet<String>,
    mutations: usize,
}

/// Tab directory held in memory, renumbering positions the way a browser
/// does: a new window becomes window 1 and a window whose last tab leaves
/// disappears. Backs dry runs and tests.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    state: Mutex<State>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds windows from a snapshot, keeping its window grouping and order.
    pub fn from_tabs(tabs: &[TabRef]) -> Self {
        let directory = Self::new();
        {
            let mut state = directory.lock();
            let mut current: Option<u32> = None;
            for tab in tabs {
                if current != Some(tab.window_position) {
                    current = Some(tab.window_position);
                    let id = state.allocate_id();
                    state.windows.push(Window {
                        id,
                        tabs: Vec::new(),
                    });
                }
                if let Some(window) = state.windows.last_mut() {
                    window.tabs.push((tab.title.clone(), tab.url.clone()));
                }
            }
        }
        directory
    }

    /// Appends a window with the given `(title, url)` tabs at the back.
    pub fn push_window(&self, tabs: &[(&str, &str)]) -> WindowId {
        let mut state = self.lock();
        let id = state.allocate_id();
        state.windows.push(Window {
            id,
            tabs: tabs
                .iter()
                .map(|(title, url)| (title.to_string(), url.to_string()))
                .collect(),
        });
        id
    }

    /// Makes every call fail as if the browser could not be reached.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.lock().unavailable = unavailable;
    }

    /// Makes moves and closes of tabs with this URL fail.
    pub fn fail_mutations_for(&self, url: &str) {
        self.lock().failing_urls.insert(url.to_string());
    }

    /// Removes the first tab with this URL, as if the user closed it.
    pub fn remove_url(&self, url: &str) -> bool {
        let mut state = self.lock();
        let Some((w, t)) = state.find_url(url) else {
            return false;
        };
        state.windows[w].tabs.remove(t);
        state.drop_empty_windows();
        true
    }

    pub fn snapshot(&self) -> Vec<TabRef> {
        self.lock().snapshot()
    }

    /// Number of successful mutating calls so far.
    pub fn mutation_count(&self) -> usize {
        self.lock().mutations
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl State {
    fn allocate_id(&mut self) -> WindowId {
        self.next_id += 1;
        WindowId(self.next_id)
    }

    fn check_available(&self) -> Result<(), DirectoryError> {
        if self.unavailable {
            Err(DirectoryError::Unavailable("browser is not running".into()))
        } else {
            Ok(())
        }
    }

    fn snapshot(&self) -> Vec<TabRef> {
        let mut tabs = Vec::new();
        for (w, window) in self.windows.iter().enumerate() {
            for (t, (title, url)) in window.tabs.iter().enumerate() {
                tabs.push(
                    TabRef::new(title.as_str(), url.as_str(), w as u32 + 1, t as u32 + 1)
                        .with_window_id(window.id),
                );
            }
        }
        tabs
    }

    fn find_url(&self, url: &str) -> Option<(usize, usize)> {
        self.windows.iter().enumerate().find_map(|(w, window)| {
            window
                .tabs
                .iter()
                .position(|(_, tab_url)| tab_url == url)
                .map(|t| (w, t))
        })
    }

    fn locate(&self, window_position: u32, tab_position: u32) -> Result<(usize, usize), DirectoryError> {
        let w = (window_position as usize)
            .checked_sub(1)
            .filter(|&w| w < self.windows.len())
            .ok_or_else(|| DirectoryError::UnknownWindow(format!("position {window_position}")))?;
        let t = (tab_position as usize)
            .checked_sub(1)
            .filter(|&t| t < self.windows[w].tabs.len())
            .ok_or_else(|| {
                DirectoryError::ScriptFailed(format!(
                    "no tab {tab_position} in window {window_position}"
                ))
            })?;
        Ok((w, t))
    }

    fn check_failing(&self, w: usize, t: usize) -> Result<(), DirectoryError> {
        let url = &self.windows[w].tabs[t].1;
        if self.failing_urls.contains(url) {
            Err(DirectoryError::ScriptFailed(format!("refused to touch {url}")))
        } else {
            Ok(())
        }
    }

    fn drop_empty_windows(&mut self) {
        self.windows.retain(|window| !window.tabs.is_empty());
    }
}

#[async_trait::async_trait]
impl TabDirectory for InMemoryDirectory {
    async fn list(&self) -> Result<Vec<TabRef>, DirectoryError> {
        let state = self.lock();
        state.check_available()?;
        Ok(state.snapshot())
    }

    async fn create_window(&self) -> Result<WindowId, DirectoryError> {
        let mut state = self.lock();
        state.check_available()?;
        let id = state.allocate_id();
        state.windows.insert(
            0,
            Window {
                id,
                tabs: vec![(NEW_TAB_TITLE.to_string(), NEW_TAB_URL.to_string())],
            },
        );
        state.mutations += 1;
        Ok(id)
    }

    async fn move_tab(
        &self,
        window_position: u32,
        tab_position: u32,
        to: WindowId,
    ) -> Result<(), DirectoryError> {
        let mut state = self.lock();
        state.check_available()?;
        let (w, t) = state.locate(window_position, tab_position)?;
        state.check_failing(w, t)?;
        let target = state
            .windows
            .iter()
            .position(|window| window.id == to)
            .ok_or_else(|| DirectoryError::UnknownWindow(format!("id {to}")))?;

        let tab = state.windows[w].tabs.remove(t);
        state.windows[target].tabs.push(tab);
        state.drop_empty_windows();
        state.mutations += 1;
        Ok(())
    }

    async fn close_tab(&self, window_position: u32, tab_position: u32) -> Result<(), DirectoryError> {
        let mut state = self.lock();
        state.check_available()?;
        let (w, t) = state.locate(window_position, tab_position)?;
        state.check_failing(w, t)?;
        state.windows[w].tabs.remove(t);
        state.drop_empty_windows();
        state.mutations += 1;
        Ok(())
    }

    async fn window_id_at(&self, window_position: u32) -> Result<WindowId, DirectoryError> {
        let state = self.lock();
        state.check_available()?;
        let (w, _) = state.locate(window_position, 1)?;
        Ok(state.windows[w].id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn new_window_shifts_positions() {
        let directory = InMemoryDirectory::new();
        directory.push_window(&[("A", "https://a.example/"), ("B", "https://b.example/")]);

        let id = directory.create_window().await.unwrap();
        let tabs = directory.list().await.unwrap();
        assert_eq!(tabs[0].url, NEW_TAB_URL);
        assert_eq!(tabs[0].window_id, Some(id));
        assert_eq!(tabs[1].window_position, 2);

        directory.move_tab(2, 1, id).await.unwrap();
        directory.move_tab(2, 1, id).await.unwrap();
        let tabs = directory.list().await.unwrap();
        assert_eq!(tabs.len(), 3);
        assert!(tabs.iter().all(|tab| tab.window_position == 1));
        assert_eq!(directory.mutation_count(), 3);
    }
}
