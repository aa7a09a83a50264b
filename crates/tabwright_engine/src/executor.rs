use std::collections::HashMap;
use std::time::Duration;

use engine_logging::{engine_info, engine_warn};
use tabwright_core::{Plan, PlannedTab, PlannedTarget, TabRef, WindowAction, WindowId};

use crate::directory::{DirectoryError, TabDirectory};

#[derive(Debug, Clone)]
pub struct ExecutorSettings {
    /// Pause between two mutating browser calls.
    pub pacing: Duration,
}

impl Default for ExecutorSettings {
    fn default() -> Self {
        Self {
            pacing: Duration::from_millis(250),
        }
    }
}

/// Terminal state of one planned move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TabMoveOutcome {
    Moved,
    /// Every open tab with this URL already sits in the target window.
    AlreadyInPlace,
    NotFound,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveFailure {
    pub target: String,
    pub url: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionReport {
    pub tabs_moved: usize,
    pub windows_created: usize,
    pub already_in_place: usize,
    pub failures: Vec<MoveFailure>,
}

/// Applies a [`Plan`] to a live directory, re-reading the directory right
/// before every move since each mutation renumbers positions.
pub struct ReorgExecutor<'a> {
    directory: &'a dyn TabDirectory,
    settings: ExecutorSettings,
    mutated: bool,
    /// Copies of a URL this run has put or found in each target window.
    placed: HashMap<(WindowId, String), usize>,
}

impl<'a> ReorgExecutor<'a> {
    pub fn new(directory: &'a dyn TabDirectory, settings: ExecutorSettings) -> Self {
        Self {
            directory,
            settings,
            mutated: false,
            placed: HashMap::new(),
        }
    }

    /// Fails only when the directory cannot be read at all before the first
    /// mutation; everything later is recorded per tab.
    pub async fn execute(mut self, plan: &Plan) -> Result<ExecutionReport, DirectoryError> {
        let initial = self.directory.list().await?;
        engine_info!(
            "Executing {} targets over {} open tabs",
            plan.targets.len(),
            initial.len()
        );

        let mut pinned = Vec::with_capacity(plan.targets.len());
        for planned in &plan.targets {
            pinned.push(self.existing_window(planned).await);
        }

        let mut report = ExecutionReport::default();
        for (planned, existing) in plan.targets.iter().zip(pinned) {
            engine_info!("Processing: {}", planned.target.name);
            let window = match existing {
                Some(window) => window,
                None => match self.create_window().await {
                    Ok(window) => {
                        report.windows_created += 1;
                        window
                    }
                    Err(err) => {
                        engine_warn!("Could not create window for {}: {}", planned.target.name, err);
                        for tab in &planned.tabs {
                            report.failures.push(MoveFailure {
                                target: planned.target.name.clone(),
                                url: tab.tab.url.clone(),
                                reason: format!("window creation failed: {err}"),
                            });
                        }
                        continue;
                    }
                },
            };

            for tab in &planned.tabs {
                let outcome = self.move_one(tab, window).await;
                if matches!(outcome, TabMoveOutcome::Moved | TabMoveOutcome::AlreadyInPlace) {
                    *self.placed.entry((window, tab.tab.url.clone())).or_default() += 1;
                }
                match outcome {
                    TabMoveOutcome::Moved => {
                        report.tabs_moved += 1;
                        engine_info!("  Moved: {}", tab.tab.url);
                    }
                    TabMoveOutcome::AlreadyInPlace => {
                        report.already_in_place += 1;
                        engine_info!("  Already in place: {}", tab.tab.url);
                    }
                    TabMoveOutcome::NotFound => {
                        engine_warn!("  Tab no longer found: {}", tab.tab.url);
                        report.failures.push(MoveFailure {
                            target: planned.target.name.clone(),
                            url: tab.tab.url.clone(),
                            reason: "tab no longer open".to_string(),
                        });
                    }
                    TabMoveOutcome::Failed(reason) => {
                        engine_warn!("  Failed to move {}: {}", tab.tab.url, reason);
                        report.failures.push(MoveFailure {
                            target: planned.target.name.clone(),
                            url: tab.tab.url.clone(),
                            reason,
                        });
                    }
                }
            }
        }
        Ok(report)
    }

    /// Resolves the window a reusing target points at. `None` means the
    /// target needs a new window.
    async fn existing_window(&self, planned: &PlannedTarget) -> Option<WindowId> {
        if planned.target.action != WindowAction::UseExistingWindow {
            return None;
        }
        let position = planned.target.existing_window_index?;
        match self.directory.window_id_at(position).await {
            Ok(window) => Some(window),
            Err(err) => {
                engine_warn!(
                    "Window {} for {} unavailable ({}); a new window will be created",
                    position,
                    planned.target.name,
                    err
                );
                None
            }
        }
    }

    async fn create_window(&mut self) -> Result<WindowId, DirectoryError> {
        self.pace().await;
        let window = self.directory.create_window().await?;
        engine_info!("  Created window {}", window);
        Ok(window)
    }

    async fn move_one(&mut self, planned: &PlannedTab, window: WindowId) -> TabMoveOutcome {
        let fresh = match self.directory.list().await {
            Ok(tabs) => tabs,
            Err(err) => return TabMoveOutcome::Failed(format!("could not read tabs: {err}")),
        };
        let Some(current) = resolve(&fresh, &planned.tab.url, window, &self.placed) else {
            let mut copies = fresh.iter().filter(|tab| tab.url == planned.tab.url).peekable();
            return if copies.peek().is_none() {
                TabMoveOutcome::NotFound
            } else if copies.any(|tab| tab.window_id == Some(window)) {
                TabMoveOutcome::AlreadyInPlace
            } else {
                TabMoveOutcome::Failed("every open copy is held by an earlier target".to_string())
            };
        };

        self.pace().await;
        match self
            .directory
            .move_tab(current.window_position, current.tab_position, window)
            .await
        {
            Ok(()) => TabMoveOutcome::Moved,
            Err(err) => TabMoveOutcome::Failed(err.to_string()),
        }
    }

    async fn pace(&mut self) {
        if self.mutated && !self.settings.pacing.is_zero() {
            tokio::time::sleep(self.settings.pacing).await;
        }
        self.mutated = true;
    }
}

/// First open tab with `url` outside `window` that no earlier target holds.
/// A window that received `n` copies for another target keeps its first `n`.
fn resolve<'t>(
    tabs: &'t [TabRef],
    url: &str,
    window: WindowId,
    placed: &HashMap<(WindowId, String), usize>,
) -> Option<&'t TabRef> {
    let mut seen: HashMap<WindowId, usize> = HashMap::new();
    tabs.iter().filter(|tab| tab.url == url).find(|tab| {
        let Some(id) = tab.window_id else {
            return true;
        };
        if id == window {
            return false;
        }
        let held = placed.get(&(id, url.to_string())).copied().unwrap_or(0);
        let index = seen.entry(id).or_default();
        *index += 1;
        *index > held
    })
}
