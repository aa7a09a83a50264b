use std::fs;
use std::path::PathBuf;

use engine_logging::{engine_info, engine_warn};
use serde::{Deserialize, Serialize};
use tabwright_core::{render_checkpoint, FetchResult};

use crate::persist::{AtomicFileWriter, PersistError};

pub const PROGRESS_FILENAME: &str = "open-tabs-progress.tmp.md";
pub const STATE_FILENAME: &str = ".tabwright_state.ron";

/// Receives the full result list at each checkpoint.
pub trait Checkpointer: Send + Sync {
    fn save(&self, results: &[FetchResult], processed: usize, total: usize)
        -> Result<(), PersistError>;
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PersistedState {
    saved_at: String,
    processed: usize,
    total: usize,
    results: Vec<FetchResult>,
}

/// Progress document plus machine-readable resume state in one directory.
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    writer: AtomicFileWriter,
}

impl CheckpointStore {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            writer: AtomicFileWriter::new(dir),
        }
    }

    pub fn progress_path(&self) -> PathBuf {
        self.writer.dir().join(PROGRESS_FILENAME)
    }

    pub fn state_path(&self) -> PathBuf {
        self.writer.dir().join(STATE_FILENAME)
    }

    /// Results saved by an earlier, interrupted run. Missing or unreadable
    /// state yields an empty list.
    pub fn load_previous(&self) -> Vec<FetchResult> {
        let path = self.state_path();
        let content = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Vec::new();
            }
            Err(err) => {
                engine_warn!("Failed to read saved progress from {:?}: {}", path, err);
                return Vec::new();
            }
        };

        let state: PersistedState = match ron::from_str(&content) {
            Ok(state) => state,
            Err(err) => {
                engine_warn!("Failed to parse saved progress from {:?}: {}", path, err);
                return Vec::new();
            }
        };

        engine_info!(
            "Loaded {} saved results ({}/{} processed) from {:?}",
            state.results.len(),
            state.processed,
            state.total,
            path
        );
        state.results
    }

    /// Removes both checkpoint files.
    pub fn clear(&self) -> Result<(), PersistError> {
        self.writer.remove(PROGRESS_FILENAME)?;
        self.writer.remove(STATE_FILENAME)
    }

    pub fn has_saved_state(&self) -> bool {
        self.state_path().try_exists().unwrap_or(false)
    }
}

impl Checkpointer for CheckpointStore {
    fn save(
        &self,
        results: &[FetchResult],
        processed: usize,
        total: usize,
    ) -> Result<(), PersistError> {
        let saved_at = chrono::Local::now().to_rfc3339();
        let document = render_checkpoint(results, processed, total, &saved_at);
        self.writer.write(PROGRESS_FILENAME, &document)?;

        let state = PersistedState {
            saved_at,
            processed,
            total,
            results: results.to_vec(),
        };
        let pretty = ron::ser::PrettyConfig::new();
        let content = ron::ser::to_string_pretty(&state, pretty)
            .map_err(|err| PersistError::Serialize(err.to_string()))?;
        self.writer.write(STATE_FILENAME, &content)?;
        Ok(())
    }
}
