//! Tabwright engine: reader and completion clients, the sequential fetch
//! pipeline, browser tab directories and the reorganization executor.
mod analysis;
mod applescript;
mod checkpoint;
mod closer;
mod completion;
mod confirm;
mod directory;
mod executor;
mod fetcher;
mod memory;
mod persist;
mod pipeline;
mod reader;
mod retry;
mod types;
mod workflow;

pub use analysis::{
    AnalysisSettings, Analyzer, Recommendation, DEFAULT_ANALYSIS_MODEL, DEFAULT_PLAN_MODEL,
};
pub use applescript::{BrowserSettings, ChromeDirectory, DEFAULT_BROWSER};
pub use checkpoint::{Checkpointer, CheckpointStore, PROGRESS_FILENAME, STATE_FILENAME};
pub use closer::{CloseReport, TabCloser};
pub use completion::{
    CompletionError, CompletionRequest, CompletionSettings, OpenAiCompletion, TextCompletion,
    DEFAULT_API_URL,
};
pub use confirm::{AssumeYes, Confirm, TerminalConfirm};
pub use directory::{DirectoryError, TabDirectory};
pub use executor::{
    ExecutionReport, ExecutorSettings, MoveFailure, ReorgExecutor, TabMoveOutcome,
};
pub use fetcher::{FetcherSettings, ResilientFetcher, DEFAULT_SUMMARY_MODEL};
pub use memory::InMemoryDirectory;
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use pipeline::{checkpoint_interval, PipelineOutcome, PipelineRunner};
pub use reader::{ContentReader, ReaderSettings, ReqwestReader, DEFAULT_READER_URL};
pub use retry::{RetryPolicy, RetryTrack};
pub use types::{
    EngineEvent, FailureKind, FetchError, ItemProgress, LogSink, NullSink, ProgressSink, Stage,
};
pub use workflow::{keep_listed, reorganize, KeepOutcome, ReorgOutcome};
