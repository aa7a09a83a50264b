use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tabwright_engine::{
    DEFAULT_ANALYSIS_MODEL, DEFAULT_API_URL, DEFAULT_BROWSER, DEFAULT_PLAN_MODEL,
    DEFAULT_READER_URL, DEFAULT_SUMMARY_MODEL,
};

/// Export, summarize and reorganize the tabs of a running browser.
#[derive(Parser, Debug, Clone)]
#[command(name = "tabwright", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[command(flatten)]
    pub global: GlobalArgs,
}

#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Log debug output.
    #[arg(long, short = 'v', global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Log warnings and errors only.
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Also write the log to this file.
    #[arg(long, value_name = "FILE", global = true)]
    pub log_file: Option<PathBuf>,

    /// Directory that receives generated documents and checkpoint files.
    #[arg(long, short = 'o', value_name = "DIR", default_value = ".", global = true)]
    pub output_dir: PathBuf,

    /// API key for the completion service.
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Base URL of the OpenAI-compatible completion service.
    #[arg(long, env = "OPENAI_BASE_URL", default_value = DEFAULT_API_URL, global = true)]
    pub api_base_url: String,

    /// Model used for per-page summaries.
    #[arg(long, env = "TABWRIGHT_SUMMARY_MODEL", default_value = DEFAULT_SUMMARY_MODEL, global = true)]
    pub summary_model: String,

    /// Model used for the narrative tab analysis.
    #[arg(long, env = "TABWRIGHT_ANALYSIS_MODEL", default_value = DEFAULT_ANALYSIS_MODEL, global = true)]
    pub analysis_model: String,

    /// Model used for the structured reorganization plan.
    #[arg(long, env = "TABWRIGHT_PLAN_MODEL", default_value = DEFAULT_PLAN_MODEL, global = true)]
    pub plan_model: String,

    /// Reader service the page URL is appended to.
    #[arg(long, env = "TABWRIGHT_READER_URL", default_value = DEFAULT_READER_URL, global = true)]
    pub reader_url: String,

    /// Browser application to automate.
    #[arg(long, env = "TABWRIGHT_BROWSER", default_value = DEFAULT_BROWSER, global = true)]
    pub browser: String,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Write a listing of all open tabs, then read and summarize each page.
    Dump {
        /// Only write the tab listing; skip reading and summarizing.
        #[arg(long)]
        fast: bool,

        /// Reuse results saved by an interrupted run.
        #[arg(long, conflicts_with = "fast")]
        resume: bool,
    },

    /// Close every open tab whose URL is missing from a listing document.
    Keep {
        /// Listing document with the tabs to keep.
        listing: PathBuf,

        /// Close without asking.
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Ask for a reorganization plan for the tabs in a listing document.
    Recommend {
        /// Listing document produced by `dump`.
        listing: PathBuf,
    },

    /// Move tabs into the windows described by a plan document.
    Reorganize {
        /// Plan document produced by `recommend`.
        #[arg(required_unless_present = "live", conflicts_with = "live")]
        plan: Option<PathBuf>,

        /// Build a fresh plan from the tabs that are open right now.
        #[arg(long)]
        live: bool,

        /// Apply the plan to an in-memory copy of the current tabs.
        #[arg(long)]
        dry_run: bool,

        /// Execute without asking.
        #[arg(long, short = 'y')]
        yes: bool,
    },
}
