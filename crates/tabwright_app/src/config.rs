use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use engine_logging::{LogDestination, LogOptions};
use log::LevelFilter;
use tabwright_engine::{
    AnalysisSettings, BrowserSettings, ChromeDirectory, CompletionSettings, FetcherSettings,
    OpenAiCompletion, ReaderSettings, ReqwestReader, TextCompletion,
};

use crate::cli::GlobalArgs;

/// Settings resolved from flags, environment and `.env`.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub output_dir: PathBuf,
    api_key: Option<String>,
    api_base_url: String,
    summary_model: String,
    analysis_model: String,
    plan_model: String,
    reader_url: String,
    browser: String,
}

impl AppConfig {
    pub fn from_args(args: &GlobalArgs) -> Self {
        Self {
            output_dir: args.output_dir.clone(),
            api_key: args
                .api_key
                .as_deref()
                .map(str::trim)
                .filter(|key| !key.is_empty())
                .map(str::to_string),
            api_base_url: args.api_base_url.clone(),
            summary_model: args.summary_model.clone(),
            analysis_model: args.analysis_model.clone(),
            plan_model: args.plan_model.clone(),
            reader_url: args.reader_url.clone(),
            browser: args.browser.clone(),
        }
    }

    /// Completion client; fails when no API key is configured.
    pub fn completion(&self) -> anyhow::Result<Arc<dyn TextCompletion>> {
        let Some(api_key) = &self.api_key else {
            bail!("OPENAI_API_KEY is not set; export it or add it to a .env file");
        };
        let settings = CompletionSettings {
            base_url: self.api_base_url.clone(),
            ..CompletionSettings::new(api_key.as_str())
        };
        let client =
            OpenAiCompletion::new(settings).context("could not build the completion client")?;
        Ok(Arc::new(client))
    }

    pub fn reader(&self) -> ReqwestReader {
        ReqwestReader::new(ReaderSettings {
            endpoint: self.reader_url.clone(),
            ..ReaderSettings::default()
        })
    }

    pub fn fetcher_settings(&self) -> FetcherSettings {
        FetcherSettings {
            summary_model: self.summary_model.clone(),
            ..FetcherSettings::default()
        }
    }

    pub fn analysis_settings(&self) -> AnalysisSettings {
        AnalysisSettings {
            analysis_model: self.analysis_model.clone(),
            plan_model: self.plan_model.clone(),
            ..AnalysisSettings::default()
        }
    }

    pub fn browser(&self) -> ChromeDirectory {
        ChromeDirectory::new(BrowserSettings {
            application: self.browser.clone(),
            ..BrowserSettings::default()
        })
    }
}

pub fn log_options(args: &GlobalArgs) -> LogOptions {
    let level = if args.verbose {
        LevelFilter::Debug
    } else if args.quiet {
        LevelFilter::Warn
    } else {
        LevelFilter::Info
    };
    let destination = match &args.log_file {
        Some(path) => LogDestination::Both(path.clone()),
        None => LogDestination::Terminal,
    };
    LogOptions { level, destination }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;
    use pretty_assertions::assert_eq;

    fn global(args: &[&str]) -> GlobalArgs {
        let mut argv = vec!["tabwright"];
        argv.extend_from_slice(args);
        argv.extend_from_slice(&["dump", "--fast"]);
        Cli::try_parse_from(argv).unwrap().global
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let config = AppConfig::from_args(&global(&["--api-key", "  "]));
        let err = config.completion().err().unwrap();
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn verbosity_and_log_file_select_options() {
        let options = log_options(&global(&["-q"]));
        assert_eq!(options.level, LevelFilter::Warn);
        assert_eq!(options.destination, LogDestination::Terminal);

        let options = log_options(&global(&["-v", "--log-file", "tabwright.log"]));
        assert_eq!(options.level, LevelFilter::Debug);
        assert_eq!(
            options.destination,
            LogDestination::Both(PathBuf::from("tabwright.log"))
        );
    }
}
