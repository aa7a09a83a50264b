//! `tabwright` binary: command-line front end over the tabwright engine.
mod cli;
mod config;
mod dump;
mod keep;
mod output;
mod recommend;
mod reorganize;

use clap::Parser;

use crate::cli::{Cli, Command};
use crate::config::AppConfig;
use crate::reorganize::ReorganizeArgs;

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    engine_logging::initialize(config::log_options(&cli.global));
    let config = AppConfig::from_args(&cli.global);

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run(config, cli.command))
}

async fn run(config: AppConfig, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Dump { fast, resume } => dump::run(&config, fast, resume).await,
        Command::Keep { listing, yes } => keep::run(&config, &listing, yes).await,
        Command::Recommend { listing } => recommend::run(&config, &listing).await,
        Command::Reorganize {
            plan,
            live,
            dry_run,
            yes,
        } => {
            reorganize::run(
                &config,
                ReorganizeArgs {
                    plan: plan.as_deref(),
                    live,
                    dry_run,
                    yes,
                },
            )
            .await
        }
    }
}
