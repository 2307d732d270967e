use std::io;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use rootify_config::Config;
use rootify_store::WordRootStore;

pub mod cli;
pub mod commands;
pub mod logging;
pub mod service;

#[cfg(test)]
mod tests;

use self::cli::Cli;
use self::service::RootService;

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e:#}");
            return ExitCode::from(2);
        }
    };
    logging::init(&config.log);

    match run(cli, config) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}

/// Profile file (or env defaults) with CLI overrides applied
fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => Config::new(),
    };

    if let Some(db) = &cli.db {
        config.store.db_path = db.clone();
    }
    if cli.log_json {
        config.log.json = true;
    }

    Ok(config)
}

fn run(cli: Cli, config: Config) -> anyhow::Result<bool> {
    let store = WordRootStore::open(&config.store).with_context(|| {
        format!(
            "failed to open word-root store at {}",
            config.store.db_path.display()
        )
    })?;
    let service = RootService::new(Arc::new(store));

    let stdout = io::stdout();
    let mut out = stdout.lock();
    commands::execute(cli.command, &service, &mut out)
}
