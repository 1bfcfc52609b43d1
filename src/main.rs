//! kubewait CLI entry point.

use anyhow::Result;
use clap::Parser;

use kubewait::cli::{commands, Cli, Commands};
use kubewait::domain::models::Config;
use kubewait::infrastructure::config::ConfigLoader;
use kubewait::infrastructure::logging::LoggerImpl;

fn load_config(cli: &Cli) -> Result<Config> {
    match cli.config {
        Some(ref path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(err) => kubewait::cli::handle_error(&err, cli.json),
    };

    let _logger = match LoggerImpl::init(&config.logging) {
        Ok(logger) => logger,
        Err(err) => kubewait::cli::handle_error(&err, cli.json),
    };

    let result = match cli.command {
        Commands::Probe(args) => commands::probe::execute(args, &config, cli.json).await,
        Commands::Profiles => commands::profiles::execute(&config, cli.json),
    };

    if let Err(err) = result {
        kubewait::cli::handle_error(&err, cli.json);
    }
}
