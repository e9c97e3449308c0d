//! LacakTani - Crop ripeness detection client
//!
//! Sends field photos to a LacakTani classifier server, shows the ripe,
//! unripe and flowering counts per image and manages the server's models
//! and detection history.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use indicatif::MultiProgress;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use lacaktani::app::App;
use lacaktani::cli::{Cli, Commands};
use lacaktani::client::HttpClient;
use lacaktani::config::Config;
use lacaktani::ui::{dates, ConsoleNotifier};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let mut config = Config::load_or_default(cli.config.as_deref())?;
    if let Some(server) = &cli.server {
        config.server.base_url = server.clone();
    }

    // Initialize logging
    let level = if cli.verbose {
        "debug"
    } else {
        config.general.log_level.as_str()
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).compact().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive(format!("lacaktani={}", level).parse()?))
        .init();

    let api = HttpClient::new(&config.server.base_url)
        .with_context(|| format!("Invalid server URL: {}", config.server.base_url))?;
    tracing::debug!("Using classifier at {}", api.base_url());

    let command = cli.command.unwrap_or(Commands::Interactive);
    if !matches!(command, Commands::Interactive) {
        println!("{}", dates::today().bright_black());
    }

    let progress = MultiProgress::new();
    let notifier = Arc::new(ConsoleNotifier::new(progress.clone()));
    let mut app = App::new(Arc::new(api), notifier, config, config_path).with_progress(progress);
    if let Err(e) = app.run(command).await {
        // Already shown as a notification
        tracing::debug!("{:#}", e);
        std::process::exit(1);
    }

    Ok(())
}
