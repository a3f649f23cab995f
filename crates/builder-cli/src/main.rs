use anyhow::{Context, Result};
use clap::Parser;

use builder_cli::{commands, logging, Cli, Config};

fn main() -> Result<()> {
    // 1. Load .env before clap reads env-backed args
    dotenvy::dotenv().ok();

    // 2. Load configuration
    let cli = Cli::parse();
    let config = Config::load(&cli).context("Failed to load configuration")?;

    // 3. Initialize logging
    logging::init(&config).context("Failed to initialize logging")?;
    logging::log_config(&config);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    commands::run(&cli.command, &config, &mut out)
}
