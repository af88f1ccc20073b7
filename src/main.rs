//! cibauth - Terminal backchannel login CLI
//!
#![doc = "cibauth - Terminal backchannel login CLI"]
#![doc = "Main entry point for the cibauth application."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cibauth::cli::{Cli, Commands};
use cibauth::commands;
use cibauth::config::{Config, DEFAULT_CONFIG_PATH};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Login => {
            tracing::info!("Starting backchannel login");
            commands::login::run_login(config).await?;
            Ok(())
        }
        Commands::Qr { text, big, inverse } => {
            tracing::debug!("Rendering QR for {} bytes of text", text.len());
            commands::qr::run_qr(&config, &text, big, inverse)?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "cibauth=debug"
    } else {
        "cibauth=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
