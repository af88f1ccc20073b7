//! Command-line interface definition for cibauth
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for the login flow and offline QR rendering.

use clap::{Parser, Subcommand};

use crate::config::DEFAULT_CONFIG_PATH;

/// cibauth - Terminal backchannel login
///
/// Log in by approving a QR-encoded authorization request on a second
/// device while this terminal polls for the decision.
#[derive(Parser, Debug, Clone)]
#[command(name = "cibauth")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for cibauth
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run the backchannel login flow against the configured server
    Login,

    /// Render arbitrary text as a terminal QR code
    Qr {
        /// Text to encode
        #[arg(short, long)]
        text: String,

        /// Spend two characters per module instead of packing two rows per line
        #[arg(long)]
        big: bool,

        /// Swap glyph shapes for light terminal themes
        #[arg(long)]
        inverse: bool,
    },
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some(DEFAULT_CONFIG_PATH.to_string()),
            verbose: false,
            command: Commands::Login,
        }
    }
}
