/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

It exposes two top-level command modules:

- `login` — Run the backchannel login flow end to end
- `qr`    — Offline QR rendering for terminal and theme checks

These handlers are intentionally small and use the library components:
the authorization client, the QR renderer, and the account provisioner.
*/

use crate::config::Config;
use crate::error::Result;

// Login command handler
pub mod login {
    //! Backchannel login handler.
    //!
    //! Wires a terminal session and the system account provisioner into
    //! the login flow and reports the outcome.

    use super::*;
    use crate::ciba::AuthFlow;
    use crate::provision::UnixAccountProvisioner;
    use crate::session::TerminalSession;
    use colored::Colorize;

    /// Run the backchannel login flow
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    ///
    /// # Errors
    ///
    /// Returns error when the flow fails at any step; the polling
    /// timeout has already been reported to the user at that point
    pub async fn run_login(config: Config) -> Result<()> {
        let flow = AuthFlow::new(config)?;
        let session = TerminalSession::new();
        let provisioner = UnixAccountProvisioner::new();

        let username = flow.run(&session, &provisioner).await?;
        println!("{} {}", "Authenticated as".green(), username.green().bold());
        Ok(())
    }
}

// QR command handler
pub mod qr {
    //! Offline QR rendering handler.
    //!
    //! Encodes arbitrary text with the same renderer the login flow
    //! uses, so framing and polarity can be checked against a real
    //! terminal before deployment.

    use super::*;
    use crate::qr::{self, Density, RenderOptions};

    /// Render text as a terminal QR code
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (supplies per-line framing)
    /// * `text` - Payload to encode
    /// * `big` - Spend two characters per module
    /// * `inverse` - Swap glyph shapes for light terminal themes
    ///
    /// # Errors
    ///
    /// Returns error when the payload cannot be encoded
    pub fn run_qr(config: &Config, text: &str, big: bool, inverse: bool) -> Result<()> {
        let grid = qr::encode(text)?;
        let options = RenderOptions {
            density: if big { Density::Full } else { Density::Compact },
            inverse,
            before_line: config.qr.before_line.clone(),
            after_line: config.qr.after_line.clone(),
        };
        println!("{}", qr::render(&grid, &options));
        Ok(())
    }
}
