//! Embedded Login Flow Example
//!
//! This example demonstrates how to drive the backchannel login flow
//! from a host program instead of the `cibauth` CLI:
//! 1. Load configuration and build an `AuthFlow`
//! 2. Supply a custom `Session` that decides how prompts reach the user
//! 3. Supply an `AccountProvisioner` that fits the host's account model
//!
//! # Running
//!
//! Point the flow at an authorization server:
//! ```bash
//! export CIBAUTH_ENDPOINT="https://auth.example.com"
//! export CIBAUTH_SERVER_ID="demo"
//! ```
//!
//! Then run with:
//! ```bash
//! cargo run --example embedded_session
//! ```
//!
//! Approve the request on a second device; the host session prints the
//! resolved identity when the server reports approval.

use async_trait::async_trait;
use cibauth::ciba::AuthFlow;
use cibauth::error::Result;
use cibauth::provision::AccountProvisioner;
use cibauth::session::Session;
use cibauth::Config;

/// Session that tags everything it shows, standing in for a host UI.
struct HostSession;

impl Session for HostSession {
    fn notify(&self, message: &str) -> Result<()> {
        println!("[host] {}", message);
        Ok(())
    }

    fn prompt_visible(&self, message: &str) -> Result<()> {
        println!("[host] please approve:\n{}", message);
        Ok(())
    }

    fn set_identity(&self, username: &str) -> Result<()> {
        println!("[host] identity recorded: {}", username);
        Ok(())
    }
}

/// Provisioner that only reports; the host owns its account database.
struct ReportingProvisioner;

#[async_trait]
impl AccountProvisioner for ReportingProvisioner {
    async fn ensure_account(&self, username: &str) -> Result<()> {
        println!("[host] account check for {} left to the host", username);
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load("/etc/cibauth/config.yml", &Default::default())?;
    config.validate()?;

    let flow = AuthFlow::new(config)?;
    let username = flow.run(&HostSession, &ReportingProvisioner).await?;
    println!("[host] authenticated as {}", username);
    Ok(())
}
