//! Backchannel login flow
//!
//! Sequences one complete login: open an authorization transaction, show
//! the validation URL as a terminal QR code with the configured prompt,
//! poll until resolution, then provision and record the identity.
//!
//! # Flow overview
//!
//! 1. Open an authorization transaction (`POST /api/ciba`).
//! 2. Build the validation URL `{endpoint}/api/ciba/{token}/validate`.
//! 3. Encode the URL as a QR symbol and render it for the terminal.
//! 4. Expand the prompt template (`{url}`, `{qr}`) and present it.
//! 5. Poll `GET /api/ciba/{token}` once per second until approval, a
//!    terminal error, or budget exhaustion.
//! 6. Ensure a local account exists for the resolved username, then
//!    record the identity on the session.
//!
//! A failure at any step aborts the whole flow: nothing is provisioned
//! and no identity is recorded unless every step before it succeeded.

use crate::ciba::client::CibaClient;
use crate::config::Config;
use crate::error::Result;
use crate::provision::AccountProvisioner;
use crate::qr::{self, RenderOptions};
use crate::session::Session;

/// One complete backchannel login flow
#[derive(Debug)]
pub struct AuthFlow {
    client: CibaClient,
    config: Config,
}

impl AuthFlow {
    /// Create a flow from configuration
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be constructed
    pub fn new(config: Config) -> Result<Self> {
        let client = CibaClient::new(&config)?;
        Ok(Self { client, config })
    }

    /// Create a flow around an existing client
    ///
    /// Used when the caller has already customized the client, for
    /// example by swapping its sleep implementation.
    pub fn with_client(config: Config, client: CibaClient) -> Self {
        Self { client, config }
    }

    /// Run the flow to completion
    ///
    /// # Arguments
    ///
    /// * `session` - Host session receiving the prompt, notices, and identity
    /// * `provisioner` - Ensures a local account exists for the resolved user
    ///
    /// # Returns
    ///
    /// Returns the authenticated username
    ///
    /// # Errors
    ///
    /// Returns the first error of any step; see [`CibaClient`] for the
    /// polling error contract
    pub async fn run(
        &self,
        session: &dyn Session,
        provisioner: &dyn AccountProvisioner,
    ) -> Result<String> {
        let challenge = self.client.request_authorization().await?;

        let url = validation_url(self.client.endpoint(), &challenge.token);
        let grid = qr::encode(&url)?;
        let rendered = qr::render(&grid, &RenderOptions::from(&self.config.qr));

        session.prompt_visible(&expand_prompt(&self.config.prompt, &url, &rendered))?;

        let username = self.client.poll_for_identity(&challenge, session).await?;

        provisioner.ensure_account(&username).await?;
        session.set_identity(&username)?;

        tracing::info!(username = %username, "Login flow completed");
        Ok(username)
    }
}

/// URL the user visits (or scans) to approve the transaction
fn validation_url(endpoint: &str, token: &str) -> String {
    format!("{}/api/ciba/{}/validate", endpoint, token)
}

/// Expand the prompt template, substituting `{url}` and `{qr}`
fn expand_prompt(template: &str, url: &str, qr: &str) -> String {
    template.replace("{url}", url).replace("{qr}", qr)
}
