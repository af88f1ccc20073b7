//! Backchannel authorization client
//!
//! Opens authorization transactions and drives the bounded polling loop
//! until the user approves, the server reports a terminal error, or the
//! budget runs out. The cadence is fixed: one request per second, no
//! backoff, no server-driven intervals.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use crate::ciba::protocol::{
    self, AuthorizationChallenge, ChallengeResponse, IdentityResponse, PollOutcome, ServerReply,
};
use crate::config::Config;
use crate::error::{CibauthError, Result};
use crate::session::Session;

/// Fixed pause between poll requests
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Message delivered through the session when the budget runs out
pub const TIMEOUT_NOTICE: &str = "Timeout, please try again";

/// Per-request network timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Form body sent when opening an authorization transaction
#[derive(Debug, Serialize)]
struct AuthorizationRequest {
    server_id: String,
}

// ---------------------------------------------------------------------
// Sleep abstraction
// ---------------------------------------------------------------------

/// Sleep abstraction for the polling cadence
///
/// The loop's only time dependency. Tests swap in [`InstantDelay`] to
/// run through a full budget without waiting.
#[async_trait]
pub trait Delay: Send + Sync + std::fmt::Debug {
    /// Pause for the given duration
    async fn sleep(&self, duration: Duration);
}

/// Delay backed by the tokio timer
#[derive(Debug, Default)]
pub struct TokioDelay;

#[async_trait]
impl Delay for TokioDelay {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Delay that returns immediately, recording each requested pause
#[derive(Debug, Default)]
pub struct InstantDelay {
    slept: Mutex<Vec<Duration>>,
}

impl InstantDelay {
    /// Create a recording delay
    pub fn new() -> Self {
        Self::default()
    }

    /// Durations requested so far
    pub fn slept(&self) -> Vec<Duration> {
        self.slept
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Delay for InstantDelay {
    async fn sleep(&self, duration: Duration) {
        if let Ok(mut guard) = self.slept.lock() {
            guard.push(duration);
        }
    }
}

// ---------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------

/// Client for the backchannel authorization server
#[derive(Debug)]
pub struct CibaClient {
    http: Client,
    endpoint: String,
    server_id: String,
    delay: Arc<dyn Delay>,
}

impl CibaClient {
    /// Create a client from configuration
    ///
    /// # Arguments
    ///
    /// * `config` - Validated configuration carrying endpoint and server identity
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be constructed
    pub fn new(config: &Config) -> Result<Self> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(format!("cibauth/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(CibauthError::Http)?;

        Ok(Self {
            http,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            server_id: config.server.id.clone(),
            delay: Arc::new(TokioDelay),
        })
    }

    /// Replace the sleep implementation
    ///
    /// Tests use this with [`InstantDelay`] to drive the polling loop
    /// without real waiting.
    pub fn with_delay(mut self, delay: Arc<dyn Delay>) -> Self {
        self.delay = delay;
        self
    }

    /// Base URL of the authorization server, trailing slash trimmed
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Open an authorization transaction
    ///
    /// Sends the configured server identity as a form-encoded body. The
    /// server answers with either a challenge or a structured error; an
    /// error reply means no transaction exists and polling must never
    /// start.
    ///
    /// # Returns
    ///
    /// Returns the open challenge with its token and polling budget
    ///
    /// # Errors
    ///
    /// Returns [`CibauthError::Server`] on an error reply, or the
    /// underlying transport/decode error
    pub async fn request_authorization(&self) -> Result<AuthorizationChallenge> {
        let url = format!("{}/api/ciba", self.endpoint);
        tracing::debug!(url = %url, server_id = %self.server_id, "Opening authorization transaction");

        let value: serde_json::Value = self
            .http
            .post(&url)
            .form(&AuthorizationRequest {
                server_id: self.server_id.clone(),
            })
            .send()
            .await
            .map_err(CibauthError::Http)?
            .json()
            .await
            .map_err(CibauthError::Http)?;

        match protocol::decode::<ChallengeResponse>(value)? {
            ServerReply::Ok(response) => {
                let challenge = AuthorizationChallenge::from(response);
                tracing::info!(
                    timeout = challenge.timeout_seconds,
                    "Authorization transaction open"
                );
                Ok(challenge)
            }
            ServerReply::Err(error) => {
                tracing::warn!(code = %error.error, "Authorization request rejected");
                Err(error.into_server_error().into())
            }
        }
    }

    /// Poll until the transaction resolves or the budget runs out
    ///
    /// Each iteration sleeps exactly [`POLL_INTERVAL`], decrements the
    /// remaining budget, then issues one poll request. The budget check
    /// runs after the reply is handled, so a budget of T allows up to
    /// T + 1 requests.
    ///
    /// # Arguments
    ///
    /// * `challenge` - The open transaction to poll
    /// * `session` - Receives the informational notice when the budget runs out
    ///
    /// # Returns
    ///
    /// Returns the username resolved by the server
    ///
    /// # Errors
    ///
    /// Returns [`CibauthError::Server`] on a terminal error reply,
    /// [`CibauthError::PollTimeout`] when the budget runs out, or the
    /// underlying transport/decode error
    pub async fn poll_for_identity(
        &self,
        challenge: &AuthorizationChallenge,
        session: &dyn Session,
    ) -> Result<String> {
        let mut remaining = challenge.timeout_seconds as i64;

        loop {
            self.delay.sleep(POLL_INTERVAL).await;
            remaining -= 1;

            // Only a pending reply falls through to the budget check.
            let pending = match self.poll_once(&challenge.token).await? {
                PollOutcome::Resolved(username) => {
                    tracing::info!("Authorization approved");
                    return Ok(username);
                }
                PollOutcome::Failed(error) => {
                    tracing::warn!(code = %error.error, "Authorization failed");
                    return Err(error.into_server_error().into());
                }
                PollOutcome::Pending(error) => {
                    tracing::debug!(remaining, "Authorization pending");
                    error
                }
            };

            if remaining < 0 {
                if let Err(e) = session.notify(TIMEOUT_NOTICE) {
                    tracing::warn!("Failed to deliver timeout notice: {}", e);
                }
                return Err(CibauthError::PollTimeout {
                    code: Some(pending.error),
                    description: Some(pending.error_description),
                }
                .into());
            }
        }
    }

    /// Issue a single poll request for the transaction state
    async fn poll_once(&self, token: &str) -> Result<PollOutcome> {
        let url = format!("{}/api/ciba/{}", self.endpoint, token);

        let value: serde_json::Value = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(CibauthError::Http)?
            .json()
            .await
            .map_err(CibauthError::Http)?;

        Ok(protocol::decode::<IdentityResponse>(value)?.into())
    }
}
