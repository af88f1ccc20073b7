//! Wire types for the backchannel authorization protocol
//!
//! The server speaks JSON over two endpoints: `POST /api/ciba` opens a
//! transaction, `GET /api/ciba/{token}` reports its state. Either
//! endpoint may answer with a structured error object instead of its
//! success payload, so every reply is decoded once at the network
//! boundary into a [`ServerReply`] and never re-inspected downstream.

use crate::error::{CibauthError, Result};
use serde::Deserialize;

/// Reserved error code meaning the user has not decided yet
pub const AUTHORIZATION_PENDING: &str = "authorization_pending";

/// Structured error object returned by the authorization server
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ApiError {
    /// Machine-readable error code
    pub error: String,
    /// Human-readable detail; servers may omit it
    #[serde(default)]
    pub error_description: String,
}

impl ApiError {
    /// Convert into the crate error, preserving both fields verbatim
    pub fn into_server_error(self) -> CibauthError {
        CibauthError::Server {
            code: self.error,
            description: self.error_description,
        }
    }
}

/// Successful reply to an issuance request
#[derive(Debug, Deserialize)]
pub struct ChallengeResponse {
    /// Opaque transaction token; some servers issue it as a JSON number
    #[serde(deserialize_with = "token_string")]
    pub ciba_token: String,
    /// Polling budget in seconds
    pub timeout: u64,
}

/// Successful reply to a poll request
#[derive(Debug, Deserialize)]
pub struct IdentityResponse {
    /// Username resolved by the authorization server
    pub username: String,
}

/// An open authorization transaction
#[derive(Debug, Clone)]
pub struct AuthorizationChallenge {
    /// Opaque token identifying the transaction
    pub token: String,
    /// Seconds the server will keep the transaction open
    pub timeout_seconds: u64,
}

impl From<ChallengeResponse> for AuthorizationChallenge {
    fn from(response: ChallengeResponse) -> Self {
        Self {
            token: response.ciba_token,
            timeout_seconds: response.timeout,
        }
    }
}

/// A server reply decoded at the network boundary
///
/// Success and error payloads share the HTTP 200 status; the presence of
/// an `error` key decides which one arrived.
#[derive(Debug)]
pub enum ServerReply<T> {
    /// The operation's success payload
    Ok(T),
    /// A structured error object
    Err(ApiError),
}

/// Outcome of a single poll request
#[derive(Debug)]
pub enum PollOutcome {
    /// The user has not decided yet; carries the pending reply so its
    /// fields can be surfaced if the budget runs out
    Pending(ApiError),
    /// The user approved; carries the resolved username
    Resolved(String),
    /// The server reported a terminal error
    Failed(ApiError),
}

impl From<ServerReply<IdentityResponse>> for PollOutcome {
    fn from(reply: ServerReply<IdentityResponse>) -> Self {
        match reply {
            ServerReply::Ok(identity) => PollOutcome::Resolved(identity.username),
            ServerReply::Err(error) if error.error == AUTHORIZATION_PENDING => {
                PollOutcome::Pending(error)
            }
            ServerReply::Err(error) => PollOutcome::Failed(error),
        }
    }
}

/// Decode a raw JSON reply into payload or structured error
///
/// # Errors
///
/// Returns an error when the body matches neither the error shape nor
/// the expected success payload.
pub fn decode<T>(value: serde_json::Value) -> Result<ServerReply<T>>
where
    T: serde::de::DeserializeOwned,
{
    if value.get("error").is_some() {
        let error: ApiError = serde_json::from_value(value).map_err(CibauthError::Serialization)?;
        Ok(ServerReply::Err(error))
    } else {
        let payload: T = serde_json::from_value(value).map_err(CibauthError::Serialization)?;
        Ok(ServerReply::Ok(payload))
    }
}

/// Accept the token as a JSON string or number, normalized to a string
fn token_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum TokenValue {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match TokenValue::deserialize(deserializer)? {
        TokenValue::Text(text) => text,
        TokenValue::Number(number) => number.to_string(),
    })
}
