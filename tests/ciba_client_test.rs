//! Backchannel authorization client integration tests using wiremock
//!
//! Verifies the wire contract of `src/ciba/client.rs`:
//!
//! - Issuance posts a form-encoded `server_id` and parses the challenge,
//!   including tokens issued as JSON numbers.
//! - An issuance error reply fails with a `Server` error and polling
//!   never starts.
//! - K pending replies followed by approval produce exactly K + 1 poll
//!   requests at a fixed one-second cadence.
//! - A terminal error reply stops polling immediately.
//! - Budget exhaustion produces `PollTimeout` after T + 1 requests,
//!   carries the last pending reply's fields, and delivers the timeout
//!   notice through the session.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path, path_regex};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

use cibauth::ciba::{
    AuthorizationChallenge, CibaClient, InstantDelay, POLL_INTERVAL, TIMEOUT_NOTICE,
};
use cibauth::config::Config;
use cibauth::error::CibauthError;
use cibauth::session::RecordingSession;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Builds a config pointing at the given wiremock server URL.
fn make_config(endpoint: &str) -> Config {
    let mut config = Config::default();
    config.endpoint = endpoint.to_string();
    config.server.id = "test-server".to_string();
    config
}

/// Builds a client with an instant (recording) sleep implementation.
fn make_client(endpoint: &str) -> (CibaClient, Arc<InstantDelay>) {
    let delay = Arc::new(InstantDelay::new());
    let client = CibaClient::new(&make_config(endpoint))
        .expect("client construction must not fail")
        .with_delay(delay.clone());
    (client, delay)
}

/// Responds `authorization_pending` to the first `pending_replies` poll
/// requests, then approves with the given username.
struct ApproveAfter {
    pending_replies: usize,
    username: String,
    seen: AtomicUsize,
}

impl ApproveAfter {
    fn new(pending_replies: usize, username: &str) -> Self {
        Self {
            pending_replies,
            username: username.to_string(),
            seen: AtomicUsize::new(0),
        }
    }
}

impl Respond for ApproveAfter {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let seen = self.seen.fetch_add(1, Ordering::SeqCst);
        if seen < self.pending_replies {
            ResponseTemplate::new(200).set_body_json(json!({
                "error": "authorization_pending",
                "error_description": "user has not decided yet"
            }))
        } else {
            ResponseTemplate::new(200).set_body_json(json!({ "username": self.username }))
        }
    }
}

/// Responds `authorization_pending` with a distinct description on every
/// poll request.
struct NumberedPending {
    seen: AtomicUsize,
}

impl NumberedPending {
    fn new() -> Self {
        Self {
            seen: AtomicUsize::new(0),
        }
    }
}

impl Respond for NumberedPending {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let seen = self.seen.fetch_add(1, Ordering::SeqCst) + 1;
        ResponseTemplate::new(200).set_body_json(json!({
            "error": "authorization_pending",
            "error_description": format!("still waiting after poll {seen}")
        }))
    }
}

// ---------------------------------------------------------------------------
// Issuance
// ---------------------------------------------------------------------------

/// Issuance must post a form-encoded `server_id` and parse the returned
/// challenge.
#[tokio::test]
async fn test_request_authorization_success() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/ciba"))
        .and(body_string_contains("server_id=test-server"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ciba_token": "tok-1",
            "timeout": 30
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _delay) = make_client(&server.uri());
    let challenge = client
        .request_authorization()
        .await
        .expect("issuance must succeed");

    assert_eq!(challenge.token, "tok-1");
    assert_eq!(challenge.timeout_seconds, 30);

    server.verify().await;
}

/// Some servers issue the token as a JSON number; it must be normalized
/// to a string so it can round-trip into poll and validate URLs.
#[tokio::test]
async fn test_request_authorization_accepts_numeric_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/ciba"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ciba_token": 424242,
            "timeout": 5
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _delay) = make_client(&server.uri());
    let challenge = client
        .request_authorization()
        .await
        .expect("issuance must succeed");

    assert_eq!(challenge.token, "424242");
}

/// An error reply at issuance must fail with a `Server` error carrying
/// both fields verbatim, and no poll request may ever be sent.
#[tokio::test]
async fn test_request_authorization_error_reply_fails_without_polling() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/ciba"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": "invalid_client",
            "error_description": "unknown server identity"
        })))
        .expect(1)
        .mount(&server)
        .await;

    // Polling the transaction state must never happen.
    Mock::given(method("GET"))
        .and(path_regex("^/api/ciba/.+$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let (client, _delay) = make_client(&server.uri());
    let error = client
        .request_authorization()
        .await
        .expect_err("issuance must fail on an error reply");

    match error.downcast_ref::<CibauthError>() {
        Some(CibauthError::Server { code, description }) => {
            assert_eq!(code, "invalid_client");
            assert_eq!(description, "unknown server identity");
        }
        other => panic!("expected Server error, got: {other:?}"),
    }

    server.verify().await;
}

// ---------------------------------------------------------------------------
// Polling: pending then approval
// ---------------------------------------------------------------------------

/// Three pending replies followed by approval must produce exactly four
/// poll requests, each preceded by a one-second pause.
#[tokio::test]
async fn test_poll_resolves_after_pending_replies() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/ciba/tok-1"))
        .respond_with(ApproveAfter::new(3, "jdoe"))
        .expect(4)
        .mount(&server)
        .await;

    let (client, delay) = make_client(&server.uri());
    let session = RecordingSession::new();
    let challenge = AuthorizationChallenge {
        token: "tok-1".to_string(),
        timeout_seconds: 30,
    };

    let username = client
        .poll_for_identity(&challenge, &session)
        .await
        .expect("polling must resolve once the user approves");

    assert_eq!(username, "jdoe");
    assert_eq!(
        delay.slept(),
        vec![POLL_INTERVAL; 4],
        "every request must be preceded by exactly one fixed-interval pause"
    );
    assert!(
        session.notices().is_empty(),
        "no notice is delivered on success"
    );

    server.verify().await;
}

/// Approval on the very first poll must produce exactly one request.
#[tokio::test]
async fn test_poll_resolves_on_first_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/ciba/tok-9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "username": "asmith" })))
        .expect(1)
        .mount(&server)
        .await;

    let (client, delay) = make_client(&server.uri());
    let session = RecordingSession::new();
    let challenge = AuthorizationChallenge {
        token: "tok-9".to_string(),
        timeout_seconds: 10,
    };

    let username = client
        .poll_for_identity(&challenge, &session)
        .await
        .expect("polling must resolve");

    assert_eq!(username, "asmith");
    assert_eq!(delay.slept().len(), 1);

    server.verify().await;
}

// ---------------------------------------------------------------------------
// Polling: terminal error
// ---------------------------------------------------------------------------

/// A non-pending error reply must stop the loop on the spot.
#[tokio::test]
async fn test_poll_fails_immediately_on_terminal_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/ciba/tok-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": "access_denied",
            "error_description": "user rejected the request"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (client, delay) = make_client(&server.uri());
    let session = RecordingSession::new();
    let challenge = AuthorizationChallenge {
        token: "tok-2".to_string(),
        timeout_seconds: 30,
    };

    let error = client
        .poll_for_identity(&challenge, &session)
        .await
        .expect_err("a terminal error reply must abort polling");

    match error.downcast_ref::<CibauthError>() {
        Some(CibauthError::Server { code, description }) => {
            assert_eq!(code, "access_denied");
            assert_eq!(description, "user rejected the request");
        }
        other => panic!("expected Server error, got: {other:?}"),
    }

    assert_eq!(delay.slept().len(), 1, "the loop must stop after one request");
    assert!(session.notices().is_empty());

    server.verify().await;
}

// ---------------------------------------------------------------------------
// Polling: budget exhaustion
// ---------------------------------------------------------------------------

/// A budget of T with a never-approving server allows exactly T + 1
/// requests; the timeout notice is delivered and the last pending
/// reply's fields ride along on the error.
#[tokio::test]
async fn test_poll_times_out_after_budget_plus_one_requests() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/ciba/tok-3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": "authorization_pending",
            "error_description": "user has not decided yet"
        })))
        .expect(4)
        .mount(&server)
        .await;

    let (client, delay) = make_client(&server.uri());
    let session = RecordingSession::new();
    let challenge = AuthorizationChallenge {
        token: "tok-3".to_string(),
        timeout_seconds: 3,
    };

    let error = client
        .poll_for_identity(&challenge, &session)
        .await
        .expect_err("polling must time out");

    match error.downcast_ref::<CibauthError>() {
        Some(CibauthError::PollTimeout { code, description }) => {
            assert_eq!(code.as_deref(), Some("authorization_pending"));
            assert_eq!(description.as_deref(), Some("user has not decided yet"));
        }
        other => panic!("expected PollTimeout error, got: {other:?}"),
    }

    assert_eq!(delay.slept(), vec![POLL_INTERVAL; 4]);
    assert_eq!(
        session.notices(),
        vec![TIMEOUT_NOTICE],
        "the timeout notice must reach the user"
    );

    server.verify().await;
}

/// The fields riding on the timeout error must come from the final
/// pending reply, not an earlier one.
#[tokio::test]
async fn test_poll_timeout_carries_final_pending_reply() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/ciba/tok-5"))
        .respond_with(NumberedPending::new())
        .expect(3)
        .mount(&server)
        .await;

    let (client, delay) = make_client(&server.uri());
    let session = RecordingSession::new();
    let challenge = AuthorizationChallenge {
        token: "tok-5".to_string(),
        timeout_seconds: 2,
    };

    let error = client
        .poll_for_identity(&challenge, &session)
        .await
        .expect_err("polling must time out");

    match error.downcast_ref::<CibauthError>() {
        Some(CibauthError::PollTimeout { code, description }) => {
            assert_eq!(code.as_deref(), Some("authorization_pending"));
            assert_eq!(description.as_deref(), Some("still waiting after poll 3"));
        }
        other => panic!("expected PollTimeout error, got: {other:?}"),
    }

    assert_eq!(delay.slept().len(), 3);

    server.verify().await;
}

/// A zero budget still sends one poll request before timing out.
#[tokio::test]
async fn test_poll_with_zero_budget_polls_once() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/ciba/tok-4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": "authorization_pending"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (client, delay) = make_client(&server.uri());
    let session = RecordingSession::new();
    let challenge = AuthorizationChallenge {
        token: "tok-4".to_string(),
        timeout_seconds: 0,
    };

    let error = client
        .poll_for_identity(&challenge, &session)
        .await
        .expect_err("polling must time out");

    match error.downcast_ref::<CibauthError>() {
        Some(CibauthError::PollTimeout { code, description }) => {
            assert_eq!(code.as_deref(), Some("authorization_pending"));
            assert_eq!(description.as_deref(), Some(""));
        }
        other => panic!("expected PollTimeout error, got: {other:?}"),
    }

    assert_eq!(delay.slept().len(), 1);
    assert_eq!(session.notices(), vec![TIMEOUT_NOTICE]);

    server.verify().await;
}
