//! Backchannel authorization for cibauth
//!
//! This module carries the whole server conversation: opening a
//! transaction, polling it once per second, and sequencing the
//! end-to-end login flow.
//!
//! # Module Layout
//!
//! - `protocol` -- Wire types and boundary decoding
//! - `client`   -- HTTP client and the bounded polling loop
//! - `flow`     -- The end-to-end login flow

pub mod client;
pub mod flow;
pub mod protocol;

pub use client::{CibaClient, Delay, InstantDelay, TokioDelay, POLL_INTERVAL, TIMEOUT_NOTICE};
pub use flow::AuthFlow;
pub use protocol::{ApiError, AuthorizationChallenge, PollOutcome, AUTHORIZATION_PENDING};
