//! Host session boundary
//!
//! The login flow talks to the person at the terminal through a small
//! capability surface: deliver an informational message, present the
//! prompt, and record the authenticated identity. Keeping the surface
//! behind a trait lets the same flow run under the CLI, under tests with
//! [`RecordingSession`], or embedded in another host program.

use std::sync::Mutex;

use crate::error::{CibauthError, Result};

/// Capabilities the host session exposes to the login flow
pub trait Session: Send + Sync {
    /// Deliver an informational message; no response is expected
    fn notify(&self, message: &str) -> Result<()>;

    /// Present the login prompt where the user can read it while they
    /// approve on a second device
    fn prompt_visible(&self, message: &str) -> Result<()>;

    /// Record the authenticated identity on the session
    fn set_identity(&self, username: &str) -> Result<()>;
}

/// Session backed by the controlling terminal
///
/// Messages go to stdout. The recorded identity stays readable after the
/// flow finishes so the caller can report it.
#[derive(Debug, Default)]
pub struct TerminalSession {
    identity: Mutex<Option<String>>,
}

impl TerminalSession {
    /// Create a terminal session
    pub fn new() -> Self {
        Self::default()
    }

    /// Identity recorded by the flow, if any
    pub fn identity(&self) -> Option<String> {
        self.identity.lock().ok().and_then(|guard| guard.clone())
    }
}

impl Session for TerminalSession {
    fn notify(&self, message: &str) -> Result<()> {
        println!("{}", message);
        Ok(())
    }

    fn prompt_visible(&self, message: &str) -> Result<()> {
        println!("{}", message);
        Ok(())
    }

    fn set_identity(&self, username: &str) -> Result<()> {
        let mut guard = self.identity.lock().map_err(|_| {
            CibauthError::Session("Failed to acquire lock on identity".to_string())
        })?;
        *guard = Some(username.to_string());
        tracing::info!(username = %username, "Recorded authenticated identity");
        Ok(())
    }
}

/// In-process session for use in tests
///
/// Captures everything the flow pushes through the session surface so
/// tests can assert on notifications, prompts, and the recorded
/// identity without a terminal.
#[derive(Debug, Default)]
pub struct RecordingSession {
    notices: Mutex<Vec<String>>,
    prompts: Mutex<Vec<String>>,
    identity: Mutex<Option<String>>,
}

impl RecordingSession {
    /// Create an empty recording session
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages delivered through [`Session::notify`]
    pub fn notices(&self) -> Vec<String> {
        self.notices.lock().map(|guard| guard.clone()).unwrap_or_default()
    }

    /// All messages delivered through [`Session::prompt_visible`]
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|guard| guard.clone()).unwrap_or_default()
    }

    /// Identity recorded by the flow, if any
    pub fn identity(&self) -> Option<String> {
        self.identity.lock().ok().and_then(|guard| guard.clone())
    }
}

impl Session for RecordingSession {
    fn notify(&self, message: &str) -> Result<()> {
        let mut guard = self.notices.lock().map_err(|_| {
            CibauthError::Session("Failed to acquire lock on notices".to_string())
        })?;
        guard.push(message.to_string());
        Ok(())
    }

    fn prompt_visible(&self, message: &str) -> Result<()> {
        let mut guard = self.prompts.lock().map_err(|_| {
            CibauthError::Session("Failed to acquire lock on prompts".to_string())
        })?;
        guard.push(message.to_string());
        Ok(())
    }

    fn set_identity(&self, username: &str) -> Result<()> {
        let mut guard = self.identity.lock().map_err(|_| {
            CibauthError::Session("Failed to acquire lock on identity".to_string())
        })?;
        *guard = Some(username.to_string());
        Ok(())
    }
}
