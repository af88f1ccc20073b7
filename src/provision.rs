//! Local account provisioning
//!
//! After the server resolves a username the flow makes sure a matching
//! local group and user exist before the identity is recorded. The
//! username arrives from the network, so it is validated against a
//! conservative account-name pattern before any system command runs.

use std::sync::Mutex;

use async_trait::async_trait;
use regex::Regex;
use tokio::process::Command;

use crate::error::{CibauthError, Result};

/// Account names accepted for provisioning
const USERNAME_PATTERN: &str = "^[a-z_][a-z0-9_-]{0,31}$";

/// Ensures a local account exists for an authenticated username
#[async_trait]
pub trait AccountProvisioner: Send + Sync {
    /// Ensure a local group and user exist for `username`
    ///
    /// # Errors
    ///
    /// Returns error if the username is unacceptable or a missing
    /// account cannot be created
    async fn ensure_account(&self, username: &str) -> Result<()>;
}

/// Provisioner backed by the system account database
///
/// Checks `getent` and creates missing entries with `groupadd` and
/// `useradd`. Creation needs the privileges of the running process;
/// already-existing accounts pass without any privileged call.
#[derive(Debug)]
pub struct UnixAccountProvisioner {
    username_pattern: Regex,
}

impl UnixAccountProvisioner {
    /// Create a provisioner
    pub fn new() -> Self {
        Self {
            username_pattern: Regex::new(USERNAME_PATTERN).expect("Invalid username pattern"),
        }
    }

    async fn entry_exists(&self, database: &str, name: &str) -> Result<bool> {
        let output = Command::new("getent")
            .arg(database)
            .arg(name)
            .output()
            .await
            .map_err(|e| CibauthError::Provision(format!("Failed to run getent: {}", e)))?;
        Ok(output.status.success())
    }

    async fn run_admin(&self, program: &str, args: &[&str]) -> Result<()> {
        let output = Command::new(program)
            .args(args)
            .output()
            .await
            .map_err(|e| CibauthError::Provision(format!("Failed to run {}: {}", program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CibauthError::Provision(format!(
                "{} exited with {}: {}",
                program,
                output.status,
                stderr.trim()
            ))
            .into());
        }

        Ok(())
    }
}

impl Default for UnixAccountProvisioner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AccountProvisioner for UnixAccountProvisioner {
    async fn ensure_account(&self, username: &str) -> Result<()> {
        if !self.username_pattern.is_match(username) {
            return Err(CibauthError::Provision(format!(
                "Unacceptable username from server: {:?}",
                username
            ))
            .into());
        }

        if !self.entry_exists("group", username).await? {
            tracing::info!(group = %username, "Group does not exist, creating it");
            self.run_admin("groupadd", &[username]).await?;
        }

        if !self.entry_exists("passwd", username).await? {
            tracing::info!(user = %username, "User does not exist, creating it");
            self.run_admin("useradd", &["-m", "-g", username, username])
                .await?;
        }

        Ok(())
    }
}

/// In-process provisioner for use in tests
///
/// Records every username it is asked to provision; optionally fails
/// every call with a fixed message to exercise abort paths.
#[derive(Debug, Default)]
pub struct RecordingProvisioner {
    provisioned: Mutex<Vec<String>>,
    fail_with: Option<String>,
}

impl RecordingProvisioner {
    /// Create a provisioner that accepts every username
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a provisioner that fails every call with the given message
    pub fn failing(message: &str) -> Self {
        Self {
            provisioned: Mutex::new(Vec::new()),
            fail_with: Some(message.to_string()),
        }
    }

    /// Usernames provisioned so far
    pub fn provisioned(&self) -> Vec<String> {
        self.provisioned
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl AccountProvisioner for RecordingProvisioner {
    async fn ensure_account(&self, username: &str) -> Result<()> {
        if let Some(message) = &self.fail_with {
            return Err(CibauthError::Provision(message.clone()).into());
        }
        let mut guard = self.provisioned.lock().map_err(|_| {
            CibauthError::Provision("Failed to acquire lock on provisioned".to_string())
        })?;
        guard.push(username.to_string());
        Ok(())
    }
}
