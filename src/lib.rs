//! cibauth - Terminal backchannel login library
//!
//! This library provides the core functionality for cibauth: the
//! backchannel authorization client and login flow, terminal QR
//! rendering, local account provisioning, and configuration.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `ciba`: Authorization protocol, polling client, and the login flow
//! - `qr`: QR symbol encoding and ANSI terminal rendering
//! - `session`: Host session boundary (prompt, notices, identity)
//! - `provision`: Local account provisioning
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use cibauth::ciba::AuthFlow;
//! use cibauth::provision::UnixAccountProvisioner;
//! use cibauth::session::TerminalSession;
//! use cibauth::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("/etc/cibauth/config.yml", &Default::default())?;
//!     config.validate()?;
//!
//!     let flow = AuthFlow::new(config)?;
//!     let session = TerminalSession::new();
//!     let username = flow.run(&session, &UnixAccountProvisioner::new()).await?;
//!     println!("hello {}", username);
//!     Ok(())
//! }
//! ```

pub mod ciba;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod provision;
pub mod qr;
pub mod session;

// Re-export commonly used types
pub use ciba::{AuthFlow, AuthorizationChallenge, CibaClient};
pub use config::Config;
pub use error::{CibauthError, Result};
pub use qr::{ModuleGrid, RenderOptions};
pub use session::{Session, TerminalSession};
