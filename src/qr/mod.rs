//! QR encoding and terminal rendering for cibauth
//!
//! This module turns text payloads into scannable blocks of terminal
//! output.
//!
//! # Module Layout
//!
//! - `encode` -- Payload to module grid via the `qrcode` crate
//! - `render` -- Module grid to ANSI-painted half-block or double-wide text

pub mod encode;
pub mod render;

pub use encode::encode;
pub use render::{render, Density, ModuleGrid, RenderOptions};
