//! QR symbol encoding
//!
//! Thin adapter around the `qrcode` crate that turns a text payload into
//! a [`ModuleGrid`] ready for terminal rendering. Error correction level
//! L keeps the symbol as small as the payload allows, which matters for
//! terminal real estate.

use crate::error::{CibauthError, Result};
use crate::qr::render::ModuleGrid;
use qrcode::{Color, EcLevel, QrCode};

/// Encode a text payload as a QR module grid
///
/// # Arguments
///
/// * `data` - The payload to encode (typically a URL)
///
/// # Errors
///
/// Returns [`CibauthError::Qr`] when the payload does not fit in any QR
/// version at error correction level L.
pub fn encode(data: &str) -> Result<ModuleGrid> {
    let code = QrCode::with_error_correction_level(data, EcLevel::L)
        .map_err(|e| CibauthError::Qr(format!("Failed to encode payload: {}", e)))?;

    let width = code.width();
    let rows = code
        .to_colors()
        .chunks(width)
        .map(|row| row.iter().map(|color| *color == Color::Dark).collect())
        .collect();

    tracing::debug!(modules = width, "Encoded QR symbol");
    Ok(ModuleGrid::from_rows(rows))
}
