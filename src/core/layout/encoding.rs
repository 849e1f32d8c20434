#![allow(clippy::result_large_err)]

use crate::core::error::{AppError, FormatErrorKind};

/// Decode UTF-16 layout bytes.
///
/// A byte-order mark selects the endianness; without one the bytes are read
/// as little-endian. A leading U+FEFF is never part of the returned text.
pub fn decode_utf16(bytes: &[u8]) -> Result<String, AppError> {
    let (body, big_endian) = match bytes {
        [0xFE, 0xFF, rest @ ..] => (rest, true),
        [0xFF, 0xFE, rest @ ..] => (rest, false),
        _ => (bytes, false),
    };

    if body.len() % 2 != 0 {
        return Err(AppError::format(
            FormatErrorKind::DecodeFailure,
            format!(
                "Layout has an odd byte length ({}) for 16-bit text",
                bytes.len()
            ),
        ));
    }

    let units: Vec<u16> = body
        .chunks_exact(2)
        .map(|pair| {
            if big_endian {
                u16::from_be_bytes([pair[0], pair[1]])
            } else {
                u16::from_le_bytes([pair[0], pair[1]])
            }
        })
        .collect();

    let text = String::from_utf16(&units).map_err(|e| {
        AppError::format(
            FormatErrorKind::DecodeFailure,
            "Layout contains invalid UTF-16 sequences",
        )
        .with_cause(e)
    })?;

    Ok(match text.strip_prefix('\u{feff}') {
        Some(stripped) => stripped.to_string(),
        None => text,
    })
}
