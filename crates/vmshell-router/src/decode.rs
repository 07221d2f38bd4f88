//! Helper output decoding.
//!
//! `wsl --list` writes UTF-16LE regardless of the console code page, so its
//! bytes must be transcoded before any line splitting. Everything else is
//! treated as the host's native text (UTF-8 in practice).

use std::fmt::Write as _;
use thiserror::Error;

/// Byte-order mark some UTF-16LE producers emit.
const UTF16LE_BOM: [u8; 2] = [0xFF, 0xFE];

/// How many leading bytes of malformed input an error carries.
const ERROR_PREFIX_LEN: usize = 12;

/// Encoding of a helper's raw output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputEncoding {
    /// Little-endian UTF-16, optionally starting with a byte-order mark.
    Utf16Le,
    /// Host-native text, decoded as UTF-8 with replacement characters.
    Native,
}

/// Malformed UTF-16LE output.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("malformed UTF-16LE output ({reason}), starting with [{prefix}]")]
pub struct DecodeError {
    /// Hex dump of the first bytes of the input.
    pub prefix: String,
    pub reason: String,
}

impl DecodeError {
    fn new(raw: &[u8], reason: impl Into<String>) -> Self {
        let mut prefix = String::new();
        for (i, byte) in raw.iter().take(ERROR_PREFIX_LEN).enumerate() {
            if i > 0 {
                prefix.push(' ');
            }
            let _ = write!(prefix, "{byte:02x}");
        }
        if raw.len() > ERROR_PREFIX_LEN {
            prefix.push_str(" ...");
        }
        Self {
            prefix,
            reason: reason.into(),
        }
    }
}

/// Decode helper output into text.
///
/// # Errors
/// Only [`OutputEncoding::Utf16Le`] can fail: on an odd byte count or an
/// unpaired surrogate. Malformed input is never papered over with
/// replacement characters, since a mangled distribution name would silently
/// fail to match.
pub fn decode_output(raw: &[u8], encoding: OutputEncoding) -> Result<String, DecodeError> {
    match encoding {
        OutputEncoding::Native => Ok(String::from_utf8_lossy(raw).into_owned()),
        OutputEncoding::Utf16Le => decode_utf16le(raw),
    }
}

fn decode_utf16le(raw: &[u8]) -> Result<String, DecodeError> {
    let body = raw.strip_prefix(&UTF16LE_BOM).unwrap_or(raw);
    if body.len() % 2 != 0 {
        return Err(DecodeError::new(
            raw,
            format!("odd byte count {}", body.len()),
        ));
    }

    let units = body
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]));
    char::decode_utf16(units)
        .collect::<Result<String, _>>()
        .map_err(|e| {
            DecodeError::new(
                raw,
                format!("unpaired surrogate 0x{:04x}", e.unpaired_surrogate()),
            )
        })
}
