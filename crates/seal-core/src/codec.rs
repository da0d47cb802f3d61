//! Text encoding of sealed messages for storage and transport.
//!
//! Sealed bytes are written as padded URL-safe base64 (RFC 4648 §5). The
//! output contains only `A-Z a-z 0-9 - _ =` and never a newline, so it can be
//! stored in text columns, URLs and file names without further escaping.
//!
//! Decoding is strict: non-alphabet characters, missing or superfluous
//! padding and non-canonical trailing bits are all rejected.

use base64::{engine::general_purpose::URL_SAFE, Engine as _};
use thiserror::Error;

/// Errors produced when decoding ciphertext text.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The text is not valid padded URL-safe base64.
    #[error("malformed ciphertext encoding: {0}")]
    Malformed(#[from] base64::DecodeError),
}

/// Encode a sealed message as URL-safe text.
pub fn encode(sealed: &[u8]) -> String {
    URL_SAFE.encode(sealed)
}

/// Decode text produced by [`encode`] back into the sealed bytes.
///
/// # Errors
///
/// Returns [`CodecError::Malformed`] on any non-conforming input.
pub fn decode(text: &str) -> Result<Vec<u8>, CodecError> {
    Ok(URL_SAFE.decode(text)?)
}
