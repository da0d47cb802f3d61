//! Errors returned by [`AeadManager`](crate::AeadManager).
//!
//! Variants are split so callers can tell configuration defects
//! ([`AeadError::NoKeyConfigured`], [`AeadError::InvalidKeyLength`]) from data
//! defects ([`AeadError::MalformedCiphertext`], [`AeadError::DecryptionFailed`])
//! and from key retrieval problems.

use std::fmt;

use thiserror::Error;

use crate::codec::CodecError;
use crate::crypto::{CipherError, KEY_LEN};
use crate::keys::KeySourceError;

/// Top-level error for encrypt/decrypt calls.
#[derive(Debug, Error)]
pub enum AeadError {
    /// The key source reported no primary key.
    #[error("at least one encryption key must be configured but none were")]
    NoKeyConfigured,

    /// The key at `position` is not exactly [`KEY_LEN`] bytes.
    #[error("key at position {position} must be exactly {KEY_LEN} bytes, got {got} bytes")]
    InvalidKeyLength { position: usize, got: usize },

    /// The ciphertext text could not be decoded. Not retried per key.
    #[error("malformed ciphertext: {0}")]
    MalformedCiphertext(#[from] CodecError),

    /// The primitive rejected a seal with a valid key. Should not happen.
    #[error("sealing failed: {0}")]
    SealFailed(#[source] CipherError),

    /// No configured key opened the message.
    #[error("unable to decrypt with any configured key ({0})")]
    DecryptionFailed(#[source] DecryptAttempts),

    /// The caller's cancellation token fired before keys were retrieved.
    #[error("key retrieval cancelled")]
    Cancelled,

    /// The key source did not answer within the configured timeout.
    #[error("key retrieval timed out")]
    KeyFetchTimedOut,

    /// The key source failed.
    #[error("key source error: {0}")]
    KeySource(#[source] KeySourceError),
}

impl AeadError {
    /// The failure of the last key tried, if this is a decryption failure.
    pub fn last_attempt(&self) -> Option<&KeyAttemptError> {
        match self {
            AeadError::DecryptionFailed(attempts) => attempts.last(),
            _ => None,
        }
    }

    /// Returns `true` for errors caused by key configuration rather than data.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            AeadError::NoKeyConfigured | AeadError::InvalidKeyLength { .. }
        )
    }
}

impl From<KeySourceError> for AeadError {
    fn from(err: KeySourceError) -> Self {
        match err {
            KeySourceError::Cancelled => AeadError::Cancelled,
            other => AeadError::KeySource(other),
        }
    }
}

/// Why one key in the set did not open the message.
#[derive(Debug, Error)]
#[error("key {position}: {cause}")]
pub struct KeyAttemptError {
    /// Position of the key in the key set (0 = primary).
    pub position: usize,
    /// What went wrong with this key.
    #[source]
    pub cause: CipherError,
}

/// Every per-key failure of a decryption, in trial order.
///
/// `source()` yields the last attempt, so error chains report the final key
/// tried while the full list stays available for diagnostics.
#[derive(Debug)]
pub struct DecryptAttempts(Vec<KeyAttemptError>);

impl DecryptAttempts {
    pub(crate) fn new(attempts: Vec<KeyAttemptError>) -> Self {
        Self(attempts)
    }

    /// Number of keys tried.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no key was tried.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The last key's failure.
    pub fn last(&self) -> Option<&KeyAttemptError> {
        self.0.last()
    }

    /// Iterate failures in trial order.
    pub fn iter(&self) -> impl Iterator<Item = &KeyAttemptError> {
        self.0.iter()
    }
}

impl fmt::Display for DecryptAttempts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.last() {
            Some(last) => write!(f, "{} key(s) tried, last {last}", self.0.len()),
            None => f.write_str("no keys tried"),
        }
    }
}

impl std::error::Error for DecryptAttempts {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0
            .last()
            .map(|attempt| attempt as &(dyn std::error::Error + 'static))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    fn attempts() -> DecryptAttempts {
        DecryptAttempts::new(vec![
            KeyAttemptError {
                position: 0,
                cause: CipherError::AeadFailure,
            },
            KeyAttemptError {
                position: 1,
                cause: CipherError::InvalidKeyLength { got: 16 },
            },
        ])
    }

    #[test]
    fn display_names_the_last_key() {
        let err = AeadError::DecryptionFailed(attempts());
        let msg = err.to_string();
        assert!(msg.contains("2 key(s) tried"), "{msg}");
        assert!(msg.contains("key 1"), "{msg}");
        assert!(msg.contains("got 16 bytes"), "{msg}");
    }

    #[test]
    fn source_chain_ends_at_last_cause() {
        let err = AeadError::DecryptionFailed(attempts());
        let attempts = err.source().unwrap();
        let last = attempts.source().unwrap();
        assert_eq!(last.to_string(), "key 1: key must be exactly 32 bytes, got 16 bytes");
        assert_eq!(err.last_attempt().unwrap().position, 1);
    }

    #[test]
    fn cancellation_from_source_maps_to_cancelled() {
        assert!(matches!(
            AeadError::from(KeySourceError::Cancelled),
            AeadError::Cancelled
        ));
        assert!(matches!(
            AeadError::from(KeySourceError::Unavailable("down".into())),
            AeadError::KeySource(_)
        ));
    }

    #[test]
    fn configuration_errors_are_classified() {
        assert!(AeadError::NoKeyConfigured.is_configuration());
        assert!(AeadError::InvalidKeyLength { position: 0, got: 16 }.is_configuration());
        assert!(!AeadError::Cancelled.is_configuration());
        assert!(!AeadError::DecryptionFailed(attempts()).is_configuration());
    }
}
