//! AES-256-GCM-SIV sealing and opening of opaque byte messages.
//!
//! **Algorithm choice:** AES-256-GCM-SIV (RFC 8452) is nonce-misuse-resistant.
//! A fresh random nonce is still drawn for every seal; SIV only limits the
//! damage if the OS CSPRNG ever repeats one.
//!
//! **Do NOT substitute plain AES-256-GCM with a fixed nonce.** GCM nonce reuse
//! is catastrophic — it breaks both confidentiality and authentication.

use aes_gcm_siv::{
    aead::{Aead, KeyInit, OsRng},
    Aes256GcmSiv, Nonce,
};
use thiserror::Error;

use super::key::{Key, KEY_LEN};

/// Byte length of an AES-GCM-SIV nonce (12 bytes = 96 bits).
pub const NONCE_LEN: usize = 12;

/// Byte length of the authentication tag appended by AES-GCM-SIV.
pub const TAG_LEN: usize = 16;

/// Errors produced by the cipher layer.
#[derive(Debug, Error)]
pub enum CipherError {
    /// Key material is the wrong length (must be [`KEY_LEN`] bytes).
    #[error("key must be exactly {KEY_LEN} bytes, got {got} bytes")]
    InvalidKeyLength { got: usize },

    /// The sealed message is too short to hold a nonce and a tag.
    #[error("sealed message too short: {len} bytes")]
    Truncated { len: usize },

    /// AES-GCM-SIV encryption or decryption failed (wrong key or tampered data).
    #[error("aead operation failed")]
    AeadFailure,
}

/// The seal/open capability consumed by the manager.
///
/// Implementations own the sealed-message layout: whatever nonce and tag
/// material they need must be bundled into the returned bytes.
pub trait Primitive: Send + Sync {
    /// Encrypt and authenticate `plaintext` under `key`.
    fn seal(&self, key: &Key, plaintext: &[u8]) -> Result<Vec<u8>, CipherError>;

    /// Verify and decrypt a message produced by [`Primitive::seal`].
    fn open(&self, key: &Key, sealed: &[u8]) -> Result<Vec<u8>, CipherError>;
}

/// Default primitive: AES-256-GCM-SIV with a random nonce prepended.
///
/// Sealed layout:
///
/// ```text
/// nonce (12) || ciphertext (len(plaintext)) || tag (16)
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct AesGcmSiv;

impl Primitive for AesGcmSiv {
    fn seal(&self, key: &Key, plaintext: &[u8]) -> Result<Vec<u8>, CipherError> {
        let cipher = build_cipher(key)?;

        // Use OsRng for a cryptographically secure random nonce.
        use aes_gcm_siv::aead::rand_core::RngCore;
        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, plaintext)
            .map_err(|_| CipherError::AeadFailure)?;

        let mut sealed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        sealed.extend_from_slice(&nonce_bytes);
        sealed.extend_from_slice(&ciphertext);
        Ok(sealed)
    }

    fn open(&self, key: &Key, sealed: &[u8]) -> Result<Vec<u8>, CipherError> {
        if sealed.len() < NONCE_LEN + TAG_LEN {
            return Err(CipherError::Truncated { len: sealed.len() });
        }
        let cipher = build_cipher(key)?;
        let (nonce_bytes, ciphertext) = sealed.split_at(NONCE_LEN);
        cipher
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|_| CipherError::AeadFailure)
    }
}

fn build_cipher(key: &Key) -> Result<Aes256GcmSiv, CipherError> {
    Aes256GcmSiv::new_from_slice(key.as_bytes())
        .map_err(|_| CipherError::InvalidKeyLength { got: key.as_bytes().len() })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn random_key() -> Key {
        use aes_gcm_siv::aead::rand_core::RngCore;
        let mut bytes = [0u8; KEY_LEN];
        OsRng.fill_bytes(&mut bytes);
        Key::from_bytes(bytes)
    }

    #[test]
    fn seal_open_round_trip() {
        let key = random_key();
        let sealed = AesGcmSiv.seal(&key, b"client-secret").unwrap();
        assert_eq!(AesGcmSiv.open(&key, &sealed).unwrap(), b"client-secret");
    }

    #[test]
    fn sealed_layout_is_nonce_ciphertext_tag() {
        let key = random_key();
        let sealed = AesGcmSiv.seal(&key, b"12345").unwrap();
        assert_eq!(sealed.len(), NONCE_LEN + 5 + TAG_LEN);
    }

    #[test]
    fn empty_plaintext_round_trips() {
        let key = random_key();
        let sealed = AesGcmSiv.seal(&key, b"").unwrap();
        assert_eq!(sealed.len(), NONCE_LEN + TAG_LEN);
        assert!(AesGcmSiv.open(&key, &sealed).unwrap().is_empty());
    }

    #[test]
    fn fresh_nonce_per_seal() {
        let key = random_key();
        let a = AesGcmSiv.seal(&key, b"same").unwrap();
        let b = AesGcmSiv.seal(&key, b"same").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn wrong_key_fails_open() {
        let sealed = AesGcmSiv.seal(&random_key(), b"secret").unwrap();
        assert!(matches!(
            AesGcmSiv.open(&random_key(), &sealed),
            Err(CipherError::AeadFailure)
        ));
    }

    #[test]
    fn tampered_message_fails_auth() {
        let key = random_key();
        let mut sealed = AesGcmSiv.seal(&key, b"tamper me").unwrap();
        // Flip a byte in the ciphertext body to simulate tampering.
        sealed[NONCE_LEN] ^= 0xFF;
        assert!(AesGcmSiv.open(&key, &sealed).is_err());
    }

    #[test]
    fn short_message_is_truncated() {
        let key = random_key();
        let err = AesGcmSiv.open(&key, &[0u8; NONCE_LEN + TAG_LEN - 1]).unwrap_err();
        assert!(matches!(err, CipherError::Truncated { len } if len == NONCE_LEN + TAG_LEN - 1));
    }
}
