//! [`AeadManager`]: authenticated encryption with key-rotation fallback.
//!
//! # Rotation
//!
//! Rotating a key means making a new key primary and demoting the old primary
//! to the rotated list. Ciphertexts carry no key identifier, so decryption
//! tries the primary first and then every rotated key in order until one
//! authenticates. Data sealed before a rotation stays readable without a
//! migration pass, at the cost of up to one extra `open` per rotated key.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use zeroize::Zeroize;

use crate::codec;
use crate::crypto::{AesGcmSiv, Key, Primitive};
use crate::error::{AeadError, DecryptAttempts, KeyAttemptError};
use crate::keys::{KeySet, KeySource};

/// Encrypts with the primary key and decrypts with any configured key.
///
/// Stateless apart from its injected collaborators: the key set is fetched
/// from the [`KeySource`] on every call, so rotations take effect immediately
/// and concurrent calls need no locking.
#[derive(Debug)]
pub struct AeadManager<S, P = AesGcmSiv> {
    source: S,
    primitive: P,
    fetch_timeout: Option<Duration>,
}

impl<S: KeySource> AeadManager<S> {
    /// Create a manager using the default AES-256-GCM-SIV primitive.
    pub fn new(source: S) -> Self {
        Self::with_primitive(source, AesGcmSiv)
    }
}

impl<S: KeySource, P: Primitive> AeadManager<S, P> {
    /// Create a manager with a custom seal/open primitive.
    pub fn with_primitive(source: S, primitive: P) -> Self {
        Self {
            source,
            primitive,
            fetch_timeout: None,
        }
    }

    /// Fail calls whose key retrieval takes longer than `timeout`.
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = Some(timeout);
        self
    }

    /// The injected key source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Seal `plaintext` under the primary key and return URL-safe text.
    ///
    /// # Errors
    ///
    /// - [`AeadError::NoKeyConfigured`] if the source has no primary key.
    /// - [`AeadError::InvalidKeyLength`] if the primary key is not 32 bytes.
    /// - [`AeadError::SealFailed`] if the primitive fails.
    /// - [`AeadError::Cancelled`], [`AeadError::KeyFetchTimedOut`] or
    ///   [`AeadError::KeySource`] if key retrieval does not complete.
    pub async fn encrypt(
        &self,
        ctx: &CancellationToken,
        plaintext: &[u8],
    ) -> Result<String, AeadError> {
        let keys = self.key_set(ctx).await?;
        self.seal_with(&keys, plaintext)
    }

    /// Decode `ciphertext` and open it with the first key that authenticates.
    ///
    /// # Errors
    ///
    /// - [`AeadError::NoKeyConfigured`] if the source has no primary key.
    /// - [`AeadError::MalformedCiphertext`] if the text is not valid encoding.
    /// - [`AeadError::DecryptionFailed`] if no key opens the message.
    /// - [`AeadError::Cancelled`], [`AeadError::KeyFetchTimedOut`] or
    ///   [`AeadError::KeySource`] if key retrieval does not complete.
    pub async fn decrypt(
        &self,
        ctx: &CancellationToken,
        ciphertext: &str,
    ) -> Result<Vec<u8>, AeadError> {
        self.decrypt_with_position(ctx, ciphertext)
            .await
            .map(|(plaintext, _)| plaintext)
    }

    /// Like [`decrypt`](Self::decrypt), also returning the key set position of
    /// the key that opened the message (0 = primary).
    pub async fn decrypt_with_position(
        &self,
        ctx: &CancellationToken,
        ciphertext: &str,
    ) -> Result<(Vec<u8>, usize), AeadError> {
        let keys = self.key_set(ctx).await?;
        self.open_with(&keys, ciphertext)
    }

    /// Re-encrypt `ciphertext` under the primary key if a rotated key was
    /// needed to open it.
    ///
    /// Returns `None` when the message already opens with the primary key.
    /// Both halves use the same key set fetch.
    pub async fn rewrap(
        &self,
        ctx: &CancellationToken,
        ciphertext: &str,
    ) -> Result<Option<String>, AeadError> {
        let keys = self.key_set(ctx).await?;
        let (mut plaintext, position) = self.open_with(&keys, ciphertext)?;
        if position == 0 {
            plaintext.zeroize();
            return Ok(None);
        }
        let result = self.seal_with(&keys, &plaintext);
        plaintext.zeroize();
        debug!(from_position = position, "ciphertext rewrapped under primary key");
        result.map(Some)
    }

    fn seal_with(&self, keys: &KeySet, plaintext: &[u8]) -> Result<String, AeadError> {
        let primary = keys.primary();
        let key = Key::try_from(primary).map_err(|_| AeadError::InvalidKeyLength {
            position: 0,
            got: primary.len(),
        })?;
        let sealed = self
            .primitive
            .seal(&key, plaintext)
            .map_err(AeadError::SealFailed)?;
        Ok(codec::encode(&sealed))
    }

    fn open_with(&self, keys: &KeySet, ciphertext: &str) -> Result<(Vec<u8>, usize), AeadError> {
        // Decoding is key-independent, so it happens once up front.
        let sealed = codec::decode(ciphertext)?;

        let mut attempts = Vec::with_capacity(keys.len());
        for (position, candidate) in keys.iter() {
            let key = match Key::try_from(candidate) {
                Ok(key) => key,
                Err(cause) => {
                    warn!(position, got = candidate.len(), "skipping key with invalid length");
                    attempts.push(KeyAttemptError { position, cause });
                    continue;
                }
            };
            match self.primitive.open(&key, &sealed) {
                Ok(plaintext) => {
                    if position > 0 {
                        debug!(position, "ciphertext opened with rotated key");
                    }
                    return Ok((plaintext, position));
                }
                Err(cause) => attempts.push(KeyAttemptError { position, cause }),
            }
        }

        debug!(keys = keys.len(), "no configured key opened the ciphertext");
        Err(AeadError::DecryptionFailed(DecryptAttempts::new(attempts)))
    }

    async fn key_set(&self, ctx: &CancellationToken) -> Result<KeySet, AeadError> {
        if ctx.is_cancelled() {
            return Err(AeadError::Cancelled);
        }

        let bounded = async {
            let fetch = self.fetch_keys(ctx);
            match self.fetch_timeout {
                Some(limit) => match tokio::time::timeout(limit, fetch).await {
                    Ok(keys) => keys,
                    Err(_) => Err(AeadError::KeyFetchTimedOut),
                },
                None => fetch.await,
            }
        };

        tokio::select! {
            biased;
            _ = ctx.cancelled() => Err(AeadError::Cancelled),
            keys = bounded => keys,
        }
    }

    async fn fetch_keys(&self, ctx: &CancellationToken) -> Result<KeySet, AeadError> {
        let current = self.source.current_key(ctx).await?;
        let rotated = self.source.rotated_keys(ctx).await?;
        KeySet::assemble(current, rotated).ok_or(AeadError::NoKeyConfigured)
    }
}
