//! Key sources: where the manager gets its primary and rotated keys.
//!
//! # Contract
//!
//! A [`KeySource`] answers two questions on every manager call: what is the
//! current primary key, and which previously active keys are still accepted
//! for decryption. The manager concatenates the answers into a [`KeySet`]
//! (`[current] + rotated`) and never caches it; any caching or rotation state
//! belongs to the source.
//!
//! Sources may perform I/O. They receive the caller's cancellation token and
//! should stop early once it fires; the manager additionally races the fetch
//! against the token so a slow source cannot outlive a cancelled call.
//!
//! # Security invariants
//!
//! - Key material is **never** logged or included in traces.
//! - Sources hand out [`SecretBytes`], which wipe themselves on drop.

pub mod rotating;
pub mod static_source;

pub use rotating::{RotatingKeySource, RotationError};
pub use static_source::StaticKeySource;

use async_trait::async_trait;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::crypto::SecretBytes;

/// Errors produced by a key source.
#[derive(Debug, Error)]
pub enum KeySourceError {
    /// The cancellation token fired before the keys were retrieved.
    #[error("key retrieval cancelled")]
    Cancelled,

    /// The backing store could not be reached or returned unusable data.
    #[error("key source unavailable: {0}")]
    Unavailable(String),
}

/// Capability that supplies the primary key and the rotated keys.
///
/// Implementations must be safe for concurrent reads; the manager calls them
/// from many tasks at once without any locking of its own.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KeySource: Send + Sync {
    /// The key used for new encryptions, or `None` if no key is configured.
    async fn current_key(
        &self,
        ctx: &CancellationToken,
    ) -> Result<Option<SecretBytes>, KeySourceError>;

    /// Previously active keys, accepted for decryption only, in trial order.
    async fn rotated_keys(
        &self,
        ctx: &CancellationToken,
    ) -> Result<Vec<SecretBytes>, KeySourceError>;
}

/// Ordered keys for a single manager call: primary first, then rotated keys.
///
/// Entries are unvalidated; length checks happen per key when they are used.
#[derive(Debug, Clone)]
pub struct KeySet {
    keys: Vec<SecretBytes>,
}

impl KeySet {
    /// Assemble `[current] + rotated`.
    ///
    /// Returns `None` when there is no current key: a configuration without a
    /// primary is treated as having no keys at all, even if rotated keys exist.
    pub fn assemble(current: Option<SecretBytes>, rotated: Vec<SecretBytes>) -> Option<Self> {
        let current = current?;
        let mut keys = Vec::with_capacity(1 + rotated.len());
        keys.push(current);
        keys.extend(rotated);
        Some(Self { keys })
    }

    /// The encryption key (position 0).
    pub fn primary(&self) -> &SecretBytes {
        &self.keys[0]
    }

    /// Number of keys, primary included. Always at least one.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Iterate `(position, key)` in trial order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &SecretBytes)> {
        self.keys.iter().enumerate()
    }
}
