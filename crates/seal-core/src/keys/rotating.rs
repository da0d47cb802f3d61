//! [`RotatingKeySource`]: an in-memory key ring that can be rotated at runtime.
//!
//! The ring is published through `arc-swap`, so readers (every manager call)
//! never block and a rotation atomically swaps in a complete new ring.

use std::sync::Arc;

use arc_swap::ArcSwap;
use async_trait::async_trait;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::{KeySource, KeySourceError};
use crate::crypto::{Key, SecretBytes};

/// Errors from key ring maintenance.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RotationError {
    /// Position 0 is the primary key; rotate a new key in instead.
    #[error("the primary key cannot be retired")]
    PrimaryNotRetirable,

    /// No rotated key exists at the given key set position.
    #[error("no rotated key at position {0}")]
    UnknownPosition(usize),
}

/// One published state of the ring.
#[derive(Debug, Clone, Default)]
struct KeyRing {
    current: Option<SecretBytes>,
    /// Most recently demoted first.
    rotated: Vec<SecretBytes>,
}

impl KeyRing {
    fn rotated_to(&self, next: SecretBytes, retain: Option<usize>) -> Self {
        let mut rotated = Vec::with_capacity(self.rotated.len() + 1);
        rotated.extend(self.current.iter().cloned());
        rotated.extend(self.rotated.iter().cloned());
        let mut ring = Self {
            current: Some(next),
            rotated,
        };
        ring.apply_retention(retain);
        ring
    }

    fn without(&self, position: usize) -> Self {
        let mut ring = self.clone();
        if position >= 1 && position <= ring.rotated.len() {
            ring.rotated.remove(position - 1);
        }
        ring
    }

    fn apply_retention(&mut self, retain: Option<usize>) {
        if let Some(max) = retain {
            self.rotated.truncate(max);
        }
    }
}

/// Shared, lock-free key ring.
///
/// Cheap to clone; clones share the same ring, so an operator handle can
/// rotate keys while managers holding another clone keep serving requests.
#[derive(Clone, Debug, Default)]
pub struct RotatingKeySource {
    inner: Arc<ArcSwap<KeyRing>>,
    retain: Option<usize>,
}

impl RotatingKeySource {
    /// Create an empty ring with no keys configured.
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep at most `max_rotated` rotated keys; older keys fall off the end
    /// on the next rotation or replacement.
    pub fn with_retention(mut self, max_rotated: usize) -> Self {
        self.retain = Some(max_rotated);
        self
    }

    /// Returns `true` if a primary key is configured.
    pub fn is_ready(&self) -> bool {
        self.inner.load().current.is_some()
    }

    /// Number of rotated keys currently accepted for decryption.
    pub fn rotated_len(&self) -> usize {
        self.inner.load().rotated.len()
    }

    /// Atomically replace the whole ring, e.g. after reloading configuration.
    pub fn replace_all(&self, current: Option<SecretBytes>, rotated: Vec<SecretBytes>) {
        let mut ring = KeyRing { current, rotated };
        ring.apply_retention(self.retain);
        self.inner.store(Arc::new(ring));
    }

    /// Make `next` the primary key and demote the previous primary to the
    /// front of the rotated list.
    ///
    /// Only a validated [`Key`] can become primary, so encryption can never be
    /// broken by a rotation.
    pub fn rotate(&self, next: &Key) {
        let next = SecretBytes::from(&next.as_bytes()[..]);
        let retain = self.retain;
        self.inner.rcu(|ring| ring.rotated_to(next.clone(), retain));
        info!(rotated = self.rotated_len(), "key ring rotated");
    }

    /// Stop accepting the rotated key at key set `position` (1-based: position
    /// 1 is the most recently demoted key).
    ///
    /// # Errors
    ///
    /// Returns [`RotationError::PrimaryNotRetirable`] for position 0 and
    /// [`RotationError::UnknownPosition`] if no rotated key sits there.
    pub fn retire(&self, position: usize) -> Result<(), RotationError> {
        if position == 0 {
            return Err(RotationError::PrimaryNotRetirable);
        }
        let previous = self.inner.rcu(|ring| ring.without(position));
        if position > previous.rotated.len() {
            return Err(RotationError::UnknownPosition(position));
        }
        info!(position, "rotated key retired");
        Ok(())
    }
}

#[async_trait]
impl KeySource for RotatingKeySource {
    async fn current_key(
        &self,
        ctx: &CancellationToken,
    ) -> Result<Option<SecretBytes>, KeySourceError> {
        if ctx.is_cancelled() {
            return Err(KeySourceError::Cancelled);
        }
        Ok(self.inner.load().current.clone())
    }

    async fn rotated_keys(
        &self,
        ctx: &CancellationToken,
    ) -> Result<Vec<SecretBytes>, KeySourceError> {
        if ctx.is_cancelled() {
            return Err(KeySourceError::Cancelled);
        }
        Ok(self.inner.load().rotated.clone())
    }
}
