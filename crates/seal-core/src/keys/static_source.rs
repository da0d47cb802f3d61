//! [`StaticKeySource`]: a fixed key set held in memory.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::{KeySource, KeySourceError};
use crate::crypto::SecretBytes;

/// Key source with a fixed primary and rotated list.
///
/// Useful for tests and for embedding callers that resolve their keys once at
/// startup. Lengths are not validated here.
#[derive(Debug, Clone, Default)]
pub struct StaticKeySource {
    current: Option<SecretBytes>,
    rotated: Vec<SecretBytes>,
}

impl StaticKeySource {
    /// Create a source from a primary key and rotated keys in trial order.
    pub fn new(current: impl Into<SecretBytes>, rotated: Vec<SecretBytes>) -> Self {
        Self {
            current: Some(current.into()),
            rotated,
        }
    }

    /// Create a source with only a primary key.
    pub fn single(current: impl Into<SecretBytes>) -> Self {
        Self::new(current, Vec::new())
    }

    /// Create a source with no keys configured.
    pub fn empty() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeySource for StaticKeySource {
    async fn current_key(
        &self,
        ctx: &CancellationToken,
    ) -> Result<Option<SecretBytes>, KeySourceError> {
        if ctx.is_cancelled() {
            return Err(KeySourceError::Cancelled);
        }
        Ok(self.current.clone())
    }

    async fn rotated_keys(
        &self,
        ctx: &CancellationToken,
    ) -> Result<Vec<SecretBytes>, KeySourceError> {
        if ctx.is_cancelled() {
            return Err(KeySourceError::Cancelled);
        }
        Ok(self.rotated.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_configured_keys() {
        let source = StaticKeySource::new([1u8; 32], vec![SecretBytes::from([2u8; 32])]);
        let ctx = CancellationToken::new();
        let current = source.current_key(&ctx).await.unwrap().unwrap();
        assert_eq!(current.expose(), &[1u8; 32]);
        assert_eq!(source.rotated_keys(&ctx).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn empty_source_has_no_current_key() {
        let ctx = CancellationToken::new();
        let source = StaticKeySource::empty();
        assert!(source.current_key(&ctx).await.unwrap().is_none());
        assert!(source.rotated_keys(&ctx).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn honours_cancelled_token() {
        let ctx = CancellationToken::new();
        ctx.cancel();
        let source = StaticKeySource::single([1u8; 32]);
        assert!(matches!(
            source.current_key(&ctx).await,
            Err(KeySourceError::Cancelled)
        ));
    }
}
