//! Key derivation from configured system secrets.
//!
//! Operators configure human-managed secret strings rather than raw key
//! bytes. Each string is hashed with SHA-512/256 into a 32-byte key, so any
//! secret of sufficient length yields a valid key. Order is preserved: the
//! first secret becomes the primary key, the rest become rotated keys.

use seal_core::{SecretBytes, StaticKeySource};
use sha2::{Digest, Sha512_256};

/// Derive the 32-byte key for one system secret.
pub fn derive_key(secret: &str) -> SecretBytes {
    SecretBytes::new(Sha512_256::digest(secret.as_bytes()).to_vec())
}

/// Build the key source for the configured secrets, current first.
///
/// An empty slice yields a source with no keys, which the manager reports as
/// `NoKeyConfigured`.
pub fn key_source(secrets: &[&str]) -> StaticKeySource {
    let mut keys = secrets.iter().map(|s| derive_key(s));
    match keys.next() {
        Some(current) => StaticKeySource::new(current, keys.collect()),
        None => StaticKeySource::empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seal_core::{AeadManager, CancellationToken, KeySource, KEY_LEN};

    fn hex(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{b:02x}")).collect()
    }

    #[test]
    fn derivation_matches_sha512_256() {
        // FIPS 180-4 example for SHA-512/256("abc").
        assert_eq!(
            hex(derive_key("abc").expose()),
            "53048e2681941ef99b2e29b76b4c7dabe4c2d0c634fc6d46e0e2f13107e7af23"
        );
    }

    #[test]
    fn derived_keys_have_key_length() {
        assert_eq!(derive_key("a-sufficiently-long-secret").len(), KEY_LEN);
    }

    #[tokio::test]
    async fn first_secret_is_current() {
        let ctx = CancellationToken::new();
        let source = key_source(&["current-secret-0001", "older-secret-00002"]);
        let current = source.current_key(&ctx).await.unwrap().unwrap();
        assert_eq!(current, derive_key("current-secret-0001"));
        let rotated = source.rotated_keys(&ctx).await.unwrap();
        assert_eq!(rotated, vec![derive_key("older-secret-00002")]);
    }

    #[tokio::test]
    async fn no_secrets_means_no_keys() {
        let ctx = CancellationToken::new();
        assert!(key_source(&[]).current_key(&ctx).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn prepending_a_secret_keeps_old_ciphertexts_readable() {
        let ctx = CancellationToken::new();
        let before = AeadManager::new(key_source(&["first-system-secret"]));
        let text = before.encrypt(&ctx, b"oauth2-refresh").await.unwrap();

        let after = AeadManager::new(key_source(&["second-system-secret", "first-system-secret"]));
        assert_eq!(after.decrypt(&ctx, &text).await.unwrap(), b"oauth2-refresh");
    }
}
