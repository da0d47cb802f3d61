//! Authenticated encryption of secrets at rest with zero-downtime key rotation.
//!
//! [`AeadManager`] seals values under the current primary key and opens them
//! with whichever configured key authenticates, so ciphertexts written before
//! a rotation stay readable. Keys come from an injected [`KeySource`]; the
//! manager itself holds no mutable state.
//!
//! Modules:
//! - `crypto`: sized [`Key`] type and the AES-256-GCM-SIV primitive
//! - `codec`: URL-safe text form of sealed messages
//! - `keys`: the key source contract plus static and rotating sources
//! - `manager`: encrypt / decrypt / rewrap with rotation fallback

pub mod codec;
pub mod crypto;
pub mod error;
pub mod keys;
pub mod manager;

pub use crypto::{Key, SecretBytes, KEY_LEN};
pub use error::{AeadError, DecryptAttempts, KeyAttemptError};
pub use keys::{KeySource, KeySourceError, RotatingKeySource, StaticKeySource};
pub use manager::AeadManager;

/// Re-exported so callers can build the cancellation tokens the manager takes.
pub use tokio_util::sync::CancellationToken;
