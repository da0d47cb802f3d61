//! Key material and the AEAD primitive.
//!
//! This module is intentionally free of key-source and encoding concerns.
//! It provides the sized [`Key`] type and the low-level seal/open operations
//! used by the manager.
//!
//! # Sealed message format
//!
//! ```text
//! nonce (12 bytes) || ciphertext || tag (16 bytes)
//! ```
//!
//! The format carries no key identifier. Decryption must be prepared to try
//! every configured key.

pub mod cipher;
pub mod key;

pub use cipher::{AesGcmSiv, CipherError, Primitive};
pub use key::{Key, SecretBytes, KEY_LEN};
