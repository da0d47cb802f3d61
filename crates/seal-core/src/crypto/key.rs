//! Key material types: unvalidated [`SecretBytes`] and the sized [`Key`].

use zeroize::Zeroize;

use super::cipher::CipherError;

/// Byte length of an AES-256 key (32 bytes = 256 bits).
pub const KEY_LEN: usize = 32;

/// Raw key material exactly as a key source produced it.
///
/// The length is not checked here; the manager converts each entry into a
/// [`Key`] at the point of use so that a bad rotated key can be skipped
/// without failing the whole key set. The buffer is wiped on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretBytes(Vec<u8>);

impl SecretBytes {
    /// Wrap raw key bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Number of bytes held.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no bytes are held.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the raw bytes.
    pub fn expose(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for SecretBytes {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for SecretBytes {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl<const N: usize> From<[u8; N]> for SecretBytes {
    fn from(bytes: [u8; N]) -> Self {
        Self(bytes.to_vec())
    }
}

impl Drop for SecretBytes {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl std::fmt::Debug for SecretBytes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Length is safe to show and helps diagnose misconfigured keys.
        write!(f, "SecretBytes([REDACTED; {}])", self.0.len())
    }
}

/// A validated 256-bit encryption key.
///
/// The only way to obtain a [`Key`] from untrusted material is
/// [`Key::try_from`], so every `&Key` handed to the cipher is guaranteed to be
/// exactly [`KEY_LEN`] bytes. The bytes are boxed so moves don't leave stray
/// copies on the stack, and wiped on drop.
pub struct Key(Box<[u8; KEY_LEN]>);

impl Key {
    /// Create a key from an exact-length array.
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(Box::new(bytes))
    }

    /// Borrow the raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl TryFrom<&[u8]> for Key {
    type Error = CipherError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        if bytes.len() != KEY_LEN {
            return Err(CipherError::InvalidKeyLength { got: bytes.len() });
        }
        let mut buf = Box::new([0u8; KEY_LEN]);
        buf.copy_from_slice(bytes);
        Ok(Self(buf))
    }
}

impl TryFrom<&SecretBytes> for Key {
    type Error = CipherError;

    fn try_from(secret: &SecretBytes) -> Result<Self, Self::Error> {
        Self::try_from(secret.expose())
    }
}

impl Drop for Key {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl std::fmt::Debug for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material — not even in debug builds.
        f.write_str("Key([REDACTED])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_exact_length() {
        let key = Key::try_from(&[0x42u8; KEY_LEN][..]).unwrap();
        assert_eq!(key.as_bytes(), &[0x42u8; KEY_LEN]);
    }

    #[test]
    fn rejects_short_and_long_material() {
        for len in [0, 16, 31, 33, 64] {
            let err = Key::try_from(&vec![0u8; len][..]).unwrap_err();
            assert!(
                matches!(err, CipherError::InvalidKeyLength { got } if got == len),
                "length {len} should be rejected"
            );
        }
    }

    #[test]
    fn converts_from_secret_bytes() {
        let secret = SecretBytes::from([7u8; KEY_LEN]);
        let key = Key::try_from(&secret).unwrap();
        assert_eq!(key.as_bytes()[0], 7);
    }

    #[test]
    fn debug_output_is_redacted() {
        let key = Key::from_bytes([0xAB; KEY_LEN]);
        let secret = SecretBytes::new(vec![0xABu8; 16]);
        assert_eq!(format!("{key:?}"), "Key([REDACTED])");
        assert_eq!(format!("{secret:?}"), "SecretBytes([REDACTED; 16])");
        assert!(!format!("{secret:?}").contains("171"));
    }
}
