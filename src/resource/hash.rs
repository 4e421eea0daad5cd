//! Content fingerprints using blake3.

use std::fmt;

/// A 256-bit content hash (blake3 output).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    /// Hash a byte slice.
    pub fn of(bytes: &[u8]) -> Self {
        Self(*blake3::hash(bytes).as_bytes())
    }

    #[inline]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Full hex string.
    pub fn to_hex(self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // First 16 hex chars, for logs
        write!(f, "{}", &self.to_hex()[..16])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_stable() {
        let a = ContentHash::of(b"hello");
        let b = ContentHash::of(b"hello");
        assert_eq!(a, b);
        assert_ne!(a, ContentHash::of(b"hello!"));
        assert_eq!(a.to_hex().len(), 64);
        assert_eq!(a.to_string().len(), 16);
    }

    #[test]
    fn test_known_digest() {
        // blake3("") from the reference test vectors
        assert_eq!(
            ContentHash::of(b"").to_hex(),
            "af1349b9f5f9a1a6a0404dea36dcc9499bcb25c9adc112b7cc9a93cae41f3262"
        );
    }
}
