//! Content addressing for organization nodes.

use crate::error::{OrgError, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// A 32-byte SHA-256 content hash identifying a node.
///
/// A node's hash is derived from its name, depth, and its parent's hash,
/// so structurally identical subtrees anywhere in history collapse to the
/// same nodes. The same content always produces the same NodeHash.
///
/// # Examples
///
/// ```
/// use orgv_core::NodeHash;
///
/// let root = NodeHash::compute("Engineering", 1, None);
/// let child = NodeHash::compute("Platform", 2, Some(&root));
/// assert_ne!(root, child);
/// assert_eq!(root.as_hex().len(), 64);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeHash([u8; 32]);

impl NodeHash {
    /// The length of a NodeHash in bytes.
    pub const LEN: usize = 32;

    /// The length of a NodeHash as a hex string.
    pub const HEX_LEN: usize = 64;

    /// Creates a NodeHash from raw bytes.
    #[inline]
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Returns a reference to the underlying 32-byte digest.
    #[inline]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Returns this NodeHash as a lowercase hex string.
    ///
    /// The returned string is always exactly 64 characters long. This is
    /// the storage-interop form: parent hashes are fed back into child
    /// digests in this encoding.
    pub fn as_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parses a NodeHash from a hex string.
    ///
    /// # Errors
    ///
    /// Returns `OrgError::InvalidHex` if the string is not valid hex
    /// or is not exactly 64 characters long.
    pub fn from_hex(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.len() != Self::HEX_LEN {
            return Err(OrgError::InvalidHex(format!(
                "expected {} hex chars, got {}",
                Self::HEX_LEN,
                s.len()
            )));
        }

        let bytes = hex::decode(s).map_err(|e| OrgError::InvalidHex(e.to_string()))?;

        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| OrgError::InvalidHex("invalid length".to_string()))?;

        Ok(Self(arr))
    }

    /// Computes the content hash for a node.
    ///
    /// The digest input is the UTF-8 string `"{name}-{depth}-{parent}"`
    /// where `parent` is the parent's lowercase hex hash, or empty for
    /// roots. Existing stored hashes depend on this exact scheme, so it
    /// must not change.
    pub fn compute(name: &str, depth: u32, parent: Option<&NodeHash>) -> Self {
        let parent_hex = parent.map(NodeHash::as_hex).unwrap_or_default();
        let input = format!("{}-{}-{}", name, depth, parent_hex);
        let digest = Sha256::digest(input.as_bytes());
        Self(digest.into())
    }
}

impl fmt::Display for NodeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_hex())
    }
}

impl fmt::Debug for NodeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeHash({}...)", &self.as_hex()[..12])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_deterministic() {
        let h1 = NodeHash::compute("CEO", 1, None);
        let h2 = NodeHash::compute("CEO", 1, None);
        assert_eq!(h1, h2);
    }

    #[test]
    fn test_compute_differs_on_name() {
        let h1 = NodeHash::compute("CEO", 1, None);
        let h2 = NodeHash::compute("CTO", 1, None);
        assert_ne!(h1, h2);
    }

    #[test]
    fn test_compute_differs_on_depth() {
        let h1 = NodeHash::compute("Sales", 2, None);
        let h2 = NodeHash::compute("Sales", 3, None);
        assert_ne!(h1, h2);
    }

    #[test]
    fn test_compute_differs_on_parent() {
        let p1 = NodeHash::compute("A", 1, None);
        let p2 = NodeHash::compute("B", 1, None);
        let h1 = NodeHash::compute("Team", 2, Some(&p1));
        let h2 = NodeHash::compute("Team", 2, Some(&p2));
        assert_ne!(h1, h2);
    }

    #[test]
    fn test_compute_matches_reference_scheme() {
        // sha256("CEO-1-") for a root node, hex-encoded.
        let h = NodeHash::compute("CEO", 1, None);
        let expected = Sha256::digest(b"CEO-1-");
        assert_eq!(h.as_bytes(), &<[u8; 32]>::from(expected));
    }

    #[test]
    fn test_compute_chains_parent_hex() {
        let parent = NodeHash::compute("CEO", 1, None);
        let child = NodeHash::compute("VP", 2, Some(&parent));
        let input = format!("VP-2-{}", parent.as_hex());
        let expected = Sha256::digest(input.as_bytes());
        assert_eq!(child.as_bytes(), &<[u8; 32]>::from(expected));
    }

    #[test]
    fn test_hex_roundtrip() {
        let mut bytes = [0u8; 32];
        for (i, b) in bytes.iter_mut().enumerate() {
            *b = (i % 256) as u8;
        }

        let hash = NodeHash::from_bytes(bytes);
        let hex = hash.as_hex();
        assert_eq!(hex.len(), 64);

        let parsed = NodeHash::from_hex(&hex).unwrap();
        assert_eq!(hash, parsed);
    }

    #[test]
    fn test_from_hex_invalid_length() {
        let result = NodeHash::from_hex("abc");
        assert!(matches!(result, Err(OrgError::InvalidHex(_))));
    }

    #[test]
    fn test_from_hex_invalid_chars() {
        let result = NodeHash::from_hex(&"g".repeat(64));
        assert!(matches!(result, Err(OrgError::InvalidHex(_))));
    }

    #[test]
    fn test_from_hex_whitespace_trimmed() {
        let hex = "a".repeat(64);
        let with_whitespace = format!("  {}  ", hex);
        let hash = NodeHash::from_hex(&with_whitespace).unwrap();
        assert_eq!(hash.as_hex(), hex);
    }

    #[test]
    fn test_display() {
        let hash = NodeHash::from_bytes([0xab; 32]);
        assert_eq!(format!("{}", hash), "ab".repeat(32));
    }

    #[test]
    fn test_debug_short() {
        let hash = NodeHash::from_bytes([0xab; 32]);
        let debug = format!("{:?}", hash);
        assert!(debug.contains("abababababab"));
        assert!(!debug.contains(&"ab".repeat(32)));
    }
}
