use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// 256-bit digest binding a ledger entry to all prior entries of its tenant.
///
/// A `ChainHash` is the value surfaced to callers as a document's verifiable
/// fingerprint. The all-zero digest is the well-known genesis constant: the
/// first entry of every tenant links against [`ChainHash::GENESIS`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChainHash([u8; 32]);

impl ChainHash {
    /// The genesis constant (all zeros). Tail of an empty ledger.
    pub const GENESIS: Self = Self([0u8; 32]);

    /// Create a `ChainHash` from a pre-computed digest.
    pub const fn from_hash(hash: [u8; 32]) -> Self {
        Self(hash)
    }

    /// Returns `true` if this is the genesis constant.
    pub fn is_genesis(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// The raw 32-byte digest.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Hex-encoded string representation (64 characters).
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Short hex representation (first 8 characters).
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..4])
    }

    /// Parse from a hex string.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        if bytes.len() != 32 {
            return Err(TypeError::InvalidLength {
                expected: 32,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Debug for ChainHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChainHash({})", self.short_hex())
    }
}

impl fmt::Display for ChainHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl From<[u8; 32]> for ChainHash {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl From<ChainHash> for [u8; 32] {
    fn from(hash: ChainHash) -> Self {
        hash.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn genesis_is_all_zeros() {
        let genesis = ChainHash::GENESIS;
        assert!(genesis.is_genesis());
        assert_eq!(genesis.as_bytes(), &[0u8; 32]);
    }

    #[test]
    fn non_zero_hash_is_not_genesis() {
        let hash = ChainHash::from_hash([1; 32]);
        assert!(!hash.is_genesis());
    }

    #[test]
    fn hex_roundtrip() {
        let hash = ChainHash::from_hash([7; 32]);
        let hex = hash.to_hex();
        let parsed = ChainHash::from_hex(&hex).unwrap();
        assert_eq!(hash, parsed);
    }

    #[test]
    fn from_hex_rejects_wrong_length() {
        let err = ChainHash::from_hex("abcd").unwrap_err();
        assert_eq!(
            err,
            TypeError::InvalidLength {
                expected: 32,
                actual: 2
            }
        );
    }

    #[test]
    fn from_hex_rejects_non_hex() {
        assert!(matches!(
            ChainHash::from_hex("zz"),
            Err(TypeError::InvalidHex(_))
        ));
    }

    #[test]
    fn display_is_full_hex() {
        let hash = ChainHash::from_hash([9; 32]);
        let display = format!("{hash}");
        assert_eq!(display.len(), 64);
        assert_eq!(display, hash.to_hex());
    }

    #[test]
    fn short_hex_is_8_chars() {
        let hash = ChainHash::from_hash([3; 32]);
        assert_eq!(hash.short_hex().len(), 8);
    }

    #[test]
    fn serde_roundtrip() {
        let hash = ChainHash::from_hash([42; 32]);
        let json = serde_json::to_string(&hash).unwrap();
        let parsed: ChainHash = serde_json::from_str(&json).unwrap();
        assert_eq!(hash, parsed);
    }

    #[test]
    fn ordering_is_consistent() {
        let a = ChainHash::from_hash([0; 32]);
        let b = ChainHash::from_hash([1; 32]);
        assert!(a < b);
    }

    proptest! {
        #[test]
        fn hex_roundtrip_holds_for_any_digest(bytes in proptest::array::uniform32(any::<u8>())) {
            let hash = ChainHash::from_hash(bytes);
            let parsed = ChainHash::from_hex(&hash.to_hex()).unwrap();
            prop_assert_eq!(hash, parsed);
        }
    }
}
