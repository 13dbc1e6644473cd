use inaltera_types::ChainHash;

/// Domain-separated BLAKE3 content hasher.
///
/// Each hasher carries a domain tag (e.g., `"inaltera-entry-v1"`,
/// `"inaltera-event-v1"`) that is prepended to every hash computation. This
/// prevents cross-type collisions: a ledger entry and an audit event with
/// identical bytes produce different digests.
pub struct ContentHasher {
    domain: &'static str,
}

impl ContentHasher {
    /// Hasher for ledger entry payloads.
    pub const ENTRY: Self = Self {
        domain: "inaltera-entry-v1",
    };
    /// Hasher for audit log events.
    pub const EVENT: Self = Self {
        domain: "inaltera-event-v1",
    };

    /// Create a hasher with a custom domain tag.
    pub const fn new(domain: &'static str) -> Self {
        Self { domain }
    }

    /// Hash raw bytes with domain separation.
    pub fn hash(&self, data: &[u8]) -> ChainHash {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.domain.as_bytes());
        hasher.update(b":");
        hasher.update(data);
        ChainHash::from_hash(*hasher.finalize().as_bytes())
    }

    /// Hash a serializable value as canonical JSON with domain separation.
    ///
    /// Struct fields serialize in declaration order, so the encoding is
    /// stable for a fixed type definition.
    pub fn hash_json<T: serde::Serialize>(&self, value: &T) -> Result<ChainHash, HasherError> {
        let data =
            serde_json::to_vec(value).map_err(|e| HasherError::Serialization(e.to_string()))?;
        Ok(self.hash(&data))
    }

    /// Verify that data produces the expected digest.
    pub fn verify(&self, data: &[u8], expected: &ChainHash) -> bool {
        self.hash(data) == *expected
    }

    /// The domain tag used by this hasher.
    pub fn domain(&self) -> &str {
        self.domain
    }
}

/// Errors from hashing operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum HasherError {
    #[error("serialization error: {0}")]
    Serialization(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_deterministic() {
        let data = b"factura 121.00";
        let h1 = ContentHasher::ENTRY.hash(data);
        let h2 = ContentHasher::ENTRY.hash(data);
        assert_eq!(h1, h2);
    }

    #[test]
    fn different_domains_produce_different_hashes() {
        let data = b"same content";
        let entry = ContentHasher::ENTRY.hash(data);
        let event = ContentHasher::EVENT.hash(data);
        assert_ne!(entry, event);
    }

    #[test]
    fn verify_correct_data() {
        let data = b"test data";
        let hash = ContentHasher::ENTRY.hash(data);
        assert!(ContentHasher::ENTRY.verify(data, &hash));
    }

    #[test]
    fn verify_incorrect_data() {
        let hash = ContentHasher::ENTRY.hash(b"original");
        assert!(!ContentHasher::ENTRY.verify(b"tampered", &hash));
    }

    #[test]
    fn hash_json_works() {
        let value = serde_json::json!({"numero": "F-20260804-0001", "total": "121.00"});
        let hash = ContentHasher::ENTRY.hash_json(&value).unwrap();
        assert!(!hash.is_genesis());
    }

    #[test]
    fn custom_domain() {
        let hasher = ContentHasher::new("inaltera-custom-v1");
        let hash = hasher.hash(b"data");
        assert_ne!(hash, ContentHasher::ENTRY.hash(b"data"));
    }
}
