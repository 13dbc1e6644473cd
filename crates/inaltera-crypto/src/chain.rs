use inaltera_types::ChainHash;

/// Versioned domain tag for chain links.
///
/// Changing the hash algorithm breaks verification of previously issued
/// chains, so a migration must bump this tag rather than silently rehash.
pub const CHAIN_DOMAIN: &str = "inaltera-chain-v1";

/// Compute the chain hash binding a payload digest to the previous link.
///
/// Pure and deterministic: `link(p, q)` always produces the same output for
/// the same inputs. The first entry of a tenant links against
/// [`ChainHash::GENESIS`].
pub fn link(payload_hash: &ChainHash, prev_hash: &ChainHash) -> ChainHash {
    let mut hasher = blake3::Hasher::new();
    hasher.update(CHAIN_DOMAIN.as_bytes());
    hasher.update(b":");
    hasher.update(payload_hash.as_bytes());
    hasher.update(prev_hash.as_bytes());
    ChainHash::from_hash(*hasher.finalize().as_bytes())
}

/// Trait for records that participate in a hash chain.
pub trait ChainLink {
    /// Digest of the record's canonical payload.
    fn payload_hash(&self) -> ChainHash;
    /// Chain hash of the preceding record (genesis constant for the first).
    fn prev_hash(&self) -> ChainHash;
    /// The record's own chain hash.
    fn chain_hash(&self) -> ChainHash;
}

/// Recompute a single record's link and compare against the stored value.
pub fn verify_link(record: &impl ChainLink) -> bool {
    link(&record.payload_hash(), &record.prev_hash()) == record.chain_hash()
}

/// Hash chain integrity verifier.
///
/// Verifies that a sequence of records forms a valid chain: the first record
/// links against genesis, each subsequent record's `prev_hash` matches the
/// previous record's `chain_hash`, and every stored chain hash reproduces
/// from its payload digest.
pub struct HashChainVerifier;

impl HashChainVerifier {
    pub fn verify_chain(records: &[impl ChainLink]) -> Result<(), ChainError> {
        if records.is_empty() {
            return Ok(());
        }

        if !records[0].prev_hash().is_genesis() {
            return Err(ChainError::GenesisMismatch);
        }

        for (index, record) in records.iter().enumerate() {
            if index > 0 {
                let expected_prev = records[index - 1].chain_hash();
                if record.prev_hash() != expected_prev {
                    return Err(ChainError::BrokenLink { index });
                }
            }

            if !verify_link(record) {
                return Err(ChainError::HashMismatch { index });
            }
        }

        Ok(())
    }
}

/// Errors from chain verification.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ChainError {
    #[error("first record does not link against the genesis constant")]
    GenesisMismatch,

    #[error("broken link at index {index}: prev_hash does not match")]
    BrokenLink { index: usize },

    #[error("hash mismatch at index {index}: computed chain hash differs from stored")]
    HashMismatch { index: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestRecord {
        payload: ChainHash,
        prev: ChainHash,
        chain: ChainHash,
    }

    impl ChainLink for TestRecord {
        fn payload_hash(&self) -> ChainHash {
            self.payload
        }
        fn prev_hash(&self) -> ChainHash {
            self.prev
        }
        fn chain_hash(&self) -> ChainHash {
            self.chain
        }
    }

    fn build_chain(count: usize) -> Vec<TestRecord> {
        let mut chain = Vec::new();
        let mut prev = ChainHash::GENESIS;

        for i in 0..count {
            let payload = crate::ContentHasher::ENTRY.hash(format!("record-{i}").as_bytes());
            let hash = link(&payload, &prev);
            chain.push(TestRecord {
                payload,
                prev,
                chain: hash,
            });
            prev = hash;
        }

        chain
    }

    #[test]
    fn link_is_deterministic() {
        let payload = ChainHash::from_hash([1; 32]);
        let prev = ChainHash::from_hash([2; 32]);
        assert_eq!(link(&payload, &prev), link(&payload, &prev));
    }

    #[test]
    fn link_depends_on_both_inputs() {
        let payload = ChainHash::from_hash([1; 32]);
        let prev = ChainHash::from_hash([2; 32]);
        assert_ne!(link(&payload, &prev), link(&prev, &payload));
        assert_ne!(link(&payload, &prev), link(&payload, &ChainHash::GENESIS));
    }

    #[test]
    fn empty_chain_is_valid() {
        let chain: Vec<TestRecord> = vec![];
        assert!(HashChainVerifier::verify_chain(&chain).is_ok());
    }

    #[test]
    fn single_record_chain() {
        let chain = build_chain(1);
        assert!(HashChainVerifier::verify_chain(&chain).is_ok());
    }

    #[test]
    fn multi_record_chain() {
        let chain = build_chain(10);
        assert!(HashChainVerifier::verify_chain(&chain).is_ok());
    }

    #[test]
    fn first_record_must_link_genesis() {
        let mut chain = build_chain(1);
        chain[0].prev = ChainHash::from_hash([1; 32]);
        let err = HashChainVerifier::verify_chain(&chain).unwrap_err();
        assert_eq!(err, ChainError::GenesisMismatch);
    }

    #[test]
    fn broken_link_detected() {
        let mut chain = build_chain(3);
        chain[2].prev = ChainHash::from_hash([99; 32]);
        let err = HashChainVerifier::verify_chain(&chain).unwrap_err();
        assert_eq!(err, ChainError::BrokenLink { index: 2 });
    }

    #[test]
    fn tampered_payload_detected() {
        let mut chain = build_chain(3);
        chain[1].payload = crate::ContentHasher::ENTRY.hash(b"tampered");
        let err = HashChainVerifier::verify_chain(&chain).unwrap_err();
        assert_eq!(err, ChainError::HashMismatch { index: 1 });
    }

    #[test]
    fn verify_link_checks_single_record() {
        let chain = build_chain(2);
        assert!(verify_link(&chain[1]));

        let corrupted = TestRecord {
            payload: ChainHash::from_hash([5; 32]),
            prev: chain[1].prev,
            chain: chain[1].chain,
        };
        assert!(!verify_link(&corrupted));
    }
}
