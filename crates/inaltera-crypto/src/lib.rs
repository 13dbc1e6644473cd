//! Hash-chain engine for the Inaltera invoice ledger.
//!
//! Provides domain-separated BLAKE3 content hashing and the pure chain-link
//! function binding each ledger entry to its predecessor. All operations
//! wrap an established hash library — no custom cryptography.

pub mod chain;
pub mod hasher;

pub use chain::{ChainError, ChainLink, HashChainVerifier, link, verify_link};
pub use hasher::{ContentHasher, HasherError};
