//! Content hashing.
//!
//! Every digest in the system is Keccak-256 (the pre-standard SHA-3 padding),
//! which is what the content-store contract computes on its side. Using any
//! other 256-bit hash here would still produce well-formed CIDs, just ones
//! the ledger never recognises.

use onchmint_protocol::{ContentHash, HASH_LEN};
use sha3::{Digest, Keccak256};

/// Computes the content digest of `data`.
pub fn digest(data: &[u8]) -> ContentHash {
    let mut hasher = ContentHasher::new();
    hasher.update(data);
    hasher.finalize()
}

/// Incremental hasher producing the same digest as [`digest`] over the
/// concatenation of everything passed to [`update`](Self::update).
#[derive(Clone, Default)]
pub struct ContentHasher {
    inner: Keccak256,
}

impl ContentHasher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, data: &[u8]) {
        self.inner.update(data);
    }

    pub fn finalize(self) -> ContentHash {
        let mut out = [0u8; HASH_LEN];
        out.copy_from_slice(&self.inner.finalize());
        ContentHash::from_bytes(out)
    }
}
