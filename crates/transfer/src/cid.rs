//! File content identifiers.
//!
//! `cid = H(0x01 ‖ H(chunk_0 ‖ chunk_1 ‖ … ‖ chunk_n) ‖ H(header))`
//!
//! The payload hash is taken over the raw chunk bytes in file order, not over
//! the chunk digests. The ledger rebuilds the file by concatenating chunk
//! pointers in the order given to `create_file`, so the order used here must
//! be that same order.

use onchmint_protocol::{ContentHash, FileCid};
use onchmint_protocol::constants::CID_VERSION;

use crate::hash::{ContentHasher, digest};

/// Composes the file CID from ordered chunk payloads and the encoded header.
pub fn compose_cid<C: AsRef<[u8]>>(chunks: &[C], header: &[u8]) -> FileCid {
    let mut payload = ContentHasher::new();
    for chunk in chunks {
        payload.update(chunk.as_ref());
    }
    compose_from_parts(&payload.finalize(), &digest(header))
}

fn compose_from_parts(payload_hash: &ContentHash, header_hash: &ContentHash) -> FileCid {
    let mut preimage = ContentHasher::new();
    preimage.update(&[CID_VERSION]);
    preimage.update(payload_hash.as_ref());
    preimage.update(header_hash.as_ref());
    FileCid::new(preimage.finalize())
}
