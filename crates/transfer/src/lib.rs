//! Chunking, content hashing, CID composition and progress tracking.
//!
//! Everything here is synchronous and free of ledger I/O; the async upload
//! and mint steps live in `onchmint-pipeline`.

mod chunked;
mod cid;
mod cost;
mod hash;
mod progress;
mod types;

pub use chunked::{ChunkReader, read_chunks, split_chunks};
pub use cid::compose_cid;
pub use cost::estimate_storage_cost;
pub use hash::{ContentHasher, digest};
pub use progress::{Phase, PipelineProgress, ProgressEvent};
pub use types::{Chunk, chunk_count};

/// Default chunk size: the content-store contract's 32,000-byte limit.
pub const DEFAULT_CHUNK_SIZE: usize = onchmint_protocol::constants::CHUNK_SIZE;

/// Errors produced by the transfer crate.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
