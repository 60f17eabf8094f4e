//! Ledger call vocabulary shared by the upload and mint pipeline.
//!
//! Describes the calls issued against the content-store contract
//! (`write_chunk`, `create_file`) and the token contract (`create_token`,
//! `mint`, `lock`), plus the digest and identifier types they carry.

pub mod calls;
pub mod constants;
pub mod types;

// Re-export primary types for convenience.
pub use calls::{CallParams, CreateTokenParams, EmptyBatch, LedgerCall, MintItem, TransactionBatch};
pub use constants::Entrypoint;
pub use types::{ByteString, ContentHash, FileCid, HASH_LEN, OperationHash, ParseHexError, TokenRef};
