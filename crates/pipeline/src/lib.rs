//! Upload and mint pipeline for the onchfs content store.
//!
//! A run takes a local file through these steps, each behind an existence
//! check so that a failed run can simply be repeated:
//!
//! 1. split the file into 32,000-byte chunks and store the missing ones
//!    ([`ChunkStoreClient`]);
//! 2. compose the file CID and create its inode if absent
//!    ([`InodeRegistrar`]);
//! 3. mint a token referencing `onchfs://<cid>` in one atomic batch
//!    ([`MintOrchestrator`]).
//!
//! [`MintPipeline`] chains the steps and publishes [`PipelineEvent`]s.
//! Ledger access goes through the [`LedgerClient`] trait; [`MemoryLedger`]
//! implements it in-process.

pub mod error;
pub mod headers;
pub mod inode;
pub mod ledger;
pub mod memory;
pub mod metadata;
pub mod mint;
pub mod pipeline;
pub mod report;
pub mod types;
pub mod upload;
mod validation;

pub use error::{LedgerError, PipelineError, ValidationError, ViewError};
pub use headers::{HeaderMap, HeaderMapError, StaticHeaderMap, detect_media_type};
pub use inode::InodeRegistrar;
pub use ledger::{LedgerClient, LedgerFuture, Lookup, classify_view};
pub use memory::{Faults, MemoryLedger};
pub use metadata::{build_create_token_params, parse_tags};
pub use mint::{FixedSupply, MintOrchestrator, MintResult, build_mint_batch};
pub use pipeline::MintPipeline;
pub use report::ProgressReporter;
pub use types::{
    AssetFile, Attribute, ChunkOutcome, Edition, InodeOutcome, MintConfig, MintReceipt, Pacing,
    PipelineEvent, PipelineSettings, UploadRequest,
};
pub use upload::{ChunkStoreClient, UploadSummary};
