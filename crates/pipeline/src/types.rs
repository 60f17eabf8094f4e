//! Data types for the upload and mint flow.

use std::path::PathBuf;
use std::time::Duration;

use onchmint_protocol::constants::{CHUNK_SIZE, DEFAULT_CONFIRMATIONS, DEFAULT_LICENSE};
use onchmint_protocol::{FileCid, OperationHash, TokenRef};
use onchmint_transfer::PipelineProgress;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A name/value trait attached to a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Supply mode of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Edition {
    /// Unbounded supply; the token contract handles further issuance.
    Open,
    /// A fixed number of editions minted to the creator and then locked.
    Fixed(u32),
}

impl Default for Edition {
    fn default() -> Self {
        Self::Fixed(1)
    }
}

/// User-supplied token configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintConfig {
    pub name: String,
    pub description: String,
    /// Royalty percentage, 0 to 100 inclusive.
    #[serde(default = "default_royalties")]
    pub royalties: i32,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    #[serde(default = "default_license")]
    pub license: String,
    #[serde(default)]
    pub edition: Edition,
}

fn default_royalties() -> i32 {
    10
}

fn default_license() -> String {
    DEFAULT_LICENSE.into()
}

impl Default for MintConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            royalties: default_royalties(),
            tags: Vec::new(),
            attributes: Vec::new(),
            license: default_license(),
            edition: Edition::default(),
        }
    }
}

/// A local file and its declared media type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetFile {
    pub path: PathBuf,
    pub media_type: String,
}

/// One upload-and-mint request.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub asset: AssetFile,
    /// Token contract to mint into; `None` means no collection was selected.
    pub collection: Option<String>,
    pub mint: MintConfig,
}

/// How the chunk store client spaces successive write submissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pacing {
    /// Submit the next write once the previous one is confirmed.
    #[default]
    Confirmation,
    /// Additionally wait a fixed duration after each confirmed write.
    Fixed(Duration),
}

impl Pacing {
    /// `0` selects confirmation pacing.
    pub fn from_millis(ms: u64) -> Self {
        if ms == 0 {
            Self::Confirmation
        } else {
            Self::Fixed(Duration::from_millis(ms))
        }
    }
}

/// Ledger-facing settings for a pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineSettings {
    /// Address of the content-store contract.
    pub content_store: String,
    pub chunk_size: usize,
    pub confirmations: u32,
    pub pacing: Pacing,
}

impl PipelineSettings {
    pub fn new(content_store: impl Into<String>) -> Self {
        Self {
            content_store: content_store.into(),
            chunk_size: CHUNK_SIZE,
            confirmations: DEFAULT_CONFIRMATIONS,
            pacing: Pacing::default(),
        }
    }

    /// Rejects chunk sizes the content store would refuse. `0` selects the
    /// default size.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.chunk_size > CHUNK_SIZE {
            return Err(ValidationError::ChunkSizeTooLarge {
                size: self.chunk_size,
                max: CHUNK_SIZE,
            });
        }
        Ok(())
    }
}

/// Result of processing one chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkOutcome {
    Uploaded(OperationHash),
    AlreadyStored,
}

/// Result of the inode step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InodeOutcome {
    Created(OperationHash),
    AlreadyExists,
}

impl InodeOutcome {
    pub fn op(&self) -> Option<&OperationHash> {
        match self {
            Self::Created(op) => Some(op),
            Self::AlreadyExists => None,
        }
    }
}

/// Outcome of a successful pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MintReceipt {
    pub cid: FileCid,
    pub artifact_uri: String,
    pub chunks_uploaded: usize,
    pub chunks_skipped: usize,
    /// Operation that created the file record, if this run created it.
    pub inode_op: Option<OperationHash>,
    pub mint_op: OperationHash,
    pub token: TokenRef,
}

/// Event emitted during a pipeline run.
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    Progress(PipelineProgress),
    Completed(MintReceipt),
    Failed { error: String },
}
