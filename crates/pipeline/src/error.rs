//! Pipeline error types.

use onchmint_protocol::{Entrypoint, OperationHash};
use onchmint_transfer::TransferError;

/// Failure of a read-only contract view.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ViewError {
    /// The view executed and failed; for existence views this means "absent".
    #[error("view reverted: {0}")]
    Reverted(String),

    /// The view could not be executed (network, node, timeout).
    #[error("transport error: {0}")]
    Transport(String),
}

/// Failure reported by the ledger client for storage reads and write calls.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("operation rejected: {0}")]
    Rejected(String),

    #[error("confirmation failed: {0}")]
    Confirmation(String),

    #[error("unexpected contract storage: {0}")]
    Storage(String),
}

/// Malformed mint request, detected before any ledger call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("name is required")]
    EmptyName,

    #[error("description is required")]
    EmptyDescription,

    #[error("royalties must be between 0 and 100, got {0}")]
    RoyaltyOutOfRange(i32),

    #[error("a fixed edition needs at least one edition")]
    ZeroEditions,

    #[error("attribute #{0} needs both a name and a value")]
    IncompleteAttribute(usize),

    #[error("attribute name must be unique: {0}")]
    DuplicateAttribute(String),

    #[error("file is empty")]
    EmptyFile,

    #[error("chunk size {size} exceeds the content-store limit of {max} bytes")]
    ChunkSizeTooLarge { size: usize, max: usize },
}

/// Errors produced by the upload and mint pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("not initialized: {0} is missing")]
    Uninitialized(&'static str),

    #[error("invalid mint request: {0}")]
    Validation(#[from] ValidationError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no metadata header mapped for media type {0:?}")]
    MissingHeaderMapping(String),

    #[error("{entrypoint} call failed: {source}")]
    ChainCallFailure {
        entrypoint: Entrypoint,
        /// Set when the call was submitted before failing.
        op: Option<OperationHash>,
        source: LedgerError,
    },

    #[error("existence check for {subject} failed: {source}")]
    AmbiguousExistenceCheck { subject: String, source: ViewError },

    /// The token batch was never applied; nothing changed on the ledger.
    #[error("mint aborted before submission: {0}")]
    MintAborted(LedgerError),

    /// The token batch was submitted but its outcome is unknown.
    #[error("mint operation {op} submitted but not confirmed: {source}")]
    AmbiguousMintOutcome {
        op: OperationHash,
        source: LedgerError,
    },

    /// The token batch was confirmed but the minted token id could not be read.
    #[error("mint operation {op} confirmed but the token id lookup failed: {source}")]
    TokenLookup {
        op: OperationHash,
        source: LedgerError,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("task join error: {0}")]
    Join(String),
}

impl From<TransferError> for PipelineError {
    fn from(e: TransferError) -> Self {
        match e {
            TransferError::Io(io) => Self::Io(io),
        }
    }
}

impl PipelineError {
    /// Returns `true` if the ledger may hold effects this run cannot account for.
    pub fn is_ambiguous(&self) -> bool {
        matches!(
            self,
            Self::AmbiguousMintOutcome { .. } | Self::AmbiguousExistenceCheck { .. }
        )
    }
}
