//! Ledger calls and atomic batches.

use serde::{Deserialize, Serialize};

use crate::constants::Entrypoint;
use crate::types::{ByteString, ContentHash};

/// A single contract call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerCall {
    /// Address of the target contract.
    pub destination: String,
    pub params: CallParams,
}

/// Entrypoint and its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "entrypoint", content = "parameters", rename_all = "snake_case")]
pub enum CallParams {
    /// Stores raw chunk bytes; the contract keys them by their digest.
    WriteChunk { bytes: ByteString },
    /// Creates a file record from ordered chunk pointers and a metadata header.
    CreateFile {
        chunk_pointers: Vec<ContentHash>,
        metadata: ByteString,
    },
    CreateToken(CreateTokenParams),
    Mint {
        token_id: u64,
        mint_items: Vec<MintItem>,
    },
    /// Freezes metadata and/or further minting of a token.
    Lock {
        token_id: u64,
        metadata: bool,
        mint: bool,
    },
}

impl CallParams {
    pub fn entrypoint(&self) -> Entrypoint {
        match self {
            Self::WriteChunk { .. } => Entrypoint::WriteChunk,
            Self::CreateFile { .. } => Entrypoint::CreateFile,
            Self::CreateToken(_) => Entrypoint::CreateToken,
            Self::Mint { .. } => Entrypoint::Mint,
            Self::Lock { .. } => Entrypoint::Lock,
        }
    }
}

impl LedgerCall {
    pub fn new(destination: impl Into<String>, params: CallParams) -> Self {
        Self {
            destination: destination.into(),
            params,
        }
    }

    pub fn entrypoint(&self) -> Entrypoint {
        self.params.entrypoint()
    }
}

/// Parameters of the token contract's `create_token` entrypoint.
///
/// Every field is UTF-8 text encoded as bytes. Optional fields are omitted
/// entirely when unset rather than sent empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTokenParams {
    pub name: ByteString,
    pub description: ByteString,
    pub artifact_uri: ByteString,
    /// JSON array of creator addresses.
    pub creators: ByteString,
    /// JSON object `{"decimals": .., "shares": {address: share}}`.
    pub royalties: ByteString,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<ByteString>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<ByteString>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formats: Option<ByteString>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<ByteString>,
}

/// One recipient of a `mint` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintItem {
    pub amount: u64,
    #[serde(rename = "to_")]
    pub to: String,
}

/// Error returned when building a batch with no calls.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("transaction batch must contain at least one call")]
pub struct EmptyBatch;

/// Ordered, non-empty list of calls applied atomically by the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<LedgerCall>", into = "Vec<LedgerCall>")]
pub struct TransactionBatch {
    calls: Vec<LedgerCall>,
}

impl TransactionBatch {
    pub fn new(calls: Vec<LedgerCall>) -> Result<Self, EmptyBatch> {
        if calls.is_empty() {
            return Err(EmptyBatch);
        }
        Ok(Self { calls })
    }

    /// Batch holding exactly one call.
    pub fn single(call: LedgerCall) -> Self {
        Self { calls: vec![call] }
    }

    /// Appends a call; it is applied after every call already in the batch.
    pub fn push(&mut self, call: LedgerCall) {
        self.calls.push(call);
    }

    pub fn calls(&self) -> &[LedgerCall] {
        &self.calls
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    pub fn entrypoints(&self) -> Vec<Entrypoint> {
        self.calls.iter().map(LedgerCall::entrypoint).collect()
    }
}

impl TryFrom<Vec<LedgerCall>> for TransactionBatch {
    type Error = EmptyBatch;

    fn try_from(calls: Vec<LedgerCall>) -> Result<Self, Self::Error> {
        Self::new(calls)
    }
}

impl From<TransactionBatch> for Vec<LedgerCall> {
    fn from(batch: TransactionBatch) -> Self {
        batch.calls
    }
}
