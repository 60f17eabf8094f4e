//! Ledger client seam.
//!
//! `LedgerClient` is implemented on top of a real node/wallet connection by
//! the embedding application, and by [`MemoryLedger`](crate::MemoryLedger)
//! for simulation and tests. Keeping the pipeline behind a trait keeps it
//! independent of any particular RPC stack.

use std::future::Future;
use std::pin::Pin;

use onchmint_protocol::{ContentHash, FileCid, OperationHash, TransactionBatch};

use crate::error::{LedgerError, ViewError};

/// Boxed future returned by [`LedgerClient`] methods.
pub type LedgerFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Abstract connection to the ledger and the signing account.
pub trait LedgerClient: Send + Sync {
    /// Address of the active signing account, if one is connected.
    fn account(&self) -> Option<&str>;

    /// Content-store view: succeeds iff a chunk with this digest is stored.
    fn read_chunk<'a>(
        &'a self,
        store: &'a str,
        hash: &'a ContentHash,
    ) -> LedgerFuture<'a, Result<(), ViewError>>;

    /// Content-store view: succeeds iff a file record with this CID exists.
    fn read_file<'a>(
        &'a self,
        store: &'a str,
        cid: &'a FileCid,
    ) -> LedgerFuture<'a, Result<(), ViewError>>;

    /// Reads the highest token identifier from the token contract's storage.
    fn last_token_id<'a>(&'a self, collection: &'a str) -> LedgerFuture<'a, Result<u64, LedgerError>>;

    /// Signs and submits a batch, returning its operation hash.
    fn send<'a>(
        &'a self,
        batch: &'a TransactionBatch,
    ) -> LedgerFuture<'a, Result<OperationHash, LedgerError>>;

    /// Waits until `op` has `confirmations` confirmations.
    fn confirm<'a>(
        &'a self,
        op: &'a OperationHash,
        confirmations: u32,
    ) -> LedgerFuture<'a, Result<(), LedgerError>>;
}

/// Result of an existence view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    Found,
    NotFound,
}

/// Interprets an existence view: a revert means absent, a transport
/// failure stays an error.
pub fn classify_view(result: Result<(), ViewError>) -> Result<Lookup, ViewError> {
    match result {
        Ok(()) => Ok(Lookup::Found),
        Err(ViewError::Reverted(_)) => Ok(Lookup::NotFound),
        Err(e @ ViewError::Transport(_)) => Err(e),
    }
}
