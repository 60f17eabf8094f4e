//! Inode registrar: binds a CID to its chunk pointers on the ledger.

use onchmint_protocol::{
    ByteString, CallParams, ContentHash, Entrypoint, FileCid, LedgerCall, TransactionBatch,
};
use tracing::{debug, info};

use crate::error::PipelineError;
use crate::ledger::{LedgerClient, Lookup, classify_view};
use crate::types::{InodeOutcome, PipelineSettings};
use crate::upload::pace;

pub struct InodeRegistrar<'a> {
    ledger: &'a dyn LedgerClient,
    settings: &'a PipelineSettings,
}

impl<'a> InodeRegistrar<'a> {
    pub fn new(ledger: &'a dyn LedgerClient, settings: &'a PipelineSettings) -> Self {
        Self { ledger, settings }
    }

    /// Creates the file record for `cid` unless it already exists.
    ///
    /// `chunk_pointers` must be in file order and already stored.
    pub async fn register(
        &self,
        cid: &FileCid,
        chunk_pointers: &[ContentHash],
        header: &[u8],
    ) -> Result<InodeOutcome, PipelineError> {
        let store = self.settings.content_store.as_str();
        let lookup = classify_view(self.ledger.read_file(store, cid).await).map_err(|source| {
            PipelineError::AmbiguousExistenceCheck {
                subject: format!("file {cid}"),
                source,
            }
        })?;

        if lookup == Lookup::Found {
            info!(cid = %cid, "file already exists, skipping inode creation");
            return Ok(InodeOutcome::AlreadyExists);
        }

        let batch = TransactionBatch::single(LedgerCall::new(
            store,
            CallParams::CreateFile {
                chunk_pointers: chunk_pointers.to_vec(),
                metadata: ByteString::from(header),
            },
        ));
        let op = self
            .ledger
            .send(&batch)
            .await
            .map_err(|source| PipelineError::ChainCallFailure {
                entrypoint: Entrypoint::CreateFile,
                op: None,
                source,
            })?;
        self.ledger
            .confirm(&op, self.settings.confirmations)
            .await
            .map_err(|source| PipelineError::ChainCallFailure {
                entrypoint: Entrypoint::CreateFile,
                op: Some(op.clone()),
                source,
            })?;
        pace(self.settings.pacing).await;

        debug!(cid = %cid, pointers = chunk_pointers.len(), op = %op, "inode created");
        Ok(InodeOutcome::Created(op))
    }
}
