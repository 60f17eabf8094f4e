//! Chunk store client: dedup-aware sequential chunk upload.

use onchmint_protocol::{ByteString, CallParams, Entrypoint, LedgerCall, TransactionBatch};
use onchmint_transfer::{Chunk, ProgressEvent};
use tracing::{debug, info};

use crate::error::PipelineError;
use crate::ledger::{LedgerClient, Lookup, classify_view};
use crate::report::ProgressReporter;
use crate::types::{ChunkOutcome, Pacing, PipelineSettings};

/// Counts from an upload pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UploadSummary {
    pub uploaded: usize,
    pub skipped: usize,
}

/// Stores chunks in the content-store contract, one at a time.
pub struct ChunkStoreClient<'a> {
    ledger: &'a dyn LedgerClient,
    settings: &'a PipelineSettings,
}

impl<'a> ChunkStoreClient<'a> {
    pub fn new(ledger: &'a dyn LedgerClient, settings: &'a PipelineSettings) -> Self {
        Self { ledger, settings }
    }

    /// Ensures one chunk is stored, writing it only if the ledger lacks it.
    pub async fn store_chunk(&self, chunk: &Chunk) -> Result<ChunkOutcome, PipelineError> {
        let store = self.settings.content_store.as_str();
        let lookup = classify_view(self.ledger.read_chunk(store, &chunk.hash).await).map_err(
            |source| PipelineError::AmbiguousExistenceCheck {
                subject: format!("chunk {}", chunk.hash),
                source,
            },
        )?;

        if lookup == Lookup::Found {
            debug!(chunk = chunk.index, hash = %chunk.hash, "chunk already stored");
            return Ok(ChunkOutcome::AlreadyStored);
        }

        let batch = TransactionBatch::single(LedgerCall::new(
            store,
            CallParams::WriteChunk {
                bytes: ByteString::from(chunk.data.as_slice()),
            },
        ));
        let op = self
            .ledger
            .send(&batch)
            .await
            .map_err(|source| PipelineError::ChainCallFailure {
                entrypoint: Entrypoint::WriteChunk,
                op: None,
                source,
            })?;
        self.ledger
            .confirm(&op, self.settings.confirmations)
            .await
            .map_err(|source| PipelineError::ChainCallFailure {
                entrypoint: Entrypoint::WriteChunk,
                op: Some(op.clone()),
                source,
            })?;

        debug!(chunk = chunk.index, hash = %chunk.hash, op = %op, "chunk written");
        Ok(ChunkOutcome::Uploaded(op))
    }

    /// Stores every chunk in order, reporting one progress step per chunk.
    ///
    /// Stops at the first failure; chunks confirmed so far stay on the ledger.
    pub async fn upload_all(
        &self,
        chunks: &[Chunk],
        reporter: &mut ProgressReporter<'_>,
    ) -> Result<UploadSummary, PipelineError> {
        let mut summary = UploadSummary::default();
        for chunk in chunks {
            reporter
                .report(ProgressEvent::ChunkStarted { index: chunk.index })
                .await;

            let op = match self.store_chunk(chunk).await? {
                ChunkOutcome::Uploaded(op) => {
                    summary.uploaded += 1;
                    pace(self.settings.pacing).await;
                    Some(op)
                }
                ChunkOutcome::AlreadyStored => {
                    summary.skipped += 1;
                    None
                }
            };
            reporter
                .report(ProgressEvent::ChunkStored {
                    index: chunk.index,
                    op,
                })
                .await;
        }
        info!(
            uploaded = summary.uploaded,
            skipped = summary.skipped,
            "chunk upload finished"
        );
        Ok(summary)
    }
}

/// Spaces a confirmed write from the next submission.
pub(crate) async fn pace(pacing: Pacing) {
    if let Pacing::Fixed(delay) = pacing {
        tokio::time::sleep(delay).await;
    }
}
