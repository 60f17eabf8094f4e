//! End-to-end upload and mint pipeline.

use onchmint_transfer::{Chunk, ProgressEvent, compose_cid, read_chunks};
use tokio::sync::mpsc;
use tracing::{error, info};

use crate::error::{PipelineError, ValidationError};
use crate::headers::HeaderMap;
use crate::inode::InodeRegistrar;
use crate::ledger::LedgerClient;
use crate::mint::MintOrchestrator;
use crate::report::ProgressReporter;
use crate::types::{MintReceipt, PipelineEvent, PipelineSettings, UploadRequest};
use crate::upload::ChunkStoreClient;

/// Runs chunk upload, inode registration and minting for one file.
///
/// Every ledger write is preceded by an existence check, so re-running a
/// failed request skips whatever already reached the ledger.
pub struct MintPipeline<'a> {
    ledger: Option<&'a dyn LedgerClient>,
    headers: &'a dyn HeaderMap,
    settings: PipelineSettings,
}

impl<'a> MintPipeline<'a> {
    pub fn new(
        ledger: Option<&'a dyn LedgerClient>,
        headers: &'a dyn HeaderMap,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            ledger,
            headers,
            settings,
        }
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Runs the pipeline, publishing progress on `events_tx` if given.
    ///
    /// Ends with either [`PipelineEvent::Completed`] or
    /// [`PipelineEvent::Failed`] on the channel.
    pub async fn run(
        &self,
        request: &UploadRequest,
        events_tx: Option<&mpsc::Sender<PipelineEvent>>,
    ) -> Result<MintReceipt, PipelineError> {
        let mut reporter = ProgressReporter::new(events_tx);
        match self.execute(request, &mut reporter).await {
            Ok(receipt) => {
                reporter
                    .publish(PipelineEvent::Completed(receipt.clone()))
                    .await;
                Ok(receipt)
            }
            Err(e) => {
                error!(path = %request.asset.path.display(), error = %e, "pipeline failed");
                reporter
                    .report(ProgressEvent::Failed {
                        reason: e.to_string(),
                    })
                    .await;
                reporter
                    .publish(PipelineEvent::Failed {
                        error: e.to_string(),
                    })
                    .await;
                Err(e)
            }
        }
    }

    async fn execute(
        &self,
        request: &UploadRequest,
        reporter: &mut ProgressReporter<'_>,
    ) -> Result<MintReceipt, PipelineError> {
        let ledger = self
            .ledger
            .ok_or(PipelineError::Uninitialized("ledger client"))?;
        if ledger.account().is_none() {
            return Err(PipelineError::Uninitialized("signing account"));
        }
        let collection = request
            .collection
            .as_deref()
            .ok_or(PipelineError::Uninitialized("collection"))?;

        self.settings.validate()?;
        request.mint.validate()?;

        let media_type = request.asset.media_type.as_str();
        let header = self
            .headers
            .header_for(media_type)
            .ok_or_else(|| PipelineError::MissingHeaderMapping(media_type.to_string()))?;

        let chunks = self.load_chunks(request).await?;
        info!(
            path = %request.asset.path.display(),
            chunks = chunks.len(),
            media_type,
            "starting upload"
        );
        reporter
            .report(ProgressEvent::Started {
                chunk_count: chunks.len(),
            })
            .await;

        let summary = ChunkStoreClient::new(ledger, &self.settings)
            .upload_all(&chunks, reporter)
            .await?;

        reporter.report(ProgressEvent::InodeStarted).await;
        let cid = compose_cid(&chunks, header);
        let pointers: Vec<_> = chunks.iter().map(|c| c.hash).collect();
        let inode = InodeRegistrar::new(ledger, &self.settings)
            .register(&cid, &pointers, header)
            .await?;
        reporter
            .report(ProgressEvent::InodeReady {
                op: inode.op().cloned(),
            })
            .await;

        reporter.report(ProgressEvent::MintStarted).await;
        let artifact_uri = cid.artifact_uri();
        let minted = MintOrchestrator::new(ledger, &self.settings)
            .mint(collection, &request.mint, &artifact_uri, media_type)
            .await?;
        reporter
            .report(ProgressEvent::Minted {
                op: minted.op.clone(),
            })
            .await;

        Ok(MintReceipt {
            cid,
            artifact_uri,
            chunks_uploaded: summary.uploaded,
            chunks_skipped: summary.skipped,
            inode_op: inode.op().cloned(),
            mint_op: minted.op,
            token: minted.token,
        })
    }

    async fn load_chunks(&self, request: &UploadRequest) -> Result<Vec<Chunk>, PipelineError> {
        let path = request.asset.path.clone();
        let chunk_size = self.settings.chunk_size;
        let chunks = tokio::task::spawn_blocking(move || read_chunks(&path, chunk_size))
            .await
            .map_err(|e| PipelineError::Join(e.to_string()))??;
        if chunks.is_empty() {
            return Err(ValidationError::EmptyFile.into());
        }
        Ok(chunks)
    }
}
