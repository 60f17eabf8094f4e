//! Folds step reports into progress snapshots and publishes them.

use onchmint_transfer::{PipelineProgress, ProgressEvent};
use tokio::sync::mpsc;
use tracing::debug;

use crate::types::PipelineEvent;

/// Current progress of a run plus the optional channel it is published on.
///
/// Publishing is best-effort: a closed or missing receiver never fails a run.
pub struct ProgressReporter<'a> {
    state: PipelineProgress,
    events_tx: Option<&'a mpsc::Sender<PipelineEvent>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new(events_tx: Option<&'a mpsc::Sender<PipelineEvent>>) -> Self {
        Self {
            state: PipelineProgress::idle(),
            events_tx,
        }
    }

    pub fn state(&self) -> &PipelineProgress {
        &self.state
    }

    pub async fn report(&mut self, event: ProgressEvent) {
        let state = std::mem::take(&mut self.state);
        self.state = state.apply(event);
        debug!(
            phase = ?self.state.phase,
            percent = self.state.percentage(),
            message = %self.state.message,
            "progress"
        );
        self.publish(PipelineEvent::Progress(self.state.clone())).await;
    }

    pub(crate) async fn publish(&self, event: PipelineEvent) {
        if let Some(tx) = self.events_tx {
            let _ = tx.send(event).await;
        }
    }
}
