//! Pipeline progress state machine.
//!
//! `Idle → UploadingChunks(i of N) → CreatingInode → Minting → Done`, with
//! `Failed` reachable from any non-terminal phase. `Failed` records the phase
//! that was running. `Done` and `Failed` absorb every further event until
//! [`PipelineProgress::reset`].
//!
//! The tracker only observes: steps report what happened and the pipeline
//! folds that into a new state with [`PipelineProgress::apply`].

use onchmint_protocol::OperationHash;
use serde::Serialize;
use tracing::debug;

/// Current pipeline phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum Phase {
    Idle,
    UploadingChunks { current: usize, total: usize },
    CreatingInode,
    Minting,
    Done,
    Failed { during: Box<Phase> },
}

/// Something a pipeline step reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// A run begins for a file of `chunk_count` chunks.
    Started { chunk_count: usize },
    /// Chunk `index` (zero-based) is being processed.
    ChunkStarted { index: usize },
    /// Chunk `index` is present on the ledger; `op` is set when it was written
    /// by this run and `None` when it was already stored.
    ChunkStored {
        index: usize,
        op: Option<OperationHash>,
    },
    InodeStarted,
    /// The file record exists; `op` is `None` when creation was skipped.
    InodeReady { op: Option<OperationHash> },
    MintStarted,
    Minted { op: OperationHash },
    Failed { reason: String },
}

/// Snapshot of pipeline progress.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineProgress {
    #[serde(flatten)]
    pub phase: Phase,
    pub completed_steps: usize,
    pub total_steps: usize,
    pub message: String,
}

impl Default for PipelineProgress {
    fn default() -> Self {
        Self::idle()
    }
}

impl PipelineProgress {
    pub fn idle() -> Self {
        Self {
            phase: Phase::Idle,
            completed_steps: 0,
            total_steps: 0,
            message: String::new(),
        }
    }

    /// Percentage complete: `completed_steps / total_steps * 100`.
    pub fn percentage(&self) -> f64 {
        if self.total_steps == 0 {
            return 0.0;
        }
        self.completed_steps as f64 / self.total_steps as f64 * 100.0
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.phase, Phase::Done | Phase::Failed { .. })
    }

    /// Returns to `Idle`. The only way out of `Done` or `Failed`.
    pub fn reset(self) -> Self {
        Self::idle()
    }

    /// Folds an event into the next state.
    pub fn apply(self, event: ProgressEvent) -> Self {
        if self.is_terminal() {
            debug!(phase = ?self.phase, ?event, "ignoring progress event after terminal phase");
            return self;
        }

        let chunk_total = self.total_steps.saturating_sub(2);
        let mut next = self;
        match event {
            ProgressEvent::Started { chunk_count } => {
                next.total_steps = chunk_count + 2;
                next.completed_steps = 0;
                next.phase = Phase::UploadingChunks {
                    current: 0,
                    total: chunk_count,
                };
                next.message = "Starting minting process...".into();
            }
            ProgressEvent::ChunkStarted { index } => {
                next.phase = Phase::UploadingChunks {
                    current: index + 1,
                    total: chunk_total,
                };
                next.message = format!("Uploading chunk {}/{}...", index + 1, chunk_total);
            }
            ProgressEvent::ChunkStored { index, op } => {
                next.advance_to(index + 1);
                next.message = match op {
                    Some(op) => format!("Chunk {} uploaded. Operation hash: {op}", index + 1),
                    None => format!("Chunk {} already exists.", index + 1),
                };
            }
            ProgressEvent::InodeStarted => {
                next.phase = Phase::CreatingInode;
                next.message = "Checking if file already exists...".into();
            }
            ProgressEvent::InodeReady { op } => {
                next.advance_to(chunk_total + 1);
                next.message = match op {
                    Some(op) => format!("File inode created. Operation hash: {op}"),
                    None => "File already exists. Skipping inode creation.".into(),
                };
            }
            ProgressEvent::MintStarted => {
                next.phase = Phase::Minting;
                next.message = "Minting token...".into();
            }
            ProgressEvent::Minted { op } => {
                next.completed_steps = next.total_steps;
                next.phase = Phase::Done;
                next.message = format!("Token minted successfully! Operation hash: {op}");
            }
            ProgressEvent::Failed { reason } => {
                next.phase = Phase::Failed {
                    during: Box::new(next.phase),
                };
                next.message = format!("Minting process failed: {reason}");
            }
        }
        next
    }

    fn advance_to(&mut self, steps: usize) {
        // Never move backwards.
        self.completed_steps = self.completed_steps.max(steps.min(self.total_steps));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn op(s: &str) -> OperationHash {
        OperationHash(s.into())
    }

    fn run_three_chunks() -> Vec<f64> {
        let mut p = PipelineProgress::idle().apply(ProgressEvent::Started { chunk_count: 3 });
        let mut seen = Vec::new();
        for i in 0..3 {
            p = p.apply(ProgressEvent::ChunkStarted { index: i });
            p = p.apply(ProgressEvent::ChunkStored {
                index: i,
                op: Some(op("oo1")),
            });
            seen.push(p.percentage());
        }
        p = p.apply(ProgressEvent::InodeStarted);
        p = p.apply(ProgressEvent::InodeReady { op: None });
        seen.push(p.percentage());
        p = p.apply(ProgressEvent::MintStarted);
        p = p.apply(ProgressEvent::Minted { op: op("oo2") });
        seen.push(p.percentage());
        assert_eq!(p.phase, Phase::Done);
        seen
    }

    #[test]
    fn three_chunk_percentages() {
        let seen = run_three_chunks();
        let expected = [20.0, 40.0, 60.0, 80.0, 100.0];
        for (got, want) in seen.iter().zip(expected) {
            assert!((got - want).abs() < 1e-9, "{got} != {want}");
        }
    }

    #[test]
    fn idle_is_zero_percent() {
        assert_eq!(PipelineProgress::idle().percentage(), 0.0);
        assert_eq!(PipelineProgress::default().phase, Phase::Idle);
    }

    #[test]
    fn chunk_messages() {
        let p = PipelineProgress::idle()
            .apply(ProgressEvent::Started { chunk_count: 2 })
            .apply(ProgressEvent::ChunkStarted { index: 0 });
        assert_eq!(p.message, "Uploading chunk 1/2...");
        assert_eq!(
            p.phase,
            Phase::UploadingChunks {
                current: 1,
                total: 2
            }
        );

        let p = p.apply(ProgressEvent::ChunkStored { index: 0, op: None });
        assert_eq!(p.message, "Chunk 1 already exists.");
    }

    #[test]
    fn failed_is_absorbing() {
        let p = PipelineProgress::idle()
            .apply(ProgressEvent::Started { chunk_count: 1 })
            .apply(ProgressEvent::Failed {
                reason: "boom".into(),
            });
        assert_eq!(
            p.phase,
            Phase::Failed {
                during: Box::new(Phase::UploadingChunks {
                    current: 0,
                    total: 1
                })
            }
        );
        let before = p.clone();

        let p = p
            .apply(ProgressEvent::ChunkStored {
                index: 0,
                op: None,
            })
            .apply(ProgressEvent::Minted { op: op("x") });
        assert_eq!(p, before);
    }

    #[test]
    fn done_is_absorbing_until_reset() {
        let p = PipelineProgress::idle()
            .apply(ProgressEvent::Started { chunk_count: 0 })
            .apply(ProgressEvent::Minted { op: op("x") });
        assert!(p.is_terminal());

        let p = p.apply(ProgressEvent::Failed {
            reason: "late".into(),
        });
        assert_eq!(p.phase, Phase::Done);

        let p = p.reset();
        assert_eq!(p, PipelineProgress::idle());
        let p = p.apply(ProgressEvent::Started { chunk_count: 4 });
        assert_eq!(p.total_steps, 6);
    }

    #[test]
    fn failure_records_running_phase() {
        let p = PipelineProgress::idle()
            .apply(ProgressEvent::Started { chunk_count: 1 })
            .apply(ProgressEvent::InodeStarted)
            .apply(ProgressEvent::Failed {
                reason: "x".into(),
            });
        assert_eq!(
            p.phase,
            Phase::Failed {
                during: Box::new(Phase::CreatingInode)
            }
        );
        assert_eq!(
            serde_json::to_value(&p).unwrap()["during"]["phase"],
            "creating_inode"
        );
    }

    #[test]
    fn failure_keeps_last_percentage() {
        let p = PipelineProgress::idle()
            .apply(ProgressEvent::Started { chunk_count: 3 })
            .apply(ProgressEvent::ChunkStored {
                index: 0,
                op: None,
            })
            .apply(ProgressEvent::Failed {
                reason: "x".into(),
            });
        assert!((p.percentage() - 20.0).abs() < 1e-9);
    }

    #[test]
    fn percentage_never_decreases() {
        let p = PipelineProgress::idle()
            .apply(ProgressEvent::Started { chunk_count: 3 })
            .apply(ProgressEvent::ChunkStored {
                index: 2,
                op: None,
            });
        let high = p.percentage();
        let p = p.apply(ProgressEvent::ChunkStored {
            index: 0,
            op: None,
        });
        assert!(p.percentage() >= high);
    }

    #[test]
    fn serializes_phase_inline() {
        let p = PipelineProgress::idle().apply(ProgressEvent::Started { chunk_count: 2 });
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["phase"], "uploading_chunks");
        assert_eq!(json["total"], 2);
        assert_eq!(json["totalSteps"], 4);
    }
}
