//! Mint orchestrator: builds and submits the atomic token batch.

use onchmint_protocol::{
    CallParams, CreateTokenParams, LedgerCall, MintItem, OperationHash, TokenRef, TransactionBatch,
};
use tracing::{info, warn};

use crate::error::{LedgerError, PipelineError};
use crate::ledger::LedgerClient;
use crate::metadata::build_create_token_params;
use crate::types::{Edition, MintConfig, PipelineSettings};

/// Supply minted to the creator and locked in the same batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedSupply {
    /// Identifier the token contract will assign to the created token.
    pub token_id: u64,
    pub editions: u32,
}

/// Assembles the token batch: `create_token`, then for fixed supplies
/// `mint` to the creator and `lock` further minting.
pub fn build_mint_batch(
    collection: &str,
    create: CreateTokenParams,
    creator: &str,
    supply: Option<FixedSupply>,
) -> TransactionBatch {
    let mut batch =
        TransactionBatch::single(LedgerCall::new(collection, CallParams::CreateToken(create)));
    if let Some(supply) = supply {
        batch.push(LedgerCall::new(
            collection,
            CallParams::Mint {
                token_id: supply.token_id,
                mint_items: vec![MintItem {
                    amount: u64::from(supply.editions),
                    to: creator.to_string(),
                }],
            },
        ));
        batch.push(LedgerCall::new(
            collection,
            CallParams::Lock {
                token_id: supply.token_id,
                metadata: false,
                mint: true,
            },
        ));
    }
    batch
}

/// Confirmed mint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintResult {
    pub op: OperationHash,
    pub token: TokenRef,
}

pub struct MintOrchestrator<'a> {
    ledger: &'a dyn LedgerClient,
    settings: &'a PipelineSettings,
}

impl<'a> MintOrchestrator<'a> {
    pub fn new(ledger: &'a dyn LedgerClient, settings: &'a PipelineSettings) -> Self {
        Self { ledger, settings }
    }

    /// Mints a token referencing `artifact_uri` into `collection`.
    ///
    /// Failures before submission are [`PipelineError::MintAborted`] and leave
    /// the ledger untouched; a failed confirmation wait is
    /// [`PipelineError::AmbiguousMintOutcome`].
    pub async fn mint(
        &self,
        collection: &str,
        config: &MintConfig,
        artifact_uri: &str,
        media_type: &str,
    ) -> Result<MintResult, PipelineError> {
        let creator = self
            .ledger
            .account()
            .ok_or(PipelineError::Uninitialized("signing account"))?;
        let create = build_create_token_params(config, artifact_uri, media_type, creator)?;

        let supply = match config.edition {
            Edition::Open => None,
            Edition::Fixed(editions) => {
                let last = self
                    .ledger
                    .last_token_id(collection)
                    .await
                    .map_err(PipelineError::MintAborted)?;
                let token_id = last.checked_add(1).ok_or_else(|| {
                    PipelineError::MintAborted(LedgerError::Storage(format!(
                        "{collection} last_token_id {last} cannot be incremented"
                    )))
                })?;
                Some(FixedSupply { token_id, editions })
            }
        };

        let batch = build_mint_batch(collection, create, creator, supply);
        info!(
            collection,
            calls = batch.len(),
            token_id = supply.map(|s| s.token_id),
            "submitting mint batch"
        );

        let op = self
            .ledger
            .send(&batch)
            .await
            .map_err(PipelineError::MintAborted)?;
        self.ledger
            .confirm(&op, self.settings.confirmations)
            .await
            .map_err(|source| PipelineError::AmbiguousMintOutcome {
                op: op.clone(),
                source,
            })?;

        let token_id = match self.ledger.last_token_id(collection).await {
            Ok(id) => id,
            Err(e) => match supply {
                Some(supply) => {
                    warn!(op = %op, error = %e, "token id lookup failed, using predicted id");
                    supply.token_id
                }
                None => {
                    return Err(PipelineError::TokenLookup { op, source: e });
                }
            },
        };

        let token = TokenRef {
            contract: collection.to_string(),
            token_id,
        };
        info!(op = %op, token_id, "token minted");
        Ok(MintResult { op, token })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LedgerError;
    use crate::memory::{Faults, MemoryLedger};
    use onchmint_protocol::{ByteString, Entrypoint};

    const STORE: &str = "KT1store";
    const TOKENS: &str = "KT1tokens";
    const URI: &str = "onchfs://c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470";

    fn config(edition: Edition) -> MintConfig {
        MintConfig {
            name: "Piece".into(),
            description: "A piece".into(),
            edition,
            ..Default::default()
        }
    }

    fn create() -> CreateTokenParams {
        build_create_token_params(&config(Edition::Open), URI, "image/png", "tz1me").unwrap()
    }

    #[test]
    fn fixed_batch_has_create_mint_lock() {
        let batch = build_mint_batch(
            TOKENS,
            create(),
            "tz1me",
            Some(FixedSupply {
                token_id: 8,
                editions: 5,
            }),
        );
        assert_eq!(
            batch.entrypoints(),
            vec![Entrypoint::CreateToken, Entrypoint::Mint, Entrypoint::Lock]
        );
        let calls = batch.calls();
        assert_eq!(
            calls[1].params,
            CallParams::Mint {
                token_id: 8,
                mint_items: vec![MintItem {
                    amount: 5,
                    to: "tz1me".into()
                }],
            }
        );
        assert_eq!(
            calls[2].params,
            CallParams::Lock {
                token_id: 8,
                metadata: false,
                mint: true
            }
        );
        assert!(calls.iter().all(|c| c.destination == TOKENS));
    }

    #[test]
    fn open_batch_is_create_only() {
        let batch = build_mint_batch(TOKENS, create(), "tz1me", None);
        assert_eq!(batch.entrypoints(), vec![Entrypoint::CreateToken]);
    }

    #[tokio::test]
    async fn fixed_mint_predicts_and_reports_token() {
        let ledger = MemoryLedger::new("tz1me", STORE).with_collection(TOKENS);
        let settings = PipelineSettings::new(STORE);
        let orchestrator = MintOrchestrator::new(&ledger, &settings);

        let first = orchestrator
            .mint(TOKENS, &config(Edition::Fixed(5)), URI, "image/png")
            .await
            .unwrap();
        assert_eq!(first.token.token_id, 1);
        let second = orchestrator
            .mint(TOKENS, &config(Edition::Fixed(2)), URI, "image/png")
            .await
            .unwrap();
        assert_eq!(second.token.token_id, 2);

        let token = ledger.token(TOKENS, 1).unwrap();
        assert_eq!(token.supply, 5);
        assert!(token.mint_locked);
        assert_eq!(token.params.name, ByteString::from_text("Piece"));
    }

    #[tokio::test]
    async fn open_mint_skips_supply() {
        let ledger = MemoryLedger::new("tz1me", STORE).with_collection(TOKENS);
        let settings = PipelineSettings::new(STORE);
        let result = MintOrchestrator::new(&ledger, &settings)
            .mint(TOKENS, &config(Edition::Open), URI, "image/png")
            .await
            .unwrap();
        assert_eq!(result.token.token_id, 1);
        let token = ledger.token(TOKENS, 1).unwrap();
        assert_eq!(token.supply, 0);
        assert!(!token.mint_locked);
        assert_eq!(ledger.sent_batches()[0].len(), 1);
    }

    #[tokio::test]
    async fn missing_account_is_uninitialized() {
        let ledger = MemoryLedger::without_account(STORE).with_collection(TOKENS);
        let settings = PipelineSettings::new(STORE);
        let err = MintOrchestrator::new(&ledger, &settings)
            .mint(TOKENS, &config(Edition::Open), URI, "image/png")
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Uninitialized(_)));
    }

    #[tokio::test]
    async fn rejected_batch_is_clean_abort() {
        let ledger = MemoryLedger::new("tz1me", STORE)
            .with_collection(TOKENS)
            .with_faults(Faults {
                reject: Some(Entrypoint::Lock),
                ..Default::default()
            });
        let settings = PipelineSettings::new(STORE);
        let err = MintOrchestrator::new(&ledger, &settings)
            .mint(TOKENS, &config(Edition::Fixed(3)), URI, "image/png")
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::MintAborted(LedgerError::Rejected(_))));
        assert!(ledger.token(TOKENS, 1).is_none());
    }

    #[tokio::test]
    async fn unconfirmed_batch_is_ambiguous() {
        let ledger = MemoryLedger::new("tz1me", STORE)
            .with_collection(TOKENS)
            .with_faults(Faults {
                fail_confirm: Some(Entrypoint::CreateToken),
                ..Default::default()
            });
        let settings = PipelineSettings::new(STORE);
        let err = MintOrchestrator::new(&ledger, &settings)
            .mint(TOKENS, &config(Edition::Fixed(3)), URI, "image/png")
            .await
            .unwrap_err();
        assert!(err.is_ambiguous());
        assert!(matches!(err, PipelineError::AmbiguousMintOutcome { .. }));
    }

    #[tokio::test]
    async fn missing_token_storage_aborts_fixed_mint() {
        let ledger = MemoryLedger::new("tz1me", STORE);
        let settings = PipelineSettings::new(STORE);
        let err = MintOrchestrator::new(&ledger, &settings)
            .mint("KT1unknown", &config(Edition::Fixed(1)), URI, "image/png")
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::MintAborted(LedgerError::Storage(_))));
        assert!(ledger.sent_batches().is_empty());
    }

    #[tokio::test]
    async fn exhausted_token_ids_abort_fixed_mint() {
        let ledger = MemoryLedger::new("tz1me", STORE).with_collection_at(TOKENS, u64::MAX);
        let settings = PipelineSettings::new(STORE);
        let err = MintOrchestrator::new(&ledger, &settings)
            .mint(TOKENS, &config(Edition::Fixed(1)), URI, "image/png")
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::MintAborted(LedgerError::Storage(_))));
        assert!(ledger.sent_batches().is_empty());
    }

    #[tokio::test]
    async fn failed_requery_falls_back_to_predicted_id() {
        let ledger = MemoryLedger::new("tz1me", STORE)
            .with_collection(TOKENS)
            .with_faults(Faults {
                token_query_budget: Some(1),
                ..Default::default()
            });
        let settings = PipelineSettings::new(STORE);
        let result = MintOrchestrator::new(&ledger, &settings)
            .mint(TOKENS, &config(Edition::Fixed(1)), URI, "image/png")
            .await
            .unwrap();
        assert_eq!(result.token.token_id, 1);
    }

    #[tokio::test]
    async fn failed_requery_for_open_edition_reports_op() {
        let ledger = MemoryLedger::new("tz1me", STORE)
            .with_collection(TOKENS)
            .with_faults(Faults {
                token_query_budget: Some(0),
                ..Default::default()
            });
        let settings = PipelineSettings::new(STORE);
        let err = MintOrchestrator::new(&ledger, &settings)
            .mint(TOKENS, &config(Edition::Open), URI, "image/png")
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::TokenLookup { .. }));
        assert!(ledger.token(TOKENS, 1).is_some());
    }
}
