//! In-memory ledger simulator.
//!
//! Implements [`LedgerClient`] against a local model of the content-store
//! and token contracts. Digests and CIDs are recomputed on the ledger side,
//! so a client/ledger hashing mismatch shows up as a failed lookup exactly
//! as it would on a real node. Batches apply atomically.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use onchmint_protocol::constants::CHUNK_SIZE;
use onchmint_protocol::{
    CallParams, ContentHash, CreateTokenParams, Entrypoint, FileCid, LedgerCall, OperationHash,
    TransactionBatch,
};
use onchmint_transfer::{compose_cid, digest};
use tracing::debug;

use crate::error::{LedgerError, ViewError};
use crate::ledger::{LedgerClient, LedgerFuture};

/// Failures to inject into a [`MemoryLedger`].
#[derive(Debug, Clone, Default)]
pub struct Faults {
    /// Existence views fail at the transport level.
    pub view_transport: bool,
    /// Batches containing this entrypoint are rejected at submission.
    pub reject: Option<Entrypoint>,
    /// Batches containing this entrypoint are applied, but their
    /// confirmation wait fails.
    pub fail_confirm: Option<Entrypoint>,
    /// Number of `last_token_id` reads that succeed before the rest fail.
    pub token_query_budget: Option<usize>,
}

/// A stored file record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub chunk_pointers: Vec<ContentHash>,
    pub metadata: Vec<u8>,
}

/// State of one token in a collection.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenState {
    pub params: CreateTokenParams,
    pub creator: String,
    pub supply: u64,
    pub balances: HashMap<String, u64>,
    pub metadata_locked: bool,
    pub mint_locked: bool,
}

#[derive(Debug, Clone, Default)]
struct Collection {
    last_token_id: u64,
    tokens: HashMap<u64, TokenState>,
}

#[derive(Debug, Clone, Default)]
struct LedgerState {
    chunks: HashMap<ContentHash, Vec<u8>>,
    files: HashMap<FileCid, FileRecord>,
    collections: HashMap<String, Collection>,
    ops: HashMap<OperationHash, Vec<Entrypoint>>,
    sent: Vec<TransactionBatch>,
    op_counter: u64,
    token_queries: usize,
}

/// Deterministic in-process ledger.
pub struct MemoryLedger {
    account: Option<String>,
    content_store: String,
    max_chunk_size: usize,
    faults: Faults,
    state: Mutex<LedgerState>,
}

impl MemoryLedger {
    /// Creates a ledger with one content store and a signing account.
    pub fn new(account: impl Into<String>, content_store: impl Into<String>) -> Self {
        Self {
            account: Some(account.into()),
            content_store: content_store.into(),
            max_chunk_size: CHUNK_SIZE,
            faults: Faults::default(),
            state: Mutex::new(LedgerState::default()),
        }
    }

    /// Creates a ledger with no connected account.
    pub fn without_account(content_store: impl Into<String>) -> Self {
        Self {
            account: None,
            ..Self::new(String::new(), content_store)
        }
    }

    pub fn with_faults(mut self, faults: Faults) -> Self {
        self.faults = faults;
        self
    }

    pub fn with_collection(self, address: impl Into<String>) -> Self {
        self.add_collection(address);
        self
    }

    /// Adds a collection whose highest token id is already `last_token_id`.
    pub fn with_collection_at(self, address: impl Into<String>, last_token_id: u64) -> Self {
        self.state()
            .collections
            .entry(address.into())
            .or_default()
            .last_token_id = last_token_id;
        self
    }

    pub fn add_collection(&self, address: impl Into<String>) {
        self.state()
            .collections
            .entry(address.into())
            .or_default();
    }

    pub fn has_chunk(&self, hash: &ContentHash) -> bool {
        self.state().chunks.contains_key(hash)
    }

    pub fn chunk_total(&self) -> usize {
        self.state().chunks.len()
    }

    pub fn file(&self, cid: &FileCid) -> Option<FileRecord> {
        self.state().files.get(cid).cloned()
    }

    /// Reassembles a stored file's bytes from its chunk pointers.
    pub fn file_bytes(&self, cid: &FileCid) -> Option<Vec<u8>> {
        let state = self.state();
        let record = state.files.get(cid)?;
        let mut out = Vec::new();
        for pointer in &record.chunk_pointers {
            out.extend_from_slice(state.chunks.get(pointer)?);
        }
        Some(out)
    }

    pub fn token(&self, collection: &str, token_id: u64) -> Option<TokenState> {
        self.state()
            .collections
            .get(collection)?
            .tokens
            .get(&token_id)
            .cloned()
    }

    /// Every batch accepted for submission, in order.
    pub fn sent_batches(&self) -> Vec<TransactionBatch> {
        self.state().sent.clone()
    }

    /// Number of accepted batches that contain `entrypoint`.
    pub fn count_sent(&self, entrypoint: Entrypoint) -> usize {
        self.state()
            .sent
            .iter()
            .filter(|b| b.entrypoints().contains(&entrypoint))
            .count()
    }

    fn state(&self) -> MutexGuard<'_, LedgerState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn view_guard(&self, store: &str) -> Result<(), ViewError> {
        if self.faults.view_transport {
            return Err(ViewError::Transport("connection reset".into()));
        }
        if store != self.content_store {
            return Err(ViewError::Transport(format!("contract {store} not found")));
        }
        Ok(())
    }

    fn submit(&self, batch: &TransactionBatch) -> Result<OperationHash, LedgerError> {
        let entrypoints = batch.entrypoints();
        if let Some(ep) = self.faults.reject.filter(|ep| entrypoints.contains(ep)) {
            return Err(LedgerError::Rejected(format!("{ep} rejected by node")));
        }
        let source = self
            .account
            .clone()
            .ok_or_else(|| LedgerError::Rejected("no signing account".into()))?;

        let mut guard = self.state();
        let mut next = guard.clone();
        for call in batch.calls() {
            self.apply_call(&mut next, &source, call)?;
        }

        next.op_counter += 1;
        let op = OperationHash(format!("op{:04}", next.op_counter));
        next.ops.insert(op.clone(), entrypoints);
        next.sent.push(batch.clone());
        *guard = next;

        debug!(op = %op, calls = batch.len(), "batch applied");
        Ok(op)
    }

    fn apply_call(
        &self,
        state: &mut LedgerState,
        source: &str,
        call: &LedgerCall,
    ) -> Result<(), LedgerError> {
        if call.destination == self.content_store {
            return self.apply_store_call(state, &call.params);
        }
        let collection = state
            .collections
            .get_mut(&call.destination)
            .ok_or_else(|| LedgerError::Rejected(format!("unknown contract {}", call.destination)))?;
        apply_token_call(collection, source, &call.params)
    }

    fn apply_store_call(&self, state: &mut LedgerState, params: &CallParams) -> Result<(), LedgerError> {
        match params {
            CallParams::WriteChunk { bytes } => {
                if bytes.len() > self.max_chunk_size {
                    return Err(LedgerError::Rejected(format!(
                        "chunk of {} bytes exceeds {}",
                        bytes.len(),
                        self.max_chunk_size
                    )));
                }
                let hash = digest(bytes.as_slice());
                state
                    .chunks
                    .entry(hash)
                    .or_insert_with(|| bytes.as_slice().to_vec());
                Ok(())
            }
            CallParams::CreateFile {
                chunk_pointers,
                metadata,
            } => {
                let mut payloads = Vec::with_capacity(chunk_pointers.len());
                for pointer in chunk_pointers {
                    let data = state
                        .chunks
                        .get(pointer)
                        .ok_or_else(|| LedgerError::Rejected(format!("chunk {pointer} not found")))?;
                    payloads.push(data.as_slice());
                }
                let cid = compose_cid(&payloads, metadata.as_slice());
                if state.files.contains_key(&cid) {
                    return Err(LedgerError::Rejected(format!("file {cid} already exists")));
                }
                state.files.insert(
                    cid,
                    FileRecord {
                        chunk_pointers: chunk_pointers.clone(),
                        metadata: metadata.as_slice().to_vec(),
                    },
                );
                Ok(())
            }
            other => Err(LedgerError::Rejected(format!(
                "content store has no {} entrypoint",
                other.entrypoint()
            ))),
        }
    }
}

fn apply_token_call(
    collection: &mut Collection,
    source: &str,
    params: &CallParams,
) -> Result<(), LedgerError> {
    match params {
        CallParams::CreateToken(create) => {
            collection.last_token_id = collection
                .last_token_id
                .checked_add(1)
                .ok_or_else(|| LedgerError::Rejected("token id space exhausted".into()))?;
            collection.tokens.insert(
                collection.last_token_id,
                TokenState {
                    params: create.clone(),
                    creator: source.to_string(),
                    supply: 0,
                    balances: HashMap::new(),
                    metadata_locked: false,
                    mint_locked: false,
                },
            );
            Ok(())
        }
        CallParams::Mint {
            token_id,
            mint_items,
        } => {
            let token = token_mut(collection, *token_id)?;
            if token.mint_locked {
                return Err(LedgerError::Rejected(format!("token {token_id} mint is locked")));
            }
            for item in mint_items {
                token.supply += item.amount;
                *token.balances.entry(item.to.clone()).or_default() += item.amount;
            }
            Ok(())
        }
        CallParams::Lock {
            token_id,
            metadata,
            mint,
        } => {
            let token = token_mut(collection, *token_id)?;
            token.metadata_locked |= *metadata;
            token.mint_locked |= *mint;
            Ok(())
        }
        other => Err(LedgerError::Rejected(format!(
            "token contract has no {} entrypoint",
            other.entrypoint()
        ))),
    }
}

fn token_mut(collection: &mut Collection, token_id: u64) -> Result<&mut TokenState, LedgerError> {
    collection
        .tokens
        .get_mut(&token_id)
        .ok_or_else(|| LedgerError::Rejected(format!("token {token_id} undefined")))
}

impl LedgerClient for MemoryLedger {
    fn account(&self) -> Option<&str> {
        self.account.as_deref()
    }

    fn read_chunk<'a>(
        &'a self,
        store: &'a str,
        hash: &'a ContentHash,
    ) -> LedgerFuture<'a, Result<(), ViewError>> {
        Box::pin(async move {
            self.view_guard(store)?;
            if self.state().chunks.contains_key(hash) {
                Ok(())
            } else {
                Err(ViewError::Reverted("CHUNK_NOT_FOUND".into()))
            }
        })
    }

    fn read_file<'a>(
        &'a self,
        store: &'a str,
        cid: &'a FileCid,
    ) -> LedgerFuture<'a, Result<(), ViewError>> {
        Box::pin(async move {
            self.view_guard(store)?;
            if self.state().files.contains_key(cid) {
                Ok(())
            } else {
                Err(ViewError::Reverted("FILE_NOT_FOUND".into()))
            }
        })
    }

    fn last_token_id<'a>(&'a self, collection: &'a str) -> LedgerFuture<'a, Result<u64, LedgerError>> {
        Box::pin(async move {
            let mut state = self.state();
            state.token_queries += 1;
            if self
                .faults
                .token_query_budget
                .is_some_and(|budget| state.token_queries > budget)
            {
                return Err(LedgerError::Transport("storage read timed out".into()));
            }
            state
                .collections
                .get(collection)
                .map(|c| c.last_token_id)
                .ok_or_else(|| LedgerError::Storage(format!("{collection} has no last_token_id")))
        })
    }

    fn send<'a>(
        &'a self,
        batch: &'a TransactionBatch,
    ) -> LedgerFuture<'a, Result<OperationHash, LedgerError>> {
        Box::pin(async move { self.submit(batch) })
    }

    fn confirm<'a>(
        &'a self,
        op: &'a OperationHash,
        _confirmations: u32,
    ) -> LedgerFuture<'a, Result<(), LedgerError>> {
        Box::pin(async move {
            let state = self.state();
            let entrypoints = state
                .ops
                .get(op)
                .ok_or_else(|| LedgerError::Confirmation(format!("unknown operation {op}")))?;
            if self
                .faults
                .fail_confirm
                .is_some_and(|ep| entrypoints.contains(&ep))
            {
                return Err(LedgerError::Confirmation(format!("{op} not included")));
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use onchmint_protocol::{ByteString, MintItem};

    const STORE: &str = "KT1store";
    const TOKENS: &str = "KT1tokens";

    fn ledger() -> MemoryLedger {
        MemoryLedger::new("tz1me", STORE).with_collection(TOKENS)
    }

    fn write(bytes: &[u8]) -> LedgerCall {
        LedgerCall::new(
            STORE,
            CallParams::WriteChunk {
                bytes: ByteString::from(bytes),
            },
        )
    }

    fn create_params() -> CreateTokenParams {
        CreateTokenParams {
            name: ByteString::from_text("n"),
            description: ByteString::from_text("d"),
            artifact_uri: ByteString::from_text("onchfs://x"),
            creators: ByteString::from_text("[]"),
            royalties: ByteString::from_text("{}"),
            tags: None,
            attributes: None,
            formats: None,
            license: None,
        }
    }

    #[tokio::test]
    async fn chunk_keyed_by_ledger_side_digest() {
        let ledger = ledger();
        let op = ledger.send(&TransactionBatch::single(write(b"abc"))).await.unwrap();
        ledger.confirm(&op, 1).await.unwrap();

        let hash = digest(b"abc");
        assert!(ledger.read_chunk(STORE, &hash).await.is_ok());
        assert_eq!(
            ledger.read_chunk(STORE, &digest(b"abd")).await,
            Err(ViewError::Reverted("CHUNK_NOT_FOUND".into()))
        );
    }

    #[tokio::test]
    async fn oversized_chunk_rejected() {
        let ledger = ledger();
        let big = vec![0u8; CHUNK_SIZE + 1];
        let err = ledger.send(&TransactionBatch::single(write(&big))).await.unwrap_err();
        assert!(matches!(err, LedgerError::Rejected(_)));
        assert_eq!(ledger.chunk_total(), 0);
    }

    #[tokio::test]
    async fn create_file_recomputes_cid() {
        let ledger = ledger();
        let batch = TransactionBatch::new(vec![write(b"one"), write(b"two")]).unwrap();
        ledger.send(&batch).await.unwrap();

        let create = LedgerCall::new(
            STORE,
            CallParams::CreateFile {
                chunk_pointers: vec![digest(b"one"), digest(b"two")],
                metadata: ByteString::from(&b"hdr"[..]),
            },
        );
        ledger.send(&TransactionBatch::single(create)).await.unwrap();

        let cid = compose_cid(&[b"one".as_slice(), b"two".as_slice()], b"hdr");
        assert!(ledger.read_file(STORE, &cid).await.is_ok());
        assert_eq!(ledger.file_bytes(&cid).unwrap(), b"onetwo");
    }

    #[tokio::test]
    async fn create_file_with_missing_chunk_rejected() {
        let ledger = ledger();
        let create = LedgerCall::new(
            STORE,
            CallParams::CreateFile {
                chunk_pointers: vec![digest(b"missing")],
                metadata: ByteString::default(),
            },
        );
        let err = ledger.send(&TransactionBatch::single(create)).await.unwrap_err();
        assert!(matches!(err, LedgerError::Rejected(m) if m.contains("not found")));
    }

    #[tokio::test]
    async fn batch_is_atomic() {
        let ledger = ledger();
        let batch = TransactionBatch::new(vec![
            LedgerCall::new(TOKENS, CallParams::CreateToken(create_params())),
            LedgerCall::new(
                TOKENS,
                CallParams::Mint {
                    token_id: 99,
                    mint_items: vec![],
                },
            ),
        ])
        .unwrap();
        assert!(ledger.send(&batch).await.is_err());
        assert_eq!(ledger.last_token_id(TOKENS).await.unwrap(), 0);
        assert!(ledger.sent_batches().is_empty());
    }

    #[tokio::test]
    async fn mint_and_lock() {
        let ledger = ledger();
        let batch = TransactionBatch::new(vec![
            LedgerCall::new(TOKENS, CallParams::CreateToken(create_params())),
            LedgerCall::new(
                TOKENS,
                CallParams::Mint {
                    token_id: 1,
                    mint_items: vec![MintItem {
                        amount: 5,
                        to: "tz1me".into(),
                    }],
                },
            ),
            LedgerCall::new(
                TOKENS,
                CallParams::Lock {
                    token_id: 1,
                    metadata: false,
                    mint: true,
                },
            ),
        ])
        .unwrap();
        ledger.send(&batch).await.unwrap();

        let token = ledger.token(TOKENS, 1).unwrap();
        assert_eq!(token.supply, 5);
        assert_eq!(token.balances["tz1me"], 5);
        assert!(token.mint_locked);
        assert!(!token.metadata_locked);
        assert_eq!(token.creator, "tz1me");
    }

    #[tokio::test]
    async fn view_transport_fault() {
        let ledger = ledger().with_faults(Faults {
            view_transport: true,
            ..Default::default()
        });
        assert!(matches!(
            ledger.read_chunk(STORE, &digest(b"x")).await,
            Err(ViewError::Transport(_))
        ));
    }

    #[tokio::test]
    async fn confirm_fault_still_applies_batch() {
        let ledger = ledger().with_faults(Faults {
            fail_confirm: Some(Entrypoint::WriteChunk),
            ..Default::default()
        });
        let op = ledger.send(&TransactionBatch::single(write(b"x"))).await.unwrap();
        assert!(matches!(
            ledger.confirm(&op, 1).await,
            Err(LedgerError::Confirmation(_))
        ));
        assert!(ledger.has_chunk(&digest(b"x")));
    }

    #[tokio::test]
    async fn confirm_fault_targets_one_entrypoint() {
        let ledger = ledger().with_faults(Faults {
            fail_confirm: Some(Entrypoint::CreateFile),
            ..Default::default()
        });
        let op = ledger.send(&TransactionBatch::single(write(b"x"))).await.unwrap();
        assert!(ledger.confirm(&op, 1).await.is_ok());
    }

    #[tokio::test]
    async fn token_query_budget() {
        let ledger = ledger().with_faults(Faults {
            token_query_budget: Some(1),
            ..Default::default()
        });
        assert!(ledger.last_token_id(TOKENS).await.is_ok());
        assert!(matches!(
            ledger.last_token_id(TOKENS).await,
            Err(LedgerError::Transport(_))
        ));
    }

    #[tokio::test]
    async fn unknown_operation_fails_confirmation() {
        let ledger = ledger();
        assert!(ledger.confirm(&OperationHash("nope".into()), 1).await.is_err());
    }
}
