//! Command implementations.

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use onchmint_pipeline::{
    AssetFile, HeaderMap, MemoryLedger, MintConfig, MintPipeline, PipelineEvent, StaticHeaderMap,
    UploadRequest, detect_media_type, parse_tags,
};
use onchmint_transfer::{compose_cid, estimate_storage_cost, read_chunks};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::config::Config;

pub const SIMULATED_ACCOUNT: &str = "tz1SimulatedCreatorAccount";

/// Collection used by `simulate` when none is configured.
const SIMULATED_COLLECTION: &str = "KT1SimulatedCollection";

pub struct SimulateArgs {
    pub file: PathBuf,
    pub mint: PathBuf,
    pub media_type: Option<String>,
    pub creator: String,
    pub collection: Option<String>,
    pub tags: Option<String>,
}

/// Loads the media type → header table named by the config.
pub fn load_headers(config: &Config) -> anyhow::Result<StaticHeaderMap> {
    let Some(path) = &config.headers_path else {
        warn!("no headers_path configured; every media type is unmapped");
        return Ok(StaticHeaderMap::new());
    };
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading header table {}", path.display()))?;
    let map = StaticHeaderMap::from_toml_str(&content)?;
    info!(path = %path.display(), entries = map.len(), "header table loaded");
    Ok(map)
}

fn resolve_media_type(file: &Path, explicit: Option<&str>) -> anyhow::Result<String> {
    if let Some(media_type) = explicit {
        return Ok(media_type.to_string());
    }
    match detect_media_type(file) {
        Some(media_type) => Ok(media_type.to_string()),
        None => bail!(
            "cannot detect the media type of {}; pass --media-type",
            file.display()
        ),
    }
}

/// Reads the token configuration; `tags`, if given, replaces its tag list.
fn load_mint(path: &Path, tags: Option<&str>) -> anyhow::Result<MintConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading mint config {}", path.display()))?;
    let mut mint: MintConfig = toml::from_str(&content)?;
    if let Some(tags) = tags {
        mint.tags = parse_tags(tags);
    }
    Ok(mint)
}

pub async fn inspect(config: &Config, file: &Path, media_type: Option<&str>) -> anyhow::Result<()> {
    let media_type = resolve_media_type(file, media_type)?;
    config.settings().validate()?;
    let path = file.to_path_buf();
    let chunk_size = config.chunk_size;
    let chunks = tokio::task::spawn_blocking(move || read_chunks(&path, chunk_size)).await??;
    let total: usize = chunks.iter().map(|c| c.size()).sum();

    println!("file:       {}", file.display());
    println!("media type: {media_type}");
    println!("size:       {total} bytes in {} chunks", chunks.len());
    for chunk in &chunks {
        println!(
            "  #{:<4} offset {:>10}  {:>6} bytes  {}",
            chunk.index,
            chunk.offset,
            chunk.size(),
            chunk.hash
        );
    }

    let headers = load_headers(config)?;
    match headers.header_for(&media_type) {
        Some(header) => {
            let cid = compose_cid(&chunks, header);
            println!("cid:        {cid}");
            println!("uri:        {}", cid.artifact_uri());
        }
        None => println!("cid:        unavailable (no header mapped for {media_type})"),
    }
    println!(
        "est. cost:  {} (storage, native unit)",
        estimate_storage_cost(total as u64)
    );
    Ok(())
}

pub async fn simulate(config: &Config, args: SimulateArgs) -> anyhow::Result<()> {
    let media_type = resolve_media_type(&args.file, args.media_type.as_deref())?;
    let mint = load_mint(&args.mint, args.tags.as_deref())?;

    let collection = args
        .collection
        .or_else(|| config.collection_address.clone())
        .unwrap_or_else(|| SIMULATED_COLLECTION.to_string());

    let headers = load_headers(config)?;
    let settings = config.settings();
    let ledger = MemoryLedger::new(args.creator, settings.content_store.clone())
        .with_collection(collection.clone());
    let pipeline = MintPipeline::new(Some(&ledger), &headers, settings);

    let request = UploadRequest {
        asset: AssetFile {
            path: args.file,
            media_type,
        },
        collection: Some(collection),
        mint,
    };

    let (tx, mut rx) = mpsc::channel(64);
    let printer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match event {
                PipelineEvent::Progress(p) => {
                    println!("[{:>5.1}%] {}", p.percentage(), p.message);
                }
                PipelineEvent::Completed(_) => println!("done"),
                PipelineEvent::Failed { error } => eprintln!("failed: {error}"),
            }
        }
    });

    let result = pipeline.run(&request, Some(&tx)).await;
    drop(tx);
    printer.await?;

    let receipt = result?;
    println!("{}", serde_json::to_string_pretty(&receipt)?);
    println!(
        "token:      {}",
        receipt.token.marketplace_url(&config.marketplace_url)
    );
    Ok(())
}
