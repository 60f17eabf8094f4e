//! Media type → encoded metadata header lookup.

use std::collections::HashMap;
use std::path::Path;

/// Source of pre-encoded file metadata headers, keyed by exact media type.
pub trait HeaderMap: Send + Sync {
    fn header_for(&self, media_type: &str) -> Option<&[u8]>;
}

/// Error returned when a header table cannot be parsed.
#[derive(Debug, thiserror::Error)]
pub enum HeaderMapError {
    #[error("invalid header table: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid hex for media type {media_type:?}: {source}")]
    Hex {
        media_type: String,
        source: hex::FromHexError,
    },
}

/// In-memory header table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticHeaderMap {
    entries: HashMap<String, Vec<u8>>,
}

impl StaticHeaderMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, media_type: impl Into<String>, header: Vec<u8>) {
        self.entries.insert(media_type.into(), header);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parses a TOML table of `"media/type" = "<hex>"` entries.
    pub fn from_toml_str(s: &str) -> Result<Self, HeaderMapError> {
        let table: HashMap<String, String> = toml::from_str(s)?;
        let mut map = Self::new();
        for (media_type, encoded) in table {
            let digits = encoded.strip_prefix("0x").unwrap_or(&encoded);
            match hex::decode(digits) {
                Ok(bytes) => map.insert(media_type, bytes),
                Err(source) => return Err(HeaderMapError::Hex { media_type, source }),
            }
        }
        Ok(map)
    }
}

impl HeaderMap for StaticHeaderMap {
    fn header_for(&self, media_type: &str) -> Option<&[u8]> {
        self.entries.get(media_type).map(Vec::as_slice)
    }
}

/// Guesses the media type from a file extension.
pub fn detect_media_type(path: &Path) -> Option<&'static str> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());

    match ext.as_deref() {
        Some("png") => Some("image/png"),
        Some("jpg" | "jpeg") => Some("image/jpeg"),
        Some("webp") => Some("image/webp"),
        Some("gif") => Some("image/gif"),
        Some("svg") => Some("image/svg+xml"),
        Some("avif") => Some("image/avif"),
        Some("html" | "htm") => Some("text/html"),
        Some("js") => Some("application/javascript"),
        Some("json") => Some("application/json"),
        Some("txt") => Some("text/plain"),
        Some("mp3") => Some("audio/mpeg"),
        Some("wav") => Some("audio/wav"),
        Some("mp4") => Some("video/mp4"),
        Some("webm") => Some("video/webm"),
        Some("glb") => Some("model/gltf-binary"),
        Some("pdf") => Some("application/pdf"),
        _ => None,
    }
}
