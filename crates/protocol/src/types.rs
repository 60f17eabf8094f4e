use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::constants::ARTIFACT_URI_SCHEME;

/// Width of every digest exchanged with the ledger, in bytes.
pub const HASH_LEN: usize = 32;

/// Error returned when parsing a hex-encoded value fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseHexError {
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error("expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("missing `onchfs://` prefix")]
    MissingScheme,
}

// ---------------------------------------------------------------------------
// ContentHash
// ---------------------------------------------------------------------------

/// A 256-bit content digest.
///
/// Displays and serializes as 64 lowercase hex characters. Parsing accepts an
/// optional `0x` prefix, which is how chunk pointers are spelled on-chain.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentHash([u8; HASH_LEN]);

impl ContentHash {
    pub const fn from_bytes(bytes: [u8; HASH_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; HASH_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({})", self.to_hex())
    }
}

impl AsRef<[u8]> for ContentHash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl FromStr for ContentHash {
    type Err = ParseHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s).map_err(|e| ParseHexError::InvalidHex(e.to_string()))?;
        let actual = bytes.len();
        let arr: [u8; HASH_LEN] = bytes.try_into().map_err(|_| ParseHexError::InvalidLength {
            expected: HASH_LEN,
            actual,
        })?;
        Ok(Self(arr))
    }
}

impl Serialize for ContentHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ContentHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// FileCid
// ---------------------------------------------------------------------------

/// Content identifier of a stored file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileCid(ContentHash);

impl FileCid {
    pub const fn new(hash: ContentHash) -> Self {
        Self(hash)
    }

    pub fn hash(&self) -> &ContentHash {
        &self.0
    }

    /// Returns the URI under which the file is addressable on-chain.
    pub fn artifact_uri(&self) -> String {
        format!("{ARTIFACT_URI_SCHEME}{}", self.0)
    }

    /// Parses an `onchfs://<cid>` URI.
    pub fn from_artifact_uri(uri: &str) -> Result<Self, ParseHexError> {
        let rest = uri
            .strip_prefix(ARTIFACT_URI_SCHEME)
            .ok_or(ParseHexError::MissingScheme)?;
        Ok(Self(rest.parse()?))
    }
}

impl fmt::Display for FileCid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for FileCid {
    type Err = ParseHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

// ---------------------------------------------------------------------------
// ByteString
// ---------------------------------------------------------------------------

/// Opaque bytes parameter; serialized as lowercase hex.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct ByteString(Vec<u8>);

impl ByteString {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// UTF-8 encoding of `s`, the way the token contract expects text fields.
    pub fn from_text(s: &str) -> Self {
        Self(s.as_bytes().to_vec())
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Decodes the bytes as UTF-8 text, if they are valid.
    pub fn as_text(&self) -> Option<&str> {
        std::str::from_utf8(&self.0).ok()
    }
}

impl fmt::Debug for ByteString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.len() <= 64 {
            write!(f, "ByteString(0x{})", hex::encode(&self.0))
        } else {
            write!(f, "ByteString({} bytes)", self.0.len())
        }
    }
}

impl From<Vec<u8>> for ByteString {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for ByteString {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl Serialize for ByteString {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(&self.0))
    }
}

impl<'de> Deserialize<'de> for ByteString {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let s = s.strip_prefix("0x").unwrap_or(&s);
        hex::decode(s).map(Self).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Operation / token references
// ---------------------------------------------------------------------------

/// Hash of a submitted ledger operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperationHash(pub String);

impl fmt::Display for OperationHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity of a minted token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRef {
    pub contract: String,
    pub token_id: u64,
}

impl TokenRef {
    /// Returns the marketplace page for this token under `base_url`.
    pub fn marketplace_url(&self, base_url: &str) -> String {
        format!(
            "{}/tokens/{}/{}",
            base_url.trim_end_matches('/'),
            self.contract,
            self.token_id
        )
    }
}
