use serde::{Deserialize, Serialize};

/// Size of a stored chunk in bytes (the last chunk of a file may be smaller).
pub const CHUNK_SIZE: usize = 32_000;

/// Ledger confirmations awaited after every write call.
pub const DEFAULT_CONFIRMATIONS: u32 = 1;

/// URI scheme under which stored files are addressable.
pub const ARTIFACT_URI_SCHEME: &str = "onchfs://";

/// Version byte prepended to the file CID preimage.
pub const CID_VERSION: u8 = 0x01;

/// Royalty shares are expressed with this many decimals (basis points at 4).
pub const ROYALTY_DECIMALS: u32 = 4;

/// License recorded when the creator does not pick one.
pub const DEFAULT_LICENSE: &str = "No License / All Rights Reserved";

/// Storage fee (in the ledger's native unit) charged per [`CHUNK_SIZE`] bytes.
pub const STORAGE_COST_PER_CHUNK: f64 = 8.06;

/// Contract entrypoint targeted by a ledger call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Entrypoint {
    // Content-store contract
    #[serde(rename = "write_chunk")]
    WriteChunk,
    #[serde(rename = "create_file")]
    CreateFile,

    // Token contract
    #[serde(rename = "create_token")]
    CreateToken,
    #[serde(rename = "mint")]
    Mint,
    #[serde(rename = "lock")]
    Lock,
}

impl Entrypoint {
    /// Returns the on-chain entrypoint name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WriteChunk => "write_chunk",
            Self::CreateFile => "create_file",
            Self::CreateToken => "create_token",
            Self::Mint => "mint",
            Self::Lock => "lock",
        }
    }
}

impl std::fmt::Display for Entrypoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
