use onchmint_protocol::ContentHash;

use crate::hash::digest;

/// An ordered slice of a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Zero-based position within the file.
    pub index: usize,
    /// Byte offset within the file.
    pub offset: u64,
    /// Raw chunk data.
    pub data: Vec<u8>,
    /// Content digest of `data`, computed once at construction.
    pub hash: ContentHash,
}

impl Chunk {
    /// Builds a chunk and hashes its payload.
    pub fn new(index: usize, offset: u64, data: Vec<u8>) -> Self {
        let hash = digest(&data);
        Self {
            index,
            offset,
            data,
            hash,
        }
    }

    /// Size of this chunk in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

impl AsRef<[u8]> for Chunk {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

/// Number of chunks a file of `file_len` bytes splits into.
pub fn chunk_count(file_len: u64, chunk_size: usize) -> usize {
    if chunk_size == 0 {
        return 0;
    }
    file_len.div_ceil(chunk_size as u64) as usize
}
