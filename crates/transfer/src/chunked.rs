use std::io::Read;
use std::path::Path;

use crate::types::Chunk;
use crate::{DEFAULT_CHUNK_SIZE, TransferError};

fn effective_chunk_size(chunk_size: usize) -> usize {
    if chunk_size == 0 {
        DEFAULT_CHUNK_SIZE
    } else {
        chunk_size
    }
}

// ---------------------------------------------------------------------------
// In-memory splitting
// ---------------------------------------------------------------------------

/// Splits `data` into ordered chunks of `chunk_size` bytes.
///
/// The last chunk holds the remainder; an empty input yields no chunks.
/// If `chunk_size` is 0, [`DEFAULT_CHUNK_SIZE`] is used.
pub fn split_chunks(data: &[u8], chunk_size: usize) -> Vec<Chunk> {
    let chunk_size = effective_chunk_size(chunk_size);
    data.chunks(chunk_size)
        .enumerate()
        .map(|(index, slice)| Chunk::new(index, (index * chunk_size) as u64, slice.to_vec()))
        .collect()
}

/// Reads a whole file and splits it into chunks.
pub fn read_chunks(path: &Path, chunk_size: usize) -> Result<Vec<Chunk>, TransferError> {
    let mut reader = ChunkReader::new(path, chunk_size)?;
    let mut chunks = Vec::with_capacity(reader.chunk_count());
    while let Some(chunk) = reader.next_chunk()? {
        chunks.push(chunk);
    }
    Ok(chunks)
}

// ---------------------------------------------------------------------------
// ChunkReader
// ---------------------------------------------------------------------------

/// Reads a file in fixed-size chunks, hashing each one.
pub struct ChunkReader {
    file: std::fs::File,
    chunk_size: usize,
    offset: u64,
    index: usize,
    file_size: u64,
}

impl ChunkReader {
    /// Opens `path` for chunked reading.
    ///
    /// If `chunk_size` is 0, [`DEFAULT_CHUNK_SIZE`] is used.
    pub fn new(path: &Path, chunk_size: usize) -> Result<Self, TransferError> {
        let file = std::fs::File::open(path)?;
        let file_size = file.metadata()?.len();
        Ok(Self {
            file,
            chunk_size: effective_chunk_size(chunk_size),
            offset: 0,
            index: 0,
            file_size,
        })
    }

    /// Reads the next chunk. Returns `None` once the whole file is consumed.
    ///
    /// A file that ends before its reported size is an error, never a
    /// silently short chunk.
    pub fn next_chunk(&mut self) -> Result<Option<Chunk>, TransferError> {
        let remaining = self.remaining();
        if remaining == 0 {
            return Ok(None);
        }

        let read_size = std::cmp::min(remaining, self.chunk_size as u64) as usize;
        let mut buf = vec![0u8; read_size];
        self.file.read_exact(&mut buf)?;

        let chunk = Chunk::new(self.index, self.offset, buf);
        self.offset += read_size as u64;
        self.index += 1;
        Ok(Some(chunk))
    }

    /// Current byte offset.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Total file size in bytes.
    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    /// Bytes remaining to read.
    pub fn remaining(&self) -> u64 {
        self.file_size.saturating_sub(self.offset)
    }

    /// Total number of chunks this reader produces.
    pub fn chunk_count(&self) -> usize {
        crate::types::chunk_count(self.file_size, self.chunk_size)
    }
}
