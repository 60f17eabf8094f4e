use onchmint_protocol::constants::{CHUNK_SIZE, STORAGE_COST_PER_CHUNK};

/// Estimated storage fee, in the ledger's native unit, for `file_len` bytes.
///
/// Linear in size and rounded to 6 decimals (the unit's smallest fraction).
/// This ignores deduplication: chunks already on the ledger cost nothing.
pub fn estimate_storage_cost(file_len: u64) -> f64 {
    let per_byte = STORAGE_COST_PER_CHUNK / CHUNK_SIZE as f64;
    let raw = file_len as f64 * per_byte;
    (raw * 1_000_000.0).round() / 1_000_000.0
}
