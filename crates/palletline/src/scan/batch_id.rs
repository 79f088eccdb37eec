//! Pallet batch id minting.

use super::error::{Result, ScanError};

/// Length of every pallet batch id.
pub const PALLET_BATCH_LEN: usize = 10;

const ALPHABET: &[u8; 36] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Give up after this many collisions; the id space is 36^10.
const MAX_ATTEMPTS: usize = 16;

/// Draws a random upper-case alphanumeric id of [`PALLET_BATCH_LEN`] characters.
pub fn random_batch_id() -> Result<String> {
    let mut id = String::with_capacity(PALLET_BATCH_LEN);
    let mut buf = [0u8; 32];
    while id.len() < PALLET_BATCH_LEN {
        getrandom::fill(&mut buf).map_err(|e| ScanError::Random(e.to_string()))?;
        // 252 = 7 * 36; bytes above it would bias the first symbols.
        for b in buf.iter().copied().filter(|b| *b < 252) {
            id.push(ALPHABET[(b % 36) as usize] as char);
            if id.len() == PALLET_BATCH_LEN {
                break;
            }
        }
    }
    Ok(id)
}

/// Draws ids until `is_taken` reports one as unused.
pub fn mint_unique<F>(mut is_taken: F) -> Result<String>
where
    F: FnMut(&str) -> Result<bool>,
{
    for _ in 0..MAX_ATTEMPTS {
        let id = random_batch_id()?;
        if !is_taken(&id)? {
            return Ok(id);
        }
        tracing::debug!(batch = %id, "pallet batch id collision, drawing again");
    }
    Err(ScanError::BatchIdExhausted(MAX_ATTEMPTS))
}

/// Whether `id` has the shape of a minted pallet batch id.
pub fn is_pallet_batch_id(id: &str) -> bool {
    id.len() == PALLET_BATCH_LEN && id.bytes().all(|b| b.is_ascii_alphanumeric())
}
