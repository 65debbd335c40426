//! Encoded digest state.
//!
//! Layout, all integers big-endian:
//!
//! | Offset | Len | Field |
//! |---|---|---|
//! | 0 | 4 | identity marker (`S224` / `S256`) |
//! | 4 | 32 | chaining value, 8 × u32 |
//! | 36 | 64 | pending block |
//! | 100 | 4 | pending length |
//! | 104 | 8 | total bytes absorbed |

use common::{message, CryptoError, Result};

use crate::compress::BLOCK_LEN;
use crate::Flavor;

/// Byte length of an encoded state.
pub const ENCODED_STATE_LEN: usize = 112;

const MARKER: usize = 0;
const CHAIN: usize = 4;
const PENDING: usize = CHAIN + 32;
const PENDING_LEN: usize = PENDING + BLOCK_LEN;
const COUNT: usize = PENDING_LEN + 4;

/// A decoded snapshot of a running digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Snapshot {
    pub chain: [u32; 8],
    pub pending: [u8; BLOCK_LEN],
    pub pending_len: usize,
    pub byte_count: u64,
}

pub(crate) fn encode(flavor: Flavor, snap: &Snapshot) -> Vec<u8> {
    let mut out = Vec::with_capacity(ENCODED_STATE_LEN);
    out.extend_from_slice(flavor.marker());
    for word in snap.chain {
        out.extend_from_slice(&word.to_be_bytes());
    }
    out.extend_from_slice(&snap.pending);
    out.extend_from_slice(&(snap.pending_len as u32).to_be_bytes());
    out.extend_from_slice(&snap.byte_count.to_be_bytes());
    out
}

fn be_u32(b: &[u8]) -> u32 {
    u32::from_be_bytes([b[0], b[1], b[2], b[3]])
}

fn be_u64(b: &[u8]) -> u64 {
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&b[..8]);
    u64::from_be_bytes(raw)
}

/// Decodes and structurally validates the state at `blob[offset..]`.
///
/// # Errors
///
/// [`CryptoError::InvalidState`] when the blob is too short at `offset`, the
/// marker is for another algorithm, the pending length exceeds one block, or
/// the byte count disagrees with the pending length.
pub(crate) fn decode(flavor: Flavor, blob: &[u8], offset: usize) -> Result<Snapshot> {
    let state = offset
        .checked_add(ENCODED_STATE_LEN)
        .and_then(|end| blob.get(offset..end))
        .ok_or(CryptoError::InvalidState(message::STATE_TOO_SHORT))?;
    let invalid = CryptoError::InvalidState(flavor.invalid_state_message());

    if &state[MARKER..CHAIN] != flavor.marker() {
        return Err(invalid);
    }

    let pending_len = be_u32(&state[PENDING_LEN..COUNT]) as usize;
    let byte_count = be_u64(&state[COUNT..]);
    if pending_len > BLOCK_LEN
        || byte_count < pending_len as u64
        || (byte_count - pending_len as u64) % BLOCK_LEN as u64 != 0
    {
        return Err(invalid);
    }

    let mut chain = [0u32; 8];
    for (word, bytes) in chain.iter_mut().zip(state[CHAIN..PENDING].chunks_exact(4)) {
        *word = be_u32(bytes);
    }
    let mut pending = [0u8; BLOCK_LEN];
    pending.copy_from_slice(&state[PENDING..PENDING_LEN]);

    Ok(Snapshot {
        chain,
        pending,
        pending_len,
        byte_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Snapshot {
        let mut pending = [0u8; BLOCK_LEN];
        pending[..3].copy_from_slice(b"abc");
        Snapshot {
            chain: [1, 2, 3, 4, 5, 6, 7, 8],
            pending,
            pending_len: 3,
            byte_count: 67,
        }
    }

    #[test]
    fn layout() {
        let blob = encode(Flavor::Sha224, &sample());
        assert_eq!(blob.len(), ENCODED_STATE_LEN);
        assert_eq!(&blob[..4], b"S224");
        assert_eq!(&blob[4..8], &[0, 0, 0, 1]);
        assert_eq!(&blob[36..39], b"abc");
        assert_eq!(&blob[100..104], &[0, 0, 0, 3]);
        assert_eq!(&blob[104..], &67u64.to_be_bytes());
    }

    #[test]
    fn decodes_at_offset() {
        let mut blob = vec![0xffu8; 5];
        blob.extend(encode(Flavor::Sha256, &sample()));
        assert_eq!(decode(Flavor::Sha256, &blob, 5).unwrap(), sample());
    }

    #[test]
    fn rejects_short_blob() {
        let blob = encode(Flavor::Sha224, &sample());
        assert_eq!(
            decode(Flavor::Sha224, &blob[..ENCODED_STATE_LEN - 2], 0).unwrap_err(),
            CryptoError::InvalidState(message::STATE_TOO_SHORT)
        );
        assert_eq!(
            decode(Flavor::Sha224, &blob, 1).unwrap_err().message(),
            "array at offset too short for encoded input"
        );
        assert!(decode(Flavor::Sha224, &blob, usize::MAX).is_err());
    }

    #[test]
    fn rejects_foreign_marker() {
        let blob = encode(Flavor::Sha256, &sample());
        assert_eq!(
            decode(Flavor::Sha224, &blob, 0).unwrap_err().message(),
            "invalid SHA224 encoded state"
        );
        assert_eq!(
            decode(Flavor::Sha256, &[0u8; ENCODED_STATE_LEN], 0).unwrap_err().message(),
            "invalid SHA256 encoded state"
        );
    }

    #[test]
    fn pending_length_bounds() {
        let mut snap = sample();
        snap.pending_len = BLOCK_LEN;
        snap.byte_count = BLOCK_LEN as u64;
        assert!(decode(Flavor::Sha224, &encode(Flavor::Sha224, &snap), 0).is_ok());

        snap.pending_len = BLOCK_LEN + 1;
        snap.byte_count = BLOCK_LEN as u64 + 1;
        assert_eq!(
            decode(Flavor::Sha224, &encode(Flavor::Sha224, &snap), 0)
                .unwrap_err()
                .message(),
            "invalid SHA224 encoded state"
        );
    }

    #[test]
    fn count_must_match_pending() {
        let mut snap = sample();
        snap.byte_count = 68;
        assert!(decode(Flavor::Sha224, &encode(Flavor::Sha224, &snap), 0).is_err());
        snap.byte_count = 2;
        assert!(decode(Flavor::Sha224, &encode(Flavor::Sha224, &snap), 0).is_err());
    }
}
