//! Canonical error message catalogue.
//!
//! Callers and conformance tests match on these strings, so every
//! implementation variant must report exactly this text.

// ---------------------------------------------------------------------------
// Key
// ---------------------------------------------------------------------------

pub const KEY_NULL: &str = "key was null";
pub const KEY_ARRAY_SHORT: &str = "key array is less than keyLen";
pub const AES_KEY_LENGTH: &str = "key must be only 16, 24 or 32 bytes long";
pub const GCM_SIV_KEY_LENGTH: &str = "key must be only 16 or 32 bytes long";

// ---------------------------------------------------------------------------
// Nonce
// ---------------------------------------------------------------------------

pub const NONCE_NULL: &str = "nonce is null";
pub const NONCE_LEN_NEGATIVE: &str = "nonce len is negative";
pub const NONCE_PAST_END: &str = "nonce len past end of nonce array";
pub const CCM_NONCE_LENGTH: &str = "nonce must have length from 7 to 13 octets";
pub const GCM_SIV_NONCE_LENGTH: &str = "nonce must be 12 octets";
pub const CFB_IV_LENGTH: &str = "iv must be 16 bytes";

// ---------------------------------------------------------------------------
// Associated data and MAC
// ---------------------------------------------------------------------------

pub const AD_NULL: &str = "ad len non zero but ad array is null";
pub const AD_LEN_NEGATIVE: &str = "ad len is negative";
pub const AD_PAST_END: &str = "ad len past end of ad array";
pub const INVALID_MAC_SIZE: &str = "invalid mac size";
pub const MAC_CHECK_FAILED: &str = "mac check failed";

// ---------------------------------------------------------------------------
// Input / output buffers
// ---------------------------------------------------------------------------

pub const INPUT_NULL: &str = "input was null";
pub const INPUT_OFFSET_NEGATIVE: &str = "input offset is negative";
pub const INPUT_LEN_NEGATIVE: &str = "input len is negative";
pub const INPUT_RANGE: &str = "input buffer too short for offset + length";
pub const INPUT_DATA_SHORT: &str = "input data too short";
pub const OUTPUT_NULL: &str = "output was null";
pub const OUTPUT_OFFSET_NEGATIVE: &str = "output offset is negative";
pub const OUTPUT_LEN_NEGATIVE: &str = "output len is negative";
pub const OUTPUT_RANGE: &str = "output buffer too short for offset + length";
pub const OUTPUT_TOO_SHORT: &str = "output buffer too short";
pub const LEN_PARAMETER_INVALID: &str = "len parameter invalid";

// ---------------------------------------------------------------------------
// Length limits
// ---------------------------------------------------------------------------

pub const BYTE_COUNT_EXCEEDED: &str = "byte count exceeded";
pub const CCM_DATA_TOO_LARGE: &str = "CCM packet too large for choice of q.";

// ---------------------------------------------------------------------------
// Digests
// ---------------------------------------------------------------------------

pub const DIGEST_OFFSET_NEGATIVE: &str = "offset is negative";
pub const DIGEST_LEN_NEGATIVE: &str = "len is negative";
pub const DIGEST_INPUT_RANGE: &str = "array too short for offset + len";
pub const DIGEST_OFFSET_PAST_END: &str = "offset past end of array";
pub const DIGEST_OUTPUT_SHORT: &str = "array + offset too short for digest output";
pub const STATE_TOO_SHORT: &str = "array at offset too short for encoded input";
pub const SHA224_STATE_INVALID: &str = "invalid SHA224 encoded state";
pub const SHA256_STATE_INVALID: &str = "invalid SHA256 encoded state";
