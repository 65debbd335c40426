//! SHA-224 and SHA-256 digests whose running state can be exported to an
//! opaque blob and resumed later, on either implementation variant.

mod compress;
pub mod state;

use std::fmt;

use common::{message, BoundsMessages, BufferView, CryptoError, ProviderConfig, Result, Service, Variant};
use tracing::debug;

use crate::compress::{compress, BLOCK_LEN};
use crate::state::Snapshot;

pub use crate::state::ENCODED_STATE_LEN;

/// Which member of the SHA-256 family a [`Sha2Digest`] computes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flavor {
    Sha224,
    Sha256,
}

impl Flavor {
    fn initial_state(self) -> [u32; 8] {
        match self {
            Flavor::Sha224 => [
                0xc1059ed8, 0x367cd507, 0x3070dd17, 0xf70e5939, 0xffc00b31, 0x68581511, 0x64f98fa7,
                0xbefa4fa4,
            ],
            Flavor::Sha256 => [
                0x6a09e667, 0xbb67ae85, 0x3c6ef372, 0xa54ff53a, 0x510e527f, 0x9b05688c, 0x1f83d9ab,
                0x5be0cd19,
            ],
        }
    }

    pub fn digest_size(self) -> usize {
        match self {
            Flavor::Sha224 => 28,
            Flavor::Sha256 => 32,
        }
    }

    /// Name without punctuation, e.g. `SHA224`.
    pub fn short_name(self) -> &'static str {
        match self {
            Flavor::Sha224 => "SHA224",
            Flavor::Sha256 => "SHA256",
        }
    }

    /// Standard algorithm name, e.g. `SHA-224`.
    pub fn algorithm_name(self) -> &'static str {
        match self {
            Flavor::Sha224 => "SHA-224",
            Flavor::Sha256 => "SHA-256",
        }
    }

    pub fn service(self) -> Service {
        match self {
            Flavor::Sha224 => Service::Sha224,
            Flavor::Sha256 => Service::Sha256,
        }
    }

    pub(crate) fn marker(self) -> &'static [u8; 4] {
        match self {
            Flavor::Sha224 => b"S224",
            Flavor::Sha256 => b"S256",
        }
    }

    pub(crate) fn invalid_state_message(self) -> &'static str {
        match self {
            Flavor::Sha224 => message::SHA224_STATE_INVALID,
            Flavor::Sha256 => message::SHA256_STATE_INVALID,
        }
    }
}

/// An incremental digest whose state can be saved and restored.
pub trait SavableDigest: Send {
    fn algorithm_name(&self) -> &'static str;

    fn digest_size(&self) -> usize;

    /// Internal block length in bytes.
    fn byte_length(&self) -> usize;

    fn update_byte(&mut self, b: u8);

    fn update(&mut self, data: &[u8]);

    /// Absorbs a bounds-checked region.
    ///
    /// # Errors
    ///
    /// [`CryptoError::InvalidBuffer`]: "input was null", "offset is negative",
    /// "len is negative" or "array too short for offset + len".
    fn update_range(&mut self, input: BufferView<'_>) -> Result<()> {
        let data = input.resolve(&BoundsMessages::DIGEST_INPUT)?;
        self.update(data);
        Ok(())
    }

    /// Writes the digest at `out[offset..]`, resets, and returns the digest size.
    ///
    /// # Errors
    ///
    /// [`CryptoError::InvalidBuffer`] when `offset` is negative or past the end,
    /// or the remaining space cannot hold the digest. The digest is not reset
    /// on error.
    fn do_final(&mut self, out: &mut [u8], offset: isize) -> Result<usize>;

    fn reset(&mut self);

    /// The running state as an opaque blob of [`ENCODED_STATE_LEN`] bytes.
    fn encoded_state(&self) -> Vec<u8>;
}

/// SHA-224 / SHA-256 with a selectable compression function.
///
/// `Clone` gives a fully independent copy that continues from the same point.
#[derive(Clone)]
pub struct Sha2Digest {
    flavor: Flavor,
    variant: Variant,
    state: [u32; 8],
    buffer: [u8; BLOCK_LEN],
    buffered: usize,
    byte_count: u64,
}

impl Sha2Digest {
    pub fn with_variant(flavor: Flavor, variant: Variant) -> Self {
        Self {
            flavor,
            variant,
            state: flavor.initial_state(),
            buffer: [0u8; BLOCK_LEN],
            buffered: 0,
            byte_count: 0,
        }
    }

    pub fn sha224(variant: Variant) -> Self {
        Self::with_variant(Flavor::Sha224, variant)
    }

    pub fn sha256(variant: Variant) -> Self {
        Self::with_variant(Flavor::Sha256, variant)
    }

    /// Builds the variant `config` selects for this flavor.
    pub fn new(flavor: Flavor, config: &ProviderConfig) -> Self {
        let variant = config.variant_for(flavor.service());
        debug!(service = %flavor.service(), variant = %variant, "digest selected");
        Self::with_variant(flavor, variant)
    }

    /// Resumes from a blob produced by [`SavableDigest::encoded_state`] on
    /// either variant.
    ///
    /// # Errors
    ///
    /// [`CryptoError::InvalidState`] when the blob is missing, too short at
    /// `offset`, or not a structurally valid state for `flavor`.
    pub fn from_encoded_state(
        flavor: Flavor,
        variant: Variant,
        blob: Option<&[u8]>,
        offset: usize,
    ) -> Result<Self> {
        let blob = blob.ok_or(CryptoError::InvalidState(message::INPUT_NULL))?;
        let snap = state::decode(flavor, blob, offset)?;
        let mut digest = Self {
            flavor,
            variant,
            state: snap.chain,
            buffer: snap.pending,
            buffered: snap.pending_len,
            byte_count: snap.byte_count,
        };
        if digest.buffered == BLOCK_LEN {
            digest.flush_block();
        }
        Ok(digest)
    }

    pub fn flavor(&self) -> Flavor {
        self.flavor
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// Total bytes absorbed since the last reset.
    pub fn byte_count(&self) -> u64 {
        self.byte_count
    }

    fn flush_block(&mut self) {
        compress(self.variant, &mut self.state, &self.buffer);
        self.buffered = 0;
    }

    fn finish_into(&mut self, out: &mut [u8]) {
        let bit_len = self.byte_count.wrapping_mul(8);

        self.buffer[self.buffered] = 0x80;
        self.buffer[self.buffered + 1..].fill(0);
        if self.buffered >= BLOCK_LEN - 8 {
            compress(self.variant, &mut self.state, &self.buffer);
            self.buffer.fill(0);
        }
        self.buffer[BLOCK_LEN - 8..].copy_from_slice(&bit_len.to_be_bytes());
        compress(self.variant, &mut self.state, &self.buffer);

        for (chunk, word) in out.chunks_exact_mut(4).zip(self.state) {
            chunk.copy_from_slice(&word.to_be_bytes());
        }
    }
}

impl SavableDigest for Sha2Digest {
    fn algorithm_name(&self) -> &'static str {
        self.flavor.algorithm_name()
    }

    fn digest_size(&self) -> usize {
        self.flavor.digest_size()
    }

    fn byte_length(&self) -> usize {
        BLOCK_LEN
    }

    fn update_byte(&mut self, b: u8) {
        self.buffer[self.buffered] = b;
        self.buffered += 1;
        self.byte_count = self.byte_count.wrapping_add(1);
        if self.buffered == BLOCK_LEN {
            self.flush_block();
        }
    }

    fn update(&mut self, mut data: &[u8]) {
        self.byte_count = self.byte_count.wrapping_add(data.len() as u64);

        if self.buffered > 0 {
            let take = data.len().min(BLOCK_LEN - self.buffered);
            self.buffer[self.buffered..self.buffered + take].copy_from_slice(&data[..take]);
            self.buffered += take;
            data = &data[take..];
            if self.buffered < BLOCK_LEN {
                return;
            }
            self.flush_block();
        }

        let mut blocks = data.chunks_exact(BLOCK_LEN);
        for block in blocks.by_ref() {
            self.buffer.copy_from_slice(block);
            compress(self.variant, &mut self.state, &self.buffer);
        }
        let rest = blocks.remainder();
        self.buffer[..rest.len()].copy_from_slice(rest);
        self.buffered = rest.len();
    }

    fn do_final(&mut self, out: &mut [u8], offset: isize) -> Result<usize> {
        let start = usize::try_from(offset)
            .map_err(|_| CryptoError::InvalidBuffer(message::DIGEST_OFFSET_NEGATIVE))?;
        if start > out.len() {
            return Err(CryptoError::InvalidBuffer(message::DIGEST_OFFSET_PAST_END));
        }
        let size = self.digest_size();
        if out.len() - start < size {
            return Err(CryptoError::InvalidBuffer(message::DIGEST_OUTPUT_SHORT));
        }

        let mut full = [0u8; 32];
        self.finish_into(&mut full);
        out[start..start + size].copy_from_slice(&full[..size]);
        self.reset();
        Ok(size)
    }

    fn reset(&mut self) {
        self.state = self.flavor.initial_state();
        self.buffer = [0u8; BLOCK_LEN];
        self.buffered = 0;
        self.byte_count = 0;
    }

    fn encoded_state(&self) -> Vec<u8> {
        state::encode(
            self.flavor,
            &Snapshot {
                chain: self.state,
                pending: self.buffer,
                pending_len: self.buffered,
                byte_count: self.byte_count,
            },
        )
    }
}

impl fmt::Display for Sha2Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.flavor.short_name(), self.variant)
    }
}

impl fmt::Debug for Sha2Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sha2Digest")
            .field("flavor", &self.flavor)
            .field("variant", &self.variant)
            .field("byte_count", &self.byte_count)
            .finish_non_exhaustive()
    }
}
