//! POLYVAL computed through the GHASH-ordered 4K table multiplier.
//!
//! POLYVAL(H, X) = rev(GHASH(mulX(rev(H)), rev(X_1), ..., rev(X_n))), so every
//! block is byte-reversed on the way in and the accumulator is reversed on the
//! way out.

use zeroize::Zeroize;

use crate::block::BLOCK_SIZE;

const R: u64 = 0xe100_0000_0000_0000;

fn as_words(x: &[u8; BLOCK_SIZE]) -> [u64; 2] {
    let mut hi = [0u8; 8];
    let mut lo = [0u8; 8];
    hi.copy_from_slice(&x[..8]);
    lo.copy_from_slice(&x[8..]);
    [u64::from_be_bytes(hi), u64::from_be_bytes(lo)]
}

/// x · p^-1
fn divide_p(x: [u64; 2]) -> [u64; 2] {
    let [mut x0, x1] = x;
    let m = ((x0 as i64) >> 63) as u64;
    x0 ^= m & R;
    [(x0 << 1) | (x1 >> 63), (x1 << 1) | (m & 1)]
}

/// x · p^7
fn multiply_p7(x: [u64; 2]) -> [u64; 2] {
    let [x0, x1] = x;
    let c = x1 << 57;
    [
        (x0 >> 7) ^ c ^ (c >> 1) ^ (c >> 2) ^ (c >> 7),
        (x1 >> 7) | (x0 << 57),
    ]
}

/// Multiplies `value` by x in the byte-reversed domain.
pub(crate) fn mul_x(value: &mut [u8; BLOCK_SIZE]) {
    let mut mask = 0u8;
    for byte in value.iter_mut() {
        let v = *byte;
        *byte = ((v >> 1) & 0x7f) | mask;
        mask = if v & 1 == 0 { 0 } else { 0x80 };
    }
    if mask != 0 {
        value[0] ^= 0xe1;
    }
}

/// Copies `input` (at most one block) into `output` in reverse byte order,
/// leaving the remaining low bytes of `output` untouched.
pub(crate) fn fill_reverse(input: &[u8], output: &mut [u8; BLOCK_SIZE]) {
    for (i, b) in input.iter().enumerate() {
        output[BLOCK_SIZE - 1 - i] = *b;
    }
}

/// The 256-entry table of multiples of H, one entry per byte value.
pub(crate) struct MulTable([[u64; 2]; 256]);

impl MulTable {
    pub(crate) fn new(h: &[u8; BLOCK_SIZE]) -> Self {
        let mut t = [[0u64; 2]; 256];
        t[1] = multiply_p7(as_words(h));
        for n in (2..256).step_by(2) {
            t[n] = divide_p(t[n >> 1]);
            t[n + 1] = [t[n][0] ^ t[1][0], t[n][1] ^ t[1][1]];
        }
        Self(t)
    }

    /// x := x · H
    pub(crate) fn multiply(&self, x: &mut [u8; BLOCK_SIZE]) {
        let t = &self.0;
        let [mut z0, mut z1] = t[x[15] as usize];
        for i in (0..15).rev() {
            let [t0, t1] = t[x[i] as usize];
            let c = z1 << 56;
            z1 = t1 ^ ((z1 >> 8) | (z0 << 56));
            z0 = t0 ^ (z0 >> 8) ^ c ^ (c >> 1) ^ (c >> 2) ^ (c >> 7);
        }
        x[..8].copy_from_slice(&z0.to_be_bytes());
        x[8..].copy_from_slice(&z1.to_be_bytes());
    }
}

impl Drop for MulTable {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

/// A POLYVAL accumulator keyed by the per-nonce MAC key.
pub(crate) struct Polyval {
    table: MulTable,
    acc: [u8; BLOCK_SIZE],
}

impl Polyval {
    pub(crate) fn new(mac_key: &[u8; BLOCK_SIZE]) -> Self {
        let mut h = [0u8; BLOCK_SIZE];
        fill_reverse(mac_key, &mut h);
        mul_x(&mut h);
        let table = MulTable::new(&h);
        h.zeroize();
        Self {
            table,
            acc: [0u8; BLOCK_SIZE],
        }
    }

    /// Absorbs one block that is already in the reversed domain.
    fn absorb(&mut self, block: &[u8; BLOCK_SIZE]) {
        for (a, b) in self.acc.iter_mut().zip(block) {
            *a ^= b;
        }
        self.table.multiply(&mut self.acc);
    }

    /// Absorbs up to one block of message bytes, zero padded.
    fn absorb_reversed(&mut self, data: &[u8]) {
        let mut block = [0u8; BLOCK_SIZE];
        fill_reverse(data, &mut block);
        self.absorb(&block);
    }

    /// Absorbs the length block and returns the POLYVAL value.
    pub(crate) fn finish(mut self, ad_len: u64, msg_len: u64) -> [u8; BLOCK_SIZE] {
        let mut lengths = [0u8; BLOCK_SIZE];
        lengths[..8].copy_from_slice(&msg_len.wrapping_mul(8).to_be_bytes());
        lengths[8..].copy_from_slice(&ad_len.wrapping_mul(8).to_be_bytes());
        self.absorb(&lengths);
        self.value()
    }

    /// The current POLYVAL value, without any length block.
    pub(crate) fn value(&self) -> [u8; BLOCK_SIZE] {
        let mut out = [0u8; BLOCK_SIZE];
        fill_reverse(&self.acc, &mut out);
        out
    }
}

impl Drop for Polyval {
    fn drop(&mut self) {
        self.acc.zeroize();
    }
}

/// Feeds one input stream (associated data or message) into a [`Polyval`],
/// caching a partial block between updates.
#[derive(Default)]
pub(crate) struct BlockHasher {
    cache: [u8; BLOCK_SIZE],
    active: usize,
    hashed: u64,
}

impl BlockHasher {
    pub(crate) fn update(&mut self, polyval: &mut Polyval, mut data: &[u8]) {
        self.hashed += data.len() as u64;

        if self.active > 0 {
            let space = BLOCK_SIZE - self.active;
            if data.len() < space {
                self.cache[self.active..self.active + data.len()].copy_from_slice(data);
                self.active += data.len();
                return;
            }
            self.cache[self.active..].copy_from_slice(&data[..space]);
            polyval.absorb_reversed(&self.cache);
            self.active = 0;
            data = &data[space..];
        }

        let mut blocks = data.chunks_exact(BLOCK_SIZE);
        for block in blocks.by_ref() {
            polyval.absorb_reversed(block);
        }
        let rest = blocks.remainder();
        self.cache[..rest.len()].copy_from_slice(rest);
        self.active = rest.len();
    }

    /// Absorbs any cached partial block. Call once, after the last update.
    pub(crate) fn complete(&mut self, polyval: &mut Polyval) {
        if self.active > 0 {
            polyval.absorb_reversed(&self.cache[..self.active]);
            self.active = 0;
        }
        self.cache.zeroize();
    }

    /// Total bytes passed to [`BlockHasher::update`].
    pub(crate) fn hashed(&self) -> u64 {
        self.hashed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(hex_str: &str) -> [u8; BLOCK_SIZE] {
        let mut b = [0u8; BLOCK_SIZE];
        b.copy_from_slice(&hex::decode(hex_str).unwrap());
        b
    }

    #[test]
    fn table_multiply_by_one_is_identity() {
        let h = block("66e94bd4ef8a2c3b884cfa59ca342b2e");
        let table = MulTable::new(&h);
        let mut one = [0u8; BLOCK_SIZE];
        one[0] = 0x80;
        table.multiply(&mut one);
        assert_eq!(one, h);
    }

    #[test]
    fn mul_x_reduces() {
        let mut v = [0u8; BLOCK_SIZE];
        v[15] = 1;
        mul_x(&mut v);
        let mut expected = [0u8; BLOCK_SIZE];
        expected[0] = 0xe1;
        assert_eq!(v, expected);

        let mut v = [0u8; BLOCK_SIZE];
        v[0] = 0x02;
        mul_x(&mut v);
        assert_eq!(v[0], 0x01);
    }

    #[test]
    fn rfc8452_appendix_a() {
        let h = block("25629347589242761d31f826ba4b757b");
        let x = hex::decode(
            "4f4f95668c83dfb6401762bb2d01a262d1a24ddd2721d006bbe45f20d3c9f362",
        )
        .unwrap();
        let mut polyval = Polyval::new(&h);
        let mut hasher = BlockHasher::default();
        hasher.update(&mut polyval, &x);
        hasher.complete(&mut polyval);
        assert_eq!(
            hex::encode(polyval.value()),
            "f7a3b47b846119fae5b7866cf5e5b77e"
        );
    }

    #[test]
    fn split_updates_match_single_update() {
        let key = block("000102030405060708090a0b0c0d0e0f");
        let data: Vec<u8> = (0u8..=70).collect();

        let mut whole = Polyval::new(&key);
        let mut hasher = BlockHasher::default();
        hasher.update(&mut whole, &data);
        hasher.complete(&mut whole);
        let expected = whole.finish(0, data.len() as u64);

        for split in [1usize, 5, 15, 16, 17, 31, 33, 70] {
            let mut parts = Polyval::new(&key);
            let mut hasher = BlockHasher::default();
            let (a, b) = data.split_at(split);
            hasher.update(&mut parts, a);
            hasher.update(&mut parts, &b[..b.len() / 2]);
            hasher.update(&mut parts, &b[b.len() / 2..]);
            hasher.complete(&mut parts);
            assert_eq!(hasher.hashed(), data.len() as u64);
            assert_eq!(parts.finish(0, data.len() as u64), expected, "split at {split}");
        }
    }
}
