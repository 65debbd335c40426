//! Portable AES-CCM (RFC 3610, NIST SP 800-38C).

use common::{message, BufferViewMut, CryptoError, Result, Variant};
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

use crate::block::{AesBlock, BLOCK_SIZE};
use crate::packet::PacketCipher;
use crate::request::{validate, AlgorithmLimits, PacketRequest};

/// Tag size used by IV-style parameters, in bytes.
pub const DEFAULT_MAC_SIZE: usize = 8;

/// Any tag of 4 to 16 bytes. Odd sizes are encoded in B0 as the next even
/// size down and the tag is truncated.
pub(crate) fn mac_size_valid(mac_size: isize) -> bool {
    (4..=16).contains(&mac_size)
}

pub static LIMITS: AlgorithmLimits = AlgorithmLimits {
    name: "AES-CCM",
    key_lengths: &[16, 24, 32],
    key_length_message: message::AES_KEY_LENGTH,
    nonce_min: 7,
    nonce_max: 13,
    nonce_length_message: message::CCM_NONCE_LENGTH,
    mac_size_valid,
    default_mac_size: DEFAULT_MAC_SIZE,
};

/// The message length must be expressible in the q = 15 - nonce length
/// bytes of the length field.
pub(crate) fn check_lengths(nonce_len: usize, data_len: usize) -> Result<()> {
    let q = 15 - nonce_len;
    if q < 8 && (data_len as u64) >> (8 * q) != 0 {
        return Err(CryptoError::LimitExceeded(message::CCM_DATA_TOO_LARGE));
    }
    Ok(())
}

/// AES-CCM implemented in this crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct PortableCcm;

impl PacketCipher for PortableCcm {
    fn limits(&self) -> &'static AlgorithmLimits {
        &LIMITS
    }

    fn variant(&self) -> Variant {
        Variant::Portable
    }

    fn process(&self, request: &PacketRequest<'_>, output: BufferViewMut<'_>) -> Result<usize> {
        let p = validate(&LIMITS, request, output)?;
        if p.encrypting {
            seal(p.key, p.nonce, p.ad, p.mac_size, p.input, p.output)
        } else {
            open(p.key, p.nonce, p.ad, p.mac_size, p.input, p.output)
        }
    }
}

struct CbcMac<'c> {
    cipher: &'c AesBlock,
    state: [u8; BLOCK_SIZE],
    pos: usize,
}

impl<'c> CbcMac<'c> {
    fn new(cipher: &'c AesBlock) -> Self {
        Self {
            cipher,
            state: [0u8; BLOCK_SIZE],
            pos: 0,
        }
    }

    fn update(&mut self, data: &[u8]) {
        for b in data {
            self.state[self.pos] ^= b;
            self.pos += 1;
            if self.pos == BLOCK_SIZE {
                self.cipher.encrypt_block(&mut self.state);
                self.pos = 0;
            }
        }
    }

    /// Zero pads to the block boundary.
    fn pad(&mut self) {
        if self.pos > 0 {
            self.cipher.encrypt_block(&mut self.state);
            self.pos = 0;
        }
    }

    fn finish(mut self) -> [u8; BLOCK_SIZE] {
        self.pad();
        self.state
    }
}

/// Writes `value` big-endian into the last `q` bytes of `block`.
fn put_be(block: &mut [u8; BLOCK_SIZE], q: usize, value: u64) {
    block[BLOCK_SIZE - q..].copy_from_slice(&value.to_be_bytes()[8 - q..]);
}

fn counter_block(nonce: &[u8], i: u64) -> [u8; BLOCK_SIZE] {
    let q = 15 - nonce.len();
    let mut a = [0u8; BLOCK_SIZE];
    a[0] = (q - 1) as u8;
    a[1..1 + nonce.len()].copy_from_slice(nonce);
    put_be(&mut a, q, i);
    a
}

fn compute_mac(
    cipher: &AesBlock,
    nonce: &[u8],
    ad: &[u8],
    msg: &[u8],
    mac_size: usize,
) -> [u8; BLOCK_SIZE] {
    let q = 15 - nonce.len();
    let mut b0 = [0u8; BLOCK_SIZE];
    b0[0] = (((mac_size - 2) / 2) as u8) << 3 | (q - 1) as u8;
    if !ad.is_empty() {
        b0[0] |= 0x40;
    }
    b0[1..1 + nonce.len()].copy_from_slice(nonce);
    put_be(&mut b0, q, msg.len() as u64);

    let mut mac = CbcMac::new(cipher);
    mac.update(&b0);
    if !ad.is_empty() {
        let len = ad.len() as u64;
        if len < 0xff00 {
            mac.update(&(len as u16).to_be_bytes());
        } else if len <= u64::from(u32::MAX) {
            mac.update(&[0xff, 0xfe]);
            mac.update(&(len as u32).to_be_bytes());
        } else {
            mac.update(&[0xff, 0xff]);
            mac.update(&len.to_be_bytes());
        }
        mac.update(ad);
        mac.pad();
    }
    mac.update(msg);
    mac.finish()
}

/// CTR over A_1, A_2, ...
fn apply_keystream(cipher: &AesBlock, nonce: &[u8], input: &[u8], output: &mut [u8]) {
    for (i, (src, dst)) in input
        .chunks(BLOCK_SIZE)
        .zip(output.chunks_mut(BLOCK_SIZE))
        .enumerate()
    {
        let mut keystream = counter_block(nonce, i as u64 + 1);
        cipher.encrypt_block(&mut keystream);
        for ((d, s), k) in dst.iter_mut().zip(src).zip(&keystream) {
            *d = s ^ k;
        }
    }
}

/// T xor S_0, truncated to the tag size.
fn mask_tag(cipher: &AesBlock, nonce: &[u8], mut mac: [u8; BLOCK_SIZE]) -> [u8; BLOCK_SIZE] {
    let mut s0 = counter_block(nonce, 0);
    cipher.encrypt_block(&mut s0);
    for (m, s) in mac.iter_mut().zip(&s0) {
        *m ^= s;
    }
    mac
}

pub(crate) fn seal(
    key: &[u8],
    nonce: &[u8],
    ad: &[u8],
    mac_size: usize,
    input: &[u8],
    output: &mut [u8],
) -> Result<usize> {
    check_lengths(nonce.len(), input.len())?;
    let cipher = AesBlock::new(key)?;
    let tag = mask_tag(&cipher, nonce, compute_mac(&cipher, nonce, ad, input, mac_size));

    let (body, rest) = output.split_at_mut(input.len());
    apply_keystream(&cipher, nonce, input, body);
    rest[..mac_size].copy_from_slice(&tag[..mac_size]);
    Ok(input.len() + mac_size)
}

pub(crate) fn open(
    key: &[u8],
    nonce: &[u8],
    ad: &[u8],
    mac_size: usize,
    input: &[u8],
    output: &mut [u8],
) -> Result<usize> {
    let body_len = input.len() - mac_size;
    check_lengths(nonce.len(), body_len)?;
    let (ciphertext, received) = input.split_at(body_len);
    let cipher = AesBlock::new(key)?;

    let body = &mut output[..body_len];
    apply_keystream(&cipher, nonce, ciphertext, body);
    let expected = mask_tag(&cipher, nonce, compute_mac(&cipher, nonce, ad, body, mac_size));

    if !bool::from(expected[..mac_size].ct_eq(received)) {
        body.zeroize();
        return Err(CryptoError::AuthenticationFailed);
    }
    Ok(body_len)
}
