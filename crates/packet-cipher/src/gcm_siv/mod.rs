//! Portable AES-GCM-SIV (RFC 8452).
//!
//! Every call derives a fresh MAC key and encryption key from the master key
//! and nonce, builds its own POLYVAL table and throws all of it away on return.

mod polyval;

use common::{message, BufferViewMut, CryptoError, Result, Variant};
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, Zeroizing};

use crate::block::{AesBlock, BLOCK_SIZE};
use crate::packet::PacketCipher;
use crate::request::{validate, AlgorithmLimits, PacketRequest};

use self::polyval::{BlockHasher, Polyval};

/// Byte length of a GCM-SIV nonce.
pub const NONCE_LEN: usize = 12;

/// Byte length of a GCM-SIV tag.
pub const TAG_LEN: usize = 16;

/// Largest associated data or plaintext accepted, in bytes (2^36).
pub const MAX_DATA_LEN: u64 = 1 << 36;

/// Full tags only. The CTR initial counter is the whole tag, so a truncated
/// tag could not be opened.
fn mac_size_valid(mac_size: isize) -> bool {
    mac_size == TAG_LEN as isize
}

pub static LIMITS: AlgorithmLimits = AlgorithmLimits {
    name: "AES-GCM-SIV",
    key_lengths: &[16, 32],
    key_length_message: message::GCM_SIV_KEY_LENGTH,
    nonce_min: NONCE_LEN as isize,
    nonce_max: NONCE_LEN as isize,
    nonce_length_message: message::GCM_SIV_NONCE_LENGTH,
    mac_size_valid,
    default_mac_size: TAG_LEN,
};

/// Rejects associated data or message lengths above [`MAX_DATA_LEN`].
pub(crate) fn check_lengths(ad_len: usize, data_len: usize) -> Result<()> {
    if ad_len as u64 > MAX_DATA_LEN || data_len as u64 > MAX_DATA_LEN {
        return Err(CryptoError::LimitExceeded(message::BYTE_COUNT_EXCEEDED));
    }
    Ok(())
}

/// AES-GCM-SIV implemented in this crate on the table POLYVAL.
#[derive(Debug, Clone, Copy, Default)]
pub struct PortableGcmSiv;

impl PacketCipher for PortableGcmSiv {
    fn limits(&self) -> &'static AlgorithmLimits {
        &LIMITS
    }

    fn variant(&self) -> Variant {
        Variant::Portable
    }

    fn process(&self, request: &PacketRequest<'_>, output: BufferViewMut<'_>) -> Result<usize> {
        let packet = validate(&LIMITS, request, output)?;
        if packet.encrypting {
            seal(packet.key, packet.nonce, packet.ad, packet.input, packet.output)
        } else {
            open(packet.key, packet.nonce, packet.ad, packet.input, packet.output)
        }
    }
}

/// Per-nonce key material.
struct DerivedKeys {
    mac_key: Zeroizing<[u8; BLOCK_SIZE]>,
    cipher: AesBlock,
}

/// Encrypts LE32(i) || nonce under the master key for i = 0.. and keeps the
/// first half of each block: two halves of MAC key, then the encryption key.
fn derive_keys(key: &[u8], nonce: &[u8]) -> Result<DerivedKeys> {
    let master = AesBlock::new(key)?;
    let mut template = [0u8; BLOCK_SIZE];
    template[4..].copy_from_slice(nonce);

    let halves = 2 + key.len() / 8;
    let mut derived = Zeroizing::new([0u8; 48]);
    for (i, half) in derived.chunks_exact_mut(8).take(halves).enumerate() {
        let mut block = template;
        block[..4].copy_from_slice(&(i as u32).to_le_bytes());
        master.encrypt_block(&mut block);
        half.copy_from_slice(&block[..8]);
        block.zeroize();
    }

    let mut mac_key = Zeroizing::new([0u8; BLOCK_SIZE]);
    mac_key.copy_from_slice(&derived[..BLOCK_SIZE]);
    let cipher = AesBlock::new(&derived[BLOCK_SIZE..BLOCK_SIZE + key.len()])?;
    Ok(DerivedKeys { mac_key, cipher })
}

fn compute_tag(
    cipher: &AesBlock,
    polyval: Polyval,
    nonce: &[u8],
    ad_len: u64,
    msg_len: u64,
) -> [u8; TAG_LEN] {
    let mut tag = polyval.finish(ad_len, msg_len);
    for (t, n) in tag.iter_mut().zip(nonce) {
        *t ^= n;
    }
    tag[15] &= 0x7f;
    cipher.encrypt_block(&mut tag);
    tag
}

fn increment_counter(counter: &mut [u8; BLOCK_SIZE]) {
    let n = u32::from_le_bytes([counter[0], counter[1], counter[2], counter[3]]).wrapping_add(1);
    counter[..4].copy_from_slice(&n.to_le_bytes());
}

/// XORs the CTR keystream seeded by `tag` into `output`, handing every
/// produced chunk to `on_chunk`.
fn apply_keystream(
    cipher: &AesBlock,
    tag: &[u8],
    input: &[u8],
    output: &mut [u8],
    mut on_chunk: impl FnMut(&[u8]),
) {
    let mut counter = [0u8; BLOCK_SIZE];
    counter.copy_from_slice(tag);
    counter[15] |= 0x80;

    for (src, dst) in input.chunks(BLOCK_SIZE).zip(output.chunks_mut(BLOCK_SIZE)) {
        let mut keystream = counter;
        cipher.encrypt_block(&mut keystream);
        for ((d, s), k) in dst.iter_mut().zip(src).zip(&keystream) {
            *d = s ^ k;
        }
        on_chunk(dst);
        increment_counter(&mut counter);
    }
}

fn hash_ad(polyval: &mut Polyval, ad: &[u8]) -> u64 {
    let mut hasher = BlockHasher::default();
    hasher.update(polyval, ad);
    hasher.complete(polyval);
    hasher.hashed()
}

fn seal(key: &[u8], nonce: &[u8], ad: &[u8], input: &[u8], output: &mut [u8]) -> Result<usize> {
    check_lengths(ad.len(), input.len())?;
    let keys = derive_keys(key, nonce)?;

    let mut polyval = Polyval::new(&keys.mac_key);
    let ad_len = hash_ad(&mut polyval, ad);
    let mut data = BlockHasher::default();
    data.update(&mut polyval, input);
    data.complete(&mut polyval);
    let tag = compute_tag(&keys.cipher, polyval, nonce, ad_len, data.hashed());

    let (body, rest) = output.split_at_mut(input.len());
    apply_keystream(&keys.cipher, &tag, input, body, |_| {});
    rest[..TAG_LEN].copy_from_slice(&tag);
    Ok(input.len() + TAG_LEN)
}

fn open(key: &[u8], nonce: &[u8], ad: &[u8], input: &[u8], output: &mut [u8]) -> Result<usize> {
    let body_len = input.len() - TAG_LEN;
    check_lengths(ad.len(), body_len)?;
    let (ciphertext, received) = input.split_at(body_len);
    let keys = derive_keys(key, nonce)?;

    let mut polyval = Polyval::new(&keys.mac_key);
    let ad_len = hash_ad(&mut polyval, ad);
    let mut data = BlockHasher::default();
    let body = &mut output[..body_len];
    apply_keystream(&keys.cipher, received, ciphertext, body, |chunk| {
        data.update(&mut polyval, chunk)
    });
    data.complete(&mut polyval);
    let expected = compute_tag(&keys.cipher, polyval, nonce, ad_len, data.hashed());

    if !bool::from(expected[..].ct_eq(received)) {
        body.zeroize();
        return Err(CryptoError::AuthenticationFailed);
    }
    Ok(body_len)
}
