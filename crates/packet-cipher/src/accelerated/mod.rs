//! Accelerated variants backed by the RustCrypto AEAD and block mode crates.
//!
//! `aes-gcm-siv`, `ccm` and `cfb-mode` dispatch to AES-NI / CLMUL (or the ARMv8 crypto
//! extensions) at runtime. Validation and length limits run through the same
//! code as the portable variants before either crate is called.

mod ccm;
mod cfb;
mod gcm_siv;

pub(crate) use self::cfb::cfb_core;
pub use self::ccm::AcceleratedCcm;
pub use self::gcm_siv::AcceleratedGcmSiv;

use aes_gcm_siv::aead::generic_array::{typenum::Unsigned, GenericArray};
use aes_gcm_siv::aead::{AeadCore, AeadInPlace, KeyInit};
use common::{CryptoError, Result};
use zeroize::Zeroize;

use crate::request::AlgorithmLimits;

/// A seal or open routine for one concrete AEAD type.
pub(crate) type AeadOp =
    fn(&AlgorithmLimits, &[u8], &[u8], &[u8], &[u8], &mut [u8]) -> Result<usize>;

/// Picks the direction for `A`.
pub(crate) fn op<A: AeadInPlace + KeyInit>(encrypting: bool) -> AeadOp {
    if encrypting {
        seal_detached::<A>
    } else {
        open_detached::<A>
    }
}

fn build<A: KeyInit>(limits: &AlgorithmLimits, key: &[u8]) -> Result<A> {
    A::new_from_slice(key).map_err(|_| CryptoError::InvalidParameter(limits.key_length_message))
}

fn nonce_of<'n, A: AeadCore>(
    limits: &AlgorithmLimits,
    nonce: &'n [u8],
) -> Result<&'n GenericArray<u8, A::NonceSize>> {
    if nonce.len() != A::NonceSize::USIZE {
        return Err(CryptoError::InvalidParameter(limits.nonce_length_message));
    }
    Ok(GenericArray::from_slice(nonce))
}

/// Writes `ciphertext || tag` at the start of `output`.
pub(crate) fn seal_detached<A: AeadInPlace + KeyInit>(
    limits: &AlgorithmLimits,
    key: &[u8],
    nonce: &[u8],
    ad: &[u8],
    input: &[u8],
    output: &mut [u8],
) -> Result<usize> {
    let cipher = build::<A>(limits, key)?;
    let nonce = nonce_of::<A>(limits, nonce)?;
    let tag_len = A::TagSize::USIZE;

    let (body, rest) = output.split_at_mut(input.len());
    body.copy_from_slice(input);
    match cipher.encrypt_in_place_detached(nonce, ad, body) {
        Ok(tag) => {
            rest[..tag_len].copy_from_slice(&tag);
            Ok(input.len() + tag_len)
        }
        Err(_) => {
            body.zeroize();
            Err(CryptoError::LimitExceeded(common::message::BYTE_COUNT_EXCEEDED))
        }
    }
}

/// Writes the plaintext at the start of `output`, wiping it if the tag does
/// not verify.
pub(crate) fn open_detached<A: AeadInPlace + KeyInit>(
    limits: &AlgorithmLimits,
    key: &[u8],
    nonce: &[u8],
    ad: &[u8],
    input: &[u8],
    output: &mut [u8],
) -> Result<usize> {
    let cipher = build::<A>(limits, key)?;
    let nonce = nonce_of::<A>(limits, nonce)?;
    let body_len = input.len() - A::TagSize::USIZE;
    let (ciphertext, tag) = input.split_at(body_len);

    let body = &mut output[..body_len];
    body.copy_from_slice(ciphertext);
    match cipher.decrypt_in_place_detached(nonce, ad, body, GenericArray::from_slice(tag)) {
        Ok(()) => Ok(body_len),
        Err(_) => {
            body.zeroize();
            Err(CryptoError::AuthenticationFailed)
        }
    }
}
