//! Typed cipher parameters.

use common::{message, BufferView, CryptoError, Result};

use crate::request::{AlgorithmLimits, PacketRequest};

/// Key, nonce, optional associated text and an explicit MAC size.
#[derive(Clone, Copy)]
pub struct AeadParameters<'a> {
    pub key: &'a [u8],
    pub nonce: &'a [u8],
    pub associated_text: Option<&'a [u8]>,
    pub mac_size_bits: u32,
}

/// Key and nonce only; the algorithm's default MAC size applies.
#[derive(Clone, Copy)]
pub struct ParametersWithIv<'a> {
    pub key: &'a [u8],
    pub iv: &'a [u8],
}

#[derive(Clone, Copy)]
pub enum CipherParameters<'a> {
    Aead(AeadParameters<'a>),
    WithIv(ParametersWithIv<'a>),
}

impl<'a> CipherParameters<'a> {
    /// MAC size in bytes, checked against `limits`.
    ///
    /// # Errors
    ///
    /// "invalid mac size" when the bit count is not a whole number of bytes or
    /// is outside the algorithm's range.
    pub fn mac_size(&self, limits: &AlgorithmLimits) -> Result<usize> {
        match self {
            CipherParameters::Aead(p) => {
                if p.mac_size_bits % 8 != 0 {
                    return Err(CryptoError::InvalidParameter(message::INVALID_MAC_SIZE));
                }
                let bytes = (p.mac_size_bits / 8) as isize;
                if !(limits.mac_size_valid)(bytes) {
                    return Err(CryptoError::InvalidParameter(message::INVALID_MAC_SIZE));
                }
                Ok(bytes as usize)
            }
            CipherParameters::WithIv(_) => Ok(limits.default_mac_size),
        }
    }

    pub fn key(&self) -> &'a [u8] {
        match self {
            CipherParameters::Aead(p) => p.key,
            CipherParameters::WithIv(p) => p.key,
        }
    }

    pub fn nonce(&self) -> &'a [u8] {
        match self {
            CipherParameters::Aead(p) => p.nonce,
            CipherParameters::WithIv(p) => p.iv,
        }
    }

    pub fn associated_text(&self) -> Option<&'a [u8]> {
        match self {
            CipherParameters::Aead(p) => p.associated_text,
            CipherParameters::WithIv(_) => None,
        }
    }

    pub(crate) fn to_request(
        &self,
        encrypting: bool,
        mac_size: usize,
        input: BufferView<'a>,
    ) -> PacketRequest<'a> {
        PacketRequest::new(
            encrypting,
            self.key(),
            self.nonce(),
            self.associated_text(),
            mac_size,
            input,
        )
    }
}

impl std::fmt::Debug for CipherParameters<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Key bytes stay out of logs.
        match self {
            CipherParameters::Aead(p) => f
                .debug_struct("AeadParameters")
                .field("key_len", &p.key.len())
                .field("nonce_len", &p.nonce.len())
                .field("ad_len", &p.associated_text.map(<[u8]>::len))
                .field("mac_size_bits", &p.mac_size_bits)
                .finish(),
            CipherParameters::WithIv(p) => f
                .debug_struct("ParametersWithIv")
                .field("key_len", &p.key.len())
                .field("iv_len", &p.iv.len())
                .finish(),
        }
    }
}
