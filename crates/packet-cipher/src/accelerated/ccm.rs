use aes::{Aes128, Aes192, Aes256};
use aes_gcm_siv::aead::consts::{U10, U11, U12, U13, U14, U16, U4, U6, U7, U8, U9};
use ccm::Ccm;
use common::{message, BufferViewMut, CryptoError, Result, Variant};

use super::{op, AeadOp};
use crate::ccm::{self as portable, check_lengths, LIMITS};
use crate::packet::PacketCipher;
use crate::request::{validate, AlgorithmLimits, PacketRequest};

// `Ccm` fixes key size, tag size and nonce size in the type, so the runtime
// values pick one of the monomorphised instances. The crate only has even tag
// sizes; odd ones go through the portable core.

macro_rules! with_nonce {
    ($cipher:ty, $tag:ty, $nonce_len:expr, $encrypting:expr) => {
        match $nonce_len {
            7 => Ok(op::<Ccm<$cipher, $tag, U7>>($encrypting)),
            8 => Ok(op::<Ccm<$cipher, $tag, U8>>($encrypting)),
            9 => Ok(op::<Ccm<$cipher, $tag, U9>>($encrypting)),
            10 => Ok(op::<Ccm<$cipher, $tag, U10>>($encrypting)),
            11 => Ok(op::<Ccm<$cipher, $tag, U11>>($encrypting)),
            12 => Ok(op::<Ccm<$cipher, $tag, U12>>($encrypting)),
            13 => Ok(op::<Ccm<$cipher, $tag, U13>>($encrypting)),
            _ => Err(CryptoError::InvalidParameter(message::CCM_NONCE_LENGTH)),
        }
    };
}

macro_rules! with_tag {
    ($cipher:ty, $mac_size:expr, $nonce_len:expr, $encrypting:expr) => {
        match $mac_size {
            4 => with_nonce!($cipher, U4, $nonce_len, $encrypting),
            6 => with_nonce!($cipher, U6, $nonce_len, $encrypting),
            8 => with_nonce!($cipher, U8, $nonce_len, $encrypting),
            10 => with_nonce!($cipher, U10, $nonce_len, $encrypting),
            12 => with_nonce!($cipher, U12, $nonce_len, $encrypting),
            14 => with_nonce!($cipher, U14, $nonce_len, $encrypting),
            16 => with_nonce!($cipher, U16, $nonce_len, $encrypting),
            _ => Err(CryptoError::InvalidParameter(message::INVALID_MAC_SIZE)),
        }
    };
}

fn select(key_len: usize, mac_size: usize, nonce_len: usize, encrypting: bool) -> Result<AeadOp> {
    match key_len {
        16 => with_tag!(Aes128, mac_size, nonce_len, encrypting),
        24 => with_tag!(Aes192, mac_size, nonce_len, encrypting),
        32 => with_tag!(Aes256, mac_size, nonce_len, encrypting),
        _ => Err(CryptoError::InvalidParameter(message::AES_KEY_LENGTH)),
    }
}

/// AES-CCM through the `ccm` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceleratedCcm;

impl PacketCipher for AcceleratedCcm {
    fn limits(&self) -> &'static AlgorithmLimits {
        &LIMITS
    }

    fn variant(&self) -> Variant {
        Variant::Accelerated
    }

    fn process(&self, request: &PacketRequest<'_>, output: BufferViewMut<'_>) -> Result<usize> {
        let p = validate(&LIMITS, request, output)?;
        let data_len = if p.encrypting {
            p.input.len()
        } else {
            p.input.len() - p.mac_size
        };
        check_lengths(p.nonce.len(), data_len)?;

        if p.mac_size % 2 == 1 {
            return if p.encrypting {
                portable::seal(p.key, p.nonce, p.ad, p.mac_size, p.input, p.output)
            } else {
                portable::open(p.key, p.nonce, p.ad, p.mac_size, p.input, p.output)
            };
        }

        let run = select(p.key.len(), p.mac_size, p.nonce.len(), p.encrypting)?;
        run(&LIMITS, p.key, p.nonce, p.ad, p.input, p.output)
    }
}
