use aes_gcm_siv::{Aes128GcmSiv, Aes256GcmSiv};
use common::{BufferViewMut, Result, Variant};

use super::op;
use crate::gcm_siv::{check_lengths, LIMITS};
use crate::packet::PacketCipher;
use crate::request::{validate, AlgorithmLimits, PacketRequest};

/// AES-GCM-SIV through the `aes-gcm-siv` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceleratedGcmSiv;

impl PacketCipher for AcceleratedGcmSiv {
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
        check_lengths(p.ad.len(), data_len)?;

        let run = match p.key.len() {
            16 => op::<Aes128GcmSiv>(p.encrypting),
            _ => op::<Aes256GcmSiv>(p.encrypting),
        };
        run(&LIMITS, p.key, p.nonce, p.ad, p.input, p.output)
    }
}
