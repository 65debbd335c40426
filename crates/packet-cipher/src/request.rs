//! Packet requests and the ordered validation shared by every variant.

use common::{message, BoundsMessages, BufferView, BufferViewMut, CryptoError, Result};

/// Per-algorithm parameter limits consulted by [`validate`].
#[derive(Debug)]
pub struct AlgorithmLimits {
    /// Algorithm name, e.g. `"AES-GCM-SIV"`.
    pub name: &'static str,
    pub key_lengths: &'static [isize],
    pub key_length_message: &'static str,
    pub nonce_min: isize,
    pub nonce_max: isize,
    pub nonce_length_message: &'static str,
    /// MAC sizes are in bytes.
    pub mac_size_valid: fn(isize) -> bool,
    /// MAC size used when parameters carry no explicit one.
    pub default_mac_size: usize,
}

/// One packet operation as it arrives at the low-level entry point.
///
/// Lengths are declared separately from the buffers and may be negative or
/// larger than the buffer; [`validate`] reports such mismatches.
#[derive(Debug, Clone, Copy)]
pub struct PacketRequest<'a> {
    pub encrypting: bool,
    pub key: Option<&'a [u8]>,
    pub key_len: isize,
    pub nonce: Option<&'a [u8]>,
    pub nonce_len: isize,
    pub ad: Option<&'a [u8]>,
    pub ad_len: isize,
    pub mac_size: isize,
    pub input: BufferView<'a>,
}

impl<'a> PacketRequest<'a> {
    /// A request whose declared lengths match the supplied slices.
    pub fn new(
        encrypting: bool,
        key: &'a [u8],
        nonce: &'a [u8],
        ad: Option<&'a [u8]>,
        mac_size: usize,
        input: BufferView<'a>,
    ) -> Self {
        Self {
            encrypting,
            key: Some(key),
            key_len: key.len() as isize,
            nonce: Some(nonce),
            nonce_len: nonce.len() as isize,
            ad,
            ad_len: ad.map_or(0, |a| a.len() as isize),
            mac_size: mac_size as isize,
            input,
        }
    }
}

/// A request that passed validation, resolved to plain slices.
#[derive(Debug)]
pub struct ValidatedPacket<'a, 'o> {
    pub encrypting: bool,
    pub key: &'a [u8],
    pub nonce: &'a [u8],
    pub ad: &'a [u8],
    pub mac_size: usize,
    pub input: &'a [u8],
    /// The whole output region; the result is written at its start.
    pub output: &'o mut [u8],
}

fn param(msg: &'static str) -> CryptoError {
    CryptoError::InvalidParameter(msg)
}

/// Runs every check in its fixed order and resolves the buffers.
///
/// Key, nonce, associated data and MAC size are checked before the input and
/// output buffers, and nothing is written to `output` here.
///
/// # Errors
///
/// The first failing check's [`CryptoError::InvalidParameter`] or
/// [`CryptoError::InvalidBuffer`].
pub fn validate<'a, 'o>(
    limits: &AlgorithmLimits,
    req: &PacketRequest<'a>,
    output: BufferViewMut<'o>,
) -> Result<ValidatedPacket<'a, 'o>> {
    // -----------------------------------------------------------------------
    // Key
    // -----------------------------------------------------------------------
    let key = req.key.ok_or(param(message::KEY_NULL))?;
    if !limits.key_lengths.contains(&req.key_len) {
        return Err(param(limits.key_length_message));
    }
    let key_len = req.key_len as usize;
    if key.len() < key_len {
        return Err(param(message::KEY_ARRAY_SHORT));
    }

    // -----------------------------------------------------------------------
    // Nonce
    // -----------------------------------------------------------------------
    let nonce = req.nonce.ok_or(param(message::NONCE_NULL))?;
    let nonce_len =
        usize::try_from(req.nonce_len).map_err(|_| param(message::NONCE_LEN_NEGATIVE))?;
    if nonce.len() < nonce_len {
        return Err(param(message::NONCE_PAST_END));
    }
    if req.nonce_len < limits.nonce_min || req.nonce_len > limits.nonce_max {
        return Err(param(limits.nonce_length_message));
    }

    // -----------------------------------------------------------------------
    // Associated data and MAC size
    // -----------------------------------------------------------------------
    let ad = match req.ad {
        None if req.ad_len != 0 => return Err(param(message::AD_NULL)),
        None => &[][..],
        Some(ad) => {
            let ad_len =
                usize::try_from(req.ad_len).map_err(|_| param(message::AD_LEN_NEGATIVE))?;
            if ad_len > ad.len() {
                return Err(param(message::AD_PAST_END));
            }
            &ad[..ad_len]
        }
    };
    if !(limits.mac_size_valid)(req.mac_size) {
        return Err(param(message::INVALID_MAC_SIZE));
    }
    let mac_size = req.mac_size as usize;

    // -----------------------------------------------------------------------
    // Input
    // -----------------------------------------------------------------------
    let input = if req.input.is_null() {
        if req.input.declared_len() == 0 && !output.is_null() {
            &[][..]
        } else {
            return Err(CryptoError::InvalidBuffer(message::INPUT_NULL));
        }
    } else {
        req.input.resolve(&BoundsMessages::INPUT)?
    };
    if !req.encrypting && input.len() < mac_size {
        return Err(CryptoError::InvalidBuffer(message::INPUT_DATA_SHORT));
    }

    // -----------------------------------------------------------------------
    // Output
    // -----------------------------------------------------------------------
    let output = output.resolve(&BoundsMessages::OUTPUT)?;
    let required = if req.encrypting {
        input.len() + mac_size
    } else {
        input.len() - mac_size
    };
    if output.len() < required {
        return Err(CryptoError::InvalidBuffer(message::OUTPUT_TOO_SHORT));
    }

    Ok(ValidatedPacket {
        encrypting: req.encrypting,
        key: &key[..key_len],
        nonce: &nonce[..nonce_len],
        ad,
        mac_size,
        input,
        output,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn even_4_to_16(m: isize) -> bool {
        (4..=16).contains(&m) && m % 2 == 0
    }

    static LIMITS: AlgorithmLimits = AlgorithmLimits {
        name: "TEST",
        key_lengths: &[16, 24, 32],
        key_length_message: message::AES_KEY_LENGTH,
        nonce_min: 7,
        nonce_max: 13,
        nonce_length_message: message::CCM_NONCE_LENGTH,
        mac_size_valid: even_4_to_16,
        default_mac_size: 8,
    };

    const KEY: [u8; 16] = [1; 16];
    const NONCE: [u8; 12] = [2; 12];

    fn base<'a>(input: &'a [u8]) -> PacketRequest<'a> {
        PacketRequest::new(true, &KEY, &NONCE, None, 8, BufferView::from(input))
    }

    fn check(req: PacketRequest<'_>, out: &mut [u8]) -> std::result::Result<(), &'static str> {
        validate(&LIMITS, &req, BufferViewMut::from(out))
            .map(|_| ())
            .map_err(|e| e.message())
    }

    #[test]
    fn accepts_well_formed_request() {
        let input = [0u8; 10];
        let mut out = [0u8; 18];
        let req = base(&input);
        let packet = validate(&LIMITS, &req, BufferViewMut::from(&mut out[..])).unwrap();
        assert_eq!(packet.key.len(), 16);
        assert_eq!(packet.nonce.len(), 12);
        assert_eq!(packet.mac_size, 8);
        assert_eq!(packet.input.len(), 10);
        assert_eq!(packet.output.len(), 18);
    }

    #[test]
    fn key_checks_in_order() {
        let mut out = [0u8; 64];
        let mut req = base(&[]);
        req.key = None;
        req.key_len = 3;
        assert_eq!(check(req, &mut out), Err("key was null"));

        let mut req = base(&[]);
        req.key_len = 20;
        assert_eq!(check(req, &mut out), Err("key must be only 16, 24 or 32 bytes long"));

        let mut req = base(&[]);
        req.key_len = 24;
        assert_eq!(check(req, &mut out), Err("key array is less than keyLen"));
    }

    #[test]
    fn nonce_checks_in_order() {
        let mut out = [0u8; 64];
        let mut req = base(&[]);
        req.nonce = None;
        req.nonce_len = -1;
        assert_eq!(check(req, &mut out), Err("nonce is null"));

        let mut req = base(&[]);
        req.nonce_len = -1;
        assert_eq!(check(req, &mut out), Err("nonce len is negative"));

        let mut req = base(&[]);
        req.nonce_len = 13;
        assert_eq!(check(req, &mut out), Err("nonce len past end of nonce array"));

        let mut req = base(&[]);
        req.nonce_len = 6;
        assert_eq!(
            check(req, &mut out),
            Err("nonce must have length from 7 to 13 octets")
        );
    }

    #[test]
    fn ad_and_mac_checks_in_order() {
        let mut out = [0u8; 64];
        let ad = [0u8; 4];

        let mut req = base(&[]);
        req.ad_len = 1;
        assert_eq!(check(req, &mut out), Err("ad len non zero but ad array is null"));

        let mut req = base(&[]);
        req.ad = Some(&ad);
        req.ad_len = -1;
        assert_eq!(check(req, &mut out), Err("ad len is negative"));

        let mut req = base(&[]);
        req.ad = Some(&ad);
        req.ad_len = 5;
        assert_eq!(check(req, &mut out), Err("ad len past end of ad array"));

        let mut req = base(&[]);
        req.mac_size = 5;
        assert_eq!(check(req, &mut out), Err("invalid mac size"));
    }

    #[test]
    fn input_checks_in_order() {
        let mut out = [0u8; 64];
        let data = [0u8; 8];

        let mut req = base(&[]);
        req.input = BufferView::null(3);
        assert_eq!(check(req, &mut out), Err("input was null"));

        let mut req = base(&[]);
        req.input = BufferView::new(&data, -1, -1);
        assert_eq!(check(req, &mut out), Err("input offset is negative"));

        let mut req = base(&[]);
        req.input = BufferView::new(&data, 0, -1);
        assert_eq!(check(req, &mut out), Err("input len is negative"));

        let mut req = base(&[]);
        req.input = BufferView::new(&data, 4, 5);
        assert_eq!(
            check(req, &mut out),
            Err("input buffer too short for offset + length")
        );

        let mut req = base(&data[..7]);
        req.encrypting = false;
        assert_eq!(check(req, &mut out), Err("input data too short"));
    }

    #[test]
    fn output_checks_in_order() {
        let data = [0u8; 8];
        let req = base(&data);
        let mut out = [0u8; 16];

        assert_eq!(
            validate(&LIMITS, &req, BufferViewMut::null(16)).unwrap_err().message(),
            "output was null"
        );
        assert_eq!(
            validate(&LIMITS, &req, BufferViewMut::new(&mut out, -1, -1))
                .unwrap_err()
                .message(),
            "output offset is negative"
        );
        assert_eq!(
            validate(&LIMITS, &req, BufferViewMut::new(&mut out, 0, -1))
                .unwrap_err()
                .message(),
            "output len is negative"
        );
        assert_eq!(
            validate(&LIMITS, &req, BufferViewMut::new(&mut out, 1, 16))
                .unwrap_err()
                .message(),
            "output buffer too short for offset + length"
        );
        assert_eq!(
            validate(&LIMITS, &req, BufferViewMut::new(&mut out, 1, 15))
                .unwrap_err()
                .message(),
            "output buffer too short"
        );
    }

    #[test]
    fn null_input_with_zero_length() {
        let mut req = base(&[]);
        req.input = BufferView::null(0);
        let mut out = [0u8; 8];
        let packet = validate(&LIMITS, &req, BufferViewMut::from(&mut out[..])).unwrap();
        assert!(packet.input.is_empty());

        assert_eq!(
            validate(&LIMITS, &req, BufferViewMut::null(0)).unwrap_err().message(),
            "input was null"
        );
    }

    #[test]
    fn declared_lengths_trim_buffers() {
        let key = [9u8; 40];
        let nonce = [3u8; 20];
        let ad = [4u8; 10];
        let mut req = base(&[]);
        req.key = Some(&key);
        req.key_len = 32;
        req.nonce = Some(&nonce);
        req.nonce_len = 9;
        req.ad = Some(&ad);
        req.ad_len = 6;
        let mut out = [0u8; 8];
        let packet = validate(&LIMITS, &req, BufferViewMut::from(&mut out[..])).unwrap();
        assert_eq!(packet.key.len(), 32);
        assert_eq!(packet.nonce.len(), 9);
        assert_eq!(packet.ad.len(), 6);
    }
}
