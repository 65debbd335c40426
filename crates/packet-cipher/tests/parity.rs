//! Portable and accelerated variants must agree byte for byte, on success and
//! on failure. Covers both packet ciphers and AES-CFB.

use common::Variant;
use packet_cipher::{
    AcceleratedCcm, AcceleratedGcmSiv, AeadParameters, AesCfb, CipherParameters, PacketCipher,
    PortableCcm, PortableGcmSiv,
};
use proptest::prelude::*;

fn compare(
    portable: &dyn PacketCipher,
    accelerated: &dyn PacketCipher,
    params: &CipherParameters<'_>,
    plaintext: &[u8],
    flip: Option<usize>,
) -> Result<(), TestCaseError> {
    let a = portable.encrypt(params, plaintext);
    let b = accelerated.encrypt(params, plaintext);
    prop_assert_eq!(&a, &b);

    let Ok(mut ct) = a else {
        return Ok(());
    };
    if let Some(i) = flip {
        let i = i % ct.len();
        ct[i] ^= 0x01;
    }
    let a = portable.decrypt(params, &ct);
    let b = accelerated.decrypt(params, &ct);
    prop_assert_eq!(&a, &b);
    if flip.is_none() {
        prop_assert_eq!(a.unwrap(), plaintext.to_vec());
    } else {
        prop_assert!(a.is_err());
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(10_000))]

    #[test]
    fn gcm_siv_variants_agree(
        wide_key in any::<bool>(),
        key in prop::collection::vec(any::<u8>(), 32),
        nonce in prop::collection::vec(any::<u8>(), 12),
        ad in prop::option::of(prop::collection::vec(any::<u8>(), 0..48)),
        plaintext in prop::collection::vec(any::<u8>(), 0..96),
        flip in prop::option::of(any::<usize>()),
    ) {
        let key = if wide_key { &key[..] } else { &key[..16] };
        let params = CipherParameters::Aead(AeadParameters {
            key,
            nonce: &nonce,
            associated_text: ad.as_deref(),
            mac_size_bits: 128,
        });
        compare(&PortableGcmSiv, &AcceleratedGcmSiv, &params, &plaintext, flip)?;
    }

    #[test]
    fn ccm_variants_agree(
        key_len in prop::sample::select(vec![16usize, 24, 32]),
        key in prop::collection::vec(any::<u8>(), 32),
        nonce in prop::collection::vec(any::<u8>(), 7..=13),
        mac_bytes in 4u32..=16,
        ad in prop::option::of(prop::collection::vec(any::<u8>(), 0..48)),
        plaintext in prop::collection::vec(any::<u8>(), 0..96),
        flip in prop::option::of(any::<usize>()),
    ) {
        let params = CipherParameters::Aead(AeadParameters {
            key: &key[..key_len],
            nonce: &nonce,
            associated_text: ad.as_deref(),
            mac_size_bits: mac_bytes * 8,
        });
        compare(&PortableCcm, &AcceleratedCcm, &params, &plaintext, flip)?;
    }

    #[test]
    fn cfb_variants_agree(
        key_len in prop::sample::select(vec![16usize, 24, 32]),
        key in prop::collection::vec(any::<u8>(), 32),
        iv in prop::collection::vec(any::<u8>(), 16),
        blocks in 1usize..=100,
        seed in any::<u8>(),
        flip in any::<usize>(),
    ) {
        let key = &key[..key_len];
        let msg: Vec<u8> = (0..blocks * 16).map(|i| (i as u8).wrapping_mul(seed | 1)).collect();
        let mut portable = AesCfb::new(Variant::Portable, true, key, &iv).unwrap();
        let mut accelerated = AesCfb::new(Variant::Accelerated, true, key, &iv).unwrap();

        let mut a = vec![0u8; msg.len()];
        let mut b = vec![0u8; msg.len()];
        prop_assert_eq!(portable.process_blocks(&msg, blocks, &mut a).unwrap(), msg.len());
        prop_assert_eq!(accelerated.process_blocks(&msg, blocks, &mut b).unwrap(), msg.len());
        prop_assert_eq!(&a, &b);

        portable.rekey(false, key).unwrap();
        accelerated.rekey(false, key).unwrap();
        let mut pa = vec![0u8; msg.len()];
        let mut pb = vec![0u8; msg.len()];
        portable.process_blocks(&a, blocks, &mut pa).unwrap();
        accelerated.process_blocks(&b, blocks, &mut pb).unwrap();
        prop_assert_eq!(&pa, &pb);
        prop_assert_eq!(&pa, &msg);

        let i = flip % a.len();
        a[i] ^= 1;
        portable.reset().unwrap();
        accelerated.reset().unwrap();
        portable.process_blocks(&a, blocks, &mut pa).unwrap();
        accelerated.process_blocks(&a, blocks, &mut pb).unwrap();
        prop_assert_eq!(&pa, &pb);
        prop_assert_ne!(&pa, &msg);
    }

    #[test]
    fn invalid_parameters_fail_identically(
        key in prop::collection::vec(any::<u8>(), 0..40),
        nonce in prop::collection::vec(any::<u8>(), 0..16),
        mac_size_bits in 0u32..160,
        plaintext in prop::collection::vec(any::<u8>(), 0..24),
    ) {
        let params = CipherParameters::Aead(AeadParameters {
            key: &key,
            nonce: &nonce,
            associated_text: None,
            mac_size_bits,
        });
        prop_assert_eq!(
            PortableGcmSiv.encrypt(&params, &plaintext),
            AcceleratedGcmSiv.encrypt(&params, &plaintext)
        );
        prop_assert_eq!(
            PortableCcm.encrypt(&params, &plaintext),
            AcceleratedCcm.encrypt(&params, &plaintext)
        );
        prop_assert_eq!(
            PortableCcm.decrypt(&params, &plaintext),
            AcceleratedCcm.decrypt(&params, &plaintext)
        );
    }
}
