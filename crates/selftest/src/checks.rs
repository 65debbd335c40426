//! The individual self checks. Each returns on the first mismatch.

use anyhow::{ensure, Context, Result};
use common::Variant;
use packet_cipher::registry::{ccm_for, gcm_siv_for};
use packet_cipher::{AeadParameters, AesCfb, CipherParameters, PacketCipher};
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use savable_digest::{Flavor, SavableDigest, Sha2Digest};
use tracing::{debug, info};

const VARIANTS: [Variant; 2] = [Variant::Portable, Variant::Accelerated];

struct CipherVector {
    name: &'static str,
    key: &'static str,
    nonce: &'static str,
    aad: &'static str,
    plaintext: &'static str,
    mac_size_bits: u32,
    result: &'static str,
}

const GCM_SIV_VECTORS: &[CipherVector] = &[
    CipherVector {
        name: "RFC 8452 C.1 AES-128 empty",
        key: "01000000000000000000000000000000",
        nonce: "030000000000000000000000",
        aad: "",
        plaintext: "",
        mac_size_bits: 128,
        result: "dc20e2d83f25705bb49e439eca56de25",
    },
    CipherVector {
        name: "RFC 8452 C.1 AES-128 8-byte plaintext",
        key: "01000000000000000000000000000000",
        nonce: "030000000000000000000000",
        aad: "",
        plaintext: "0100000000000000",
        mac_size_bits: 128,
        result: "b5d839330ac7b786578782fff6013b815b287c22493a364c",
    },
];

const CCM_VECTORS: &[CipherVector] = &[CipherVector {
    name: "RFC 3610 packet vector #1",
    key: "c0c1c2c3c4c5c6c7c8c9cacbcccdcecf",
    nonce: "00000003020100a0a1a2a3a4a5",
    aad: "0001020304050607",
    plaintext: "08090a0b0c0d0e0f101112131415161718191a1b1c1d1e",
    mac_size_bits: 64,
    result: "588c979a61c663d2f066d0c2c0f989806d5f6b61dac38417e8d12cfdf926e0",
}];

/// SP 800-38A F.3.13, CFB128-AES128.
const CFB_KEY: &str = "2b7e151628aed2a6abf7158809cf4f3c";
const CFB_IV: &str = "000102030405060708090a0b0c0d0e0f";
const CFB_PLAINTEXT: &str = "6bc1bee22e409f96e93d7e117393172aae2d8a571e03ac9c9eb76fac45af8e51";
const CFB_CIPHERTEXT: &str = "3b3fd92eb72dad20333449f8e83cfb4ac8a64537a0b3a93fcde3cdad9f1ce58b";

struct DigestVector {
    flavor: Flavor,
    message: &'static [u8],
    digest: &'static str,
}

const DIGEST_VECTORS: &[DigestVector] = &[
    DigestVector {
        flavor: Flavor::Sha224,
        message: b"",
        digest: "d14a028c2a3a2bc9476102bb288234c415a2b01f828ea62ac5b3e42f",
    },
    DigestVector {
        flavor: Flavor::Sha224,
        message: b"abc",
        digest: "23097d223405d8228642a477bda255b32aadbce4bda0b3f7e36c9da7",
    },
    DigestVector {
        flavor: Flavor::Sha256,
        message: b"abc",
        digest: "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad",
    },
];

fn run_cipher_vector(cipher: &dyn PacketCipher, v: &CipherVector) -> Result<()> {
    let key = hex::decode(v.key)?;
    let nonce = hex::decode(v.nonce)?;
    let aad = hex::decode(v.aad)?;
    let plaintext = hex::decode(v.plaintext)?;
    let expected = hex::decode(v.result)?;

    let params = CipherParameters::Aead(AeadParameters {
        key: &key,
        nonce: &nonce,
        associated_text: Some(aad.as_slice()),
        mac_size_bits: v.mac_size_bits,
    });

    let sealed = cipher
        .encrypt(&params, &plaintext)
        .with_context(|| format!("{}: {} encrypt", cipher.name(), v.name))?;
    ensure!(sealed == expected, "{}: {} ciphertext mismatch", cipher.name(), v.name);

    let opened = cipher
        .decrypt(&params, &sealed)
        .with_context(|| format!("{}: {} decrypt", cipher.name(), v.name))?;
    ensure!(opened == plaintext, "{}: {} plaintext mismatch", cipher.name(), v.name);
    Ok(())
}

fn run_cfb_vector(variant: Variant) -> Result<()> {
    let key = hex::decode(CFB_KEY)?;
    let iv = hex::decode(CFB_IV)?;
    let plaintext = hex::decode(CFB_PLAINTEXT)?;
    let blocks = plaintext.len() / 16;

    let mut cfb = AesCfb::new(variant, true, &key, &iv)?;
    let mut sealed = vec![0u8; plaintext.len()];
    cfb.process_blocks(&plaintext, blocks, &mut sealed)?;
    ensure!(hex::encode(&sealed) == CFB_CIPHERTEXT, "{}: ciphertext mismatch", cfb.name());

    cfb.rekey(false, &key)?;
    let mut opened = vec![0u8; sealed.len()];
    cfb.process_blocks(&sealed, blocks, &mut opened)?;
    ensure!(opened == plaintext, "{}: plaintext mismatch", cfb.name());
    Ok(())
}

fn digest_of(flavor: Flavor, variant: Variant, data: &[u8]) -> Result<Vec<u8>> {
    let mut d = Sha2Digest::with_variant(flavor, variant);
    d.update(data);
    let mut out = vec![0u8; d.digest_size()];
    d.do_final(&mut out, 0)?;
    Ok(out)
}

/// Known-answer tests for every service on both variants.
pub fn known_answers() -> Result<usize> {
    let mut count = 0;
    for variant in VARIANTS {
        let gcm_siv = gcm_siv_for(variant);
        for v in GCM_SIV_VECTORS {
            run_cipher_vector(gcm_siv.as_ref(), v)?;
            count += 1;
        }
        let ccm = ccm_for(variant);
        for v in CCM_VECTORS {
            run_cipher_vector(ccm.as_ref(), v)?;
            count += 1;
        }
        run_cfb_vector(variant)?;
        count += 1;
        for v in DIGEST_VECTORS {
            let got = hex::encode(digest_of(v.flavor, variant, v.message)?);
            ensure!(
                got == v.digest,
                "{}[{variant}]: digest mismatch",
                v.flavor.short_name()
            );
            count += 1;
        }
        debug!(variant = %variant, "known answers passed");
    }
    Ok(count)
}

fn random_bytes(rng: &mut StdRng, len: usize) -> Vec<u8> {
    let mut buf = vec![0u8; len];
    rng.fill_bytes(&mut buf);
    buf
}

fn compare_packet(
    portable: &dyn PacketCipher,
    accelerated: &dyn PacketCipher,
    params: &CipherParameters<'_>,
    plaintext: &[u8],
    flip: Option<usize>,
) -> Result<()> {
    let name = portable.limits().name;
    let a = portable.encrypt(params, plaintext);
    let b = accelerated.encrypt(params, plaintext);
    ensure!(a == b, "{name}: variants disagree on encrypt");

    let Ok(mut sealed) = a else {
        return Ok(());
    };
    if let Some(i) = flip {
        let i = i % sealed.len();
        sealed[i] ^= 0x80;
    }
    let a = portable.decrypt(params, &sealed);
    let b = accelerated.decrypt(params, &sealed);
    ensure!(a == b, "{name}: variants disagree on decrypt");
    match (flip, a) {
        (None, Ok(opened)) => ensure!(opened == plaintext, "{name}: round trip mismatch"),
        (None, Err(e)) => anyhow::bail!("{name}: round trip failed: {e}"),
        (Some(_), Ok(_)) => anyhow::bail!("{name}: tampered packet accepted"),
        (Some(_), Err(_)) => {}
    }
    Ok(())
}

/// Random packets through both variants of each cipher; outputs and errors
/// must agree exactly.
pub fn parity_sweep(trials: u64, seed: u64) -> Result<()> {
    let mut rng = StdRng::seed_from_u64(seed);
    let (gcm_p, gcm_a) = (gcm_siv_for(Variant::Portable), gcm_siv_for(Variant::Accelerated));
    let (ccm_p, ccm_a) = (ccm_for(Variant::Portable), ccm_for(Variant::Accelerated));

    for trial in 0..trials {
        let len = rng.gen_range(0..256);
        let plaintext = random_bytes(&mut rng, len);
        let ad = if rng.gen_bool(0.75) {
            let len = rng.gen_range(0..64);
            Some(random_bytes(&mut rng, len))
        } else {
            None
        };
        let flip = rng.gen_bool(0.25).then(|| rng.gen::<usize>());

        let key_len = if rng.gen() { 16 } else { 32 };
        let key = random_bytes(&mut rng, key_len);
        let nonce = random_bytes(&mut rng, 12);
        let params = CipherParameters::Aead(AeadParameters {
            key: &key,
            nonce: &nonce,
            associated_text: ad.as_deref(),
            mac_size_bits: 128,
        });
        compare_packet(gcm_p.as_ref(), gcm_a.as_ref(), &params, &plaintext, flip)
            .with_context(|| format!("trial {trial} (seed {seed})"))?;

        let key_len = [16, 24, 32][rng.gen_range(0..3)];
        let key = random_bytes(&mut rng, key_len);
        let nonce_len = rng.gen_range(7..=13);
        let nonce = random_bytes(&mut rng, nonce_len);
        let params = CipherParameters::Aead(AeadParameters {
            key: &key,
            nonce: &nonce,
            associated_text: ad.as_deref(),
            mac_size_bits: 8 * rng.gen_range(4..=16),
        });
        compare_packet(ccm_p.as_ref(), ccm_a.as_ref(), &params, &plaintext, flip)
            .with_context(|| format!("trial {trial} (seed {seed})"))?;
    }
    Ok(())
}

/// Random messages of 1 to 100 blocks through both CFB variants for each
/// key size: ciphertexts and plaintexts must agree, and a flipped ciphertext
/// bit must change the recovered plaintext.
pub fn cfb_concordance(trials: u64, seed: u64) -> Result<()> {
    let mut rng = StdRng::seed_from_u64(seed);
    for key_len in [16, 24, 32] {
        for trial in 0..trials {
            let blocks = rng.gen_range(1..=100);
            let msg = random_bytes(&mut rng, blocks * 16);
            let key = random_bytes(&mut rng, key_len);
            let iv = random_bytes(&mut rng, 16);
            cfb_trial(&msg, blocks, &key, &iv)
                .with_context(|| format!("key {key_len} trial {trial} (seed {seed})"))?;
        }
        debug!(key_len, trials, "cfb concordance passed");
    }
    info!(trials, "cfb concordance passed");
    Ok(())
}

fn cfb_trial(msg: &[u8], blocks: usize, key: &[u8], iv: &[u8]) -> Result<()> {
    let mut portable = AesCfb::new(Variant::Portable, true, key, iv)?;
    let mut accelerated = AesCfb::new(Variant::Accelerated, true, key, iv)?;

    let mut portable_ct = vec![0u8; msg.len()];
    let mut accelerated_ct = vec![0u8; msg.len()];
    ensure!(portable.process_blocks(msg, blocks, &mut portable_ct)? == msg.len());
    ensure!(accelerated.process_blocks(msg, blocks, &mut accelerated_ct)? == msg.len());
    ensure!(portable_ct == accelerated_ct, "variants disagree on encrypt");

    portable.rekey(false, key)?;
    accelerated.rekey(false, key)?;
    let mut portable_pt = vec![0u8; msg.len()];
    let mut accelerated_pt = vec![0u8; msg.len()];
    portable.process_blocks(&portable_ct, blocks, &mut portable_pt)?;
    accelerated.process_blocks(&accelerated_ct, blocks, &mut accelerated_pt)?;
    ensure!(portable_pt == accelerated_pt, "variants disagree on decrypt");
    ensure!(portable_pt == msg, "round trip mismatch");

    accelerated_ct[0] ^= 1;
    accelerated.reset()?;
    accelerated.process_blocks(&accelerated_ct, blocks, &mut accelerated_pt)?;
    ensure!(accelerated_pt != portable_pt, "tampered ciphertext decrypted unchanged");
    Ok(())
}

/// Saves state part way through a message, resumes on the other variant and
/// checks the result against a one-shot digest.
pub fn digest_round_trip(seed: u64) -> Result<()> {
    let mut rng = StdRng::seed_from_u64(seed);
    for flavor in [Flavor::Sha224, Flavor::Sha256] {
        for (from, to) in [
            (Variant::Portable, Variant::Accelerated),
            (Variant::Accelerated, Variant::Portable),
        ] {
            let len = rng.gen_range(0..512);
            let data = random_bytes(&mut rng, len);
            let split = rng.gen_range(0..=data.len());
            let expected = digest_of(flavor, from, &data)?;

            let mut first = Sha2Digest::with_variant(flavor, from);
            first.update(&data[..split]);
            let blob = first.encoded_state();

            let mut resumed =
                Sha2Digest::from_encoded_state(flavor, to, Some(blob.as_slice()), 0)
                    .with_context(|| format!("{first}: restore on {to}"))?;
            resumed.update(&data[split..]);
            let mut got = vec![0u8; resumed.digest_size()];
            resumed.do_final(&mut got, 0)?;
            ensure!(
                got == expected,
                "{}: resume {from} -> {to} at {split}/{} mismatch",
                flavor.short_name(),
                data.len()
            );
        }
    }
    info!("digest state round trip passed");
    Ok(())
}
