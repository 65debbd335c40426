//! Known-answer vectors from RFC 8452 and RFC 3610, run against both variants.

use std::fs;
use std::path::PathBuf;

use packet_cipher::{
    AcceleratedCcm, AcceleratedGcmSiv, AeadParameters, CipherParameters, PacketCipher,
    PortableCcm, PortableGcmSiv,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Vector {
    name: String,
    key: String,
    nonce: String,
    aad: String,
    plaintext: String,
    #[serde(default = "default_mac_size_bits")]
    mac_size_bits: u32,
    result: String,
}

fn default_mac_size_bits() -> u32 {
    128
}

fn load(name: &str) -> Vec<Vector> {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("vectors")
        .join(format!("{name}.json"));
    let raw = fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("missing vector file {}: {e}", path.display()));
    serde_json::from_str(&raw).expect("vector file is valid JSON")
}

fn run(ciphers: &[&dyn PacketCipher], vectors: &[Vector]) {
    assert!(!vectors.is_empty());
    for v in vectors {
        let key = hex::decode(&v.key).unwrap();
        let nonce = hex::decode(&v.nonce).unwrap();
        let aad = hex::decode(&v.aad).unwrap();
        let plaintext = hex::decode(&v.plaintext).unwrap();
        let params = CipherParameters::Aead(AeadParameters {
            key: &key,
            nonce: &nonce,
            associated_text: (!aad.is_empty()).then_some(aad.as_slice()),
            mac_size_bits: v.mac_size_bits,
        });

        for cipher in ciphers {
            let ct = cipher.encrypt(&params, &plaintext).unwrap();
            assert_eq!(hex::encode(&ct), v.result, "{} on {}", v.name, cipher.name());
            let pt = cipher.decrypt(&params, &ct).unwrap();
            assert_eq!(pt, plaintext, "{} on {}", v.name, cipher.name());
        }
    }
}

#[test]
fn gcm_siv_vectors() {
    run(&[&PortableGcmSiv, &AcceleratedGcmSiv], &load("gcm_siv"));
}

#[test]
fn ccm_vectors() {
    run(&[&PortableCcm, &AcceleratedCcm], &load("ccm"));
}
