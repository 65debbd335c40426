//! AES single-block encryption for the portable algorithms.

use aes::cipher::{generic_array::GenericArray, BlockEncrypt, KeyInit};
use aes::{Aes128, Aes192, Aes256};
use common::{message, CryptoError, Result};

/// Byte length of an AES block.
pub const BLOCK_SIZE: usize = 16;

/// An expanded AES key of any supported size. Round keys are wiped on drop.
pub enum AesBlock {
    Aes128(Aes128),
    Aes192(Aes192),
    Aes256(Aes256),
}

impl AesBlock {
    /// Expands `key`, which must be 16, 24 or 32 bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidParameter`] for any other key length.
    pub fn new(key: &[u8]) -> Result<Self> {
        let bad_key = |_| CryptoError::InvalidParameter(message::AES_KEY_LENGTH);
        match key.len() {
            16 => Aes128::new_from_slice(key).map(AesBlock::Aes128).map_err(bad_key),
            24 => Aes192::new_from_slice(key).map(AesBlock::Aes192).map_err(bad_key),
            32 => Aes256::new_from_slice(key).map(AesBlock::Aes256).map_err(bad_key),
            _ => Err(CryptoError::InvalidParameter(message::AES_KEY_LENGTH)),
        }
    }

    /// Encrypts one block in place.
    pub fn encrypt_block(&self, block: &mut [u8; BLOCK_SIZE]) {
        let block = GenericArray::from_mut_slice(block);
        match self {
            AesBlock::Aes128(c) => c.encrypt_block(block),
            AesBlock::Aes192(c) => c.encrypt_block(block),
            AesBlock::Aes256(c) => c.encrypt_block(block),
        }
    }
}

impl std::fmt::Debug for AesBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let bits = match self {
            AesBlock::Aes128(_) => 128,
            AesBlock::Aes192(_) => 192,
            AesBlock::Aes256(_) => 256,
        };
        // Never print key material.
        write!(f, "AesBlock(AES-{bits}, [REDACTED])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fips197_aes128() {
        let key = hex::decode("000102030405060708090a0b0c0d0e0f").unwrap();
        let mut block = [0u8; BLOCK_SIZE];
        block.copy_from_slice(&hex::decode("00112233445566778899aabbccddeeff").unwrap());
        AesBlock::new(&key).unwrap().encrypt_block(&mut block);
        assert_eq!(hex::encode(block), "69c4e0d86a7b0430d8cdb78070b4c55a");
    }

    #[test]
    fn fips197_aes256() {
        let key = hex::decode(
            "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f",
        )
        .unwrap();
        let mut block = [0u8; BLOCK_SIZE];
        block.copy_from_slice(&hex::decode("00112233445566778899aabbccddeeff").unwrap());
        AesBlock::new(&key).unwrap().encrypt_block(&mut block);
        assert_eq!(hex::encode(block), "8ea2b7ca516745bfeafc49904b496089");
    }

    #[test]
    fn rejects_bad_key_length() {
        let err = AesBlock::new(&[0u8; 20]).unwrap_err();
        assert_eq!(err.to_string(), "key must be only 16, 24 or 32 bytes long");
    }

    #[test]
    fn debug_is_redacted() {
        let block = AesBlock::new(&[7u8; 24]).unwrap();
        assert_eq!(format!("{block:?}"), "AesBlock(AES-192, [REDACTED])");
    }
}
