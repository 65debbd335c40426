use aes::{Aes128, Aes192, Aes256};
use cfb_mode::cipher::consts::U16;
use cfb_mode::cipher::generic_array::GenericArray;
use cfb_mode::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use cfb_mode::{Decryptor, Encryptor};
use common::{message, CryptoError, Result};

use crate::block::BLOCK_SIZE;
use crate::cfb::CfbCore;

struct Encrypting<C>(C);

impl<C: BlockEncryptMut<BlockSize = U16> + Send> CfbCore for Encrypting<C> {
    fn apply(&mut self, block: &mut [u8; BLOCK_SIZE]) {
        self.0.encrypt_block_mut(GenericArray::from_mut_slice(block));
    }
}

struct Decrypting<C>(C);

impl<C: BlockDecryptMut<BlockSize = U16> + Send> CfbCore for Decrypting<C> {
    fn apply(&mut self, block: &mut [u8; BLOCK_SIZE]) {
        self.0.decrypt_block_mut(GenericArray::from_mut_slice(block));
    }
}

macro_rules! build {
    ($cipher:ty, $encrypting:expr, $key:expr, $iv:expr) => {{
        let bad_key = |_| CryptoError::InvalidParameter(message::AES_KEY_LENGTH);
        if $encrypting {
            Encryptor::<$cipher>::new_from_slices($key, $iv)
                .map(|c| Box::new(Encrypting(c)) as Box<dyn CfbCore>)
                .map_err(bad_key)
        } else {
            Decryptor::<$cipher>::new_from_slices($key, $iv)
                .map(|c| Box::new(Decrypting(c)) as Box<dyn CfbCore>)
                .map_err(bad_key)
        }
    }};
}

/// CFB-128 through the `cfb-mode` crate over the `aes` block cipher.
pub(crate) fn cfb_core(
    encrypting: bool,
    key: &[u8],
    iv: &[u8; BLOCK_SIZE],
) -> Result<Box<dyn CfbCore>> {
    match key.len() {
        16 => build!(Aes128, encrypting, key, iv),
        24 => build!(Aes192, encrypting, key, iv),
        32 => build!(Aes256, encrypting, key, iv),
        _ => Err(CryptoError::InvalidParameter(message::AES_KEY_LENGTH)),
    }
}
