//! AES in 128-bit cipher feedback mode (NIST SP 800-38A), block at a time.
//!
//! Unlike the packet ciphers this is a streaming transform: the feedback
//! register carries over between [`AesCfb::process_blocks`] calls until the
//! cipher is re-keyed or reset.

use std::fmt;

use common::{message, CryptoError, Result, Variant};
use zeroize::Zeroizing;

use crate::block::{AesBlock, BLOCK_SIZE};

/// One direction of CFB-128 over an expanded key.
pub(crate) trait CfbCore: Send {
    /// Transforms one block in place and advances the feedback register.
    fn apply(&mut self, block: &mut [u8; BLOCK_SIZE]);
}

struct PortableCfb {
    cipher: AesBlock,
    register: [u8; BLOCK_SIZE],
    encrypting: bool,
}

impl CfbCore for PortableCfb {
    fn apply(&mut self, block: &mut [u8; BLOCK_SIZE]) {
        let mut keystream = self.register;
        self.cipher.encrypt_block(&mut keystream);
        if !self.encrypting {
            self.register = *block;
        }
        for (b, k) in block.iter_mut().zip(&keystream) {
            *b ^= k;
        }
        if self.encrypting {
            self.register = *block;
        }
    }
}

fn portable_core(
    encrypting: bool,
    key: &[u8],
    iv: &[u8; BLOCK_SIZE],
) -> Result<Box<dyn CfbCore>> {
    Ok(Box::new(PortableCfb {
        cipher: AesBlock::new(key)?,
        register: *iv,
        encrypting,
    }))
}

fn core_for(
    variant: Variant,
    encrypting: bool,
    key: &[u8],
    iv: &[u8; BLOCK_SIZE],
) -> Result<Box<dyn CfbCore>> {
    match variant {
        Variant::Portable => portable_core(encrypting, key, iv),
        Variant::Accelerated => crate::accelerated::cfb_core(encrypting, key, iv),
    }
}

/// AES-CFB128 with a portable or accelerated core.
pub struct AesCfb {
    variant: Variant,
    encrypting: bool,
    key: Zeroizing<Vec<u8>>,
    iv: [u8; BLOCK_SIZE],
    core: Box<dyn CfbCore>,
}

impl AesCfb {
    /// # Errors
    ///
    /// [`CryptoError::InvalidParameter`] for a key that is not 16, 24 or 32
    /// bytes or an IV that is not one block.
    pub fn new(variant: Variant, encrypting: bool, key: &[u8], iv: &[u8]) -> Result<Self> {
        let iv: [u8; BLOCK_SIZE] = iv
            .try_into()
            .map_err(|_| CryptoError::InvalidParameter(message::CFB_IV_LENGTH))?;
        let core = core_for(variant, encrypting, key, &iv)?;
        Ok(Self {
            variant,
            encrypting,
            key: Zeroizing::new(key.to_vec()),
            iv,
            core,
        })
    }

    /// Switches direction and key, restarting from the IV given to
    /// [`AesCfb::new`].
    ///
    /// # Errors
    ///
    /// [`CryptoError::InvalidParameter`] for a bad key length. The cipher is
    /// unchanged on error.
    pub fn rekey(&mut self, encrypting: bool, key: &[u8]) -> Result<()> {
        self.core = core_for(self.variant, encrypting, key, &self.iv)?;
        self.encrypting = encrypting;
        self.key = Zeroizing::new(key.to_vec());
        Ok(())
    }

    /// Restores the feedback register to the IV.
    ///
    /// # Errors
    ///
    /// Only if the stored key no longer expands, which cannot happen for a
    /// cipher built by [`AesCfb::new`].
    pub fn reset(&mut self) -> Result<()> {
        self.core = core_for(self.variant, self.encrypting, &self.key, &self.iv)?;
        Ok(())
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn is_encrypting(&self) -> bool {
        self.encrypting
    }

    /// e.g. `AES/CFB[Accelerated]`
    pub fn name(&self) -> String {
        format!("AES/CFB[{}]", self.variant)
    }

    /// Transforms `blocks` whole blocks from the start of `input` into the
    /// start of `output` and returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// [`CryptoError::InvalidBuffer`] when either buffer is shorter than
    /// `blocks` blocks. Nothing is written in that case.
    pub fn process_blocks(
        &mut self,
        input: &[u8],
        blocks: usize,
        output: &mut [u8],
    ) -> Result<usize> {
        let len = blocks
            .checked_mul(BLOCK_SIZE)
            .ok_or(CryptoError::InvalidBuffer(message::INPUT_DATA_SHORT))?;
        if input.len() < len {
            return Err(CryptoError::InvalidBuffer(message::INPUT_DATA_SHORT));
        }
        if output.len() < len {
            return Err(CryptoError::InvalidBuffer(message::OUTPUT_TOO_SHORT));
        }

        for (src, dst) in input[..len]
            .chunks_exact(BLOCK_SIZE)
            .zip(output[..len].chunks_exact_mut(BLOCK_SIZE))
        {
            let mut block = [0u8; BLOCK_SIZE];
            block.copy_from_slice(src);
            self.core.apply(&mut block);
            dst.copy_from_slice(&block);
        }
        Ok(len)
    }
}

impl fmt::Debug for AesCfb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AesCfb")
            .field("variant", &self.variant)
            .field("encrypting", &self.encrypting)
            .field("key_len", &self.key.len())
            .finish_non_exhaustive()
    }
}
