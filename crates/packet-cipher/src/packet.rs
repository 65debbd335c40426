//! The packet cipher contract.

use common::{message, BufferView, BufferViewMut, CryptoError, Result, Variant};

use crate::params::CipherParameters;
use crate::request::{AlgorithmLimits, PacketRequest};

/// Output size for a packet of `len` bytes with a `mac_size`-byte tag.
///
/// # Errors
///
/// "len parameter invalid" when decrypting fewer bytes than the tag.
pub fn raw_output_size(encrypting: bool, len: usize, mac_size: usize) -> Result<usize> {
    if encrypting {
        Ok(len + mac_size)
    } else {
        len.checked_sub(mac_size)
            .ok_or(CryptoError::InvalidBuffer(message::LEN_PARAMETER_INVALID))
    }
}

/// A stateless, single-shot AEAD transform.
///
/// Implementations share [`crate::request::validate`], so any two variants of
/// the same algorithm return identical results and identical errors for the
/// same call.
pub trait PacketCipher: Send + Sync {
    fn limits(&self) -> &'static AlgorithmLimits;

    fn variant(&self) -> Variant;

    /// Low-level entry point with explicit declared lengths.
    ///
    /// Encrypting writes `ciphertext || tag` at the start of the output region;
    /// decrypting writes the plaintext. Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// Validation errors in their fixed order, then
    /// [`CryptoError::LimitExceeded`] or [`CryptoError::AuthenticationFailed`].
    fn process(&self, request: &PacketRequest<'_>, output: BufferViewMut<'_>) -> Result<usize>;

    /// e.g. `AES-GCM-SIV[Portable]`
    fn name(&self) -> String {
        format!("{}[{}]", self.limits().name, self.variant())
    }

    fn output_size(
        &self,
        encrypting: bool,
        params: &CipherParameters<'_>,
        len: isize,
    ) -> Result<usize> {
        if len < 0 {
            return Err(CryptoError::InvalidBuffer(message::INPUT_LEN_NEGATIVE));
        }
        let mac_size = params.mac_size(self.limits())?;
        raw_output_size(encrypting, len as usize, mac_size)
    }

    fn process_packet(
        &self,
        encrypting: bool,
        params: &CipherParameters<'_>,
        input: BufferView<'_>,
        output: BufferViewMut<'_>,
    ) -> Result<usize> {
        let mac_size = params.mac_size(self.limits())?;
        let request = params.to_request(encrypting, mac_size, input);
        self.process(&request, output)
    }

    /// Encrypts into a fresh `ciphertext || tag` vector.
    fn encrypt(&self, params: &CipherParameters<'_>, plaintext: &[u8]) -> Result<Vec<u8>> {
        let len = self.output_size(true, params, plaintext.len() as isize)?;
        let mut out = vec![0u8; len];
        let written = self.process_packet(true, params, plaintext.into(), out.as_mut_slice().into())?;
        out.truncate(written);
        Ok(out)
    }

    /// Decrypts and authenticates into a fresh plaintext vector.
    fn decrypt(&self, params: &CipherParameters<'_>, ciphertext: &[u8]) -> Result<Vec<u8>> {
        let mac_size = params.mac_size(self.limits())?;
        let mut out = vec![0u8; ciphertext.len().saturating_sub(mac_size)];
        let written =
            self.process_packet(false, params, ciphertext.into(), out.as_mut_slice().into())?;
        out.truncate(written);
        Ok(out)
    }
}
