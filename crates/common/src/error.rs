//! Error taxonomy shared by the packet ciphers and digests.

use thiserror::Error;

use crate::message;

/// Broad category of a [`CryptoError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Parameter,
    Buffer,
    Authentication,
    State,
    FatalLimit,
}

/// Error returned by every packet cipher and digest operation.
///
/// The `Display` text is the canonical message for the condition and is the
/// same for the portable and accelerated variants:
/// - [`CryptoError::InvalidParameter`] → bad key, nonce, associated data or MAC size
/// - [`CryptoError::InvalidBuffer`] → missing buffer, bad offset/length, short capacity
/// - [`CryptoError::AuthenticationFailed`] → tag mismatch on decrypt
/// - [`CryptoError::InvalidState`] → malformed encoded digest state
/// - [`CryptoError::LimitExceeded`] → data exceeds the algorithm's length bound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// Malformed or out-of-range call argument, detected before any cryptographic work.
    #[error("{0}")]
    InvalidParameter(&'static str),

    /// Insufficient or inconsistent buffer capacity or offsets, detected before mutation.
    #[error("{0}")]
    InvalidBuffer(&'static str),

    /// The received tag does not match. Any plaintext written has been wiped.
    #[error("mac check failed")]
    AuthenticationFailed,

    /// An encoded digest state failed structural validation.
    #[error("{0}")]
    InvalidState(&'static str),

    /// Associated data or message length exceeds the algorithm's safe bound.
    #[error("{0}")]
    LimitExceeded(&'static str),
}

impl CryptoError {
    /// Returns the category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CryptoError::InvalidParameter(_) => ErrorKind::Parameter,
            CryptoError::InvalidBuffer(_) => ErrorKind::Buffer,
            CryptoError::AuthenticationFailed => ErrorKind::Authentication,
            CryptoError::InvalidState(_) => ErrorKind::State,
            CryptoError::LimitExceeded(_) => ErrorKind::FatalLimit,
        }
    }

    /// Returns the canonical message text.
    pub fn message(&self) -> &'static str {
        match self {
            CryptoError::InvalidParameter(m)
            | CryptoError::InvalidBuffer(m)
            | CryptoError::InvalidState(m)
            | CryptoError::LimitExceeded(m) => m,
            CryptoError::AuthenticationFailed => message::MAC_CHECK_FAILED,
        }
    }

    /// Whether the caller can fix its inputs and retry.
    ///
    /// Authentication failures and limit violations are final for the data
    /// that caused them.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            CryptoError::AuthenticationFailed | CryptoError::LimitExceeded(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds() {
        assert_eq!(
            CryptoError::InvalidParameter(message::KEY_NULL).kind(),
            ErrorKind::Parameter
        );
        assert_eq!(
            CryptoError::InvalidBuffer(message::INPUT_NULL).kind(),
            ErrorKind::Buffer
        );
        assert_eq!(
            CryptoError::AuthenticationFailed.kind(),
            ErrorKind::Authentication
        );
        assert_eq!(
            CryptoError::InvalidState(message::STATE_TOO_SHORT).kind(),
            ErrorKind::State
        );
        assert_eq!(
            CryptoError::LimitExceeded(message::BYTE_COUNT_EXCEEDED).kind(),
            ErrorKind::FatalLimit
        );
    }

    #[test]
    fn display_is_canonical_message() {
        let e = CryptoError::InvalidBuffer(message::OUTPUT_TOO_SHORT);
        assert_eq!(e.to_string(), "output buffer too short");
        assert_eq!(e.message(), e.to_string());
        assert_eq!(CryptoError::AuthenticationFailed.to_string(), "mac check failed");
        assert_eq!(
            CryptoError::AuthenticationFailed.message(),
            message::MAC_CHECK_FAILED
        );
    }

    #[test]
    fn recoverability() {
        assert!(CryptoError::InvalidParameter(message::INVALID_MAC_SIZE).is_recoverable());
        assert!(CryptoError::InvalidState(message::SHA224_STATE_INVALID).is_recoverable());
        assert!(!CryptoError::AuthenticationFailed.is_recoverable());
        assert!(!CryptoError::LimitExceeded(message::BYTE_COUNT_EXCEEDED).is_recoverable());
    }
}
