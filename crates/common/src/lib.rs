//! Common types and errors shared across the packet cipher and digest crates.

pub mod buffer;
pub mod error;
pub mod message;
pub mod provider;

pub use buffer::{check_range, BoundsMessages, BufferView, BufferViewMut};
pub use error::{CryptoError, ErrorKind};
pub use provider::{Preference, ProviderConfig, Service, Variant};

/// Result alias used by every fallible operation in the workspace libraries.
pub type Result<T> = std::result::Result<T, CryptoError>;
