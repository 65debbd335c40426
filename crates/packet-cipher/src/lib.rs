//! Single-shot AEAD packet ciphers.
//!
//! Each algorithm comes in two interchangeable variants that share one
//! validation path, so they accept and reject exactly the same calls with the
//! same messages:
//!
//! | Algorithm | Portable | Accelerated |
//! |---|---|---|
//! | AES-GCM-SIV (RFC 8452) | [`PortableGcmSiv`] | [`AcceleratedGcmSiv`] |
//! | AES-CCM (RFC 3610) | [`PortableCcm`] | [`AcceleratedCcm`] |
//!
//! [`AesCfb`] adds AES in 128-bit cipher feedback mode with the same two
//! variants, processed a block at a time rather than as packets.
//!
//! Use [`CipherRegistry`] to pick a variant from a [`common::ProviderConfig`].

pub mod accelerated;
pub mod block;
pub mod ccm;
pub mod cfb;
pub mod gcm_siv;
pub mod packet;
pub mod params;
pub mod registry;
pub mod request;

pub use accelerated::{AcceleratedCcm, AcceleratedGcmSiv};
pub use crate::ccm::PortableCcm;
pub use crate::cfb::AesCfb;
pub use crate::gcm_siv::PortableGcmSiv;
pub use packet::{raw_output_size, PacketCipher};
pub use params::{AeadParameters, CipherParameters, ParametersWithIv};
pub use registry::CipherRegistry;
pub use request::{AlgorithmLimits, PacketRequest};
