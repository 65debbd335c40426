//! [`CipherRegistry`]: hands out the cipher variant a [`ProviderConfig`]
//! selects.

use common::{Preference, ProviderConfig, Result, Service, Variant};
use tracing::{debug, warn};

use crate::accelerated::{AcceleratedCcm, AcceleratedGcmSiv};
use crate::ccm::PortableCcm;
use crate::cfb::AesCfb;
use crate::gcm_siv::PortableGcmSiv;
use crate::packet::PacketCipher;

/// Returns the GCM-SIV implementation for `variant`.
pub fn gcm_siv_for(variant: Variant) -> Box<dyn PacketCipher> {
    match variant {
        Variant::Portable => Box::new(PortableGcmSiv),
        Variant::Accelerated => Box::new(AcceleratedGcmSiv),
    }
}

/// Returns the CCM implementation for `variant`.
pub fn ccm_for(variant: Variant) -> Box<dyn PacketCipher> {
    match variant {
        Variant::Portable => Box::new(PortableCcm),
        Variant::Accelerated => Box::new(AcceleratedCcm),
    }
}

#[derive(Debug, Clone, Default)]
pub struct CipherRegistry {
    config: ProviderConfig,
}

impl CipherRegistry {
    pub fn new(config: ProviderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn resolve(&self, service: Service) -> Variant {
        let variant = self.config.variant_for(service);
        if variant == Variant::Accelerated
            && self.config.preference == Preference::Accelerated
            && !service.hardware_available()
        {
            warn!(
                service = %service,
                "accelerated variant forced without CPU support; running on software fallback"
            );
        }
        debug!(service = %service, variant = %variant, "cipher selected");
        variant
    }

    pub fn gcm_siv(&self) -> Box<dyn PacketCipher> {
        gcm_siv_for(self.resolve(Service::AesGcmSiv))
    }

    pub fn ccm(&self) -> Box<dyn PacketCipher> {
        ccm_for(self.resolve(Service::AesCcm))
    }

    /// AES-CFB128 keyed for one direction.
    ///
    /// # Errors
    ///
    /// As [`AesCfb::new`].
    pub fn cfb(&self, encrypting: bool, key: &[u8], iv: &[u8]) -> Result<AesCfb> {
        AesCfb::new(self.resolve(Service::AesCfb), encrypting, key, iv)
    }

    /// The packet cipher for `service`, or `None` for CFB and the digests.
    pub fn packet_cipher(&self, service: Service) -> Option<Box<dyn PacketCipher>> {
        match service {
            Service::AesGcmSiv => Some(self.gcm_siv()),
            Service::AesCcm => Some(self.ccm()),
            Service::AesCfb | Service::Sha224 | Service::Sha256 => None,
        }
    }
}
