//! Selection between the portable and accelerated implementations.
//!
//! A [`ProviderConfig`] is an immutable value handed to whichever registry or
//! constructor needs it. There is no process-wide switch.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One of the two interchangeable implementations of an algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// Pure software, no platform instructions.
    Portable,
    /// Backed by crates that use AES-NI / CLMUL / SHA extensions when present.
    Accelerated,
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::Portable => f.write_str("Portable"),
            Variant::Accelerated => f.write_str("Accelerated"),
        }
    }
}

/// Requested variant policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preference {
    /// Accelerated when the CPU supports the service, portable otherwise.
    #[default]
    Auto,
    Portable,
    Accelerated,
}

impl FromStr for Preference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Preference::Auto),
            "portable" => Ok(Preference::Portable),
            "accelerated" => Ok(Preference::Accelerated),
            other => Err(format!("unknown provider preference: {other}")),
        }
    }
}

/// A cryptographic service that has both variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Service {
    AesGcmSiv,
    AesCcm,
    AesCfb,
    Sha224,
    Sha256,
}

impl Service {
    pub const ALL: [Service; 5] = [
        Service::AesGcmSiv,
        Service::AesCcm,
        Service::AesCfb,
        Service::Sha224,
        Service::Sha256,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Service::AesGcmSiv => "aes-gcm-siv",
            Service::AesCcm => "aes-ccm",
            Service::AesCfb => "aes-cfb",
            Service::Sha224 => "sha224",
            Service::Sha256 => "sha256",
        }
    }

    /// Whether the running CPU has the instructions the accelerated variant
    /// of this service benefits from.
    pub fn hardware_available(&self) -> bool {
        #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
        {
            match self {
                Service::AesGcmSiv => {
                    is_x86_feature_detected!("aes") && is_x86_feature_detected!("pclmulqdq")
                }
                Service::AesCcm | Service::AesCfb => is_x86_feature_detected!("aes"),
                Service::Sha224 | Service::Sha256 => is_x86_feature_detected!("sha"),
            }
        }
        #[cfg(target_arch = "aarch64")]
        {
            match self {
                Service::AesGcmSiv => {
                    std::arch::is_aarch64_feature_detected!("aes")
                        && std::arch::is_aarch64_feature_detected!("pmull")
                }
                Service::AesCcm | Service::AesCfb => {
                    std::arch::is_aarch64_feature_detected!("aes")
                }
                Service::Sha224 | Service::Sha256 => {
                    std::arch::is_aarch64_feature_detected!("sha2")
                }
            }
        }
        #[cfg(not(any(target_arch = "x86", target_arch = "x86_64", target_arch = "aarch64")))]
        {
            false
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Service {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Service::ALL
            .into_iter()
            .find(|svc| svc.as_str() == wanted)
            .ok_or_else(|| format!("unknown service: {}", s.trim()))
    }
}

/// Variant selection policy for every service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub preference: Preference,
    /// Services pinned to [`Variant::Portable`] whatever the preference.
    pub portable_only: Vec<Service>,
}

impl ProviderConfig {
    pub fn portable() -> Self {
        Self {
            preference: Preference::Portable,
            portable_only: Vec::new(),
        }
    }

    pub fn accelerated() -> Self {
        Self {
            preference: Preference::Accelerated,
            portable_only: Vec::new(),
        }
    }

    /// Resolves the variant to use for `service`.
    pub fn variant_for(&self, service: Service) -> Variant {
        if self.portable_only.contains(&service) {
            return Variant::Portable;
        }
        match self.preference {
            Preference::Portable => Variant::Portable,
            Preference::Accelerated => Variant::Accelerated,
            Preference::Auto if service.hardware_available() => Variant::Accelerated,
            Preference::Auto => Variant::Portable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forced_preferences() {
        for svc in Service::ALL {
            assert_eq!(ProviderConfig::portable().variant_for(svc), Variant::Portable);
            assert_eq!(
                ProviderConfig::accelerated().variant_for(svc),
                Variant::Accelerated
            );
        }
    }

    #[test]
    fn portable_only_overrides_preference() {
        let cfg = ProviderConfig {
            preference: Preference::Accelerated,
            portable_only: vec![Service::Sha224],
        };
        assert_eq!(cfg.variant_for(Service::Sha224), Variant::Portable);
        assert_eq!(cfg.variant_for(Service::Sha256), Variant::Accelerated);
    }

    #[test]
    fn auto_follows_hardware() {
        let cfg = ProviderConfig::default();
        for svc in Service::ALL {
            let expected = if svc.hardware_available() {
                Variant::Accelerated
            } else {
                Variant::Portable
            };
            assert_eq!(cfg.variant_for(svc), expected);
        }
    }

    #[test]
    fn service_names_parse() {
        for svc in Service::ALL {
            assert_eq!(svc.as_str().parse::<Service>().unwrap(), svc);
        }
        assert_eq!(" SHA224 ".parse::<Service>().unwrap(), Service::Sha224);
        assert!("des".parse::<Service>().is_err());
    }

    #[test]
    fn preference_parse() {
        assert_eq!("Auto".parse::<Preference>().unwrap(), Preference::Auto);
        assert_eq!("portable".parse::<Preference>().unwrap(), Preference::Portable);
        assert!("fast".parse::<Preference>().is_err());
    }

    #[test]
    fn deserialises_from_json() {
        let cfg: ProviderConfig = serde_json::from_str(
            r#"{"preference":"accelerated","portable_only":["aes-gcm-siv","sha256"]}"#,
        )
        .unwrap();
        assert_eq!(cfg.preference, Preference::Accelerated);
        assert_eq!(cfg.portable_only, vec![Service::AesGcmSiv, Service::Sha256]);

        let empty: ProviderConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, ProviderConfig::default());
    }

    #[test]
    fn variant_display() {
        assert_eq!(Variant::Portable.to_string(), "Portable");
        assert_eq!(Variant::Accelerated.to_string(), "Accelerated");
    }
}
