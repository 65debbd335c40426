//! Configuration loading and validation for the self-test runner.
//!
//! All values are read from environment variables at startup.

use anyhow::{Context, Result};
use common::{Preference, ProviderConfig, Service};
use serde::Deserialize;

/// Validated self-test configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// `auto`, `portable` or `accelerated`.
    #[serde(default = "default_provider_preference")]
    pub provider_preference: String,

    /// Comma-separated services pinned to the portable variant,
    /// e.g. `aes-ccm,sha256`.
    #[serde(default)]
    pub portable_only: String,

    /// Number of random packets per cipher in the parity sweep.
    #[serde(default = "default_parity_trials")]
    pub parity_trials: u64,

    /// Seed for the parity sweep, so failures can be replayed.
    #[serde(default = "default_parity_seed")]
    pub parity_seed: u64,
}

fn default_log_level() -> String {
    "info".into()
}
fn default_provider_preference() -> String {
    "auto".into()
}
fn default_parity_trials() -> u64 {
    2_000
}
fn default_parity_seed() -> u64 {
    0x5eed
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable cannot be parsed or fails validation.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    fn validate(&self) -> Result<()> {
        if self.log_level.trim().is_empty() {
            anyhow::bail!("LOG_LEVEL must not be empty");
        }
        if self.parity_trials == 0 {
            anyhow::bail!("PARITY_TRIALS must be > 0");
        }
        self.provider_config()?;
        Ok(())
    }

    /// The variant policy these settings describe.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown preference or service name.
    pub fn provider_config(&self) -> Result<ProviderConfig> {
        let preference: Preference = self
            .provider_preference
            .parse()
            .map_err(|e: String| anyhow::anyhow!("PROVIDER_PREFERENCE: {e}"))?;

        let portable_only = self
            .portable_only
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<Service>()
                    .map_err(|e| anyhow::anyhow!("PORTABLE_ONLY: {e}"))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(ProviderConfig {
            preference,
            portable_only,
        })
    }
}
