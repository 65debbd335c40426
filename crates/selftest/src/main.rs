//! `selftest`: exercises every service on both variants and exits non-zero on
//! the first failure.
//!
//! Startup sequence:
//! 1. Load and validate [`Config`] from environment variables.
//! 2. Initialise the tracing subscriber.
//! 3. Report the variant the provider policy selects for each service.
//! 4. Known-answer tests on both variants.
//! 5. Randomized portable/accelerated parity sweep.
//! 6. AES-CFB concordance across variants and key sizes.
//! 7. Digest state save and resume across variants.

mod checks;
mod config;
mod telemetry;

use anyhow::Result;
use common::{Service, Variant};
use packet_cipher::CipherRegistry;
use savable_digest::{Flavor, Sha2Digest};
use tracing::info;

use crate::config::Config;

fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = Config::from_env().map_err(|e| {
        // No subscriber yet.
        eprintln!("ERROR: configuration invalid: {e:#}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init_telemetry(&cfg.log_level)?;
    info!(version = env!("CARGO_PKG_VERSION"), "selftest starting");

    // -----------------------------------------------------------------------
    // 3. Provider selection
    // -----------------------------------------------------------------------
    let registry = CipherRegistry::new(cfg.provider_config()?);
    for service in Service::ALL {
        let variant: Variant = match service {
            Service::AesGcmSiv => registry.gcm_siv().variant(),
            Service::AesCcm => registry.ccm().variant(),
            Service::AesCfb => registry.config().variant_for(service),
            Service::Sha224 => Sha2Digest::new(Flavor::Sha224, registry.config()).variant(),
            Service::Sha256 => Sha2Digest::new(Flavor::Sha256, registry.config()).variant(),
        };
        info!(
            service = %service,
            variant = %variant,
            hardware = service.hardware_available(),
            "provider selection"
        );
    }

    // -----------------------------------------------------------------------
    // 4. Known-answer tests
    // -----------------------------------------------------------------------
    let vectors = checks::known_answers()?;
    info!(vectors, "known-answer tests passed");

    // -----------------------------------------------------------------------
    // 5. Parity sweep
    // -----------------------------------------------------------------------
    checks::parity_sweep(cfg.parity_trials, cfg.parity_seed)?;
    info!(
        trials = cfg.parity_trials,
        seed = cfg.parity_seed,
        "parity sweep passed"
    );

    // -----------------------------------------------------------------------
    // 6. CFB concordance
    // -----------------------------------------------------------------------
    checks::cfb_concordance(cfg.parity_trials, cfg.parity_seed)?;

    // -----------------------------------------------------------------------
    // 7. Digest state round trip
    // -----------------------------------------------------------------------
    checks::digest_round_trip(cfg.parity_seed)?;

    info!("selftest complete");
    Ok(())
}
