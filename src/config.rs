//! Engine configuration
//!
//! Defaults are compiled in; each field can be overridden from the environment:
//!   H2E_MAX_SWEEP_SAMPLES, H2E_PARALLEL_SWEEP_THRESHOLD, H2E_DISPLAY_DECIMALS,
//!   H2E_CRF_DECIMALS, H2E_CACHE_CAPACITY

use serde::{Deserialize, Serialize};
use std::env;

/// Runtime knobs shared by the sweep runner, cache, and presentation helpers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Upper bound on samples per sweep request
    pub max_sweep_samples: usize,

    /// Sweeps with at least this many samples are evaluated on the rayon pool
    pub parallel_sweep_threshold: usize,

    /// Decimal places for currency values in display copies
    pub display_decimals: u32,

    /// Decimal places for the capital recovery factor in display copies
    pub crf_decimals: u32,

    /// Maximum number of memoized evaluations
    pub cache_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_sweep_samples: 10_000,
            parallel_sweep_threshold: 256,
            display_decimals: 2,
            crf_decimals: 6,
            cache_capacity: 1_024,
        }
    }
}

impl EngineConfig {
    /// Defaults with any `H2E_*` environment overrides applied.
    /// Unparseable values fall back to the default.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            max_sweep_samples: env_or("H2E_MAX_SWEEP_SAMPLES", defaults.max_sweep_samples),
            parallel_sweep_threshold: env_or(
                "H2E_PARALLEL_SWEEP_THRESHOLD",
                defaults.parallel_sweep_threshold,
            ),
            display_decimals: env_or("H2E_DISPLAY_DECIMALS", defaults.display_decimals),
            crf_decimals: env_or("H2E_CRF_DECIMALS", defaults.crf_decimals),
            cache_capacity: env_or("H2E_CACHE_CAPACITY", defaults.cache_capacity),
        }
    }

    /// Override the sweep sample limit
    pub fn with_max_sweep_samples(mut self, max: usize) -> Self {
        self.max_sweep_samples = max;
        self
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}
