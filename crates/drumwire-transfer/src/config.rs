//! # Runtime configuration
//!
//! Inter-slot delays are product tuning, not protocol constants: the device
//! needs breathing room between dumps, and how much depends on firmware and
//! on whether turbo negotiation succeeded. They load from TOML alongside the
//! rest of the application configuration and default to the values the
//! hardware ships happiest with.

use std::time::Duration;

use serde::{Deserialize, Serialize};

// ─── Pacing ─────────────────────────────────────────────────────────────────

/// Tunable delays between consecutive slots of one operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    /// Base delay between slots at normal link speed (ms).
    pub inter_slot_delay_ms: u64,
    /// User-configured extra on top of the base delay (ms).
    pub extra_inter_slot_delay_ms: u64,
    /// Delay between slots when turbo is negotiated (ms).
    pub turbo_inter_slot_delay_ms: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        PacingConfig {
            inter_slot_delay_ms: 45,
            extra_inter_slot_delay_ms: 0,
            turbo_inter_slot_delay_ms: 5,
        }
    }
}

impl PacingConfig {
    /// Effective pause before the next slot for the given (sanitized) turbo
    /// factor.
    pub fn inter_slot_delay(&self, turbo_factor: f64) -> Duration {
        if turbo_factor > 1.0 {
            Duration::from_millis(self.turbo_inter_slot_delay_ms)
        } else {
            Duration::from_millis(self.inter_slot_delay_ms + self.extra_inter_slot_delay_ms)
        }
    }
}

// ─── Top-level config ───────────────────────────────────────────────────────

/// Transfer-engine section of the application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferConfig {
    pub pacing: PacingConfig,
}

impl TransferConfig {
    /// Parse from a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }
}
