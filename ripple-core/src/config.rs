//! Manager configuration.

use crate::error::EffectError;
use crate::phase::PhaseOrder;
use serde::{Deserialize, Serialize};

/// Whether protocol contracts are checked at runtime.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strictness {
    /// Protocol violations return [`EffectError::Protocol`].
    Strict,
    /// Protocol checks are skipped. The caller is trusted.
    Lenient,
}

impl Strictness {
    /// `Strict` with debug assertions enabled, `Lenient` otherwise.
    pub const fn from_build() -> Self {
        if cfg!(debug_assertions) {
            Self::Strict
        } else {
            Self::Lenient
        }
    }

    /// Whether contracts are checked.
    pub const fn is_strict(self) -> bool {
        matches!(self, Self::Strict)
    }
}

impl Default for Strictness {
    fn default() -> Self {
        Self::from_build()
    }
}

/// Static configuration for an effect manager.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// Runtime contract checking.
    pub strictness: Strictness,
    /// Phases, in flush order.
    pub phases: PhaseOrder,
}

impl ManagerConfig {
    /// Parse a config from JSON. Missing fields take their defaults.
    ///
    /// ```
    /// use ripple_core::{ManagerConfig, Strictness};
    ///
    /// let cfg = ManagerConfig::from_json(r#"{"strictness":"lenient","phases":["layout","paint"]}"#).unwrap();
    /// assert_eq!(cfg.strictness, Strictness::Lenient);
    /// assert_eq!(cfg.phases.len(), 2);
    /// ```
    pub fn from_json(json: &str) -> Result<Self, EffectError> {
        serde_json::from_str(json).map_err(|e| EffectError::Config(e.to_string()))
    }

    /// Replace the strictness.
    pub fn with_strictness(mut self, strictness: Strictness) -> Self {
        self.strictness = strictness;
        self
    }

    /// Replace the phase order.
    pub fn with_phases(mut self, phases: PhaseOrder) -> Self {
        self.phases = phases;
        self
    }
}
