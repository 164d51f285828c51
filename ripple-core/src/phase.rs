//! Phases: named buckets of effects, flushed in a fixed order.

use crate::error::EffectError;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// A named scheduling bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Phase(Cow<'static, str>);

impl Phase {
    /// The layout phase, the only phase in the default order.
    pub const LAYOUT: Phase = Phase::from_static("layout");

    /// Create a phase from a static name.
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    /// Create a phase from any string.
    pub fn new(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    /// The phase name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Phase {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Phase {
    fn from(s: String) -> Self {
        Self(Cow::Owned(s))
    }
}

impl AsRef<str> for Phase {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Ordered, duplicate-free, non-empty list of phases.
///
/// A commit flushes phases strictly in this order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Phase>", into = "Vec<Phase>")]
pub struct PhaseOrder {
    phases: Vec<Phase>,
}

impl PhaseOrder {
    /// Build an order from phases listed first-to-last.
    pub fn new<I, P>(phases: I) -> Result<Self, EffectError>
    where
        I: IntoIterator<Item = P>,
        P: Into<Phase>,
    {
        let phases: Vec<Phase> = phases.into_iter().map(Into::into).collect();
        if phases.is_empty() {
            return Err(EffectError::Config("phase order must not be empty".into()));
        }
        for (i, phase) in phases.iter().enumerate() {
            if phase.as_str().is_empty() {
                return Err(EffectError::Config("phase names must not be empty".into()));
            }
            if phases[..i].contains(phase) {
                return Err(EffectError::Config(format!("duplicate phase: {phase}")));
            }
        }
        Ok(Self { phases })
    }

    /// Position of a phase in the order.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.phases.iter().position(|p| p.as_str() == name)
    }

    /// Whether the order contains a phase.
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Iterate phases in flush order.
    pub fn iter(&self) -> std::slice::Iter<'_, Phase> {
        self.phases.iter()
    }

    /// Number of phases.
    pub fn len(&self) -> usize {
        self.phases.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }
}

impl Default for PhaseOrder {
    fn default() -> Self {
        Self {
            phases: vec![Phase::LAYOUT],
        }
    }
}

impl TryFrom<Vec<Phase>> for PhaseOrder {
    type Error = EffectError;

    fn try_from(phases: Vec<Phase>) -> Result<Self, Self::Error> {
        Self::new(phases)
    }
}

impl From<PhaseOrder> for Vec<Phase> {
    fn from(order: PhaseOrder) -> Self {
        order.phases
    }
}

impl<'a> IntoIterator for &'a PhaseOrder {
    type Item = &'a Phase;
    type IntoIter = std::slice::Iter<'a, Phase>;

    fn into_iter(self) -> Self::IntoIter {
        self.phases.iter()
    }
}
