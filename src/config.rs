//! Engine configuration.
//!
//! Bounds that keep the engine away from the two explosion points: the
//! full period×teacher×room×course variable space, and the permutation
//! count of mandatory-group candidate placements.

use serde::Deserialize;

/// Engine limits and solver read-back settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum P·T·R·C decision variables a model may have.
    pub max_variables: usize,
    /// Maximum realizable candidate placements per mandatory group.
    pub max_group_candidates: usize,
    /// Solver values strictly above this are read as `true`.
    pub assignment_threshold: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_variables: 2_000_000,
            max_group_candidates: 100_000,
            assignment_threshold: 0.5,
        }
    }
}

impl EngineConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the variable-space bound.
    pub fn with_max_variables(mut self, max: usize) -> Self {
        self.max_variables = max;
        self
    }

    /// Sets the per-group candidate bound.
    pub fn with_max_group_candidates(mut self, max: usize) -> Self {
        self.max_group_candidates = max;
        self
    }

    /// Sets the true/false read-back threshold.
    pub fn with_assignment_threshold(mut self, threshold: f64) -> Self {
        self.assignment_threshold = threshold;
        self
    }

    /// Parses a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(source)
    }
}
