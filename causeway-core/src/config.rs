//! Propagation Configuration
//!
//! Controls how a revisited node is judged to have settled. Both knobs
//! only affect the consistency check; rollback always restores the full
//! set of variables captured before a node was first touched.
//!
//! # Example
//!
//! ```rust
//! use causeway_core::config::{ComparisonPolicy, PropagationConfig};
//!
//! let config = PropagationConfig::from_json(r#"{ "comparison": "state_only" }"#).unwrap();
//! assert_eq!(config.comparison, ComparisonPolicy::StateOnly);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Which variable partitions take part in the settle check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonPolicy {
    /// Compare state and input variables.
    #[default]
    Full,

    /// Compare state variables alone. Input drift on a revisit is ignored.
    StateOnly,
}

/// Which capture a revisit is compared against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaselinePolicy {
    /// The node's variables before this call first touched it.
    #[default]
    PreTouch,

    /// The node's variables right after its first update in this call.
    /// A cycle settles when the closing edge reproduces what the first
    /// visit produced.
    Settled,
}

/// Configuration for [`CausalGraph`](crate::graph::CausalGraph).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PropagationConfig {
    /// Variable partitions compared on a revisit.
    pub comparison: ComparisonPolicy,

    /// Capture a revisit is compared against.
    pub baseline: BaselinePolicy,
}

impl PropagationConfig {
    /// Parse a configuration from a JSON document. Missing fields take
    /// their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Set the comparison policy.
    pub fn with_comparison(mut self, comparison: ComparisonPolicy) -> Self {
        self.comparison = comparison;
        self
    }

    /// Set the baseline policy.
    pub fn with_baseline(mut self, baseline: BaselinePolicy) -> Self {
        self.baseline = baseline;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GraphError;

    #[test]
    fn defaults_are_strict() {
        let config = PropagationConfig::default();
        assert_eq!(config.comparison, ComparisonPolicy::Full);
        assert_eq!(config.baseline, BaselinePolicy::PreTouch);
    }

    #[test]
    fn parses_partial_documents() {
        let config = PropagationConfig::from_json(r#"{ "baseline": "settled" }"#).unwrap();
        assert_eq!(config.comparison, ComparisonPolicy::Full);
        assert_eq!(config.baseline, BaselinePolicy::Settled);

        let config = PropagationConfig::from_json("{}").unwrap();
        assert_eq!(config, PropagationConfig::default());
    }

    #[test]
    fn rejects_unknown_policy() {
        let err = PropagationConfig::from_json(r#"{ "comparison": "loose" }"#).unwrap_err();
        assert!(matches!(err, GraphError::Config(_)));
    }

    #[test]
    fn builder_overrides() {
        let config = PropagationConfig::default()
            .with_comparison(ComparisonPolicy::StateOnly)
            .with_baseline(BaselinePolicy::Settled);
        assert_eq!(config.comparison, ComparisonPolicy::StateOnly);
        assert_eq!(config.baseline, BaselinePolicy::Settled);
    }
}
