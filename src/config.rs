use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

// ============================================================================
// Runtime Configuration
// ============================================================================
//
// Conventions an aggregate is created with. Defaults match the common
// case; named constructors cover the alternatives.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Version of an aggregate that has not applied any event
    pub initial_version: i64,
    /// Move a freshly constructed aggregate from New to Dirty when it has
    /// broken rules
    pub mark_dirty_on_invalid: bool,
    /// Recompute broken rules once history has been replayed
    pub revalidate_after_replay: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            initial_version: 0,
            mark_dirty_on_invalid: true,
            revalidate_after_replay: true,
        }
    }
}

impl RuntimeConfig {
    /// Versions start at -1, so the first event gets sequence number 0
    pub fn unversioned() -> Self {
        Self {
            initial_version: -1,
            ..Self::default()
        }
    }

    /// Leave tracking state and broken rules alone apart from explicit calls
    pub fn passive() -> Self {
        Self {
            mark_dirty_on_invalid: false,
            revalidate_after_replay: false,
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> DomainResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| DomainError::invalid_format("runtime config", e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RuntimeConfig::default();
        assert_eq!(config.initial_version, 0);
        assert!(config.mark_dirty_on_invalid);
        assert!(config.revalidate_after_replay);
    }

    #[test]
    fn test_named_configs() {
        assert_eq!(RuntimeConfig::unversioned().initial_version, -1);
        assert!(!RuntimeConfig::passive().mark_dirty_on_invalid);
    }

    #[test]
    fn test_from_json_fills_missing_fields() {
        let config = RuntimeConfig::from_json(r#"{ "initial_version": -1 }"#).unwrap();
        assert_eq!(config.initial_version, -1);
        assert!(config.mark_dirty_on_invalid);
    }

    #[test]
    fn test_from_json_rejects_malformed_input() {
        let result = RuntimeConfig::from_json("initial_version = 3");
        assert!(matches!(result, Err(DomainError::InvalidFormat { .. })));
    }
}
