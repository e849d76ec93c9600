use crate::rules::BrokenRuleCollection;

// ============================================================================
// Domain Runtime Errors
// ============================================================================
//
// Structural failures (absent arguments, missing handlers, misconfigured
// transition graphs) are raised immediately. Business-rule failures are
// recorded as BrokenRules and only surface as an error when an object must
// not exist in an invalid state.
//
// ============================================================================

#[derive(Debug, Clone, thiserror::Error)]
pub enum DomainError {
    #[error("Argument cannot be null or empty: {argument}")]
    ArgumentNull { argument: &'static str },

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Invalid format for {kind}: {value}")]
    InvalidFormat { kind: &'static str, value: String },

    #[error("{type_name} has broken rules:\n{rules}")]
    BrokenRules {
        type_name: String,
        rules: BrokenRuleCollection,
    },
}

pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    pub fn argument_null(argument: &'static str) -> Self {
        Self::ArgumentNull { argument }
    }

    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation(message.into())
    }

    pub fn invalid_format(kind: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidFormat {
            kind,
            value: value.into(),
        }
    }

    /// An aggregate received an event variant it has no handler for
    pub fn missing_handler(aggregate_type: &str, event_type: &str) -> Self {
        Self::InvalidOperation(format!(
            "{aggregate_type} has no handler for event apply{event_type}"
        ))
    }

    /// Transition lookup for a state that has no entry in the graph
    pub fn no_transitions_defined(state: impl std::fmt::Debug) -> Self {
        Self::InvalidOperation(format!("No transitions defined for state {state:?}"))
    }

    pub fn invalid_transition(from: impl std::fmt::Debug, to: impl std::fmt::Debug) -> Self {
        Self::InvalidStateTransition {
            from: format!("{from:?}"),
            to: format!("{to:?}"),
        }
    }

    pub fn broken_rules(type_name: impl Into<String>, rules: BrokenRuleCollection) -> Self {
        Self::BrokenRules {
            type_name: type_name.into(),
            rules,
        }
    }

    pub fn is_broken_rules(&self) -> bool {
        matches!(self, DomainError::BrokenRules { .. })
    }
}
