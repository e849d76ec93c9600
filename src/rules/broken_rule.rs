use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{DomainError, DomainResult};

// ============================================================================
// Broken Rule - a single recorded business-rule violation
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Severity {
    #[default]
    Error,
    Warning,
}

/// Immutable violation descriptor.
///
/// Two rules describe the same violation when their property and message
/// match case-insensitively. Severity is not part of that identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrokenRule {
    property: String,
    message: String,
    severity: Severity,
}

impl BrokenRule {
    pub fn new(property: impl Into<String>, message: impl Into<String>, severity: Severity) -> Self {
        Self {
            property: property.into(),
            message: message.into(),
            severity,
        }
    }

    /// Shorthand for an `Error` severity rule
    pub fn error(property: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(property, message, Severity::Error)
    }

    pub fn warning(property: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(property, message, Severity::Warning)
    }

    /// Like [`BrokenRule::new`], but rejects a blank property or message
    pub fn try_new(
        property: impl Into<String>,
        message: impl Into<String>,
        severity: Severity,
    ) -> DomainResult<Self> {
        let property = property.into();
        let message = message.into();

        if property.trim().is_empty() {
            return Err(DomainError::argument_null("property"));
        }
        if message.trim().is_empty() {
            return Err(DomainError::argument_null("message"));
        }

        Ok(Self::new(property, message, severity))
    }

    pub fn property(&self) -> &str {
        &self.property
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Case-insensitive (property, message) comparison
    pub fn same_identity(&self, other: &BrokenRule) -> bool {
        self.property.to_lowercase() == other.property.to_lowercase()
            && self.message.to_lowercase() == other.message.to_lowercase()
    }

    /// Trimmed, lower-cased (property, message) key used when merging
    /// output from several validators.
    pub fn normalized_key(&self) -> (String, String) {
        (
            self.property.trim().to_lowercase(),
            self.message.trim().to_lowercase(),
        )
    }
}

impl fmt::Display for BrokenRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Property: {}, Message: {}", self.property, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_ignores_case_and_severity() {
        let a = BrokenRule::new("name", "Name is required", Severity::Error);
        let b = BrokenRule::new("NAME", "name is required", Severity::Warning);

        assert!(a.same_identity(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn test_identity_does_not_trim() {
        let a = BrokenRule::error("name", "Name is required");
        let b = BrokenRule::error(" name ", "Name is required");

        assert!(!a.same_identity(&b));
        assert_eq!(a.normalized_key(), b.normalized_key());
    }

    #[test]
    fn test_try_new_rejects_blank_parts() {
        assert!(matches!(
            BrokenRule::try_new("  ", "msg", Severity::Error),
            Err(DomainError::ArgumentNull { argument: "property" })
        ));
        assert!(matches!(
            BrokenRule::try_new("prop", "", Severity::Error),
            Err(DomainError::ArgumentNull { argument: "message" })
        ));
        assert!(BrokenRule::try_new("prop", "msg", Severity::Warning).is_ok());
    }

    #[test]
    fn test_display_format() {
        let rule = BrokenRule::error("quantity", "Quantity must be positive");
        assert_eq!(rule.to_string(), "Property: quantity, Message: Quantity must be positive");
    }

    #[test]
    fn test_severity_serialization() {
        let rule = BrokenRule::warning("notes", "Notes are long");
        let json = serde_json::to_string(&rule).unwrap();
        let deserialized: BrokenRule = serde_json::from_str(&json).unwrap();

        assert_eq!(rule, deserialized);
        assert!(!deserialized.is_error());
    }
}
