// ============================================================================
// Business Rules - violations, their collection, and the validators
// that produce them
// ============================================================================
//
// Deduplication happens at two levels:
// - the registry keeps one validator per concrete type
// - the collection keeps one rule per (property, message) identity
//
// ============================================================================

pub mod broken_rule;
pub mod collection;
pub mod validatable;
pub mod validator;

pub use broken_rule::{BrokenRule, Severity};
pub use collection::{BrokenRuleCollection, HasBrokenRules};
pub use validatable::{registry_for, run_validation, Validatable};
pub use validator::{RuleValidator, ValidatorRegistry};
