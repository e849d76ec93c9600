use crate::error::{DomainError, DomainResult};
use crate::rules::{registry_for, run_validation, Validatable};

// ============================================================================
// Value Objects
// ============================================================================
//
// A value object never exists in an invalid state: construction runs the
// full validation pass and fails with every broken rule at once.
//
// ============================================================================

pub trait ValueObject: Validatable {
    /// Return `self` if it satisfies all rules, or a `BrokenRules` error
    /// listing each violation.
    fn validated(self) -> DomainResult<Self> {
        let rules = run_validation(&self, &registry_for::<Self>());
        if rules.is_empty() {
            return Ok(self);
        }

        tracing::debug!(
            value_object = Self::type_name(),
            rule_count = rules.len(),
            "Rejected invalid value object"
        );
        Err(DomainError::broken_rules(Self::type_name(), rules))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{BrokenRule, BrokenRuleCollection, RuleValidator, ValidatorRegistry};

    #[derive(Debug)]
    struct Percentage(i32);

    struct WithinRange;

    impl RuleValidator<Percentage> for WithinRange {
        fn add_rules(&self, subject: &Percentage, rules: &mut BrokenRuleCollection) {
            if !(0..=100).contains(&subject.0) {
                rules.add(BrokenRule::error("value", "Percentage must be between 0 and 100"));
            }
        }
    }

    impl Validatable for Percentage {
        fn add_validators(registry: &mut ValidatorRegistry<Self>) {
            registry.add(WithinRange);
        }
    }

    impl ValueObject for Percentage {}

    #[test]
    fn test_valid_value_is_returned() {
        assert_eq!(Percentage(42).validated().unwrap().0, 42);
    }

    #[test]
    fn test_invalid_value_fails_with_rendered_rules() {
        let error = Percentage(140).validated().unwrap_err();

        assert!(error.is_broken_rules());
        let message = error.to_string();
        assert!(message.contains("Percentage"));
        assert!(message.contains("value"));
        assert!(message.contains("Percentage must be between 0 and 100"));
    }
}
