use std::any::{type_name, TypeId};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use super::broken_rule::BrokenRule;
use super::collection::BrokenRuleCollection;

// ============================================================================
// Rule Validators
// ============================================================================
//
// A validator is a stateless strategy over a subject type `S`. The subject
// is handed in at validation time instead of being stored, so the owning
// aggregate can keep the registry as a field and still validate itself.
//
// ============================================================================

/// Business-rule check over a subject of type `S`.
///
/// Implementations only record violations, they never fail for expected
/// business data. Each call starts from an empty accumulator.
pub trait RuleValidator<S: ?Sized>: Send + Sync + 'static {
    /// Record every rule `subject` violates
    fn add_rules(&self, subject: &S, rules: &mut BrokenRuleCollection);

    /// Run the check; an absent subject has no violations
    fn validate(&self, subject: Option<&S>) -> Vec<BrokenRule> {
        let Some(subject) = subject else {
            return Vec::new();
        };

        let mut rules = BrokenRuleCollection::new();
        self.add_rules(subject, &mut rules);
        rules.into_rules()
    }
}

struct RegisteredValidator<S: ?Sized + 'static> {
    type_id: TypeId,
    type_name: &'static str,
    validator: Arc<dyn RuleValidator<S>>,
}

/// Validators for one subject type, at most one per concrete validator type
pub struct ValidatorRegistry<S: ?Sized + 'static> {
    validators: Vec<RegisteredValidator<S>>,
}

impl<S: ?Sized + 'static> Clone for RegisteredValidator<S> {
    fn clone(&self) -> Self {
        Self {
            type_id: self.type_id,
            type_name: self.type_name,
            validator: Arc::clone(&self.validator),
        }
    }
}

impl<S: ?Sized + 'static> Clone for ValidatorRegistry<S> {
    fn clone(&self) -> Self {
        Self {
            validators: self.validators.clone(),
        }
    }
}

impl<S: ?Sized + 'static> Default for ValidatorRegistry<S> {
    fn default() -> Self {
        Self {
            validators: Vec::new(),
        }
    }
}

impl<S: ?Sized + 'static> ValidatorRegistry<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a validator. A second validator of an already registered
    /// type is ignored; returns whether this one was kept.
    pub fn add<V>(&mut self, validator: V) -> bool
    where
        V: RuleValidator<S>,
    {
        let type_id = TypeId::of::<V>();
        if self.validators.iter().any(|entry| entry.type_id == type_id) {
            tracing::trace!(validator = type_name::<V>(), "Validator already registered");
            return false;
        }

        self.validators.push(RegisteredValidator {
            type_id,
            type_name: type_name::<V>(),
            validator: Arc::new(validator),
        });
        true
    }

    pub fn contains<V: RuleValidator<S>>(&self) -> bool {
        let type_id = TypeId::of::<V>();
        self.validators.iter().any(|entry| entry.type_id == type_id)
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    pub fn clear(&mut self) {
        self.validators.clear();
    }

    /// Run every validator against `subject` and merge the results.
    ///
    /// Duplicates across validators are dropped by trimmed, case-insensitive
    /// (property, message); the first occurrence wins.
    pub fn get_broken_rules(&self, subject: Option<&S>) -> Vec<BrokenRule> {
        let mut seen = HashSet::new();
        let mut merged = Vec::new();

        for entry in &self.validators {
            let rules = entry.validator.validate(subject);
            if !rules.is_empty() {
                tracing::trace!(
                    validator = entry.type_name,
                    rule_count = rules.len(),
                    "Validator reported broken rules"
                );
            }

            for rule in rules {
                if seen.insert(rule.normalized_key()) {
                    merged.push(rule);
                }
            }
        }

        merged
    }
}

impl<S: ?Sized + 'static> fmt::Debug for ValidatorRegistry<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.validators.iter().map(|entry| entry.type_name))
            .finish()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    struct Person {
        name: String,
        email: String,
    }

    struct NameRequired;

    impl RuleValidator<Person> for NameRequired {
        fn add_rules(&self, subject: &Person, rules: &mut BrokenRuleCollection) {
            if subject.name.trim().is_empty() {
                rules.add(BrokenRule::error("name", "Name is required"));
            }
        }
    }

    struct ContactRequired {
        message: &'static str,
    }

    impl RuleValidator<Person> for ContactRequired {
        fn add_rules(&self, subject: &Person, rules: &mut BrokenRuleCollection) {
            if subject.email.is_empty() {
                rules.add(BrokenRule::error("email", self.message));
            }
            if subject.name.trim().is_empty() {
                rules.add(BrokenRule::error(" Name ", "name is REQUIRED "));
            }
        }
    }

    fn nameless() -> Person {
        Person {
            name: "  ".to_string(),
            email: String::new(),
        }
    }

    #[test]
    fn test_registry_deduplicates_by_type() {
        let mut registry = ValidatorRegistry::<Person>::new();

        assert!(registry.add(ContactRequired { message: "Email is required" }));
        assert!(!registry.add(ContactRequired { message: "Different message" }));
        assert!(registry.add(NameRequired));

        assert_eq!(registry.len(), 2);
        assert!(registry.contains::<NameRequired>());

        let rules = registry.get_broken_rules(Some(&nameless()));
        assert!(rules.iter().any(|r| r.message() == "Email is required"));
        assert!(!rules.iter().any(|r| r.message() == "Different message"));
    }

    #[test]
    fn test_merge_deduplicates_trimmed_case_insensitive() {
        let mut registry = ValidatorRegistry::<Person>::new();
        registry.add(NameRequired);
        registry.add(ContactRequired { message: "Email is required" });

        let rules = registry.get_broken_rules(Some(&nameless()));

        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].property(), "name");
        assert_eq!(rules[1].property(), "email");
    }

    #[test]
    fn test_absent_subject_yields_no_rules() {
        let mut registry = ValidatorRegistry::<Person>::new();
        registry.add(NameRequired);

        assert!(registry.get_broken_rules(None).is_empty());
    }

    #[test]
    fn test_validation_is_not_incremental() {
        let mut registry = ValidatorRegistry::<Person>::new();
        registry.add(NameRequired);

        let mut person = nameless();
        assert_eq!(registry.get_broken_rules(Some(&person)).len(), 1);

        person.name = "Ada".to_string();
        assert!(registry.get_broken_rules(Some(&person)).is_empty());
    }

    #[test]
    fn test_debug_lists_validator_types() {
        let mut registry = ValidatorRegistry::<Person>::new();
        registry.add(NameRequired);

        assert!(format!("{registry:?}").contains("NameRequired"));
    }

    struct NonBlank;

    impl RuleValidator<str> for NonBlank {
        fn add_rules(&self, subject: &str, rules: &mut BrokenRuleCollection) {
            if subject.trim().is_empty() {
                rules.add(BrokenRule::error("value", "Value cannot be blank"));
            }
        }
    }

    fn rules_for<S: ?Sized + 'static>(registry: &ValidatorRegistry<S>, subject: &S) -> usize {
        registry.get_broken_rules(Some(subject)).len()
    }

    #[test]
    fn test_registry_over_unsized_subject() {
        let mut registry = ValidatorRegistry::<str>::new();
        registry.add(NonBlank);

        assert_eq!(rules_for(&registry, " "), 1);
        assert_eq!(rules_for(&registry, "ok"), 0);
        assert_eq!(registry.clone().len(), 1);
    }
}
