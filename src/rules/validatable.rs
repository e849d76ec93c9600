use super::collection::{BrokenRuleCollection, HasBrokenRules};
use super::validator::ValidatorRegistry;

// ============================================================================
// Validation Pass - shared by aggregates, entities and value objects
// ============================================================================
//
// Order of one pass:
// 1. guard      structural checks
// 2. registry   business validators
// 3. nested     rules pulled up from declared sub-objects
//
// A pass always builds a fresh collection. It is never incremental.
//
// ============================================================================

pub trait Validatable: Sized + 'static {
    /// Structural checks, recorded as broken rules rather than raised
    fn guard(&self, _rules: &mut BrokenRuleCollection) {}

    /// Register this type's business validators
    fn add_validators(_registry: &mut ValidatorRegistry<Self>) {}

    /// Sub-objects whose rules are pulled into this object's collection,
    /// each with the name of the property holding it.
    fn nested_rules(&self) -> Vec<(&'static str, Option<&dyn HasBrokenRules>)> {
        Vec::new()
    }

    /// Short type name used in logs and error messages, without module
    /// path or generic arguments
    fn type_name() -> &'static str {
        let full = std::any::type_name::<Self>();
        let base = full.split('<').next().unwrap_or(full);
        base.rsplit("::").next().unwrap_or(base)
    }
}

/// Build a registry holding `S`'s validators
pub fn registry_for<S: Validatable>() -> ValidatorRegistry<S> {
    let mut registry = ValidatorRegistry::new();
    S::add_validators(&mut registry);
    registry
}

/// Run one complete validation pass over `subject`
pub fn run_validation<S: Validatable>(
    subject: &S,
    registry: &ValidatorRegistry<S>,
) -> BrokenRuleCollection {
    let mut rules = BrokenRuleCollection::new();

    subject.guard(&mut rules);
    rules.add_range(registry.get_broken_rules(Some(subject)));
    rules.add_range(BrokenRuleCollection::collect_from_properties(
        subject.nested_rules(),
    ));

    rules
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{BrokenRule, RuleValidator};

    struct Wheel {
        rules: BrokenRuleCollection,
    }

    struct Car {
        vin: String,
        seats: u8,
        front: Option<Wheel>,
        back: Option<Wheel>,
    }

    struct SeatsRequired;

    impl RuleValidator<Car> for SeatsRequired {
        fn add_rules(&self, subject: &Car, rules: &mut BrokenRuleCollection) {
            if subject.seats == 0 {
                rules.add(BrokenRule::error("seats", "A car needs seats"));
            }
        }
    }

    impl Validatable for Car {
        fn guard(&self, rules: &mut BrokenRuleCollection) {
            if self.vin.is_empty() {
                rules.add(BrokenRule::error("vin", "VIN is required"));
            }
        }

        fn add_validators(registry: &mut ValidatorRegistry<Self>) {
            registry.add(SeatsRequired);
        }

        fn nested_rules(&self) -> Vec<(&'static str, Option<&dyn HasBrokenRules>)> {
            vec![
                ("front", self.front.as_ref().map(|w| &w.rules as &dyn HasBrokenRules)),
                ("back", self.back.as_ref().map(|w| &w.rules as &dyn HasBrokenRules)),
            ]
        }
    }

    #[test]
    fn test_pass_runs_guard_validators_and_nested_in_order() {
        let mut flat = BrokenRuleCollection::new();
        flat.add(BrokenRule::error("pressure", "Tyre is flat"));

        let car = Car {
            vin: String::new(),
            seats: 0,
            front: Some(Wheel { rules: flat }),
            back: None,
        };

        let registry = registry_for::<Car>();
        let rules = run_validation(&car, &registry);

        let properties: Vec<&str> = rules.iter().map(BrokenRule::property).collect();
        assert_eq!(properties, vec!["vin", "seats", "pressure"]);
    }

    #[test]
    fn test_valid_subject_has_empty_collection() {
        let car = Car {
            vin: "WVW123".to_string(),
            seats: 4,
            front: None,
            back: None,
        };

        assert!(run_validation(&car, &registry_for::<Car>()).is_empty());
        assert_eq!(Car::type_name(), "Car");
    }

    #[allow(dead_code)]
    struct Garage<T>(Vec<T>);

    impl<T: 'static> Validatable for Garage<T> {}

    #[test]
    fn test_type_name_drops_generic_arguments() {
        assert_eq!(Garage::<Car>::type_name(), "Garage");
        assert_eq!(Garage::<Option<std::string::String>>::type_name(), "Garage");
    }
}
