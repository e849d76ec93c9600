use crate::rules::{
    registry_for, run_validation, BrokenRule, BrokenRuleCollection, HasBrokenRules, Validatable,
    ValidatorRegistry,
};
use crate::tracking::TrackingStateManager;

// ============================================================================
// Child Entities
// ============================================================================
//
// An entity inside an aggregate boundary. It validates itself the same way
// an aggregate does and keeps its own tracking state, but raises no events;
// its owning aggregate pulls its rules in through `nested_rules`.
//
// ============================================================================

pub struct EntityCore<S: Validatable> {
    validators: ValidatorRegistry<S>,
    broken_rules: BrokenRuleCollection,
    tracking: TrackingStateManager,
}

impl<S: Validatable> EntityCore<S> {
    pub fn new() -> Self {
        Self {
            validators: registry_for::<S>(),
            broken_rules: BrokenRuleCollection::new(),
            tracking: TrackingStateManager::new(),
        }
    }

    pub fn broken_rules(&self) -> &BrokenRuleCollection {
        &self.broken_rules
    }

    pub fn tracking(&self) -> &TrackingStateManager {
        &self.tracking
    }
}

impl<S: Validatable> Default for EntityCore<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Validatable> Clone for EntityCore<S> {
    fn clone(&self) -> Self {
        Self {
            validators: self.validators.clone(),
            broken_rules: self.broken_rules.clone(),
            tracking: self.tracking.clone(),
        }
    }
}

impl<S: Validatable> std::fmt::Debug for EntityCore<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityCore")
            .field("broken_rules", &self.broken_rules)
            .field("tracking", &self.tracking.lifecycle())
            .finish()
    }
}

impl<S: Validatable> HasBrokenRules for EntityCore<S> {
    fn broken_rules(&self) -> &[BrokenRule] {
        self.broken_rules.broken_rules()
    }
}

pub trait Entity: Validatable {
    fn entity(&self) -> &EntityCore<Self>;

    fn entity_mut(&mut self) -> &mut EntityCore<Self>;

    /// Recompute this entity's broken rules
    fn validate(&mut self) -> bool {
        let rules = run_validation(&*self, &self.entity().validators);
        let valid = rules.is_empty();
        self.entity_mut().broken_rules = rules;
        valid
    }

    fn is_valid(&self) -> bool {
        self.entity().broken_rules.is_empty()
    }

    /// Handle for an owner's `nested_rules`
    fn rule_source(&self) -> &dyn HasBrokenRules {
        self.entity()
    }

    fn tracking(&self) -> &TrackingStateManager {
        &self.entity().tracking
    }

    fn tracking_mut(&mut self) -> &mut TrackingStateManager {
        &mut self.entity_mut().tracking
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RuleValidator;

    struct Tag {
        label: String,
        core: EntityCore<Tag>,
    }

    struct LabelRequired;

    impl RuleValidator<Tag> for LabelRequired {
        fn add_rules(&self, subject: &Tag, rules: &mut BrokenRuleCollection) {
            if subject.label.trim().is_empty() {
                rules.add(BrokenRule::error("label", "Label is required"));
            }
        }
    }

    impl Validatable for Tag {
        fn add_validators(registry: &mut ValidatorRegistry<Self>) {
            registry.add(LabelRequired);
        }
    }

    impl Entity for Tag {
        fn entity(&self) -> &EntityCore<Self> {
            &self.core
        }

        fn entity_mut(&mut self) -> &mut EntityCore<Self> {
            &mut self.core
        }
    }

    fn tag(label: &str) -> Tag {
        let mut tag = Tag {
            label: label.to_string(),
            core: EntityCore::new(),
        };
        tag.validate();
        tag
    }

    #[test]
    fn test_entity_validates_with_registered_rules() {
        let mut blank = tag(" ");
        assert!(!blank.is_valid());
        assert_eq!(blank.rule_source().broken_rules()[0].property(), "label");

        blank.label = "urgent".to_string();
        assert!(blank.validate());
        assert!(blank.rule_source().broken_rules().is_empty());
    }

    #[test]
    fn test_entity_rules_roll_up_through_owner() {
        let blank = tag("");
        let rolled = BrokenRuleCollection::collect_from_properties([
            ("tags[0]", Some(blank.rule_source())),
            ("tags[1]", None),
        ]);

        assert_eq!(rolled.len(), 1);
        assert_eq!(rolled[0].property(), "label");
    }

    #[test]
    fn test_entity_tracking_is_independent() {
        let mut entity = tag("a");
        assert!(entity.tracking().is_new());
        entity.tracking_mut().mark_as_self_deleted();
        assert!(entity.tracking().is_self_deleted());
    }
}
