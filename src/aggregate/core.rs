use std::fmt;

use crate::config::RuntimeConfig;
use crate::event_sourcing::DomainEventManager;
use crate::rules::{BrokenRuleCollection, ValidatorRegistry};
use crate::tracking::TrackingStateManager;
use crate::values::AggregateId;

use super::root::AggregateRoot;

// ============================================================================
// Aggregate Core - the managers one aggregate instance owns
// ============================================================================
//
// Nothing in here is shared between instances.
//
// ============================================================================

pub struct AggregateCore<A: AggregateRoot> {
    pub(crate) id: AggregateId,
    pub(crate) config: RuntimeConfig,
    pub(crate) broken_rules: BrokenRuleCollection,
    pub(crate) validators: ValidatorRegistry<A>,
    pub(crate) tracking: TrackingStateManager,
    pub(crate) events: DomainEventManager<A::Event>,
}

impl<A: AggregateRoot> AggregateCore<A> {
    /// Core for an aggregate that has never been persisted (tracking: New)
    pub fn new(id: AggregateId, config: RuntimeConfig) -> Self {
        Self {
            id,
            events: DomainEventManager::new(config.initial_version),
            config,
            broken_rules: BrokenRuleCollection::new(),
            validators: ValidatorRegistry::new(),
            tracking: TrackingStateManager::new(),
        }
    }

    /// Core for an aggregate about to be rebuilt from storage (tracking: Clean)
    pub fn existing(id: AggregateId, config: RuntimeConfig) -> Self {
        Self {
            tracking: TrackingStateManager::clean(),
            ..Self::new(id, config)
        }
    }

    pub fn id(&self) -> AggregateId {
        self.id
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn broken_rules(&self) -> &BrokenRuleCollection {
        &self.broken_rules
    }

    pub fn validators(&self) -> &ValidatorRegistry<A> {
        &self.validators
    }

    pub fn tracking(&self) -> &TrackingStateManager {
        &self.tracking
    }

    pub fn tracking_mut(&mut self) -> &mut TrackingStateManager {
        &mut self.tracking
    }

    pub fn events(&self) -> &DomainEventManager<A::Event> {
        &self.events
    }
}

impl<A: AggregateRoot> Clone for AggregateCore<A> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            config: self.config.clone(),
            broken_rules: self.broken_rules.clone(),
            validators: self.validators.clone(),
            tracking: self.tracking.clone(),
            events: self.events.clone(),
        }
    }
}

impl<A: AggregateRoot> fmt::Debug for AggregateCore<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AggregateCore")
            .field("id", &self.id)
            .field("version", &self.events.version())
            .field("tracking", &self.tracking.lifecycle())
            .field("broken_rules", &self.broken_rules)
            .field("validators", &self.validators)
            .field("uncommitted", &self.events.uncommitted_changes().len())
            .finish()
    }
}
