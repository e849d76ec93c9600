use serde::{Deserialize, Serialize};
use std::fmt;

use super::broken_rule::BrokenRule;

// ============================================================================
// Broken Rule Collection
// ============================================================================
//
// Order-preserving set of violations. No two entries share the same
// case-insensitive (property, message) identity.
//
// ============================================================================

/// Capability for objects whose violations a parent pulls up into its own
/// collection during validation.
pub trait HasBrokenRules {
    fn broken_rules(&self) -> &[BrokenRule];
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BrokenRuleCollection {
    rules: Vec<BrokenRule>,
}

impl BrokenRuleCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule unless one with the same identity is already present.
    /// Returns whether the rule was added.
    pub fn add(&mut self, rule: BrokenRule) -> bool {
        if self.contains(&rule) {
            return false;
        }
        self.rules.push(rule);
        true
    }

    pub fn add_range<I>(&mut self, rules: I)
    where
        I: IntoIterator<Item = BrokenRule>,
    {
        for rule in rules {
            self.add(rule);
        }
    }

    /// Remove the first entry sharing `rule`'s identity. Returns whether
    /// anything was removed.
    pub fn remove(&mut self, rule: &BrokenRule) -> bool {
        match self.rules.iter().position(|existing| existing.same_identity(rule)) {
            Some(index) => {
                self.rules.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.rules.clear();
    }

    pub fn contains(&self, rule: &BrokenRule) -> bool {
        self.rules.iter().any(|existing| existing.same_identity(rule))
    }

    /// Snapshot of the current rules; changes to it never reach the collection
    pub fn get_all(&self) -> Vec<BrokenRule> {
        self.rules.clone()
    }

    pub fn into_rules(self) -> Vec<BrokenRule> {
        self.rules
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BrokenRule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.rules.iter().any(BrokenRule::is_error)
    }

    /// One `Property: .., Message: ..` line per rule, empty when valid
    pub fn as_string(&self) -> String {
        self.rules
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Pull the current rules out of a parent's named sub-objects.
    ///
    /// Absent sub-objects are skipped, as are sub-objects with no rules.
    pub fn collect_from_properties<'a, I>(properties: I) -> Vec<BrokenRule>
    where
        I: IntoIterator<Item = (&'static str, Option<&'a dyn HasBrokenRules>)>,
    {
        let mut collected = Vec::new();

        for (name, value) in properties {
            let Some(value) = value else {
                tracing::trace!(property = name, "Skipping absent nested property");
                continue;
            };

            let rules = value.broken_rules();
            if rules.is_empty() {
                continue;
            }

            tracing::trace!(
                property = name,
                rule_count = rules.len(),
                "Pulling broken rules from nested property"
            );
            collected.extend(rules.iter().cloned());
        }

        collected
    }
}

impl HasBrokenRules for BrokenRuleCollection {
    fn broken_rules(&self) -> &[BrokenRule] {
        &self.rules
    }
}

impl fmt::Display for BrokenRuleCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_string())
    }
}

impl FromIterator<BrokenRule> for BrokenRuleCollection {
    fn from_iter<T: IntoIterator<Item = BrokenRule>>(iter: T) -> Self {
        let mut collection = Self::new();
        collection.add_range(iter);
        collection
    }
}

impl<'a> IntoIterator for &'a BrokenRuleCollection {
    type Item = &'a BrokenRule;
    type IntoIter = std::slice::Iter<'a, BrokenRule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
