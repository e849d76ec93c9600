use serde::{Deserialize, Serialize};

// ============================================================================
// Tracking State - storage-agnostic lifecycle label
// ============================================================================
//
// States:
// - New: never persisted, will be inserted
// - Dirty: persisted and modified, will be updated
// - SelfDeleted: removed by its owner, will be deleted with it
// - Deleted: marked for deletion
// - Clean: nothing to flush
//
// Every transition is legal. Each mark_as_* clears the other flags before
// setting its own, so at most one flag is ever set.
//
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Lifecycle {
    New,
    Dirty,
    SelfDeleted,
    Deleted,
    Clean,
}

/// Value snapshot of the four lifecycle flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TrackingState {
    pub is_new: bool,
    pub is_dirty: bool,
    pub is_self_deleted: bool,
    pub is_deleted: bool,
}

impl TrackingState {
    pub fn is_clean(&self) -> bool {
        !(self.is_new || self.is_dirty || self.is_self_deleted || self.is_deleted)
    }

    /// Number of flags set; never more than one for a snapshot taken from
    /// a [`TrackingStateManager`].
    pub fn flags_set(&self) -> usize {
        [self.is_new, self.is_dirty, self.is_self_deleted, self.is_deleted]
            .iter()
            .filter(|flag| **flag)
            .count()
    }
}

impl From<Lifecycle> for TrackingState {
    fn from(lifecycle: Lifecycle) -> Self {
        Self {
            is_new: lifecycle == Lifecycle::New,
            is_dirty: lifecycle == Lifecycle::Dirty,
            is_self_deleted: lifecycle == Lifecycle::SelfDeleted,
            is_deleted: lifecycle == Lifecycle::Deleted,
        }
    }
}

/// Authoritative lifecycle state of one aggregate or entity instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingStateManager {
    lifecycle: Lifecycle,
}

impl Default for TrackingStateManager {
    fn default() -> Self {
        Self::new()
    }
}

impl TrackingStateManager {
    /// Starts as New
    pub fn new() -> Self {
        Self {
            lifecycle: Lifecycle::New,
        }
    }

    /// Starts as Clean, for instances rehydrated from storage
    pub fn clean() -> Self {
        Self {
            lifecycle: Lifecycle::Clean,
        }
    }

    pub fn mark_as_new(&mut self) {
        self.transition(Lifecycle::New);
    }

    pub fn mark_as_dirty(&mut self) {
        self.transition(Lifecycle::Dirty);
    }

    pub fn mark_as_self_deleted(&mut self) {
        self.transition(Lifecycle::SelfDeleted);
    }

    pub fn mark_as_deleted(&mut self) {
        self.transition(Lifecycle::Deleted);
    }

    pub fn mark_as_clean(&mut self) {
        self.transition(Lifecycle::Clean);
    }

    fn transition(&mut self, to: Lifecycle) {
        if self.lifecycle != to {
            tracing::trace!(from = ?self.lifecycle, to = ?to, "Tracking state changed");
        }
        self.lifecycle = to;
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn is_new(&self) -> bool {
        self.lifecycle == Lifecycle::New
    }

    pub fn is_dirty(&self) -> bool {
        self.lifecycle == Lifecycle::Dirty
    }

    pub fn is_self_deleted(&self) -> bool {
        self.lifecycle == Lifecycle::SelfDeleted
    }

    pub fn is_deleted(&self) -> bool {
        self.lifecycle == Lifecycle::Deleted
    }

    pub fn is_clean(&self) -> bool {
        self.lifecycle == Lifecycle::Clean
    }

    pub fn snapshot(&self) -> TrackingState {
        TrackingState::from(self.lifecycle)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_new() {
        let tracking = TrackingStateManager::new();
        assert!(tracking.is_new());
        assert_eq!(
            tracking.snapshot(),
            TrackingState {
                is_new: true,
                ..TrackingState::default()
            }
        );
    }

    #[test]
    fn test_each_mark_sets_exactly_one_flag() {
        let mut tracking = TrackingStateManager::new();

        tracking.mark_as_dirty();
        assert!(tracking.is_dirty());
        assert_eq!(tracking.snapshot().flags_set(), 1);

        tracking.mark_as_self_deleted();
        assert!(tracking.is_self_deleted());
        assert!(!tracking.is_dirty());
        assert_eq!(tracking.snapshot().flags_set(), 1);

        tracking.mark_as_deleted();
        assert!(tracking.is_deleted());
        assert!(!tracking.is_self_deleted());

        tracking.mark_as_new();
        assert!(tracking.is_new());
        assert!(!tracking.is_deleted());
    }

    #[test]
    fn test_new_to_deleted_is_allowed() {
        let mut tracking = TrackingStateManager::new();
        tracking.mark_as_deleted();
        assert_eq!(tracking.lifecycle(), Lifecycle::Deleted);
    }

    #[test]
    fn test_clean_clears_every_flag() {
        let mut tracking = TrackingStateManager::new();
        tracking.mark_as_dirty();
        tracking.mark_as_clean();

        let snapshot = tracking.snapshot();
        assert!(snapshot.is_clean());
        assert_eq!(snapshot.flags_set(), 0);
        assert!(TrackingStateManager::clean().is_clean());
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let mut tracking = TrackingStateManager::new();
        let before = tracking.snapshot();
        tracking.mark_as_dirty();

        assert!(before.is_new);
        assert!(!before.is_dirty);
    }
}
