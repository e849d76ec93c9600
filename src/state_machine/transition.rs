use std::fmt;

use crate::error::{DomainError, DomainResult};

// ============================================================================
// State Transition Manager - caller-configured finite state machine
// ============================================================================
//
// The graph is an adjacency list: each source state maps to a non-empty
// list of permitted next states. A state that only ever appears as a
// target is terminal. A state with no entry at all is a lookup error,
// not a terminal state.
//
// States are compared with `PartialEq` unless a different equality is
// installed with `with_equality`.
//
// ============================================================================

pub type StateEquality<S> = fn(&S, &S) -> bool;

pub struct StateTransitionManager<S> {
    graph: Vec<(S, Vec<S>)>,
    equals: StateEquality<S>,
}

/// Outcome of [`StateTransitionManager::validate_transition_graph`].
/// Warnings are informational: intentional terminal states show up here.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionGraphReport<S> {
    pub terminal_states: Vec<S>,
    pub warnings: Vec<String>,
}

impl<S> TransitionGraphReport<S> {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

impl<S: Clone + fmt::Debug + PartialEq> Default for StateTransitionManager<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Clone + fmt::Debug + PartialEq> StateTransitionManager<S> {
    pub fn new() -> Self {
        Self::with_equality(|a, b| a == b)
    }

    /// Build a manager and define its graph in one step
    pub fn with_transitions<I, T>(graph: I) -> DomainResult<Self>
    where
        I: IntoIterator<Item = (S, T)>,
        T: IntoIterator<Item = S>,
    {
        let mut manager = Self::new();
        manager.define_transitions(graph)?;
        Ok(manager)
    }
}

impl<S: Clone + fmt::Debug> StateTransitionManager<S> {
    /// Empty manager comparing states with `equals`
    pub fn with_equality(equals: StateEquality<S>) -> Self {
        Self {
            graph: Vec::new(),
            equals,
        }
    }

    /// Replace the whole graph.
    ///
    /// The graph is validated completely before anything is replaced, so a
    /// rejected graph leaves the previous one in place.
    pub fn define_transitions<I, T>(&mut self, graph: I) -> DomainResult<()>
    where
        I: IntoIterator<Item = (S, T)>,
        T: IntoIterator<Item = S>,
    {
        let mut validated: Vec<(S, Vec<S>)> = Vec::new();

        for (source, targets) in graph {
            if validated.iter().any(|(existing, _)| (self.equals)(existing, &source)) {
                return Err(DomainError::invalid_operation(format!(
                    "Transitions for state {source:?} are defined more than once"
                )));
            }

            let mut permitted: Vec<S> = Vec::new();
            for target in targets {
                if !permitted.iter().any(|existing| (self.equals)(existing, &target)) {
                    permitted.push(target);
                }
            }

            if permitted.is_empty() {
                return Err(DomainError::invalid_operation(format!(
                    "Target states for {source:?} are empty; omit the entry instead"
                )));
            }

            validated.push((source, permitted));
        }

        if validated.is_empty() {
            return Err(DomainError::argument_null("graph"));
        }

        tracing::debug!(source_states = validated.len(), "Transition graph defined");
        self.graph = validated;
        Ok(())
    }

    fn targets_of(&self, state: &S) -> Option<&[S]> {
        self.graph
            .iter()
            .find(|(source, _)| (self.equals)(source, state))
            .map(|(_, targets)| targets.as_slice())
    }

    /// Whether `next` is a permitted successor of `current`.
    ///
    /// Fails when `current` has no entry in the graph.
    pub fn can_transition_to(&self, current: &S, next: &S) -> DomainResult<bool> {
        let targets = self
            .targets_of(current)
            .ok_or_else(|| DomainError::no_transitions_defined(current))?;

        Ok(targets.iter().any(|target| (self.equals)(target, next)))
    }

    /// Like [`can_transition_to`](Self::can_transition_to), but a forbidden
    /// move is an `InvalidStateTransition` error.
    pub fn validate_transition(&self, current: &S, next: &S) -> DomainResult<()> {
        if self.can_transition_to(current, next)? {
            Ok(())
        } else {
            Err(DomainError::invalid_transition(current, next))
        }
    }

    pub fn get_valid_transitions(&self, state: &S) -> Vec<S> {
        self.targets_of(state).map(<[S]>::to_vec).unwrap_or_default()
    }

    pub fn has_transitions_defined(&self, state: &S) -> bool {
        self.targets_of(state).is_some()
    }

    /// Every state mentioned by the graph, sources first, in definition order
    pub fn get_all_states(&self) -> Vec<S> {
        let mut states: Vec<S> = Vec::new();

        let mentioned = self
            .graph
            .iter()
            .map(|(source, _)| source)
            .chain(self.graph.iter().flat_map(|(_, targets)| targets.iter()));

        for state in mentioned {
            if !states.iter().any(|existing| (self.equals)(existing, state)) {
                states.push(state.clone());
            }
        }

        states
    }

    /// Flag states that can be entered but never left
    pub fn validate_transition_graph(&self) -> TransitionGraphReport<S> {
        let mut report = TransitionGraphReport {
            terminal_states: Vec::new(),
            warnings: Vec::new(),
        };

        if self.graph.is_empty() {
            report
                .warnings
                .push("No transitions have been defined".to_string());
        }

        for state in self.get_all_states() {
            if self.has_transitions_defined(&state) {
                continue;
            }

            let warning = format!("State {state:?} has no outgoing transitions");
            tracing::warn!(state = ?state, "Transition graph has a terminal state");
            report.warnings.push(warning);
            report.terminal_states.push(state);
        }

        report
    }
}

impl<S: fmt::Debug> fmt::Debug for StateTransitionManager<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateTransitionManager")
            .field("graph", &self.graph)
            .finish()
    }
}

impl<S: Clone> Clone for StateTransitionManager<S> {
    fn clone(&self) -> Self {
        Self {
            graph: self.graph.clone(),
            equals: self.equals,
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum Status {
        Draft,
        Confirmed,
        Shipped,
        Cancelled,
    }

    fn order_graph() -> StateTransitionManager<Status> {
        StateTransitionManager::with_transitions(vec![
            (Status::Draft, vec![Status::Confirmed, Status::Cancelled]),
            (Status::Confirmed, vec![Status::Shipped]),
        ])
        .unwrap()
    }

    #[test]
    fn test_can_transition_to_follows_graph() {
        let manager = order_graph();

        assert!(manager.can_transition_to(&Status::Draft, &Status::Confirmed).unwrap());
        assert!(manager.can_transition_to(&Status::Draft, &Status::Cancelled).unwrap());
        assert!(!manager.can_transition_to(&Status::Draft, &Status::Shipped).unwrap());
        assert!(manager.can_transition_to(&Status::Confirmed, &Status::Shipped).unwrap());
    }

    #[test]
    fn test_state_without_entry_is_an_error() {
        let manager = order_graph();

        let result = manager.can_transition_to(&Status::Shipped, &Status::Draft);
        assert!(matches!(result, Err(DomainError::InvalidOperation(_))));
        assert!(result.unwrap_err().to_string().contains("No transitions defined"));
    }

    #[test]
    fn test_validate_transition_error_kinds() {
        let manager = order_graph();

        assert!(manager.validate_transition(&Status::Draft, &Status::Confirmed).is_ok());
        assert!(matches!(
            manager.validate_transition(&Status::Draft, &Status::Shipped),
            Err(DomainError::InvalidStateTransition { .. })
        ));
        assert!(matches!(
            manager.validate_transition(&Status::Cancelled, &Status::Draft),
            Err(DomainError::InvalidOperation(_))
        ));
    }

    #[test]
    fn test_define_rejects_empty_graph() {
        let mut manager = StateTransitionManager::<Status>::new();
        let result = manager.define_transitions(Vec::<(Status, Vec<Status>)>::new());

        assert!(matches!(result, Err(DomainError::ArgumentNull { argument: "graph" })));
    }

    #[test]
    fn test_define_rejects_empty_target_set_and_keeps_old_graph() {
        let mut manager = order_graph();

        let result = manager.define_transitions(vec![
            (Status::Draft, vec![Status::Confirmed]),
            (Status::Shipped, vec![]),
        ]);

        assert!(matches!(result, Err(DomainError::InvalidOperation(_))));
        assert!(manager.can_transition_to(&Status::Draft, &Status::Cancelled).unwrap());
    }

    #[test]
    fn test_define_rejects_duplicate_source() {
        let mut manager = StateTransitionManager::new();
        let result = manager.define_transitions(vec![
            (Status::Draft, vec![Status::Confirmed]),
            (Status::Draft, vec![Status::Cancelled]),
        ]);

        assert!(result.is_err());
    }

    #[test]
    fn test_define_replaces_previous_graph() {
        let mut manager = order_graph();
        manager
            .define_transitions(vec![(Status::Shipped, vec![Status::Draft])])
            .unwrap();

        assert!(!manager.has_transitions_defined(&Status::Draft));
        assert!(manager.can_transition_to(&Status::Shipped, &Status::Draft).unwrap());
    }

    #[test]
    fn test_introspection_is_fail_safe() {
        let manager = order_graph();

        assert_eq!(
            manager.get_valid_transitions(&Status::Draft),
            vec![Status::Confirmed, Status::Cancelled]
        );
        assert!(manager.get_valid_transitions(&Status::Shipped).is_empty());
        assert!(manager.has_transitions_defined(&Status::Confirmed));
        assert!(!manager.has_transitions_defined(&Status::Cancelled));
        assert_eq!(
            manager.get_all_states(),
            vec![Status::Draft, Status::Confirmed, Status::Cancelled, Status::Shipped]
        );
    }

    #[test]
    fn test_graph_report_lists_terminal_states() {
        let report = order_graph().validate_transition_graph();

        assert_eq!(report.terminal_states, vec![Status::Cancelled, Status::Shipped]);
        assert_eq!(report.warnings.len(), 2);
        assert!(!report.is_clean());

        let cyclic = StateTransitionManager::with_transitions(vec![
            (Status::Draft, vec![Status::Confirmed]),
            (Status::Confirmed, vec![Status::Draft]),
        ])
        .unwrap();
        assert!(cyclic.validate_transition_graph().is_clean());
    }

    #[test]
    fn test_custom_equality() {
        #[derive(Debug, Clone)]
        struct Labelled {
            code: &'static str,
            label: &'static str,
        }

        let mut manager: StateTransitionManager<Labelled> =
            StateTransitionManager::with_equality(|a, b| a.code == b.code);
        manager
            .define_transitions(vec![(
                Labelled { code: "D", label: "Draft" },
                vec![Labelled { code: "C", label: "Confirmed" }],
            )])
            .unwrap();

        let rebuilt_draft = Labelled { code: "D", label: "draft (reloaded)" };
        let rebuilt_confirmed = Labelled { code: "C", label: "" };

        assert!(manager.can_transition_to(&rebuilt_draft, &rebuilt_confirmed).unwrap());
        assert_eq!(manager.get_all_states()[1].label, "Confirmed");
    }
}
