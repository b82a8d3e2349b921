// Copyright 2025 Cornell University
// released under MIT License

//! Read-only graph queries over a [`Choreography`]. Only message-send edges
//! are considered; internal transitions are invisible here.

use crate::ir::{Choreography, MessageEdge, StateId, TransitionId};

/// Message edges leaving `state`, in insertion order.
pub fn outgoing_edges(choreo: &Choreography, state: StateId) -> Vec<(TransitionId, &MessageEdge)> {
    choreo
        .message_edges()
        .filter(|(_, edge)| edge.source == state)
        .collect()
}

/// Message edges entering `state`, in insertion order.
pub fn incoming_edges(choreo: &Choreography, state: StateId) -> Vec<(TransitionId, &MessageEdge)> {
    choreo
        .message_edges()
        .filter(|(_, edge)| edge.target == state)
        .collect()
}

/// A state is branching if at least two message edges leave it.
pub fn is_branching_state(choreo: &Choreography, state: StateId) -> bool {
    choreo
        .message_edges()
        .filter(|(_, edge)| edge.source == state)
        .nth(1)
        .is_some()
}

pub fn branching_states(choreo: &Choreography) -> Vec<StateId> {
    choreo
        .states()
        .map(|(id, _)| id)
        .filter(|id| is_branching_state(choreo, *id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::tests::*;

    fn names(edges: &[(TransitionId, &MessageEdge)]) -> Vec<String> {
        edges.iter().map(|(_, edge)| edge.message.clone()).collect()
    }

    #[test]
    fn outgoing_edges_keep_insertion_order() {
        let choreo = build_sample_choreography();
        let s2 = choreo.state_by_name("s2").unwrap();
        let out = outgoing_edges(&choreo, s2);
        assert_eq!(names(&out), vec!["m3", "m4", "m5"]);

        let s5 = choreo.state_by_name("s5").unwrap();
        assert!(outgoing_edges(&choreo, s5).is_empty());
    }

    #[test]
    fn incoming_edges_of_a_join() {
        let choreo = build_sample_choreography();
        let s4 = choreo.state_by_name("s4").unwrap();
        assert_eq!(names(&incoming_edges(&choreo, s4)), vec!["m4", "m6"]);

        let s0 = choreo.state_by_name("s0").unwrap();
        assert!(incoming_edges(&choreo, s0).is_empty());
    }

    #[test]
    fn only_the_three_way_choice_is_branching() {
        let choreo = build_sample_choreography();
        let s2 = choreo.state_by_name("s2").unwrap();
        assert!(is_branching_state(&choreo, s2));
        assert_eq!(branching_states(&choreo), vec![s2]);

        let chain = build_linear_chain();
        assert!(branching_states(&chain).is_empty());
    }

    #[test]
    fn internal_transitions_do_not_make_a_state_branching() {
        let mut choreo = build_linear_chain();
        let s1 = choreo.state_by_name("s1").unwrap();
        let s3 = choreo.add_state("s3");
        choreo.add_internal(s1, s3);

        assert_eq!(outgoing_edges(&choreo, s1).len(), 1);
        assert!(!is_branching_state(&choreo, s1));
        assert!(incoming_edges(&choreo, s3).is_empty());
    }
}
