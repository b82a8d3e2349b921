// Copyright 2025 Cornell University
// released under MIT License

use crate::delegate::{DelegateKey, LocalTransition, OrderedSet};
use crate::errors::{ExtractResult, Rule};
use crate::extractor::SynthesisContext;
use crate::ir::{MessageEdge, TransitionId};
use crate::naming;
use crate::queries::{is_branching_state, outgoing_edges};

/// Adds the handshakes that keep independently running delegates in step.
/// Each rule is a separate pass over all message edges, which fixes the
/// order of the transitions inside every delegate.
pub(crate) fn create_synch_transitions(cx: &mut SynthesisContext) -> ExtractResult<()> {
    synch_independent_sequences(cx)?;
    synch_edges_reaching_branches(cx)?;
    synch_branches_to_own_state(cx)?;
    synch_branches_to_sibling_states(cx)?;
    Ok(())
}

/// The delegates owning `edges` except `exclude`, one per edge. A delegate
/// owning several alternatives of a choice is listed once per alternative.
fn broadcast_targets(
    cx: &SynthesisContext,
    edges: &[(TransitionId, &MessageEdge)],
    exclude: &DelegateKey,
) -> ExtractResult<Vec<DelegateKey>> {
    let mut keys = Vec::new();
    for (_, edge) in edges {
        let key = cx.key_of(edge);
        cx.behavior(&key)?;
        if &key != exclude {
            keys.push(key);
        }
    }
    Ok(keys)
}

/// Rule A: when control moves from one sender to another at a non-branching
/// state `Y`, the previous delegate tells the next one through `Y_synch`.
fn synch_independent_sequences(cx: &mut SynthesisContext) -> ExtractResult<()> {
    let choreo = cx.choreo();
    for (_, edge) in choreo.message_edges() {
        if is_branching_state(choreo, edge.target) {
            continue;
        }
        let incoming = cx.key_of(edge);
        let state = &choreo[edge.target];
        let synch = naming::synch_state(state.name());
        for (_, next) in outgoing_edges(choreo, edge.target) {
            if next.sender == edge.sender {
                continue;
            }
            let outgoing = cx.key_of(next);
            let message = naming::synch_message(&incoming, &outgoing);
            cx.emit(
                &incoming,
                LocalTransition::send(state.clone(), synch.clone(), message.clone()),
                Rule::IndependentSequence,
            )?;
            cx.emit(
                &outgoing,
                LocalTransition::receive(synch.clone(), state.clone(), message),
                Rule::IndependentSequence,
            )?;
        }
    }
    Ok(())
}

/// Rule B: the delegate whose message reaches a branching state `Y`
/// broadcasts to every alternative of the choice. Each delegate of the
/// choice receives its own pairwise copy once.
fn synch_edges_reaching_branches(cx: &mut SynthesisContext) -> ExtractResult<()> {
    let choreo = cx.choreo();
    for (_, edge) in choreo.message_edges() {
        if !is_branching_state(choreo, edge.target) {
            continue;
        }
        let incoming = cx.key_of(edge);
        let name = choreo[edge.target].name();
        let synch = naming::synch_state(name);
        let branch = naming::branch_state(name);
        let downstream = broadcast_targets(cx, &outgoing_edges(choreo, edge.target), &incoming)?;

        cx.emit(
            &incoming,
            LocalTransition::send(
                synch.clone(),
                branch.clone(),
                naming::synch_broadcast(&incoming, &downstream),
            ),
            Rule::ReachBranchingState,
        )?;
        let receivers: OrderedSet<DelegateKey> = downstream.into_iter().collect();
        for key in &receivers {
            cx.emit(
                key,
                LocalTransition::receive(
                    synch.clone(),
                    branch.clone(),
                    naming::synch_message(&incoming, key),
                ),
                Rule::ReachBranchingState,
            )?;
        }
    }
    Ok(())
}

/// Rule C: every delegate of a choice at `Y` announces itself to the other
/// delegates of the choice while moving from `Y_branch` back to `Y`.
fn synch_branches_to_own_state(cx: &mut SynthesisContext) -> ExtractResult<()> {
    let choreo = cx.choreo();
    for (_, edge) in choreo.message_edges() {
        if !is_branching_state(choreo, edge.target) {
            continue;
        }
        let state = &choreo[edge.target];
        let branch = naming::branch_state(state.name());
        let outgoing = outgoing_edges(choreo, edge.target);
        for (_, choice) in &outgoing {
            let owner = cx.key_of(choice);
            let others = broadcast_targets(cx, &outgoing, &owner)?;
            cx.emit(
                &owner,
                LocalTransition::send(
                    branch.clone(),
                    state.clone(),
                    naming::synch_broadcast(&owner, &others),
                ),
                Rule::BranchToOwnState,
            )?;
        }
    }
    Ok(())
}

/// Rule D: a delegate of a choice at `Y` learns from `Y_branch` which
/// sibling alternative was taken and jumps to its target.
fn synch_branches_to_sibling_states(cx: &mut SynthesisContext) -> ExtractResult<()> {
    let choreo = cx.choreo();
    for (_, edge) in choreo.message_edges() {
        if !is_branching_state(choreo, edge.target) {
            continue;
        }
        let branch = naming::branch_state(choreo[edge.target].name());
        let outgoing = outgoing_edges(choreo, edge.target);
        for (choice_id, choice) in &outgoing {
            let owner = cx.key_of(choice);
            for (sibling_id, sibling) in &outgoing {
                if sibling_id == choice_id {
                    continue;
                }
                let taken = cx.key_of(sibling);
                cx.emit(
                    &owner,
                    LocalTransition::receive(
                        branch.clone(),
                        choreo[sibling.target].clone(),
                        naming::synch_message(&taken, &owner),
                    ),
                    Rule::BranchToSiblingState,
                )?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delegate::{CoordinationLogic, ParticipantBehavior};
    use crate::extractor::ExtractOptions;
    use crate::ir::tests::*;
    use crate::ir::{Choreography, State};
    use crate::scaffold::scaffold_delegates;

    fn synchronize(choreo: &Choreography) -> CoordinationLogic {
        let mut cx = SynthesisContext::new(choreo, ExtractOptions::default());
        scaffold_delegates(&mut cx).unwrap();
        create_synch_transitions(&mut cx).unwrap();
        cx.finish()
    }

    fn key(sender: &str, receiver: &str) -> DelegateKey {
        DelegateKey::new(sender, receiver)
    }

    fn s(name: &str) -> State {
        State::new(name)
    }

    fn rendered(behavior: &ParticipantBehavior) -> Vec<String> {
        behavior.transitions().iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn hand_off_in_a_chain() {
        let logic = synchronize(&build_linear_chain());
        assert_eq!(
            rendered(&logic[&key("P1", "P3")]),
            vec!["s1 -> s1_synch : send Synch_{P1,P3}->{P3,P6}"]
        );
        assert_eq!(
            rendered(&logic[&key("P3", "P6")]),
            vec!["s1_synch -> s1 : receive Synch_{P1,P3}->{P3,P6}"]
        );
    }

    #[test]
    fn no_hand_off_without_sender_change() {
        let logic = synchronize(&build_single_sender_chain());
        for (_, behavior) in logic.iter() {
            assert!(behavior.transitions().is_empty());
        }
    }

    #[test]
    fn three_way_choice() {
        let logic = synchronize(&build_sample_choreography());
        assert_eq!(
            rendered(&logic[&key("p2", "p3")]),
            vec![
                "s1_synch -> s1 : receive Synch_{p1,p3}->{p2,p3}",
                "s2_synch -> s2_branch : send Synch_{p2,p3}->{p4,p6}{p5,p6}",
                "s2_branch -> s2 : send Synch_{p2,p3}->{p4,p6}{p5,p6}",
                "s2_branch -> s3 : receive Synch_{p4,p6}->{p2,p3}",
                "s2_branch -> s4 : receive Synch_{p5,p6}->{p2,p3}",
            ]
        );
        assert_eq!(
            rendered(&logic[&key("p4", "p6")]),
            vec![
                "s3 -> s3_synch : send Synch_{p4,p6}->{p3,p6}",
                "s2_synch -> s2_branch : receive Synch_{p2,p3}->{p4,p6}",
                "s2_branch -> s2 : send Synch_{p4,p6}->{p5,p6}{p2,p3}",
                "s2_branch -> s4 : receive Synch_{p5,p6}->{p4,p6}",
                "s2_branch -> s5 : receive Synch_{p2,p3}->{p4,p6}",
            ]
        );
    }

    #[test]
    fn each_choice_delegate_tracks_its_siblings() {
        let logic = synchronize(&build_sample_choreography());
        for (sender, receiver) in [("p2", "p3"), ("p4", "p6"), ("p5", "p6")] {
            let behavior = &logic[&key(sender, receiver)];
            let tracking = behavior
                .transitions_from("s2_branch")
                .filter(|t| matches!(t, LocalTransition::Receive { .. }))
                .count();
            assert_eq!(tracking, 2, "{sender},{receiver}");
            assert_eq!(
                behavior.states().iter().filter(|st| st.name() == "s2_branch").count(),
                1
            );
        }
    }

    #[test]
    fn branch_receivers_match_the_broadcast() {
        let logic = synchronize(&build_branch_with_bystander());
        assert!(logic[&key("P4", "P3")].has_transition(&LocalTransition::send(
            s("s2_synch"),
            s("s2_branch"),
            "Synch_{P4,P3}->{P5,P6}",
        )));
        assert!(logic[&key("P5", "P6")].has_transition(&LocalTransition::receive(
            s("s2_synch"),
            s("s2_branch"),
            "Synch_{P4,P3}->{P5,P6}",
        )));
        assert!(logic[&key("P5", "P6")].has_transition(&LocalTransition::receive(
            s("s2_branch"),
            s("s3"),
            "Synch_{P4,P3}->{P5,P6}",
        )));
        assert!(logic[&key("P4", "P3")].has_transition(&LocalTransition::receive(
            s("s2_branch"),
            s("s4"),
            "Synch_{P5,P6}->{P4,P3}",
        )));
        assert!(logic[&key("P1", "P2")]
            .transitions()
            .iter()
            .all(|t| !t.source().name().starts_with("s2")));
    }

    #[test]
    fn repeated_arrivals_at_a_choice_collapse() {
        let mut choreo = build_sample_choreography();
        // a second way into s2, sent by p2 again
        choreo.add_exchange("s0", "s2", "p2", "p3", "m8");
        let logic = synchronize(&choreo);
        let behavior = &logic[&key("p4", "p6")];
        assert_eq!(
            behavior
                .transitions_from("s2_branch")
                .filter(|t| matches!(t, LocalTransition::Send { .. }))
                .count(),
            1
        );
    }

    #[test]
    fn broadcast_lists_every_alternative() {
        let mut choreo = Choreography::new();
        let s0 = choreo.add_state("s0");
        choreo.set_initial_state(s0);
        choreo.add_exchange("s0", "s1", "A", "B", "m0");
        choreo.add_exchange("s1", "s2", "A", "B", "m1");
        choreo.add_exchange("s1", "s3", "C", "D", "m2");
        choreo.add_exchange("s1", "s4", "C", "D", "m3");

        let logic = synchronize(&choreo);
        let ab = &logic[&key("A", "B")];
        assert!(ab.has_transition(&LocalTransition::send(
            s("s1_synch"),
            s("s1_branch"),
            "Synch_{A,B}->{C,D}{C,D}",
        )));
        assert!(ab.has_transition(&LocalTransition::send(
            s("s1_branch"),
            s("s1"),
            "Synch_{A,B}->{C,D}{C,D}",
        )));
        assert_eq!(
            rendered(&logic[&key("C", "D")])
                .into_iter()
                .filter(|t| t.starts_with("s1_synch -> s1_branch"))
                .collect::<Vec<_>>(),
            vec!["s1_synch -> s1_branch : receive Synch_{A,B}->{C,D}"]
        );
    }
}
