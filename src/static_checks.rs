// Copyright 2025 Cornell University
// released under MIT License

use log::debug;

use crate::errors::MalformedChoreography;
use crate::ir::{Choreography, State, StateId, Transition};
use crate::naming;
use crate::queries::{branching_states, outgoing_edges};

/// Checks that `choreo` is well-formed input for the extraction:
/// - it has an initial state that belongs to it
/// - every transition endpoint, sender and receiver exists
/// - states, participants and messages have non-empty names
/// - no state is named like an auxiliary state the extraction will derive
pub fn check_choreography(choreo: &Choreography) -> Result<(), MalformedChoreography> {
    let initial = choreo
        .initial_state()
        .ok_or(MalformedChoreography::MissingInitialState)?;
    if !choreo.contains_state(initial) {
        return Err(MalformedChoreography::DanglingInitialState(initial));
    }

    check_names(choreo)?;

    for (id, transition) in choreo.transitions() {
        for state in [transition.source(), transition.target()] {
            if !choreo.contains_state(state) {
                return Err(MalformedChoreography::DanglingState {
                    transition: id,
                    state,
                });
            }
        }
        match transition {
            Transition::SendMessage(edge) => {
                for participant in [edge.sender, edge.receiver] {
                    if !choreo.contains_participant(participant) {
                        return Err(MalformedChoreography::DanglingParticipant {
                            transition: id,
                            participant,
                        });
                    }
                }
                if edge.message.is_empty() {
                    return Err(MalformedChoreography::EmptyName {
                        what: format!("message of {id}"),
                    });
                }
            }
            Transition::Internal { .. } => {}
        }
    }

    check_name_collisions(choreo)?;
    debug!(
        "choreography is well-formed: {} states, {} transitions",
        choreo.num_states(),
        choreo.num_transitions()
    );
    Ok(())
}

fn check_names(choreo: &Choreography) -> Result<(), MalformedChoreography> {
    if let Some((id, _)) = choreo.states().find(|(_, s)| s.name().is_empty()) {
        return Err(MalformedChoreography::EmptyName {
            what: id.to_string(),
        });
    }
    if let Some((id, _)) = choreo.participants().find(|(_, p)| p.name().is_empty()) {
        return Err(MalformedChoreography::EmptyName {
            what: id.to_string(),
        });
    }
    Ok(())
}

/// Only names the extraction will actually create can clash: `X_mid` when a
/// message leaves `X`, `X_synch` when control changes sender at `X` and
/// `X_branch` when `X` is branching.
fn check_name_collisions(choreo: &Choreography) -> Result<(), MalformedChoreography> {
    let mut derived: Vec<(State, StateId)> = Vec::new();
    for (_, edge) in choreo.message_edges() {
        derived.push((naming::mid_state(choreo[edge.source].name()), edge.source));
        if outgoing_edges(choreo, edge.target)
            .iter()
            .any(|(_, next)| next.sender != edge.sender)
        {
            derived.push((naming::synch_state(choreo[edge.target].name()), edge.target));
        }
    }
    for state in branching_states(choreo) {
        derived.push((naming::branch_state(choreo[state].name()), state));
    }

    for (name, origin) in derived {
        if choreo.state_by_name(name.name()).is_some() {
            return Err(MalformedChoreography::NameCollision {
                state: name.name().to_string(),
                origin: choreo[origin].name().to_string(),
            });
        }
    }
    Ok(())
}
