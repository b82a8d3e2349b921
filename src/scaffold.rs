// Copyright 2025 Cornell University
// released under MIT License

//! Creates the local automata of all delegates and the auxiliary states
//! the synthesis rules connect:
//! - `X_mid` between consuming the local trigger and forwarding the message
//! - `Y_synch` where control passes from one sender to another
//! - `B_branch` where the delegates of a choice agree on its outcome

use log::info;

use crate::delegate::ParticipantBehavior;
use crate::discovery::find_coordination_delegates;
use crate::errors::{ExtractResult, MalformedChoreography};
use crate::extractor::SynthesisContext;
use crate::naming;
use crate::queries::{branching_states, outgoing_edges};

pub(crate) fn scaffold_delegates(cx: &mut SynthesisContext) -> ExtractResult<()> {
    seed_delegates(cx)?;
    create_mid_states(cx)?;
    create_synch_states(cx)?;
    create_branch_states(cx)?;
    Ok(())
}

/// Every delegate starts as a copy of the global states.
pub(crate) fn seed_delegates(cx: &mut SynthesisContext) -> ExtractResult<()> {
    let choreo = cx.choreo();
    let initial = choreo
        .initial_state()
        .ok_or(MalformedChoreography::MissingInitialState)?;

    let keys = find_coordination_delegates(choreo);
    info!("discovered {} coordination delegates", keys.len());
    for key in keys {
        let mut behavior = ParticipantBehavior::new(choreo[initial].clone());
        for (_, state) in choreo.states() {
            behavior.add_state(state.clone());
        }
        cx.insert_delegate(key, behavior);
    }
    Ok(())
}

pub(crate) fn create_mid_states(cx: &mut SynthesisContext) -> ExtractResult<()> {
    let choreo = cx.choreo();
    for (_, edge) in choreo.message_edges() {
        let key = cx.key_of(edge);
        cx.add_state(&key, naming::mid_state(choreo[edge.source].name()))?;
    }
    Ok(())
}

/// A hand-off happens at `Y` when a message reaches `Y` and a different
/// participant sends the next one. Both delegates get `Y_synch`.
pub(crate) fn create_synch_states(cx: &mut SynthesisContext) -> ExtractResult<()> {
    let choreo = cx.choreo();
    for (_, edge) in choreo.message_edges() {
        let incoming = cx.key_of(edge);
        let synch = naming::synch_state(choreo[edge.target].name());
        for (_, next) in outgoing_edges(choreo, edge.target) {
            if next.sender == edge.sender {
                continue;
            }
            let outgoing = cx.key_of(next);
            cx.add_state(&incoming, synch.clone())?;
            cx.add_state(&outgoing, synch.clone())?;
        }
    }
    Ok(())
}

pub(crate) fn create_branch_states(cx: &mut SynthesisContext) -> ExtractResult<()> {
    let choreo = cx.choreo();
    for state in branching_states(choreo) {
        let branch = naming::branch_state(choreo[state].name());
        for (_, edge) in outgoing_edges(choreo, state) {
            let key = cx.key_of(edge);
            cx.add_state(&key, branch.clone())?;
        }
    }
    Ok(())
}
