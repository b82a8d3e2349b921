// Copyright 2025 Cornell University
// released under MIT License

use crate::delegate::{DelegateKey, LocalTransition};
use crate::errors::{ExtractResult, Rule};
use crate::extractor::SynthesisContext;
use crate::ir::{MessageEdge, State};
use crate::naming;
use crate::queries::is_branching_state;

/// Turns every global message edge into local behavior: its own delegate
/// relays the message, all others advance silently.
pub(crate) fn create_message_transitions(cx: &mut SynthesisContext) -> ExtractResult<()> {
    let choreo = cx.choreo();
    let keys: Vec<DelegateKey> = cx.logic().keys().cloned().collect();
    for (_, edge) in choreo.message_edges() {
        let owner = cx.key_of(edge);
        forward_message(cx, &owner, edge)?;
        for key in keys.iter().filter(|k| **k != owner) {
            advance_silently(cx, key, edge)?;
        }
    }
    Ok(())
}

/// `X -> X_mid` receives the message, `X_mid -> Y` sends it on. A branching
/// `Y` is entered through `Y_synch` so the choice can be announced first.
fn forward_message(
    cx: &mut SynthesisContext,
    owner: &DelegateKey,
    edge: &MessageEdge,
) -> ExtractResult<()> {
    let choreo = cx.choreo();
    let source = &choreo[edge.source];
    let target = &choreo[edge.target];
    let mid = naming::mid_state(source.name());
    let next = if is_branching_state(choreo, edge.target) {
        naming::synch_state(target.name())
    } else {
        target.clone()
    };

    cx.emit(
        owner,
        LocalTransition::receive(source.clone(), mid.clone(), edge.message.clone()),
        Rule::MessageForwarding,
    )?;
    cx.emit(
        owner,
        LocalTransition::send(mid, next, edge.message.clone()),
        Rule::MessageForwarding,
    )
}

/// Delegates deciding a choice at `X` move on through their branch
/// transitions instead.
fn advance_silently(
    cx: &mut SynthesisContext,
    key: &DelegateKey,
    edge: &MessageEdge,
) -> ExtractResult<()> {
    let choreo = cx.choreo();
    let source = choreo[edge.source].name();
    if cx.has_state(key, naming::branch_state(source).name())? {
        return Ok(());
    }
    let from = synch_or_plain(cx, key, source)?;
    let to = synch_or_plain(cx, key, choreo[edge.target].name())?;
    cx.emit(key, LocalTransition::internal(from, to), Rule::SilentProgress)
}

fn synch_or_plain(cx: &SynthesisContext, key: &DelegateKey, name: &str) -> ExtractResult<State> {
    let synch = naming::synch_state(name);
    if cx.has_state(key, synch.name())? {
        Ok(synch)
    } else {
        Ok(State::new(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delegate::{CoordinationLogic, Message, ParticipantBehavior};
    use crate::extractor::ExtractOptions;
    use crate::ir::tests::*;
    use crate::ir::Choreography;
    use crate::scaffold::scaffold_delegates;
    use crate::synch::create_synch_transitions;

    fn extract_all(choreo: &Choreography) -> CoordinationLogic {
        let mut cx = SynthesisContext::new(choreo, ExtractOptions::default());
        scaffold_delegates(&mut cx).unwrap();
        create_synch_transitions(&mut cx).unwrap();
        create_message_transitions(&mut cx).unwrap();
        cx.finish()
    }

    fn silent_steps(behavior: &ParticipantBehavior) -> Vec<String> {
        behavior
            .transitions()
            .iter()
            .filter(|t| t.message().is_none())
            .map(|t| t.to_string())
            .collect()
    }

    #[test]
    fn owner_relays_through_mid_state() {
        let logic = extract_all(&build_single_sender_chain());
        let behavior = &logic[&DelegateKey::new("P1", "P6")];
        assert_eq!(
            behavior
                .transitions()
                .iter()
                .filter(|t| t.message().is_some())
                .map(|t| t.to_string())
                .collect::<Vec<_>>(),
            vec!["s1 -> s1_mid : receive m2", "s1_mid -> s2 : send m2"]
        );
        assert_eq!(
            behavior.messages().iter().cloned().collect::<Vec<_>>(),
            vec![Message::Input("m2".to_string()), Message::Output("m2".to_string())]
        );
        assert_eq!(silent_steps(behavior), vec!["s0 -> s1 : internal"]);
    }

    #[test]
    fn branching_target_is_entered_through_synch() {
        let logic = extract_all(&build_sample_choreography());
        assert!(logic[&DelegateKey::new("p2", "p3")].has_transition(&LocalTransition::send(
            State::new("s1_mid"),
            State::new("s2_synch"),
            "m2",
        )));
    }

    #[test]
    fn silent_steps_prefer_synch_states() {
        let logic = extract_all(&build_sample_choreography());
        assert_eq!(
            silent_steps(&logic[&DelegateKey::new("p3", "p6")]),
            vec![
                "s0 -> s1 : internal",
                "s1 -> s2 : internal",
                "s2 -> s3_synch : internal",
                "s2 -> s4_synch : internal",
                "s2 -> s5 : internal",
                "s4_synch -> s5 : internal",
            ]
        );
        assert_eq!(
            silent_steps(&logic[&DelegateKey::new("p1", "p3")]),
            vec![
                "s1_synch -> s2 : internal",
                "s2 -> s3 : internal",
                "s2 -> s4 : internal",
                "s2 -> s5 : internal",
                "s3 -> s4 : internal",
                "s4 -> s5 : internal",
            ]
        );
    }

    #[test]
    fn choice_members_skip_alternatives() {
        let logic = extract_all(&build_branch_with_bystander());
        assert_eq!(
            silent_steps(&logic[&DelegateKey::new("P1", "P2")]),
            vec![
                "s1_synch -> s2 : internal",
                "s2 -> s3 : internal",
                "s2 -> s4 : internal",
            ]
        );
        assert_eq!(
            silent_steps(&logic[&DelegateKey::new("P5", "P6")]),
            vec!["s0 -> s1 : internal", "s1 -> s2_synch : internal"]
        );
    }
}
