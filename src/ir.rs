// Copyright 2025 Cornell University
// released under MIT License

use cranelift_entity::{entity_impl, PrimaryMap};
use rustc_hash::FxHashMap;
use std::ops::Index;

/// A state of the global choreography or of a local automaton.
/// States are identified by their name only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct State {
    name: String,
}

impl State {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A participant of the choreography, identified by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Participant {
    name: String,
}

impl Participant {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Clone, Copy, Hash, PartialEq, Eq, Default)]
pub struct StateId(u32);
entity_impl!(StateId, "state");

#[derive(Clone, Copy, Hash, PartialEq, Eq, Default)]
pub struct ParticipantId(u32);
entity_impl!(ParticipantId, "participant");

#[derive(Clone, Copy, Hash, PartialEq, Eq, Default)]
pub struct TransitionId(u32);
entity_impl!(TransitionId, "transition");

/// `sender` sends `message` to `receiver`, moving the choreography
/// from `source` to `target`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageEdge {
    pub source: StateId,
    pub target: StateId,
    pub sender: ParticipantId,
    pub receiver: ParticipantId,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Transition {
    SendMessage(MessageEdge),
    /// Silent step of the global protocol. Extraction ignores it.
    Internal { source: StateId, target: StateId },
}

impl Transition {
    pub fn source(&self) -> StateId {
        match self {
            Transition::SendMessage(edge) => edge.source,
            Transition::Internal { source, .. } => *source,
        }
    }

    pub fn target(&self) -> StateId {
        match self {
            Transition::SendMessage(edge) => edge.target,
            Transition::Internal { target, .. } => *target,
        }
    }

    pub fn as_message(&self) -> Option<&MessageEdge> {
        match self {
            Transition::SendMessage(edge) => Some(edge),
            Transition::Internal { .. } => None,
        }
    }
}

/// The global choreography: a state machine over message exchanges
/// between participants.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Choreography {
    states: PrimaryMap<StateId, State>,
    states_by_name: FxHashMap<String, StateId>,
    participants: PrimaryMap<ParticipantId, Participant>,
    participants_by_name: FxHashMap<String, ParticipantId>,
    transitions: PrimaryMap<TransitionId, Transition>,
    initial_state: Option<StateId>,
}

impl Choreography {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the id of the state called `name`, adding it if it does not exist yet.
    pub fn add_state(&mut self, name: &str) -> StateId {
        if let Some(id) = self.states_by_name.get(name) {
            return *id;
        }
        let id = self.states.push(State::new(name));
        self.states_by_name.insert(name.to_string(), id);
        id
    }

    /// Returns the id of the participant called `name`, adding it if it does not exist yet.
    pub fn add_participant(&mut self, name: &str) -> ParticipantId {
        if let Some(id) = self.participants_by_name.get(name) {
            return *id;
        }
        let id = self.participants.push(Participant::new(name));
        self.participants_by_name.insert(name.to_string(), id);
        id
    }

    pub fn set_initial_state(&mut self, state: StateId) {
        self.initial_state = Some(state);
    }

    pub fn add_message(
        &mut self,
        source: StateId,
        target: StateId,
        sender: ParticipantId,
        receiver: ParticipantId,
        message: &str,
    ) -> TransitionId {
        self.transitions.push(Transition::SendMessage(MessageEdge {
            source,
            target,
            sender,
            receiver,
            message: message.to_string(),
        }))
    }

    pub fn add_internal(&mut self, source: StateId, target: StateId) -> TransitionId {
        self.transitions
            .push(Transition::Internal { source, target })
    }

    /// Name-based shorthand for [`Choreography::add_message`] that creates
    /// states and participants on demand.
    pub fn add_exchange(
        &mut self,
        source: &str,
        target: &str,
        sender: &str,
        receiver: &str,
        message: &str,
    ) -> TransitionId {
        let source = self.add_state(source);
        let target = self.add_state(target);
        let sender = self.add_participant(sender);
        let receiver = self.add_participant(receiver);
        self.add_message(source, target, sender, receiver, message)
    }

    pub fn initial_state(&self) -> Option<StateId> {
        self.initial_state
    }

    pub fn contains_state(&self, state: StateId) -> bool {
        self.states.is_valid(state)
    }

    pub fn contains_participant(&self, participant: ParticipantId) -> bool {
        self.participants.is_valid(participant)
    }

    pub fn state_by_name(&self, name: &str) -> Option<StateId> {
        self.states_by_name.get(name).copied()
    }

    pub fn participant_by_name(&self, name: &str) -> Option<ParticipantId> {
        self.participants_by_name.get(name).copied()
    }

    pub fn states(&self) -> impl Iterator<Item = (StateId, &State)> + '_ {
        self.states.iter()
    }

    pub fn state(&self, id: StateId) -> Option<&State> {
        self.states.get(id)
    }

    pub fn participant(&self, id: ParticipantId) -> Option<&Participant> {
        self.participants.get(id)
    }

    pub fn participants(&self) -> impl Iterator<Item = (ParticipantId, &Participant)> + '_ {
        self.participants.iter()
    }

    pub fn transitions(&self) -> impl Iterator<Item = (TransitionId, &Transition)> + '_ {
        self.transitions.iter()
    }

    /// All message-send edges, in insertion order.
    pub fn message_edges(&self) -> impl Iterator<Item = (TransitionId, &MessageEdge)> + '_ {
        self.transitions
            .iter()
            .filter_map(|(id, transition)| transition.as_message().map(|edge| (id, edge)))
    }

    pub fn num_states(&self) -> usize {
        self.states.len()
    }

    pub fn num_transitions(&self) -> usize {
        self.transitions.len()
    }
}

impl Index<StateId> for Choreography {
    type Output = State;

    fn index(&self, index: StateId) -> &Self::Output {
        &self.states[index]
    }
}

impl Index<&StateId> for Choreography {
    type Output = State;

    fn index(&self, index: &StateId) -> &Self::Output {
        &self.states[*index]
    }
}

impl Index<ParticipantId> for Choreography {
    type Output = Participant;

    fn index(&self, index: ParticipantId) -> &Self::Output {
        &self.participants[index]
    }
}

impl Index<&ParticipantId> for Choreography {
    type Output = Participant;

    fn index(&self, index: &ParticipantId) -> &Self::Output {
        &self.participants[*index]
    }
}

impl Index<TransitionId> for Choreography {
    type Output = Transition;

    fn index(&self, index: TransitionId) -> &Self::Output {
        &self.transitions[index]
    }
}
