// Copyright 2025 Cornell University
// released under MIT License

use cranelift_entity::{entity_impl, PrimaryMap};
use indexmap::IndexSet;
use rustc_hash::{FxBuildHasher, FxHashMap};
use std::ops::Index;

use crate::ir::{Choreography, MessageEdge, State};

/// Identifies a coordination delegate: the ordered (sender, receiver) pair
/// whose messages it mediates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DelegateKey {
    sender: String,
    receiver: String,
}

impl DelegateKey {
    pub fn new(sender: impl Into<String>, receiver: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            receiver: receiver.into(),
        }
    }

    /// The delegate responsible for `edge`.
    pub fn of(choreo: &Choreography, edge: &MessageEdge) -> Self {
        Self::new(choreo[edge.sender].name(), choreo[edge.receiver].name())
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    pub fn receiver(&self) -> &str {
        &self.receiver
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Message {
    Input(String),
    Output(String),
}

impl Message {
    pub fn name(&self) -> &str {
        match self {
            Message::Input(name) | Message::Output(name) => name,
        }
    }
}

/// A transition of a local automaton.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LocalTransition {
    Send {
        source: State,
        target: State,
        message: String,
    },
    Receive {
        source: State,
        target: State,
        message: String,
    },
    Internal {
        source: State,
        target: State,
    },
}

impl LocalTransition {
    pub fn send(source: State, target: State, message: impl Into<String>) -> Self {
        LocalTransition::Send {
            source,
            target,
            message: message.into(),
        }
    }

    pub fn receive(source: State, target: State, message: impl Into<String>) -> Self {
        LocalTransition::Receive {
            source,
            target,
            message: message.into(),
        }
    }

    pub fn internal(source: State, target: State) -> Self {
        LocalTransition::Internal { source, target }
    }

    pub fn source(&self) -> &State {
        match self {
            LocalTransition::Send { source, .. }
            | LocalTransition::Receive { source, .. }
            | LocalTransition::Internal { source, .. } => source,
        }
    }

    pub fn target(&self) -> &State {
        match self {
            LocalTransition::Send { target, .. }
            | LocalTransition::Receive { target, .. }
            | LocalTransition::Internal { target, .. } => target,
        }
    }

    /// The message carried by this transition, tagged with its direction.
    pub fn message(&self) -> Option<Message> {
        match self {
            LocalTransition::Send { message, .. } => Some(Message::Output(message.clone())),
            LocalTransition::Receive { message, .. } => Some(Message::Input(message.clone())),
            LocalTransition::Internal { .. } => None,
        }
    }
}

/// Insertion-ordered set. Re-inserting an element is a no-op.
pub type OrderedSet<T> = IndexSet<T, FxBuildHasher>;

/// The local automaton of one coordination delegate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantBehavior {
    initial_state: State,
    states: OrderedSet<State>,
    messages: OrderedSet<Message>,
    transitions: OrderedSet<LocalTransition>,
}

impl ParticipantBehavior {
    pub fn new(initial_state: State) -> Self {
        Self {
            initial_state,
            states: OrderedSet::default(),
            messages: OrderedSet::default(),
            transitions: OrderedSet::default(),
        }
    }

    pub fn initial_state(&self) -> &State {
        &self.initial_state
    }

    pub fn states(&self) -> &OrderedSet<State> {
        &self.states
    }

    pub fn messages(&self) -> &OrderedSet<Message> {
        &self.messages
    }

    pub fn transitions(&self) -> &OrderedSet<LocalTransition> {
        &self.transitions
    }

    pub fn has_state(&self, name: &str) -> bool {
        self.states.contains(&State::new(name))
    }

    pub fn has_transition(&self, transition: &LocalTransition) -> bool {
        self.transitions.contains(transition)
    }

    /// Returns `true` if the state was not present before.
    pub fn add_state(&mut self, state: State) -> bool {
        self.states.insert(state)
    }

    /// Adds `transition` and the message it carries.
    /// Returns `true` if the transition was not present before.
    pub fn add_transition(&mut self, transition: LocalTransition) -> bool {
        if let Some(message) = transition.message() {
            self.messages.insert(message);
        }
        self.transitions.insert(transition)
    }

    pub fn transitions_from<'a>(
        &'a self,
        state: &'a str,
    ) -> impl Iterator<Item = &'a LocalTransition> + 'a {
        self.transitions()
            .iter()
            .filter(move |t| t.source().name() == state)
    }
}

#[derive(Clone, Copy, Hash, PartialEq, Eq, Default)]
pub struct DelegateId(u32);
entity_impl!(DelegateId, "delegate");

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delegate {
    key: DelegateKey,
    behavior: ParticipantBehavior,
}

impl Delegate {
    pub fn key(&self) -> &DelegateKey {
        &self.key
    }

    pub fn behavior(&self) -> &ParticipantBehavior {
        &self.behavior
    }
}

/// Result of the extraction: one local automaton per coordination delegate,
/// kept in discovery order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CoordinationLogic {
    delegates: PrimaryMap<DelegateId, Delegate>,
    by_key: FxHashMap<DelegateKey, DelegateId>,
}

impl CoordinationLogic {
    /// Registers `behavior` under `key`, replacing a previous behavior for the same key.
    pub(crate) fn insert(&mut self, key: DelegateKey, behavior: ParticipantBehavior) -> DelegateId {
        if let Some(id) = self.by_key.get(&key) {
            self.delegates[*id].behavior = behavior;
            return *id;
        }
        let id = self.delegates.push(Delegate {
            key: key.clone(),
            behavior,
        });
        self.by_key.insert(key, id);
        id
    }

    pub(crate) fn get_mut(&mut self, key: &DelegateKey) -> Option<&mut ParticipantBehavior> {
        let id = *self.by_key.get(key)?;
        Some(&mut self.delegates[id].behavior)
    }

    pub fn get(&self, key: &DelegateKey) -> Option<&ParticipantBehavior> {
        self.by_key.get(key).map(|id| &self.delegates[*id].behavior)
    }

    pub fn contains_key(&self, key: &DelegateKey) -> bool {
        self.by_key.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &DelegateKey> + '_ {
        self.delegates.values().map(|d| &d.key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&DelegateKey, &ParticipantBehavior)> + '_ {
        self.delegates.values().map(|d| (&d.key, &d.behavior))
    }

    pub fn delegates(&self) -> impl Iterator<Item = (DelegateId, &Delegate)> + '_ {
        self.delegates.iter()
    }

    pub fn len(&self) -> usize {
        self.delegates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.delegates.is_empty()
    }
}

impl Index<&DelegateKey> for CoordinationLogic {
    type Output = ParticipantBehavior;

    fn index(&self, index: &DelegateKey) -> &Self::Output {
        let id = self.by_key[index];
        &self.delegates[id].behavior
    }
}
