// Copyright 2025 Cornell University
// released under MIT License

use std::fmt;
use thiserror::Error;

use crate::delegate::DelegateKey;
use crate::ir::{ParticipantId, StateId, TransitionId};

/// Reasons a choreography cannot be used as extraction input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MalformedChoreography {
    #[error("the choreography has no initial state")]
    MissingInitialState,
    #[error("initial state {0} is not a state of the choreography")]
    DanglingInitialState(StateId),
    #[error("{transition} refers to unknown state {state}")]
    DanglingState {
        transition: TransitionId,
        state: StateId,
    },
    #[error("{transition} refers to unknown participant {participant}")]
    DanglingParticipant {
        transition: TransitionId,
        participant: ParticipantId,
    },
    #[error("{what} has an empty name")]
    EmptyName { what: String },
    #[error("state `{state}` clashes with an auxiliary state derived from `{origin}`")]
    NameCollision { state: String, origin: String },
}

/// Main error type of the extraction
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("malformed choreography: {0}")]
    Malformed(#[from] MalformedChoreography),
    /// A delegate that discovery should have created is not in the result
    #[error("coordination delegate {key} was not discovered")]
    UnknownDelegate { key: DelegateKey },
    /// A transition endpoint is not a state of the delegate it is added to
    #[error("coordination delegate {delegate} has no state `{state}` (needed by {rule})")]
    MissingState {
        delegate: DelegateKey,
        state: String,
        rule: Rule,
    },
}

pub type ExtractResult<T> = Result<T, ExtractError>;

/// The synthesis rule that emitted a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    IndependentSequence,
    ReachBranchingState,
    BranchToOwnState,
    BranchToSiblingState,
    MessageForwarding,
    SilentProgress,
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::IndependentSequence => write!(f, "independent sequencing"),
            Rule::ReachBranchingState => write!(f, "synchronization before a branch"),
            Rule::BranchToOwnState => write!(f, "branch announcement"),
            Rule::BranchToSiblingState => write!(f, "sibling branch tracking"),
            Rule::MessageForwarding => write!(f, "message forwarding"),
            Rule::SilentProgress => write!(f, "silent progress"),
        }
    }
}
