// Copyright 2025 Cornell University
// released under MIT License

use log::{debug, info, warn};

use crate::delegate::{CoordinationLogic, DelegateKey, LocalTransition, ParticipantBehavior};
use crate::errors::{ExtractError, ExtractResult, Rule};
use crate::ir::{Choreography, MessageEdge, State};
use crate::static_checks::check_choreography;
use crate::{messages, queries, scaffold, synch};

/// What to do when a synthesized transition names a state the target
/// delegate does not have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingStatePolicy {
    /// Abort the extraction with [`ExtractError::MissingState`].
    #[default]
    Strict,
    /// Keep the transition as is and log a warning.
    Lenient,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractOptions {
    pub missing_states: MissingStatePolicy,
}

impl ExtractOptions {
    pub fn with_missing_states(mut self, policy: MissingStatePolicy) -> Self {
        self.missing_states = policy;
        self
    }
}

/// Extracts one coordination delegate per communicating pair of `choreo`
/// using the default options.
pub fn extract(choreo: &Choreography) -> ExtractResult<CoordinationLogic> {
    extract_with(choreo, ExtractOptions::default())
}

pub fn extract_with(
    choreo: &Choreography,
    options: ExtractOptions,
) -> ExtractResult<CoordinationLogic> {
    check_choreography(choreo)?;

    let mut cx = SynthesisContext::new(choreo, options);
    scaffold::scaffold_delegates(&mut cx)?;
    synch::create_synch_transitions(&mut cx)?;
    messages::create_message_transitions(&mut cx)?;

    let logic = cx.finish();
    info!(
        "extracted {} coordination delegates ({} branching states, {} local transitions)",
        logic.len(),
        queries::branching_states(choreo).len(),
        logic
            .iter()
            .map(|(_, behavior)| behavior.transitions().len())
            .sum::<usize>()
    );
    Ok(logic)
}

/// Mutable state shared by all extraction passes. Passes only ever add
/// delegates, states and transitions.
pub(crate) struct SynthesisContext<'a> {
    choreo: &'a Choreography,
    options: ExtractOptions,
    logic: CoordinationLogic,
}

impl<'a> SynthesisContext<'a> {
    pub(crate) fn new(choreo: &'a Choreography, options: ExtractOptions) -> Self {
        Self {
            choreo,
            options,
            logic: CoordinationLogic::default(),
        }
    }

    pub(crate) fn choreo(&self) -> &'a Choreography {
        self.choreo
    }

    pub(crate) fn key_of(&self, edge: &MessageEdge) -> DelegateKey {
        DelegateKey::of(self.choreo, edge)
    }

    pub(crate) fn logic(&self) -> &CoordinationLogic {
        &self.logic
    }

    pub(crate) fn insert_delegate(&mut self, key: DelegateKey, behavior: ParticipantBehavior) {
        debug!("created coordination delegate {key}");
        self.logic.insert(key, behavior);
    }

    pub(crate) fn behavior(&self, key: &DelegateKey) -> ExtractResult<&ParticipantBehavior> {
        self.logic
            .get(key)
            .ok_or_else(|| ExtractError::UnknownDelegate { key: key.clone() })
    }

    fn behavior_mut(&mut self, key: &DelegateKey) -> ExtractResult<&mut ParticipantBehavior> {
        self.logic
            .get_mut(key)
            .ok_or_else(|| ExtractError::UnknownDelegate { key: key.clone() })
    }

    pub(crate) fn has_state(&self, key: &DelegateKey, name: &str) -> ExtractResult<bool> {
        Ok(self.behavior(key)?.has_state(name))
    }

    pub(crate) fn add_state(&mut self, key: &DelegateKey, state: State) -> ExtractResult<()> {
        let name = state.name().to_string();
        if self.behavior_mut(key)?.add_state(state) {
            debug!("{key}: added state {name}");
        }
        Ok(())
    }

    /// Adds `transition` to the delegate `key`, checking its endpoints
    /// against the configured [`MissingStatePolicy`].
    pub(crate) fn emit(
        &mut self,
        key: &DelegateKey,
        transition: LocalTransition,
        rule: Rule,
    ) -> ExtractResult<()> {
        let policy = self.options.missing_states;
        let behavior = self.behavior_mut(key)?;
        for endpoint in [transition.source(), transition.target()] {
            if behavior.has_state(endpoint.name()) {
                continue;
            }
            match policy {
                MissingStatePolicy::Strict => {
                    return Err(ExtractError::MissingState {
                        delegate: key.clone(),
                        state: endpoint.name().to_string(),
                        rule,
                    })
                }
                MissingStatePolicy::Lenient => warn!(
                    "{key}: {rule} refers to state {} which the delegate does not have",
                    endpoint.name()
                ),
            }
        }
        let description = transition.to_string();
        if behavior.add_transition(transition) {
            debug!("{key}: {rule}: {description}");
        }
        Ok(())
    }

    pub(crate) fn finish(self) -> CoordinationLogic {
        self.logic
    }
}
