// Copyright 2025 Cornell University
// released under MIT License

//! Names of synthesized states and text of synchronization messages.
//! Downstream consumers match on these strings, so every synthesized name
//! is produced here and nowhere else.

use crate::delegate::DelegateKey;
use crate::ir::State;

pub const MID_STATE_SUFFIX: &str = "_mid";
pub const SYNCH_STATE_SUFFIX: &str = "_synch";
pub const BRANCH_STATE_SUFFIX: &str = "_branch";
pub const SYNCH_MESSAGE_PREFIX: &str = "Synch_";
pub const SYNCH_MESSAGE_TO: &str = "->";

pub fn mid_state(state: &str) -> State {
    State::new(format!("{state}{MID_STATE_SUFFIX}"))
}

pub fn synch_state(state: &str) -> State {
    State::new(format!("{state}{SYNCH_STATE_SUFFIX}"))
}

pub fn branch_state(state: &str) -> State {
    State::new(format!("{state}{BRANCH_STATE_SUFFIX}"))
}

/// `{sender,receiver}`
pub fn delegate_label(sender: &str, receiver: &str) -> String {
    format!("{{{sender},{receiver}}}")
}

/// `Synch_{P,Q}->{R,S}`
pub fn synch_message(from: &DelegateKey, to: &DelegateKey) -> String {
    format!("{SYNCH_MESSAGE_PREFIX}{from}{SYNCH_MESSAGE_TO}{to}")
}

/// `Synch_{P,Q}->{R,S}{T,U}...`, the receivers concatenated without separator.
pub fn synch_broadcast<'a>(
    from: &DelegateKey,
    to: impl IntoIterator<Item = &'a DelegateKey>,
) -> String {
    let mut message = format!("{SYNCH_MESSAGE_PREFIX}{from}{SYNCH_MESSAGE_TO}");
    for key in to {
        message.push_str(&delegate_label(key.sender(), key.receiver()));
    }
    message
}
