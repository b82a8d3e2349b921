// Copyright 2025 Cornell University
// released under MIT License

use std::fmt;
use std::io::Write;

use crate::delegate::{CoordinationLogic, DelegateKey, LocalTransition, Message, ParticipantBehavior};
use crate::ir::{Choreography, Participant, State, Transition};
use crate::naming;

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl fmt::Display for Participant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl fmt::Display for DelegateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", naming::delegate_label(self.sender(), self.receiver()))
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::Input(name) => write!(f, "?{name}"),
            Message::Output(name) => write!(f, "!{name}"),
        }
    }
}

impl fmt::Display for LocalTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocalTransition::Send {
                source,
                target,
                message,
            } => write!(f, "{source} -> {target} : send {message}"),
            LocalTransition::Receive {
                source,
                target,
                message,
            } => write!(f, "{source} -> {target} : receive {message}"),
            LocalTransition::Internal { source, target } => {
                write!(f, "{source} -> {target} : internal")
            }
        }
    }
}

fn into_string(out: Vec<u8>) -> std::io::Result<String> {
    String::from_utf8(out).map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}

fn join<T: ToString>(items: impl IntoIterator<Item = T>) -> String {
    items
        .into_iter()
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Writes `name a, b, c;`, or `name;` when there is nothing to list.
fn write_list<T: ToString>(
    out: &mut impl Write,
    name: &str,
    items: impl IntoIterator<Item = T>,
) -> std::io::Result<()> {
    let items = join(items);
    if items.is_empty() {
        writeln!(out, "  {name};")
    } else {
        writeln!(out, "  {name} {items};")
    }
}

pub fn serialize_behavior(
    out: &mut impl Write,
    key: &DelegateKey,
    behavior: &ParticipantBehavior,
) -> std::io::Result<()> {
    writeln!(out, "delegate {key} {{")?;
    writeln!(out, "  initial {};", behavior.initial_state())?;
    write_list(out, "states", behavior.states())?;
    write_list(out, "messages", behavior.messages())?;
    for transition in behavior.transitions() {
        writeln!(out, "  {transition};")?;
    }
    writeln!(out, "}}")?;
    Ok(())
}

/// Writes every delegate of `logic` in discovery order.
pub fn serialize(out: &mut impl Write, logic: &CoordinationLogic) -> std::io::Result<()> {
    for (_, delegate) in logic.delegates() {
        serialize_behavior(out, delegate.key(), delegate.behavior())?;
    }
    Ok(())
}

pub fn serialize_to_string(logic: &CoordinationLogic) -> std::io::Result<String> {
    let mut out = Vec::new();
    serialize(&mut out, logic)?;
    into_string(out)
}

pub fn serialize_choreography(out: &mut impl Write, choreo: &Choreography) -> std::io::Result<()> {
    writeln!(out, "choreography {{")?;
    if let Some(initial) = choreo.initial_state().and_then(|id| choreo.state(id)) {
        writeln!(out, "  initial {initial};")?;
    }
    write_list(out, "states", choreo.states().map(|(_, s)| s))?;
    write_list(out, "participants", choreo.participants().map(|(_, p)| p))?;
    // transitions with unknown ids are left out
    for (_, transition) in choreo.transitions() {
        let (Some(source), Some(target)) = (
            choreo.state(transition.source()),
            choreo.state(transition.target()),
        ) else {
            continue;
        };
        match transition {
            Transition::SendMessage(edge) => {
                let (Some(sender), Some(receiver)) =
                    (choreo.participant(edge.sender), choreo.participant(edge.receiver))
                else {
                    continue;
                };
                writeln!(
                    out,
                    "  {source} -> {target} : {sender} -> {receiver} : {};",
                    edge.message
                )?
            }
            Transition::Internal { .. } => writeln!(out, "  {source} -> {target} : internal;")?,
        }
    }
    writeln!(out, "}}")?;
    Ok(())
}

pub fn serialize_choreography_to_string(choreo: &Choreography) -> std::io::Result<String> {
    let mut out = Vec::new();
    serialize_choreography(&mut out, choreo)?;
    into_string(out)
}
