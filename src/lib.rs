// Copyright 2025 Cornell University
// released under MIT License

//! Extracts coordination delegates from a global choreography. Every
//! (sender, receiver) pair that exchanges a message gets a local automaton
//! which relays its messages and synchronizes with the other delegates
//! wherever control passes between senders or a choice is made.

pub mod delegate;
pub mod discovery;
pub mod errors;
pub mod extractor;
pub mod ir;
mod messages;
pub mod naming;
pub mod queries;
mod scaffold;
pub mod serialize;
pub mod static_checks;
mod synch;

pub use extractor::{extract, extract_with, ExtractOptions, MissingStatePolicy};
