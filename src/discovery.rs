// Copyright 2025 Cornell University
// released under MIT License

use crate::delegate::{DelegateKey, OrderedSet};
use crate::ir::Choreography;

/// The coordination delegates needed by `choreo`: one per distinct
/// (sender, receiver) pair of its message edges, in order of first use.
pub fn find_coordination_delegates(choreo: &Choreography) -> Vec<DelegateKey> {
    let keys: OrderedSet<DelegateKey> = choreo
        .message_edges()
        .map(|(_, edge)| DelegateKey::of(choreo, edge))
        .collect();
    keys.into_iter().collect()
}
