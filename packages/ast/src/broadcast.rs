//! Push-based lifecycle notification.
//!
//! Every node carries a totally ordered status. A broadcast pass delivers a
//! node to the sink only when the node sits exactly at the pass's target
//! status, then advances it one step, so a node is delivered for a given
//! status exactly once across the whole pass. `NeverEmit` is terminal and
//! always skipped.

use serde::{Deserialize, Serialize};

use crate::arena::{Arena, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Status {
    Unbroadcast,
    Parsed,
    Processed,
    NeverEmit,
}

impl Status {
    pub fn advanced(self) -> Status {
        match self {
            Status::Unbroadcast => Status::Parsed,
            Status::Parsed => Status::Processed,
            Status::Processed | Status::NeverEmit => Status::NeverEmit,
        }
    }
}

/// Receiver for broadcast deliveries, passed explicitly to every call that
/// must notify observers.
pub trait BroadcastSink {
    fn deliver(&mut self, node: NodeId, arena: &Arena);
}

/// Sink for passes that have no observers.
#[derive(Debug, Default)]
pub struct NullSink;

impl BroadcastSink for NullSink {
    fn deliver(&mut self, _node: NodeId, _arena: &Arena) {}
}

/// Sink that records delivered nodes in order.
#[derive(Debug, Default)]
pub struct Recorder {
    pub delivered: Vec<NodeId>,
}

impl BroadcastSink for Recorder {
    fn deliver(&mut self, node: NodeId, _arena: &Arena) {
        self.delivered.push(node);
    }
}

/// Delivers the node if it sits at `target`, then recurses into its child
/// collection. Empty containers are never broadcast, and skipped nodes do
/// not propagate into their children.
pub fn propagate(arena: &mut Arena, node: NodeId, target: Status, sink: &mut dyn BroadcastSink) {
    if target == Status::NeverEmit {
        return;
    }
    if arena.status(node) != target {
        return;
    }

    sink.deliver(node, arena);
    arena.set_status(node, target.advanced());

    if let Some(children) = arena.children(node) {
        if !arena.is_empty(children) {
            for member in arena.members(children) {
                propagate(arena, member, target, sink);
            }
        }
    }
}
