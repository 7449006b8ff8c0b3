//! Bidirectional peer search for existing prefixed counterparts.

use std::collections::BTreeMap;

use stylecraft_ast::{Arena, NodeId};

use crate::error::PrefixResult;
use crate::vendor::Prefix;

/// How far a walk scans past peers that do not match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkPolicy {
    /// Keep scanning to the ends of the collection, skipping non-matches.
    /// Used for loosely grouped members such as declarations in one block.
    All,

    /// Stop at the first non-match in each direction. Used where only
    /// immediate contiguity counts, such as consecutive at-rules.
    AdjacentOnly,
}

/// Peers hosting a prefixed counterpart, grouped by prefix. Map and member
/// order are deterministic: backward matches nearest-first, then forward.
pub type Equivalents = BTreeMap<Prefix, Vec<NodeId>>;

/// Walks backward then forward from `origin`, asking `locate` whether each
/// peer hosts a prefixed counterpart of `unit`. A peer confirmed under
/// several prefixes is recorded once per prefix.
pub fn find_equivalents<F>(
    arena: &Arena,
    unit: NodeId,
    origin: NodeId,
    policy: WalkPolicy,
    locate: F,
) -> PrefixResult<Equivalents>
where
    F: Fn(&Arena, NodeId, NodeId) -> PrefixResult<Vec<Prefix>>,
{
    let mut found = Equivalents::new();

    let mut cursor = arena.prev(origin);
    while let Some(peer) = cursor {
        if !record(arena, peer, unit, &locate, &mut found)? && policy == WalkPolicy::AdjacentOnly {
            break;
        }
        cursor = arena.prev(peer);
    }

    let mut cursor = arena.next(origin);
    while let Some(peer) = cursor {
        if !record(arena, peer, unit, &locate, &mut found)? && policy == WalkPolicy::AdjacentOnly {
            break;
        }
        cursor = arena.next(peer);
    }

    Ok(found)
}

fn record<F>(
    arena: &Arena,
    peer: NodeId,
    unit: NodeId,
    locate: &F,
    found: &mut Equivalents,
) -> PrefixResult<bool>
where
    F: Fn(&Arena, NodeId, NodeId) -> PrefixResult<Vec<Prefix>>,
{
    let prefixes = locate(arena, peer, unit)?;
    let matched = !prefixes.is_empty();
    for prefix in prefixes {
        let peers = found.entry(prefix).or_default();
        if !peers.contains(&peer) {
            peers.push(peer);
        }
    }
    Ok(matched)
}
