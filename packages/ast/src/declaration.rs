//! Lazy refinement of raw declarations into structured form.
//!
//! A declaration enters the tree as raw name/value text. `refine` performs
//! the one-time raw → structured transition: the name is resolved against the
//! registry, the value is parsed into a Term/Operator graph stored as the
//! declaration's child collection, and the newly created structural nodes are
//! broadcast exactly once. A second call is a no-op.

use tracing::debug;

use crate::arena::{Arena, CollectionId, NodeId};
use crate::broadcast::{propagate, BroadcastSink, Status};
use crate::error::{AstError, RefineError, RefineResult};
use crate::node::{NodeKind, RefinedDeclaration, TermKind};
use crate::registry::{NameRegistry, PropertyName};
use crate::value::parse_value_into;

pub fn refine(
    arena: &mut Arena,
    decl: NodeId,
    registry: &dyn NameRegistry,
    sink: &mut dyn BroadcastSink,
) -> RefineResult<()> {
    if arena.is_destroyed(decl) {
        return Err(AstError::DestroyedNode.into());
    }
    let data = arena
        .kind(decl)
        .as_declaration()
        .ok_or(AstError::UnexpectedKind)?;
    if data.refined.is_some() {
        return Ok(());
    }

    let raw_name = data.raw_name.clone();
    let raw_value = data.raw_value.clone();

    let name = PropertyName::resolve(&raw_name, registry);
    let (value_text, important) = strip_important(&raw_value);
    let grammar = registry.grammar_for(name.as_str());
    debug!(name = %name.as_str(), ?grammar, "refining declaration");

    let value = arena.ensure_children(decl);
    parse_value_into(arena, value, value_text, grammar)?;
    if arena.is_empty(value) {
        return Err(RefineError::MissingValue {
            name: name.as_str().to_string(),
        });
    }

    if let Some(data) = arena.kind_mut(decl).as_declaration_mut() {
        data.refined = Some(RefinedDeclaration { name, important });
    }

    for member in arena.members(value) {
        propagate(arena, member, Status::Unbroadcast, sink);
    }
    Ok(())
}

/// Splits a trailing `!important` (any case) off the raw value text.
fn strip_important(raw: &str) -> (&str, bool) {
    let trimmed = raw.trim_end();
    if trimmed.len() >= "!important".len() {
        let split = trimmed.len() - "!important".len();
        if trimmed[split..].eq_ignore_ascii_case("!important") {
            return (trimmed[..split].trim_end(), true);
        }
    }
    (trimmed, false)
}

pub fn is_refined(arena: &Arena, decl: NodeId) -> bool {
    matches!(
        arena.kind(decl).as_declaration(),
        Some(data) if data.refined.is_some()
    )
}

pub fn refined(arena: &Arena, decl: NodeId) -> Option<&RefinedDeclaration> {
    arena.kind(decl).as_declaration()?.refined.as_ref()
}

/// Structured name text if refined, otherwise the normalized raw name.
pub fn effective_name(arena: &Arena, decl: NodeId) -> Option<String> {
    let data = arena.kind(decl).as_declaration()?;
    match &data.refined {
        Some(refined) => Some(refined.name.as_str().to_string()),
        None => Some(data.raw_name.trim().to_ascii_lowercase()),
    }
}

/// The structured value graph, present only after refinement.
pub fn value_collection(arena: &Arena, decl: NodeId) -> Option<CollectionId> {
    if is_refined(arena, decl) {
        arena.children(decl)
    } else {
        None
    }
}

/// Top-level word terms of a refined value, in order.
pub fn value_words(arena: &Arena, decl: NodeId) -> Vec<(NodeId, String)> {
    let Some(value) = value_collection(arena, decl) else {
        return Vec::new();
    };
    arena
        .iter(value)
        .filter_map(|id| match arena.kind(id) {
            NodeKind::Term(TermKind::Word { text }) => Some((id, text.clone())),
            _ => None,
        })
        .collect()
}

/// Walks owner links upward to the declaration hosting a value-level node.
pub fn host_declaration(arena: &Arena, node: NodeId) -> Option<NodeId> {
    let mut current = node;
    loop {
        let collection = arena.owner(current)?;
        let owner = arena.collection_owner(collection)?;
        if arena.kind(owner).is_declaration() {
            return Some(owner);
        }
        current = owner;
    }
}
