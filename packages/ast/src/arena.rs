//! Arena-backed syntax tree.
//!
//! Nodes and collections live in dense slot stores addressed by copyable
//! handles. A collection is a doubly-linked ordered sequence of member nodes;
//! each member records its owning collection plus its previous/next siblings,
//! so neighbor navigation and membership changes are O(1) without reference
//! cycles.

use serde::{Deserialize, Serialize};

use crate::broadcast::Status;
use crate::error::{AstError, AstResult};
use crate::node::{DeclarationData, NodeKind, OperatorKind, Span, TermKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CollectionId(u32);

#[derive(Debug, Clone, Serialize, Deserialize)]
struct NodeSlot {
    kind: NodeKind,
    span: Span,
    status: Status,
    comment: Option<String>,
    owner: Option<CollectionId>,
    prev: Option<NodeId>,
    next: Option<NodeId>,
    children: Option<CollectionId>,
    destroyed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CollectionSlot {
    owner: Option<NodeId>,
    head: Option<NodeId>,
    tail: Option<NodeId>,
    len: usize,
}

/// Slot store for one document's nodes and collections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Arena {
    nodes: Vec<NodeSlot>,
    collections: Vec<CollectionSlot>,
}

impl Arena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&mut self, kind: NodeKind, span: Span) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(NodeSlot {
            kind,
            span,
            status: Status::Unbroadcast,
            comment: None,
            owner: None,
            prev: None,
            next: None,
            children: None,
            destroyed: false,
        });
        id
    }

    /// Creates a root node together with its top-level collection.
    pub fn root(&mut self) -> NodeId {
        let root = self.create(NodeKind::Root, Span::synthetic());
        self.ensure_children(root);
        root
    }

    pub fn rule(&mut self, selector: impl Into<String>) -> NodeId {
        let rule = self.create(
            NodeKind::Rule {
                selector: selector.into(),
            },
            Span::synthetic(),
        );
        self.ensure_children(rule);
        rule
    }

    pub fn at_rule(&mut self, name: impl Into<String>, params: impl Into<String>) -> NodeId {
        let at_rule = self.create(
            NodeKind::AtRule {
                name: name.into(),
                params: params.into(),
            },
            Span::synthetic(),
        );
        self.ensure_children(at_rule);
        at_rule
    }

    pub fn declaration(&mut self, name: impl Into<String>, value: impl Into<String>) -> NodeId {
        self.create(
            NodeKind::Declaration(DeclarationData::new(name, value)),
            Span::synthetic(),
        )
    }

    pub fn term(&mut self, kind: TermKind) -> NodeId {
        self.create(NodeKind::Term(kind), Span::synthetic())
    }

    pub fn operator(&mut self, kind: OperatorKind) -> NodeId {
        self.create(NodeKind::Operator(kind), Span::synthetic())
    }

    // ---- accessors ----

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0 as usize].kind
    }

    pub fn kind_mut(&mut self, id: NodeId) -> &mut NodeKind {
        &mut self.nodes[id.0 as usize].kind
    }

    pub fn span(&self, id: NodeId) -> Span {
        self.nodes[id.0 as usize].span
    }

    pub fn status(&self, id: NodeId) -> Status {
        self.nodes[id.0 as usize].status
    }

    pub(crate) fn set_status(&mut self, id: NodeId, status: Status) {
        self.nodes[id.0 as usize].status = status;
    }

    pub fn comment(&self, id: NodeId) -> Option<&str> {
        self.nodes[id.0 as usize].comment.as_deref()
    }

    pub fn set_comment(&mut self, id: NodeId, comment: impl Into<String>) {
        self.nodes[id.0 as usize].comment = Some(comment.into());
    }

    pub fn is_destroyed(&self, id: NodeId) -> bool {
        self.nodes[id.0 as usize].destroyed
    }

    pub fn owner(&self, id: NodeId) -> Option<CollectionId> {
        self.nodes[id.0 as usize].owner
    }

    pub fn prev(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0 as usize].prev
    }

    pub fn next(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0 as usize].next
    }

    pub fn children(&self, id: NodeId) -> Option<CollectionId> {
        self.nodes[id.0 as usize].children
    }

    /// Returns the node's child collection, creating it on first use.
    pub fn ensure_children(&mut self, id: NodeId) -> CollectionId {
        if let Some(existing) = self.nodes[id.0 as usize].children {
            return existing;
        }
        let cid = CollectionId(self.collections.len() as u32);
        self.collections.push(CollectionSlot {
            owner: Some(id),
            head: None,
            tail: None,
            len: 0,
        });
        self.nodes[id.0 as usize].children = Some(cid);
        cid
    }

    pub fn collection_owner(&self, cid: CollectionId) -> Option<NodeId> {
        self.collections[cid.0 as usize].owner
    }

    pub fn head(&self, cid: CollectionId) -> Option<NodeId> {
        self.collections[cid.0 as usize].head
    }

    pub fn tail(&self, cid: CollectionId) -> Option<NodeId> {
        self.collections[cid.0 as usize].tail
    }

    pub fn len(&self, cid: CollectionId) -> usize {
        self.collections[cid.0 as usize].len
    }

    pub fn is_empty(&self, cid: CollectionId) -> bool {
        self.collections[cid.0 as usize].len == 0
    }

    /// Iterates members in collection order.
    pub fn iter(&self, cid: CollectionId) -> CollectionIter<'_> {
        CollectionIter {
            arena: self,
            cursor: self.head(cid),
        }
    }

    pub fn members(&self, cid: CollectionId) -> Vec<NodeId> {
        self.iter(cid).collect()
    }

    // ---- mutation ----

    fn check_alive(&self, id: NodeId) -> AstResult<()> {
        if self.is_destroyed(id) {
            Err(AstError::DestroyedNode)
        } else {
            Ok(())
        }
    }

    fn unlink(&mut self, id: NodeId) {
        let slot = &mut self.nodes[id.0 as usize];
        let (owner, prev, next) = (slot.owner, slot.prev, slot.next);
        slot.owner = None;
        slot.prev = None;
        slot.next = None;

        let Some(cid) = owner else { return };
        match prev {
            Some(p) => self.nodes[p.0 as usize].next = next,
            None => self.collections[cid.0 as usize].head = next,
        }
        match next {
            Some(n) => self.nodes[n.0 as usize].prev = prev,
            None => self.collections[cid.0 as usize].tail = prev,
        }
        self.collections[cid.0 as usize].len -= 1;
    }

    /// Removes the member from its collection. Detaching an unattached node
    /// is a no-op.
    pub fn detach(&mut self, id: NodeId) -> AstResult<()> {
        self.check_alive(id)?;
        self.unlink(id);
        Ok(())
    }

    /// Appends the member at the end of the collection, detaching it from any
    /// previous collection first (exclusive membership).
    pub fn append(&mut self, cid: CollectionId, member: NodeId) -> AstResult<()> {
        self.check_alive(member)?;
        self.unlink(member);

        let tail = self.collections[cid.0 as usize].tail;
        let slot = &mut self.nodes[member.0 as usize];
        slot.owner = Some(cid);
        slot.prev = tail;
        slot.next = None;
        match tail {
            Some(t) => self.nodes[t.0 as usize].next = Some(member),
            None => self.collections[cid.0 as usize].head = Some(member),
        }
        self.collections[cid.0 as usize].tail = Some(member);
        self.collections[cid.0 as usize].len += 1;
        Ok(())
    }

    pub fn prepend(&mut self, cid: CollectionId, member: NodeId) -> AstResult<()> {
        self.check_alive(member)?;
        self.unlink(member);

        let head = self.collections[cid.0 as usize].head;
        let slot = &mut self.nodes[member.0 as usize];
        slot.owner = Some(cid);
        slot.prev = None;
        slot.next = head;
        match head {
            Some(h) => self.nodes[h.0 as usize].prev = Some(member),
            None => self.collections[cid.0 as usize].tail = Some(member),
        }
        self.collections[cid.0 as usize].head = Some(member);
        self.collections[cid.0 as usize].len += 1;
        Ok(())
    }

    /// Inserts the member immediately before the subject, inside the
    /// subject's collection.
    pub fn prepend_before(&mut self, subject: NodeId, member: NodeId) -> AstResult<()> {
        self.check_alive(subject)?;
        self.check_alive(member)?;
        if subject == member {
            return Ok(());
        }
        self.unlink(member);

        let cid = self.owner(subject).ok_or(AstError::NotAttached)?;
        let prev = self.prev(subject);
        let slot = &mut self.nodes[member.0 as usize];
        slot.owner = Some(cid);
        slot.prev = prev;
        slot.next = Some(subject);
        self.nodes[subject.0 as usize].prev = Some(member);
        match prev {
            Some(p) => self.nodes[p.0 as usize].next = Some(member),
            None => self.collections[cid.0 as usize].head = Some(member),
        }
        self.collections[cid.0 as usize].len += 1;
        Ok(())
    }

    /// Inserts the member immediately after the subject.
    pub fn append_after(&mut self, subject: NodeId, member: NodeId) -> AstResult<()> {
        self.check_alive(subject)?;
        self.check_alive(member)?;
        if subject == member {
            return Ok(());
        }
        self.unlink(member);

        let cid = self.owner(subject).ok_or(AstError::NotAttached)?;
        let next = self.next(subject);
        let slot = &mut self.nodes[member.0 as usize];
        slot.owner = Some(cid);
        slot.prev = Some(subject);
        slot.next = next;
        self.nodes[subject.0 as usize].next = Some(member);
        match next {
            Some(n) => self.nodes[n.0 as usize].prev = Some(member),
            None => self.collections[cid.0 as usize].tail = Some(member),
        }
        self.collections[cid.0 as usize].len += 1;
        Ok(())
    }

    /// Replaces the subject with the member; the subject is detached but not
    /// destroyed.
    pub fn replace_with(&mut self, subject: NodeId, member: NodeId) -> AstResult<()> {
        self.prepend_before(subject, member)?;
        self.unlink(subject);
        Ok(())
    }

    /// Detaches the node and marks it and its entire subtree terminal. A
    /// destroyed node rejects all further mutation.
    pub fn destroy(&mut self, id: NodeId) -> AstResult<()> {
        self.check_alive(id)?;
        self.unlink(id);
        self.mark_destroyed(id);
        Ok(())
    }

    fn mark_destroyed(&mut self, id: NodeId) {
        self.nodes[id.0 as usize].destroyed = true;
        self.nodes[id.0 as usize].status = Status::NeverEmit;
        if let Some(cid) = self.children(id) {
            for member in self.members(cid) {
                self.mark_destroyed(member);
            }
        }
    }

    /// Structural copy of a node and its subtree. The clone is detached,
    /// unbroadcast, and gets fresh handles throughout.
    pub fn deep_clone(&mut self, id: NodeId) -> NodeId {
        let kind = self.kind(id).clone();
        let span = self.span(id);
        let comment = self.nodes[id.0 as usize].comment.clone();
        let clone = self.create(kind, span);
        self.nodes[clone.0 as usize].comment = comment;

        if let Some(cid) = self.children(id) {
            let clone_cid = self.ensure_children(clone);
            for member in self.members(cid) {
                let member_clone = self.deep_clone(member);
                // members of a fresh collection cannot be destroyed
                let _ = self.append(clone_cid, member_clone);
            }
        }
        clone
    }
}

pub struct CollectionIter<'a> {
    arena: &'a Arena,
    cursor: Option<NodeId>,
}

impl Iterator for CollectionIter<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.cursor?;
        self.cursor = self.arena.next(current);
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block_with(arena: &mut Arena, names: &[&str]) -> (NodeId, CollectionId, Vec<NodeId>) {
        let rule = arena.rule("a");
        let body = arena.children(rule).unwrap();
        let decls: Vec<NodeId> = names
            .iter()
            .map(|name| {
                let decl = arena.declaration(*name, "1");
                arena.append(body, decl).unwrap();
                decl
            })
            .collect();
        (rule, body, decls)
    }

    #[test]
    fn append_preserves_order_and_links() {
        let mut arena = Arena::new();
        let (_, body, decls) = block_with(&mut arena, &["a", "b", "c"]);

        assert_eq!(arena.members(body), decls);
        assert_eq!(arena.head(body), Some(decls[0]));
        assert_eq!(arena.tail(body), Some(decls[2]));
        assert_eq!(arena.prev(decls[1]), Some(decls[0]));
        assert_eq!(arena.next(decls[1]), Some(decls[2]));
        assert_eq!(arena.len(body), 3);
    }

    #[test]
    fn prepend_before_links_member_as_previous_sibling() {
        let mut arena = Arena::new();
        let (_, body, decls) = block_with(&mut arena, &["a", "b"]);
        let x = arena.declaration("x", "1");

        arena.prepend_before(decls[1], x).unwrap();

        assert_eq!(arena.prev(decls[1]), Some(x));
        assert_eq!(arena.next(decls[0]), Some(x));
        assert_eq!(arena.members(body), vec![decls[0], x, decls[1]]);
    }

    #[test]
    fn insert_enforces_exclusive_membership() {
        let mut arena = Arena::new();
        let (_, first, _) = block_with(&mut arena, &[]);
        let (_, second, _) = block_with(&mut arena, &[]);
        let decl = arena.declaration("color", "red");

        arena.append(first, decl).unwrap();
        assert_eq!(arena.owner(decl), Some(first));

        arena.append(second, decl).unwrap();
        assert_eq!(arena.owner(decl), Some(second));
        assert!(arena.is_empty(first));
        assert_eq!(arena.len(second), 1);
    }

    #[test]
    fn replace_with_swaps_and_detaches_subject() {
        let mut arena = Arena::new();
        let (_, body, decls) = block_with(&mut arena, &["a", "b", "c"]);
        let x = arena.declaration("x", "1");

        arena.replace_with(decls[1], x).unwrap();

        assert_eq!(arena.members(body), vec![decls[0], x, decls[2]]);
        assert_eq!(arena.owner(decls[1]), None);
        assert!(!arena.is_destroyed(decls[1]));
    }

    #[test]
    fn destroy_detaches_and_rejects_further_mutation() {
        let mut arena = Arena::new();
        let (_, body, decls) = block_with(&mut arena, &["a", "b"]);

        arena.destroy(decls[0]).unwrap();

        assert_eq!(arena.owner(decls[0]), None);
        assert_eq!(arena.members(body), vec![decls[1]]);
        assert_eq!(arena.status(decls[0]), Status::NeverEmit);
        assert_eq!(arena.append(body, decls[0]), Err(AstError::DestroyedNode));
        assert_eq!(arena.destroy(decls[0]), Err(AstError::DestroyedNode));
    }

    #[test]
    fn destroy_marks_subtree_terminal() {
        let mut arena = Arena::new();
        let root = arena.root();
        let top = arena.children(root).unwrap();
        let (rule, _, decls) = block_with(&mut arena, &["a"]);
        arena.append(top, rule).unwrap();

        arena.destroy(rule).unwrap();

        assert!(arena.is_destroyed(decls[0]));
        assert_eq!(arena.status(decls[0]), Status::NeverEmit);
    }

    #[test]
    fn insert_before_detached_subject_is_an_error() {
        let mut arena = Arena::new();
        let a = arena.declaration("a", "1");
        let b = arena.declaration("b", "1");

        assert_eq!(arena.prepend_before(a, b), Err(AstError::NotAttached));
    }

    #[test]
    fn deep_clone_copies_subtree_with_fresh_links() {
        let mut arena = Arena::new();
        let (rule, body, decls) = block_with(&mut arena, &["a", "b"]);

        let clone = arena.deep_clone(rule);

        assert_eq!(arena.owner(clone), None);
        let clone_body = arena.children(clone).unwrap();
        assert_ne!(clone_body, body);
        assert_eq!(arena.len(clone_body), 2);
        for (original, copy) in decls.iter().zip(arena.members(clone_body)) {
            assert_ne!(*original, copy);
            assert_eq!(arena.kind(*original), arena.kind(copy));
        }
    }
}
