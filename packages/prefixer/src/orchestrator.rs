//! Per-unit orchestration of the handler chains.

use std::collections::HashSet;

use tracing::{debug, instrument};

use stylecraft_ast::{is_refined, Arena, NodeId, NodeKind, TermKind};

use crate::handlers::{split_pseudo, Category};
use crate::matrix::SupportMatrix;
use crate::vendor::is_unprefixed;
use crate::error::PrefixResult;

/// Policy flags for discovered prefixed equivalents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Options {
    /// Relocate discovered equivalents immediately before their unprefixed
    /// subject.
    pub rearrange: bool,

    /// Destroy equivalents whose prefix the matrix no longer requires.
    pub prune: bool,
}

/// Handler chains per entry point, in first-match-wins order: the specific
/// categories run before the generic property fallback.
const DECLARATION_CHAIN: &[Category] = &[
    Category::Transition,
    Category::DisplayFlex,
    Category::FlexDirection,
    Category::JustifyContent,
    Category::Order,
    Category::Property,
];
const FUNCTION_CHAIN: &[Category] = &[Category::Function];
const KEYWORD_CHAIN: &[Category] = &[Category::Keyword];
const AT_RULE_CHAIN: &[Category] = &[Category::AtRule];
const PSEUDO_CHAIN: &[Category] = &[Category::PseudoElement];

/// Runs the handler chain for each syntax unit an external traversal
/// delivers, mutating the tree in place.
#[derive(Debug)]
pub struct Prefixer<'d> {
    matrix: SupportMatrix<'d>,
    options: Options,
}

impl<'d> Prefixer<'d> {
    pub fn new(matrix: SupportMatrix<'d>) -> Self {
        Self {
            matrix,
            options: Options::default(),
        }
    }

    pub fn with_options(matrix: SupportMatrix<'d>, options: Options) -> Self {
        Self { matrix, options }
    }

    pub fn matrix(&self) -> &SupportMatrix<'d> {
        &self.matrix
    }

    #[instrument(level = "debug", skip(self, arena))]
    pub fn declaration(&self, arena: &mut Arena, unit: NodeId) -> PrefixResult<bool> {
        self.run_chain(arena, unit, DECLARATION_CHAIN)
    }

    #[instrument(level = "debug", skip(self, arena))]
    pub fn function(&self, arena: &mut Arena, unit: NodeId) -> PrefixResult<bool> {
        self.run_chain(arena, unit, FUNCTION_CHAIN)
    }

    #[instrument(level = "debug", skip(self, arena))]
    pub fn keyword(&self, arena: &mut Arena, unit: NodeId) -> PrefixResult<bool> {
        self.run_chain(arena, unit, KEYWORD_CHAIN)
    }

    #[instrument(level = "debug", skip(self, arena))]
    pub fn at_rule(&self, arena: &mut Arena, unit: NodeId) -> PrefixResult<bool> {
        self.run_chain(arena, unit, AT_RULE_CHAIN)
    }

    #[instrument(level = "debug", skip(self, arena))]
    pub fn pseudo_element_selector(&self, arena: &mut Arena, unit: NodeId) -> PrefixResult<bool> {
        self.run_chain(arena, unit, PSEUDO_CHAIN)
    }

    fn run_chain(
        &self,
        arena: &mut Arena,
        unit: NodeId,
        chain: &[Category],
    ) -> PrefixResult<bool> {
        if !eligible(arena, unit)? {
            return Ok(false);
        }
        for &category in chain {
            if self.run_handler(arena, unit, category)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn run_handler(
        &self,
        arena: &mut Arena,
        unit: NodeId,
        category: Category,
    ) -> PrefixResult<bool> {
        let handler = category.table();
        if !(handler.applicable)(arena, &self.matrix, unit) {
            return Ok(false);
        }

        let required = (handler.required)(arena, &self.matrix, unit)?;
        let mut found = (handler.equivalents)(arena, unit)?;
        let subject = (handler.subject)(arena, unit);
        debug!(?category, required = required.len(), found = found.len(), "running handler");

        let mut consumed = HashSet::new();
        for &prefix in &required {
            match found.remove(&prefix) {
                Some(peers) => {
                    consumed.extend(peers.iter().copied());
                    if self.options.rearrange {
                        for peer in peers {
                            arena.prepend_before(subject, peer)?;
                        }
                    }
                }
                None => (handler.copy)(arena, &self.matrix, subject, prefix)?,
            }
        }

        for (_, peers) in found {
            for peer in peers {
                if consumed.contains(&peer) || arena.is_destroyed(peer) {
                    continue;
                }
                if self.options.prune {
                    arena.destroy(peer)?;
                } else if self.options.rearrange {
                    arena.prepend_before(subject, peer)?;
                }
            }
        }

        Ok(!required.is_empty())
    }
}

/// Step-one skip conditions: destroyed or unrefined units, and units that
/// are themselves already prefixed, never enter a handler chain.
fn eligible(arena: &Arena, unit: NodeId) -> PrefixResult<bool> {
    if arena.is_destroyed(unit) {
        return Ok(false);
    }
    match arena.kind(unit) {
        NodeKind::Declaration(_) => {
            if !is_refined(arena, unit) {
                return Ok(false);
            }
            let name = stylecraft_ast::effective_name(arena, unit).unwrap_or_default();
            is_unprefixed(&name)
        }
        NodeKind::Term(TermKind::Word { text }) => is_unprefixed(text),
        NodeKind::Term(TermKind::Function { name }) => is_unprefixed(name),
        NodeKind::AtRule { name, .. } => is_unprefixed(name),
        NodeKind::Rule { selector } => match split_pseudo(selector) {
            Some(pseudo) => is_unprefixed(&pseudo.name),
            None => Ok(true),
        },
        _ => Ok(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browsers::{Browser, BrowserSelection};
    use crate::data::{CompatTable, FeatureKind};
    use stylecraft_ast::{refine, NullSink, SetRegistry};

    fn provider() -> CompatTable {
        CompatTable::new()
            .with_versions(Browser::Chrome, &["19", "20", "21"])
            .unwrap()
            .with_prefixed(FeatureKind::Property, "widget", Browser::Chrome, "20")
            .unwrap()
    }

    #[test]
    fn unrefined_declarations_are_skipped() {
        let provider = provider();
        let mut selection = BrowserSelection::new();
        selection.all(&provider, Browser::Chrome).unwrap();
        let prefixer = Prefixer::new(SupportMatrix::new(&selection, &provider));

        let mut arena = Arena::new();
        let rule = arena.rule("a");
        let body = arena.children(rule).unwrap();
        let decl = arena.declaration("widget", "1");
        arena.append(body, decl).unwrap();

        assert!(!prefixer.declaration(&mut arena, decl).unwrap());
        assert_eq!(arena.len(body), 1);
    }

    #[test]
    fn already_prefixed_units_are_skipped() {
        let provider = provider();
        let mut selection = BrowserSelection::new();
        selection.all(&provider, Browser::Chrome).unwrap();
        let prefixer = Prefixer::new(SupportMatrix::new(&selection, &provider));

        let mut arena = Arena::new();
        let rule = arena.rule("a");
        let body = arena.children(rule).unwrap();
        let decl = arena.declaration("-webkit-widget", "1");
        arena.append(body, decl).unwrap();
        refine(&mut arena, decl, &SetRegistry::new(), &mut NullSink).unwrap();

        assert!(!prefixer.declaration(&mut arena, decl).unwrap());
        assert_eq!(arena.len(body), 1);
    }
}
