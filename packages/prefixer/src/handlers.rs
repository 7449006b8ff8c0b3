//! Per-category prefixing strategies.
//!
//! Categories form a closed set; each one is a table of function handles
//! (`applicable`, `required_prefixes`, `subject`, `equivalents`, `copy`)
//! rather than a trait object hierarchy. The orchestrator runs a fixed chain
//! of categories per syntax unit and stops at the first one that reports the
//! unit handled.

use std::collections::BTreeSet;

use stylecraft_ast::{
    effective_name, host_declaration, refined, value_collection, value_words, Arena, NodeId,
    NodeKind, PropertyName, RefinedDeclaration, TermKind,
};

use crate::data::FeatureKind;
use crate::error::PrefixResult;
use crate::matrix::SupportMatrix;
use crate::vendor::{split_prefixed, Prefix};
use crate::walker::{find_equivalents, Equivalents, WalkPolicy};
use crate::flexbox;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Transition,
    DisplayFlex,
    FlexDirection,
    JustifyContent,
    Order,
    Property,
    AtRule,
    PseudoElement,
    Function,
    Keyword,
}

pub struct Handler {
    pub applicable: fn(&Arena, &SupportMatrix<'_>, NodeId) -> bool,
    pub required: fn(&Arena, &SupportMatrix<'_>, NodeId) -> PrefixResult<BTreeSet<Prefix>>,
    pub subject: fn(&Arena, NodeId) -> NodeId,
    pub equivalents: fn(&Arena, NodeId) -> PrefixResult<Equivalents>,
    pub copy: fn(&mut Arena, &SupportMatrix<'_>, NodeId, Prefix) -> PrefixResult<()>,
}

impl Category {
    pub(crate) fn table(self) -> &'static Handler {
        match self {
            Category::Transition => &TRANSITION,
            Category::DisplayFlex => &flexbox::DISPLAY_FLEX,
            Category::FlexDirection => &flexbox::FLEX_DIRECTION,
            Category::JustifyContent => &flexbox::JUSTIFY_CONTENT,
            Category::Order => &flexbox::ORDER,
            Category::Property => &PROPERTY,
            Category::AtRule => &AT_RULE,
            Category::PseudoElement => &PSEUDO_ELEMENT,
            Category::Function => &FUNCTION,
            Category::Keyword => &KEYWORD,
        }
    }
}

// ---- shared helpers ----

pub(crate) fn identity_subject(_arena: &Arena, unit: NodeId) -> NodeId {
    unit
}

pub(crate) fn host_subject(arena: &Arena, unit: NodeId) -> NodeId {
    host_declaration(arena, unit).unwrap_or(unit)
}

pub(crate) fn set_decl_name(arena: &mut Arena, decl: NodeId, name: &str) {
    if let Some(data) = arena.kind_mut(decl).as_declaration_mut() {
        data.raw_name = name.to_string();
        if let Some(refined) = &mut data.refined {
            refined.name.set_text(name);
        }
    }
}

pub(crate) fn set_word(arena: &mut Arena, term: NodeId, text: &str) {
    if let NodeKind::Term(TermKind::Word { text: word }) = arena.kind_mut(term) {
        *word = text.to_string();
    }
}

fn set_function_name(arena: &mut Arena, term: NodeId, text: &str) {
    if let NodeKind::Term(TermKind::Function { name }) = arena.kind_mut(term) {
        *name = text.to_string();
    }
}

fn term_text(kind: &TermKind) -> String {
    match kind {
        TermKind::Word { text } | TermKind::Hash { text } | TermKind::Quoted { text } => {
            text.clone()
        }
        TermKind::Number { value, unit } => {
            let unit = unit.as_deref().unwrap_or("");
            if value.fract() == 0.0 {
                format!("{}{}", *value as i64, unit)
            } else {
                format!("{}{}", value, unit)
            }
        }
        TermKind::Function { name } => format!("{}()", name),
    }
}

/// Builds an already-refined declaration from explicit terms, for copy rules
/// that synthesize a different historical vocabulary.
pub(crate) fn synthesize_declaration(
    arena: &mut Arena,
    name: &str,
    important: bool,
    terms: &[TermKind],
) -> NodeId {
    let raw_value = terms.iter().map(term_text).collect::<Vec<_>>().join(" ");
    let decl = arena.declaration(name, raw_value);
    if let Some(data) = arena.kind_mut(decl).as_declaration_mut() {
        data.refined = Some(RefinedDeclaration {
            name: PropertyName::unknown(name),
            important,
        });
    }
    let value = arena.ensure_children(decl);
    for kind in terms {
        let term = arena.term(kind.clone());
        // fresh nodes in a fresh collection cannot fail to attach
        let _ = arena.append(value, term);
    }
    decl
}

pub(crate) fn is_important(arena: &Arena, decl: NodeId) -> bool {
    refined(arena, decl).is_some_and(|r| r.important)
}

pub(crate) fn first_word(arena: &Arena, decl: NodeId) -> Option<String> {
    value_words(arena, decl).into_iter().map(|(_, w)| w).next()
}

pub(crate) fn first_number(arena: &Arena, decl: NodeId) -> Option<(f64, Option<String>)> {
    let value = value_collection(arena, decl)?;
    arena.iter(value).find_map(|id| match arena.kind(id) {
        NodeKind::Term(TermKind::Number { value, unit }) => Some((*value, unit.clone())),
        _ => None,
    })
}

/// All function terms in a refined value, including nested arguments.
fn collect_functions(arena: &Arena, decl: NodeId) -> Vec<(NodeId, String)> {
    let mut out = Vec::new();
    if let Some(value) = value_collection(arena, decl) {
        collect_functions_in(arena, value, &mut out);
    }
    out
}

fn collect_functions_in(
    arena: &Arena,
    collection: stylecraft_ast::CollectionId,
    out: &mut Vec<(NodeId, String)>,
) {
    for id in arena.iter(collection) {
        if let NodeKind::Term(TermKind::Function { name }) = arena.kind(id) {
            out.push((id, name.clone()));
            if let Some(args) = arena.children(id) {
                collect_functions_in(arena, args, out);
            }
        }
    }
}

fn refined_decl_name(arena: &Arena, unit: NodeId) -> String {
    effective_name(arena, unit).unwrap_or_default()
}

// ---- generic property ----

fn property_applicable(arena: &Arena, _matrix: &SupportMatrix<'_>, unit: NodeId) -> bool {
    arena.kind(unit).is_declaration()
}

fn property_required(
    arena: &Arena,
    matrix: &SupportMatrix<'_>,
    unit: NodeId,
) -> PrefixResult<BTreeSet<Prefix>> {
    let name = refined_decl_name(arena, unit);
    Ok(matrix.required_prefixes(FeatureKind::Property, &name))
}

fn property_equivalents(arena: &Arena, unit: NodeId) -> PrefixResult<Equivalents> {
    let name = refined_decl_name(arena, unit);
    find_equivalents(arena, unit, unit, WalkPolicy::All, move |arena, peer, _| {
        if !arena.kind(peer).is_declaration() {
            return Ok(Vec::new());
        }
        let peer_name = refined_decl_name(arena, peer);
        match split_prefixed(&peer_name)? {
            Some((prefix, rest)) if rest == name => Ok(vec![prefix]),
            _ => Ok(Vec::new()),
        }
    })
}

fn property_copy(
    arena: &mut Arena,
    _matrix: &SupportMatrix<'_>,
    subject: NodeId,
    prefix: Prefix,
) -> PrefixResult<()> {
    let name = refined_decl_name(arena, subject);
    let clone = arena.deep_clone(subject);
    set_decl_name(arena, clone, &prefix.apply(&name));
    arena.prepend_before(subject, clone)?;
    Ok(())
}

static PROPERTY: Handler = Handler {
    applicable: property_applicable,
    required: property_required,
    subject: identity_subject,
    equivalents: property_equivalents,
    copy: property_copy,
};

// ---- transition ----

fn is_transition_name(name: &str) -> bool {
    matches!(name, "transition" | "transition-property")
}

fn transition_applicable(arena: &Arena, _matrix: &SupportMatrix<'_>, unit: NodeId) -> bool {
    arena.kind(unit).is_declaration() && is_transition_name(&refined_decl_name(arena, unit))
}

fn transition_required(
    arena: &Arena,
    matrix: &SupportMatrix<'_>,
    unit: NodeId,
) -> PrefixResult<BTreeSet<Prefix>> {
    let name = refined_decl_name(arena, unit);
    let mut required = matrix.required_prefixes(FeatureKind::Property, &name);
    for (_, word) in value_words(arena, unit) {
        required.extend(matrix.required_prefixes(FeatureKind::Property, &word));
    }
    Ok(required)
}

fn transition_equivalents(arena: &Arena, unit: NodeId) -> PrefixResult<Equivalents> {
    let name = refined_decl_name(arena, unit);
    find_equivalents(arena, unit, unit, WalkPolicy::All, move |arena, peer, _| {
        if !arena.kind(peer).is_declaration() {
            return Ok(Vec::new());
        }
        let peer_name = refined_decl_name(arena, peer);
        let mut prefixes = Vec::new();
        match split_prefixed(&peer_name)? {
            // a prefixed-name twin of this transition declaration
            Some((prefix, rest)) => {
                if rest == name {
                    prefixes.push(prefix);
                }
            }
            // same name; prefixed property references inside the value
            None if peer_name == name => {
                for (_, word) in value_words(arena, peer) {
                    if let Some((prefix, _)) = split_prefixed(&word)? {
                        if !prefixes.contains(&prefix) {
                            prefixes.push(prefix);
                        }
                    }
                }
            }
            None => {}
        }
        Ok(prefixes)
    })
}

fn transition_copy(
    arena: &mut Arena,
    matrix: &SupportMatrix<'_>,
    subject: NodeId,
    prefix: Prefix,
) -> PrefixResult<()> {
    let name = refined_decl_name(arena, subject);
    let clone = arena.deep_clone(subject);
    if matrix.requires_prefix(FeatureKind::Property, prefix, &name) {
        set_decl_name(arena, clone, &prefix.apply(&name));
    }
    for (term, word) in value_words(arena, clone) {
        if matrix.requires_prefix(FeatureKind::Property, prefix, &word) {
            set_word(arena, term, &prefix.apply(&word));
        }
    }
    arena.prepend_before(subject, clone)?;
    Ok(())
}

static TRANSITION: Handler = Handler {
    applicable: transition_applicable,
    required: transition_required,
    subject: identity_subject,
    equivalents: transition_equivalents,
    copy: transition_copy,
};

// ---- at-rules ----

fn at_rule_parts(arena: &Arena, unit: NodeId) -> Option<(String, String)> {
    match arena.kind(unit) {
        NodeKind::AtRule { name, params } => Some((name.clone(), params.clone())),
        _ => None,
    }
}

fn at_rule_applicable(arena: &Arena, _matrix: &SupportMatrix<'_>, unit: NodeId) -> bool {
    matches!(arena.kind(unit), NodeKind::AtRule { .. })
}

fn at_rule_required(
    arena: &Arena,
    matrix: &SupportMatrix<'_>,
    unit: NodeId,
) -> PrefixResult<BTreeSet<Prefix>> {
    let Some((name, _)) = at_rule_parts(arena, unit) else {
        return Ok(BTreeSet::new());
    };
    Ok(matrix.required_prefixes(FeatureKind::AtRule, &name))
}

fn at_rule_equivalents(arena: &Arena, unit: NodeId) -> PrefixResult<Equivalents> {
    let Some((name, params)) = at_rule_parts(arena, unit) else {
        return Ok(Equivalents::new());
    };
    find_equivalents(
        arena,
        unit,
        unit,
        WalkPolicy::AdjacentOnly,
        move |arena, peer, _| {
            let Some((peer_name, peer_params)) = at_rule_parts(arena, peer) else {
                return Ok(Vec::new());
            };
            match split_prefixed(&peer_name)? {
                Some((prefix, rest)) if rest == name && peer_params == params => {
                    Ok(vec![prefix])
                }
                _ => Ok(Vec::new()),
            }
        },
    )
}

fn at_rule_copy(
    arena: &mut Arena,
    _matrix: &SupportMatrix<'_>,
    subject: NodeId,
    prefix: Prefix,
) -> PrefixResult<()> {
    let Some((name, _)) = at_rule_parts(arena, subject) else {
        return Ok(());
    };
    let clone = arena.deep_clone(subject);
    if let NodeKind::AtRule { name: clone_name, .. } = arena.kind_mut(clone) {
        *clone_name = prefix.apply(&name);
    }
    arena.prepend_before(subject, clone)?;
    Ok(())
}

static AT_RULE: Handler = Handler {
    applicable: at_rule_applicable,
    required: at_rule_required,
    subject: identity_subject,
    equivalents: at_rule_equivalents,
    copy: at_rule_copy,
};

// ---- pseudo-element selectors ----

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PseudoParts {
    pub before: String,
    pub colons: String,
    pub name: String,
    pub after: String,
}

impl PseudoParts {
    /// Feature id, colons included (`::placeholder`).
    pub fn id(&self) -> String {
        format!("{}{}", self.colons, self.name)
    }

    pub fn with_name(&self, name: &str) -> String {
        format!("{}{}{}{}", self.before, self.colons, name, self.after)
    }
}

pub(crate) fn split_pseudo(selector: &str) -> Option<PseudoParts> {
    let start = selector.find(':')?;
    let mut colons_end = start + 1;
    if selector[colons_end..].starts_with(':') {
        colons_end += 1;
    }
    let rest = &selector[colons_end..];
    let name_end = rest
        .char_indices()
        .find(|(_, c)| !(c.is_ascii_alphanumeric() || *c == '-'))
        .map(|(i, _)| i)
        .unwrap_or(rest.len());
    if name_end == 0 {
        return None;
    }
    Some(PseudoParts {
        before: selector[..start].to_string(),
        colons: selector[start..colons_end].to_string(),
        name: rest[..name_end].to_string(),
        after: rest[name_end..].to_string(),
    })
}

fn rule_pseudo(arena: &Arena, unit: NodeId) -> Option<PseudoParts> {
    match arena.kind(unit) {
        NodeKind::Rule { selector } => split_pseudo(selector),
        _ => None,
    }
}

fn pseudo_applicable(arena: &Arena, _matrix: &SupportMatrix<'_>, unit: NodeId) -> bool {
    rule_pseudo(arena, unit).is_some()
}

fn pseudo_required(
    arena: &Arena,
    matrix: &SupportMatrix<'_>,
    unit: NodeId,
) -> PrefixResult<BTreeSet<Prefix>> {
    let Some(pseudo) = rule_pseudo(arena, unit) else {
        return Ok(BTreeSet::new());
    };
    Ok(matrix.required_prefixes(FeatureKind::Selector, &pseudo.id()))
}

fn pseudo_equivalents(arena: &Arena, unit: NodeId) -> PrefixResult<Equivalents> {
    let Some(pseudo) = rule_pseudo(arena, unit) else {
        return Ok(Equivalents::new());
    };
    find_equivalents(
        arena,
        unit,
        unit,
        WalkPolicy::AdjacentOnly,
        move |arena, peer, _| {
            let Some(peer_pseudo) = rule_pseudo(arena, peer) else {
                return Ok(Vec::new());
            };
            if peer_pseudo.before != pseudo.before || peer_pseudo.after != pseudo.after {
                return Ok(Vec::new());
            }
            match split_prefixed(&peer_pseudo.name)? {
                Some((prefix, rest)) if rest == pseudo.name => Ok(vec![prefix]),
                _ => Ok(Vec::new()),
            }
        },
    )
}

fn pseudo_copy(
    arena: &mut Arena,
    _matrix: &SupportMatrix<'_>,
    subject: NodeId,
    prefix: Prefix,
) -> PrefixResult<()> {
    let Some(pseudo) = rule_pseudo(arena, subject) else {
        return Ok(());
    };
    let clone = arena.deep_clone(subject);
    let selector = pseudo.with_name(&prefix.apply(&pseudo.name));
    if let NodeKind::Rule { selector: clone_selector } = arena.kind_mut(clone) {
        *clone_selector = selector;
    }
    arena.prepend_before(subject, clone)?;
    Ok(())
}

static PSEUDO_ELEMENT: Handler = Handler {
    applicable: pseudo_applicable,
    required: pseudo_required,
    subject: identity_subject,
    equivalents: pseudo_equivalents,
    copy: pseudo_copy,
};

// ---- value functions ----

fn function_name(arena: &Arena, unit: NodeId) -> Option<String> {
    match arena.kind(unit) {
        NodeKind::Term(TermKind::Function { name }) => Some(name.clone()),
        _ => None,
    }
}

fn function_applicable(arena: &Arena, _matrix: &SupportMatrix<'_>, unit: NodeId) -> bool {
    function_name(arena, unit).is_some() && host_declaration(arena, unit).is_some()
}

fn function_required(
    arena: &Arena,
    matrix: &SupportMatrix<'_>,
    unit: NodeId,
) -> PrefixResult<BTreeSet<Prefix>> {
    let Some(name) = function_name(arena, unit) else {
        return Ok(BTreeSet::new());
    };
    Ok(matrix.required_prefixes(FeatureKind::Function, &name))
}

fn function_equivalents(arena: &Arena, unit: NodeId) -> PrefixResult<Equivalents> {
    let Some(name) = function_name(arena, unit) else {
        return Ok(Equivalents::new());
    };
    let Some(host) = host_declaration(arena, unit) else {
        return Ok(Equivalents::new());
    };
    let property = refined_decl_name(arena, host);
    find_equivalents(arena, unit, host, WalkPolicy::All, move |arena, peer, _| {
        if !arena.kind(peer).is_declaration() {
            return Ok(Vec::new());
        }
        if refined_decl_name(arena, peer) != property {
            return Ok(Vec::new());
        }
        let mut prefixes = Vec::new();
        for (_, peer_function) in collect_functions(arena, peer) {
            if let Some((prefix, rest)) = split_prefixed(&peer_function)? {
                if rest == name && !prefixes.contains(&prefix) {
                    prefixes.push(prefix);
                }
            }
        }
        Ok(prefixes)
    })
}

fn function_copy(
    arena: &mut Arena,
    matrix: &SupportMatrix<'_>,
    subject: NodeId,
    prefix: Prefix,
) -> PrefixResult<()> {
    let clone = arena.deep_clone(subject);
    for (term, name) in collect_functions(arena, clone) {
        if matrix.requires_prefix(FeatureKind::Function, prefix, &name) {
            set_function_name(arena, term, &prefix.apply(&name));
        }
    }
    arena.prepend_before(subject, clone)?;
    Ok(())
}

static FUNCTION: Handler = Handler {
    applicable: function_applicable,
    required: function_required,
    subject: host_subject,
    equivalents: function_equivalents,
    copy: function_copy,
};

// ---- value keywords ----

fn keyword_text(arena: &Arena, unit: NodeId) -> Option<String> {
    match arena.kind(unit) {
        NodeKind::Term(TermKind::Word { text }) => Some(text.clone()),
        _ => None,
    }
}

fn keyword_applicable(arena: &Arena, _matrix: &SupportMatrix<'_>, unit: NodeId) -> bool {
    keyword_text(arena, unit).is_some() && host_declaration(arena, unit).is_some()
}

fn keyword_required(
    arena: &Arena,
    matrix: &SupportMatrix<'_>,
    unit: NodeId,
) -> PrefixResult<BTreeSet<Prefix>> {
    let Some(word) = keyword_text(arena, unit) else {
        return Ok(BTreeSet::new());
    };
    Ok(matrix.required_prefixes(FeatureKind::Keyword, &word))
}

fn keyword_equivalents(arena: &Arena, unit: NodeId) -> PrefixResult<Equivalents> {
    let Some(word) = keyword_text(arena, unit) else {
        return Ok(Equivalents::new());
    };
    let Some(host) = host_declaration(arena, unit) else {
        return Ok(Equivalents::new());
    };
    let property = refined_decl_name(arena, host);
    find_equivalents(arena, unit, host, WalkPolicy::All, move |arena, peer, _| {
        if !arena.kind(peer).is_declaration() {
            return Ok(Vec::new());
        }
        if refined_decl_name(arena, peer) != property {
            return Ok(Vec::new());
        }
        let mut prefixes = Vec::new();
        for (_, peer_word) in value_words(arena, peer) {
            if let Some((prefix, rest)) = split_prefixed(&peer_word)? {
                if rest == word && !prefixes.contains(&prefix) {
                    prefixes.push(prefix);
                }
            }
        }
        Ok(prefixes)
    })
}

fn keyword_copy(
    arena: &mut Arena,
    matrix: &SupportMatrix<'_>,
    subject: NodeId,
    prefix: Prefix,
) -> PrefixResult<()> {
    let clone = arena.deep_clone(subject);
    for (term, word) in value_words(arena, clone) {
        if matrix.requires_prefix(FeatureKind::Keyword, prefix, &word) {
            set_word(arena, term, &prefix.apply(&word));
        }
    }
    arena.prepend_before(subject, clone)?;
    Ok(())
}

static KEYWORD: Handler = Handler {
    applicable: keyword_applicable,
    required: keyword_required,
    subject: host_subject,
    equivalents: keyword_equivalents,
    copy: keyword_copy,
};
