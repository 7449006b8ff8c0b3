//! Flexbox-specific copy rules.
//!
//! Flexbox shipped in three structurally different prefixed generations: the
//! 2009 box model, the 2012 interim syntax, and the final spec behind a
//! vendor prefix. Each copy rule evaluates the three cohorts independently
//! and may insert zero to three duplicates per required prefix, rewriting
//! keyword vocabularies and numbering schemes along the way.

use std::collections::BTreeSet;

use stylecraft_ast::{value_words, Arena, NodeId, TermKind};

use crate::behavior::{FLEX_2009, FLEX_2012, FLEX_FINAL};
use crate::data::FeatureKind;
use crate::error::PrefixResult;
use crate::handlers::{
    first_number, first_word, identity_subject, is_important, synthesize_declaration, Handler,
};
use crate::matrix::SupportMatrix;
use crate::vendor::{split_prefixed, Prefix};
use crate::walker::{find_equivalents, Equivalents, WalkPolicy};

fn decl_named(arena: &Arena, unit: NodeId, name: &str) -> bool {
    stylecraft_ast::effective_name(arena, unit).as_deref() == Some(name)
}

/// Equivalence search shared by the flex categories: sibling declarations
/// whose prefixed name strips to one of the historical spellings.
fn flex_equivalents(
    arena: &Arena,
    unit: NodeId,
    spellings: &'static [&'static str],
) -> PrefixResult<Equivalents> {
    find_equivalents(arena, unit, unit, WalkPolicy::All, move |arena, peer, _| {
        if !arena.kind(peer).is_declaration() {
            return Ok(Vec::new());
        }
        let peer_name = stylecraft_ast::effective_name(arena, peer).unwrap_or_default();
        match split_prefixed(&peer_name)? {
            Some((prefix, rest)) if spellings.contains(&rest) => Ok(vec![prefix]),
            _ => Ok(Vec::new()),
        }
    })
}

fn insert_word_decl(
    arena: &mut Arena,
    subject: NodeId,
    name: &str,
    word: &str,
    important: bool,
) -> PrefixResult<()> {
    let decl = synthesize_declaration(
        arena,
        name,
        important,
        &[TermKind::Word { text: word.to_string() }],
    );
    arena.prepend_before(subject, decl)?;
    Ok(())
}

// ---- display: flex ----

const DISPLAY_FLEX_ID: &str = "display-flex";

fn display_applicable(arena: &Arena, _matrix: &SupportMatrix<'_>, unit: NodeId) -> bool {
    decl_named(arena, unit, "display")
        && matches!(
            first_word(arena, unit).as_deref(),
            Some("flex") | Some("inline-flex")
        )
}

fn display_required(
    _arena: &Arena,
    matrix: &SupportMatrix<'_>,
    _unit: NodeId,
) -> PrefixResult<BTreeSet<Prefix>> {
    Ok(matrix.required_prefixes(FeatureKind::Property, DISPLAY_FLEX_ID))
}

fn display_equivalents(arena: &Arena, unit: NodeId) -> PrefixResult<Equivalents> {
    find_equivalents(arena, unit, unit, WalkPolicy::All, |arena, peer, _| {
        if !decl_named(arena, peer, "display") {
            return Ok(Vec::new());
        }
        let mut prefixes = Vec::new();
        for (_, word) in value_words(arena, peer) {
            if let Some((prefix, rest)) = split_prefixed(&word)? {
                let known = matches!(
                    rest,
                    "box" | "inline-box" | "flexbox" | "inline-flexbox" | "flex" | "inline-flex"
                );
                if known && !prefixes.contains(&prefix) {
                    prefixes.push(prefix);
                }
            }
        }
        Ok(prefixes)
    })
}

fn display_copy(
    arena: &mut Arena,
    matrix: &SupportMatrix<'_>,
    subject: NodeId,
    prefix: Prefix,
) -> PrefixResult<()> {
    let inline = first_word(arena, subject).as_deref() == Some("inline-flex");
    let important = is_important(arena, subject);

    if FLEX_2009.includes(matrix, prefix) {
        let word = prefix.apply(if inline { "inline-box" } else { "box" });
        insert_word_decl(arena, subject, "display", &word, important)?;
    }
    if prefix == Prefix::Ms && FLEX_2012.includes(matrix, Prefix::Ms) {
        let word = Prefix::Ms.apply(if inline { "inline-flexbox" } else { "flexbox" });
        insert_word_decl(arena, subject, "display", &word, important)?;
    }
    if FLEX_FINAL.includes(matrix, prefix) {
        let word = prefix.apply(if inline { "inline-flex" } else { "flex" });
        insert_word_decl(arena, subject, "display", &word, important)?;
    }
    Ok(())
}

pub(crate) static DISPLAY_FLEX: Handler = Handler {
    applicable: display_applicable,
    required: display_required,
    subject: identity_subject,
    equivalents: display_equivalents,
    copy: display_copy,
};

// ---- flex-direction ----

fn direction_parts(direction: &str) -> Option<(&'static str, &'static str)> {
    match direction {
        "row" => Some(("horizontal", "normal")),
        "row-reverse" => Some(("horizontal", "reverse")),
        "column" => Some(("vertical", "normal")),
        "column-reverse" => Some(("vertical", "reverse")),
        _ => None,
    }
}

fn flex_direction_applicable(arena: &Arena, _matrix: &SupportMatrix<'_>, unit: NodeId) -> bool {
    decl_named(arena, unit, "flex-direction")
}

fn flex_direction_required(
    _arena: &Arena,
    matrix: &SupportMatrix<'_>,
    _unit: NodeId,
) -> PrefixResult<BTreeSet<Prefix>> {
    Ok(matrix.required_prefixes(FeatureKind::Property, "flex-direction"))
}

fn flex_direction_equivalents(arena: &Arena, unit: NodeId) -> PrefixResult<Equivalents> {
    flex_equivalents(arena, unit, &["flex-direction", "box-orient", "box-direction"])
}

fn flex_direction_copy(
    arena: &mut Arena,
    matrix: &SupportMatrix<'_>,
    subject: NodeId,
    prefix: Prefix,
) -> PrefixResult<()> {
    let direction = first_word(arena, subject).unwrap_or_else(|| "row".to_string());
    let important = is_important(arena, subject);

    if FLEX_2009.includes(matrix, prefix) {
        // the old model splits direction across two properties
        if let Some((orient, box_direction)) = direction_parts(&direction) {
            insert_word_decl(arena, subject, &prefix.apply("box-orient"), orient, important)?;
            insert_word_decl(
                arena,
                subject,
                &prefix.apply("box-direction"),
                box_direction,
                important,
            )?;
        }
    }
    if prefix == Prefix::Ms && FLEX_2012.includes(matrix, Prefix::Ms) {
        insert_word_decl(
            arena,
            subject,
            &Prefix::Ms.apply("flex-direction"),
            &direction,
            important,
        )?;
    }
    if FLEX_FINAL.includes(matrix, prefix) {
        insert_word_decl(
            arena,
            subject,
            &prefix.apply("flex-direction"),
            &direction,
            important,
        )?;
    }
    Ok(())
}

pub(crate) static FLEX_DIRECTION: Handler = Handler {
    applicable: flex_direction_applicable,
    required: flex_direction_required,
    subject: identity_subject,
    equivalents: flex_direction_equivalents,
    copy: flex_direction_copy,
};

// ---- justify-content ----

fn pack_2009(keyword: &str) -> Option<&'static str> {
    match keyword {
        "flex-start" => Some("start"),
        "flex-end" => Some("end"),
        "center" => Some("center"),
        "space-between" => Some("justify"),
        // space-around has no 2009 equivalent; the cohort inserts nothing
        _ => None,
    }
}

fn pack_2012(keyword: &str) -> Option<&'static str> {
    match keyword {
        "space-around" => Some("distribute"),
        other => pack_2009(other),
    }
}

fn justify_applicable(arena: &Arena, _matrix: &SupportMatrix<'_>, unit: NodeId) -> bool {
    decl_named(arena, unit, "justify-content")
}

fn justify_required(
    _arena: &Arena,
    matrix: &SupportMatrix<'_>,
    _unit: NodeId,
) -> PrefixResult<BTreeSet<Prefix>> {
    Ok(matrix.required_prefixes(FeatureKind::Property, "justify-content"))
}

fn justify_equivalents(arena: &Arena, unit: NodeId) -> PrefixResult<Equivalents> {
    flex_equivalents(arena, unit, &["justify-content", "box-pack", "flex-pack"])
}

fn justify_copy(
    arena: &mut Arena,
    matrix: &SupportMatrix<'_>,
    subject: NodeId,
    prefix: Prefix,
) -> PrefixResult<()> {
    let Some(keyword) = first_word(arena, subject) else {
        return Ok(());
    };
    let important = is_important(arena, subject);

    if FLEX_2009.includes(matrix, prefix) {
        if let Some(mapped) = pack_2009(&keyword) {
            insert_word_decl(arena, subject, &prefix.apply("box-pack"), mapped, important)?;
        }
    }
    if prefix == Prefix::Ms && FLEX_2012.includes(matrix, Prefix::Ms) {
        if let Some(mapped) = pack_2012(&keyword) {
            insert_word_decl(arena, subject, &Prefix::Ms.apply("flex-pack"), mapped, important)?;
        }
    }
    if FLEX_FINAL.includes(matrix, prefix) {
        insert_word_decl(
            arena,
            subject,
            &prefix.apply("justify-content"),
            &keyword,
            important,
        )?;
    }
    Ok(())
}

pub(crate) static JUSTIFY_CONTENT: Handler = Handler {
    applicable: justify_applicable,
    required: justify_required,
    subject: identity_subject,
    equivalents: justify_equivalents,
    copy: justify_copy,
};

// ---- order ----

fn order_applicable(arena: &Arena, _matrix: &SupportMatrix<'_>, unit: NodeId) -> bool {
    decl_named(arena, unit, "order")
}

fn order_required(
    _arena: &Arena,
    matrix: &SupportMatrix<'_>,
    _unit: NodeId,
) -> PrefixResult<BTreeSet<Prefix>> {
    Ok(matrix.required_prefixes(FeatureKind::Property, "order"))
}

fn order_equivalents(arena: &Arena, unit: NodeId) -> PrefixResult<Equivalents> {
    flex_equivalents(arena, unit, &["order", "box-ordinal-group", "flex-order"])
}

fn insert_number_decl(
    arena: &mut Arena,
    subject: NodeId,
    name: &str,
    value: f64,
    important: bool,
) -> PrefixResult<()> {
    let decl = synthesize_declaration(
        arena,
        name,
        important,
        &[TermKind::Number { value, unit: None }],
    );
    arena.prepend_before(subject, decl)?;
    Ok(())
}

fn order_copy(
    arena: &mut Arena,
    matrix: &SupportMatrix<'_>,
    subject: NodeId,
    prefix: Prefix,
) -> PrefixResult<()> {
    let Some((ordinal, _)) = first_number(arena, subject) else {
        return Ok(());
    };
    let important = is_important(arena, subject);

    if FLEX_2009.includes(matrix, prefix) {
        // the 2009 ordinal scheme is one-based
        insert_number_decl(
            arena,
            subject,
            &prefix.apply("box-ordinal-group"),
            ordinal + 1.0,
            important,
        )?;
    }
    if prefix == Prefix::Ms && FLEX_2012.includes(matrix, Prefix::Ms) {
        insert_number_decl(
            arena,
            subject,
            &Prefix::Ms.apply("flex-order"),
            ordinal,
            important,
        )?;
    }
    if FLEX_FINAL.includes(matrix, prefix) {
        insert_number_decl(arena, subject, &prefix.apply("order"), ordinal, important)?;
    }
    Ok(())
}

pub(crate) static ORDER: Handler = Handler {
    applicable: order_applicable,
    required: order_required,
    subject: identity_subject,
    equivalents: order_equivalents,
    copy: order_copy,
};
