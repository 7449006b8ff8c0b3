//! Tokenizer and term grammars for raw declaration values.

use logos::Logos;

use crate::arena::{Arena, CollectionId};
use crate::error::{RefineError, RefineResult};
use crate::node::{NodeKind, OperatorKind, Span, TermKind};
use crate::registry::ValueGrammar;

/// Token types for CSS property values
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\r]+")]
pub enum ValueToken<'src> {
    #[token(",")]
    Comma,

    #[token("/")]
    Slash,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    // Numbers with an optional unit (1, -2.5em, 100%, .5)
    #[regex(r"-?([0-9]+\.?[0-9]*|\.[0-9]+)(%|[a-zA-Z]+)?", |lex| lex.slice())]
    Dimension(&'src str),

    // Color values
    #[regex(r"#[0-9a-fA-F]+", |lex| lex.slice())]
    Hash(&'src str),

    // String literals
    #[regex(r#""([^"\\]|\\.)*""#, |lex| lex.slice())]
    #[regex(r"'([^'\\]|\\.)*'", |lex| lex.slice())]
    Quoted(&'src str),

    // Identifiers, including vendor-prefixed ones (-webkit-box)
    #[regex(r"-{0,2}[a-zA-Z_][a-zA-Z0-9_-]*", |lex| lex.slice())]
    Ident(&'src str),
}

/// Tokenizes a raw value, keeping lex failures so callers can report the
/// offending offset.
pub fn tokenize_value(source: &str) -> Vec<(Result<ValueToken<'_>, ()>, std::ops::Range<usize>)> {
    ValueToken::lexer(source).spanned().collect()
}

/// Parses a raw value into Term/Operator nodes appended to `target`.
///
/// Fails with `UnparsableValue` unless every byte of the input is consumed.
pub(crate) fn parse_value_into(
    arena: &mut Arena,
    target: CollectionId,
    input: &str,
    grammar: ValueGrammar,
) -> RefineResult<()> {
    let mut tokens = Vec::new();
    for (token, span) in ValueToken::lexer(input).spanned() {
        match token {
            Ok(token) => tokens.push((token, span)),
            Err(()) => return Err(unparsable(input, span.start)),
        }
    }

    match grammar {
        ValueGrammar::Generic => {
            let mut parser = ValueParser {
                arena,
                input,
                tokens: &tokens,
                pos: 0,
            };
            parser.parse_sequence(target, false)
        }
        ValueGrammar::Numeric => parse_numeric(arena, target, input, &tokens),
    }
}

fn unparsable(input: &str, offset: usize) -> RefineError {
    RefineError::UnparsableValue {
        value: input.to_string(),
        offset,
    }
}

fn parse_numeric(
    arena: &mut Arena,
    target: CollectionId,
    input: &str,
    tokens: &[(ValueToken<'_>, std::ops::Range<usize>)],
) -> RefineResult<()> {
    for (token, span) in tokens {
        match token {
            ValueToken::Dimension(slice) => {
                let (value, unit) = split_dimension(input, slice, span.start)?;
                let term = arena.create(
                    NodeKind::Term(TermKind::Number { value, unit }),
                    Span::new(span.start, span.end),
                );
                arena.append(target, term)?;
            }
            _ => return Err(unparsable(input, span.start)),
        }
    }
    Ok(())
}

fn split_dimension(input: &str, slice: &str, offset: usize) -> RefineResult<(f64, Option<String>)> {
    let split = slice
        .char_indices()
        .find(|(_, c)| c.is_ascii_alphabetic() || *c == '%')
        .map(|(i, _)| i)
        .unwrap_or(slice.len());
    let value = slice[..split]
        .parse::<f64>()
        .map_err(|_| unparsable(input, offset))?;
    let unit = if split < slice.len() {
        Some(slice[split..].to_string())
    } else {
        None
    };
    Ok((value, unit))
}

struct ValueParser<'a, 'src> {
    arena: &'a mut Arena,
    input: &'src str,
    tokens: &'a [(ValueToken<'src>, std::ops::Range<usize>)],
    pos: usize,
}

impl<'src> ValueParser<'_, 'src> {
    fn peek(&self) -> Option<&(ValueToken<'src>, std::ops::Range<usize>)> {
        self.tokens.get(self.pos)
    }

    fn parse_sequence(&mut self, target: CollectionId, nested: bool) -> RefineResult<()> {
        while let Some((token, span)) = self.peek().cloned() {
            match token {
                ValueToken::RParen if nested => return Ok(()),
                ValueToken::RParen | ValueToken::LParen => {
                    return Err(unparsable(self.input, span.start));
                }
                ValueToken::Comma => {
                    self.pos += 1;
                    self.push(target, NodeKind::Operator(OperatorKind::Comma), span)?;
                }
                ValueToken::Slash => {
                    self.pos += 1;
                    self.push(target, NodeKind::Operator(OperatorKind::Slash), span)?;
                }
                ValueToken::Dimension(slice) => {
                    self.pos += 1;
                    let (value, unit) = split_dimension(self.input, slice, span.start)?;
                    self.push(target, NodeKind::Term(TermKind::Number { value, unit }), span)?;
                }
                ValueToken::Hash(slice) => {
                    self.pos += 1;
                    let kind = TermKind::Hash { text: slice.to_string() };
                    self.push(target, NodeKind::Term(kind), span)?;
                }
                ValueToken::Quoted(slice) => {
                    self.pos += 1;
                    let kind = TermKind::Quoted { text: slice.to_string() };
                    self.push(target, NodeKind::Term(kind), span)?;
                }
                ValueToken::Ident(slice) => {
                    self.pos += 1;
                    if matches!(self.peek(), Some((ValueToken::LParen, _))) {
                        self.pos += 1;
                        self.parse_function(target, slice, span)?;
                    } else {
                        let kind = TermKind::Word { text: slice.to_string() };
                        self.push(target, NodeKind::Term(kind), span)?;
                    }
                }
            }
        }

        if nested {
            // ran out of tokens inside a function call
            return Err(unparsable(self.input, self.input.len()));
        }
        Ok(())
    }

    fn parse_function(
        &mut self,
        target: CollectionId,
        name: &str,
        span: std::ops::Range<usize>,
    ) -> RefineResult<()> {
        let kind = TermKind::Function { name: name.to_string() };
        let node = self.push(target, NodeKind::Term(kind), span)?;
        let args = self.arena.ensure_children(node);
        self.parse_sequence(args, true)?;

        match self.peek() {
            Some((ValueToken::RParen, _)) => {
                self.pos += 1;
                Ok(())
            }
            _ => Err(unparsable(self.input, self.input.len())),
        }
    }

    fn push(
        &mut self,
        target: CollectionId,
        kind: NodeKind,
        span: std::ops::Range<usize>,
    ) -> RefineResult<crate::arena::NodeId> {
        let node = self.arena.create(kind, Span::new(span.start, span.end));
        self.arena.append(target, node)?;
        Ok(node)
    }
}
