use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Value grammar selected by property identity during refinement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueGrammar {
    /// Any sequence of terms separated by whitespace, commas, or slashes.
    Generic,

    /// Numeric terms only; anything else fails refinement.
    Numeric,
}

/// External registry of known property names and their value grammars.
///
/// The refinement layer validates names against this registry; names it does
/// not know are wrapped as unknown rather than rejected.
pub trait NameRegistry {
    fn is_known(&self, name: &str) -> bool;

    fn grammar_for(&self, _name: &str) -> ValueGrammar {
        ValueGrammar::Generic
    }
}

/// In-memory registry built from explicit name sets.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SetRegistry {
    known: BTreeSet<String>,
    numeric: BTreeSet<String>,
}

impl SetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_known<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.known.extend(names.into_iter().map(Into::into));
        self
    }

    /// Marks properties whose values are parsed with the numeric grammar.
    pub fn with_numeric<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            let name = name.into();
            self.known.insert(name.clone());
            self.numeric.insert(name);
        }
        self
    }
}

impl NameRegistry for SetRegistry {
    fn is_known(&self, name: &str) -> bool {
        self.known.contains(name)
    }

    fn grammar_for(&self, name: &str) -> ValueGrammar {
        if self.numeric.contains(name) {
            ValueGrammar::Numeric
        } else {
            ValueGrammar::Generic
        }
    }
}

/// Lowercase-normalized property name plus whether the registry knows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyName {
    text: String,
    known: bool,
}

impl PropertyName {
    pub fn resolve(raw: &str, registry: &dyn NameRegistry) -> Self {
        let text = raw.trim().to_ascii_lowercase();
        let known = registry.is_known(&text);
        Self { text, known }
    }

    /// Wraps a name without consulting any registry.
    pub fn unknown(raw: &str) -> Self {
        Self {
            text: raw.trim().to_ascii_lowercase(),
            known: false,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_known(&self) -> bool {
        self.known
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_normalizes_and_flags_known_names() {
        let registry = SetRegistry::new().with_known(["color", "display"]);

        let name = PropertyName::resolve("  Color ", &registry);
        assert_eq!(name.as_str(), "color");
        assert!(name.is_known());

        let name = PropertyName::resolve("widget", &registry);
        assert_eq!(name.as_str(), "widget");
        assert!(!name.is_known());
    }

    #[test]
    fn numeric_properties_select_the_numeric_grammar() {
        let registry = SetRegistry::new()
            .with_known(["display"])
            .with_numeric(["order", "z-index"]);

        assert_eq!(registry.grammar_for("order"), ValueGrammar::Numeric);
        assert_eq!(registry.grammar_for("display"), ValueGrammar::Generic);
        assert!(registry.is_known("order"));
    }
}
