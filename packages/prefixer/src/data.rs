//! Compatibility-data provider contract and an in-memory table.
//!
//! The literal last-prefixed-version values per feature are external data;
//! this module defines the lookup interface the engine consumes plus a
//! programmatic, serde-loadable table for tests and embedders.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::browsers::Browser;
use crate::error::PrefixResult;
use crate::version::Version;

/// Feature namespaces with independent prefix data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FeatureKind {
    Property,
    Keyword,
    AtRule,
    Selector,
    Function,
}

/// Read-only compatibility lookup injected into the support matrix.
pub trait CompatProvider {
    /// Known released versions for a browser, ascending. Empty when the
    /// provider has no data for that browser.
    fn known_versions(&self, browser: Browser) -> &[Version];

    /// Last version of `browser` that required a prefix for the feature;
    /// `None` when the browser never prefixed it.
    fn last_prefixed(&self, kind: FeatureKind, id: &str, browser: Browser) -> Option<Version>;

    /// Whether any browser ever prefixed the feature. Used to short-circuit
    /// per-feature cache population.
    fn is_prefixable(&self, kind: FeatureKind, id: &str) -> bool;
}

/// In-memory provider built from explicit entries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompatTable {
    #[serde(default)]
    versions: BTreeMap<Browser, Vec<Version>>,
    #[serde(default)]
    features: BTreeMap<FeatureKind, BTreeMap<String, BTreeMap<Browser, Version>>>,
}

impl CompatTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the browser's released versions, ascending.
    pub fn with_versions(mut self, browser: Browser, versions: &[&str]) -> PrefixResult<Self> {
        let mut parsed = Vec::with_capacity(versions.len());
        for text in versions {
            parsed.push(text.parse::<Version>()?);
        }
        self.versions.insert(browser, parsed);
        Ok(self)
    }

    /// Marks a feature prefixable without naming any browser threshold.
    pub fn with_feature(mut self, kind: FeatureKind, id: impl Into<String>) -> Self {
        self.features
            .entry(kind)
            .or_default()
            .entry(id.into())
            .or_default();
        self
    }

    /// Records the last version of `browser` that prefixed the feature.
    pub fn with_prefixed(
        mut self,
        kind: FeatureKind,
        id: impl Into<String>,
        browser: Browser,
        until: &str,
    ) -> PrefixResult<Self> {
        let until = until.parse::<Version>()?;
        self.features
            .entry(kind)
            .or_default()
            .entry(id.into())
            .or_default()
            .insert(browser, until);
        Ok(self)
    }
}

impl CompatProvider for CompatTable {
    fn known_versions(&self, browser: Browser) -> &[Version] {
        self.versions
            .get(&browser)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn last_prefixed(&self, kind: FeatureKind, id: &str, browser: Browser) -> Option<Version> {
        self.features
            .get(&kind)?
            .get(id)?
            .get(&browser)
            .copied()
    }

    fn is_prefixable(&self, kind: FeatureKind, id: &str) -> bool {
        self.features
            .get(&kind)
            .is_some_and(|entries| entries.contains_key(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_answers_the_provider_contract() {
        let table = CompatTable::new()
            .with_versions(Browser::Chrome, &["19", "20", "21"])
            .unwrap()
            .with_prefixed(FeatureKind::Property, "widget", Browser::Chrome, "20")
            .unwrap()
            .with_feature(FeatureKind::Function, "calc");

        assert_eq!(
            table.known_versions(Browser::Chrome),
            &[
                Version::new(19, 0),
                Version::new(20, 0),
                Version::new(21, 0)
            ]
        );
        assert_eq!(
            table.last_prefixed(FeatureKind::Property, "widget", Browser::Chrome),
            Some(Version::new(20, 0))
        );
        assert_eq!(
            table.last_prefixed(FeatureKind::Property, "widget", Browser::Firefox),
            None
        );
        assert!(table.is_prefixable(FeatureKind::Property, "widget"));
        assert!(table.is_prefixable(FeatureKind::Function, "calc"));
        assert!(!table.is_prefixable(FeatureKind::Property, "color"));
    }
}
