//! Supported-browser selection.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::data::CompatProvider;
use crate::error::{PrefixError, PrefixResult};
use crate::vendor::Prefix;
use crate::version::Version;

/// The closed set of browsers this engine reasons about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Browser {
    Chrome,
    Firefox,
    Safari,
    Ie,
    Edge,
}

impl Browser {
    pub const ALL: [Browser; 5] = [
        Browser::Chrome,
        Browser::Firefox,
        Browser::Safari,
        Browser::Ie,
        Browser::Edge,
    ];

    pub fn prefix(self) -> Prefix {
        match self {
            Browser::Chrome | Browser::Safari => Prefix::Webkit,
            Browser::Firefox => Prefix::Moz,
            Browser::Ie | Browser::Edge => Prefix::Ms,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Browser::Chrome => "chrome",
            Browser::Firefox => "firefox",
            Browser::Safari => "safari",
            Browser::Ie => "ie",
            Browser::Edge => "edge",
        }
    }
}

impl fmt::Display for Browser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Set of (browser, version) pairs a stylesheet must stay compatible with.
///
/// Built against a provider's known version lists; a support matrix then
/// consumes the finished selection, so configuration is always complete
/// before the first feature query.
#[derive(Debug, Clone, Default)]
pub struct BrowserSelection {
    supported: BTreeMap<Browser, BTreeSet<Version>>,
}

impl BrowserSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one explicit browser version. The version must be in the
    /// provider's known list.
    pub fn browser(
        &mut self,
        provider: &dyn CompatProvider,
        browser: Browser,
        version: Version,
    ) -> PrefixResult<&mut Self> {
        if !provider.known_versions(browser).contains(&version) {
            return Err(PrefixError::UnknownVersion { browser, version });
        }
        self.supported.entry(browser).or_default().insert(version);
        Ok(self)
    }

    /// Adds the most recent `count` known versions of the browser.
    pub fn last(
        &mut self,
        provider: &dyn CompatProvider,
        browser: Browser,
        count: usize,
    ) -> PrefixResult<&mut Self> {
        let known = provider.known_versions(browser);
        let newest = known.iter().rev().take(count).copied();
        self.supported.entry(browser).or_default().extend(newest);
        Ok(self)
    }

    /// Adds only the newest known version of the browser.
    pub fn latest(
        &mut self,
        provider: &dyn CompatProvider,
        browser: Browser,
    ) -> PrefixResult<&mut Self> {
        self.last(provider, browser, 1)
    }

    /// Adds every known version of the browser.
    pub fn all(
        &mut self,
        provider: &dyn CompatProvider,
        browser: Browser,
    ) -> PrefixResult<&mut Self> {
        let known = provider.known_versions(browser);
        self.supported
            .entry(browser)
            .or_default()
            .extend(known.iter().copied());
        Ok(self)
    }

    pub fn is_empty(&self) -> bool {
        self.supported.values().all(BTreeSet::is_empty)
    }

    /// All selected (browser, version) pairs in deterministic order.
    pub fn entries(&self) -> impl Iterator<Item = (Browser, Version)> + '_ {
        self.supported
            .iter()
            .flat_map(|(browser, versions)| versions.iter().map(|v| (*browser, *v)))
    }

    /// Lowest selected version per browser.
    pub(crate) fn floors(&self) -> BTreeMap<Browser, Version> {
        self.supported
            .iter()
            .filter_map(|(browser, versions)| versions.first().map(|v| (*browser, *v)))
            .collect()
    }
}
