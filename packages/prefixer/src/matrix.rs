//! Support matrix: which prefixes the configured browsers still require.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::trace;

use crate::browsers::{Browser, BrowserSelection};
use crate::data::{CompatProvider, FeatureKind};
use crate::vendor::Prefix;
use crate::version::Version;

/// Answers "is prefix P required for feature F" for a fixed browser
/// selection.
///
/// Per-feature results are memoized and never invalidated; the matrix
/// consumes a finished selection, so configuration cannot change after the
/// first query. The caches use interior mutability and are not synchronized:
/// sharing a matrix across threads requires external locking.
pub struct SupportMatrix<'d> {
    provider: &'d dyn CompatProvider,
    floors: BTreeMap<Browser, Version>,
    cache: RefCell<HashMap<(FeatureKind, String), BTreeSet<Prefix>>>,
}

impl<'d> SupportMatrix<'d> {
    pub fn new(selection: &BrowserSelection, provider: &'d dyn CompatProvider) -> Self {
        Self {
            provider,
            floors: selection.floors(),
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// Lowest supported version per configured browser.
    pub fn browsers(&self) -> impl Iterator<Item = (Browser, Version)> + '_ {
        self.floors.iter().map(|(b, v)| (*b, *v))
    }

    pub fn lowest_supported_version(&self, browser: Browser) -> Option<Version> {
        self.floors.get(&browser).copied()
    }

    /// True iff the lowest supported version of the browser is at or below
    /// `version`. Supported versions are contiguous from the floor upward.
    pub fn supports_version(&self, browser: Browser, version: Version) -> bool {
        match self.floors.get(&browser) {
            Some(floor) => *floor <= version,
            None => false,
        }
    }

    /// Prefixes required for the feature, memoized per (kind, id).
    pub fn prefixes_for(&self, kind: FeatureKind, id: &str) -> BTreeSet<Prefix> {
        let key = (kind, id.to_string());
        if let Some(hit) = self.cache.borrow().get(&key) {
            return hit.clone();
        }

        let mut required = BTreeSet::new();
        for (&browser, &floor) in &self.floors {
            if let Some(last) = self.provider.last_prefixed(kind, id, browser) {
                if floor <= last {
                    required.insert(browser.prefix());
                }
            }
        }
        trace!(?kind, id, ?required, "computed required prefixes");
        self.cache.borrow_mut().insert(key, required.clone());
        required
    }

    pub fn is_prefixable(&self, kind: FeatureKind, id: &str) -> bool {
        self.provider.is_prefixable(kind, id)
    }

    /// Membership test on the required-prefix set, short-circuited so that
    /// non-prefixable ids never populate the cache.
    pub fn requires_prefix(&self, kind: FeatureKind, prefix: Prefix, id: &str) -> bool {
        if !self.provider.is_prefixable(kind, id) {
            return false;
        }
        self.prefixes_for(kind, id).contains(&prefix)
    }

    /// Like `prefixes_for`, but short-circuits on non-prefixable ids.
    pub fn required_prefixes(&self, kind: FeatureKind, id: &str) -> BTreeSet<Prefix> {
        if !self.provider.is_prefixable(kind, id) {
            return BTreeSet::new();
        }
        self.prefixes_for(kind, id)
    }
}

impl std::fmt::Debug for SupportMatrix<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupportMatrix")
            .field("floors", &self.floors)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::CompatTable;
    use std::cell::Cell;

    fn table() -> CompatTable {
        CompatTable::new()
            .with_versions(Browser::Chrome, &["19", "20", "21"])
            .unwrap()
            .with_versions(Browser::Firefox, &["20", "21"])
            .unwrap()
            .with_versions(Browser::Ie, &["9", "10", "11"])
            .unwrap()
            .with_prefixed(FeatureKind::Property, "widget", Browser::Chrome, "20")
            .unwrap()
            .with_prefixed(FeatureKind::Property, "widget", Browser::Firefox, "15")
            .unwrap()
            .with_prefixed(FeatureKind::AtRule, "keyframes", Browser::Ie, "11")
            .unwrap()
    }

    fn matrix_with<'d>(
        provider: &'d CompatTable,
        configure: impl FnOnce(&mut BrowserSelection, &CompatTable),
    ) -> SupportMatrix<'d> {
        let mut selection = BrowserSelection::new();
        configure(&mut selection, provider);
        SupportMatrix::new(&selection, provider)
    }

    #[test]
    fn prefix_required_iff_floor_at_or_below_threshold() {
        let provider = table();
        let matrix = matrix_with(&provider, |sel, p| {
            sel.all(p, Browser::Chrome).unwrap();
            sel.all(p, Browser::Firefox).unwrap();
        });

        // chrome floor 19 <= 20 => webkit required; firefox floor 20 > 15 => moz not
        let required = matrix.prefixes_for(FeatureKind::Property, "widget");
        assert!(required.contains(&Prefix::Webkit));
        assert!(!required.contains(&Prefix::Moz));
    }

    #[test]
    fn supports_version_uses_the_floor() {
        let provider = table();
        let matrix = matrix_with(&provider, |sel, p| {
            sel.last(p, Browser::Ie, 2).unwrap();
        });

        assert!(matrix.supports_version(Browser::Ie, Version::new(10, 0)));
        assert!(matrix.supports_version(Browser::Ie, Version::new(11, 0)));
        assert!(!matrix.supports_version(Browser::Ie, Version::new(9, 0)));
        assert!(!matrix.supports_version(Browser::Chrome, Version::new(21, 0)));
        assert_eq!(
            matrix.lowest_supported_version(Browser::Ie),
            Some(Version::new(10, 0))
        );
    }

    /// Provider that counts lookups, to observe memoization.
    struct CountingProvider {
        inner: CompatTable,
        lookups: Cell<usize>,
    }

    impl CompatProvider for CountingProvider {
        fn known_versions(&self, browser: Browser) -> &[Version] {
            self.inner.known_versions(browser)
        }

        fn last_prefixed(
            &self,
            kind: FeatureKind,
            id: &str,
            browser: Browser,
        ) -> Option<Version> {
            self.lookups.set(self.lookups.get() + 1);
            self.inner.last_prefixed(kind, id, browser)
        }

        fn is_prefixable(&self, kind: FeatureKind, id: &str) -> bool {
            self.inner.is_prefixable(kind, id)
        }
    }

    #[test]
    fn per_feature_results_are_memoized() {
        let provider = CountingProvider {
            inner: table(),
            lookups: Cell::new(0),
        };
        let mut selection = BrowserSelection::new();
        selection.all(&provider, Browser::Chrome).unwrap();
        let matrix = SupportMatrix::new(&selection, &provider);

        matrix.prefixes_for(FeatureKind::Property, "widget");
        let after_first = provider.lookups.get();
        assert!(after_first > 0);

        matrix.prefixes_for(FeatureKind::Property, "widget");
        assert_eq!(provider.lookups.get(), after_first);
    }

    #[test]
    fn requires_prefix_short_circuits_non_prefixable_ids() {
        let provider = CountingProvider {
            inner: table(),
            lookups: Cell::new(0),
        };
        let mut selection = BrowserSelection::new();
        selection.all(&provider, Browser::Chrome).unwrap();
        let matrix = SupportMatrix::new(&selection, &provider);

        assert!(!matrix.requires_prefix(FeatureKind::Property, Prefix::Webkit, "color"));
        // no cache was populated for the non-prefixable id
        assert_eq!(provider.lookups.get(), 0);
    }
}
