//! Historical spec-variant cohorts.
//!
//! Some features went through several structurally different prefixed forms
//! before stabilizing. A cohort names the browsers (with the last version)
//! that still expect one historical variant; copy rules consult cohorts
//! independently when synthesizing duplicates.

use std::collections::BTreeSet;

use crate::browsers::Browser;
use crate::matrix::SupportMatrix;
use crate::vendor::Prefix;
use crate::version::Version;

#[derive(Debug, Clone, Copy)]
pub struct PrefixBehavior {
    name: &'static str,
    caps: &'static [(Browser, Version)],
}

impl PrefixBehavior {
    pub const fn new(name: &'static str, caps: &'static [(Browser, Version)]) -> Self {
        Self { name, caps }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Prefixes of cohort browsers whose supported floor still falls at or
    /// below the cap.
    pub fn prefixes(&self, matrix: &SupportMatrix<'_>) -> BTreeSet<Prefix> {
        self.caps
            .iter()
            .filter(|(browser, cap)| matrix.supports_version(*browser, *cap))
            .map(|(browser, _)| browser.prefix())
            .collect()
    }

    pub fn includes(&self, matrix: &SupportMatrix<'_>, prefix: Prefix) -> bool {
        self.prefixes(matrix).contains(&prefix)
    }
}

/// 2009 box model (`display: -webkit-box`, `box-orient`, `box-ordinal-group`).
pub const FLEX_2009: PrefixBehavior = PrefixBehavior::new(
    "flexbox-2009",
    &[
        (Browser::Chrome, Version::new(20, 0)),
        (Browser::Safari, Version::new(6, 0)),
        (Browser::Firefox, Version::new(21, 0)),
    ],
);

/// 2012 interim syntax shipped by IE10 (`display: -ms-flexbox`, `flex-pack`).
pub const FLEX_2012: PrefixBehavior =
    PrefixBehavior::new("flexbox-2012", &[(Browser::Ie, Version::new(10, 0))]);

/// Final spec behind a vendor prefix (`display: -webkit-flex`).
pub const FLEX_FINAL: PrefixBehavior = PrefixBehavior::new(
    "flexbox-final",
    &[
        (Browser::Chrome, Version::new(28, 0)),
        (Browser::Safari, Version::new(8, 0)),
        (Browser::Firefox, Version::new(27, 0)),
    ],
);
