//! The closed set of vendor prefix markers.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{PrefixError, PrefixResult};

/// Vendor marker. Variant order is the deterministic insertion order used
/// when several prefixes are required for one feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Prefix {
    Webkit,
    Moz,
    Ms,
}

impl Prefix {
    pub const ALL: [Prefix; 3] = [Prefix::Webkit, Prefix::Moz, Prefix::Ms];

    pub fn as_str(self) -> &'static str {
        match self {
            Prefix::Webkit => "-webkit-",
            Prefix::Moz => "-moz-",
            Prefix::Ms => "-ms-",
        }
    }

    fn from_marker(marker: &str) -> Option<Prefix> {
        match marker {
            "webkit" => Some(Prefix::Webkit),
            "moz" => Some(Prefix::Moz),
            "ms" => Some(Prefix::Ms),
            _ => None,
        }
    }

    /// Prepends this prefix to an unprefixed name.
    pub fn apply(self, name: &str) -> String {
        format!("{}{}", self.as_str(), name)
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Splits a vendor-prefixed name into its prefix and the unprefixed rest.
///
/// Names without a leading dash, and `--custom-property` names, are simply
/// not prefixed (`Ok(None)`). A leading single dash announces a vendor
/// marker; one that matches no known vendor is corrupt data and fatal.
pub fn split_prefixed(name: &str) -> PrefixResult<Option<(Prefix, &str)>> {
    if !name.starts_with('-') || name.starts_with("--") {
        return Ok(None);
    }
    let malformed = || PrefixError::MalformedPrefix {
        name: name.to_string(),
    };

    let rest = &name[1..];
    let end = rest.find('-').ok_or_else(malformed)?;
    let prefix = Prefix::from_marker(&rest[..end]).ok_or_else(malformed)?;
    Ok(Some((prefix, &rest[end + 1..])))
}

/// True when the name carries no vendor prefix. Fails on a malformed marker.
pub fn is_unprefixed(name: &str) -> PrefixResult<bool> {
    Ok(split_prefixed(name)?.is_none())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_known_vendor_markers() {
        assert_eq!(
            split_prefixed("-webkit-box-orient").unwrap(),
            Some((Prefix::Webkit, "box-orient"))
        );
        assert_eq!(
            split_prefixed("-moz-appearance").unwrap(),
            Some((Prefix::Moz, "appearance"))
        );
        assert_eq!(
            split_prefixed("-ms-flexbox").unwrap(),
            Some((Prefix::Ms, "flexbox"))
        );
    }

    #[test]
    fn unprefixed_and_custom_property_names_pass_through() {
        assert_eq!(split_prefixed("display").unwrap(), None);
        assert_eq!(split_prefixed("--brand-color").unwrap(), None);
    }

    #[test]
    fn unknown_markers_are_corrupt_data() {
        assert!(matches!(
            split_prefixed("-o-transform"),
            Err(PrefixError::MalformedPrefix { .. })
        ));
        assert!(matches!(
            split_prefixed("-bogus"),
            Err(PrefixError::MalformedPrefix { .. })
        ));
    }

    #[test]
    fn apply_round_trips_through_split() {
        let name = Prefix::Ms.apply("grid-columns");
        assert_eq!(name, "-ms-grid-columns");
        assert_eq!(
            split_prefixed(&name).unwrap(),
            Some((Prefix::Ms, "grid-columns"))
        );
    }
}
