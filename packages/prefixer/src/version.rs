use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::PrefixError;

/// Browser version as a `major.minor` pair.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(try_from = "String", into = "String")]
pub struct Version {
    major: u16,
    minor: u16,
}

impl Version {
    pub const fn new(major: u16, minor: u16) -> Self {
        Self { major, minor }
    }

    pub fn major(self) -> u16 {
        self.major
    }

    pub fn minor(self) -> u16 {
        self.minor
    }
}

impl FromStr for Version {
    type Err = PrefixError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let parse_error = || PrefixError::VersionParse {
            text: text.to_string(),
        };

        let mut parts = text.trim().splitn(2, '.');
        let major = parts
            .next()
            .filter(|part| !part.is_empty())
            .ok_or_else(parse_error)?
            .parse::<u16>()
            .map_err(|_| parse_error())?;
        let minor = match parts.next() {
            Some(part) => part.parse::<u16>().map_err(|_| parse_error())?,
            None => 0,
        };
        Ok(Version::new(major, minor))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.minor == 0 {
            write!(f, "{}", self.major)
        } else {
            write!(f, "{}.{}", self.major, self.minor)
        }
    }
}

impl TryFrom<String> for Version {
    type Error = PrefixError;

    fn try_from(text: String) -> Result<Self, Self::Error> {
        text.parse()
    }
}

impl From<Version> for String {
    fn from(version: Version) -> String {
        version.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_major_and_major_minor() {
        assert_eq!("10".parse::<Version>().unwrap(), Version::new(10, 0));
        assert_eq!("6.1".parse::<Version>().unwrap(), Version::new(6, 1));
    }

    #[test]
    fn rejects_garbage() {
        assert!("".parse::<Version>().is_err());
        assert!("ten".parse::<Version>().is_err());
        assert!("1.x".parse::<Version>().is_err());
    }

    #[test]
    fn orders_numerically() {
        let v9: Version = "9".parse().unwrap();
        let v10: Version = "10".parse().unwrap();
        let v10_3: Version = "10.3".parse().unwrap();
        assert!(v9 < v10);
        assert!(v10 < v10_3);
    }

    #[test]
    fn display_round_trips() {
        for text in ["4", "10.3"] {
            let version: Version = text.parse().unwrap();
            assert_eq!(version.to_string(), text);
        }
    }
}
