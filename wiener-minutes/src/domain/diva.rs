//! Station identifier types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when parsing an invalid DIVA station number.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid DIVA number: {reason}")]
pub struct InvalidDiva {
    reason: &'static str,
}

/// A DIVA station number, the identifier the Wiener Linien realtime API
/// uses to address a stop.
///
/// # Examples
///
/// ```
/// use wiener_minutes::domain::Diva;
///
/// let stephansplatz = Diva::parse("60200657").unwrap();
/// assert_eq!(stephansplatz.get(), 60200657);
///
/// // Surrounding whitespace is tolerated
/// assert!(Diva::parse(" 60200657 ").is_ok());
///
/// // Signs and letters are rejected
/// assert!(Diva::parse("-1").is_err());
/// assert!(Diva::parse("U3").is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Diva(u32);

impl Diva {
    /// Wrap a raw station number.
    pub const fn new(value: u32) -> Self {
        Diva(value)
    }

    /// Parse a DIVA number from decimal text.
    pub fn parse(s: &str) -> Result<Self, InvalidDiva> {
        let s = s.trim();

        if s.is_empty() {
            return Err(InvalidDiva {
                reason: "must not be empty",
            });
        }

        if !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(InvalidDiva {
                reason: "must contain only digits 0-9",
            });
        }

        s.parse::<u32>().map(Diva).map_err(|_| InvalidDiva {
            reason: "out of range",
        })
    }

    /// Returns the raw station number.
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl FromStr for Diva {
    type Err = InvalidDiva;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Diva::parse(s)
    }
}

impl fmt::Debug for Diva {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Diva({})", self.0)
    }
}

impl fmt::Display for Diva {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Any u32 survives Display then parse
        #[test]
        fn display_parse_roundtrip(n in any::<u32>()) {
            let diva = Diva::new(n);
            prop_assert_eq!(Diva::parse(&diva.to_string()).unwrap(), diva);
        }

        /// Text containing a letter never parses
        #[test]
        fn letters_rejected(s in "[0-9]{0,4}[a-zA-Z][0-9a-zA-Z]{0,4}") {
            prop_assert!(Diva::parse(&s).is_err());
        }
    }
}
