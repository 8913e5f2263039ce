//! Stations and station code types.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{Coordinate, StationRef};

/// Longest station code issued by Indian Railways.
const MAX_LEN: usize = 5;

/// Error returned when parsing an invalid station code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid station code: {reason}")]
pub struct InvalidStationCode {
    reason: &'static str,
}

/// A valid Indian Railways station code.
///
/// Codes are 1 to 5 uppercase ASCII letters ("QLN", "ERS", "PASA"). This type
/// guarantees that any `StationCode` value is valid by construction.
///
/// # Examples
///
/// ```
/// use gate_server::domain::StationCode;
///
/// let qln = StationCode::parse("QLN").unwrap();
/// assert_eq!(qln.as_str(), "QLN");
///
/// assert!(StationCode::parse("qln").is_err());
/// assert!(StationCode::parse("").is_err());
/// assert!(StationCode::parse("KOLLAM").is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StationCode {
    bytes: [u8; MAX_LEN],
    len: u8,
}

impl StationCode {
    /// Parse a station code from a string.
    ///
    /// The input must be 1 to 5 uppercase ASCII letters (A-Z).
    pub fn parse(s: &str) -> Result<Self, InvalidStationCode> {
        let src = s.as_bytes();

        if src.is_empty() || src.len() > MAX_LEN {
            return Err(InvalidStationCode {
                reason: "must be 1 to 5 characters",
            });
        }

        if !src.iter().all(u8::is_ascii_uppercase) {
            return Err(InvalidStationCode {
                reason: "must be uppercase ASCII letters A-Z",
            });
        }

        let mut bytes = [0u8; MAX_LEN];
        bytes[..src.len()].copy_from_slice(src);
        Ok(Self {
            bytes,
            len: src.len() as u8,
        })
    }

    /// Parse after trimming and uppercasing, for user- or site-supplied text.
    pub fn parse_normalized(s: &str) -> Result<Self, InvalidStationCode> {
        Self::parse(&s.trim().to_ascii_uppercase())
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        // Only ASCII uppercase letters are ever stored
        std::str::from_utf8(&self.bytes[..self.len as usize]).unwrap_or_default()
    }
}

impl fmt::Debug for StationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StationCode({})", self.as_str())
    }
}

impl fmt::Display for StationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for StationCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for StationCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        StationCode::parse_normalized(&s).map_err(serde::de::Error::custom)
    }
}

/// A station from the static catalog.
///
/// Identity is the code. A station may sit on more than one route; the
/// first listed route is its primary route.
#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    pub name: String,
    pub code: StationCode,
    pub position: Option<Coordinate>,
    pub routes: Vec<String>,
}

impl Station {
    /// The route this station is reported under.
    pub fn route_name(&self) -> Option<&str> {
        self.routes.first().map(String::as_str)
    }

    /// The reference form used in gate reports.
    pub fn to_ref(&self) -> StationRef {
        StationRef {
            name: self.name.clone(),
            code: self.code,
            position: self.position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_codes() {
        assert!(StationCode::parse("Q").is_ok());
        assert!(StationCode::parse("QLN").is_ok());
        assert!(StationCode::parse("PASA").is_ok());
        assert!(StationCode::parse("KCVLX").is_ok());
    }

    #[test]
    fn reject_lowercase() {
        assert!(StationCode::parse("qln").is_err());
        assert!(StationCode::parse("Qln").is_err());
    }

    #[test]
    fn reject_wrong_length() {
        assert!(StationCode::parse("").is_err());
        assert!(StationCode::parse("ABCDEF").is_err());
    }

    #[test]
    fn reject_non_letters() {
        assert!(StationCode::parse("Q1N").is_err());
        assert!(StationCode::parse("Q N").is_err());
        assert!(StationCode::parse("QÖN").is_err());
    }

    #[test]
    fn normalized_parse_trims_and_uppercases() {
        let code = StationCode::parse_normalized("  ers ").unwrap();
        assert_eq!(code.as_str(), "ERS");
    }

    #[test]
    fn display_and_debug() {
        let code = StationCode::parse("KYJ").unwrap();
        assert_eq!(code.to_string(), "KYJ");
        assert_eq!(format!("{:?}", code), "StationCode(KYJ)");
    }

    #[test]
    fn short_and_long_codes_differ() {
        let a = StationCode::parse("TV").unwrap();
        let b = StationCode::parse("TVC").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn station_primary_route_is_first() {
        let station = Station {
            name: "Kollam Jn".into(),
            code: StationCode::parse("QLN").unwrap(),
            position: Some(Coordinate::new(8.89, 76.61)),
            routes: vec!["Kollam to Kayamkulam".into(), "Kollam - Aryankavu".into()],
        };
        assert_eq!(station.route_name(), Some("Kollam to Kayamkulam"));
        assert_eq!(station.to_ref().code, station.code);
    }

    #[test]
    fn serde_as_plain_string() {
        let code = StationCode::parse("QLN").unwrap();
        assert_eq!(serde_json::to_string(&code).unwrap(), "\"QLN\"");
        let back: StationCode = serde_json::from_str("\"qln\"").unwrap();
        assert_eq!(back, code);
    }
}
