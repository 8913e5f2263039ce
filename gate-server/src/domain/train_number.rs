//! Train number type.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A five-digit Indian Railways train number (e.g. "16302").
///
/// The same physical train carries the same number at every station it
/// calls at, which is what lets two junction boards be matched up.
///
/// # Examples
///
/// ```
/// use gate_server::domain::TrainNumber;
///
/// assert_eq!(TrainNumber::parse("12625").unwrap().as_str(), "12625");
/// assert!(TrainNumber::parse("1262").is_none());
/// assert!(TrainNumber::parse("1262A").is_none());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TrainNumber([u8; 5]);

impl TrainNumber {
    /// Parse exactly five ASCII digits.
    pub fn parse(s: &str) -> Option<Self> {
        let bytes = s.as_bytes();
        if bytes.len() != 5 || !bytes.iter().all(u8::is_ascii_digit) {
            return None;
        }
        Some(TrainNumber([bytes[0], bytes[1], bytes[2], bytes[3], bytes[4]]))
    }

    /// Returns the number as a string slice.
    pub fn as_str(&self) -> &str {
        // Only ASCII digits are ever stored
        std::str::from_utf8(&self.0).unwrap_or_default()
    }
}

impl fmt::Debug for TrainNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TrainNumber({})", self.as_str())
    }
}

impl fmt::Display for TrainNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for TrainNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TrainNumber {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        TrainNumber::parse(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid train number: {s}")))
    }
}
