//! Text extraction from scraped live-station cells.
//!
//! Board cells are free-form text: a time cell may read "10:25 (Exp)" and a
//! train cell reads like `12625 SF Exp | Kerala Express (TVC-NDLS)`. These
//! functions pull the structured parts out and never panic on odd input.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::domain::{ClockTime, TrainNumber};

static TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:[01][0-9]|2[0-3]):[0-5][0-9]\b").expect("time pattern is valid")
});

static TRAIN_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[0-9]{5}\b").expect("train number pattern is valid"));

static ROUTE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(([^)]+)\)").expect("route pattern is valid"));

static TRAIN_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\|\s*(.*?)\s*\(").expect("train name pattern is valid"));

/// Why a train cell could not be read.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractError {
    /// No `|` between the number part and the name part
    #[error("no '|' separator in train cell: {0:?}")]
    MissingSeparator(String),

    /// The part before `|` holds no standalone 5-digit number
    #[error("no 5-digit train number in: {0:?}")]
    MissingTrainNumber(String),
}

/// Train number and route read from one train cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainIdentifier {
    pub number: TrainNumber,
    /// Parenthesised route ("TVC-ERS"); rows without one are not usable.
    pub route: Option<String>,
}

/// Return the first strict 24-hour `HH:MM` time found in `text`.
///
/// ```
/// use gate_server::extract::extract_time;
///
/// assert_eq!(extract_time(" 10:25 (Exp)").unwrap().to_string(), "10:25");
/// assert!(extract_time("Source").is_none());
/// ```
pub fn extract_time(text: &str) -> Option<ClockTime> {
    let m = TIME_RE.find(text.trim())?;
    match ClockTime::parse_hhmm(m.as_str()) {
        Ok(t) => Some(t),
        Err(e) => {
            debug!(text, error = %e, "matched time did not parse");
            None
        }
    }
}

/// Split a train cell into its train number and route.
///
/// The cell is split on the first `|`. The left side must contain exactly
/// five consecutive digits; the right side's parenthesised text, if any, is
/// the route.
///
/// ```
/// use gate_server::extract::extract_train_identifier;
///
/// let id = extract_train_identifier("12345 SF Exp | Night Express (TVC-ERS)").unwrap();
/// assert_eq!(id.number.as_str(), "12345");
/// assert_eq!(id.route.as_deref(), Some("TVC-ERS"));
///
/// assert!(extract_train_identifier("no pipe here").is_err());
/// ```
pub fn extract_train_identifier(text: &str) -> Result<TrainIdentifier, ExtractError> {
    let (number_part, name_part) = text
        .split_once('|')
        .ok_or_else(|| ExtractError::MissingSeparator(text.to_string()))?;

    let number_part = number_part.trim();
    let number = TRAIN_NUMBER_RE
        .find(number_part)
        .and_then(|m| TrainNumber::parse(m.as_str()))
        .ok_or_else(|| ExtractError::MissingTrainNumber(number_part.to_string()))?;

    let route = ROUTE_RE
        .captures(name_part.trim())
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string());

    Ok(TrainIdentifier { number, route })
}

/// The train name: text between the `|` and the opening parenthesis.
///
/// Returns an empty string when the cell does not have that shape.
pub fn extract_train_name(text: &str) -> String {
    TRAIN_NAME_RE
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_found_inside_text() {
        assert_eq!(extract_time("Arr 09:05").unwrap().to_string(), "09:05");
        assert_eq!(extract_time("23:59").unwrap().to_string(), "23:59");
    }

    #[test]
    fn time_first_valid_match_wins() {
        assert_eq!(
            extract_time("10:15 / 10:20").unwrap().to_string(),
            "10:15"
        );
        // 25:99 is not a 24-hour time, so the next one is used
        assert_eq!(
            extract_time("25:99 then 11:00").unwrap().to_string(),
            "11:00"
        );
    }

    #[test]
    fn time_absent() {
        assert!(extract_time("").is_none());
        assert!(extract_time("Destination").is_none());
        assert!(extract_time("9:05").is_none());
        assert!(extract_time("123:456").is_none());
    }

    #[test]
    fn identifier_from_full_cell() {
        let id = extract_train_identifier("16302 | Venad Express (TVC-SRR)").unwrap();
        assert_eq!(id.number.as_str(), "16302");
        assert_eq!(id.route.as_deref(), Some("TVC-SRR"));
    }

    #[test]
    fn identifier_without_route_keeps_number() {
        let id = extract_train_identifier("16302 | Venad Express").unwrap();
        assert_eq!(id.number.as_str(), "16302");
        assert!(id.route.is_none());
    }

    #[test]
    fn identifier_without_pipe_fails() {
        assert!(matches!(
            extract_train_identifier("no pipe here"),
            Err(ExtractError::MissingSeparator(_))
        ));
    }

    #[test]
    fn identifier_needs_standalone_five_digits() {
        assert!(matches!(
            extract_train_identifier("1630 | Short (A-B)"),
            Err(ExtractError::MissingTrainNumber(_))
        ));
        assert!(matches!(
            extract_train_identifier("163021 | Long (A-B)"),
            Err(ExtractError::MissingTrainNumber(_))
        ));
    }

    #[test]
    fn identifier_splits_on_first_pipe_only() {
        let id = extract_train_identifier("06425 | Special | Extra (QLN-TVC)").unwrap();
        assert_eq!(id.number.as_str(), "06425");
        assert_eq!(id.route.as_deref(), Some("QLN-TVC"));
    }

    #[test]
    fn train_name_between_pipe_and_paren() {
        assert_eq!(
            extract_train_name("12625 SF | Kerala Express (TVC-NDLS)"),
            "Kerala Express"
        );
        assert_eq!(extract_train_name("no name here"), "");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Extraction never panics, whatever the site sends.
        #[test]
        fn total_on_arbitrary_text(s in ".*") {
            let _ = extract_time(&s);
            let _ = extract_train_identifier(&s);
            let _ = extract_train_name(&s);
        }

        /// Any well-formed time embedded in text is found.
        #[test]
        fn embedded_time_is_found(h in 0u32..24, m in 0u32..60, prefix in "[a-zA-Z ]{0,8}") {
            let text = format!("{prefix} {h:02}:{m:02} ");
            let t = extract_time(&text).unwrap();
            prop_assert_eq!((t.hour(), t.minute()), (h, m));
        }
    }
}
