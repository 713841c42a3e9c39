// Priority parsing for todo records

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Canonical priority of a todo record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input that does not normalize to a canonical priority
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid priority: {input:?}. Valid options are: {}", valid_options())]
pub struct PriorityError {
    /// The input exactly as the caller supplied it
    pub input: String,
}

fn valid_options() -> String {
    Priority::ALL.map(Priority::as_str).join(", ")
}

/// Normalize free text into a canonical priority
///
/// The first character is upper-cased and the rest lower-cased before an
/// exact match against `Low`, `Medium` and `High`, so `"hIGH"` parses as
/// `High`. Empty input is rejected.
pub fn parse_priority(input: &str) -> Result<Priority, PriorityError> {
    let mut chars = input.chars();
    let Some(first) = chars.next() else {
        return Err(PriorityError { input: input.to_string() });
    };

    let normalized: String = first.to_uppercase().chain(chars.as_str().to_lowercase().chars()).collect();

    Priority::ALL
        .into_iter()
        .find(|p| p.as_str() == normalized)
        .ok_or_else(|| PriorityError { input: input.to_string() })
}

impl FromStr for Priority {
    type Err = PriorityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_priority(s)
    }
}

impl Serialize for Priority {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_priority(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_canonical_strings() {
        assert_eq!(parse_priority("Low").unwrap(), Priority::Low);
        assert_eq!(parse_priority("Medium").unwrap(), Priority::Medium);
        assert_eq!(parse_priority("High").unwrap(), Priority::High);
    }

    #[test]
    fn test_parse_any_casing() {
        for input in ["low", "LOW", "Low", "lOw"] {
            assert_eq!(parse_priority(input).unwrap(), Priority::Low, "input {}", input);
        }
        assert_eq!(parse_priority("hIGH").unwrap(), Priority::High);
        assert_eq!(parse_priority("MEDIUM").unwrap(), Priority::Medium);
    }

    #[test]
    fn test_parse_rejects_unknown() {
        let err = parse_priority("critical").unwrap_err();
        assert_eq!(err.input, "critical");

        let msg = err.to_string();
        assert!(msg.contains("critical"));
        assert!(msg.contains("Low, Medium, High"));
    }

    #[test]
    fn test_parse_rejects_empty() {
        let err = parse_priority("").unwrap_err();
        assert_eq!(err.input, "");
    }

    #[test]
    fn test_parse_keeps_original_input_in_error() {
        let err = parse_priority("uRGENT").unwrap_err();
        assert_eq!(err.input, "uRGENT");
    }

    #[test]
    fn test_parse_does_not_trim() {
        assert!(parse_priority(" low").is_err());
        assert!(parse_priority("low ").is_err());
    }

    #[test]
    fn test_parse_multibyte_first_char() {
        assert!(parse_priority("éigh").is_err());
    }

    #[test]
    fn test_serde_uses_canonical_form() {
        let json = serde_json::to_string(&Priority::Medium).unwrap();
        assert_eq!(json, "\"Medium\"");

        let parsed: Priority = serde_json::from_str("\"high\"").unwrap();
        assert_eq!(parsed, Priority::High);

        assert!(serde_json::from_str::<Priority>("\"critical\"").is_err());
    }
}
