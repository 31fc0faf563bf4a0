//! Lookup of a single field in a record and normalization to display text.

use super::{FieldPath, clean_markup};
use serde_json::{Map, Value};

/// Separator between the normalized elements of a sequence.
pub const SEQUENCE_SEPARATOR: &str = ", ";

/// Outcome of resolving one field path against one record.
#[derive(Debug)]
pub enum Resolution {
    /// The path leads to a value with display text.
    Value(String),

    /// The path is missing from the record or leads to nothing displayable.
    Absent,

    /// The path itself cannot be resolved.
    Error(ohno::AppError),
}

impl Resolution {
    /// The display text, if any.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        match self {
            Self::Value(v) => Some(v),
            Self::Absent | Self::Error(_) => None,
        }
    }

    #[must_use]
    pub const fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

/// The shapes a record value can take, each with its own normalization rule.
#[derive(Debug, Clone, Copy)]
pub enum ValueShape<'a> {
    Null,
    Scalar(&'a Value),
    Text(&'a str),
    Sequence(&'a [Value]),
    Mapping(&'a Map<String, Value>),
}

impl<'a> ValueShape<'a> {
    #[must_use]
    pub fn of(value: &'a Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) | Value::Number(_) => Self::Scalar(value),
            Value::String(s) => Self::Text(s.as_str()),
            Value::Array(items) => Self::Sequence(items.as_slice()),
            Value::Object(map) => Self::Mapping(map),
        }
    }

    /// Reduce the value to display text, or `None` when nothing is worth showing.
    #[must_use]
    pub fn normalize(self) -> Option<String> {
        match self {
            Self::Null => None,
            Self::Scalar(value) => Some(value.to_string()),
            Self::Text(text) => non_empty(clean_markup(text)),
            Self::Sequence(items) => {
                let parts: Vec<String> = items.iter().filter_map(|item| Self::of(item).normalize()).collect();
                non_empty(parts.join(SEQUENCE_SEPARATOR))
            }
            Self::Mapping(map) => {
                if let Some(text) = map.get("text") {
                    return Self::of(text).normalize();
                }

                if let Some(value) = map.get("value") {
                    return Self::of(value).normalize();
                }

                if map.is_empty() {
                    return None;
                }

                serde_json::to_string(map).ok().and_then(|json| non_empty(clean_markup(&json)))
            }
        }
    }
}

fn non_empty(s: String) -> Option<String> {
    (!s.is_empty()).then_some(s)
}

/// Look up `path` in `record` and normalize what is found there.
///
/// Navigation fails softly: a missing segment or a non-mapping intermediate value is
/// [`Resolution::Absent`]. Only a malformed path yields [`Resolution::Error`].
#[must_use]
pub fn resolve(record: &Value, path: &str) -> Resolution {
    let path = match FieldPath::parse(path) {
        Ok(path) => path,
        Err(e) => return Resolution::Error(e),
    };

    let mut current = record;
    for segment in path.segments() {
        match current.as_object().and_then(|map| map.get(segment)) {
            Some(next) => current = next,
            None => return Resolution::Absent,
        }
    }

    ValueShape::of(current).normalize().map_or(Resolution::Absent, Resolution::Value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn resolved(record: &Value, path: &str) -> Option<String> {
        match resolve(record, path) {
            Resolution::Value(v) => Some(v),
            Resolution::Absent => None,
            Resolution::Error(e) => panic!("unexpected error: {e}"),
        }
    }

    #[test]
    fn test_text_is_cleaned() {
        let record = json!({ "A": { "B": { "C": "<b>Hi</b> there" } } });
        assert_eq!(resolved(&record, "A.B.C").as_deref(), Some("Hi there"));
    }

    #[test]
    fn test_missing_or_non_mapping_intermediate_is_absent() {
        let record = json!({ "A": { "B": "leaf" }, "L": [{ "x": 1 }] });
        assert!(resolve(&record, "A.X.C").is_absent());
        assert!(resolve(&record, "A.B.C").is_absent());
        assert!(resolve(&record, "L.x").is_absent());
        assert!(resolve(&record, "Z").is_absent());
    }

    #[test]
    fn test_scalars() {
        let record = json!({ "n": 42, "f": 1.5, "t": true, "z": 0, "no": false });
        assert_eq!(resolved(&record, "n").as_deref(), Some("42"));
        assert_eq!(resolved(&record, "f").as_deref(), Some("1.5"));
        assert_eq!(resolved(&record, "t").as_deref(), Some("true"));
        assert_eq!(resolved(&record, "z").as_deref(), Some("0"));
        assert_eq!(resolved(&record, "no").as_deref(), Some("false"));
    }

    #[test]
    fn test_mapping_prefers_text_then_value() {
        let record = json!({
            "both": { "value": "v", "text": "t" },
            "value_only": { "value": 12, "units": "km" },
            "neither": { "units": "km", "note": "est." },
            "empty": {}
        });

        assert_eq!(resolved(&record, "both").as_deref(), Some("t"));
        assert_eq!(resolved(&record, "value_only").as_deref(), Some("12"));
        assert_eq!(resolved(&record, "neither").as_deref(), Some(r#"{"units":"km","note":"est."}"#));
        assert!(resolve(&record, "empty").is_absent());
    }

    #[test]
    fn test_sequences() {
        let record = json!({
            "langs": ["French", "<i>Breton</i>"],
            "mixed": ["a", null, "", { "text": "b" }, 3],
            "empty": [],
            "blank": [null, " "]
        });

        assert_eq!(resolved(&record, "langs").as_deref(), Some("French, Breton"));
        assert_eq!(resolved(&record, "mixed").as_deref(), Some("a, b, 3"));
        assert!(resolve(&record, "empty").is_absent());
        assert!(resolve(&record, "blank").is_absent());
    }

    #[test]
    fn test_null_and_blank_are_absent() {
        let record = json!({ "a": null, "b": "  <br/> " });
        assert!(resolve(&record, "a").is_absent());
        assert!(resolve(&record, "b").is_absent());
    }

    #[test]
    fn test_malformed_path_is_error() {
        let record = json!({ "A": 1 });
        assert!(matches!(resolve(&record, ""), Resolution::Error(_)));
        assert!(matches!(resolve(&record, "A..B"), Resolution::Error(_)));
        assert!(resolve(&record, "A..B").value().is_none());
    }
}
