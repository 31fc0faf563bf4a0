use crate::Result;
use core::fmt::{Display, Formatter};
use ohno::app_err;
use serde::{Deserialize, Serialize};

/// A dot-separated address of a leaf inside a country record, e.g. `Geography.Area.text`.
///
/// Segments are never empty and never contain the separator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FieldPath(String);

impl FieldPath {
    pub const SEPARATOR: char = '.';

    /// Parse dotted text into a path.
    ///
    /// # Errors
    ///
    /// Fails when the text is empty or contains an empty segment.
    pub fn parse(text: &str) -> Result<Self> {
        if text.is_empty() {
            return Err(app_err!("field path is empty"));
        }

        if text.split(Self::SEPARATOR).any(str::is_empty) {
            return Err(app_err!("field path '{text}' contains an empty segment"));
        }

        Ok(Self(text.to_string()))
    }

    /// Path made of a single top-level key, or `None` when the key cannot be addressed.
    #[must_use]
    pub fn root(key: &str) -> Option<Self> {
        Self::is_addressable(key).then(|| Self(key.to_string()))
    }

    /// Extend this path by one segment, or `None` when the key cannot be addressed.
    #[must_use]
    pub fn child(&self, key: &str) -> Option<Self> {
        Self::is_addressable(key).then(|| Self(format!("{}{}{key}", self.0, Self::SEPARATOR)))
    }

    /// Whether `key` can appear as a segment.
    #[must_use]
    pub fn is_addressable(key: &str) -> bool {
        !key.is_empty() && !key.contains(Self::SEPARATOR)
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split(Self::SEPARATOR)
    }

    /// The top-level section this path belongs to, e.g. `Geography`.
    #[must_use]
    pub fn section(&self) -> &str {
        self.segments().next().unwrap_or_default()
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for FieldPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for FieldPath {
    type Error = ohno::AppError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<FieldPath> for String {
    fn from(value: FieldPath) -> Self {
        value.0
    }
}

impl AsRef<str> for FieldPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
