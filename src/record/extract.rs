//! Discovery of the field paths that carry data in a record.

use super::FieldPath;
use serde_json::{Map, Value};
use std::collections::HashSet;

const LOG_TARGET: &str = "   extract";

/// Distinct field paths found in one record, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldPaths {
    paths: Vec<FieldPath>,
}

impl FieldPaths {
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.paths.iter().any(|p| p.as_str() == path)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldPath> {
        self.paths.iter()
    }
}

impl IntoIterator for FieldPaths {
    type Item = FieldPath;
    type IntoIter = std::vec::IntoIter<FieldPath>;

    fn into_iter(self) -> Self::IntoIter {
        self.paths.into_iter()
    }
}

impl<'a> IntoIterator for &'a FieldPaths {
    type Item = &'a FieldPath;
    type IntoIter = core::slice::Iter<'a, FieldPath>;

    fn into_iter(self) -> Self::IntoIter {
        self.paths.iter()
    }
}

/// Walk a record and collect every path that leads to a meaningful leaf.
///
/// Mappings are descended recursively. Keys starting with `_` are metadata and skipped
/// together with their subtree. A sequence whose first element is a mapping is treated as
/// a list of records with a shared shape, so only that first element is inspected; any other
/// sequence is a leaf in its own right.
///
/// A leaf is meaningful unless it is `null`, a blank string or an empty sequence.
#[must_use]
pub fn extract(record: &Value) -> FieldPaths {
    let mut collector = Collector::default();
    if let Value::Object(map) = record {
        collector.walk_mapping(map, None);
    }

    FieldPaths { paths: collector.paths }
}

#[derive(Default)]
struct Collector {
    paths: Vec<FieldPath>,
    seen: HashSet<FieldPath>,
}

impl Collector {
    fn walk_mapping(&mut self, map: &Map<String, Value>, prefix: Option<&FieldPath>) {
        for (key, value) in map {
            if key.starts_with('_') {
                continue;
            }

            let path = match prefix {
                Some(parent) => parent.child(key),
                None => FieldPath::root(key),
            };

            let Some(path) = path else {
                log::trace!(target: LOG_TARGET, "Skipping key '{key}' which cannot be addressed by a field path");
                continue;
            };

            self.walk_value(value, path);
        }
    }

    fn walk_value(&mut self, value: &Value, path: FieldPath) {
        match value {
            Value::Object(map) => self.walk_mapping(map, Some(&path)),
            Value::Array(items) => match items.first() {
                Some(Value::Object(first)) => self.walk_mapping(first, Some(&path)),
                Some(_) => self.record(path),
                None => {}
            },
            Value::String(s) => {
                if !s.trim().is_empty() {
                    self.record(path);
                }
            }
            Value::Number(_) | Value::Bool(_) => self.record(path),
            Value::Null => {}
        }
    }

    fn record(&mut self, path: FieldPath) {
        if self.seen.insert(path.clone()) {
            self.paths.push(path);
        }
    }
}
