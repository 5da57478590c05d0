use std::collections::BTreeMap;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// One source record: column name → raw value, in source column order.
///
/// Column names are kept verbatim because mappings reference them verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    cells: Vec<(String, String)>,
}

impl RawRow {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a cell. A repeated column name keeps its first value.
    pub fn push(&mut self, column: impl Into<String>, value: impl Into<String>) {
        let column = column.into();
        if self.get(&column).is_none() {
            self.cells.push((column, value.into()));
        }
    }

    #[must_use]
    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(name, _)| name.as_str())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = RawRow::new();
        for (column, value) in iter {
            row.push(column, value);
        }
        row
    }
}

// Serialized as a JSON object in column order, for previews.
impl Serialize for RawRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (column, value) in &self.cells {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

/// Canonical field name → source column name.
///
/// Several canonical fields may point at the same column (`first_name` and
/// `last_name` both mapped to "Full Name" is the usual name-split setup).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMapping(BTreeMap<String, String>);

impl FieldMapping {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, column: impl Into<String>) {
        self.0.insert(field.into(), column.into());
    }

    #[must_use]
    pub fn column_for(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(f, c)| (f.as_str(), c.as_str()))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FieldMapping {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(f, c)| (f.into(), c.into()))
                .collect(),
        )
    }
}

/// How to derive first/last name from one composite column.
///
/// Accepts both the long key names and the short ones the import UI posts
/// (`column`, `firstPart`, `lastPart`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NameSplitConfig {
    #[serde(alias = "column", alias = "source_column")]
    pub source_column: String,
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
    #[serde(default, alias = "firstPart", alias = "first_part_index")]
    pub first_part_index: usize,
    #[serde(
        default = "default_last_part_index",
        alias = "lastPart",
        alias = "last_part_index"
    )]
    pub last_part_index: usize,
}

impl NameSplitConfig {
    #[must_use]
    pub fn new(
        source_column: impl Into<String>,
        delimiter: impl Into<String>,
        first_part_index: usize,
        last_part_index: usize,
    ) -> Self {
        Self {
            source_column: source_column.into(),
            delimiter: delimiter.into(),
            first_part_index,
            last_part_index,
        }
    }
}

fn default_delimiter() -> String {
    " ".to_string()
}

fn default_last_part_index() -> usize {
    1
}
