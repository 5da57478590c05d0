use crate::types::{NameSplitConfig, RawRow};

/// First/last name candidates derived from a composite column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameParts {
    /// The column held at least two tokens, even if a selected one was unusable.
    pub split: bool,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl NameParts {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none() && self.last_name.is_none()
    }
}

/// Splits `config.source_column` on the literal delimiter and picks the
/// tokens at the configured indices.
///
/// Yields nothing when the column is absent or empty, the delimiter is empty,
/// or fewer than two tokens result. Tokens other than the two selected ones
/// (middle names) are dropped. An index past the end, or a token that is
/// empty after trimming, leaves that part unset.
#[must_use]
pub fn split_name(row: &RawRow, config: &NameSplitConfig) -> NameParts {
    let Some(raw) = row.get(&config.source_column).filter(|v| !v.is_empty()) else {
        return NameParts::default();
    };
    if config.delimiter.is_empty() {
        return NameParts::default();
    }

    let tokens: Vec<&str> = raw.split(config.delimiter.as_str()).map(str::trim).collect();
    if tokens.len() < 2 {
        return NameParts::default();
    }

    let pick = |idx: usize| {
        tokens
            .get(idx)
            .filter(|t| !t.is_empty())
            .map(|t| (*t).to_string())
    };

    NameParts {
        split: true,
        first_name: pick(config.first_part_index),
        last_name: pick(config.last_part_index),
    }
}

#[cfg(test)]
#[path = "name_split_test.rs"]
mod tests;
