//! Projects a [`RawRow`] onto the canonical contact schema.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use sanctum_core::{is_blank, CanonicalField};

use crate::name_split::NameParts;
use crate::types::{FieldMapping, NameSplitConfig, RawRow};

/// Columns the import UI synthesizes for its name-split preview. They never
/// exist in the uploaded data.
const SPLIT_PREVIEW_MARKER: &str = "_split_";

static SCRIPT_BLOCKS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>|<style\b[^>]*>.*?</style\s*>")
        .expect("valid script block regex")
});

static TAGS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)</?[A-Za-z!][^>]*>").expect("valid tag regex"));

static EVM_ADDRESS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^0x[a-fA-F0-9]{40}$").expect("valid evm address regex"));

/// A caller mapping resolved against the canonical schema once per import.
#[derive(Debug, Clone, Default)]
pub struct ResolvedMapping {
    entries: Vec<(CanonicalField, String)>,
    ignored: Vec<String>,
}

impl ResolvedMapping {
    /// Keeps entries naming a known canonical field. Unknown field names and
    /// preview pseudo-columns are set aside in [`ResolvedMapping::ignored`].
    #[must_use]
    pub fn resolve(mapping: &FieldMapping) -> Self {
        let mut resolved = Self::default();
        for (field, column) in mapping.iter() {
            if column.contains(SPLIT_PREVIEW_MARKER) {
                continue;
            }
            match field.parse::<CanonicalField>() {
                Ok(field) => resolved.entries.push((field, column.to_string())),
                Err(_) => resolved.ignored.push(field.to_string()),
            }
        }
        resolved
    }

    #[must_use]
    pub fn column_for(&self, field: CanonicalField) -> Option<&str> {
        self.entries
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, c)| c.as_str())
    }

    /// Field names from the caller mapping that are not part of the schema.
    #[must_use]
    pub fn ignored(&self) -> &[String] {
        &self.ignored
    }
}

/// Canonical values pulled out of one row, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialContact {
    values: BTreeMap<CanonicalField, String>,
}

impl PartialContact {
    #[must_use]
    pub fn get(&self, field: CanonicalField) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }

    pub fn set(&mut self, field: CanonicalField, value: impl Into<String>) {
        self.values.insert(field, value.into());
    }

    pub fn take(&mut self, field: CanonicalField) -> Option<String> {
        self.values.remove(&field)
    }

    pub fn into_values(self) -> impl Iterator<Item = (CanonicalField, String)> {
        self.values.into_iter()
    }
}

/// Trims a value and removes `<script>`/`<style>` blocks and markup tags.
#[must_use]
pub fn sanitize(value: &str) -> String {
    let without_scripts = SCRIPT_BLOCKS.replace_all(value, "");
    let without_tags = TAGS.replace_all(&without_scripts, "");
    without_tags.trim().to_string()
}

/// Maps a row onto the canonical fields.
///
/// Every mapped column with a non-empty value is copied; e-mail verbatim, all
/// other fields through [`sanitize`]. An EVM address that is not a 0x-prefixed
/// 40-digit hex string is dropped.
///
/// For `first_name`/`last_name`, a value mapped from any column other than the
/// name-split column wins over the split result. When the name field is
/// mapped to the split column itself (the usual setup) or not mapped at all,
/// the split part is used; a missing part leaves the field empty.
#[must_use]
pub fn map_row(
    row: &RawRow,
    mapping: &ResolvedMapping,
    split: Option<(&NameSplitConfig, &NameParts)>,
) -> PartialContact {
    let mut contact = PartialContact::default();

    for (field, column) in &mapping.entries {
        let raw = row.get(column);
        if is_blank(raw) {
            continue;
        }
        let raw = raw.unwrap_or_default();

        let value = match field {
            CanonicalField::Email => raw.to_string(),
            CanonicalField::EvmAddress => {
                let cleaned = sanitize(raw);
                if !EVM_ADDRESS.is_match(&cleaned) {
                    tracing::debug!(column = %column, "dropping malformed EVM address");
                    continue;
                }
                cleaned
            }
            _ => sanitize(raw),
        };

        if !value.is_empty() {
            contact.set(*field, value);
        }
    }

    if let Some((config, parts)) = split.filter(|(_, parts)| parts.split) {
        apply_split_part(
            &mut contact,
            mapping,
            config,
            CanonicalField::FirstName,
            parts.first_name.as_deref(),
        );
        apply_split_part(
            &mut contact,
            mapping,
            config,
            CanonicalField::LastName,
            parts.last_name.as_deref(),
        );
    }

    contact
}

/// Once the split column yielded tokens, the split owns the name field unless
/// it was mapped from another column. An unset part clears the field so the
/// composite value never leaks through as a name.
fn apply_split_part(
    contact: &mut PartialContact,
    mapping: &ResolvedMapping,
    config: &NameSplitConfig,
    field: CanonicalField,
    part: Option<&str>,
) {
    let mapped_elsewhere = mapping
        .column_for(field)
        .is_some_and(|column| column != config.source_column);
    if mapped_elsewhere && contact.get(field).is_some() {
        return;
    }
    match part.map(sanitize).filter(|p| !p.is_empty()) {
        Some(part) => contact.set(field, part),
        None => {
            contact.take(field);
        }
    }
}

#[cfg(test)]
#[path = "mapping_test.rs"]
mod tests;
