//! Drives one import batch row by row.
//!
//! Rows are handled strictly in input order and one at a time: the duplicate
//! check for row N must observe the insert made for row N-1, so two rows with
//! the same e-mail in one file resolve to one success and one conflict.

use chrono::Utc;
use sanctum_core::{CanonicalField, ContactId, ContactRecord};

use crate::error::{ImportError, StoreError};
use crate::mapping::{map_row, sanitize, PartialContact, ResolvedMapping};
use crate::name_split::split_name;
use crate::report::{summarize, ImportOutcome, ImportSummary};
use crate::store::{check_duplicate, ContactStore};
use crate::types::{FieldMapping, NameSplitConfig, RawRow};
use crate::validate::validate_contact;

/// Per-batch settings shared by every row.
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    pub field_mapping: FieldMapping,
    pub name_split: Option<NameSplitConfig>,
    /// Stamped on every imported contact as its `source`.
    pub source: String,
    /// Used as a contact's `notes` when the row maps none of its own.
    pub notes: Option<String>,
}

pub struct ImportCoordinator<S> {
    store: S,
}

impl<S: ContactStore> ImportCoordinator<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Imports every row and returns the aggregate summary.
    ///
    /// Never fails as a whole: each row ends either persisted or rejected,
    /// and rejections are reported with the row's 1-based input position.
    pub async fn run(&self, rows: &[RawRow], options: &ImportOptions) -> ImportSummary {
        let outcomes = self.process(rows, options).await;
        let summary = summarize(&outcomes);
        tracing::info!(
            source = %options.source,
            total = summary.total_processed,
            succeeded = summary.success_count,
            failed = summary.error_count,
            "contact import finished"
        );
        summary
    }

    /// Like [`ImportCoordinator::run`] but returns the per-row outcomes.
    pub async fn process(&self, rows: &[RawRow], options: &ImportOptions) -> Vec<ImportOutcome> {
        let mapping = ResolvedMapping::resolve(&options.field_mapping);
        if !mapping.ignored().is_empty() {
            tracing::warn!(
                fields = ?mapping.ignored(),
                "ignoring mapped fields that are not part of the contact schema"
            );
        }

        let batch = BatchContext {
            mapping,
            name_split: options.name_split.as_ref(),
            source: Some(sanitize(&options.source)).filter(|s| !s.is_empty()),
            notes: options
                .notes
                .as_deref()
                .map(sanitize)
                .filter(|n| !n.is_empty()),
        };

        let mut outcomes = Vec::with_capacity(rows.len());
        for (idx, row) in rows.iter().enumerate() {
            let row_index = idx + 1;
            let outcome = match self.import_row(row_index, row, &batch).await {
                Ok(id) => ImportOutcome::success(row_index, id),
                Err(e) => {
                    tracing::debug!(row = row_index, error = %e, "import row rejected");
                    ImportOutcome::error(row_index, e.to_string())
                }
            };
            outcomes.push(outcome);
        }
        outcomes
    }

    async fn import_row(
        &self,
        row_index: usize,
        row: &RawRow,
        batch: &BatchContext<'_>,
    ) -> Result<ContactId, ImportError> {
        let contact = match batch.name_split {
            Some(config) => {
                let parts = split_name(row, config);
                map_row(row, &batch.mapping, Some((config, &parts)))
            }
            None => map_row(row, &batch.mapping, None),
        };

        validate_contact(&contact)?;

        if let Some(email) = contact
            .get(CanonicalField::Email)
            .filter(|e| !e.is_empty())
        {
            match check_duplicate(&self.store, email).await {
                Ok(Some(existing)) => {
                    tracing::debug!(row = row_index, existing = %existing, "duplicate e-mail");
                    return Err(ImportError::Conflict);
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::error!(row = row_index, error = %e, "duplicate lookup failed");
                    return Err(ImportError::Persistence);
                }
            }
        }

        let record = build_record(contact, batch);
        match self.store.insert(&record).await {
            Ok(id) => Ok(id),
            Err(StoreError::Conflict(detail)) => {
                tracing::warn!(row = row_index, detail = %detail, "store rejected duplicate contact");
                Err(ImportError::Conflict)
            }
            Err(e) => {
                tracing::error!(row = row_index, error = %e, "failed to persist contact");
                Err(ImportError::Persistence)
            }
        }
    }
}

struct BatchContext<'a> {
    mapping: ResolvedMapping,
    name_split: Option<&'a NameSplitConfig>,
    source: Option<String>,
    notes: Option<String>,
}

/// Turns a validated row into a fresh record with system defaults applied.
fn build_record(mut contact: PartialContact, batch: &BatchContext<'_>) -> ContactRecord {
    let first_name = contact.take(CanonicalField::FirstName).unwrap_or_default();
    let last_name = contact.take(CanonicalField::LastName).unwrap_or_default();

    let mut record = ContactRecord::new(first_name, last_name, Utc::now());
    for (field, value) in contact.into_values() {
        record.set_optional(field, Some(value));
    }

    if batch.source.is_some() {
        record.source.clone_from(&batch.source);
    }
    if record.notes.is_none() {
        record.notes.clone_from(&batch.notes);
    }
    record
}

#[cfg(test)]
#[path = "coordinator_test.rs"]
mod tests;
