//! CSV import and field-mapping engine.
//!
//! Rows flow through [`row_source`] → [`name_split`] → [`mapping`] →
//! [`validate`] → duplicate check and insert against a [`ContactStore`] →
//! [`report`]. [`ImportCoordinator`] drives one batch end to end.

pub mod coordinator;
pub mod error;
pub mod mapping;
pub mod name_split;
pub mod report;
pub mod row_source;
pub mod store;
pub mod types;
pub mod validate;

pub use coordinator::{ImportCoordinator, ImportOptions};
pub use error::{ImportError, RowSourceError, StoreError};
pub use mapping::{map_row, sanitize, PartialContact, ResolvedMapping};
pub use name_split::{split_name, NameParts};
pub use report::{summarize, ImportOutcome, ImportSummary, RowError, RowStatus};
pub use row_source::{from_csv, from_json, CsvOptions, CsvTable};
pub use store::{check_duplicate, ContactStore, MemoryContactStore};
pub use types::{FieldMapping, NameSplitConfig, RawRow};
pub use validate::{is_valid_email, validate_contact};
