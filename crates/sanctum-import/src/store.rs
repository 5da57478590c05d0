//! The contact store contract the coordinator depends on, plus an in-memory
//! implementation used for dry runs and tests.

use std::future::Future;
use std::sync::Mutex;

use sanctum_core::{ContactId, ContactRecord};

use crate::error::StoreError;

/// Lookup and insert against wherever contacts live.
///
/// E-mail comparison is case-insensitive in every implementation.
pub trait ContactStore {
    /// Returns the id of a contact already holding `email`, if any.
    fn find_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<Option<ContactId>, StoreError>> + Send;

    /// Persists a new contact and returns its assigned id.
    fn insert(
        &self,
        record: &ContactRecord,
    ) -> impl Future<Output = Result<ContactId, StoreError>> + Send;
}

impl<S: ContactStore + Sync> ContactStore for &S {
    fn find_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<Option<ContactId>, StoreError>> + Send {
        (**self).find_by_email(email)
    }

    fn insert(
        &self,
        record: &ContactRecord,
    ) -> impl Future<Output = Result<ContactId, StoreError>> + Send {
        (**self).insert(record)
    }
}

/// Duplicate check for one e-mail. Callers skip this for rows without e-mail.
///
/// # Errors
///
/// Propagates the store's lookup failure.
pub async fn check_duplicate<S: ContactStore>(
    store: &S,
    email: &str,
) -> Result<Option<ContactId>, StoreError> {
    store.find_by_email(email).await
}

/// Keeps contacts in a vector; ids start at 1.
#[derive(Debug, Default)]
pub struct MemoryContactStore {
    contacts: Mutex<Vec<ContactRecord>>,
}

impl MemoryContactStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything inserted so far, in insert order.
    #[must_use]
    pub fn contacts(&self) -> Vec<ContactRecord> {
        self.contacts
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<ContactRecord>>, StoreError> {
        self.contacts
            .lock()
            .map_err(|_| StoreError::Backend("in-memory store lock poisoned".to_string()))
    }
}

fn same_email(stored: Option<&str>, email: &str) -> bool {
    stored.is_some_and(|s| s.eq_ignore_ascii_case(email))
}

fn id_for_position(position: usize) -> ContactId {
    ContactId(i64::try_from(position + 1).unwrap_or(i64::MAX))
}

impl ContactStore for MemoryContactStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<ContactId>, StoreError> {
        let contacts = self.lock()?;
        Ok(contacts
            .iter()
            .position(|c| same_email(c.email.as_deref(), email))
            .map(id_for_position))
    }

    async fn insert(&self, record: &ContactRecord) -> Result<ContactId, StoreError> {
        let mut contacts = self.lock()?;
        if let Some(email) = record.email.as_deref() {
            if contacts.iter().any(|c| same_email(c.email.as_deref(), email)) {
                return Err(StoreError::Conflict(format!("email {email}")));
            }
        }
        contacts.push(record.clone());
        Ok(id_for_position(contacts.len() - 1))
    }
}
