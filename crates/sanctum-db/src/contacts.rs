//! Database operations for the `contacts` table.

use chrono::{DateTime, Utc};
use sanctum_core::{ContactId, ContactRecord};
use sanctum_import::{ContactStore, StoreError};
use sqlx::PgPool;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `contacts` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ContactRow {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub position: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
    pub evm_address: Option<String>,
    pub twitter_handle: Option<String>,
    pub linkedin_profile: Option<String>,
    pub telegram_username: Option<String>,
    pub discord_username: Option<String>,
    pub github_username: Option<String>,
    pub website: Option<String>,
    pub source: Option<String>,
    pub notes: Option<String>,
    pub contact_type: String,
    pub contact_status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Returns the id of the contact whose e-mail matches `email` ignoring case.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn find_contact_id_by_email(pool: &PgPool, email: &str) -> Result<Option<i64>, DbError> {
    let id = sqlx::query_scalar::<_, i64>(
        "SELECT id FROM contacts \
         WHERE email IS NOT NULL AND LOWER(email) = LOWER($1) \
         LIMIT 1",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;

    Ok(id)
}

/// Inserts a new contact and returns its generated id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails. A duplicate e-mail surfaces
/// as a unique violation; see [`DbError::is_unique_violation`].
pub async fn insert_contact(pool: &PgPool, record: &ContactRecord) -> Result<i64, DbError> {
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO contacts \
           (first_name, last_name, email, phone, company, position, address, city, state, \
            zip_code, country, evm_address, twitter_handle, linkedin_profile, \
            telegram_username, discord_username, github_username, website, source, notes, \
            contact_type, contact_status, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, \
                 $17, $18, $19, $20, $21, $22, $23, $24) \
         RETURNING id",
    )
    .bind(&record.first_name)
    .bind(&record.last_name)
    .bind(record.email.as_deref())
    .bind(record.phone.as_deref())
    .bind(record.company.as_deref())
    .bind(record.position.as_deref())
    .bind(record.address.as_deref())
    .bind(record.city.as_deref())
    .bind(record.state.as_deref())
    .bind(record.zip_code.as_deref())
    .bind(record.country.as_deref())
    .bind(record.evm_address.as_deref())
    .bind(record.twitter_handle.as_deref())
    .bind(record.linkedin_profile.as_deref())
    .bind(record.telegram_username.as_deref())
    .bind(record.discord_username.as_deref())
    .bind(record.github_username.as_deref())
    .bind(record.website.as_deref())
    .bind(record.source.as_deref())
    .bind(record.notes.as_deref())
    .bind(record.contact_type.as_str())
    .bind(record.contact_status.as_str())
    .bind(record.created_at)
    .bind(record.updated_at)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Returns a single contact by id, or `None` if not found.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_contact(pool: &PgPool, id: i64) -> Result<Option<ContactRow>, DbError> {
    let row = sqlx::query_as::<_, ContactRow>(
        "SELECT id, first_name, last_name, email, phone, company, position, address, city, \
                state, zip_code, country, evm_address, twitter_handle, linkedin_profile, \
                telegram_username, discord_username, github_username, website, source, notes, \
                contact_type, contact_status, created_at, updated_at \
         FROM contacts \
         WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Returns the total number of stored contacts.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_contacts(pool: &PgPool) -> Result<i64, DbError> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM contacts")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

// ---------------------------------------------------------------------------
// Import store
// ---------------------------------------------------------------------------

/// [`ContactStore`] backed by the `contacts` table.
///
/// The unique index on `LOWER(email)` backs up the coordinator's duplicate
/// check; a row that races past the lookup is reported as a conflict.
#[derive(Debug, Clone)]
pub struct PgContactStore {
    pool: PgPool,
}

impl PgContactStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl ContactStore for PgContactStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<ContactId>, StoreError> {
        find_contact_id_by_email(&self.pool, email)
            .await
            .map(|id| id.map(ContactId))
            .map_err(|e| StoreError::Backend(e.to_string()))
    }

    async fn insert(&self, record: &ContactRecord) -> Result<ContactId, StoreError> {
        match insert_contact(&self.pool, record).await {
            Ok(id) => Ok(ContactId(id)),
            Err(e) if e.is_unique_violation() => Err(StoreError::Conflict(e.to_string())),
            Err(e) => Err(StoreError::Backend(e.to_string())),
        }
    }
}
