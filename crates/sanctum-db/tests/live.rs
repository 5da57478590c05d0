//! Live integration tests for sanctum-db using `#[sqlx::test]`.
//!
//! Each test gets a fresh, fully-migrated Postgres database spun up by the
//! sqlx test harness. The `migrations` path is relative to the crate root
//! (`crates/sanctum-db/`), so `"../../migrations"` resolves to the workspace
//! migration directory.

use chrono::Utc;
use sanctum_core::ContactRecord;
use sanctum_db::{
    count_contacts, find_contact_id_by_email, get_contact, health_check, insert_contact,
    PgContactStore,
};
use sanctum_import::{
    from_csv, ContactStore, CsvOptions, ImportCoordinator, ImportOptions, StoreError,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn record(first: &str, last: &str, email: Option<&str>) -> ContactRecord {
    let mut record = ContactRecord::new(first.to_string(), last.to_string(), Utc::now());
    record.email = email.map(ToOwned::to_owned);
    record
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn health_check_succeeds_on_migrated_database(pool: sqlx::PgPool) {
    health_check(&pool).await.expect("health check");
}

#[sqlx::test(migrations = "../../migrations")]
async fn insert_then_get_round_trips_defaults(pool: sqlx::PgPool) {
    let mut new = record("Ada", "Lovelace", Some("ada@example.com"));
    new.company = Some("Analytical Engines".to_string());
    new.source = Some("CSV Import".to_string());

    let id = insert_contact(&pool, &new).await.expect("insert");
    let row = get_contact(&pool, id)
        .await
        .expect("get")
        .expect("row exists");

    assert_eq!(row.first_name, "Ada");
    assert_eq!(row.company.as_deref(), Some("Analytical Engines"));
    assert_eq!(row.source.as_deref(), Some("CSV Import"));
    assert_eq!(row.contact_type, "lead");
    assert_eq!(row.contact_status, "new");
    assert!(row.phone.is_none());
}

#[sqlx::test(migrations = "../../migrations")]
async fn get_contact_returns_none_for_unknown_id(pool: sqlx::PgPool) {
    assert!(get_contact(&pool, 9_999).await.expect("get").is_none());
}

#[sqlx::test(migrations = "../../migrations")]
async fn email_lookup_is_case_insensitive(pool: sqlx::PgPool) {
    let id = insert_contact(&pool, &record("Ada", "Lovelace", Some("Ada@Example.COM")))
        .await
        .expect("insert");

    let found = find_contact_id_by_email(&pool, "ada@example.com")
        .await
        .expect("lookup");
    assert_eq!(found, Some(id));

    let missing = find_contact_id_by_email(&pool, "bob@example.com")
        .await
        .expect("lookup");
    assert!(missing.is_none());
}

#[sqlx::test(migrations = "../../migrations")]
async fn unique_index_rejects_case_variant_email(pool: sqlx::PgPool) {
    insert_contact(&pool, &record("Ada", "Lovelace", Some("ada@example.com")))
        .await
        .expect("first insert");

    let err = insert_contact(&pool, &record("Ada", "Again", Some("ADA@example.com")))
        .await
        .expect_err("duplicate must fail");
    assert!(err.is_unique_violation());
}

#[sqlx::test(migrations = "../../migrations")]
async fn contacts_without_email_never_collide(pool: sqlx::PgPool) {
    insert_contact(&pool, &record("Bob", "Johnson", None))
        .await
        .expect("first");
    insert_contact(&pool, &record("Bob", "Johnson", None))
        .await
        .expect("second");

    assert_eq!(count_contacts(&pool).await.expect("count"), 2);
}

// ---------------------------------------------------------------------------
// Import store
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn store_maps_unique_violation_to_conflict(pool: sqlx::PgPool) {
    let store = PgContactStore::new(pool);
    let first = store
        .insert(&record("Ada", "Lovelace", Some("ada@example.com")))
        .await
        .expect("insert");
    assert_eq!(
        store.find_by_email("ADA@EXAMPLE.COM").await.expect("lookup"),
        Some(first)
    );

    let err = store
        .insert(&record("Ada", "Again", Some("ada@example.com")))
        .await
        .expect_err("duplicate");
    assert!(matches!(err, StoreError::Conflict(_)));
}

#[sqlx::test(migrations = "../../migrations")]
async fn csv_batch_persists_valid_rows(pool: sqlx::PgPool) {
    let csv = "\
First Name,Last Name,Email
John,Doe,john@example.com
Jane,Smith,invalid-email
Bob,Johnson,
John,Again,JOHN@example.com
";
    let table = from_csv(csv, CsvOptions::default()).expect("parse");
    let options = ImportOptions {
        field_mapping: [
            ("first_name", "First Name"),
            ("last_name", "Last Name"),
            ("email", "Email"),
        ]
        .into_iter()
        .collect(),
        name_split: None,
        source: "CSV Import".to_string(),
        notes: None,
    };

    let coordinator = ImportCoordinator::new(PgContactStore::new(pool.clone()));
    let summary = coordinator.run(&table.rows, &options).await;

    assert_eq!(summary.total_processed, 4);
    assert_eq!(summary.success_count, 2);
    assert_eq!(summary.error_count, 2);
    assert_eq!(summary.errors[0].row, 2);
    assert_eq!(summary.errors[1].row, 4);
    assert_eq!(
        summary.errors[1].message,
        "Contact with this email already exists"
    );
    assert_eq!(count_contacts(&pool).await.expect("count"), 2);

    let id = find_contact_id_by_email(&pool, "john@example.com")
        .await
        .expect("lookup")
        .expect("john stored");
    let john = get_contact(&pool, id).await.expect("get").expect("row");
    assert_eq!(john.source.as_deref(), Some("CSV Import"));
}
