//! Library-level tests for the reconciliation contract: idempotence,
//! convergence under force, partial-failure isolation, and the fallback
//! file size.

use chrono::DateTime;
use sqlx::{Row, SqlitePool};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

use docseed::catalog::Catalog;
use docseed::config::{CatalogConfig, Config, ContentStoreConfig, DbConfig};
use docseed::db;
use docseed::list::list_seeded;
use docseed::migrate;
use docseed::reconcile::{Reconciler, FALLBACK_FILE_SIZE};
use docseed::store::FsContentStore;
use docseed::verify::Verifier;

const TWO_DOCS: &str = r#"
[[documents]]
document_id = "doc-alpha"
storage_key = "alpha.pdf"
display_name = "alpha_original.pdf"

[documents.attributes]
author = "Alpha Author"
year = 2021

[[documents]]
document_id = "doc-beta"
storage_key = "beta.pdf"
display_name = "beta_original.pdf"
"#;

/// Catalog where the third entry reuses the second entry's storage key,
/// so its insert trips the UNIQUE(filename) constraint.
const CONFLICTING_DOCS: &str = r#"
[[documents]]
document_id = "doc-alpha"
storage_key = "alpha.pdf"
display_name = "alpha_original.pdf"

[[documents]]
document_id = "doc-beta"
storage_key = "beta.pdf"
display_name = "beta_original.pdf"

[[documents]]
document_id = "doc-gamma"
storage_key = "beta.pdf"
display_name = "gamma_original.pdf"
"#;

struct TestEnv {
    tmp: TempDir,
    pool: SqlitePool,
    catalog: Catalog,
    store: Arc<FsContentStore>,
    seed_dir: std::path::PathBuf,
}

impl TestEnv {
    fn reconciler(&self) -> Reconciler {
        Reconciler::new(
            self.pool.clone(),
            self.catalog.clone(),
            self.store.clone(),
        )
    }

    fn verifier(&self) -> Verifier {
        Verifier::new(self.catalog.clone(), self.store.clone())
    }

    fn seed_data(&self) -> std::path::PathBuf {
        self.seed_dir.clone()
    }
}

async fn setup(catalog_toml: &str) -> TestEnv {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();

    fs::create_dir_all(root.join("seed-data")).unwrap();
    fs::write(root.join("catalog.toml"), catalog_toml).unwrap();

    let config = Config {
        db: DbConfig {
            path: root.join("data/meta.sqlite"),
        },
        catalog: CatalogConfig {
            path: root.join("catalog.toml"),
        },
        content_store: ContentStoreConfig {
            root: root.join("seed-data"),
        },
    };

    let pool = db::connect(&config).await.unwrap();
    migrate::create_schema(&pool).await.unwrap();
    let catalog = Catalog::load(&config.catalog.path).unwrap();
    let seed_dir = config.content_store.root.clone();
    let store = Arc::new(FsContentStore::new(seed_dir.clone()));

    TestEnv {
        tmp,
        pool,
        catalog,
        store,
        seed_dir,
    }
}

async fn fetch_row(pool: &SqlitePool, document_id: &str) -> sqlx::sqlite::SqliteRow {
    sqlx::query("SELECT * FROM document_metadata WHERE document_id = ?")
        .bind(document_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

async fn row_count(pool: &SqlitePool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM document_metadata")
        .fetch_one(pool)
        .await
        .unwrap()
}

fn write_file(dir: &Path, name: &str, len: usize) {
    fs::write(dir.join(name), vec![0u8; len]).unwrap();
}

fn seeded_at(row: &sqlx::sqlite::SqliteRow) -> DateTime<chrono::FixedOffset> {
    let processing_json: String = row.get("processing_json");
    let value: serde_json::Value = serde_json::from_str(&processing_json).unwrap();
    assert_eq!(value["source"], "seed_data");
    DateTime::parse_from_rfc3339(value["seeded_at"].as_str().unwrap()).unwrap()
}

#[tokio::test]
async fn status_on_empty_store() {
    let env = setup(TWO_DOCS).await;
    let status = env.reconciler().status().await;

    assert_eq!(status.persisted_count, 0);
    assert_eq!(status.expected_count, 2);
    assert!(!status.is_complete);
    assert_eq!(status.completion_percentage, 0.0);
    assert!(status.error.is_none());
}

#[tokio::test]
async fn status_with_empty_catalog_avoids_division_by_zero() {
    let env = setup("").await;
    let status = env.reconciler().status().await;

    assert_eq!(status.persisted_count, 0);
    assert_eq!(status.expected_count, 0);
    assert_eq!(status.completion_percentage, 0.0);
}

#[tokio::test]
async fn status_reports_store_failure_as_error_field() {
    let env = setup(TWO_DOCS).await;

    // A pool onto a database that never had the schema created.
    let config = Config {
        db: DbConfig {
            path: env.tmp.path().join("other.sqlite"),
        },
        catalog: CatalogConfig {
            path: env.tmp.path().join("catalog.toml"),
        },
        content_store: ContentStoreConfig {
            root: env.seed_data(),
        },
    };
    let bare_pool = db::connect(&config).await.unwrap();
    let reconciler = Reconciler::new(bare_pool, env.catalog.clone(), env.store.clone());

    let status = reconciler.status().await;
    assert_eq!(status.persisted_count, 0);
    assert!(!status.is_complete);
    assert_eq!(status.completion_percentage, 0.0);
    assert!(status.error.is_some());
}

#[tokio::test]
async fn reconcile_is_idempotent() {
    let env = setup(TWO_DOCS).await;
    let reconciler = env.reconciler();

    let first = reconciler.reconcile(false).await;
    assert!(first.success);
    assert!(!first.skipped);
    assert_eq!(first.seeded_count, 2);
    assert!(first.errors.is_empty());
    assert_eq!(row_count(&env.pool).await, 2);

    let before = seeded_at(&fetch_row(&env.pool, "doc-alpha").await);

    let second = reconciler.reconcile(false).await;
    assert!(second.success);
    assert!(second.skipped);
    assert_eq!(second.seeded_count, 2);
    assert_eq!(row_count(&env.pool).await, 2);

    // No net row changes: the provenance timestamp did not move.
    let after = seeded_at(&fetch_row(&env.pool, "doc-alpha").await);
    assert_eq!(before, after);
}

#[tokio::test]
async fn reconcile_skips_preexisting_rows_without_force() {
    let env = setup(TWO_DOCS).await;

    // Seed only alpha first, via a reconciler over a one-entry catalog.
    let one_doc = r#"
[[documents]]
document_id = "doc-alpha"
storage_key = "alpha.pdf"
display_name = "alpha_original.pdf"
"#;
    fs::write(env.tmp.path().join("one.toml"), one_doc).unwrap();
    let partial_catalog = Catalog::load(&env.tmp.path().join("one.toml")).unwrap();
    let partial =
        Reconciler::new(env.pool.clone(), partial_catalog, env.store.clone());
    assert_eq!(partial.reconcile(false).await.seeded_count, 1);

    let alpha_before = seeded_at(&fetch_row(&env.pool, "doc-alpha").await);

    // Full catalog: only beta is new.
    let outcome = env.reconciler().reconcile(false).await;
    assert!(outcome.success);
    assert!(!outcome.skipped);
    assert_eq!(outcome.seeded_count, 1);
    assert_eq!(row_count(&env.pool).await, 2);

    // The pre-existing row was not rewritten.
    let alpha_after = seeded_at(&fetch_row(&env.pool, "doc-alpha").await);
    assert_eq!(alpha_before, alpha_after);
}

#[tokio::test]
async fn forced_reconcile_converges_except_provenance_timestamp() {
    let env = setup(TWO_DOCS).await;
    write_file(&env.seed_data(), "alpha.pdf", 500);
    let reconciler = env.reconciler();

    let first = reconciler.reconcile(true).await;
    assert!(first.success);
    assert_eq!(first.seeded_count, 2);
    let row_before = fetch_row(&env.pool, "doc-alpha").await;

    tokio::time::sleep(Duration::from_millis(20)).await;

    let second = reconciler.reconcile(true).await;
    assert!(second.success);
    assert!(!second.skipped);
    assert_eq!(second.seeded_count, 2);
    assert_eq!(row_count(&env.pool).await, 2);
    let row_after = fetch_row(&env.pool, "doc-alpha").await;

    // All persisted values converge except the provenance timestamp.
    for col in [
        "filename",
        "original_filename",
        "content_type",
        "storage_locator",
        "status",
        "attributes_json",
    ] {
        let before: String = row_before.get(col);
        let after: String = row_after.get(col);
        assert_eq!(before, after, "column {} diverged under force", col);
    }
    let size_before: i64 = row_before.get("file_size");
    let size_after: i64 = row_after.get("file_size");
    assert_eq!(size_before, size_after);
    let created_before: i64 = row_before.get("created_at");
    let created_after: i64 = row_after.get("created_at");
    assert_eq!(created_before, created_after);

    assert!(seeded_at(&row_after) > seeded_at(&row_before));
}

#[tokio::test]
async fn per_entry_failure_does_not_abort_the_batch() {
    let env = setup(CONFLICTING_DOCS).await;
    let outcome = env.reconciler().reconcile(false).await;

    assert!(outcome.success);
    assert_eq!(outcome.seeded_count, 2);
    assert_eq!(outcome.errors.len(), 1);
    assert!(outcome.errors[0].contains("doc-gamma"));
    assert_eq!(row_count(&env.pool).await, 2);
}

#[tokio::test]
async fn file_size_uses_actual_length_or_fallback() {
    let env = setup(TWO_DOCS).await;
    write_file(&env.seed_data(), "alpha.pdf", 500);

    let outcome = env.reconciler().reconcile(false).await;
    assert_eq!(outcome.seeded_count, 2);

    let alpha: i64 = fetch_row(&env.pool, "doc-alpha").await.get("file_size");
    let beta: i64 = fetch_row(&env.pool, "doc-beta").await.get("file_size");
    assert_eq!(alpha, 500);
    assert_eq!(beta, FALLBACK_FILE_SIZE as i64);
}

#[tokio::test]
async fn verify_is_independent_of_the_metadata_store() {
    let env = setup(TWO_DOCS).await;
    let verifier = env.verifier();

    // Before any reconcile: everything missing.
    let report = verifier.verify().await;
    assert_eq!(report.total_expected, 2);
    assert_eq!(report.missing_count, 2);
    assert_eq!(report.existing_count, 0);
    assert!(!report.complete);
    assert!(report
        .missing
        .iter()
        .any(|m| m.document_id == "doc-alpha" && m.expected_path.ends_with("alpha.pdf")));

    // Seeding with a missing backing file still leaves verify reporting it
    // missing; the divergence is expected.
    write_file(&env.seed_data(), "alpha.pdf", 500);
    env.reconciler().reconcile(false).await;

    let report = verifier.verify().await;
    assert_eq!(report.existing_count, 1);
    assert_eq!(report.missing_count, 1);
    assert_eq!(report.existing[0].document_id, "doc-alpha");
    assert_eq!(report.existing[0].byte_size, 500);
    assert!(!report.complete);

    // All files present: complete.
    write_file(&env.seed_data(), "beta.pdf", 800);
    let report = verifier.verify().await;
    assert_eq!(report.missing_count, 0);
    assert!(report.complete);
    assert!(report.error.is_none());
}

#[tokio::test]
async fn verify_degrades_fail_safe_when_store_unreachable() {
    let env = setup(TWO_DOCS).await;

    // A root pointing at a regular file makes every probe under it fail
    // with a non-NotFound I/O error (ENOTDIR).
    let bogus_root = env.tmp.path().join("not-a-directory");
    fs::write(&bogus_root, b"plain file").unwrap();
    let broken_store = Arc::new(FsContentStore::new(bogus_root));

    let verifier = Verifier::new(env.catalog.clone(), broken_store.clone());
    let report = verifier.verify().await;

    // Nothing verified: every entry counted missing, details withheld.
    assert_eq!(report.total_expected, 2);
    assert_eq!(report.existing_count, 0);
    assert_eq!(report.missing_count, 2);
    assert!(report.existing.is_empty());
    assert!(report.missing.is_empty());
    assert!(!report.complete);
    assert!(report.error.is_some());

    // Reconcile treats the same probe failure as an absent backing file:
    // rows are still seeded, with the fallback size.
    let reconciler = Reconciler::new(env.pool.clone(), env.catalog.clone(), broken_store);
    let outcome = reconciler.reconcile(false).await;
    assert!(outcome.success);
    assert_eq!(outcome.seeded_count, 2);
    assert!(outcome.errors.is_empty());

    let alpha: i64 = fetch_row(&env.pool, "doc-alpha").await.get("file_size");
    assert_eq!(alpha, FALLBACK_FILE_SIZE as i64);
}

#[tokio::test]
async fn list_seeded_returns_rows_and_never_errors() {
    let env = setup(TWO_DOCS).await;
    env.reconciler().reconcile(false).await;

    let docs = list_seeded(&env.pool).await;
    assert_eq!(docs.len(), 2);
    let alpha = docs
        .iter()
        .find(|d| d.document_id == "doc-alpha")
        .unwrap();
    assert_eq!(alpha.filename, "alpha.pdf");
    assert_eq!(alpha.storage_locator, "seed-data/alpha.pdf");
    assert_eq!(alpha.attributes["author"], "Alpha Author");
    assert!(alpha.seeded_at.is_some());

    // Store failure degrades to an empty list, not an error.
    let config = Config {
        db: DbConfig {
            path: env.tmp.path().join("no-schema.sqlite"),
        },
        catalog: CatalogConfig {
            path: env.tmp.path().join("catalog.toml"),
        },
        content_store: ContentStoreConfig {
            root: env.seed_data(),
        },
    };
    let bare_pool = db::connect(&config).await.unwrap();
    assert!(list_seeded(&bare_pool).await.is_empty());
}

#[tokio::test]
async fn empty_catalog_reconcile_is_a_no_op() {
    let env = setup("").await;
    let outcome = env.reconciler().reconcile(false).await;

    assert!(outcome.success);
    assert!(outcome.skipped);
    assert_eq!(outcome.seeded_count, 0);
    assert_eq!(row_count(&env.pool).await, 0);
}
