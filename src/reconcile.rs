//! Catalog-to-store reconciliation.
//!
//! Compares the static catalog against the `document_metadata` table and
//! materializes missing rows (or, when forced, overwrites existing ones).
//! All writes for one batch are staged inside a single transaction and
//! committed together; a per-entry failure is recorded and skipped, never
//! fatal to the batch. Used by `docseed status` / `docseed reconcile` and
//! the bootstrap sequence.

use chrono::Utc;
use sqlx::{Sqlite, SqlitePool, Transaction};
use std::sync::Arc;

use crate::catalog::{Catalog, CatalogEntry};
use crate::config::Config;
use crate::db;
use crate::error::SeedError;
use crate::models::{ReconcileOutcome, SeedStatus, WriteMode};
use crate::store::{ContentStore, FsContentStore};

/// Status value this subsystem stamps on every row it writes. No other
/// ingestion path produces it.
pub const SEEDED_STATUS: &str = "seeded";

/// Placeholder byte size persisted when a catalog entry's backing file has
/// not yet landed in the content store, so downstream consumers never see
/// a null or zero `file_size` for a catalog-declared document.
pub const FALLBACK_FILE_SIZE: u64 = 1_024_000;

/// Content type of every seeded document in the current catalog.
pub const SEEDED_CONTENT_TYPE: &str = "application/pdf";

/// Prefix under which seeded files are addressed in the content store.
pub const STORAGE_PREFIX: &str = "seed-data";

pub struct Reconciler {
    pool: SqlitePool,
    catalog: Catalog,
    store: Arc<dyn ContentStore>,
}

impl Reconciler {
    pub fn new(pool: SqlitePool, catalog: Catalog, store: Arc<dyn ContentStore>) -> Self {
        Self {
            pool,
            catalog,
            store,
        }
    }

    /// Current seeding status. Never returns an error: a store failure is
    /// reported through the `error` field with zeroed counts.
    pub async fn status(&self) -> SeedStatus {
        let expected_count = self.catalog.count() as i64;

        match self.count_seeded().await {
            Ok(persisted_count) => SeedStatus {
                persisted_count,
                expected_count,
                is_complete: persisted_count >= expected_count,
                completion_percentage: if expected_count > 0 {
                    persisted_count as f64 / expected_count as f64 * 100.0
                } else {
                    0.0
                },
                error: None,
            },
            Err(e) => SeedStatus {
                persisted_count: 0,
                expected_count,
                is_complete: false,
                completion_percentage: 0.0,
                error: Some(e.to_string()),
            },
        }
    }

    async fn count_seeded(&self) -> Result<i64, SeedError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM document_metadata WHERE status = ?")
                .bind(SEEDED_STATUS)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    /// Seed the metadata store from the catalog.
    ///
    /// Without `force`, a complete store is left untouched (`skipped = true`)
    /// and pre-existing rows are silently skipped. With `force`, every
    /// catalog entry is upserted with current catalog values and a fresh
    /// provenance timestamp.
    ///
    /// Running this twice without `force` and without external changes
    /// performs zero writes the second time.
    pub async fn reconcile(&self, force: bool) -> ReconcileOutcome {
        let status = self.status().await;

        if status.is_complete && !force {
            return ReconcileOutcome {
                success: true,
                message: "already seeded".to_string(),
                seeded_count: status.persisted_count.max(0) as u64,
                errors: Vec::new(),
                skipped: true,
            };
        }

        match self.seed_batch(force).await {
            Ok((seeded_count, errors)) => ReconcileOutcome {
                success: true,
                message: format!("seeded {} documents", seeded_count),
                seeded_count,
                errors,
                skipped: false,
            },
            Err(e) => ReconcileOutcome {
                success: false,
                message: format!("seeding failed: {}", e),
                seeded_count: 0,
                errors: vec![e.to_string()],
                skipped: false,
            },
        }
    }

    /// Stage all catalog entries inside one transaction and commit once.
    /// An `Err` here means nothing was applied.
    async fn seed_batch(&self, force: bool) -> Result<(u64, Vec<String>), SeedError> {
        let mode = if force {
            WriteMode::Upsert
        } else {
            WriteMode::Insert
        };

        let mut tx = self.pool.begin().await?;
        let mut seeded_count = 0u64;
        let mut errors = Vec::new();

        for entry in self.catalog.entries() {
            match self.seed_entry(&mut tx, entry, mode).await {
                Ok(true) => seeded_count += 1,
                Ok(false) => {} // row already present, not forced
                Err(e) => {
                    let err = SeedError::EntryWrite {
                        document_id: entry.document_id.clone(),
                        reason: e.to_string(),
                    };
                    errors.push(err.to_string());
                }
            }
        }

        tx.commit().await?;
        Ok((seeded_count, errors))
    }

    /// Write one catalog entry. Returns `Ok(false)` when the row exists and
    /// the write mode is `Insert`.
    async fn seed_entry(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        entry: &CatalogEntry,
        mode: WriteMode,
    ) -> Result<bool, SeedError> {
        if mode == WriteMode::Insert {
            let existing: Option<String> = sqlx::query_scalar(
                "SELECT document_id FROM document_metadata WHERE document_id = ?",
            )
            .bind(&entry.document_id)
            .fetch_optional(&mut **tx)
            .await?;

            if existing.is_some() {
                return Ok(false);
            }
        }

        // A backing file that has not landed yet is not an error; the row is
        // seeded with the fallback size and picked up by `verify` instead.
        let file_size = self
            .store
            .byte_size(&entry.storage_key)
            .await
            .unwrap_or(None)
            .unwrap_or(FALLBACK_FILE_SIZE);

        let now = Utc::now();
        let processing_json = serde_json::json!({
            "source": "seed_data",
            "seeded_at": now.to_rfc3339(),
        })
        .to_string();

        let sql = match mode {
            WriteMode::Insert => {
                r#"
                INSERT INTO document_metadata
                    (document_id, filename, original_filename, file_size, content_type,
                     storage_locator, status, text_extracted, attributes_json,
                     processing_json, created_at, updated_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, 0, ?, ?, ?, ?)
                "#
            }
            WriteMode::Upsert => {
                r#"
                INSERT INTO document_metadata
                    (document_id, filename, original_filename, file_size, content_type,
                     storage_locator, status, text_extracted, attributes_json,
                     processing_json, created_at, updated_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, 0, ?, ?, ?, ?)
                ON CONFLICT(document_id) DO UPDATE SET
                    filename = excluded.filename,
                    original_filename = excluded.original_filename,
                    file_size = excluded.file_size,
                    content_type = excluded.content_type,
                    storage_locator = excluded.storage_locator,
                    status = excluded.status,
                    text_extracted = excluded.text_extracted,
                    attributes_json = excluded.attributes_json,
                    processing_json = excluded.processing_json,
                    updated_at = excluded.updated_at
                "#
            }
        };

        sqlx::query(sql)
            .bind(&entry.document_id)
            .bind(&entry.storage_key)
            .bind(&entry.display_name)
            .bind(file_size as i64)
            .bind(SEEDED_CONTENT_TYPE)
            .bind(format!("{}/{}", STORAGE_PREFIX, entry.storage_key))
            .bind(SEEDED_STATUS)
            .bind(entry.attributes.to_string())
            .bind(processing_json)
            .bind(now.timestamp())
            .bind(now.timestamp())
            .execute(&mut **tx)
            .await?;

        Ok(true)
    }
}

/// Build a reconciler from config: load the catalog, connect the pool.
pub async fn reconciler_from_config(config: &Config) -> anyhow::Result<Reconciler> {
    let catalog = Catalog::load(&config.catalog.path)?;
    let pool = db::connect(config).await?;
    let store = Arc::new(FsContentStore::new(config.content_store.root.clone()));
    Ok(Reconciler::new(pool, catalog, store))
}

/// CLI entry point — prints the current seeding status.
pub async fn run_status(config: &Config) -> anyhow::Result<()> {
    let reconciler = reconciler_from_config(config).await?;
    let status = reconciler.status().await;

    println!("status");
    println!(
        "  seeded: {} / {}",
        status.persisted_count, status.expected_count
    );
    println!("  complete: {}", status.is_complete);
    println!("  completion: {:.1}%", status.completion_percentage);
    if let Some(ref err) = status.error {
        println!("  error: {}", err);
    }

    Ok(())
}

/// CLI entry point — runs reconciliation and prints the outcome.
pub async fn run_reconcile(config: &Config, force: bool) -> anyhow::Result<()> {
    let reconciler = reconciler_from_config(config).await?;
    let outcome = reconciler.reconcile(force).await;

    println!("reconcile{}", if force { " --force" } else { "" });
    if outcome.skipped {
        println!(
            "  skipped: already seeded ({} documents)",
            outcome.seeded_count
        );
    } else {
        println!("  seeded documents: {}", outcome.seeded_count);
        println!("  errors: {}", outcome.errors.len());
        for err in &outcome.errors {
            println!("    - {}", err);
        }
    }
    println!("{}", if outcome.success { "ok" } else { "failed" });

    if !outcome.success {
        anyhow::bail!("{}", outcome.message);
    }

    Ok(())
}
