//! Seeded-document listing.
//!
//! Read-only projection of all rows this subsystem has materialized,
//! most recently written first.

use sqlx::{Row, SqlitePool};

use crate::config::Config;
use crate::db;
use crate::models::SeededDocument;
use crate::reconcile::SEEDED_STATUS;

/// All rows with seeded status, newest first. Returns an empty Vec (never
/// an error) when the store cannot be read.
pub async fn list_seeded(pool: &SqlitePool) -> Vec<SeededDocument> {
    let rows = sqlx::query(
        r#"
        SELECT document_id, filename, original_filename, file_size,
               storage_locator, attributes_json, processing_json, updated_at
        FROM document_metadata
        WHERE status = ?
        ORDER BY updated_at DESC
        "#,
    )
    .bind(SEEDED_STATUS)
    .fetch_all(pool)
    .await;

    let rows = match rows {
        Ok(rows) => rows,
        Err(_) => return Vec::new(),
    };

    rows.iter()
        .map(|row| {
            let attributes_json: String = row.get("attributes_json");
            let attributes: serde_json::Value =
                serde_json::from_str(&attributes_json).unwrap_or(serde_json::json!({}));

            let processing_json: String = row.get("processing_json");
            let seeded_at = serde_json::from_str::<serde_json::Value>(&processing_json)
                .ok()
                .and_then(|v| v["seeded_at"].as_str().map(|s| s.to_string()));

            let updated_at: i64 = row.get("updated_at");

            SeededDocument {
                document_id: row.get("document_id"),
                filename: row.get("filename"),
                original_filename: row.get("original_filename"),
                file_size: row.get("file_size"),
                storage_locator: row.get("storage_locator"),
                attributes,
                seeded_at,
                updated_at: format_ts_iso(updated_at),
            }
        })
        .collect()
}

fn format_ts_iso(ts: i64) -> String {
    chrono::DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| ts.to_string())
}

/// CLI entry point — prints the seeded documents as a table.
pub async fn run_list(config: &Config) -> anyhow::Result<()> {
    let pool = db::connect(config).await?;
    let docs = list_seeded(&pool).await;

    println!("seeded documents: {}", docs.len());
    if !docs.is_empty() {
        println!();
        println!(
            "  {:<40} {:>10}  {:<32} {}",
            "DOCUMENT ID", "SIZE", "LOCATOR", "SEEDED AT"
        );
        println!("  {}", "-".repeat(100));
        for doc in &docs {
            println!(
                "  {:<40} {:>10}  {:<32} {}",
                doc.document_id,
                doc.file_size,
                doc.storage_locator,
                doc.seeded_at.as_deref().unwrap_or("-"),
            );
        }
    }

    pool.close().await;
    Ok(())
}
