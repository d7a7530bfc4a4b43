//! Structured results returned by the seeding operations.
//!
//! Every public operation reports through these shapes instead of raising:
//! failures land in `error`/`errors` fields so callers (and the bootstrap
//! sequence) can log and carry on.

use serde::Serialize;

/// How `reconcile` writes a catalog entry, chosen once from the `force` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Plain insert; pre-existing rows are skipped before reaching the write.
    Insert,
    /// Insert-or-replace keyed by `document_id`.
    Upsert,
}

/// Result of `Reconciler::status`.
#[derive(Debug, Clone, Serialize)]
pub struct SeedStatus {
    pub persisted_count: i64,
    pub expected_count: i64,
    pub is_complete: bool,
    pub completion_percentage: f64,
    /// Set when the metadata store could not be consulted. The counts are
    /// zeroed in that case, so check this before trusting them.
    pub error: Option<String>,
}

/// Result of `Reconciler::reconcile`.
#[derive(Debug, Clone, Serialize)]
pub struct ReconcileOutcome {
    pub success: bool,
    pub message: String,
    pub seeded_count: u64,
    /// Per-entry failures, tagged with the offending document_id.
    /// Non-empty errors do not imply `success = false`.
    pub errors: Vec<String>,
    pub skipped: bool,
}

/// A catalog entry whose backing file was found in the content store.
#[derive(Debug, Clone, Serialize)]
pub struct ExistingFile {
    pub document_id: String,
    pub storage_key: String,
    pub byte_size: u64,
}

/// A catalog entry whose backing file is absent from the content store.
#[derive(Debug, Clone, Serialize)]
pub struct MissingFile {
    pub document_id: String,
    pub storage_key: String,
    pub expected_path: String,
}

/// Result of `Verifier::verify`.
#[derive(Debug, Clone, Serialize)]
pub struct VerifyReport {
    pub total_expected: usize,
    pub existing_count: usize,
    pub missing_count: usize,
    pub missing: Vec<MissingFile>,
    pub existing: Vec<ExistingFile>,
    pub complete: bool,
    pub error: Option<String>,
}

/// Read-only projection of a seeded row, as returned by `list_seeded`.
#[derive(Debug, Clone, Serialize)]
pub struct SeededDocument {
    pub document_id: String,
    pub filename: String,
    pub original_filename: String,
    pub file_size: i64,
    pub storage_locator: String,
    pub attributes: serde_json::Value,
    /// RFC3339 provenance timestamp from processing_json, when present.
    pub seeded_at: Option<String>,
    pub updated_at: String, // ISO8601
}
