//! Failure taxonomy for seeding operations.
//!
//! These errors are never propagated past the public operation boundary.
//! Each operation catches them and flattens the message into the `error`
//! or `errors` field of its structured result.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SeedError {
    /// Metadata store connection or query failure.
    #[error("metadata store unavailable: {0}")]
    StoreUnavailable(#[from] sqlx::Error),

    /// Content store I/O failure other than a plain missing file.
    #[error("content store unavailable: {path}: {source}")]
    ContentStoreUnavailable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failure seeding a single catalog entry. Recorded per entry,
    /// never aborts the batch.
    #[error("error seeding document {document_id}: {reason}")]
    EntryWrite { document_id: String, reason: String },
}
