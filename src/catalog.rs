//! Static catalog of expected documents.
//!
//! The catalog is a TOML data file listing every document the metadata store
//! is expected to contain. It is loaded once at startup into an immutable
//! sequence and never mutated; changing the expected set is a data-file
//! change, not a code change.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

/// One statically-declared expected document.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogEntry {
    /// Unique identifier. May be synthetic: multi-part submissions from one
    /// logical source file carry a `-1`/`-2`/`-3` suffix.
    pub document_id: String,
    /// Canonical filename, used both for content-store lookup and as the
    /// persisted `filename`.
    pub storage_key: String,
    /// Human-readable original filename.
    pub display_name: String,
    /// Open descriptive fields (author, year, funder, program, title,
    /// proposal_number). Persisted verbatim as a JSON blob.
    #[serde(default = "empty_attributes")]
    pub attributes: serde_json::Value,
}

fn empty_attributes() -> serde_json::Value {
    serde_json::Value::Object(Default::default())
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    documents: Vec<CatalogEntry>,
}

/// Immutable, ordered set of catalog entries.
#[derive(Debug, Clone)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    /// Load and validate a catalog file. Fails on unreadable/unparsable
    /// input or duplicate `document_id` values.
    pub fn load(path: &Path) -> Result<Catalog> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog file: {}", path.display()))?;

        let file: CatalogFile =
            toml::from_str(&content).with_context(|| "Failed to parse catalog file")?;

        let mut seen = HashSet::new();
        for entry in &file.documents {
            if !seen.insert(entry.document_id.as_str()) {
                anyhow::bail!("duplicate document_id in catalog: {}", entry.document_id);
            }
        }

        Ok(Catalog {
            entries: file.documents,
        })
    }

    /// Entries in file order.
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }
}
