//! # docseed
//!
//! Seed reconciliation for the proposal archive's document metadata store.
//!
//! A fixed catalog of expected documents is declared in a TOML data file.
//! docseed makes the SQLite `document_metadata` table match that catalog
//! (inserting missing rows, optionally overwriting existing ones) and
//! cross-checks that each entry's backing file is present in the content
//! store. The whole routine is idempotent: running it against an
//! already-complete store performs zero writes.
//!
//! ## Flow
//!
//! ```text
//! ┌─────────┐    ┌────────────┐    ┌──────────────────┐
//! │ Catalog │───▶│ Reconciler │───▶│ document_metadata │
//! │ (TOML)  │    │            │    │     (SQLite)      │
//! └────┬────┘    └────────────┘    └──────────────────┘
//!      │         ┌──────────┐     ┌───────────────┐
//!      └────────▶│ Verifier │────▶│ content store │
//!                └──────────┘     │ (filesystem)  │
//!                                 └───────────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`catalog`] | Static catalog of expected documents |
//! | [`models`] | Structured operation results |
//! | [`store`] | Content store abstraction |
//! | [`reconcile`] | Status + catalog-to-store reconciliation |
//! | [`verify`] | Backing-file verification |
//! | [`list`] | Seeded-document projection |
//! | [`bootstrap`] | Startup sequence (catch-log-continue) |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema creation |

pub mod bootstrap;
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod list;
pub mod migrate;
pub mod models;
pub mod reconcile;
pub mod store;
pub mod verify;
