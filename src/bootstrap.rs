//! Startup reconciliation sequence.
//!
//! Fire-and-forget initialization run once at process start: ensure the
//! schema exists, check status, seed if incomplete, verify backing files.
//! Every step's failure is caught and logged; a seeding failure does not
//! stop verification, and nothing here propagates to the caller.

use std::sync::Arc;
use tracing::{error, info, warn};

use crate::catalog::Catalog;
use crate::config::Config;
use crate::db;
use crate::migrate;
use crate::reconcile::Reconciler;
use crate::store::FsContentStore;
use crate::verify::Verifier;

pub async fn run_bootstrap(config: &Config) {
    info!("initializing database seeding");

    let catalog = match Catalog::load(&config.catalog.path) {
        Ok(catalog) => catalog,
        Err(e) => {
            error!("failed to load catalog: {:#}", e);
            return;
        }
    };

    let store = Arc::new(FsContentStore::new(config.content_store.root.clone()));

    // Step 1: ensure storage is initialized.
    if let Err(e) = migrate::run_migrations(config).await {
        error!("schema initialization failed: {:#}", e);
    }

    // Steps 2-3: status, then seed if incomplete.
    match db::connect(config).await {
        Ok(pool) => {
            let reconciler = Reconciler::new(pool, catalog.clone(), store.clone());

            let status = reconciler.status().await;
            if let Some(ref err) = status.error {
                error!("seeding status check failed: {}", err);
            } else {
                info!(
                    "seeding status: {}/{} documents",
                    status.persisted_count, status.expected_count
                );
            }

            if !status.is_complete {
                let outcome = reconciler.reconcile(false).await;
                if outcome.success {
                    info!("database seeding completed: {}", outcome.message);
                    for err in &outcome.errors {
                        warn!("{}", err);
                    }
                } else {
                    error!("database seeding failed: {}", outcome.message);
                }
            } else {
                info!("database seeding already complete");
            }
        }
        Err(e) => {
            error!("metadata store unavailable: {:#}", e);
        }
    }

    // Step 4: verify backing files regardless of seeding outcome.
    let verifier = Verifier::new(catalog, store);
    let report = verifier.verify().await;
    if report.complete {
        info!(
            "file verification complete: {} files found",
            report.existing_count
        );
    } else {
        warn!(
            "file verification incomplete: {} files missing",
            report.missing_count
        );
        if let Some(ref err) = report.error {
            error!("file verification error: {}", err);
        }
    }
}
