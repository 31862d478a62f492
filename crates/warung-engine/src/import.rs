//! # Bulk Import Reconciler
//!
//! Two-phase CSV import: preview, then commit.
//!
//! ## Phases
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Two-Phase Import                                  │
//! │                                                                         │
//! │  Phase 1: preview(reader)                                               │
//! │    parse rows ──► collect SKUs ──► one batch lookup ──► classify        │
//! │       │                                                    │            │
//! │       ▼                                                    ▼            │
//! │    row errors                              ImportPlan { new_products,   │
//! │    (bad rows never abort the file)           duplicates, row_errors }   │
//! │                                                                         │
//! │  ── operator reviews the plan, decides on duplicate stock merge ──      │
//! │                                                                         │
//! │  Phase 2: commit(plan, update_duplicate_stock, control)                 │
//! │    insert each new product independently                                │
//! │    increase_stock per duplicate (only when confirmed)                   │
//! │    cancellation stops new rows; committed rows stay committed           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Duplicate detection is by SKU. Rows without a SKU are always new
//! products. Two rows in the same file sharing a SKU that is not yet in
//! inventory are both classified as new; the second insert then fails on
//! the SKU unique constraint and lands in the outcome errors.

use chrono::Utc;
use std::io::Read;
use tracing::{info, warn};
use uuid::Uuid;

use crate::batch::{BatchControl, BatchProgress};
use crate::error::EngineResult;
use warung_core::import::{classify, parse_rows};
use warung_core::validation::{validate_draft, validate_stock_delta};
use warung_core::{DuplicateProduct, ProductDraft, RowError};
use warung_db::Database;

// =============================================================================
// Plan & Outcome
// =============================================================================

/// What a preview proposes to do, pending operator confirmation.
#[derive(Debug, Default)]
pub struct ImportPlan {
    /// Drafts that will be inserted as new products.
    pub new_products: Vec<ProductDraft>,
    /// Drafts whose SKU matched existing inventory, with the stock delta
    /// each proposes to add.
    pub duplicates: Vec<DuplicateProduct>,
    /// Rows rejected during parsing, with their source line numbers.
    pub row_errors: Vec<RowError>,
}

impl ImportPlan {
    /// Whether committing this plan would change anything.
    pub fn is_empty(&self) -> bool {
        self.new_products.is_empty() && self.duplicates.is_empty()
    }
}

/// What a commit actually did.
#[derive(Debug, Default, serde::Serialize)]
pub struct ImportOutcome {
    /// New products inserted.
    pub inserted: usize,
    /// Existing products whose stock was increased.
    pub stock_updated: usize,
    /// One entry per failed row: (product name, reason).
    pub errors: Vec<(String, String)>,
}

// =============================================================================
// Reconciler
// =============================================================================

/// Runs the two-phase bulk import.
#[derive(Debug, Clone)]
pub struct BulkImportReconciler {
    db: Database,
}

impl BulkImportReconciler {
    /// Creates a new reconciler.
    pub fn new(db: Database) -> Self {
        BulkImportReconciler { db }
    }

    /// Phase 1: parses the file and classifies every row against current
    /// inventory. Nothing is written.
    pub async fn preview<R: Read>(&self, reader: R) -> EngineResult<ImportPlan> {
        let outcome = parse_rows(reader);

        let skus: Vec<String> = outcome
            .drafts
            .iter()
            .filter(|d| d.has_sku())
            .map(|d| d.sku.clone())
            .collect();

        let existing = self.db.products().get_by_skus(&skus).await?;
        let classification = classify(outcome.drafts, &existing);

        info!(
            new = classification.new_products.len(),
            duplicates = classification.duplicates.len(),
            rejected = outcome.errors.len(),
            "Import preview built"
        );

        Ok(ImportPlan {
            new_products: classification.new_products,
            duplicates: classification.duplicates,
            row_errors: outcome.errors,
        })
    }

    /// Phase 2: applies a previewed plan.
    ///
    /// Each new product is validated and inserted independently; a failed
    /// row is recorded and the rest continue. Duplicate stock merges run
    /// only when `update_duplicate_stock` is true.
    pub async fn commit(
        &self,
        plan: ImportPlan,
        update_duplicate_stock: bool,
        control: &BatchControl,
    ) -> EngineResult<ImportOutcome> {
        info!(
            new = plan.new_products.len(),
            duplicates = plan.duplicates.len(),
            merge_stock = update_duplicate_stock,
            "Committing import plan"
        );

        let mut outcome = ImportOutcome::default();
        let mut progress = BatchProgress::default();
        let products = self.db.products();

        for draft in plan.new_products {
            if control.is_cancelled() {
                warn!(processed = progress.processed, "Import cancelled");
                return Ok(outcome);
            }

            let name = draft.name.clone();
            let result = async {
                validate_draft(&draft)?;
                let product = draft.into_product(Uuid::new_v4().to_string(), Utc::now());
                products.insert(&product).await?;
                EngineResult::Ok(())
            }
            .await;

            match result {
                Ok(()) => {
                    outcome.inserted += 1;
                    progress.record_success();
                }
                Err(err) => {
                    outcome.errors.push((name, err.to_string()));
                    progress.record_failure();
                }
            }

            control.report(progress);
        }

        if update_duplicate_stock {
            for duplicate in plan.duplicates {
                if control.is_cancelled() {
                    warn!(processed = progress.processed, "Import cancelled");
                    return Ok(outcome);
                }

                let result = async {
                    validate_stock_delta(duplicate.add_stock)?;
                    products
                        .increase_stock(&duplicate.existing.id, duplicate.add_stock)
                        .await?;
                    EngineResult::Ok(())
                }
                .await;

                match result {
                    Ok(()) => {
                        outcome.stock_updated += 1;
                        progress.record_success();
                    }
                    Err(err) => {
                        outcome
                            .errors
                            .push((duplicate.existing.name.clone(), err.to_string()));
                        progress.record_failure();
                    }
                }

                control.report(progress);
            }
        }

        info!(
            inserted = outcome.inserted,
            stock_updated = outcome.stock_updated,
            failed = outcome.errors.len(),
            "Import committed"
        );

        Ok(outcome)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::watch;
    use warung_core::Product;
    use warung_db::DbConfig;

    const CSV: &str = "\
Name,SKU,Price,Stock,MinStock,Category,Description
Kopi Sachet,KOP-01,1500,100,10,Minuman,
Gula 1kg,GUL-01,15000,20,5,Sembako,
Teh Celup,TEH-01,8000,30,5,Minuman,
";

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn seed_existing(db: &Database, sku: &str, stock: i64) -> Product {
        let product = Product {
            id: Uuid::new_v4().to_string(),
            name: format!("Existing {}", sku),
            sku: sku.to_string(),
            price: 1_000,
            stock,
            min_stock: 5,
            category: String::new(),
            description: String::new(),
            created_at: Utc::now(),
        };
        db.products().insert(&product).await.unwrap();
        product
    }

    #[tokio::test]
    async fn test_preview_splits_new_and_duplicate() {
        let db = test_db().await;
        seed_existing(&db, "KOP-01", 40).await;

        let reconciler = BulkImportReconciler::new(db);
        let plan = reconciler.preview(CSV.as_bytes()).await.unwrap();

        assert_eq!(plan.new_products.len(), 2);
        assert_eq!(plan.duplicates.len(), 1);
        assert_eq!(plan.duplicates[0].import_draft.sku, "KOP-01");
        assert_eq!(plan.duplicates[0].add_stock, 100);
        assert!(plan.row_errors.is_empty());
    }

    #[tokio::test]
    async fn test_commit_inserts_and_merges_stock() {
        let db = test_db().await;
        let existing = seed_existing(&db, "KOP-01", 40).await;

        let reconciler = BulkImportReconciler::new(db.clone());
        let plan = reconciler.preview(CSV.as_bytes()).await.unwrap();
        let outcome = reconciler
            .commit(plan, true, &BatchControl::default())
            .await
            .unwrap();

        assert_eq!(outcome.inserted, 2);
        assert_eq!(outcome.stock_updated, 1);
        assert!(outcome.errors.is_empty());

        let merged = db.products().get_by_id(&existing.id).await.unwrap().unwrap();
        assert_eq!(merged.stock, 140);

        let gula = db.products().get_by_sku("GUL-01").await.unwrap().unwrap();
        assert_eq!(gula.price, 15_000);
    }

    #[tokio::test]
    async fn test_commit_without_merge_leaves_stock() {
        let db = test_db().await;
        let existing = seed_existing(&db, "KOP-01", 40).await;

        let reconciler = BulkImportReconciler::new(db.clone());
        let plan = reconciler.preview(CSV.as_bytes()).await.unwrap();
        let outcome = reconciler
            .commit(plan, false, &BatchControl::default())
            .await
            .unwrap();

        assert_eq!(outcome.inserted, 2);
        assert_eq!(outcome.stock_updated, 0);

        let untouched = db.products().get_by_id(&existing.id).await.unwrap().unwrap();
        assert_eq!(untouched.stock, 40);
    }

    #[tokio::test]
    async fn test_repeated_sku_in_file_fails_second_insert() {
        // Neither row exists yet, so both classify as new; the second
        // insert trips the SKU unique constraint and is recorded.
        let csv = "\
Name,SKU,Price,Stock,MinStock
Kopi A,KOP-01,1500,10,5
Kopi B,KOP-01,1600,10,5
";
        let db = test_db().await;
        let reconciler = BulkImportReconciler::new(db.clone());

        let plan = reconciler.preview(csv.as_bytes()).await.unwrap();
        assert_eq!(plan.new_products.len(), 2);

        let outcome = reconciler
            .commit(plan, true, &BatchControl::default())
            .await
            .unwrap();
        assert_eq!(outcome.inserted, 1);
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].0, "Kopi B");
    }

    #[tokio::test]
    async fn test_bad_rows_collected_not_fatal() {
        let csv = "\
Name,SKU,Price,Stock
Kopi,,1500,10
,,2000,5
Gula,,abc,5
Teh,,8000,30
";
        let db = test_db().await;
        let reconciler = BulkImportReconciler::new(db);

        let plan = reconciler.preview(csv.as_bytes()).await.unwrap();
        assert_eq!(plan.new_products.len(), 2);
        assert_eq!(plan.row_errors.len(), 2);
    }

    #[tokio::test]
    async fn test_cancellation_keeps_committed_rows() {
        let db = test_db().await;
        let reconciler = BulkImportReconciler::new(db.clone());
        let plan = reconciler.preview(CSV.as_bytes()).await.unwrap();

        let (tx, rx) = watch::channel(true);
        let control = BatchControl::default().with_cancel(rx);
        drop(tx);

        let outcome = reconciler.commit(plan, true, &control).await.unwrap();
        assert_eq!(outcome.inserted, 0);
        assert_eq!(db.products().count().await.unwrap(), 0);
    }
}
