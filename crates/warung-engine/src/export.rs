//! # Export Engine
//!
//! Assembles invoice and inventory data into CSV exports.
//!
//! The engine owns data gathering (date window, status filter, item
//! hydration) and delegates rendering to warung-core. Callers own file
//! I/O; everything here returns strings.

use chrono::{DateTime, Utc};
use tracing::info;

use crate::error::EngineResult;
use warung_core::export::{
    render_import_template, render_inventory_csv, render_invoices_csv, summarize, ExportSummary,
};
use warung_core::{InvoiceStatus, InvoiceWithItems};
use warung_db::Database;

// =============================================================================
// Preview
// =============================================================================

/// The gathered data and its summary, shown before the actual export.
#[derive(Debug)]
pub struct ExportPreview {
    pub invoices: Vec<InvoiceWithItems>,
    pub summary: ExportSummary,
}

// =============================================================================
// Export Engine
// =============================================================================

/// Builds CSV exports from persisted data.
#[derive(Debug, Clone)]
pub struct ExportEngine {
    db: Database,
}

impl ExportEngine {
    /// Creates a new export engine.
    pub fn new(db: Database) -> Self {
        ExportEngine { db }
    }

    /// Gathers invoices in the window (inclusive), hydrated with their
    /// line items, plus summary counters.
    pub async fn preview(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        status: Option<InvoiceStatus>,
    ) -> EngineResult<ExportPreview> {
        let repo = self.db.invoices();
        let invoices = repo.list_by_date_range(start, end, status).await?;

        let mut hydrated = Vec::with_capacity(invoices.len());
        for invoice in invoices {
            let items = repo.items_for(&invoice.id).await?;
            hydrated.push(InvoiceWithItems { invoice, items });
        }

        let summary = summarize(&hydrated);

        info!(
            invoices = summary.invoice_count,
            total = summary.total_amount,
            "Export preview gathered"
        );

        Ok(ExportPreview {
            invoices: hydrated,
            summary,
        })
    }

    /// Renders the invoice export for a window as a CSV string.
    ///
    /// With `include_items`, each invoice's line items follow in a second
    /// section separated by the detail marker row.
    pub async fn export_invoices_csv(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        status: Option<InvoiceStatus>,
        include_items: bool,
    ) -> EngineResult<String> {
        let preview = self.preview(start, end, status).await?;
        Ok(render_invoices_csv(&preview.invoices, include_items)?)
    }

    /// Renders the full inventory as a CSV string, in the same column
    /// layout the bulk import accepts.
    pub async fn export_inventory_csv(&self) -> EngineResult<String> {
        let products = self.db.products().list_all().await?;
        info!(products = products.len(), "Exporting inventory");
        Ok(render_inventory_csv(&products)?)
    }

    /// Returns the blank import template (header + example rows).
    pub fn import_template(&self) -> EngineResult<String> {
        Ok(render_import_template()?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use uuid::Uuid;
    use warung_core::export::DETAIL_ITEMS_MARKER;
    use warung_core::{Customer, Invoice, InvoiceItem, Product};
    use warung_db::DbConfig;

    async fn test_db() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.customers()
            .insert(&Customer {
                id: "c1".to_string(),
                name: "Bu Sari".to_string(),
                phone: String::new(),
                email: String::new(),
                address: String::new(),
                photo_path: None,
                created_at: Utc::now(),
            })
            .await
            .unwrap();
        db
    }

    async fn seed_invoice(db: &Database, number: &str, total: i64, with_item: bool) -> String {
        let id = Uuid::new_v4().to_string();
        let invoice = Invoice {
            id: id.clone(),
            invoice_number: number.to_string(),
            customer_id: "c1".to_string(),
            customer_name: String::new(),
            total_amount: total,
            date: Utc::now(),
            status: InvoiceStatus::Pending,
            notes: String::new(),
        };

        let items = if with_item {
            db.products()
                .insert(&Product {
                    id: format!("p-{}", number),
                    name: "Kopi".to_string(),
                    sku: String::new(),
                    price: total,
                    stock: 10,
                    min_stock: 5,
                    category: String::new(),
                    description: String::new(),
                    created_at: Utc::now(),
                })
                .await
                .unwrap();
            vec![InvoiceItem {
                id: Uuid::new_v4().to_string(),
                invoice_id: id.clone(),
                product_id: format!("p-{}", number),
                product_name: "Kopi".to_string(),
                quantity: 1,
                unit_price: total,
                subtotal: total,
            }]
        } else {
            Vec::new()
        };

        db.invoices().create_with_items(&invoice, &items).await.unwrap();
        id
    }

    fn window() -> (DateTime<Utc>, DateTime<Utc>) {
        let now = Utc::now();
        (now - Duration::hours(1), now + Duration::hours(1))
    }

    #[tokio::test]
    async fn test_preview_summary() {
        let db = test_db().await;
        seed_invoice(&db, "INV-20260113-001", 10_000, true).await;
        seed_invoice(&db, "INV-20260113-002", 5_000, false).await;

        let engine = ExportEngine::new(db);
        let (start, end) = window();
        let preview = engine.preview(start, end, None).await.unwrap();

        assert_eq!(preview.summary.invoice_count, 2);
        assert_eq!(preview.summary.total_amount, 15_000);
        assert_eq!(preview.summary.pending_count, 2);
        assert_eq!(preview.invoices[0].items.len(), 1);
    }

    #[tokio::test]
    async fn test_invoice_csv_with_items_has_detail_section() {
        let db = test_db().await;
        seed_invoice(&db, "INV-20260113-001", 10_000, true).await;

        let engine = ExportEngine::new(db);
        let (start, end) = window();

        let csv = engine
            .export_invoices_csv(start, end, None, true)
            .await
            .unwrap();
        assert!(csv.contains("INV-20260113-001"));
        assert!(csv.contains(DETAIL_ITEMS_MARKER));

        let csv_flat = engine
            .export_invoices_csv(start, end, None, false)
            .await
            .unwrap();
        assert!(!csv_flat.contains(DETAIL_ITEMS_MARKER));
    }

    #[tokio::test]
    async fn test_status_filter_applies() {
        let db = test_db().await;
        let paid = seed_invoice(&db, "INV-20260113-001", 10_000, false).await;
        seed_invoice(&db, "INV-20260113-002", 5_000, false).await;
        db.invoices().update_status(&paid, InvoiceStatus::Paid).await.unwrap();

        let engine = ExportEngine::new(db);
        let (start, end) = window();
        let preview = engine
            .preview(start, end, Some(InvoiceStatus::Paid))
            .await
            .unwrap();

        assert_eq!(preview.summary.invoice_count, 1);
        assert_eq!(preview.summary.paid_count, 1);
    }

    #[tokio::test]
    async fn test_inventory_export_and_template() {
        let db = test_db().await;
        db.products()
            .insert(&Product {
                id: "p1".to_string(),
                name: "Kopi".to_string(),
                sku: "KOP-01".to_string(),
                price: 1_500,
                stock: 100,
                min_stock: 10,
                category: "Minuman".to_string(),
                description: String::new(),
                created_at: Utc::now(),
            })
            .await
            .unwrap();

        let engine = ExportEngine::new(db);
        let csv = engine.export_inventory_csv().await.unwrap();
        assert!(csv.starts_with("Name,"));
        assert!(csv.contains("Kopi,KOP-01,1500,100,10,Minuman,"));

        let template = engine.import_template().unwrap();
        assert!(template.starts_with("Name,"));
    }
}
