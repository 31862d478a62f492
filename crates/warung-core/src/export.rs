//! # Export Aggregation & CSV Rendering
//!
//! Pure export logic: summary statistics for the export preview, and CSV
//! rendering for the inventory and transaction formats. Date-range and
//! status filtering happen in the storage query layer before any of this
//! runs; file I/O belongs to the caller.
//!
//! ## CSV Formats
//! ```text
//! Inventory (same header as the import template):
//!   Name,SKU,Price,Stock,MinStock,Category,Description
//!
//! Transactions:
//!   No Invoice,Tanggal,Customer,Total,Status,Notes
//!   ... one row per invoice ...
//!   <blank row>
//!   === DETAIL ITEMS ===
//!   No Invoice,Nama Produk,Qty,Harga Satuan,Subtotal
//!   ... one row per line item across all exported invoices ...
//! ```

use crate::error::CoreResult;
use crate::types::{InvoiceStatus, InvoiceWithItems, Product};

/// Header shared by the inventory export and the import template.
pub const INVENTORY_HEADER: [&str; 7] = [
    "Name",
    "SKU",
    "Price",
    "Stock",
    "MinStock",
    "Category",
    "Description",
];

/// Header of the invoice section of a transaction export.
pub const INVOICE_HEADER: [&str; 6] = ["No Invoice", "Tanggal", "Customer", "Total", "Status", "Notes"];

/// Header of the line-item section of a transaction export.
pub const INVOICE_ITEMS_HEADER: [&str; 5] =
    ["No Invoice", "Nama Produk", "Qty", "Harga Satuan", "Subtotal"];

/// Marker row separating invoices from their line items.
pub const DETAIL_ITEMS_MARKER: &str = "=== DETAIL ITEMS ===";

// =============================================================================
// Export Summary
// =============================================================================

/// Summary statistics shown before materializing a CSV.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportSummary {
    pub invoice_count: usize,
    /// Sum of invoice totals, in whole rupiah.
    pub total_amount: i64,
    /// Number of line items across all invoices.
    pub total_items: usize,
    pub paid_count: usize,
    pub pending_count: usize,
    pub cancelled_count: usize,
}

/// Computes summary statistics over an already-filtered invoice set.
/// Pure aggregation: no side effects, no state.
pub fn summarize(invoices: &[InvoiceWithItems]) -> ExportSummary {
    let mut summary = ExportSummary {
        invoice_count: invoices.len(),
        ..ExportSummary::default()
    };

    for entry in invoices {
        summary.total_amount += entry.invoice.total_amount;
        summary.total_items += entry.items.len();
        match entry.invoice.status {
            InvoiceStatus::Paid => summary.paid_count += 1,
            InvoiceStatus::Pending => summary.pending_count += 1,
            InvoiceStatus::Cancelled => summary.cancelled_count += 1,
        }
    }

    summary
}

// =============================================================================
// CSV Rendering
// =============================================================================

/// Renders the inventory export: the 7-column header followed by one row
/// per product. The header matches the import template exactly, so an
/// export can be re-imported as-is.
pub fn render_inventory_csv(products: &[Product]) -> CoreResult<String> {
    let mut writer = section_writer();

    writer.write_record(&INVENTORY_HEADER)?;
    for product in products {
        writer.write_record(&[
            product.name.as_str(),
            product.sku.as_str(),
            &product.price.to_string(),
            &product.stock.to_string(),
            &product.min_stock.to_string(),
            product.category.as_str(),
            product.description.as_str(),
        ])?;
    }

    finish(writer)
}

/// Renders the transaction export.
///
/// When `include_items` is set and any invoice has line items, the invoice
/// rows are followed by a blank row, the `=== DETAIL ITEMS ===` marker, the
/// item header, and one row per line item across all invoices.
pub fn render_invoices_csv(invoices: &[InvoiceWithItems], include_items: bool) -> CoreResult<String> {
    let mut writer = section_writer();

    writer.write_record(&INVOICE_HEADER)?;
    for entry in invoices {
        let inv = &entry.invoice;
        writer.write_record(&[
            inv.invoice_number.as_str(),
            &inv.date.format("%d/%m/%Y %H:%M").to_string(),
            inv.customer_name.as_str(),
            &inv.total_amount.to_string(),
            inv.status.export_label(),
            inv.notes.as_str(),
        ])?;
    }

    if include_items && invoices.iter().any(|e| !e.items.is_empty()) {
        writer.write_record(&[""])?;
        writer.write_record(&[DETAIL_ITEMS_MARKER])?;
        writer.write_record(&INVOICE_ITEMS_HEADER)?;

        for entry in invoices {
            for item in &entry.items {
                writer.write_record(&[
                    entry.invoice.invoice_number.as_str(),
                    item.product_name.as_str(),
                    &item.quantity.to_string(),
                    &item.unit_price.to_string(),
                    &item.subtotal.to_string(),
                ])?;
            }
        }
    }

    finish(writer)
}

/// Renders the import template: header plus a few example rows that show
/// which columns are optional.
pub fn render_import_template() -> CoreResult<String> {
    let mut writer = section_writer();

    writer.write_record(&INVENTORY_HEADER)?;
    writer.write_record(&[
        "Contoh Produk 1",
        "SKU001",
        "50000",
        "100",
        "10",
        "Elektronik",
        "Deskripsi produk pertama",
    ])?;
    writer.write_record(&[
        "Contoh Produk 2",
        "SKU002",
        "75000",
        "50",
        "5",
        "Makanan",
        "Deskripsi produk kedua",
    ])?;
    writer.write_record(&["Contoh Produk 3", "", "25000", "200", "", "", ""])?;

    finish(writer)
}

/// The transaction format mixes record widths (6-field invoice rows, a
/// 1-field marker, 5-field item rows), so the writer must be flexible.
fn section_writer() -> csv::Writer<Vec<u8>> {
    csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new())
}

fn finish(mut writer: csv::Writer<Vec<u8>>) -> CoreResult<String> {
    writer.flush().map_err(csv::Error::from)?;
    let bytes = writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

// =============================================================================
// Unit Tests
// =============================================================================
