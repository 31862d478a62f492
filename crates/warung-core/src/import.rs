//! # Bulk Import Parsing & Reconciliation
//!
//! The pure half of the bulk import pipeline: turning raw CSV rows into
//! [`ProductDraft`]s and classifying drafts against existing inventory.
//!
//! ## Import Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Bulk Import Pipeline                              │
//! │                                                                         │
//! │  CSV bytes                                                              │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  parse_rows()  ──────► drafts + per-row errors (never aborts)           │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  storage: get_by_skus(non-blank SKUs)      (warung-db, one batch query) │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  classify()   ──────► new drafts │ duplicates (existing SKU + delta)    │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  caller confirms ───► insert new / merge duplicate stock (warung-engine)│
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Row format (7 columns, header row skipped)
//! `Name, SKU, Price, Stock, MinStock, Category, Description`
//! Name, Price and Stock are mandatory; MinStock defaults to 5 when blank.
//! Thousand separators are stripped before numeric parsing.

use std::io::Read;

use crate::error::{RowError, ValidationError};
use crate::types::{DuplicateProduct, Product, ProductDraft};
use crate::{DEFAULT_MIN_STOCK, IMPORT_MIN_COLUMNS};

// =============================================================================
// Parse Outcome
// =============================================================================

/// Result of parsing an entire import file.
///
/// Parsing is best-effort per row: a bad row lands in `errors` and the rest
/// of the file is still processed.
#[derive(Debug, Default)]
pub struct ParseOutcome {
    /// Successfully parsed rows, in file order.
    pub drafts: Vec<ProductDraft>,
    /// One entry per rejected row, with its 1-based source line.
    pub errors: Vec<RowError>,
}

// =============================================================================
// Classification
// =============================================================================

/// The new/duplicate split presented to the caller before committing.
#[derive(Debug, Default)]
pub struct Classification {
    /// Drafts whose SKU (or lack of one) does not collide with inventory.
    pub new_products: Vec<ProductDraft>,
    /// Drafts whose SKU matches an existing product, paired with it.
    pub duplicates: Vec<DuplicateProduct>,
}

// =============================================================================
// Row Parsing
// =============================================================================

/// Parses all data rows of an import file.
///
/// The header row is skipped. Rows whose fields are all blank are ignored.
/// Each remaining row is parsed independently; failures are collected as
/// [`RowError`]s and never abort the rest of the file.
pub fn parse_rows<R: Read>(reader: R) -> ParseOutcome {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true) // column count is validated per row below
        .from_reader(reader);

    let mut outcome = ParseOutcome::default();

    // Header is line 1; first data row is line 2
    let mut line = 1usize;
    for record in csv_reader.records() {
        line += 1;
        match record {
            Ok(record) => {
                let line = record
                    .position()
                    .map(|p| p.line() as usize)
                    .unwrap_or(line);
                let fields: Vec<&str> = record.iter().collect();

                if fields.iter().all(|f| f.trim().is_empty()) {
                    continue;
                }

                match parse_row(&fields) {
                    Ok(draft) => outcome.drafts.push(draft),
                    Err(e) => outcome.errors.push(RowError::new(line, e.to_string())),
                }
            }
            Err(e) => outcome.errors.push(RowError::new(line, e.to_string())),
        }
    }

    outcome
}

/// Parses a single row of string fields into a product draft.
///
/// ## Rules
/// - At least 4 columns (Name, SKU, Price, Stock)
/// - Name, Price and Stock must be non-blank
/// - MinStock defaults to [`DEFAULT_MIN_STOCK`] when blank
/// - Numeric fields reject anything that doesn't parse, naming the column
///   and the raw value
pub fn parse_row(fields: &[&str]) -> Result<ProductDraft, ValidationError> {
    if fields.len() < IMPORT_MIN_COLUMNS {
        return Err(ValidationError::Required {
            field: format!("at least {} columns (Name, SKU, Price, Stock)", IMPORT_MIN_COLUMNS),
        });
    }

    let get = |idx: usize| fields.get(idx).map(|f| f.trim()).unwrap_or("");

    let name = get(0);
    let sku = get(1);
    let price_raw = get(2);
    let stock_raw = get(3);
    let min_stock_raw = get(4);
    let category = get(5);
    let description = get(6);

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "Name".to_string(),
        });
    }
    if price_raw.is_empty() {
        return Err(ValidationError::Required {
            field: "Price".to_string(),
        });
    }
    if stock_raw.is_empty() {
        return Err(ValidationError::Required {
            field: "Stock".to_string(),
        });
    }

    let price = parse_amount("Price", price_raw)?;
    let stock = parse_count("Stock", stock_raw)?;
    let min_stock = if min_stock_raw.is_empty() {
        DEFAULT_MIN_STOCK
    } else {
        parse_count("MinStock", min_stock_raw)?
    };

    if price < 0 {
        return Err(ValidationError::MustBeNonNegative {
            field: "Price".to_string(),
        });
    }
    if stock < 0 {
        return Err(ValidationError::MustBeNonNegative {
            field: "Stock".to_string(),
        });
    }
    if min_stock < 0 {
        return Err(ValidationError::MustBeNonNegative {
            field: "MinStock".to_string(),
        });
    }

    Ok(ProductDraft {
        name: name.to_string(),
        sku: sku.to_string(),
        price,
        stock,
        min_stock,
        category: category.to_string(),
        description: description.to_string(),
    })
}

/// Parses a rupiah amount, stripping thousand separators first.
/// Both `.` and `,` are treated as separators ("50.000" == "50,000" == 50000).
fn parse_amount(field: &str, raw: &str) -> Result<i64, ValidationError> {
    let cleaned: String = raw.chars().filter(|c| *c != '.' && *c != ',').collect();
    cleaned.parse::<i64>().map_err(|_| ValidationError::InvalidNumber {
        field: field.to_string(),
        value: raw.to_string(),
    })
}

/// Parses a quantity-like column, tolerating comma thousand separators.
fn parse_count(field: &str, raw: &str) -> Result<i64, ValidationError> {
    let cleaned: String = raw.chars().filter(|c| *c != ',').collect();
    cleaned.parse::<i64>().map_err(|_| ValidationError::InvalidNumber {
        field: field.to_string(),
        value: raw.to_string(),
    })
}

// =============================================================================
// Classification
// =============================================================================

/// Splits parsed drafts into "new" and "duplicate of existing SKU".
///
/// ## Rules
/// - A draft with a non-blank SKU matching an existing product becomes a
///   [`DuplicateProduct`] carrying the draft's stock as the proposed delta
/// - Everything else (blank SKU, or unknown SKU) is a new product
/// - The batch is NOT deduped internally: a second row with the same SKU is
///   classified against the stored record exactly like the first, so two
///   rows for SKU "A" produce two duplicate entries against the same
///   existing product
pub fn classify(drafts: Vec<ProductDraft>, existing: &[Product]) -> Classification {
    let mut result = Classification::default();

    for draft in drafts {
        let matched = if draft.has_sku() {
            existing.iter().find(|p| p.sku == draft.sku)
        } else {
            None
        };

        match matched {
            Some(existing_product) => {
                let add_stock = draft.stock;
                result.duplicates.push(DuplicateProduct {
                    import_draft: draft,
                    existing: existing_product.clone(),
                    add_stock,
                });
            }
            None => result.new_products.push(draft),
        }
    }

    result
}

// =============================================================================
// Unit Tests
// =============================================================================
