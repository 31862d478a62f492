//! # Invoice Number Sequencing
//!
//! Generates invoice numbers in format: `INV-YYYYMMDD-NNN`
//! Example: `INV-20260113-001`, `INV-20260113-002`
//!
//! ## How Sequencing Works
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   Invoice Number Generation                             │
//! │                                                                         │
//! │  Checkout starts                                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  date_prefix(today) ──► "20260113"                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Storage: last invoice_number LIKE 'INV-20260113-%'                     │
//! │       │                                                                 │
//! │       ├── None            ──► sequence = 1                              │
//! │       └── INV-20260113-007 ──► sequence = 8                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  next_number() ──► "INV-20260113-008"                                   │
//! │                                                                         │
//! │  The lookup and the insert are two separate storage calls, so two       │
//! │  concurrent checkouts can generate the same number. The UNIQUE          │
//! │  constraint on invoice_number catches the collision and the checkout    │
//! │  engine re-reads and regenerates, up to a bounded retry count.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Sequence width
//! The daily sequence has no 999 ceiling. Formatting pads to 3 digits and
//! widens naturally (`INV-20260113-1000`). The sequence is recovered from
//! the segment after the final `-`, so numbers past 999 keep counting up
//! instead of wrapping back to 001.

use chrono::NaiveDate;

/// Prefix every invoice number starts with.
pub const INVOICE_PREFIX: &str = "INV";

/// Formats the date component of an invoice number: `YYYYMMDD`.
pub fn date_prefix(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

/// Derives the next invoice number for a day.
///
/// ## Arguments
/// * `date_prefix` - today's `YYYYMMDD` string
/// * `last_number_for_prefix` - the highest invoice number already issued
///   with this prefix, or `None` when today has no invoices yet
///
/// ## Behavior
/// - No prior invoice: sequence starts at 1
/// - Otherwise: trailing sequence of the last number + 1
/// - A malformed trailing segment counts as 0, so the next number is 001
pub fn next_number(date_prefix: &str, last_number_for_prefix: Option<&str>) -> String {
    let sequence = match last_number_for_prefix {
        Some(last) => trailing_sequence(last) + 1,
        None => 1,
    };

    format!("{}-{}-{:03}", INVOICE_PREFIX, date_prefix, sequence)
}

/// Extracts the numeric sequence from an invoice number.
///
/// Takes the segment after the final `-` rather than the last 3 characters,
/// so sequences that have widened past 999 are read back in full.
fn trailing_sequence(invoice_number: &str) -> u64 {
    invoice_number
        .rsplit('-')
        .next()
        .and_then(|seg| seg.parse::<u64>().ok())
        .unwrap_or(0)
}

// =============================================================================
// Unit Tests
// =============================================================================
