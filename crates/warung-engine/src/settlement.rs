//! # Settlement Engine
//!
//! Marks pending invoices as paid, one at a time or in bulk.
//!
//! ## Status Rules
//! ```text
//! Pending   ──settle──► Paid      (the normal case)
//! Paid      ──settle──► Paid      (idempotent no-op)
//! Cancelled ──settle──► rejected  (a voided sale cannot become revenue)
//! ```
//!
//! Bulk settlement is best-effort per invoice: each id succeeds or fails
//! independently, failures are recorded with their reason, and one bad id
//! never blocks the rest of the batch.

use tracing::{debug, info, warn};

use crate::batch::{BatchControl, BatchProgress};
use crate::error::{EngineError, EngineResult};
use warung_core::{Invoice, InvoiceStatus};
use warung_db::{Database, DbError};

// =============================================================================
// Batch Outcome
// =============================================================================

/// Result of a bulk settlement run.
#[derive(Debug, Default, serde::Serialize)]
pub struct BatchOutcome {
    /// Invoices transitioned to Paid (idempotent no-ops included).
    pub success_count: usize,
    /// One entry per failed invoice: (invoice id, reason).
    pub errors: Vec<(String, String)>,
}

// =============================================================================
// Settlement Engine
// =============================================================================

/// Settles invoices.
#[derive(Debug, Clone)]
pub struct SettlementEngine {
    db: Database,
}

impl SettlementEngine {
    /// Creates a new settlement engine.
    pub fn new(db: Database) -> Self {
        SettlementEngine { db }
    }

    /// Lists pending invoices, optionally restricted to one customer.
    ///
    /// This is the candidate set for bulk settlement.
    pub async fn pending_invoices(
        &self,
        customer_id: Option<&str>,
    ) -> EngineResult<Vec<Invoice>> {
        let pending = match customer_id {
            Some(id) => {
                let all = self.db.invoices().list_by_customer(id).await?;
                all.into_iter()
                    .filter(|inv| inv.status == InvoiceStatus::Pending)
                    .collect()
            }
            None => self.db.invoices().list_by_status(InvoiceStatus::Pending).await?,
        };

        Ok(pending)
    }

    /// Settles one invoice.
    ///
    /// ## Returns
    /// * `Ok(())` - now Paid, or was already Paid
    /// * `Err(InvalidStatusTransition)` - invoice is Cancelled
    /// * `Err(Db(NotFound))` - no such invoice
    pub async fn settle_single(&self, invoice_id: &str) -> EngineResult<()> {
        let invoice = self
            .db
            .invoices()
            .get_by_id(invoice_id)
            .await?
            .ok_or_else(|| DbError::not_found("Invoice", invoice_id))?;

        match invoice.status {
            InvoiceStatus::Pending => {
                self.db
                    .invoices()
                    .update_status(invoice_id, InvoiceStatus::Paid)
                    .await?;
                info!(
                    invoice_number = %invoice.invoice_number,
                    total = invoice.total_amount,
                    "Invoice settled"
                );
                Ok(())
            }

            InvoiceStatus::Paid => {
                debug!(invoice_number = %invoice.invoice_number, "Already paid, no-op");
                Ok(())
            }

            InvoiceStatus::Cancelled => Err(EngineError::InvalidStatusTransition {
                invoice_id: invoice_id.to_string(),
                status: invoice.status.to_string(),
            }),
        }
    }

    /// Settles a batch of invoices, best-effort.
    ///
    /// Each id is settled independently; a failure is recorded and the
    /// batch continues. Cancellation stops issuing new settlements but
    /// never reverts ones already made.
    pub async fn settle_bulk(
        &self,
        invoice_ids: &[String],
        control: &BatchControl,
    ) -> EngineResult<BatchOutcome> {
        info!(count = invoice_ids.len(), "Starting bulk settlement");

        let mut outcome = BatchOutcome::default();
        let mut progress = BatchProgress::default();

        for invoice_id in invoice_ids {
            if control.is_cancelled() {
                warn!(
                    processed = progress.processed,
                    remaining = invoice_ids.len() - progress.processed,
                    "Bulk settlement cancelled"
                );
                break;
            }

            match self.settle_single(invoice_id).await {
                Ok(()) => {
                    outcome.success_count += 1;
                    progress.record_success();
                }
                Err(err) => {
                    outcome.errors.push((invoice_id.clone(), err.to_string()));
                    progress.record_failure();
                }
            }

            control.report(progress);
        }

        info!(
            succeeded = outcome.success_count,
            failed = outcome.errors.len(),
            "Bulk settlement finished"
        );

        Ok(outcome)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
