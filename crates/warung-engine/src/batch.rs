//! # Batch Progress & Cancellation
//!
//! Shared plumbing for long-running batch operations (bulk settlement,
//! bulk import).
//!
//! ## Design
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Batch Control Flow                                │
//! │                                                                         │
//! │  Caller                              Engine (settle_bulk / commit)     │
//! │    │                                    │                               │
//! │    │  watch::channel(false)             │                               │
//! │    ├──── cancel receiver ──────────────►│  checked between rows         │
//! │    │                                    │                               │
//! │    │  mpsc::unbounded_channel()         │                               │
//! │    │◄──── BatchProgress ────────────────┤  sent after every row         │
//! │    │                                    │                               │
//! │    │  set cancel = true                 │  stops issuing new rows;      │
//! │    │                                    │  committed rows stay          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Both channels are optional: a caller that wants a fire-and-forget batch
//! passes `BatchControl::default()` and pays nothing.

use tokio::sync::{mpsc, watch};

/// A progress snapshot sent after each processed row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct BatchProgress {
    /// Rows handled so far, including failures.
    pub processed: usize,
    /// Rows that completed successfully.
    pub succeeded: usize,
    /// Rows that failed and were recorded, not retried.
    pub failed: usize,
}

impl BatchProgress {
    /// Records one successful row.
    pub fn record_success(&mut self) {
        self.processed += 1;
        self.succeeded += 1;
    }

    /// Records one failed row.
    pub fn record_failure(&mut self) {
        self.processed += 1;
        self.failed += 1;
    }
}

/// Optional progress reporting and cancellation for a batch operation.
#[derive(Debug, Default)]
pub struct BatchControl {
    /// Receives a [`BatchProgress`] after every row when set.
    pub progress: Option<mpsc::UnboundedSender<BatchProgress>>,
    /// Cooperative cancellation flag, checked between rows.
    pub cancel: Option<watch::Receiver<bool>>,
}

impl BatchControl {
    /// Attaches a progress channel.
    pub fn with_progress(mut self, sender: mpsc::UnboundedSender<BatchProgress>) -> Self {
        self.progress = Some(sender);
        self
    }

    /// Attaches a cancellation flag.
    pub fn with_cancel(mut self, receiver: watch::Receiver<bool>) -> Self {
        self.cancel = Some(receiver);
        self
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().map(|rx| *rx.borrow()).unwrap_or(false)
    }

    /// Sends a progress snapshot. A dropped receiver is not an error;
    /// the batch keeps running.
    pub fn report(&self, progress: BatchProgress) {
        if let Some(sender) = &self.progress {
            let _ = sender.send(progress);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_control_never_cancels() {
        let control = BatchControl::default();
        assert!(!control.is_cancelled());
        control.report(BatchProgress::default()); // no channel, no panic
    }

    #[tokio::test]
    async fn test_cancel_flag_observed() {
        let (tx, rx) = watch::channel(false);
        let control = BatchControl::default().with_cancel(rx);

        assert!(!control.is_cancelled());
        tx.send(true).unwrap();
        assert!(control.is_cancelled());
    }

    #[tokio::test]
    async fn test_progress_delivery() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let control = BatchControl::default().with_progress(tx);

        let mut progress = BatchProgress::default();
        progress.record_success();
        progress.record_failure();
        control.report(progress);

        let received = rx.recv().await.unwrap();
        assert_eq!(received.processed, 2);
        assert_eq!(received.succeeded, 1);
        assert_eq!(received.failed, 1);
    }

    #[test]
    fn test_report_after_receiver_dropped() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let control = BatchControl::default().with_progress(tx);
        control.report(BatchProgress::default()); // must not panic
    }
}
