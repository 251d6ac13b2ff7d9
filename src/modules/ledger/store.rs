use async_trait::async_trait;

use crate::core::Result;
use crate::modules::calendar::PeriodRange;
use crate::modules::ledger::models::{ReferenceData, TransactionRecord};

/// Sole contact point with the persistence collaborator.
///
/// Implementations must guarantee that every returned record falls inside
/// `period` when one is given, and must skip (and log) malformed rows
/// instead of failing the whole fetch. A failed fetch surfaces as
/// `AppError::LedgerFetch` and aborts report generation.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Fetch transaction records, optionally pre-filtered by period,
    /// branch and worker.
    async fn fetch(
        &self,
        period: Option<&PeriodRange>,
        branch_id: Option<&str>,
        worker_id: Option<&str>,
    ) -> Result<Vec<TransactionRecord>>;

    /// Fetch the merged branch/worker reference snapshot.
    async fn fetch_reference_data(&self) -> Result<ReferenceData>;
}
