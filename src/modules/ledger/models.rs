use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::{AppError, Result};

/// Kind of ledger entry. Commission and operating-cost allocation only
/// apply to service revenue; product sales contribute revenue and count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Service,
    ProductSale,
}

/// One immutable row of the append-only transaction ledger.
///
/// Created by the transaction-entry collaborator; this engine only reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: String,
    /// Business-local calendar day; all period scoping compares on this
    pub date: NaiveDate,
    pub time: Option<NaiveTime>,
    pub branch_id: String,
    pub worker_id: String,
    pub kind: TransactionKind,
    pub item_id: String,
    pub item_name: String,
    /// Whole-rupiah unit price, non-negative
    pub unit_price: Decimal,
    pub payment_method: String,
    pub quantity: u32,
}

impl TransactionRecord {
    /// Revenue contributed by this record
    pub fn revenue(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Per-branch reference configuration, loaded once per invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchConfig {
    pub branch_id: String,
    pub name: String,
    /// Free-text names the extractor accepts for this branch
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Fixed monthly operating cost (rent, utilities, fixed wages)
    pub operating_cost: Decimal,
    /// Fraction of service revenue paid out as worker commission
    pub commission_rate: Decimal,
}

impl BranchConfig {
    pub fn validate(&self) -> Result<()> {
        if self.commission_rate < Decimal::ZERO || self.commission_rate > Decimal::ONE {
            return Err(AppError::validation(format!(
                "commission_rate {} for branch {} must be within [0, 1]",
                self.commission_rate, self.branch_id
            )));
        }
        if self.operating_cost < Decimal::ZERO {
            return Err(AppError::validation(format!(
                "operating_cost for branch {} cannot be negative",
                self.branch_id
            )));
        }
        Ok(())
    }

    fn matches(&self, lower_text: &str) -> bool {
        lower_text.contains(&self.name.to_lowercase())
            || self
                .aliases
                .iter()
                .any(|alias| lower_text.contains(&alias.to_lowercase()))
    }
}

/// Worker (capster) reference used for alias resolution and row labels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerRef {
    pub worker_id: String,
    pub display_name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl WorkerRef {
    fn matches(&self, lower_text: &str) -> bool {
        lower_text.contains(&self.display_name.to_lowercase())
            || self
                .aliases
                .iter()
                .any(|alias| lower_text.contains(&alias.to_lowercase()))
    }
}

/// Already-merged snapshot of branches and workers. The engine never
/// reaches into environment or spreadsheet state itself.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReferenceData {
    pub branches: Vec<BranchConfig>,
    pub workers: Vec<WorkerRef>,
}

impl ReferenceData {
    pub fn validate(&self) -> Result<()> {
        for branch in &self.branches {
            branch.validate()?;
        }
        Ok(())
    }

    pub fn branch_by_id(&self, branch_id: &str) -> Option<&BranchConfig> {
        self.branches.iter().find(|b| b.branch_id == branch_id)
    }

    pub fn worker_by_id(&self, worker_id: &str) -> Option<&WorkerRef> {
        self.workers.iter().find(|w| w.worker_id == worker_id)
    }

    /// First branch whose name or alias appears in the text (lowercased)
    pub fn resolve_branch(&self, lower_text: &str) -> Option<&BranchConfig> {
        self.branches.iter().find(|b| b.matches(lower_text))
    }

    /// First worker whose name or alias appears in the text (lowercased)
    pub fn resolve_worker(&self, lower_text: &str) -> Option<&WorkerRef> {
        self.workers.iter().find(|w| w.matches(lower_text))
    }

    /// Resolve a worker mention (canonical id, display name or alias)
    /// to the canonical worker id.
    pub fn canonical_worker_id(&self, mention: &str) -> Option<&str> {
        let lower = mention.to_lowercase();
        self.workers
            .iter()
            .find(|w| {
                w.worker_id.to_lowercase() == lower
                    || w.display_name.to_lowercase() == lower
                    || w.aliases.iter().any(|a| a.to_lowercase() == lower)
            })
            .map(|w| w.worker_id.as_str())
    }
}
