use std::collections::HashSet;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{info, warn};

use crate::core::money;
use crate::core::Result;
use crate::modules::calendar::PeriodRange;
use crate::modules::ledger::models::{
    ReferenceData, TransactionKind, TransactionRecord,
};
use crate::modules::ledger::store::LedgerStore;

/// One raw ledger row as exported by the spreadsheet collaborator.
///
/// Price and quantity arrive loosely typed (numbers or strings with
/// stray formatting); normalization decides what survives.
#[derive(Debug, Clone, Deserialize)]
pub struct RawTransactionRow {
    pub id: String,
    pub date: String,
    #[serde(default)]
    pub time: Option<String>,
    pub branch_id: String,
    pub worker_id: String,
    #[serde(default = "default_kind")]
    pub kind: String,
    #[serde(default)]
    pub item_id: String,
    #[serde(default)]
    pub item_name: String,
    pub unit_price: serde_json::Value,
    #[serde(default = "default_payment_method")]
    pub payment_method: String,
    #[serde(default)]
    pub quantity: Option<serde_json::Value>,
}

fn default_kind() -> String {
    "service".to_string()
}

fn default_payment_method() -> String {
    "cash".to_string()
}

/// In-memory ledger snapshot.
///
/// Built once per invocation from raw rows; duplicate ids and malformed
/// prices are skipped with a warning, never aborting the fetch.
#[derive(Debug, Clone)]
pub struct LedgerSnapshot {
    records: Vec<TransactionRecord>,
    reference: ReferenceData,
}

impl LedgerSnapshot {
    pub fn new(records: Vec<TransactionRecord>, reference: ReferenceData) -> Self {
        Self { records, reference }
    }

    /// Normalize raw spreadsheet rows into a snapshot.
    pub fn from_rows(rows: Vec<RawTransactionRow>, reference: ReferenceData) -> Self {
        let total = rows.len();
        let mut seen_ids = HashSet::new();
        let mut records = Vec::with_capacity(total);

        for row in rows {
            match normalize_row(&row) {
                Ok(record) => {
                    if !seen_ids.insert(record.id.clone()) {
                        warn!(id = %record.id, "skipping duplicate ledger row");
                        continue;
                    }
                    records.push(record);
                }
                Err(reason) => {
                    warn!(id = %row.id, %reason, "skipping malformed ledger row");
                }
            }
        }

        if records.len() < total {
            info!(
                kept = records.len(),
                skipped = total - records.len(),
                "ledger snapshot normalized"
            );
        }

        Self { records, reference }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn normalize_row(row: &RawTransactionRow) -> std::result::Result<TransactionRecord, String> {
    let date = NaiveDate::parse_from_str(row.date.trim(), "%Y-%m-%d")
        .map_err(|e| format!("bad date '{}': {}", row.date, e))?;

    let time = match &row.time {
        Some(raw) if !raw.trim().is_empty() => Some(
            NaiveTime::parse_from_str(raw.trim(), "%H:%M:%S")
                .or_else(|_| NaiveTime::parse_from_str(raw.trim(), "%H:%M"))
                .map_err(|e| format!("bad time '{}': {}", raw, e))?,
        ),
        _ => None,
    };

    let kind = match row.kind.trim().to_lowercase().as_str() {
        "service" | "" => TransactionKind::Service,
        "product_sale" | "product" => TransactionKind::ProductSale,
        other => return Err(format!("unknown kind '{}'", other)),
    };

    let unit_price = parse_decimal(&row.unit_price)
        .ok_or_else(|| format!("unparseable price {:?}", row.unit_price))?;
    if !money::is_valid_price(unit_price) {
        return Err(format!("negative price {}", unit_price));
    }

    let quantity = match &row.quantity {
        None => 1,
        Some(value) => parse_quantity(value)
            .ok_or_else(|| format!("unparseable quantity {:?}", value))?,
    };

    Ok(TransactionRecord {
        id: row.id.trim().to_string(),
        date,
        time,
        branch_id: row.branch_id.trim().to_string(),
        worker_id: row.worker_id.trim().to_string(),
        kind,
        item_id: row.item_id.trim().to_string(),
        item_name: row.item_name.trim().to_string(),
        unit_price,
        payment_method: row.payment_method.trim().to_lowercase(),
        quantity,
    })
}

fn parse_decimal(value: &serde_json::Value) -> Option<Decimal> {
    match value {
        serde_json::Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
        serde_json::Value::String(s) => {
            // Tolerate "Rp 35.000"-style sheet formatting
            let cleaned: String = s
                .trim()
                .trim_start_matches("Rp")
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '-')
                .collect();
            if cleaned.is_empty() {
                None
            } else {
                Decimal::from_str(&cleaned).ok()
            }
        }
        _ => None,
    }
}

fn parse_quantity(value: &serde_json::Value) -> Option<u32> {
    match value {
        serde_json::Value::Number(n) => n.as_u64().and_then(|q| u32::try_from(q).ok()),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        serde_json::Value::Null => Some(1),
        _ => None,
    }
}

#[async_trait]
impl LedgerStore for LedgerSnapshot {
    async fn fetch(
        &self,
        period: Option<&PeriodRange>,
        branch_id: Option<&str>,
        worker_id: Option<&str>,
    ) -> Result<Vec<TransactionRecord>> {
        let records = self
            .records
            .iter()
            .filter(|r| period.map(|p| p.contains(r.date)).unwrap_or(true))
            .filter(|r| branch_id.map(|b| r.branch_id == b).unwrap_or(true))
            .filter(|r| worker_id.map(|w| r.worker_id == w).unwrap_or(true))
            .cloned()
            .collect();
        Ok(records)
    }

    async fn fetch_reference_data(&self) -> Result<ReferenceData> {
        Ok(self.reference.clone())
    }
}
