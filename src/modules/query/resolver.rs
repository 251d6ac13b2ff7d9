use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Weekday};
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::core::money::{format_idr, round_idr};
use crate::core::{AppError, Result};
use crate::modules::aggregation::{aggregate, AggregationScope, Dimension, Totals};
use crate::modules::calendar::{resolve_period, PeriodKeyword, PeriodRange};
use crate::modules::ledger::{LedgerStore, ReferenceData, TransactionRecord};
use crate::modules::query::extractor::{FilterExtractor, Metric, QueryFilter};
use crate::modules::query::oracle::AiOracle;

/// Resolved answer to a natural-language question
#[derive(Debug, Clone, PartialEq)]
pub enum Answer {
    /// Prose produced by the AI oracle
    Ai(String),
    /// Deterministic fallback computed from the ledger
    Computed {
        metric: Metric,
        value: Decimal,
        text: String,
    },
}

impl Answer {
    /// The chat text regardless of tier
    pub fn text(&self) -> &str {
        match self {
            Answer::Ai(text) => text,
            Answer::Computed { text, .. } => text,
        }
    }
}

/// Two-tier natural-language query resolver.
///
/// Tier 1 hands the question plus a compact pre-aggregated summary to
/// the AI oracle under a timeout. Any oracle problem (unconfigured,
/// unreachable, slow, malformed) is logged and absorbed; tier 2 then
/// answers from the same aggregates with a fixed Indonesian template.
/// A user question never fails because the oracle did.
pub struct QueryResolver<L: LedgerStore> {
    ledger: L,
    oracle: Option<Arc<dyn AiOracle>>,
    extractor: FilterExtractor,
    week_start: Weekday,
    days_per_month: u32,
    oracle_timeout: Duration,
}

impl<L: LedgerStore> QueryResolver<L> {
    pub fn new(
        ledger: L,
        oracle: Option<Arc<dyn AiOracle>>,
        week_start: Weekday,
        days_per_month: u32,
        oracle_timeout: Duration,
    ) -> Self {
        Self {
            ledger,
            oracle,
            extractor: FilterExtractor::new(),
            week_start,
            days_per_month,
            oracle_timeout,
        }
    }

    /// Answer a free-text question as of `reference_date`
    pub async fn answer(&self, raw_text: &str, reference_date: NaiveDate) -> Result<Answer> {
        let mut reference = self.ledger.fetch_reference_data().await?;
        let filter = self
            .extractor
            .extract(raw_text, reference_date, &reference, self.week_start);

        // Narrow the scope so cost apportionment only covers the
        // requested branch, never the other branches' rent
        if let Some(branch_id) = &filter.branch_id {
            reference.branches.retain(|b| b.branch_id == *branch_id);
        }

        self.resolve(filter, reference_date, &reference).await
    }

    async fn resolve(
        &self,
        mut filter: QueryFilter,
        reference_date: NaiveDate,
        reference: &ReferenceData,
    ) -> Result<Answer> {
        // Unset dimensions default to today / all branches / revenue
        let (period, period_label) = match (filter.period, filter.period_label.take()) {
            (Some(period), Some(label)) => (period, label),
            _ => (
                resolve_period(PeriodKeyword::Today, reference_date, self.week_start)?,
                "hari ini".to_string(),
            ),
        };
        let metric = filter.metric.unwrap_or(Metric::Revenue);

        let records = self
            .ledger
            .fetch(
                Some(&period),
                filter.branch_id.as_deref(),
                filter.worker_id.as_deref(),
            )
            .await?;

        let scope = AggregationScope {
            period,
            reference,
            days_per_month: self.days_per_month,
        };

        // Worker-scoped totals group by worker: a worker does not own
        // the rent, so their cost stays zero
        let overall = if filter.worker_id.is_some() {
            aggregate(&records, &[Dimension::Worker], &scope).totals()
        } else {
            aggregate(&records, &[], &scope).totals()
        };

        let scope_label = self.scope_label(&filter, reference);
        let data_context =
            build_data_context(&records, &overall, &scope, &period_label, &scope_label);

        if let Some(oracle) = &self.oracle {
            match self.ask_oracle(oracle, &filter.raw_text, &data_context).await {
                Ok(text) => return Ok(Answer::Ai(text)),
                Err(err) if err.is_oracle_failure() => {
                    warn!(error = %err, oracle = oracle.name(), "oracle failed, using fallback");
                }
                Err(err) => return Err(err),
            }
        }

        Ok(self.fallback_answer(metric, &records, &overall, &scope, &period_label, &scope_label))
    }

    async fn ask_oracle(
        &self,
        oracle: &Arc<dyn AiOracle>,
        question: &str,
        data_context: &str,
    ) -> Result<String> {
        match tokio::time::timeout(self.oracle_timeout, oracle.complete(question, data_context))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(AppError::OracleTimeout(self.oracle_timeout)),
        }
    }

    fn scope_label(&self, filter: &QueryFilter, reference: &ReferenceData) -> String {
        match (&filter.branch_id, &filter.worker_id) {
            (_, Some(worker_id)) => reference
                .worker_by_id(worker_id)
                .map(|w| format!("capster {}", w.display_name))
                .unwrap_or_else(|| format!("capster {}", worker_id)),
            (Some(branch_id), None) => reference
                .branch_by_id(branch_id)
                .map(|b| b.name.clone())
                .unwrap_or_else(|| branch_id.clone()),
            (None, None) => "semua cabang".to_string(),
        }
    }

    /// Deterministic tier: templated Indonesian answers, always non-empty
    fn fallback_answer(
        &self,
        metric: Metric,
        records: &[TransactionRecord],
        overall: &Totals,
        scope: &AggregationScope<'_>,
        period_label: &str,
        scope_label: &str,
    ) -> Answer {
        let text_and_value = match metric {
            Metric::Revenue => {
                let value = round_idr(overall.revenue);
                (
                    format!(
                        "Pendapatan {} di {}: {} ({} transaksi).",
                        period_label,
                        scope_label,
                        format_idr(value),
                        overall.transaction_count
                    ),
                    value,
                )
            }
            Metric::Profit => {
                let value = round_idr(overall.net_profit);
                (
                    format!(
                        "Laba bersih {} di {}: {} (pendapatan {}, komisi {}, biaya operasional {}).",
                        period_label,
                        scope_label,
                        format_idr(value),
                        format_idr(round_idr(overall.revenue)),
                        format_idr(round_idr(overall.commission)),
                        format_idr(round_idr(overall.cost))
                    ),
                    value,
                )
            }
            Metric::TransactionCount => {
                let count = overall.transaction_count;
                (
                    format!(
                        "Jumlah transaksi {} di {}: {} transaksi.",
                        period_label, scope_label, count
                    ),
                    Decimal::from(count),
                )
            }
            Metric::BestWorker => {
                let result = aggregate(records, &[Dimension::Worker], scope);
                match result
                    .best_by(|t| t.revenue)
                    .filter(|(_, t)| t.transaction_count > 0)
                {
                    Some((key, totals)) => {
                        let name = scope
                            .reference
                            .worker_by_id(&key[0])
                            .map(|w| w.display_name.clone())
                            .unwrap_or_else(|| key[0].clone());
                        let value = round_idr(totals.revenue);
                        (
                            format!(
                                "Capster terbaik {} di {}: {} dengan pendapatan {} ({} transaksi).",
                                period_label,
                                scope_label,
                                name,
                                format_idr(value),
                                totals.transaction_count
                            ),
                            value,
                        )
                    }
                    None => (
                        format!(
                            "Belum ada transaksi capster {} di {}.",
                            period_label, scope_label
                        ),
                        Decimal::ZERO,
                    ),
                }
            }
            Metric::BestBranch => {
                let result = aggregate(records, &[Dimension::Branch], scope);
                match result
                    .best_by(|t| t.revenue)
                    .filter(|(_, t)| t.transaction_count > 0)
                {
                    Some((key, totals)) => {
                        let name = scope
                            .reference
                            .branch_by_id(&key[0])
                            .map(|b| b.name.clone())
                            .unwrap_or_else(|| key[0].clone());
                        let value = round_idr(totals.revenue);
                        (
                            format!(
                                "Cabang terbaik {}: {} dengan pendapatan {} ({} transaksi).",
                                period_label,
                                name,
                                format_idr(value),
                                totals.transaction_count
                            ),
                            value,
                        )
                    }
                    None => (
                        format!("Belum ada transaksi {} di semua cabang.", period_label),
                        Decimal::ZERO,
                    ),
                }
            }
            Metric::TopService => {
                let result = aggregate(records, &[Dimension::Service], scope);
                match result.best_by(|t| Decimal::from(t.transaction_count)) {
                    Some((key, totals)) if totals.transaction_count > 0 => (
                        format!(
                            "Layanan terlaris {} di {}: {} ({} transaksi, pendapatan {}).",
                            period_label,
                            scope_label,
                            key[0],
                            totals.transaction_count,
                            format_idr(round_idr(totals.revenue))
                        ),
                        round_idr(totals.revenue),
                    ),
                    _ => (
                        format!(
                            "Belum ada transaksi layanan {} di {}.",
                            period_label, scope_label
                        ),
                        Decimal::ZERO,
                    ),
                }
            }
        };

        let (text, value) = text_and_value;
        info!(metric = ?metric, %value, "answered via fallback tier");
        Answer::Computed {
            metric,
            value,
            text,
        }
    }
}

/// Compact, pre-aggregated summary handed to the oracle. Never the raw
/// record dump; the oracle only sees figures the fallback tier could
/// also produce.
fn build_data_context(
    records: &[TransactionRecord],
    overall: &Totals,
    scope: &AggregationScope<'_>,
    period_label: &str,
    scope_label: &str,
) -> String {
    let mut lines = vec![
        format!("Periode: {} ({})", period_label, scope.period.label()),
        format!("Cakupan: {}", scope_label),
        format!("Total pendapatan: {}", format_idr(round_idr(overall.revenue))),
        format!("Jumlah transaksi: {}", overall.transaction_count),
        format!(
            "Laba bersih: {} (komisi {}, biaya operasional {})",
            format_idr(round_idr(overall.net_profit)),
            format_idr(round_idr(overall.commission)),
            format_idr(round_idr(overall.cost))
        ),
    ];

    let by_branch = aggregate(records, &[Dimension::Branch], scope);
    for (key, totals) in by_branch.ranked_by(|t| t.revenue) {
        let name = scope
            .reference
            .branch_by_id(&key[0])
            .map(|b| b.name.as_str())
            .unwrap_or(key[0].as_str());
        lines.push(format!(
            "- {}: {} ({} transaksi)",
            name,
            format_idr(round_idr(totals.revenue)),
            totals.transaction_count
        ));
    }

    let by_worker = aggregate(records, &[Dimension::Worker], scope);
    for (key, totals) in by_worker.ranked_by(|t| t.revenue).into_iter().take(5) {
        let name = scope
            .reference
            .worker_by_id(&key[0])
            .map(|w| w.display_name.as_str())
            .unwrap_or(key[0].as_str());
        lines.push(format!(
            "- Capster {}: {} ({} transaksi)",
            name,
            format_idr(round_idr(totals.revenue)),
            totals.transaction_count
        ));
    }

    lines.join("\n")
}
