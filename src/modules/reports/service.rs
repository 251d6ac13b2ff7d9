use chrono::{Datelike, NaiveDate, Weekday};
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::info;

use crate::core::money;
use crate::core::Result;
use crate::modules::aggregation::{aggregate, AggregationResult, AggregationScope, Dimension};
use crate::modules::calendar::{
    locale, shift_month, shift_week, week_of_month, PeriodRange,
};
use crate::modules::ledger::models::ReferenceData;
use crate::modules::ledger::store::LedgerStore;
use crate::modules::reports::models::{
    Navigation, Report, ReportHeader, ReportRow, ReportSection, ReportTotals,
};

/// Composes calendar resolution, ledger fetching and aggregation into the
/// five report shapes. Pure per invocation: same period + unchanged
/// snapshot yields identical output, so nothing here reads the clock.
pub struct ReportService<L: LedgerStore> {
    ledger: L,
    week_start: Weekday,
    days_per_month: u32,
}

impl<L: LedgerStore> ReportService<L> {
    pub fn new(ledger: L, week_start: Weekday, days_per_month: u32) -> Self {
        Self {
            ledger,
            week_start,
            days_per_month,
        }
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn week_start(&self) -> Weekday {
        self.week_start
    }

    pub fn days_per_month(&self) -> u32 {
        self.days_per_month
    }

    fn scope<'a>(
        &self,
        period: PeriodRange,
        reference: &'a ReferenceData,
    ) -> AggregationScope<'a> {
        AggregationScope {
            period,
            reference,
            days_per_month: self.days_per_month,
        }
    }

    /// Daily report: per-branch and per-worker breakdowns, top services
    /// and payment split for a single calendar day.
    pub async fn build_daily(&self, date: NaiveDate) -> Result<Report> {
        let period = PeriodRange::single_day(date);
        let reference = self.ledger.fetch_reference_data().await?;
        reference.validate()?;
        let records = self.ledger.fetch(Some(&period), None, None).await?;
        info!(%date, records = records.len(), "building daily report");

        let scope = self.scope(period, &reference);
        let by_branch = aggregate(&records, &[Dimension::Branch], &scope);
        let by_worker = aggregate(&records, &[Dimension::Worker], &scope);
        let by_service = aggregate(&records, &[Dimension::Service], &scope);
        let by_payment = aggregate(&records, &[Dimension::PaymentMethod], &scope);

        let sections = vec![
            ReportSection {
                title: "Per Cabang".to_string(),
                rows: branch_rows(&by_branch, &reference),
            },
            ReportSection {
                title: "Per Capster".to_string(),
                rows: worker_rows(&by_worker, &reference),
            },
            ReportSection {
                title: "Layanan Terpopuler".to_string(),
                rows: top_rows(&by_service, 3, |t| Decimal::from(t.transaction_count)),
            },
            ReportSection {
                title: "Metode Pembayaran".to_string(),
                rows: top_rows(&by_payment, usize::MAX, |t| t.revenue),
            },
        ];

        Ok(Report {
            header: ReportHeader {
                title: "LAPORAN HARIAN".to_string(),
                period_label: period.label(),
                period,
            },
            totals: basic_totals(&by_branch),
            sections,
            navigation: None,
        })
    }

    /// Weekly report over an explicit (usually week-aligned) period,
    /// with prev/next week navigation targets.
    pub async fn build_weekly(&self, period: PeriodRange) -> Result<Report> {
        let reference = self.ledger.fetch_reference_data().await?;
        reference.validate()?;
        let records = self.ledger.fetch(Some(&period), None, None).await?;
        info!(?period, records = records.len(), "building weekly report");

        let scope = self.scope(period, &reference);
        let by_branch = aggregate(&records, &[Dimension::Branch], &scope);
        let by_service = aggregate(&records, &[Dimension::Service], &scope);
        let by_worker = aggregate(&records, &[Dimension::Worker], &scope);
        let by_day = aggregate(&records, &[Dimension::Day], &scope);

        let sections = vec![
            ReportSection {
                title: "Per Cabang".to_string(),
                rows: ranked_branch_rows(&by_branch, &reference),
            },
            ReportSection {
                title: "Layanan Terpopuler".to_string(),
                rows: top_rows(&by_service, 5, |t| Decimal::from(t.transaction_count)),
            },
            ReportSection {
                title: "Top Capster".to_string(),
                rows: ranked_worker_rows(&by_worker, &reference, 5),
            },
            ReportSection {
                title: "Per Hari".to_string(),
                rows: day_rows(&by_day),
            },
        ];

        let ordinal = week_of_month(period.start, self.week_start);
        Ok(Report {
            header: ReportHeader {
                title: "LAPORAN MINGGUAN".to_string(),
                period_label: format!("Minggu {} ({})", ordinal, period.label()),
                period,
            },
            totals: totals_with_daily_average(&by_branch, &by_day),
            sections,
            navigation: Some(Navigation {
                prev: shift_week(period, -1)?,
                next: shift_week(period, 1)?,
            }),
        })
    }

    /// Monthly report with branch shares, worker ranking, service and
    /// payment breakdowns, plus prev/next month navigation.
    pub async fn build_monthly(&self, period: PeriodRange) -> Result<Report> {
        let reference = self.ledger.fetch_reference_data().await?;
        reference.validate()?;
        let records = self.ledger.fetch(Some(&period), None, None).await?;
        info!(?period, records = records.len(), "building monthly report");

        let scope = self.scope(period, &reference);
        let by_branch = aggregate(&records, &[Dimension::Branch], &scope);
        let by_worker = aggregate(&records, &[Dimension::Worker], &scope);
        let by_service = aggregate(&records, &[Dimension::Service], &scope);
        let by_payment = aggregate(&records, &[Dimension::PaymentMethod], &scope);
        let by_day = aggregate(&records, &[Dimension::Day], &scope);

        let grand_revenue = by_branch.totals().revenue;
        let branch_with_share = ranked_branch_rows(&by_branch, &reference)
            .into_iter()
            .map(|row| {
                let share = share_percent(row.revenue, grand_revenue);
                row.with_share(share)
            })
            .collect();
        let payment_with_share = top_rows(&by_payment, usize::MAX, |t| t.revenue)
            .into_iter()
            .map(|row| {
                let share = share_percent(row.revenue, grand_revenue);
                row.with_share(share)
            })
            .collect();

        let sections = vec![
            ReportSection {
                title: "Per Cabang".to_string(),
                rows: branch_with_share,
            },
            ReportSection {
                title: "Ranking Capster".to_string(),
                rows: ranked_worker_rows(&by_worker, &reference, usize::MAX),
            },
            ReportSection {
                title: "Breakdown Layanan".to_string(),
                rows: top_rows(&by_service, usize::MAX, |t| t.revenue),
            },
            ReportSection {
                title: "Metode Pembayaran".to_string(),
                rows: payment_with_share,
            },
        ];

        Ok(Report {
            header: ReportHeader {
                title: "LAPORAN BULANAN".to_string(),
                period_label: period.label(),
                period,
            },
            totals: totals_with_daily_average(&by_branch, &by_day),
            sections,
            navigation: Some(Navigation {
                prev: shift_month(period, -1)?,
                next: shift_month(period, 1)?,
            }),
        })
    }

    /// Profit report: per-branch revenue, commission, apportioned
    /// operating cost and net profit, optionally scoped to one branch.
    pub async fn build_profit(
        &self,
        period: PeriodRange,
        branch_id: Option<&str>,
    ) -> Result<Report> {
        let mut reference = self.ledger.fetch_reference_data().await?;
        reference.validate()?;

        if let Some(branch) = branch_id {
            if reference.branch_by_id(branch).is_none() {
                return Err(crate::core::AppError::validation(format!(
                    "Cabang tidak dikenal: {}",
                    branch
                )));
            }
            // Narrow the scope so cost apportionment and zero-fill only
            // cover the requested branch
            reference.branches.retain(|b| b.branch_id == branch);
        }

        let records = self.ledger.fetch(Some(&period), branch_id, None).await?;
        info!(
            ?period,
            branch = branch_id.unwrap_or("all"),
            records = records.len(),
            "building profit report"
        );

        let scope = self.scope(period, &reference);
        let by_branch = aggregate(&records, &[Dimension::Branch], &scope);

        let rows = by_branch
            .groups
            .iter()
            .map(|(key, totals)| {
                ReportRow::new(
                    branch_label(&reference, &key[0]),
                    totals.transaction_count,
                    money::round_idr(totals.revenue),
                )
                .with_profit(
                    money::round_idr(totals.commission),
                    money::round_idr(totals.cost),
                    money::round_idr(totals.net_profit),
                )
            })
            .collect();

        let grand = by_branch.totals();
        Ok(Report {
            header: ReportHeader {
                title: "LAPORAN PROFIT".to_string(),
                period_label: period.label(),
                period,
            },
            sections: vec![ReportSection {
                title: "Per Cabang".to_string(),
                rows,
            }],
            totals: ReportTotals {
                transaction_count: grand.transaction_count,
                revenue: money::round_idr(grand.revenue),
                commission: Some(money::round_idr(grand.commission)),
                operating_cost: Some(money::round_idr(grand.cost)),
                net_profit: Some(money::round_idr(grand.net_profit)),
                operating_days: None,
                avg_revenue_per_day: None,
            },
            navigation: Some(Navigation {
                prev: shift_month(period, -1)?,
                next: shift_month(period, 1)?,
            }),
        })
    }

    /// Per-worker report. Accepts a canonical worker id, display name or
    /// alias, and resolves it before aggregating.
    pub async fn build_worker_report(&self, worker: &str, period: PeriodRange) -> Result<Report> {
        let reference = self.ledger.fetch_reference_data().await?;
        reference.validate()?;

        let worker_id = reference
            .canonical_worker_id(worker)
            .ok_or_else(|| {
                crate::core::AppError::validation(format!("Capster tidak dikenal: {}", worker))
            })?
            .to_string();
        let display_name = reference
            .worker_by_id(&worker_id)
            .map(|w| w.display_name.clone())
            .unwrap_or_else(|| worker_id.clone());

        let records = self
            .ledger
            .fetch(Some(&period), None, Some(&worker_id))
            .await?;
        info!(
            worker = %worker_id,
            ?period,
            records = records.len(),
            "building worker report"
        );

        let scope = self.scope(period, &reference);
        let by_service = aggregate(&records, &[Dimension::Service], &scope);
        let by_day = aggregate(&records, &[Dimension::Day], &scope);
        let by_worker = aggregate(&records, &[Dimension::Worker], &scope);

        let sections = vec![
            ReportSection {
                title: "Layanan Terpopuler".to_string(),
                rows: top_rows(&by_service, 3, |t| Decimal::from(t.transaction_count)),
            },
            ReportSection {
                title: "Per Hari".to_string(),
                rows: day_rows(&by_day),
            },
        ];

        let own = by_worker
            .groups
            .get(&vec![worker_id.clone()])
            .cloned()
            .unwrap_or_default();

        Ok(Report {
            header: ReportHeader {
                title: format!("LAPORAN CAPSTER {}", display_name),
                period_label: period.label(),
                period,
            },
            totals: ReportTotals {
                transaction_count: own.transaction_count,
                revenue: money::round_idr(own.revenue),
                commission: Some(money::round_idr(own.commission)),
                operating_cost: None,
                net_profit: None,
                operating_days: None,
                avg_revenue_per_day: None,
            },
            sections,
            navigation: None,
        })
    }
}

fn branch_label(reference: &ReferenceData, branch_id: &str) -> String {
    reference
        .branch_by_id(branch_id)
        .map(|b| b.name.clone())
        .unwrap_or_else(|| branch_id.to_string())
}

fn worker_label(reference: &ReferenceData, worker_id: &str) -> String {
    reference
        .worker_by_id(worker_id)
        .map(|w| w.display_name.clone())
        .unwrap_or_else(|| worker_id.to_string())
}

fn basic_totals(result: &AggregationResult) -> ReportTotals {
    let grand = result.totals();
    ReportTotals {
        transaction_count: grand.transaction_count,
        revenue: money::round_idr(grand.revenue),
        ..ReportTotals::default()
    }
}

fn totals_with_daily_average(result: &AggregationResult, by_day: &AggregationResult) -> ReportTotals {
    let grand = result.totals();
    let operating_days = by_day
        .groups
        .values()
        .filter(|t| t.transaction_count > 0)
        .count() as u64;
    let avg = if operating_days > 0 {
        Some(money::round_idr(
            grand.revenue / Decimal::from(operating_days),
        ))
    } else {
        None
    };
    ReportTotals {
        transaction_count: grand.transaction_count,
        revenue: money::round_idr(grand.revenue),
        operating_days: Some(operating_days),
        avg_revenue_per_day: avg,
        ..ReportTotals::default()
    }
}

/// Rows in lexical branch-id order with branch display names
fn branch_rows(result: &AggregationResult, reference: &ReferenceData) -> Vec<ReportRow> {
    result
        .groups
        .iter()
        .map(|(key, t)| {
            ReportRow::new(
                branch_label(reference, &key[0]),
                t.transaction_count,
                money::round_idr(t.revenue),
            )
        })
        .collect()
}

/// Branch rows ranked by revenue descending (lexical id on ties)
fn ranked_branch_rows(result: &AggregationResult, reference: &ReferenceData) -> Vec<ReportRow> {
    result
        .ranked_by(|t| t.revenue)
        .into_iter()
        .map(|(key, t)| {
            ReportRow::new(
                branch_label(reference, &key[0]),
                t.transaction_count,
                money::round_idr(t.revenue),
            )
        })
        .collect()
}

fn worker_rows(result: &AggregationResult, reference: &ReferenceData) -> Vec<ReportRow> {
    result
        .groups
        .iter()
        .map(|(key, t)| {
            ReportRow::new(
                worker_label(reference, &key[0]),
                t.transaction_count,
                money::round_idr(t.revenue),
            )
        })
        .collect()
}

fn ranked_worker_rows(
    result: &AggregationResult,
    reference: &ReferenceData,
    limit: usize,
) -> Vec<ReportRow> {
    result
        .ranked_by(|t| t.revenue)
        .into_iter()
        .take(limit)
        .map(|(key, t)| {
            ReportRow::new(
                worker_label(reference, &key[0]),
                t.transaction_count,
                money::round_idr(t.revenue),
            )
        })
        .collect()
}

/// Observed-value rows (services, payment methods) ranked by a metric
fn top_rows<F>(result: &AggregationResult, limit: usize, metric: F) -> Vec<ReportRow>
where
    F: Fn(&crate::modules::aggregation::Totals) -> Decimal,
{
    result
        .ranked_by(metric)
        .into_iter()
        .take(limit)
        .map(|(key, t)| {
            ReportRow::new(key[0].clone(), t.transaction_count, money::round_idr(t.revenue))
        })
        .collect()
}

/// Per-day rows labeled "Senin, 24 Agu", in chronological order
fn day_rows(result: &AggregationResult) -> Vec<ReportRow> {
    result
        .groups
        .iter()
        .map(|(key, t)| {
            let label = match chrono::NaiveDate::parse_from_str(&key[0], "%Y-%m-%d") {
                Ok(date) => format!(
                    "{}, {}",
                    locale::day_name(date.weekday()),
                    locale::format_date_short(date)
                ),
                Err(_) => key[0].clone(),
            };
            ReportRow::new(label, t.transaction_count, money::round_idr(t.revenue))
        })
        .collect()
}

fn share_percent(part: Decimal, total: Decimal) -> Decimal {
    if total.is_zero() {
        Decimal::ZERO
    } else {
        (part / total * Decimal::from(100))
            .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
    }
}
