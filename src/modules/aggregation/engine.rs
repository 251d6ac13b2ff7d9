use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use crate::modules::calendar::PeriodRange;
use crate::modules::ledger::models::{ReferenceData, TransactionKind, TransactionRecord};

/// Grouping dimensions, applied in order to form the group key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Day,
    Branch,
    Worker,
    PaymentMethod,
    Service,
}

/// Tuple of dimension values. Day values are ISO dates so lexical
/// ordering doubles as chronological ordering.
pub type GroupKey = Vec<String>;

/// Monetary figures per group. Sums stay exact Decimals; rounding to
/// whole rupiah happens only at presentation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Totals {
    pub revenue: Decimal,
    pub transaction_count: u64,
    pub cost: Decimal,
    pub commission: Decimal,
    pub net_profit: Decimal,
}

/// Everything `aggregate` needs beyond the records themselves
#[derive(Debug, Clone, Copy)]
pub struct AggregationScope<'a> {
    pub period: PeriodRange,
    pub reference: &'a ReferenceData,
    /// Divisor converting monthly operating cost to a daily figure
    pub days_per_month: u32,
}

/// Aggregation output: group key to totals, in deterministic lexical
/// key order (which also settles best-group ties).
#[derive(Debug, Clone, Default, Serialize)]
pub struct AggregationResult {
    pub groups: BTreeMap<GroupKey, Totals>,
}

impl AggregationResult {
    /// Grand totals across every group
    pub fn totals(&self) -> Totals {
        let mut sum = Totals::default();
        for totals in self.groups.values() {
            sum.revenue += totals.revenue;
            sum.transaction_count += totals.transaction_count;
            sum.cost += totals.cost;
            sum.commission += totals.commission;
            sum.net_profit += totals.net_profit;
        }
        sum
    }

    /// Group with the highest metric value; ties break toward the
    /// lexically smaller key, never insertion order.
    pub fn best_by<F>(&self, metric: F) -> Option<(&GroupKey, &Totals)>
    where
        F: Fn(&Totals) -> Decimal,
    {
        let mut ranked: Vec<_> = self.groups.iter().collect();
        ranked.sort_by(|(key_a, tot_a), (key_b, tot_b)| {
            metric(tot_b)
                .cmp(&metric(tot_a))
                .then_with(|| key_a.cmp(key_b))
        });
        ranked.into_iter().next()
    }

    /// Groups sorted by metric descending, lexical key on ties
    pub fn ranked_by<F>(&self, metric: F) -> Vec<(&GroupKey, &Totals)>
    where
        F: Fn(&Totals) -> Decimal,
    {
        let mut ranked: Vec<_> = self.groups.iter().collect();
        ranked.sort_by(|(key_a, tot_a), (key_b, tot_b)| {
            metric(tot_b)
                .cmp(&metric(tot_a))
                .then_with(|| key_a.cmp(key_b))
        });
        ranked
    }
}

fn dimension_value(record: &TransactionRecord, dimension: Dimension) -> String {
    match dimension {
        Dimension::Day => record.date.to_string(),
        Dimension::Branch => record.branch_id.clone(),
        Dimension::Worker => record.worker_id.clone(),
        Dimension::PaymentMethod => record.payment_method.clone(),
        Dimension::Service => record.item_name.clone(),
    }
}

/// Enumerable domain for a dimension within the scope, used for
/// zero-filling. Payment methods and services have no fixed domain, so
/// only observed values appear for those dimensions.
fn dimension_domain(dimension: Dimension, scope: &AggregationScope<'_>) -> Option<Vec<String>> {
    match dimension {
        Dimension::Day => Some(scope.period.iter_days().map(|d| d.to_string()).collect()),
        Dimension::Branch => Some(
            scope
                .reference
                .branches
                .iter()
                .map(|b| b.branch_id.clone())
                .collect(),
        ),
        Dimension::Worker => Some(
            scope
                .reference
                .workers
                .iter()
                .map(|w| w.worker_id.clone())
                .collect(),
        ),
        Dimension::PaymentMethod | Dimension::Service => None,
    }
}

/// Every requested group key for the scope: the cartesian product of the
/// enumerable dimension domains. Empty reports must show zero rows, not
/// missing rows.
fn requested_keys(group_by: &[Dimension], scope: &AggregationScope<'_>) -> Vec<GroupKey> {
    let mut keys: Vec<GroupKey> = vec![Vec::new()];
    for &dimension in group_by {
        let Some(domain) = dimension_domain(dimension, scope) else {
            // A non-enumerable dimension makes the whole product open-ended
            return Vec::new();
        };
        let mut expanded = Vec::with_capacity(keys.len() * domain.len());
        for key in &keys {
            for value in &domain {
                let mut next = key.clone();
                next.push(value.clone());
                expanded.push(next);
            }
        }
        keys = expanded;
    }
    keys
}

/// Days of operating cost a single group carries: one day when grouping
/// per-day, the whole scope otherwise.
fn group_day_count(group_by: &[Dimension], scope: &AggregationScope<'_>) -> Decimal {
    if group_by.contains(&Dimension::Day) {
        Decimal::ONE
    } else {
        Decimal::from(scope.period.days())
    }
}

/// Apportioned operating cost for a group.
///
/// Monthly fixed cost becomes a daily figure via `days_per_month` and is
/// multiplied by the days the group covers. Branch-keyed groups carry
/// their own branch's cost; global groups carry the sum over all
/// branches. Worker-keyed groups carry none (a worker does not own the
/// rent), so their net profit is revenue minus commission.
fn apportioned_cost(
    key: &GroupKey,
    group_by: &[Dimension],
    scope: &AggregationScope<'_>,
) -> Decimal {
    if group_by.contains(&Dimension::Worker) {
        return Decimal::ZERO;
    }

    let days = group_day_count(group_by, scope);
    let per_month = Decimal::from(scope.days_per_month);

    let monthly_cost = match group_by.iter().position(|&d| d == Dimension::Branch) {
        Some(index) => scope
            .reference
            .branch_by_id(&key[index])
            .map(|b| b.operating_cost)
            .unwrap_or(Decimal::ZERO),
        None => scope
            .reference
            .branches
            .iter()
            .map(|b| b.operating_cost)
            .sum(),
    };

    monthly_cost / per_month * days
}

/// Aggregate records into per-group revenue, count, commission, cost and
/// net profit.
///
/// Commission applies only to service revenue, at the record branch's
/// rate; product sales contribute revenue and count. Empty input still
/// yields a zero-filled group for every enumerable key in scope.
pub fn aggregate(
    records: &[TransactionRecord],
    group_by: &[Dimension],
    scope: &AggregationScope<'_>,
) -> AggregationResult {
    let mut groups: BTreeMap<GroupKey, Totals> = requested_keys(group_by, scope)
        .into_iter()
        .map(|key| (key, Totals::default()))
        .collect();

    for record in records {
        let key: GroupKey = group_by
            .iter()
            .map(|&dimension| dimension_value(record, dimension))
            .collect();

        let revenue = record.revenue();
        let commission = match record.kind {
            TransactionKind::Service => {
                let rate = scope
                    .reference
                    .branch_by_id(&record.branch_id)
                    .map(|b| b.commission_rate)
                    .unwrap_or(Decimal::ZERO);
                revenue * rate
            }
            TransactionKind::ProductSale => Decimal::ZERO,
        };

        let totals = groups.entry(key).or_default();
        totals.revenue += revenue;
        totals.transaction_count += 1;
        totals.commission += commission;
    }

    for (key, totals) in groups.iter_mut() {
        totals.cost = apportioned_cost(key, group_by, scope);
        totals.net_profit = totals.revenue - totals.commission - totals.cost;
    }

    debug!(
        groups = groups.len(),
        records = records.len(),
        "aggregation complete"
    );

    AggregationResult { groups }
}
