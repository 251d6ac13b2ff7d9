use rust_decimal::Decimal;
use serde::Serialize;

use crate::modules::calendar::PeriodRange;

/// Presentation-ready report structure handed to the transport
/// collaborator. All monetary values are already rounded to whole
/// rupiah; dates are canonical. No locale/formatting logic lives here
/// beyond the fixed Indonesian labels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub header: ReportHeader,
    pub sections: Vec<ReportSection>,
    pub totals: ReportTotals,
    /// Adjacent periods for prev/next navigation, when the report
    /// shape supports it (weekly, monthly, profit)
    pub navigation: Option<Navigation>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportHeader {
    pub title: String,
    pub period_label: String,
    pub period: PeriodRange,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSection {
    pub title: String,
    pub rows: Vec<ReportRow>,
}

/// One body row: a labeled group with its rounded figures
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub label: String,
    pub transaction_count: u64,
    pub revenue: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commission: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operating_cost: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub net_profit: Option<Decimal>,
    /// Share of the report total, percent with one decimal
    #[serde(skip_serializing_if = "Option::is_none")]
    pub share_percent: Option<Decimal>,
}

impl ReportRow {
    pub fn new(label: impl Into<String>, transaction_count: u64, revenue: Decimal) -> Self {
        Self {
            label: label.into(),
            transaction_count,
            revenue,
            commission: None,
            operating_cost: None,
            net_profit: None,
            share_percent: None,
        }
    }

    pub fn with_profit(
        mut self,
        commission: Decimal,
        operating_cost: Decimal,
        net_profit: Decimal,
    ) -> Self {
        self.commission = Some(commission);
        self.operating_cost = Some(operating_cost);
        self.net_profit = Some(net_profit);
        self
    }

    pub fn with_share(mut self, share_percent: Decimal) -> Self {
        self.share_percent = Some(share_percent);
        self
    }
}

/// Footer totals
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReportTotals {
    pub transaction_count: u64,
    pub revenue: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commission: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operating_cost: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub net_profit: Option<Decimal>,
    /// Days inside the period with at least one transaction
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operating_days: Option<u64>,
    /// Average revenue per operating day, rounded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_revenue_per_day: Option<Decimal>,
}

/// Prev/next period targets so the transport can offer navigation
/// without re-deriving calendar logic
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Navigation {
    pub prev: PeriodRange,
    pub next: PeriodRange,
}
