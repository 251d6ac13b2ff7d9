// End-to-end report generation against an in-memory ledger snapshot.

use chrono::{NaiveDate, Weekday};
use laporin::core::AppError;
use laporin::modules::calendar::{month_range, PeriodRange};
use laporin::modules::ledger::{
    BranchConfig, LedgerSnapshot, ReferenceData, TransactionKind, TransactionRecord, WorkerRef,
};
use laporin::modules::reports::ReportService;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn date(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 8, d).unwrap()
}

fn reference() -> ReferenceData {
    ReferenceData {
        branches: vec![
            BranchConfig {
                branch_id: "cabang_a".into(),
                name: "Cabang Denailla".into(),
                aliases: vec!["denailla".into()],
                operating_cost: dec!(3000000),
                commission_rate: dec!(0.5),
            },
            BranchConfig {
                branch_id: "cabang_b".into(),
                name: "Cabang Sumput".into(),
                aliases: vec!["sumput".into()],
                operating_cost: dec!(1500000),
                commission_rate: dec!(0.4),
            },
        ],
        workers: vec![
            WorkerRef {
                worker_id: "w_agus".into(),
                display_name: "Agus".into(),
                aliases: vec![],
            },
            WorkerRef {
                worker_id: "w_budi".into(),
                display_name: "Budi".into(),
                aliases: vec![],
            },
        ],
    }
}

fn record(
    id: &str,
    day: u32,
    branch: &str,
    worker: &str,
    item: &str,
    price: Decimal,
    payment: &str,
) -> TransactionRecord {
    TransactionRecord {
        id: id.into(),
        date: date(day),
        time: None,
        branch_id: branch.into(),
        worker_id: worker.into(),
        kind: TransactionKind::Service,
        item_id: item.to_lowercase().replace(' ', "_"),
        item_name: item.into(),
        unit_price: price,
        payment_method: payment.into(),
        quantity: 1,
    }
}

fn service() -> ReportService<LedgerSnapshot> {
    let records = vec![
        record("t1", 24, "cabang_a", "w_agus", "Potong Rambut", dec!(35000), "cash"),
        record("t2", 24, "cabang_a", "w_budi", "Potong Rambut", dec!(35000), "qris"),
        record("t3", 24, "cabang_b", "w_budi", "Cukur Jenggot", dec!(20000), "cash"),
        record("t4", 25, "cabang_a", "w_agus", "Creambath", dec!(50000), "qris"),
        record("t5", 26, "cabang_b", "w_agus", "Potong Rambut", dec!(35000), "cash"),
    ];
    let ledger = LedgerSnapshot::new(records, reference());
    ReportService::new(ledger, Weekday::Mon, 30)
}

#[tokio::test]
async fn test_daily_report_sections_and_totals() {
    let report = service().build_daily(date(24)).await.unwrap();

    assert_eq!(report.header.title, "LAPORAN HARIAN");
    assert_eq!(report.header.period_label, "24 Agustus 2026");
    assert!(report.navigation.is_none());

    let titles: Vec<&str> = report.sections.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(
        titles,
        vec!["Per Cabang", "Per Capster", "Layanan Terpopuler", "Metode Pembayaran"]
    );

    assert_eq!(report.totals.transaction_count, 3);
    assert_eq!(report.totals.revenue, dec!(90000));

    // Every branch appears even when it had no transactions that day
    let branches = &report.sections[0];
    assert_eq!(branches.rows.len(), 2);
}

#[tokio::test]
async fn test_daily_report_is_idempotent() {
    let service = service();
    let first = service.build_daily(date(24)).await.unwrap();
    let second = service.build_daily(date(24)).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_weekly_report_ranks_and_navigates() {
    // Week of Monday 2026-08-24
    let period = PeriodRange::new(date(24), date(31)).unwrap();
    let report = service().build_weekly(period).await.unwrap();

    assert_eq!(report.header.title, "LAPORAN MINGGUAN");
    assert!(report.header.period_label.starts_with("Minggu "));

    let branches = &report.sections[0];
    // Ranked by revenue: cabang_a 120.000 over cabang_b 55.000
    assert_eq!(branches.rows[0].label, "Cabang Denailla");
    assert_eq!(branches.rows[0].revenue, dec!(120000));
    assert_eq!(branches.rows[1].revenue, dec!(55000));

    // Day section covers all seven days, zero rows included
    let days = report
        .sections
        .iter()
        .find(|s| s.title == "Per Hari")
        .unwrap();
    assert_eq!(days.rows.len(), 7);
    assert!(days.rows[0].label.starts_with("Senin"));

    let nav = report.navigation.unwrap();
    assert_eq!(nav.prev.start, date(17));
    assert_eq!(nav.next.start, date(31));

    // 3 distinct operating days
    assert_eq!(report.totals.operating_days, Some(3));
    assert_eq!(report.totals.avg_revenue_per_day, Some(dec!(58333)));
}

#[tokio::test]
async fn test_monthly_report_shares_sum_to_whole() {
    let period = month_range(2026, 8).unwrap();
    let report = service().build_monthly(period).await.unwrap();

    assert_eq!(report.header.period_label, "Agustus 2026");
    let branches = &report.sections[0];
    let share_sum: Decimal = branches
        .rows
        .iter()
        .filter_map(|r| r.share_percent)
        .sum();
    // One-decimal rounding keeps the sum within half a point of 100
    assert!((share_sum - dec!(100)).abs() <= dec!(0.5), "sum {}", share_sum);

    let nav = report.navigation.unwrap();
    assert_eq!(nav.prev, month_range(2026, 7).unwrap());
    assert_eq!(nav.next, month_range(2026, 9).unwrap());
}

#[tokio::test]
async fn test_profit_report_full_month() {
    let period = month_range(2026, 8).unwrap();
    let report = service().build_profit(period, None).await.unwrap();

    // cabang_a: revenue 120.000, commission 50% = 60.000, cost 3.000.000/30*31
    let rows = &report.sections[0].rows;
    let cabang_a = rows.iter().find(|r| r.label == "Cabang Denailla").unwrap();
    assert_eq!(cabang_a.revenue, dec!(120000));
    assert_eq!(cabang_a.commission, Some(dec!(60000)));
    assert_eq!(cabang_a.operating_cost, Some(dec!(3100000)));
    assert_eq!(cabang_a.net_profit, Some(dec!(-3040000)));

    let totals = &report.totals;
    assert_eq!(totals.revenue, dec!(175000));
    // 60.000 + 40% of 55.000
    assert_eq!(totals.commission, Some(dec!(82000)));
}

#[tokio::test]
async fn test_profit_report_scoped_to_branch() {
    let period = month_range(2026, 8).unwrap();
    let report = service()
        .build_profit(period, Some("cabang_b"))
        .await
        .unwrap();

    let rows = &report.sections[0].rows;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].label, "Cabang Sumput");
    assert_eq!(rows[0].revenue, dec!(55000));
    // Only cabang_b's cost is apportioned: 1.500.000/30*31
    assert_eq!(report.totals.operating_cost, Some(dec!(1550000)));
}

#[tokio::test]
async fn test_profit_report_rejects_unknown_branch() {
    let period = month_range(2026, 8).unwrap();
    let err = service()
        .build_profit(period, Some("cabang_z"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn test_worker_report_resolves_display_name() {
    let period = PeriodRange::new(date(24), date(31)).unwrap();
    let report = service().build_worker_report("Agus", period).await.unwrap();

    assert_eq!(report.header.title, "LAPORAN CAPSTER Agus");
    assert_eq!(report.totals.transaction_count, 3);
    assert_eq!(report.totals.revenue, dec!(120000));
    // 50%*35.000 + 50%*50.000 + 40%*35.000
    assert_eq!(report.totals.commission, Some(dec!(56500)));
    // Worker reports never carry operating cost
    assert_eq!(report.totals.operating_cost, None);
}

#[tokio::test]
async fn test_worker_report_rejects_unknown_worker() {
    let period = PeriodRange::new(date(24), date(31)).unwrap();
    let err = service()
        .build_worker_report("Zainal", period)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn test_empty_month_still_produces_full_report() {
    let ledger = LedgerSnapshot::new(Vec::new(), reference());
    let service = ReportService::new(ledger, Weekday::Mon, 30);
    let report = service.build_monthly(month_range(2026, 8).unwrap()).await.unwrap();

    assert_eq!(report.totals.transaction_count, 0);
    assert_eq!(report.totals.revenue, dec!(0));
    // Branch section is zero-filled, observed-only sections are empty
    assert_eq!(report.sections[0].rows.len(), 2);
    let services = report
        .sections
        .iter()
        .find(|s| s.title == "Breakdown Layanan")
        .unwrap();
    assert!(services.rows.is_empty());
}
