pub mod aggregation;
pub mod calendar;
pub mod ledger;
pub mod query;
pub mod reports;
