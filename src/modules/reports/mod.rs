pub mod models;
pub mod service;

pub use models::{Navigation, Report, ReportHeader, ReportRow, ReportSection, ReportTotals};
pub use service::ReportService;
