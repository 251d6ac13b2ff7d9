pub mod locale;
pub mod resolver;

pub use resolver::{
    month_range, resolve_period, shift_month, shift_week, start_of_week, week_of_month,
    weeks_in_month, PeriodKeyword, PeriodRange,
};
