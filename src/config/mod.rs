use crate::core::{AppError, Result};
use chrono::Weekday;
use std::env;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub oracle: OracleConfig,
    pub report: ReportConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: String,
    pub log_level: String,
}

/// AI oracle settings. A missing api_key disables tier-1 answering;
/// the deterministic fallback still works.
#[derive(Debug, Clone)]
pub struct OracleConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl OracleConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub week_start: Weekday,
    pub days_per_month: u32,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let config = Config {
            app: AppConfig {
                env: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
                log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            },
            oracle: OracleConfig {
                api_key: env::var("GEMINI_API_KEY").ok().filter(|k| !k.is_empty()),
                base_url: env::var("GEMINI_BASE_URL")
                    .unwrap_or_else(|_| "https://generativelanguage.googleapis.com".to_string()),
                model: env::var("GEMINI_MODEL")
                    .unwrap_or_else(|_| "gemini-1.5-flash".to_string()),
                timeout_secs: env::var("ORACLE_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "8".to_string())
                    .parse()
                    .map_err(|_| {
                        AppError::Configuration("Invalid ORACLE_TIMEOUT_SECS".to_string())
                    })?,
            },
            report: ReportConfig {
                week_start: parse_weekday(
                    &env::var("WEEK_START").unwrap_or_else(|_| "monday".to_string()),
                )?,
                days_per_month: env::var("DAYS_PER_MONTH")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse()
                    .map_err(|_| AppError::Configuration("Invalid DAYS_PER_MONTH".to_string()))?,
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.report.days_per_month == 0 {
            return Err(AppError::Configuration(
                "DAYS_PER_MONTH must be greater than 0".to_string(),
            ));
        }
        if self.oracle.timeout_secs == 0 {
            return Err(AppError::Configuration(
                "ORACLE_TIMEOUT_SECS must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_weekday(value: &str) -> Result<Weekday> {
    match value.to_lowercase().as_str() {
        "monday" | "senin" => Ok(Weekday::Mon),
        "tuesday" | "selasa" => Ok(Weekday::Tue),
        "wednesday" | "rabu" => Ok(Weekday::Wed),
        "thursday" | "kamis" => Ok(Weekday::Thu),
        "friday" | "jumat" => Ok(Weekday::Fri),
        "saturday" | "sabtu" => Ok(Weekday::Sat),
        "sunday" | "minggu" => Ok(Weekday::Sun),
        other => Err(AppError::Configuration(format!(
            "Invalid WEEK_START '{}'",
            other
        ))),
    }
}
