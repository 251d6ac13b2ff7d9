use std::fmt;

/// Application-wide Result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Main application error type
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    /// Malformed explicit period (month out of range, impossible date)
    #[error("Invalid period: {0}")]
    InvalidPeriod(String),

    /// Ledger adapter failure; report generation aborts, no partial report
    #[error("Ledger fetch error: {0}")]
    LedgerFetch(String),

    /// AI oracle is not configured or not reachable
    #[error("Oracle unavailable: {0}")]
    OracleUnavailable(String),

    /// AI oracle did not answer within the configured bound
    #[error("Oracle timeout after {0:?}")]
    OracleTimeout(std::time::Duration),

    /// AI oracle answered with something we cannot use
    #[error("Oracle malformed response: {0}")]
    OracleMalformedResponse(String),

    /// Validation errors for business rules
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether the query resolver may recover from this error by
    /// falling back to the deterministic tier.
    pub fn is_oracle_failure(&self) -> bool {
        matches!(
            self,
            AppError::OracleUnavailable(_)
                | AppError::OracleTimeout(_)
                | AppError::OracleMalformedResponse(_)
        )
    }

    /// Short, actionable Indonesian text for the chat surface.
    /// Raw error details stay in the logs.
    pub fn user_message(&self) -> UserMessage<'_> {
        UserMessage(self)
    }
}

/// Display wrapper that renders an error as end-user chat text
pub struct UserMessage<'a>(&'a AppError);

impl fmt::Display for UserMessage<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            AppError::InvalidPeriod(_) => {
                write!(f, "❌ Periode tidak valid. Silakan coba lagi.")
            }
            AppError::LedgerFetch(_) => {
                write!(f, "❌ Gagal mengambil data transaksi. Silakan coba lagi.")
            }
            // Oracle failures are recovered internally and should not reach
            // the user, but render something sane if one ever does.
            AppError::OracleUnavailable(_)
            | AppError::OracleTimeout(_)
            | AppError::OracleMalformedResponse(_) => {
                write!(f, "❌ Asisten AI sedang tidak tersedia. Silakan coba lagi.")
            }
            _ => write!(f, "❌ Terjadi kesalahan. Silakan coba lagi."),
        }
    }
}

// Helper functions for common error scenarios
impl AppError {
    pub fn invalid_period(msg: impl Into<String>) -> Self {
        AppError::InvalidPeriod(msg.into())
    }

    pub fn ledger_fetch(msg: impl Into<String>) -> Self {
        AppError::LedgerFetch(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}
