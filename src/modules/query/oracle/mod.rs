pub mod gemini;

pub use gemini::GeminiOracle;

use async_trait::async_trait;

use crate::core::Result;

/// Free-form answering backend for natural-language questions.
///
/// Implementations receive the user's question together with a compact,
/// pre-aggregated data context and return prose. Failures are surfaced
/// as oracle errors; the resolver decides whether to fall back.
#[async_trait]
pub trait AiOracle: Send + Sync {
    /// Backend name, for logging
    fn name(&self) -> &str;

    /// Answer `question` using only the figures in `data_context`
    async fn complete(&self, question: &str, data_context: &str) -> Result<String>;
}
