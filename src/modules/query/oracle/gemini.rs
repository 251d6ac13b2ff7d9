use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use super::AiOracle;
use crate::core::{AppError, Result};

/// Gemini generateContent client
///
/// API Documentation: https://ai.google.dev/api/generate-content
pub struct GeminiOracle {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ContentPart>,
}

#[derive(Debug, Deserialize)]
struct ContentPart {
    text: Option<String>,
}

impl GeminiOracle {
    /// * `api_key` - Gemini API key (from GEMINI_API_KEY env var)
    /// * `base_url` - API base URL, defaults to the public endpoint
    /// * `model` - model id, e.g. "gemini-1.5-flash"
    pub fn new(api_key: String, base_url: Option<String>, model: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: base_url
                .unwrap_or_else(|| "https://generativelanguage.googleapis.com".to_string()),
            model,
        }
    }

    fn build_prompt(question: &str, data_context: &str) -> String {
        format!(
            "Kamu adalah asisten laporan untuk barbershop multi-cabang.\n\
             Jawab pertanyaan berikut HANYA berdasarkan data di bawah.\n\
             Jawab singkat dalam bahasa Indonesia. Jangan mengarang angka.\n\n\
             Data:\n{data_context}\n\nPertanyaan: {question}"
        )
    }
}

#[async_trait]
impl AiOracle for GeminiOracle {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn complete(&self, question: &str, data_context: &str) -> Result<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );

        let body = json!({
            "contents": [{
                "parts": [{ "text": Self::build_prompt(question, data_context) }]
            }],
            "generationConfig": {
                "temperature": 0.2,
                "maxOutputTokens": 512
            }
        });

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::OracleUnavailable(format!("gemini request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::OracleUnavailable(format!(
                "gemini returned {}: {}",
                status, body
            )));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| AppError::OracleMalformedResponse(e.to_string()))?;

        let text = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.text)
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                AppError::OracleMalformedResponse("no text candidate in response".to_string())
            })?;

        info!(model = %self.model, chars = text.len(), "gemini answer received");
        Ok(text.trim().to_string())
    }
}
