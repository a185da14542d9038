//! Formula translation through an HTTP service

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{FormulaTranslator, TranslationError};
use crate::config::TranslationConfig;

#[derive(Serialize)]
struct TranslationRequest<'a> {
    formula: &'a str,
    target: &'a str,
}

#[derive(Deserialize)]
struct TranslationResponse {
    expression: String,
}

/// Posts `{"formula", "target"}` as JSON and reads `{"expression"}` back
pub struct HttpTranslator {
    client: Client,
    endpoint: String,
    target: String,
}

impl HttpTranslator {
    pub fn new(config: &TranslationConfig) -> Result<Self, TranslationError> {
        let endpoint = config
            .endpoint
            .clone()
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| TranslationError::Unavailable("no endpoint configured".to_string()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| TranslationError::Request(e.to_string()))?;

        Ok(Self {
            client,
            endpoint,
            target: config.target.clone(),
        })
    }
}

impl FormulaTranslator for HttpTranslator {
    fn translate(&self, formula: &str) -> Result<String, TranslationError> {
        let body = serde_json::to_string(&TranslationRequest {
            formula,
            target: &self.target,
        })
        .map_err(|e| TranslationError::Request(e.to_string()))?;

        let response = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .map_err(|e| TranslationError::Request(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .map_err(|e| TranslationError::Response(e.to_string()))?;
        if !status.is_success() {
            return Err(TranslationError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: TranslationResponse =
            serde_json::from_str(&text).map_err(|e| TranslationError::Response(e.to_string()))?;
        Ok(parsed.expression)
    }
}
