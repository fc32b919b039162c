//! Azure Translator (Text API v3) client.

use crate::config::Config;
use crate::retry::{parse_retry_after, send_with_retry, RetryPolicy};
use crate::translation::{TranslateError, TranslationResult, TranslationService};
use anyhow::{Context, Result};
use serde::Serialize;
use std::time::Duration;

const API_VERSION: &str = "3.0";

/// Request element: Azure expects `[{"Text": "..."}]`.
#[derive(Debug, Serialize)]
struct TextItem<'a> {
    #[serde(rename = "Text")]
    text: &'a str,
}

#[derive(Debug, Clone)]
pub struct AzureTranslator {
    client: reqwest::Client,
    translate_url: String,
    key: String,
    region: Option<String>,
    retry: RetryPolicy,
}

impl AzureTranslator {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self::with_client(client, config))
    }

    pub fn with_client(client: reqwest::Client, config: &Config) -> Self {
        Self {
            client,
            translate_url: format!(
                "{}/translate",
                config.translator_endpoint.trim_end_matches('/')
            ),
            key: config.translator_key.clone(),
            region: config.translator_region.clone(),
            retry: RetryPolicy::new(config.translator_max_attempts),
        }
    }

    /// Override the retry policy (tests use short delays).
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    async fn send(
        &self,
        body: &[TextItem<'_>],
        from: &str,
        to: &str,
    ) -> Result<Vec<TranslationResult>, TranslateError> {
        let mut request = self
            .client
            .post(&self.translate_url)
            .query(&[("api-version", API_VERSION), ("from", from), ("to", to)])
            .header("Ocp-Apim-Subscription-Key", &self.key)
            .json(body);

        if let Some(region) = &self.region {
            request = request.header("Ocp-Apim-Subscription-Region", region);
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let retry_after = parse_retry_after(response.headers());
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<failed to read body: {}>", e));
            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                return Err(TranslateError::RateLimited { retry_after, body });
            }
            return Err(TranslateError::Api { status, body });
        }

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| TranslateError::Decode(e.to_string()))
    }
}

impl TranslationService for AzureTranslator {
    async fn translate_batch(
        &self,
        texts: &[String],
        from: &str,
        to: &str,
    ) -> Result<Vec<TranslationResult>, TranslateError> {
        let body: Vec<TextItem<'_>> = texts.iter().map(|t| TextItem { text: t }).collect();

        send_with_retry(&self.retry, to, || self.send(&body, from, to)).await
    }
}
