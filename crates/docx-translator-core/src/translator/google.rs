use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use super::retry::RetryPolicy;
use super::traits::{Translator, TranslatorInfo};
use crate::error::{Error, Result};
use crate::language::{Lang, SourceLang};

/// Public web endpoint used by the Google Translate browser widgets
pub const DEFAULT_GOOGLE_BASE: &str = "https://translate.googleapis.com";

/// Longest text the endpoint accepts in one request
pub const MAX_TEXT_CHARS: usize = 5000;

/// Google Translate over its free web endpoint (no API key)
pub struct GoogleTranslator {
    client: Client,
    /// Base URL, overridable for proxies and tests
    pub api_base: String,
    pub retry: RetryPolicy,
}

impl GoogleTranslator {
    pub fn new(api_base: Option<String>, timeout: Duration, retry: RetryPolicy) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::TranslationRequest(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_base: api_base.unwrap_or_else(|| DEFAULT_GOOGLE_BASE.to_string()),
            retry,
        })
    }

    async fn request(&self, text: &str, source: &SourceLang, target: &Lang) -> Result<String> {
        let url = format!("{}/translate_a/single", self.api_base.trim_end_matches('/'));
        debug!("Google translate request ({} chars) to {}", text.chars().count(), url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("client", "gtx"),
                ("sl", source.code()),
                ("tl", target.as_str()),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::TranslationTimeout
                } else {
                    Error::TranslationRequest(e.to_string())
                }
            })?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            return Err(Error::TranslationRateLimited { retry_after });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::TranslationHttp {
                status: status.as_u16(),
                body,
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| Error::TranslationInvalidResponse(e.to_string()))?;
        parse_response(&body)
    }
}

/// Concatenate the translated segments of a `translate_a/single` answer.
///
/// The answer is a nested array whose first element lists sentence
/// segments as `[translated, original, ...]`.
fn parse_response(body: &Value) -> Result<String> {
    let segments = body
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| Error::TranslationInvalidResponse("missing segment list".to_string()))?;

    let translated: String = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .collect();

    if translated.is_empty() {
        return Err(Error::TranslationEmpty);
    }
    Ok(translated)
}

#[async_trait]
impl Translator for GoogleTranslator {
    fn info(&self) -> TranslatorInfo {
        TranslatorInfo { name: "Google Translate" }
    }

    async fn translate(&self, text: &str, source: &SourceLang, target: &Lang) -> Result<String> {
        if text.trim().is_empty() {
            return Ok(text.to_string());
        }

        let len = text.chars().count();
        if len >= MAX_TEXT_CHARS {
            return Err(Error::TranslationTextTooLong {
                len,
                max: MAX_TEXT_CHARS,
            });
        }

        if source.lang() == Some(target) {
            return Ok(text.to_string());
        }

        self.retry.run(|| self.request(text, source, target)).await
    }
}
