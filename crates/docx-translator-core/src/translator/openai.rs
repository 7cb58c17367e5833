use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use super::retry::RetryPolicy;
use super::traits::{Translator, TranslatorInfo};
use crate::error::{Error, Result};
use crate::language::{Lang, SourceLang};

/// Default endpoint when none is configured (a local llama.cpp server)
pub const DEFAULT_OPENAI_BASE: &str = "http://localhost:8080/v1";

/// OpenAI-compatible API translator
/// Works with: llama.cpp server, Ollama, DeepSeek, OpenAI, etc.
pub struct OpenAiTranslator {
    client: Client,
    /// Base URL for the API (e.g., "http://localhost:8080/v1")
    pub api_base: String,
    /// Optional API key for authentication
    pub api_key: Option<String>,
    /// Model identifier
    pub model: String,
    pub retry: RetryPolicy,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

impl OpenAiTranslator {
    pub fn new(
        api_base: String,
        api_key: Option<String>,
        model: String,
        timeout: Duration,
        retry: RetryPolicy,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::TranslationRequest(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_base,
            api_key,
            model,
            retry,
        })
    }

    /// Create translation prompt
    fn create_prompt(text: &str, source: &SourceLang, target: &Lang) -> String {
        let source_hint = source
            .lang()
            .map(|lang| format!(" from {}", language_name(lang)))
            .unwrap_or_default();
        format!(
            "Translate the following text{} into {}. Output only the translation, no explanations.\n\nText: \"{}\"",
            source_hint,
            language_name(target),
            text
        )
    }

    /// One chat-completions round trip
    async fn request(&self, text: &str, source: &SourceLang, target: &Lang) -> Result<String> {
        let url = format!("{}/chat/completions", self.api_base.trim_end_matches('/'));
        debug!("Translation request to {}", url);

        let request = ChatRequest {
            model: &self.model,
            messages: vec![Message {
                role: "user",
                content: Self::create_prompt(text, source, target),
            }],
            temperature: Some(0.3),
        };

        let mut req = self.client.post(&url).json(&request);
        if let Some(ref key) = self.api_key {
            req = req.header("Authorization", format!("Bearer {key}"));
        }

        let response = req.send().await.map_err(|e| {
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
            warn!("Rate limited, retry after {:?}s", retry_after);
            return Err(Error::TranslationRateLimited { retry_after });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("API error: {} - {}", status, body);
            return Err(Error::TranslationHttp {
                status: status.as_u16(),
                body,
            });
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::TranslationInvalidResponse(e.to_string()))?;
        let choice = chat
            .choices
            .first()
            .ok_or_else(|| Error::TranslationInvalidResponse("No choices in response".to_string()))?;

        let translated = strip_quotes(choice.message.content.trim());
        if translated.is_empty() {
            return Err(Error::TranslationEmpty);
        }
        Ok(translated.to_string())
    }
}

/// Models sometimes echo the quotes from the prompt back
fn strip_quotes(text: &str) -> &str {
    text.strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(text)
        .trim()
}

#[async_trait]
impl Translator for OpenAiTranslator {
    fn info(&self) -> TranslatorInfo {
        TranslatorInfo { name: "OpenAI Compatible" }
    }

    async fn translate(&self, text: &str, source: &SourceLang, target: &Lang) -> Result<String> {
        if text.trim().is_empty() {
            return Ok(text.to_string());
        }

        if source.lang() == Some(target) {
            return Ok(text.to_string());
        }

        self.retry.run(|| self.request(text, source, target)).await
    }
}

/// Convert language code to human-readable name for prompts
fn language_name(lang: &Lang) -> &'static str {
    match lang.as_str() {
        "en" => "English",
        "zh-CN" => "Simplified Chinese",
        "zh-TW" => "Traditional Chinese",
        "ja" => "Japanese",
        "ko" => "Korean",
        "es" => "Spanish",
        "fr" => "French",
        "de" => "German",
        "it" => "Italian",
        "pt" => "Portuguese",
        "ru" => "Russian",
        "ar" => "Arabic",
        "hi" => "Hindi",
        "th" => "Thai",
        "vi" => "Vietnamese",
        // For unknown languages, the LLM should still understand most ISO codes
        _ => "the specified language",
    }
}
