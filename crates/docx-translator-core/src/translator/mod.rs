mod google;
mod openai;
mod paragraph;
mod retry;
mod traits;

pub use google::{DEFAULT_GOOGLE_BASE, GoogleTranslator, MAX_TEXT_CHARS};
pub use openai::{DEFAULT_OPENAI_BASE, OpenAiTranslator};
pub use paragraph::{ParagraphTranslator, Progress, TranslationCache, TranslationReport};
pub use retry::RetryPolicy;
pub use traits::{Translator, TranslatorInfo};

use std::sync::Arc;
use std::time::Duration;

use crate::config::{TranslatorBackend, TranslatorConfig};
use crate::error::Result;

/// Create a translator from configuration
pub fn create_translator(config: &TranslatorConfig) -> Result<Arc<dyn Translator>> {
    let timeout = Duration::from_secs(config.timeout_secs);
    let retry = RetryPolicy::new(config.retry_count, config.retry_delay_ms);

    let translator: Arc<dyn Translator> = match config.backend {
        TranslatorBackend::Google => Arc::new(GoogleTranslator::new(
            config.api_base.clone(),
            timeout,
            retry,
        )?),
        TranslatorBackend::OpenAi => Arc::new(OpenAiTranslator::new(
            config
                .api_base
                .clone()
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE.to_string()),
            config.api_key.clone(),
            config.model.clone(),
            timeout,
            retry,
        )?),
    };

    tracing::debug!("Using translator backend: {}", translator.name());
    Ok(translator)
}
