use async_trait::async_trait;

use crate::error::Result;
use crate::language::{Lang, SourceLang};

/// Information about a translator backend
#[derive(Debug, Clone)]
pub struct TranslatorInfo {
    /// Human-readable name
    pub name: &'static str,
}

/// Trait for translation backends
#[async_trait]
pub trait Translator: Send + Sync {
    /// Get information about this translator
    fn info(&self) -> TranslatorInfo;

    /// Get the translator name (convenience method)
    fn name(&self) -> &'static str {
        self.info().name
    }

    /// Translate one piece of text into `target`
    async fn translate(&self, text: &str, source: &SourceLang, target: &Lang) -> Result<String>;
}
