use anyhow::{Context, Result};
use docx_translator_core::{AppConfig, ConversionPipeline, LanguageCatalog};

/// A target language as offered in the form
#[derive(Debug, Clone, serde::Serialize)]
pub struct LanguageChoice {
    pub name: &'static str,
    pub code: &'static str,
    pub selected: bool,
}

/// Global application state, read-only once the server is running
pub struct AppState {
    pub config: AppConfig,
    pub catalog: LanguageCatalog,
    pub pipeline: ConversionPipeline,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self> {
        let pipeline =
            ConversionPipeline::from_config(&config).context("Failed to create translator")?;
        Ok(Self::from_parts(config, LanguageCatalog::google(), pipeline))
    }

    pub const fn from_parts(
        config: AppConfig,
        catalog: LanguageCatalog,
        pipeline: ConversionPipeline,
    ) -> Self {
        Self {
            config,
            catalog,
            pipeline,
        }
    }

    /// Code of the preselected target language
    pub fn default_target(&self) -> Option<&'static str> {
        self.catalog
            .default_target(&self.config.default_target_lang)
            .map(|option| option.code)
    }

    /// Catalog entries with the default target marked
    pub fn language_choices(&self) -> Vec<LanguageChoice> {
        let default = self.default_target();
        self.catalog
            .options()
            .iter()
            .map(|option| LanguageChoice {
                name: option.name,
                code: option.code,
                selected: Some(option.code) == default,
            })
            .collect()
    }
}
