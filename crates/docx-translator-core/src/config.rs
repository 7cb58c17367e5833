use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::language::{DEFAULT_TARGET_LANG, Lang, SourceLang};

/// Prefix for environment overrides, e.g. `DOCX_TRANSLATOR_TRANSLATOR__API_KEY`
pub const ENV_PREFIX: &str = "DOCX_TRANSLATOR";

/// Directory name under the user's config dir
const APP_DIR: &str = "docx-translator";

fn default_target_lang() -> Lang {
    Lang::new(DEFAULT_TARGET_LANG)
}

/// Which translation service to call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranslatorBackend {
    /// Public Google Translate web endpoint (no API key)
    #[default]
    Google,
    /// Any OpenAI-compatible chat completions API
    OpenAi,
}

/// Translator backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslatorConfig {
    #[serde(default)]
    pub backend: TranslatorBackend,
    /// Base URL; backend specific default when unset
    pub api_base: Option<String>,
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    /// Attempts per text, counting the first. Only transient failures are retried.
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    #[serde(default = "default_translator_timeout")]
    pub timeout_secs: u64,
}

fn default_model() -> String {
    "default_model".to_string()
}

const fn default_retry_count() -> u32 {
    1
}

const fn default_retry_delay_ms() -> u64 {
    1000
}

const fn default_translator_timeout() -> u64 {
    60
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            backend: TranslatorBackend::default(),
            api_base: None,
            api_key: None,
            model: default_model(),
            retry_count: default_retry_count(),
            retry_delay_ms: default_retry_delay_ms(),
            timeout_secs: default_translator_timeout(),
        }
    }
}

/// External PDF→DOCX converter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConverterConfig {
    #[serde(default = "default_converter_program")]
    pub program: PathBuf,
    #[serde(default = "default_converter_timeout")]
    pub timeout_secs: u64,
}

fn default_converter_program() -> PathBuf {
    PathBuf::from("pdf2docx")
}

const fn default_converter_timeout() -> u64 {
    600
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            program: default_converter_program(),
            timeout_secs: default_converter_timeout(),
        }
    }
}

/// External DOCX→PDF renderer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RendererConfig {
    #[serde(default = "default_renderer_program")]
    pub program: PathBuf,
    #[serde(default = "default_renderer_timeout")]
    pub timeout_secs: u64,
}

fn default_renderer_program() -> PathBuf {
    PathBuf::from("soffice")
}

const fn default_renderer_timeout() -> u64 {
    300
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            program: default_renderer_program(),
            timeout_secs: default_renderer_timeout(),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Source language (`auto` lets the backend detect it)
    #[serde(default)]
    pub source_lang: SourceLang,

    /// Target language preselected in the UI
    #[serde(default = "default_target_lang")]
    pub default_target_lang: Lang,

    #[serde(default)]
    pub translator: TranslatorConfig,

    #[serde(default)]
    pub converter: ConverterConfig,

    #[serde(default)]
    pub renderer: RendererConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            source_lang: SourceLang::Auto,
            default_target_lang: default_target_lang(),
            translator: TranslatorConfig::default(),
            converter: ConverterConfig::default(),
            renderer: RendererConfig::default(),
        }
    }
}

impl AppConfig {
    /// Parse configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| Error::ConfigLoad(format!("Failed to parse config: {e}")))
    }

    /// Find the config file to use: `~/.config/docx-translator/config.toml`,
    /// then `./config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        let user_config = crate::util::config_dir()
            .map(|dir| dir.join(APP_DIR).join("config.toml"))
            .filter(|p| p.exists());

        user_config.or_else(|| {
            let local = PathBuf::from("config.toml");
            local.exists().then_some(local)
        })
    }

    /// Load from default locations, falling back to defaults on any error.
    pub fn load() -> Self {
        match Self::load_layered(None) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("{}; using defaults", e);
                Self::default()
            }
        }
    }

    /// Build the configuration from defaults, a TOML file (explicit or found
    /// via [`AppConfig::default_path`]) and `DOCX_TRANSLATOR_*` environment
    /// variables, later sources winning.
    pub fn load_layered(explicit: Option<&Path>) -> Result<Self> {
        let defaults = config::Config::try_from(&Self::default())
            .map_err(|e| Error::ConfigLoad(e.to_string()))?;

        let mut builder = config::Config::builder().add_source(defaults);

        match explicit.map(Path::to_path_buf).or_else(Self::default_path) {
            Some(path) => {
                if explicit.is_some() && !path.exists() {
                    return Err(Error::ConfigLoad(format!(
                        "config file {} does not exist",
                        path.display()
                    )));
                }
                tracing::debug!("Loading config from {}", path.display());
                builder = builder.add_source(
                    config::File::from(path).format(config::FileFormat::Toml),
                );
            }
            None => tracing::debug!("No config file found, using defaults"),
        }

        builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .and_then(|c| c.try_deserialize::<Self>())
            .map_err(|e| Error::ConfigLoad(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert!(config.source_lang.is_auto());
        assert_eq!(config.default_target_lang.as_str(), "zh-TW");
        assert_eq!(config.translator.backend, TranslatorBackend::Google);
        assert_eq!(config.translator.retry_count, 1);
        assert_eq!(config.converter.program, PathBuf::from("pdf2docx"));
        assert_eq!(config.renderer.program, PathBuf::from("soffice"));
    }

    #[test]
    fn test_partial_toml() {
        let config = AppConfig::from_toml(
            r#"
            source_lang = "en"
            default_target_lang = "fr"

            [translator]
            backend = "openai"
            api_base = "http://localhost:8080/v1"
            retry_count = 3
            "#,
        )
        .unwrap();

        assert_eq!(config.source_lang, SourceLang::Code(Lang::new("en")));
        assert_eq!(config.default_target_lang.as_str(), "fr");
        assert_eq!(config.translator.backend, TranslatorBackend::OpenAi);
        assert_eq!(config.translator.retry_count, 3);
        assert_eq!(config.translator.timeout_secs, 60);
        assert_eq!(config.converter.timeout_secs, 600);
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            AppConfig::from_toml("source_lang = ["),
            Err(Error::ConfigLoad(_))
        ));
    }
}
