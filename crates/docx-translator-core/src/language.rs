//! Language codes, the `auto` source sentinel and the language catalog.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Language code as understood by the translation backend (e.g. "en", "zh-TW")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Lang(pub String);

impl Lang {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Lang {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Lang {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Lang {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Source language of a translation: detected by the backend, or explicit.
///
/// Serialized as the plain code, with `"auto"` for [`SourceLang::Auto`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SourceLang {
    #[default]
    Auto,
    Code(Lang),
}

impl SourceLang {
    pub const AUTO: &'static str = "auto";

    /// Code to send to backends that take a source parameter.
    pub fn code(&self) -> &str {
        match self {
            Self::Auto => Self::AUTO,
            Self::Code(lang) => lang.as_str(),
        }
    }

    pub const fn is_auto(&self) -> bool {
        matches!(self, Self::Auto)
    }

    /// The explicit language, if any.
    pub const fn lang(&self) -> Option<&Lang> {
        match self {
            Self::Auto => None,
            Self::Code(lang) => Some(lang),
        }
    }
}

impl From<String> for SourceLang {
    fn from(s: String) -> Self {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(Self::AUTO) {
            Self::Auto
        } else {
            Self::Code(Lang::new(trimmed))
        }
    }
}

impl From<SourceLang> for String {
    fn from(s: SourceLang) -> Self {
        s.code().to_string()
    }
}

impl FromStr for SourceLang {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::from(s.to_string()))
    }
}

impl fmt::Display for SourceLang {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One selectable language
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LanguageOption {
    /// Display name (e.g., "english", "chinese (traditional)")
    pub name: &'static str,
    /// Backend code (e.g., "en", "zh-TW")
    pub code: &'static str,
}

/// Catalog of target languages a translator supports.
///
/// Passed around as a value so front ends and tests never depend on
/// process-wide state.
#[derive(Debug, Clone)]
pub struct LanguageCatalog {
    options: Vec<LanguageOption>,
}

impl LanguageCatalog {
    pub fn new(mut options: Vec<LanguageOption>) -> Self {
        options.sort_by(|a, b| a.name.cmp(b.name));
        Self { options }
    }

    /// Languages supported by Google Translate.
    pub fn google() -> Self {
        Self::new(
            GOOGLE_LANGUAGES
                .iter()
                .map(|&(name, code)| LanguageOption { name, code })
                .collect(),
        )
    }

    /// All options, sorted by display name.
    pub fn options(&self) -> &[LanguageOption] {
        &self.options
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Find a language by its code, ignoring ASCII case.
    pub fn by_code(&self, code: &str) -> Option<&LanguageOption> {
        self.options
            .iter()
            .find(|o| o.code.eq_ignore_ascii_case(code.trim()))
    }

    /// Find a language by its display name, ignoring ASCII case.
    pub fn by_name(&self, name: &str) -> Option<&LanguageOption> {
        self.options
            .iter()
            .find(|o| o.name.eq_ignore_ascii_case(name.trim()))
    }

    /// Resolve user input (a code or a display name) to a catalog language.
    pub fn resolve(&self, input: &str) -> Result<Lang> {
        self.by_code(input)
            .or_else(|| self.by_name(input))
            .map(|o| Lang::new(o.code))
            .ok_or_else(|| Error::UnknownLanguage(input.to_string()))
    }

    /// Default target language: `preferred` if the catalog has it, else the
    /// first language by name.
    pub fn default_target(&self, preferred: &Lang) -> Option<&LanguageOption> {
        self.by_code(preferred.as_str()).or_else(|| self.options.first())
    }
}

impl Default for LanguageCatalog {
    fn default() -> Self {
        Self::google()
    }
}

/// Default target language code
pub const DEFAULT_TARGET_LANG: &str = "zh-TW";

const GOOGLE_LANGUAGES: &[(&str, &str)] = &[
    ("afrikaans", "af"),
    ("albanian", "sq"),
    ("amharic", "am"),
    ("arabic", "ar"),
    ("armenian", "hy"),
    ("assamese", "as"),
    ("aymara", "ay"),
    ("azerbaijani", "az"),
    ("bambara", "bm"),
    ("basque", "eu"),
    ("belarusian", "be"),
    ("bengali", "bn"),
    ("bhojpuri", "bho"),
    ("bosnian", "bs"),
    ("bulgarian", "bg"),
    ("catalan", "ca"),
    ("cebuano", "ceb"),
    ("chichewa", "ny"),
    ("chinese (simplified)", "zh-CN"),
    ("chinese (traditional)", "zh-TW"),
    ("corsican", "co"),
    ("croatian", "hr"),
    ("czech", "cs"),
    ("danish", "da"),
    ("dhivehi", "dv"),
    ("dogri", "doi"),
    ("dutch", "nl"),
    ("english", "en"),
    ("esperanto", "eo"),
    ("estonian", "et"),
    ("ewe", "ee"),
    ("filipino", "tl"),
    ("finnish", "fi"),
    ("french", "fr"),
    ("frisian", "fy"),
    ("galician", "gl"),
    ("georgian", "ka"),
    ("german", "de"),
    ("greek", "el"),
    ("guarani", "gn"),
    ("gujarati", "gu"),
    ("haitian creole", "ht"),
    ("hausa", "ha"),
    ("hawaiian", "haw"),
    ("hebrew", "iw"),
    ("hindi", "hi"),
    ("hmong", "hmn"),
    ("hungarian", "hu"),
    ("icelandic", "is"),
    ("igbo", "ig"),
    ("ilocano", "ilo"),
    ("indonesian", "id"),
    ("irish", "ga"),
    ("italian", "it"),
    ("japanese", "ja"),
    ("javanese", "jw"),
    ("kannada", "kn"),
    ("kazakh", "kk"),
    ("khmer", "km"),
    ("kinyarwanda", "rw"),
    ("konkani", "gom"),
    ("korean", "ko"),
    ("krio", "kri"),
    ("kurdish (kurmanji)", "ku"),
    ("kurdish (sorani)", "ckb"),
    ("kyrgyz", "ky"),
    ("lao", "lo"),
    ("latin", "la"),
    ("latvian", "lv"),
    ("lingala", "ln"),
    ("lithuanian", "lt"),
    ("luganda", "lg"),
    ("luxembourgish", "lb"),
    ("macedonian", "mk"),
    ("maithili", "mai"),
    ("malagasy", "mg"),
    ("malay", "ms"),
    ("malayalam", "ml"),
    ("maltese", "mt"),
    ("maori", "mi"),
    ("marathi", "mr"),
    ("meiteilon (manipuri)", "mni-Mtei"),
    ("mizo", "lus"),
    ("mongolian", "mn"),
    ("myanmar", "my"),
    ("nepali", "ne"),
    ("norwegian", "no"),
    ("odia (oriya)", "or"),
    ("oromo", "om"),
    ("pashto", "ps"),
    ("persian", "fa"),
    ("polish", "pl"),
    ("portuguese", "pt"),
    ("punjabi", "pa"),
    ("quechua", "qu"),
    ("romanian", "ro"),
    ("russian", "ru"),
    ("samoan", "sm"),
    ("sanskrit", "sa"),
    ("scots gaelic", "gd"),
    ("sepedi", "nso"),
    ("serbian", "sr"),
    ("sesotho", "st"),
    ("shona", "sn"),
    ("sindhi", "sd"),
    ("sinhala", "si"),
    ("slovak", "sk"),
    ("slovenian", "sl"),
    ("somali", "so"),
    ("spanish", "es"),
    ("sundanese", "su"),
    ("swahili", "sw"),
    ("swedish", "sv"),
    ("tajik", "tg"),
    ("tamil", "ta"),
    ("tatar", "tt"),
    ("telugu", "te"),
    ("thai", "th"),
    ("tigrinya", "ti"),
    ("tsonga", "ts"),
    ("turkish", "tr"),
    ("turkmen", "tk"),
    ("twi", "ak"),
    ("ukrainian", "uk"),
    ("urdu", "ur"),
    ("uyghur", "ug"),
    ("uzbek", "uz"),
    ("vietnamese", "vi"),
    ("welsh", "cy"),
    ("xhosa", "xh"),
    ("yiddish", "yi"),
    ("yoruba", "yo"),
    ("zulu", "zu"),
];
