//! DOCX Translator Core Library
//!
//! This library provides the core functionality for turning PDFs into
//! translated Word documents:
//! - PDF inspection (header check, page count)
//! - PDF → DOCX conversion and DOCX → PDF rendering via external tools
//! - Paragraph-level DOCX editing
//! - Translation via Google Translate or OpenAI-compatible APIs

pub mod config;
pub mod convert;
pub mod docx;
pub mod error;
pub mod language;
pub mod output_name;
pub mod page_range;
pub mod pdf;
pub mod pipeline;
pub mod translator;
pub mod util;

pub use config::{AppConfig, ConverterConfig, RendererConfig, TranslatorBackend, TranslatorConfig};
pub use convert::{DocumentRenderer, LibreOfficeRenderer, Pdf2DocxCommand, PdfConverter};
pub use docx::DocxDocument;
pub use error::{Error, Result};
pub use language::{DEFAULT_TARGET_LANG, Lang, LanguageCatalog, LanguageOption, SourceLang};
pub use output_name::OutputKind;
pub use page_range::{PageRange, ZeroBasedRange};
pub use pdf::PdfDocument;
pub use pipeline::{ConversionPipeline, ConversionRequest, OutputFile};
pub use translator::{
    GoogleTranslator, OpenAiTranslator, ParagraphTranslator, TranslationReport, Translator,
    TranslatorInfo, create_translator,
};
