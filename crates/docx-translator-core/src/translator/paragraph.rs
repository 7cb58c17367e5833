//! Paragraph-by-paragraph translation with a per-run cache and fallback.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use super::traits::Translator;
use crate::docx::DocxDocument;
use crate::error::Result;
use crate::language::{Lang, SourceLang};
use crate::util::{blocking, preview};

/// Characters of a failed paragraph shown in the log
const PREVIEW_CHARS: usize = 50;

/// Progress callback: `(paragraphs done, paragraphs total)`
pub type Progress<'a> = &'a (dyn Fn(usize, usize) + Send + Sync);

/// Translations of trimmed paragraph text, valid for one operation only
#[derive(Debug, Default)]
pub struct TranslationCache {
    entries: HashMap<String, String>,
}

impl TranslationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, trimmed: &str) -> Option<&str> {
        self.entries.get(trimmed).map(String::as_str)
    }

    pub fn insert(&mut self, trimmed: String, translated: String) {
        self.entries.insert(trimmed, translated);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Outcome counts of one translation operation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TranslationReport {
    pub paragraphs: usize,
    /// Empty or whitespace-only, left as is
    pub blank: usize,
    /// Translated by a backend call
    pub translated: usize,
    /// Served from the cache
    pub reused: usize,
    /// Kept in the original language after a failed or empty translation
    pub failed: usize,
    /// Paragraphs written back into the document
    pub rewritten: usize,
}

impl std::fmt::Display for TranslationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} paragraphs: {} translated, {} reused, {} blank, {} kept after failure",
            self.paragraphs, self.translated, self.reused, self.blank, self.failed
        )
    }
}

/// Translates document paragraphs one at a time.
///
/// Each distinct trimmed text goes to the backend at most once per
/// operation. A failed or empty translation keeps the original paragraph.
pub struct ParagraphTranslator {
    translator: Arc<dyn Translator>,
    source: SourceLang,
    target: Lang,
}

impl ParagraphTranslator {
    pub fn new(translator: Arc<dyn Translator>, source: SourceLang, target: Lang) -> Self {
        Self {
            translator,
            source,
            target,
        }
    }

    pub const fn target(&self) -> &Lang {
        &self.target
    }

    /// Translate a sequence of paragraph texts, preserving count and order.
    pub async fn translate_texts(
        &self,
        texts: &[String],
        progress: Option<Progress<'_>>,
    ) -> (Vec<String>, TranslationReport) {
        let mut cache = TranslationCache::new();
        let mut report = TranslationReport {
            paragraphs: texts.len(),
            ..TranslationReport::default()
        };

        let mut out = Vec::with_capacity(texts.len());
        for (i, text) in texts.iter().enumerate() {
            out.push(self.translate_one(text, &mut cache, &mut report).await);
            if let Some(progress) = progress {
                progress(i + 1, texts.len());
            }
        }

        debug!("Translation cache held {} entries", cache.len());
        (out, report)
    }

    /// Translate every paragraph of a document.
    ///
    /// Reading and rewriting the XML tree happen on the blocking pool; only
    /// the backend calls run on the async side.
    pub async fn translate_document(
        &self,
        document: DocxDocument,
        progress: Option<Progress<'_>>,
    ) -> Result<(DocxDocument, TranslationReport)> {
        let (document, texts) = blocking(move || {
            let texts = document.paragraph_texts();
            (document, texts)
        })
        .await?;

        let (translated, mut report) = self.translate_texts(&texts, progress).await;

        let (document, rewritten) = blocking(move || {
            let mut document = document;
            document
                .set_paragraph_texts(&translated)
                .map(|rewritten| (document, rewritten))
        })
        .await??;
        report.rewritten = rewritten;
        Ok((document, report))
    }

    async fn translate_one(
        &self,
        text: &str,
        cache: &mut TranslationCache,
        report: &mut TranslationReport,
    ) -> String {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            report.blank += 1;
            return text.to_string();
        }

        let translated = if let Some(hit) = cache.get(trimmed) {
            report.reused += 1;
            hit.to_string()
        } else {
            match self
                .translator
                .translate(trimmed, &self.source, &self.target)
                .await
            {
                Ok(result) if !result.is_empty() => {
                    cache.insert(trimmed.to_string(), result.clone());
                    report.translated += 1;
                    result
                }
                Ok(_) => {
                    warn!(
                        "Empty translation for paragraph: '{}...'",
                        preview(trimmed, PREVIEW_CHARS)
                    );
                    report.failed += 1;
                    return text.to_string();
                }
                Err(e) => {
                    warn!(
                        "Translation error for paragraph: '{}...' - {}",
                        preview(trimmed, PREVIEW_CHARS),
                        e
                    );
                    report.failed += 1;
                    return text.to_string();
                }
            }
        };

        pad_like(text, &translated)
    }
}

/// Surround `translated` with as many ASCII spaces as `original` has on
/// each side.
fn pad_like(original: &str, translated: &str) -> String {
    let leading = original.len() - original.trim_start_matches(' ').len();
    let trailing = original.len() - original.trim_end_matches(' ').len();
    format!(
        "{}{}{}",
        " ".repeat(leading),
        translated,
        " ".repeat(trailing)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::translator::TranslatorInfo;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Looks texts up in a fixed table; unknown texts fail
    struct TableTranslator {
        table: HashMap<&'static str, &'static str>,
        calls: Mutex<Vec<String>>,
    }

    impl TableTranslator {
        fn new(pairs: &[(&'static str, &'static str)]) -> Self {
            Self {
                table: pairs.iter().copied().collect(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Translator for TableTranslator {
        fn info(&self) -> TranslatorInfo {
            TranslatorInfo { name: "Table" }
        }

        async fn translate(&self, text: &str, _: &SourceLang, _: &Lang) -> Result<String> {
            self.calls.lock().unwrap().push(text.to_string());
            self.table
                .get(text)
                .map(|t| (*t).to_string())
                .ok_or_else(|| Error::TranslationRequest(format!("no entry for {text}")))
        }
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    async fn run(
        backend: &Arc<TableTranslator>,
        texts: &[&str],
    ) -> (Vec<String>, TranslationReport) {
        let translator =
            ParagraphTranslator::new(backend.clone(), SourceLang::Auto, Lang::new("fr"));
        translator.translate_texts(&strings(texts), None).await
    }

    #[tokio::test]
    async fn test_cache_and_padding() {
        let backend = Arc::new(TableTranslator::new(&[("Hello", "Bonjour"), ("World", "Monde")]));
        let (out, report) = run(&backend, &["Hello", "  Hello  ", "", "World"]).await;

        assert_eq!(out, ["Bonjour", "  Bonjour  ", "", "Monde"]);
        assert_eq!(backend.calls(), ["Hello", "World"]);
        assert_eq!(report.translated, 2);
        assert_eq!(report.reused, 1);
        assert_eq!(report.blank, 1);
        assert_eq!(report.failed, 0);
    }

    #[tokio::test]
    async fn test_blank_paragraphs_untouched() {
        let backend = Arc::new(TableTranslator::new(&[]));
        let (out, _) = run(&backend, &["", "   ", "\t\n"]).await;

        assert_eq!(out, ["", "   ", "\t\n"]);
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_failure_keeps_original_and_is_not_cached() {
        let backend = Arc::new(TableTranslator::new(&[]));
        let (out, report) = run(&backend, &[" Hola ", "Hola"]).await;

        assert_eq!(out, [" Hola ", "Hola"]);
        assert_eq!(backend.calls(), ["Hola", "Hola"]);
        assert_eq!(report.failed, 2);
    }

    #[tokio::test]
    async fn test_empty_result_counts_as_failure() {
        let backend = Arc::new(TableTranslator::new(&[("Hello", "")]));
        let (out, report) = run(&backend, &["Hello", "Hello"]).await;

        assert_eq!(out, ["Hello", "Hello"]);
        assert_eq!(backend.calls().len(), 2);
        assert_eq!(report.failed, 2);
    }

    #[tokio::test]
    async fn test_whitespace_result_is_kept_and_cached() {
        let backend = Arc::new(TableTranslator::new(&[("Hi", " ")]));
        let (out, report) = run(&backend, &["Hi", "Hi"]).await;

        assert_eq!(out, [" ", " "]);
        assert_eq!(backend.calls(), ["Hi"]);
        assert_eq!(report.translated, 1);
        assert_eq!(report.reused, 1);
        assert_eq!(report.failed, 0);
    }

    #[tokio::test]
    async fn test_only_spaces_are_reapplied() {
        let backend = Arc::new(TableTranslator::new(&[("Hello", "Bonjour")]));
        let (out, _) = run(&backend, &["\t Hello \n"]).await;

        assert_eq!(out, ["Bonjour"]);
    }

    #[tokio::test]
    async fn test_progress_reports_every_paragraph() {
        let backend = Arc::new(TableTranslator::new(&[("a", "b")]));
        let translator = ParagraphTranslator::new(backend, SourceLang::Auto, Lang::new("fr"));
        let seen = Mutex::new(Vec::new());
        let progress = |done: usize, total: usize| seen.lock().unwrap().push((done, total));

        translator
            .translate_texts(&strings(&["a", "", "a"]), Some(&progress))
            .await;

        assert_eq!(*seen.lock().unwrap(), [(1, 3), (2, 3), (3, 3)]);
    }

    #[test]
    fn test_pad_like() {
        assert_eq!(pad_like("  x ", "y"), "  y ");
        assert_eq!(pad_like("x", "y"), "y");
    }
}
