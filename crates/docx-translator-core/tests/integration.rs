//! Integration tests for docx-translator-core
//!
//! These tests verify the end-to-end workflow with stand-ins for the
//! external tools:
//! - PDF inspection on generated documents
//! - Paragraph translation of real DOCX packages
//! - The conversion pipeline (page ranges, output kinds, names)

use std::io::Cursor;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use docx_rs::{Docx, Paragraph, Run, Table, TableCell, TableRow};
use docx_translator_core::{
    ConversionPipeline, ConversionRequest, DocumentRenderer, DocxDocument, Error, Lang,
    OutputKind, ParagraphTranslator, PdfConverter, PdfDocument, Result, SourceLang, Translator,
    TranslatorInfo, ZeroBasedRange,
};
use lopdf::{Document, Object, Stream, dictionary};

// =============================================================================
// Mock Translator for Testing
// =============================================================================

/// A mock translator with a fixed vocabulary; unknown text fails.
struct MockTranslator {
    vocabulary: Vec<(&'static str, &'static str)>,
    /// Simulate failure if true
    should_fail: bool,
    calls: AtomicUsize,
}

impl MockTranslator {
    fn new() -> Self {
        Self {
            vocabulary: vec![("Hello", "Bonjour"), ("World", "Monde")],
            should_fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::new()
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Translator for MockTranslator {
    fn info(&self) -> TranslatorInfo {
        TranslatorInfo { name: "mock" }
    }

    async fn translate(&self, text: &str, _source: &SourceLang, _target: &Lang) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.should_fail {
            return Err(Error::TranslationRequest("Mock translation failure".to_string()));
        }
        self.vocabulary
            .iter()
            .find(|(from, _)| *from == text)
            .map(|(_, to)| (*to).to_string())
            .ok_or(Error::TranslationEmpty)
    }
}

// =============================================================================
// Stub External Tools
// =============================================================================

/// Writes a fixed DOCX instead of running pdf2docx
struct StubConverter {
    docx: Vec<u8>,
    ranges: Mutex<Vec<ZeroBasedRange>>,
}

impl StubConverter {
    fn new(docx: Vec<u8>) -> Self {
        Self {
            docx,
            ranges: Mutex::new(Vec::new()),
        }
    }

    fn ranges(&self) -> Vec<ZeroBasedRange> {
        self.ranges.lock().unwrap().clone()
    }
}

#[async_trait]
impl PdfConverter for StubConverter {
    async fn convert(
        &self,
        pdf: &Path,
        docx: &Path,
        pages: ZeroBasedRange,
        _multi_processing: bool,
    ) -> Result<()> {
        assert!(pdf.exists(), "input PDF must be written before conversion");
        self.ranges.lock().unwrap().push(pages);
        std::fs::write(docx, &self.docx)?;
        Ok(())
    }
}

/// Writes a placeholder PDF instead of running LibreOffice
#[derive(Default)]
struct StubRenderer {
    calls: AtomicUsize,
}

#[async_trait]
impl DocumentRenderer for StubRenderer {
    async fn render(&self, docx: &Path, pdf: &Path) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        DocxDocument::open(docx)?;
        std::fs::write(pdf, b"%PDF-1.4\n% rendered\n")?;
        Ok(())
    }
}

// =============================================================================
// Test Fixtures
// =============================================================================

/// A blank PDF with `pages` pages
fn make_pdf(pages: usize) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let kids: Vec<Object> = (0..pages)
        .map(|_| {
            let content_id = doc.add_object(Stream::new(dictionary! {}, b"BT ET".to_vec()));
            doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            })
            .into()
        })
        .collect();

    let count = i64::try_from(pages).unwrap();
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

fn text_paragraph(text: &str) -> Paragraph {
    Paragraph::new().add_run(Run::new().add_text(text))
}

/// Body paragraphs "Hello", "  Hello  ", "" and a one-cell table with "World"
fn make_docx() -> Vec<u8> {
    let table = Table::new(vec![TableRow::new(vec![
        TableCell::new().add_paragraph(text_paragraph("World")),
    ])]);

    let mut buf = Cursor::new(Vec::new());
    Docx::new()
        .add_paragraph(text_paragraph("Hello"))
        .add_paragraph(text_paragraph("  Hello  "))
        .add_paragraph(Paragraph::new())
        .add_table(table)
        .build()
        .pack(&mut buf)
        .unwrap();
    buf.into_inner()
}

struct Harness {
    pipeline: ConversionPipeline,
    converter: Arc<StubConverter>,
    renderer: Arc<StubRenderer>,
    translator: Arc<MockTranslator>,
}

fn harness(translator: MockTranslator) -> Harness {
    let converter = Arc::new(StubConverter::new(make_docx()));
    let renderer = Arc::new(StubRenderer::default());
    let translator = Arc::new(translator);
    let pipeline = ConversionPipeline::new(converter.clone(), renderer.clone(), translator.clone());
    Harness {
        pipeline,
        converter,
        renderer,
        translator,
    }
}

fn request(pages: usize) -> ConversionRequest {
    let mut request = ConversionRequest::new(make_pdf(pages), Lang::new("fr"));
    request.upload_name = Some("report.pdf".to_string());
    request
}

// =============================================================================
// PDF Inspection Tests
// =============================================================================

#[test]
fn test_pdf_page_count() {
    let pdf = PdfDocument::from_bytes(&make_pdf(3)).unwrap();
    assert_eq!(pdf.page_count(), 3);
    assert!(!pdf.is_encrypted());
}

#[test]
fn test_invalid_pdf_bytes() {
    let err = PdfDocument::from_bytes(b"not a pdf").unwrap_err();
    assert!(matches!(err, Error::PdfOpen(_)));
    assert!(err.is_user_error());
}

// =============================================================================
// DOCX Paragraph Tests
// =============================================================================

#[test]
fn test_docx_paragraph_order() {
    let doc = DocxDocument::from_bytes(&make_docx()).unwrap();
    assert_eq!(doc.paragraph_texts(), ["Hello", "  Hello  ", "", "World"]);
}

#[test]
fn test_docx_write_and_reopen() {
    let mut doc = DocxDocument::from_bytes(&make_docx()).unwrap();
    let texts: Vec<String> = ["Un", "Deux", "", "Trois"].iter().map(ToString::to_string).collect();
    assert_eq!(doc.set_paragraph_texts(&texts).unwrap(), 3);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.docx");
    doc.save(&path).unwrap();

    let reopened = DocxDocument::open(&path).unwrap();
    assert_eq!(reopened.paragraph_texts(), texts);
}

#[tokio::test]
async fn test_translate_document_with_mock() {
    let backend = Arc::new(MockTranslator::new());
    let translator = ParagraphTranslator::new(backend.clone(), SourceLang::Auto, Lang::new("fr"));

    let doc = DocxDocument::from_bytes(&make_docx()).unwrap();
    let (doc, report) = translator.translate_document(doc, None).await.unwrap();

    assert_eq!(doc.paragraph_texts(), ["Bonjour", "  Bonjour  ", "", "Monde"]);
    assert_eq!(backend.calls(), 2);
    assert_eq!(report.translated, 2);
    assert_eq!(report.reused, 1);
    assert_eq!(report.blank, 1);
    assert_eq!(report.rewritten, 3);
}

#[tokio::test]
async fn test_translation_error_handling() {
    let backend = Arc::new(MockTranslator::failing());
    let translator = ParagraphTranslator::new(backend.clone(), SourceLang::Auto, Lang::new("fr"));

    let doc = DocxDocument::from_bytes(&make_docx()).unwrap();
    let (doc, report) = translator.translate_document(doc, None).await.unwrap();

    // Failures keep the original text and are not cached
    assert_eq!(doc.paragraph_texts(), ["Hello", "  Hello  ", "", "World"]);
    assert_eq!(backend.calls(), 3);
    assert_eq!(report.failed, 3);
    assert_eq!(report.rewritten, 0);
}

// =============================================================================
// Pipeline Tests
// =============================================================================

#[tokio::test]
async fn test_invalid_page_range_stops_before_conversion() {
    let h = harness(MockTranslator::new());
    let mut req = request(5);
    req.start_page = Some(4);
    req.end_page = Some(2);

    let err = h.pipeline.run(req, None).await.unwrap_err();
    assert!(matches!(err, Error::InvalidPageRange { start: 4, end: 2 }));
    assert!(h.converter.ranges().is_empty());
}

#[tokio::test]
async fn test_start_page_past_end_of_document() {
    let h = harness(MockTranslator::new());
    let mut req = request(2);
    req.start_page = Some(3);

    let err = h.pipeline.run(req, None).await.unwrap_err();
    assert!(matches!(err, Error::PageOutOfRange { page: 3, total: 2 }));
    assert!(err.is_user_error());
    assert!(h.converter.ranges().is_empty());
}

#[tokio::test]
async fn test_bytes_before_pdf_header_are_accepted() {
    let h = harness(MockTranslator::new());
    let mut pdf = b"\xEF\xBB\xBF\n".to_vec();
    pdf.extend_from_slice(&make_pdf(2));
    let mut req = request(2);
    req.pdf = pdf;

    let out = h.pipeline.run(req, None).await.unwrap();

    assert_eq!(out.kind, OutputKind::Docx);
    assert_eq!(h.converter.ranges().len(), 1);
}

#[tokio::test]
async fn test_unparseable_pdf_is_left_to_the_converter() {
    let h = harness(MockTranslator::new());
    let mut req = request(1);
    req.pdf = b"%PDF-1.7\n%not really a pdf body".to_vec();
    req.start_page = Some(9);

    let out = h.pipeline.run(req, None).await.unwrap();

    assert_eq!(out.file_name, "report.docx");
    assert_eq!(
        h.converter.ranges(),
        [ZeroBasedRange {
            start: Some(8),
            end: None
        }]
    );
}

#[tokio::test]
async fn test_non_pdf_upload_is_rejected() {
    let h = harness(MockTranslator::new());
    let mut req = request(1);
    req.pdf = b"hello".to_vec();

    let err = h.pipeline.run(req, None).await.unwrap_err();
    assert!(matches!(err, Error::PdfOpen(_)));
    assert!(h.converter.ranges().is_empty());
}

#[tokio::test]
async fn test_plain_conversion() {
    let h = harness(MockTranslator::new());
    let mut req = request(3);
    req.start_page = Some(1);
    req.end_page = Some(2);

    let out = h.pipeline.run(req, None).await.unwrap();

    assert_eq!(out.kind, OutputKind::Docx);
    assert_eq!(out.file_name, "report.docx");
    assert_eq!(out.bytes, h.converter.docx);
    assert_eq!(
        h.converter.ranges(),
        [ZeroBasedRange {
            start: Some(0),
            end: Some(1)
        }]
    );
    assert_eq!(h.translator.calls(), 0);
}

#[tokio::test]
async fn test_translated_conversion() {
    let h = harness(MockTranslator::new());
    let mut req = request(1);
    req.translate = true;
    req.output_name = Some("final.docx".to_string());

    let out = h.pipeline.run(req, None).await.unwrap();

    assert_eq!(out.kind, OutputKind::TranslatedDocx);
    assert_eq!(out.file_name, "final_translated.docx");
    let doc = DocxDocument::from_bytes(&out.bytes).unwrap();
    assert_eq!(doc.paragraph_texts(), ["Bonjour", "  Bonjour  ", "", "Monde"]);
    assert_eq!(h.renderer.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_translated_pdf_output() {
    let h = harness(MockTranslator::new());
    let mut req = request(1);
    req.translate = true;
    req.to_pdf = true;

    let out = h.pipeline.run(req, None).await.unwrap();

    assert_eq!(out.kind, OutputKind::Pdf);
    assert_eq!(out.file_name, "report.pdf");
    assert_eq!(out.mime(), "application/pdf");
    assert!(out.bytes.starts_with(b"%PDF"));
    assert_eq!(h.renderer.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_pdf_output_requires_translation() {
    let h = harness(MockTranslator::new());
    let mut req = request(1);
    req.to_pdf = true;

    let out = h.pipeline.run(req, None).await.unwrap();

    assert_eq!(out.kind, OutputKind::Docx);
    assert_eq!(h.renderer.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_failing_translator_still_produces_output() {
    let h = harness(MockTranslator::failing());
    let mut req = request(1);
    req.translate = true;

    let out = h.pipeline.run(req, None).await.unwrap();

    let doc = DocxDocument::from_bytes(&out.bytes).unwrap();
    assert_eq!(doc.paragraph_texts(), ["Hello", "  Hello  ", "", "World"]);
}

#[tokio::test]
async fn test_progress_callback() {
    let h = harness(MockTranslator::new());
    let mut req = request(1);
    req.translate = true;

    let last = Mutex::new((0, 0));
    let progress = |done: usize, total: usize| *last.lock().unwrap() = (done, total);
    h.pipeline.run(req, Some(&progress)).await.unwrap();

    assert_eq!(*last.lock().unwrap(), (4, 4));
}
