//! One conversion run: PDF in, downloadable DOCX or PDF out.

use std::sync::Arc;

use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::convert::{DocumentRenderer, LibreOfficeRenderer, Pdf2DocxCommand, PdfConverter};
use crate::docx::DocxDocument;
use crate::error::{Error, Result};
use crate::language::{Lang, SourceLang};
use crate::output_name::{OutputKind, base_name};
use crate::page_range::PageRange;
use crate::pdf::{self, PdfDocument};
use crate::translator::{ParagraphTranslator, Progress, Translator, create_translator};
use crate::util::blocking;

/// Everything a user asks for in one run
#[derive(Debug, Clone)]
pub struct ConversionRequest {
    pub pdf: Vec<u8>,
    /// Name of the uploaded file, for the default output name
    pub upload_name: Option<String>,
    /// Requested output base name
    pub output_name: Option<String>,
    /// 1-based first page
    pub start_page: Option<u32>,
    /// 1-based last page
    pub end_page: Option<u32>,
    pub multi_processing: bool,
    pub translate: bool,
    pub source: SourceLang,
    pub target: Lang,
    /// Render the translated document to PDF
    pub to_pdf: bool,
}

impl ConversionRequest {
    /// Convert the whole PDF, no translation
    pub fn new(pdf: Vec<u8>, target: Lang) -> Self {
        Self {
            pdf,
            upload_name: None,
            output_name: None,
            start_page: None,
            end_page: None,
            multi_processing: false,
            translate: false,
            source: SourceLang::Auto,
            target,
            to_pdf: false,
        }
    }

    pub const fn kind(&self) -> OutputKind {
        OutputKind::for_request(self.translate, self.to_pdf)
    }
}

/// The finished download
#[derive(Debug, Clone)]
pub struct OutputFile {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub kind: OutputKind,
}

impl OutputFile {
    pub const fn mime(&self) -> &'static str {
        self.kind.mime()
    }
}

/// Converter, renderer and translator wired together
#[derive(Clone)]
pub struct ConversionPipeline {
    converter: Arc<dyn PdfConverter>,
    renderer: Arc<dyn DocumentRenderer>,
    translator: Arc<dyn Translator>,
}

impl ConversionPipeline {
    pub fn new(
        converter: Arc<dyn PdfConverter>,
        renderer: Arc<dyn DocumentRenderer>,
        translator: Arc<dyn Translator>,
    ) -> Self {
        Self {
            converter,
            renderer,
            translator,
        }
    }

    /// Build the external tools and translator named in the configuration
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Ok(Self::new(
            Arc::new(Pdf2DocxCommand::from_config(&config.converter)),
            Arc::new(LibreOfficeRenderer::from_config(&config.renderer)),
            create_translator(&config.translator)?,
        ))
    }

    /// Run one conversion to completion.
    ///
    /// Scratch files live in a temp dir that is removed when the run ends,
    /// whether it succeeds or not.
    pub async fn run(
        &self,
        request: ConversionRequest,
        progress: Option<Progress<'_>>,
    ) -> Result<OutputFile> {
        let job = Uuid::new_v4();
        let span = info_span!("conversion", job = %job);
        self.run_inner(request, progress).instrument(span).await
    }

    async fn run_inner(
        &self,
        request: ConversionRequest,
        progress: Option<Progress<'_>>,
    ) -> Result<OutputFile> {
        let pages = PageRange::new(request.start_page, request.end_page)?;
        let kind = request.kind();
        let file_name = kind.file_name(&base_name(
            request.output_name.as_deref(),
            request.upload_name.as_deref(),
        ));
        let upload_label = request
            .upload_name
            .clone()
            .unwrap_or_else(|| "upload".to_string());

        pdf::check_header(&request.pdf)?;
        let (pdf_bytes, inspected) = blocking(move || {
            let inspected = PdfDocument::from_bytes(&request.pdf);
            (request.pdf, inspected)
        })
        .await?;
        match inspected {
            Ok(pdf) => {
                pages.check_against(pdf.page_count())?;
                if pdf.is_encrypted() {
                    warn!("PDF is encrypted; conversion may fail");
                }
                info!(
                    "Converting {} ({} pages, {}) to {}",
                    upload_label,
                    pdf.page_count(),
                    pages,
                    file_name
                );
            }
            Err(e) => {
                warn!("Could not inspect PDF, passing it to the converter as is: {}", e);
                info!("Converting {} ({}) to {}", upload_label, pages, file_name);
            }
        }

        let work = tempfile::Builder::new()
            .prefix("docx-translator-")
            .tempdir()?;
        let input_path = work.path().join("input.pdf");
        let converted_path = work.path().join("converted.docx");
        tokio::fs::write(&input_path, &pdf_bytes).await?;
        drop(pdf_bytes);

        self.converter
            .convert(
                &input_path,
                &converted_path,
                pages.to_zero_based(),
                request.multi_processing,
            )
            .await?;

        let final_path = if request.translate {
            let translated_path = work.path().join("translated.docx");
            let document = {
                let path = converted_path.clone();
                blocking(move || DocxDocument::open(&path)).await??
            };
            let translator = ParagraphTranslator::new(
                self.translator.clone(),
                request.source,
                request.target,
            );
            info!(
                "Translating {} paragraphs into {} with {}",
                document.paragraph_count(),
                translator.target(),
                self.translator.name()
            );
            let (document, report) = translator.translate_document(document, progress).await?;
            info!("Translation finished: {}", report);
            {
                let path = translated_path.clone();
                blocking(move || document.save(&path)).await??;
            }

            if request.to_pdf {
                let pdf_path = work.path().join("output.pdf");
                self.renderer.render(&translated_path, &pdf_path).await?;
                pdf_path
            } else {
                translated_path
            }
        } else {
            if request.to_pdf {
                debug!("PDF rendering only applies to translated output; returning DOCX");
            }
            converted_path
        };

        let bytes = tokio::fs::read(&final_path).await?;
        if bytes.is_empty() {
            return Err(Error::Conversion(format!("{} is empty", final_path.display())));
        }

        info!("Produced {} ({} bytes)", file_name, bytes.len());
        Ok(OutputFile {
            bytes,
            file_name,
            kind,
        })
    }
}

impl std::fmt::Debug for ConversionPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversionPipeline")
            .field("translator", &self.translator.name())
            .finish_non_exhaustive()
    }
}
