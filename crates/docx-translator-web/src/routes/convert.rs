//! Convert route - multipart upload in, DOCX or PDF out.

use axum::{
    body::Body,
    extract::State,
    http::{StatusCode, header},
    response::Response,
};
use axum_extra::extract::Multipart;
use bytes::Bytes;
use docx_translator_core::{ConversionRequest, LanguageCatalog, Lang, SourceLang};
use std::sync::Arc;
use tracing::{error, info};

use crate::helpers::{OptionExt, ResultExt, RouteResult, content_disposition, error_status};
use crate::state::AppState;

/// Fields of the conversion form.
///
/// Page numbers only count when their "use" checkbox is ticked.
#[derive(Debug, Default)]
pub struct ConvertForm {
    pub file: Option<Bytes>,
    pub file_name: Option<String>,
    pub start_page: Option<String>,
    pub use_start: bool,
    pub end_page: Option<String>,
    pub use_end: bool,
    pub multi_processing: bool,
    pub translate: bool,
    pub target_lang: Option<String>,
    pub source_lang: Option<String>,
    pub to_pdf: bool,
    pub output_name: Option<String>,
}

/// HTML checkbox semantics: present means ticked, unless explicitly false.
fn checked(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "" | "0" | "false" | "off" | "no"
    )
}

fn page_number(field: &str, value: Option<&str>) -> RouteResult<Option<u32>> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) => match v.parse::<u32>() {
            Ok(page) if page >= 1 => Ok(Some(page)),
            _ => Err((
                StatusCode::BAD_REQUEST,
                format!("{field} must be a page number starting at 1, got '{v}'"),
            )),
        },
    }
}

impl ConvertForm {
    /// Record one text field.
    pub fn set(&mut self, name: &str, value: String) {
        match name {
            "start_page" => self.start_page = Some(value),
            "use_start" => self.use_start = checked(&value),
            "end_page" => self.end_page = Some(value),
            "use_end" => self.use_end = checked(&value),
            "multi_processing" => self.multi_processing = checked(&value),
            "translate" => self.translate = checked(&value),
            "target_lang" => self.target_lang = Some(value),
            "source_lang" => self.source_lang = Some(value),
            "to_pdf" => self.to_pdf = checked(&value),
            "output_name" => self.output_name = Some(value),
            _ => {}
        }
    }

    /// Validate the form into a pipeline request.
    pub fn into_request(
        self,
        catalog: &LanguageCatalog,
        default_target: &Lang,
        default_source: &SourceLang,
    ) -> RouteResult<ConversionRequest> {
        let file = self.file.or_bad_request("No file uploaded")?;
        if file.is_empty() {
            return Err((StatusCode::BAD_REQUEST, "Uploaded file is empty".to_string()));
        }

        let start_page = if self.use_start {
            page_number("start_page", self.start_page.as_deref())?
        } else {
            None
        };
        let end_page = if self.use_end {
            page_number("end_page", self.end_page.as_deref())?
        } else {
            None
        };

        let target = match self.target_lang.as_deref().map(str::trim) {
            Some(code) if !code.is_empty() => catalog
                .resolve(code)
                .map_err(|e| error_status(&e))?,
            _ => default_target.clone(),
        };
        let source = self
            .source_lang
            .map_or_else(|| default_source.clone(), SourceLang::from);

        Ok(ConversionRequest {
            upload_name: self.file_name,
            output_name: self.output_name,
            start_page,
            end_page,
            multi_processing: self.multi_processing,
            translate: self.translate,
            source,
            to_pdf: self.to_pdf,
            ..ConversionRequest::new(file.to_vec(), target)
        })
    }
}

/// Run a conversion and answer with the produced file.
pub async fn convert(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> RouteResult<Response> {
    let mut form = ConvertForm::default();

    while let Some(field) = multipart.next_field().await.or_bad_request()? {
        let name = field.name().unwrap_or("").to_string();
        if name == "file" {
            form.file_name = field.file_name().map(ToString::to_string);
            form.file = Some(field.bytes().await.or_bad_request()?);
        } else {
            let value = field.text().await.or_bad_request()?;
            form.set(&name, value);
        }
    }

    let request = form.into_request(
        &state.catalog,
        &state.config.default_target_lang,
        &state.config.source_lang,
    )?;

    let output = state.pipeline.run(request, None).await.map_err(|e| {
        error!("Conversion failed: {}", e);
        error_status(&e)
    })?;

    info!("Sending {} ({} bytes)", output.file_name, output.bytes.len());

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, output.mime())
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition(&output.file_name),
        )
        .body(Body::from(output.bytes))
        .or_internal_error()
}
