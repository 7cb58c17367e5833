//! Download names and content types of conversion results.

use std::path::Path;

/// Base name used when nothing better is known
pub const FALLBACK_BASE: &str = "output";

const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
const PDF_MIME: &str = "application/pdf";

/// What a conversion run hands back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    /// Converted, untranslated Word document
    Docx,
    /// Word document with translated paragraphs
    TranslatedDocx,
    /// Translated document rendered to PDF
    Pdf,
}

impl OutputKind {
    /// Rendering only applies to translated output.
    pub const fn for_request(translate: bool, to_pdf: bool) -> Self {
        match (translate, to_pdf) {
            (false, _) => Self::Docx,
            (true, false) => Self::TranslatedDocx,
            (true, true) => Self::Pdf,
        }
    }

    pub const fn mime(self) -> &'static str {
        match self {
            Self::Docx | Self::TranslatedDocx => DOCX_MIME,
            Self::Pdf => PDF_MIME,
        }
    }

    pub const fn extension(self) -> &'static str {
        match self {
            Self::Docx | Self::TranslatedDocx => "docx",
            Self::Pdf => "pdf",
        }
    }

    /// Download name for `base`
    pub fn file_name(self, base: &str) -> String {
        let ext = self.extension();
        match self {
            Self::Docx | Self::Pdf => format!("{base}.{ext}"),
            Self::TranslatedDocx => format!("{base}_translated.{ext}"),
        }
    }
}

/// Last path component of a user supplied name, whichever separator it uses
fn file_component(name: &str) -> &str {
    name.rsplit(['/', '\\']).next().unwrap_or(name).trim()
}

fn strip_known_extension(name: &str) -> &str {
    for ext in [".docx", ".pdf"] {
        if let Some(split) = name.len().checked_sub(ext.len())
            && name
                .get(split..)
                .is_some_and(|tail| tail.eq_ignore_ascii_case(ext))
        {
            return &name[..split];
        }
    }
    name
}

/// Default base name for an upload: its stem, or [`FALLBACK_BASE`].
pub fn default_base(upload_name: Option<&str>) -> String {
    upload_name
        .map(file_component)
        .and_then(|name| Path::new(name).file_stem())
        .map(|stem| stem.to_string_lossy().trim().to_string())
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| FALLBACK_BASE.to_string())
}

/// Base name for the output.
///
/// A requested name wins over the upload's; either is reduced to its file
/// name and loses a trailing `.docx` or `.pdf`.
pub fn base_name(requested: Option<&str>, upload_name: Option<&str>) -> String {
    let requested = requested
        .map(file_component)
        .map(strip_known_extension)
        .map(str::trim)
        .filter(|base| !base.is_empty());

    match requested {
        Some(base) => base.to_string(),
        None => default_base(upload_name),
    }
}
