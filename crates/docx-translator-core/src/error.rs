use thiserror::Error;

/// Unified error type for docx-translator-core
///
/// This enum encompasses all error cases that can occur in the library:
/// - User input (page ranges, unknown languages)
/// - PDF inspection and the external PDF→DOCX converter
/// - DOCX package reading and writing
/// - The external DOCX→PDF renderer
/// - Translation operations (API requests, responses, rate limiting)
/// - Configuration operations (loading, validation)
/// - General I/O operations
#[derive(Error, Debug)]
pub enum Error {
    // ==========================================================================
    // Input Errors
    // ==========================================================================
    /// End page (1-based) is before the start page
    #[error("end page {end} cannot be smaller than start page {start}")]
    InvalidPageRange { start: u32, end: u32 },

    /// Start page lies past the end of the document
    #[error("start page {page} is out of range (document has {total} pages)")]
    PageOutOfRange { page: u32, total: usize },

    /// Target language is not in the language catalog
    #[error("unknown language: {0}")]
    UnknownLanguage(String),

    // ==========================================================================
    // PDF Errors
    // ==========================================================================
    /// Failed to open or parse a PDF file
    #[error("failed to open PDF: {0}")]
    PdfOpen(String),

    /// The PDF→DOCX converter ran but failed
    #[error("PDF to DOCX conversion failed: {0}")]
    Conversion(String),

    /// The PDF→DOCX converter program could not be started
    #[error("converter '{program}' is not available: {reason}")]
    ConverterUnavailable { program: String, reason: String },

    /// The PDF→DOCX converter did not finish in time
    #[error("PDF to DOCX conversion timed out after {0} seconds")]
    ConversionTimeout(u64),

    // ==========================================================================
    // DOCX Errors
    // ==========================================================================
    /// Malformed DOCX package or unexpected structure
    #[error("invalid DOCX document: {0}")]
    Docx(String),

    /// A required part is missing from the DOCX package
    #[error("DOCX package is missing part '{0}'")]
    DocxMissingPart(String),

    /// Error reading or writing the zip container
    #[error("zip error: {0}")]
    Zip(String),

    /// Error reading or writing WordprocessingML
    #[error("XML error: {0}")]
    Xml(String),

    // ==========================================================================
    // Rendering Errors
    // ==========================================================================
    /// The DOCX→PDF renderer ran but failed
    #[error("DOCX to PDF rendering failed: {0}")]
    Render(String),

    /// The DOCX→PDF renderer program could not be started
    #[error("renderer '{program}' is not available: {reason}")]
    RendererUnavailable { program: String, reason: String },

    /// The DOCX→PDF renderer did not finish in time
    #[error("DOCX to PDF rendering timed out after {0} seconds")]
    RenderTimeout(u64),

    // ==========================================================================
    // Translation Errors
    // ==========================================================================
    /// Translation API request failed
    #[error("translation API request failed: {0}")]
    TranslationRequest(String),

    /// Translation API answered with a server-side error status
    #[error("translation API returned HTTP {status}: {body}")]
    TranslationHttp { status: u16, body: String },

    /// Invalid response from translation API
    #[error("invalid translation API response: {0}")]
    TranslationInvalidResponse(String),

    /// Translation API returned nothing usable
    #[error("translation API returned an empty result")]
    TranslationEmpty,

    /// Rate limited by translation API
    #[error("translation rate limited{}", retry_after.map(|s| format!(", retry after {s} seconds")).unwrap_or_default())]
    TranslationRateLimited { retry_after: Option<u64> },

    /// Text exceeds what the backend accepts in one request
    #[error("text of {len} characters exceeds the translation limit of {max}")]
    TranslationTextTooLong { len: usize, max: usize },

    /// Translation request timed out
    #[error("translation request timed out")]
    TranslationTimeout,

    // ==========================================================================
    // Configuration Errors
    // ==========================================================================
    /// Failed to load configuration file
    #[error("failed to load config: {0}")]
    ConfigLoad(String),

    // ==========================================================================
    // I/O Errors
    // ==========================================================================
    /// General I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A blocking worker task panicked or was cancelled
    #[error("background task failed: {0}")]
    Task(String),
}

impl Error {
    /// Whether retrying the same request may succeed.
    ///
    /// Only network-level hiccups, rate limiting and server-side (5xx)
    /// failures qualify. Everything else fails the same way every time.
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::TranslationTimeout
            | Self::TranslationRequest(_)
            | Self::TranslationRateLimited { .. } => true,
            Self::TranslationHttp { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Whether the error was caused by what the user asked for, as opposed
    /// to a failure of the tool or one of its collaborators.
    pub const fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidPageRange { .. }
                | Self::PageOutOfRange { .. }
                | Self::UnknownLanguage(_)
                | Self::PdfOpen(_)
        )
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(e: zip::result::ZipError) -> Self {
        Self::Zip(e.to_string())
    }
}

impl From<quick_xml::Error> for Error {
    fn from(e: quick_xml::Error) -> Self {
        Self::Xml(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
