use lopdf::Document as LoDocument;

use crate::error::{Error, Result};

/// Readers accept the `%PDF` marker anywhere in the first kilobyte
const HEADER_WINDOW: usize = 1024;

/// What the pipeline learns about an upload before conversion
pub struct PdfDocument {
    page_count: usize,
    encrypted: bool,
}

/// Reject uploads that are clearly not PDF files.
pub fn check_header(bytes: &[u8]) -> Result<()> {
    let window = &bytes[..bytes.len().min(HEADER_WINDOW)];
    if window.windows(4).any(|w| w == b"%PDF") {
        Ok(())
    } else {
        Err(Error::PdfOpen("not a PDF file (missing %PDF header)".to_string()))
    }
}

impl PdfDocument {
    /// Parse a PDF from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        check_header(bytes)?;

        let doc = LoDocument::load_mem(bytes)
            .map_err(|e| Error::PdfOpen(format!("Failed to parse PDF: {e}")))?;

        Ok(Self {
            page_count: doc.get_pages().len(),
            encrypted: doc.is_encrypted(),
        })
    }

    pub const fn page_count(&self) -> usize {
        self.page_count
    }

    pub const fn is_encrypted(&self) -> bool {
        self.encrypted
    }
}

impl std::fmt::Debug for PdfDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfDocument")
            .field("page_count", &self.page_count)
            .field("encrypted", &self.encrypted)
            .finish()
    }
}
