mod document;

pub use document::{PdfDocument, check_header};
