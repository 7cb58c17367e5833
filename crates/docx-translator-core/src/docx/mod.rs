//! Paragraph-level access to Word (`.docx`) packages.

mod document;
mod xml;

pub use document::{DOCUMENT_PART, DocxDocument};
