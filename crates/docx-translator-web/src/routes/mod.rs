//! HTTP route handlers for the DOCX translator web application.
//!
//! The form page is HTML (Askama); conversions answer with the produced file.

mod convert;
mod languages;
mod pages;

pub use convert::convert;
pub use languages::languages;
pub use pages::{health, index};
