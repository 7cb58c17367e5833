//! Askama templates for the web front end.
//!
//! - `base.html` - Common layout with CSS
//! - `index.html` - Conversion form

use askama::Template;
use askama_web::WebTemplate;

use crate::state::{AppState, LanguageChoice};

/// Landing page with the conversion form.
#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub languages: Vec<LanguageChoice>,
    /// Largest accepted upload, in megabytes
    pub max_upload_mb: usize,
}

impl IndexTemplate {
    pub fn new(state: &AppState) -> Self {
        Self {
            languages: state.language_choices(),
            max_upload_mb: crate::MAX_UPLOAD_BYTES / (1024 * 1024),
        }
    }
}
