//! Language catalog as JSON.

use axum::Json;
use axum::extract::State;
use docx_translator_core::LanguageOption;
use serde::Serialize;
use std::sync::Arc;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct LanguagesResponse {
    pub languages: Vec<LanguageOption>,
    pub default_target: Option<&'static str>,
}

/// Target languages the translator accepts, sorted by name.
pub async fn languages(State(state): State<Arc<AppState>>) -> Json<LanguagesResponse> {
    Json(LanguagesResponse {
        languages: state.catalog.options().to_vec(),
        default_target: state.default_target(),
    })
}
