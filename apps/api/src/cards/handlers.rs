//! Axum route handlers for the card endpoints.

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};
use tracing::info;

use crate::cards::resolver::{resolve_card, CardCategory, CardResolution};
use crate::errors::AppError;
use crate::state::AppState;

/// GET /api/cards/:category
///
/// category ∈ {me, projects, skills, contact, resume, fun}; anything else
/// is a 404. Resolution failures surface as 500s with the provider message.
pub async fn handle_get_card(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<Json<CardResolution>, AppError> {
    let category: CardCategory = category
        .parse()
        .map_err(|_| AppError::NotFound(format!("Unknown card category: {category}")))?;

    info!("resolving card: {category:?}");
    let resolution = resolve_card(&state, category).await?;
    Ok(Json(resolution))
}

/// GET /api/personal
///
/// Static passthrough of the personal-info section.
pub async fn handle_get_personal(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "personalInfo": state.portfolio.personal_info }))
}
