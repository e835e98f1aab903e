//! Priority filter endpoints

use axum::{extract::State, routing::get, Json, Router};
use serde::{Deserialize, Serialize};

use taskkit_core::filter::PriorityFilter;

use super::{api_error, ApiError, ApiJson};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct FilterResponse {
    pub priority: PriorityFilter,
}

/// Filter given as text so unknown values get a readable error instead of a decode failure
#[derive(Debug, Deserialize)]
pub struct SetFilterRequest {
    pub priority: String,
}

/// GET /api/filter - Current priority filter
async fn get_filter(State(state): State<AppState>) -> Json<FilterResponse> {
    Json(FilterResponse {
        priority: state.filter_store().priority(),
    })
}

/// PUT /api/filter - Change the priority filter
async fn set_filter(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<SetFilterRequest>,
) -> Result<Json<FilterResponse>, ApiError> {
    let priority = state
        .filter_store()
        .set_priority_str(&req.priority)
        .map_err(api_error)?;
    Ok(Json(FilterResponse { priority }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/filter", get(get_filter).put(set_filter))
}
