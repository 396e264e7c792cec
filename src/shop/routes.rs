//! Shop route handlers

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};

use crate::error::Result;
use crate::AppState;

use super::requests::CutSheetRequest;
use super::responses::CutSheetResponse;
use super::services::generate_cut_sheet;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/shop/cut-sheet", post(cut_sheet))
}

/// Generate the cut list for a set of stored configurations
async fn cut_sheet(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CutSheetRequest>, JsonRejection>,
) -> Result<Json<CutSheetResponse>> {
    let Json(request) = payload?;
    let items =
        generate_cut_sheet(state.store.as_ref(), &state.engine, &request.configuration_ids)
            .await?;
    Ok(Json(CutSheetResponse::from_items(&items)))
}
