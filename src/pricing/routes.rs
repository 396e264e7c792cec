//! Stair pricing route handlers

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use chrono::{DateTime, Utc};

use crate::db::ConfigurationStore;
use crate::error::Result;
use crate::shop::models::NewStairConfiguration;
use crate::AppState;

use super::models::{PriceBreakdown, StairSpecification};
use super::requests::{SaveConfigurationRequest, StairPriceRequest, StairSpecificationRequest};
use super::responses::{PriceBreakdownResponse, SavedConfigurationResponse};
use super::services::{compute_stair_price, PricingFlow, PricingOptions};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/stairs/price", post(price))
        .route("/api/stairs/price-rules", post(price_rules))
        .route("/api/stairs/configurations", post(save_configuration))
}

/// Price a staircase with the simplified flow
async fn price(
    State(state): State<AppState>,
    payload: std::result::Result<Json<StairPriceRequest>, JsonRejection>,
) -> Result<Json<PriceBreakdownResponse>> {
    let Json(request) = payload?;
    let (_, breakdown) = run_pricing(
        &state,
        request.specification,
        request.job_id,
        request.as_of,
        PricingFlow::Simplified,
    )
    .await?;
    Ok(Json(PriceBreakdownResponse::from(&breakdown)))
}

/// Price a staircase with the legacy price-rule flow (adds stringer labor)
async fn price_rules(
    State(state): State<AppState>,
    payload: std::result::Result<Json<StairPriceRequest>, JsonRejection>,
) -> Result<Json<PriceBreakdownResponse>> {
    let Json(request) = payload?;
    let (_, breakdown) = run_pricing(
        &state,
        request.specification,
        request.job_id,
        request.as_of,
        PricingFlow::LegacyPriceRules,
    )
    .await?;
    Ok(Json(PriceBreakdownResponse::from(&breakdown)))
}

/// Price a staircase and persist it with its tread and riser items
async fn save_configuration(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SaveConfigurationRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SavedConfigurationResponse>)> {
    let Json(request) = payload?;
    let (specification, breakdown) = run_pricing(
        &state,
        request.specification,
        request.job_id,
        request.as_of,
        PricingFlow::Simplified,
    )
    .await?;

    let response_breakdown = PriceBreakdownResponse::from(&breakdown);
    let new = NewStairConfiguration::from_specification(
        request.job_id,
        request.name,
        specification,
        breakdown,
        &state.engine,
    );
    let configuration_id = state.store.save_configuration(&new).await?;

    Ok((
        StatusCode::CREATED,
        Json(SavedConfigurationResponse {
            configuration_id,
            breakdown: response_breakdown,
        }),
    ))
}

async fn run_pricing(
    state: &AppState,
    request: StairSpecificationRequest,
    job_id: Option<i64>,
    as_of: Option<DateTime<Utc>>,
    flow: PricingFlow,
) -> Result<(StairSpecification, PriceBreakdown)> {
    let specification = request.into_specification(&state.engine)?;
    let options = PricingOptions { job_id, flow, as_of };

    tracing::debug!(
        num_risers = specification.num_risers,
        treads = specification.treads.len(),
        ?flow,
        "Pricing request"
    );

    let breakdown =
        compute_stair_price(state.store.as_ref(), &state.engine, &specification, &options).await?;
    Ok((specification, breakdown))
}
