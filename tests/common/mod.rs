#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use chrono::{TimeZone, Utc};
use http_body_util::BodyExt;
use rust_decimal_macros::dec;
use tower::ServiceExt;

use stairshop_web::config::EngineConfig;
use stairshop_web::db::memory::MemoryJob;
use stairshop_web::db::MemoryStore;
use stairshop_web::pricing::models::{BoardPricingRule, BoardType};
use stairshop_web::{build_router, AppState};

/// Build the application router over the given in-memory store.
pub fn build_test_app(store: Arc<MemoryStore>) -> Router {
    let state = AppState::new(store, EngineConfig::default());
    build_router(state, Duration::from_secs(30))
}

/// Catalog with one box tread rule (material 1), one riser rule (material 2),
/// unit multipliers and a job with its own tax rate.
pub fn seeded_store() -> MemoryStore {
    MemoryStore::new()
        .with_rule(rule(1, BoardType::BoxTread, 1))
        .with_rule(BoardPricingRule {
            base_price: dec!(20),
            base_width: dec!(8),
            mitre_price: dec!(0),
            ..rule(2, BoardType::Riser, 2)
        })
        .with_multiplier(1, dec!(1.0))
        .with_multiplier(2, dec!(1.0))
        .with_material(1, "Red Oak")
        .with_material(2, "Poplar")
        .with_job(
            5,
            MemoryJob {
                tax_rate: Some(dec!(0.08)),
                location: Some("Lot 14".to_string()),
            },
        )
}

pub fn rule(id: i64, board_type: BoardType, material_id: i32) -> BoardPricingRule {
    BoardPricingRule {
        id,
        board_type_id: board_type.id(),
        material_id,
        base_price: dec!(50),
        base_length: dec!(36),
        base_width: dec!(10),
        length_increment_price: dec!(2),
        length_increment_size: dec!(1),
        width_increment_price: dec!(3),
        width_increment_size: dec!(1),
        mitre_price: dec!(25),
        effective_from: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        effective_to: None,
    }
}

/// Three box treads over 14 risers, 10" rough cut with a 1.25" nose.
pub fn three_tread_specification() -> serde_json::Value {
    serde_json::json!({
        "floor_to_floor": 108,
        "num_risers": 14,
        "tread_material_id": 1,
        "riser_material_id": 2,
        "rough_cut_width": 10,
        "nose_size": 1.25,
        "treads": [
            { "riser_number": 1, "type": "box", "stair_width": 36 },
            { "riser_number": 2, "type": "box", "stair_width": 36 },
            { "riser_number": 3, "type": "box", "stair_width": 36 }
        ]
    })
}

pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_raw(app: Router, uri: &str, body: &'static str) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
