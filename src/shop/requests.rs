//! Request DTOs for shop endpoints.

use serde::Deserialize;

/// Request to generate a cut sheet for a production run
#[derive(Debug, Deserialize)]
pub struct CutSheetRequest {
    pub configuration_ids: Vec<i64>,
}
