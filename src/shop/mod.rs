//! Cut-dimension calculator for shop production runs.
//!
//! Reads already-priced stair configurations and emits the saw dimensions for
//! every tread, riser and base trim board.

pub mod calculators;
pub mod models;
pub mod requests;
pub mod responses;
pub mod routes;
pub mod services;

pub use routes::router;
pub use services::{generate_cut_sheet, CutSheetError};
