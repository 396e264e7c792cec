//! Pricing engine for staircase quotes.
//!
//! Turns a stair specification into an itemized price breakdown: treads,
//! grouped risers, stringers and special parts, then subtotal, labor, tax and
//! total. Catalog lookups are planned up front and fetched in one batch per table.

pub mod calculators;
pub mod models;
pub mod requests;
pub mod responses;
pub mod routes;
pub mod services;

// Re-export commonly used items
pub use calculators::round_money;
pub use routes::router;
pub use services::{compute_stair_price, PricingError, PricingFlow, PricingOptions};
