//! Service-level routes

pub mod health;
