//! Catalog and configuration stores.
//!
//! The pricing engine and the cut-sheet calculator only see these traits. Each
//! pricing lookup is batched: callers collect every key they need first and
//! fetch them in one round-trip per table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::PgPoolOptions;

use crate::pricing::models::{BoardPricingRule, BoardRuleKey, MaterialMultiplier, SpecialPartCost};
use crate::shop::models::{NewStairConfiguration, StairConfiguration};

pub mod memory;
pub mod queries;

pub use memory::MemoryStore;
pub use queries::PgStore;

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}

/// Failure to reach or read a backing store. Always retryable by the caller.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Unavailable(#[from] sqlx::Error),

    #[error("Corrupt stored data: {0}")]
    Corrupt(String),
}

/// Read-only pricing catalog.
#[async_trait]
pub trait PricingCatalog: Send + Sync {
    /// Rules active at `as_of` for the given keys. Keys without a rule are absent.
    async fn board_pricing_rules(
        &self,
        keys: &[BoardRuleKey],
        as_of: DateTime<Utc>,
    ) -> Result<Vec<BoardPricingRule>, StoreError>;

    /// Multipliers for the given materials. Materials without one are absent.
    async fn material_multipliers(
        &self,
        material_ids: &[i32],
    ) -> Result<Vec<MaterialMultiplier>, StoreError>;

    /// Cost records for `(part_id, material_id)` pairs.
    async fn special_parts(&self, keys: &[(i32, i32)]) -> Result<Vec<SpecialPartCost>, StoreError>;

    /// The job's stored tax rate, if the job exists and has one.
    async fn job_tax_rate(&self, job_id: i64) -> Result<Option<Decimal>, StoreError>;
}

/// Persisted stair configurations and their items.
#[async_trait]
pub trait ConfigurationStore: Send + Sync {
    async fn load_configuration(&self, id: i64) -> Result<Option<StairConfiguration>, StoreError>;

    /// Write the configuration and all of its items atomically, returning its id.
    async fn save_configuration(&self, new: &NewStairConfiguration) -> Result<i64, StoreError>;

    /// Reachability check used by `/health`.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Everything the HTTP layer needs from storage.
pub trait Store: PricingCatalog + ConfigurationStore {}

impl<T: PricingCatalog + ConfigurationStore> Store for T {}
