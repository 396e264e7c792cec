//! Server and engine configuration.
//!
//! `ServerConfig` is read from the environment at startup. `EngineConfig` holds the
//! dimensional and monetary defaults the pricing engine and the cut-sheet
//! calculator fall back on when a specification leaves a value out.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// PostgreSQL connection string (required).
    pub database_url: String,
    /// Pool size (default: `10`).
    pub database_max_connections: u32,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    pub engine: EngineConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                    | Default   |
    /// |----------------------------|-----------|
    /// | `HOST`                     | `0.0.0.0` |
    /// | `PORT`                     | `3000`    |
    /// | `DATABASE_URL`             | required  |
    /// | `DATABASE_MAX_CONNECTIONS` | `10`      |
    /// | `REQUEST_TIMEOUT_SECS`     | `30`      |
    /// | `DEFAULT_TAX_RATE`         | `0.06`    |
    pub fn from_env() -> anyhow::Result<Self> {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .map_err(|e| anyhow::anyhow!("PORT must be a valid u16: {e}"))?;

        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;

        let database_max_connections: u32 = std::env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".into())
            .parse()
            .map_err(|e| anyhow::anyhow!("DATABASE_MAX_CONNECTIONS must be a valid u32: {e}"))?;

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .map_err(|e| anyhow::anyhow!("REQUEST_TIMEOUT_SECS must be a valid u64: {e}"))?;

        let mut engine = EngineConfig::default();
        if let Ok(raw) = std::env::var("DEFAULT_TAX_RATE") {
            engine.default_tax_rate = raw
                .parse::<Decimal>()
                .map_err(|e| anyhow::anyhow!("DEFAULT_TAX_RATE must be a decimal: {e}"))?;
        }

        Ok(Self {
            host,
            port,
            database_url,
            database_max_connections,
            request_timeout_secs,
            engine,
        })
    }
}

/// Defaults shared by the pricing engine and the cut-sheet calculator.
///
/// All dimensions are inches, all money is dollars.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Tax rate applied when no job is supplied or the job has no stored rate.
    pub default_tax_rate: Decimal,
    /// Nosing overhang added to the rough cut width of a tread.
    pub default_nose_size: Decimal,
    /// Rough cut width assumed for a tread item that does not carry one.
    pub default_rough_cut_width: Decimal,
    /// Stair width used for landing pieces when no tread is configured.
    pub default_stair_width: Decimal,
    /// Width of the landing tread board.
    pub landing_tread_width: Decimal,
    /// Width of a riser board on the pricing "width" axis.
    pub riser_board_width: Decimal,
    /// Stringers per staircase when the legacy stringer type omits a count.
    pub default_num_stringers: u32,
    /// Center horse thickness when no legacy stringer is configured.
    pub default_center_horse_thickness: Decimal,
    /// Stringer width when no legacy stringer is configured.
    pub default_stringer_width: Decimal,
    /// Material used for center horses when neither stringer nor tread names one.
    pub fallback_material_id: i32,
    /// Installation labor per legacy stringer unit (legacy price-rule flow only).
    pub stringer_labor_per_unit: Decimal,
    /// Location label for cut sheet items whose job has none.
    pub default_location: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_tax_rate: dec!(0.06),
            default_nose_size: dec!(1.25),
            default_rough_cut_width: dec!(11),
            default_stair_width: dec!(38),
            landing_tread_width: dec!(3.5),
            riser_board_width: dec!(8),
            default_num_stringers: 2,
            default_center_horse_thickness: dec!(2),
            default_stringer_width: dec!(9.25),
            fallback_material_id: 1,
            stringer_labor_per_unit: dec!(10.00),
            default_location: "UNKNOWN".to_string(),
        }
    }
}
