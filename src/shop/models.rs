//! Shop-floor models: persisted stair configurations and cut sheet items.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::config::EngineConfig;
use crate::pricing::models::{PriceBreakdown, StairSpecification, TreadType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    Tread,
    Riser,
    /// Base trim board closing the bottom of the skirt.
    S4s,
}

impl ItemType {
    pub fn as_str(self) -> &'static str {
        match self {
            ItemType::Tread => "tread",
            ItemType::Riser => "riser",
            ItemType::S4s => "s4s",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "tread" => Some(ItemType::Tread),
            "riser" => Some(ItemType::Riser),
            "s4s" => Some(ItemType::S4s),
            _ => None,
        }
    }
}

/// A stored tread or riser of a configuration, at its nominal size.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigurationItem {
    pub item_type: ItemType,
    pub riser_number: u32,
    /// Only meaningful for treads.
    pub tread_type: Option<TreadType>,
    pub material: Option<String>,
    /// Nominal length, in inches.
    pub length: Decimal,
    /// Rough cut width of a tread; risers take their width from the riser height.
    pub width: Option<Decimal>,
    pub quantity: u32,
}

/// An already-priced staircase as persisted for production.
#[derive(Debug, Clone, PartialEq)]
pub struct StairConfiguration {
    pub id: i64,
    pub name: Option<String>,
    /// Site/location string of the owning job.
    pub location: Option<String>,
    pub floor_to_floor: Decimal,
    pub num_risers: u32,
    pub nose_size: Option<Decimal>,
    pub items: Vec<ConfigurationItem>,
}

impl StairConfiguration {
    pub fn riser_height(&self) -> Decimal {
        if self.num_risers == 0 {
            return Decimal::ZERO;
        }
        self.floor_to_floor / Decimal::from(self.num_risers)
    }

    /// Label printed on every cut of this staircase.
    pub fn stair_id(&self) -> String {
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("STAIR_{}", self.id),
        }
    }

    pub fn treads(&self) -> impl Iterator<Item = &ConfigurationItem> {
        self.items
            .iter()
            .filter(|item| item.item_type == ItemType::Tread)
    }

    pub fn risers(&self) -> impl Iterator<Item = &ConfigurationItem> {
        self.items
            .iter()
            .filter(|item| item.item_type == ItemType::Riser)
    }

    /// Tread type of the tread sitting at `riser_number`, if any.
    pub fn tread_type_at(&self, riser_number: u32) -> Option<TreadType> {
        self.treads()
            .find(|item| item.riser_number == riser_number)
            .map(|item| item.tread_type.unwrap_or_default())
    }
}

/// One line of a shop cut list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CutSheetItem {
    pub item_type: ItemType,
    pub tread_type: Option<TreadType>,
    pub material: Option<String>,
    pub quantity: u32,
    pub cut_width: Decimal,
    pub cut_length: Decimal,
    pub stair_id: String,
    pub location: String,
}

/// Configuration row from stair_configurations
#[derive(Debug, Clone, FromRow)]
pub struct ConfigurationRow {
    pub id: i64,
    pub name: Option<String>,
    pub location: Option<String>,
    pub floor_to_floor: Decimal,
    pub num_risers: i32,
    pub nose_size: Option<Decimal>,
}

/// Item row from stair_configuration_items
#[derive(Debug, Clone, FromRow)]
pub struct ConfigurationItemRow {
    pub item_type: String,
    pub riser_number: i32,
    pub tread_type: Option<String>,
    pub material: Option<String>,
    pub length: Decimal,
    pub width: Option<Decimal>,
    pub quantity: i32,
}

/// An item to be written alongside a new configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct NewConfigurationItem {
    pub item_type: ItemType,
    pub riser_number: u32,
    pub tread_type: Option<TreadType>,
    pub material_id: Option<i32>,
    pub length: Decimal,
    pub width: Option<Decimal>,
    pub quantity: u32,
}

/// A priced specification ready to be persisted in one transaction.
#[derive(Debug, Clone)]
pub struct NewStairConfiguration {
    pub job_id: Option<i64>,
    pub name: Option<String>,
    pub specification: StairSpecification,
    pub breakdown: PriceBreakdown,
    pub items: Vec<NewConfigurationItem>,
}

impl NewStairConfiguration {
    /// Derive the nominal tread and riser items of a priced specification.
    ///
    /// Treads keep their stair width as nominal length and the rough cut width as
    /// width. A landing tread sits at the top riser number. Each riser takes the
    /// width of the tread at its riser number, else the first tread's width.
    pub fn from_specification(
        job_id: Option<i64>,
        name: Option<String>,
        specification: StairSpecification,
        breakdown: PriceBreakdown,
        config: &EngineConfig,
    ) -> Self {
        let spec = &specification;
        let fallback_width = spec.first_stair_width().unwrap_or(config.default_stair_width);

        let mut items: Vec<NewConfigurationItem> = spec
            .treads
            .iter()
            .map(|tread| NewConfigurationItem {
                item_type: ItemType::Tread,
                riser_number: tread.riser_number,
                tread_type: Some(tread.tread_type),
                material_id: spec.tread_material_id,
                length: tread.stair_width,
                width: Some(spec.rough_cut_width),
                quantity: 1,
            })
            .collect();

        if spec.include_landing_tread {
            items.push(NewConfigurationItem {
                item_type: ItemType::Tread,
                riser_number: spec.num_risers,
                tread_type: Some(TreadType::Box),
                material_id: spec.tread_material_id,
                length: fallback_width,
                width: Some(config.landing_tread_width),
                quantity: 1,
            });
        }

        for riser_number in 1..=spec.num_risers {
            let length = spec
                .treads
                .iter()
                .find(|t| t.riser_number == riser_number)
                .map(|t| t.stair_width)
                .unwrap_or(fallback_width);
            items.push(NewConfigurationItem {
                item_type: ItemType::Riser,
                riser_number,
                tread_type: None,
                material_id: spec.riser_material_id,
                length,
                width: None,
                quantity: 1,
            });
        }

        Self {
            job_id,
            name,
            specification,
            breakdown,
            items,
        }
    }
}
