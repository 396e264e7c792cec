//! Response DTOs for pricing API endpoints.
//!
//! This is the only place amounts are rounded: money to cents, dimensions to
//! four places.

use rust_decimal::Decimal;
use serde::Serialize;

use super::calculators::{round_dimension, round_money};
use super::models::{BoardType, LineKind, PriceBreakdown, PricedLine, SpecialPartLine};

/// Round to cents and always print two places.
pub(crate) fn money(amount: Decimal) -> Decimal {
    let mut rounded = round_money(amount, 2);
    rounded.rescale(2);
    rounded
}

/// A priced board line
#[derive(Debug, Serialize)]
pub struct PricedLineResponse {
    #[serde(flatten)]
    pub kind: LineKind,
    pub board_type: BoardType,
    pub board_type_id: i32,
    pub material_id: Option<i32>,
    #[serde(with = "rust_decimal::serde::str")]
    pub length: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub width: Decimal,
    pub quantity: u32,
    pub mitre: bool,
    #[serde(with = "rust_decimal::serde::str")]
    pub base_price: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub length_charge: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub width_charge: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub mitre_charge: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub material_multiplier: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub unit_price: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub total_price: Decimal,
    pub rule_found: bool,
}

impl From<&PricedLine> for PricedLineResponse {
    fn from(line: &PricedLine) -> Self {
        let charge = &line.charge;
        Self {
            kind: line.kind.clone(),
            board_type: line.board_type,
            board_type_id: line.board_type.id(),
            material_id: line.material_id,
            length: round_dimension(line.length),
            width: round_dimension(line.width),
            quantity: line.quantity,
            mitre: line.mitre,
            base_price: money(charge.base_price),
            length_charge: money(charge.length_charge),
            width_charge: money(charge.width_charge),
            mitre_charge: money(charge.mitre_charge),
            material_multiplier: charge.material_multiplier.normalize(),
            unit_price: money(charge.unit_price),
            total_price: money(charge.total_price),
            rule_found: charge.rule_found,
        }
    }
}

/// A priced special part
#[derive(Debug, Serialize)]
pub struct SpecialPartLineResponse {
    pub part_id: i32,
    pub material_id: i32,
    pub quantity: u32,
    #[serde(with = "rust_decimal::serde::str")]
    pub unit_cost: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub labor_cost: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub total_price: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub labor_total: Decimal,
    pub found: bool,
}

impl From<&SpecialPartLine> for SpecialPartLineResponse {
    fn from(part: &SpecialPartLine) -> Self {
        Self {
            part_id: part.part_id,
            material_id: part.material_id,
            quantity: part.quantity,
            unit_cost: money(part.unit_cost),
            labor_cost: money(part.labor_cost),
            total_price: money(part.total_price),
            labor_total: money(part.labor_total),
            found: part.found,
        }
    }
}

/// Response for stair price calculation
#[derive(Debug, Serialize)]
pub struct PriceBreakdownResponse {
    #[serde(with = "rust_decimal::serde::str")]
    pub riser_height: Decimal,
    pub treads: Vec<PricedLineResponse>,
    pub risers: Vec<PricedLineResponse>,
    pub stringers: Vec<PricedLineResponse>,
    pub special_parts: Vec<SpecialPartLineResponse>,
    #[serde(with = "rust_decimal::serde::str")]
    pub subtotal: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub labor_total: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub tax_rate: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub tax_amount: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub total: Decimal,
}

impl From<&PriceBreakdown> for PriceBreakdownResponse {
    fn from(breakdown: &PriceBreakdown) -> Self {
        Self {
            riser_height: round_dimension(breakdown.riser_height),
            treads: breakdown.treads.iter().map(Into::into).collect(),
            risers: breakdown.risers.iter().map(Into::into).collect(),
            stringers: breakdown.stringers.iter().map(Into::into).collect(),
            special_parts: breakdown.special_parts.iter().map(Into::into).collect(),
            subtotal: money(breakdown.subtotal),
            labor_total: money(breakdown.labor_total),
            tax_rate: breakdown.tax_rate.normalize(),
            tax_amount: money(breakdown.tax_amount),
            total: money(breakdown.total),
        }
    }
}

/// Response for a persisted configuration
#[derive(Debug, Serialize)]
pub struct SavedConfigurationResponse {
    pub configuration_id: i64,
    pub breakdown: PriceBreakdownResponse,
}
