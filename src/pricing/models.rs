//! Pricing domain models.
//!
//! Catalog rows use sqlx's FromRow derive for direct database deserialization;
//! specification and breakdown types are plain request-scoped values.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Board type ids of the pricing-rule catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoardType {
    BoxTread,
    SingleOpenTread,
    DoubleOpenTread,
    Riser,
    Stringer,
    CenterHorse,
}

impl BoardType {
    pub fn id(self) -> i32 {
        match self {
            BoardType::BoxTread => 1,
            BoardType::SingleOpenTread => 2,
            BoardType::DoubleOpenTread => 3,
            BoardType::Riser => 4,
            BoardType::Stringer => 5,
            BoardType::CenterHorse => 6,
        }
    }
}

/// How a tread's ends terminate against the stringers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreadType {
    #[default]
    Box,
    OpenLeft,
    OpenRight,
    DoubleOpen,
}

impl TreadType {
    /// Board type whose pricing rule prices this tread.
    pub fn board_type(self) -> BoardType {
        match self {
            TreadType::Box => BoardType::BoxTread,
            TreadType::OpenLeft | TreadType::OpenRight => BoardType::SingleOpenTread,
            TreadType::DoubleOpen => BoardType::DoubleOpenTread,
        }
    }

    /// Riser type of the riser below a tread of this type.
    pub fn riser_type(self) -> RiserType {
        match self {
            TreadType::Box => RiserType::Standard,
            TreadType::OpenLeft | TreadType::OpenRight => RiserType::Open,
            TreadType::DoubleOpen => RiserType::DoubleOpen,
        }
    }

    /// Parse a stored tread type label. Unknown or empty labels are box treads.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "open_left" => TreadType::OpenLeft,
            "open_right" => TreadType::OpenRight,
            "double_open" => TreadType::DoubleOpen,
            _ => TreadType::Box,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TreadType::Box => "box",
            TreadType::OpenLeft => "open_left",
            TreadType::OpenRight => "open_right",
            TreadType::DoubleOpen => "double_open",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiserType {
    Standard,
    Open,
    DoubleOpen,
}

/// One tread of the staircase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreadSpec {
    pub riser_number: u32,
    #[serde(rename = "type", default)]
    pub tread_type: TreadType,
    /// Span across the staircase, in inches.
    pub stair_width: Decimal,
}

/// One stringer of an individually configured set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StringerSpec {
    pub width: Decimal,
    pub thickness: Decimal,
    pub material_id: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StringerSide {
    Left,
    Right,
    Center,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndividualStringers {
    #[serde(default)]
    pub left: Option<StringerSpec>,
    #[serde(default)]
    pub right: Option<StringerSpec>,
    #[serde(default)]
    pub center: Option<StringerSpec>,
}

impl IndividualStringers {
    pub fn is_empty(&self) -> bool {
        self.left.is_none() && self.right.is_none() && self.center.is_none()
    }

    /// Present sides in left, right, center order.
    pub fn sides(&self) -> impl Iterator<Item = (StringerSide, &StringerSpec)> {
        [
            (StringerSide::Left, self.left.as_ref()),
            (StringerSide::Right, self.right.as_ref()),
            (StringerSide::Center, self.center.as_ref()),
        ]
        .into_iter()
        .filter_map(|(side, spec)| spec.map(|s| (side, s)))
    }
}

/// A single stringer type applied to every stringer of the staircase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyStringer {
    pub thickness: Decimal,
    pub width: Decimal,
    #[serde(default)]
    pub material_id: Option<i32>,
    /// Material name carried by the label, for display only.
    #[serde(default)]
    pub material_label: Option<String>,
}

impl LegacyStringer {
    /// Parse a `<thickness>x<width>[_<material>]` label such as `"1x9.25_Poplar"`.
    ///
    /// Returns `None` when the label does not start with two numbers separated by `x`.
    pub fn parse_label(label: &str, material_id: Option<i32>) -> Option<Self> {
        let label = label.trim();
        let (dims, material) = match label.split_once('_') {
            Some((dims, rest)) => (dims, Some(rest.trim()).filter(|m| !m.is_empty())),
            None => (label, None),
        };
        let (thickness, width) = dims.split_once(['x', 'X'])?;
        let thickness = leading_number(thickness)?;
        let width = leading_number(width)?;
        if thickness <= Decimal::ZERO || width <= Decimal::ZERO {
            return None;
        }

        Some(Self {
            thickness,
            width,
            material_id,
            material_label: material.map(str::to_string),
        })
    }
}

/// Parse the numeric prefix of `s` (e.g. `"9.25in"` -> 9.25).
fn leading_number(s: &str) -> Option<Decimal> {
    let s = s.trim();
    let end = s
        .char_indices()
        .find(|(_, c)| !(c.is_ascii_digit() || *c == '.'))
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    s[..end].parse::<Decimal>().ok()
}

/// Stringer configuration of a staircase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum StringerConfig {
    Legacy(LegacyStringer),
    Individual(IndividualStringers),
}

impl StringerConfig {
    pub fn legacy(&self) -> Option<&LegacyStringer> {
        match self {
            StringerConfig::Legacy(legacy) => Some(legacy),
            StringerConfig::Individual(_) => None,
        }
    }

    pub fn individual(&self) -> Option<&IndividualStringers> {
        match self {
            StringerConfig::Individual(individual) if !individual.is_empty() => Some(individual),
            _ => None,
        }
    }

    /// Material of the stringers, if the configuration names one.
    pub fn material_id(&self) -> Option<i32> {
        match self {
            StringerConfig::Legacy(legacy) => legacy.material_id,
            StringerConfig::Individual(individual) => {
                individual.sides().next().map(|(_, spec)| spec.material_id)
            }
        }
    }
}

/// A catalog part added to the staircase outside the board-rule formula.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecialPartSpec {
    pub part_id: i32,
    pub material_id: i32,
    pub quantity: u32,
}

/// Declarative description of one staircase line item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StairSpecification {
    /// Total rise, in inches.
    pub floor_to_floor: Decimal,
    pub num_risers: u32,
    pub tread_material_id: Option<i32>,
    pub riser_material_id: Option<i32>,
    /// Board depth before nosing.
    pub rough_cut_width: Decimal,
    pub nose_size: Decimal,
    pub treads: Vec<TreadSpec>,
    pub stringers: Option<StringerConfig>,
    pub num_stringers: u32,
    pub center_horses: u32,
    pub full_mitre: bool,
    pub bracket_type: Option<String>,
    pub special_notes: Option<String>,
    pub special_parts: Vec<SpecialPartSpec>,
    pub include_landing_tread: bool,
}

impl StairSpecification {
    /// Riser height, always derived from the total rise.
    pub fn riser_height(&self) -> Decimal {
        if self.num_risers == 0 {
            return Decimal::ZERO;
        }
        self.floor_to_floor / Decimal::from(self.num_risers)
    }

    /// Stair width of the first configured tread, used for landing pieces.
    pub fn first_stair_width(&self) -> Option<Decimal> {
        self.treads.first().map(|t| t.stair_width)
    }
}

/// Board pricing rule from stair_board_pricing_rules
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct BoardPricingRule {
    pub id: i64,
    pub board_type_id: i32,
    pub material_id: i32,
    pub base_price: Decimal,
    pub base_length: Decimal,
    pub base_width: Decimal,
    pub length_increment_price: Decimal,
    pub length_increment_size: Decimal,
    pub width_increment_price: Decimal,
    pub width_increment_size: Decimal,
    pub mitre_price: Decimal,
    pub effective_from: DateTime<Utc>,
    pub effective_to: Option<DateTime<Utc>>,
}

impl BoardPricingRule {
    /// Check if the rule is active at the given time
    pub fn is_active_at(&self, check_time: DateTime<Utc>) -> bool {
        if self.effective_from > check_time {
            return false;
        }
        match self.effective_to {
            Some(end) => check_time < end,
            None => true,
        }
    }

    pub fn key(&self) -> BoardRuleKey {
        BoardRuleKey {
            board_type_id: self.board_type_id,
            material_id: self.material_id,
        }
    }
}

/// Catalog key of a board pricing rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BoardRuleKey {
    pub board_type_id: i32,
    pub material_id: i32,
}

impl BoardRuleKey {
    pub fn new(board_type: BoardType, material_id: i32) -> Self {
        Self {
            board_type_id: board_type.id(),
            material_id,
        }
    }
}

/// Material multiplier from stair_materials
#[derive(Debug, Clone, FromRow)]
pub struct MaterialMultiplier {
    pub material_id: i32,
    pub multiplier: Decimal,
}

/// Special part cost from stair_special_parts
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct SpecialPartCost {
    pub part_id: i32,
    pub material_id: i32,
    pub unit_cost: Decimal,
    pub labor_cost: Decimal,
}

/// Charges for one priced board line.
///
/// Every field is zero and `rule_found` is false when the catalog has no
/// active rule for the line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardCharge {
    pub base_price: Decimal,
    pub length_charge: Decimal,
    pub width_charge: Decimal,
    pub mitre_charge: Decimal,
    pub material_multiplier: Decimal,
    pub unit_price: Decimal,
    pub total_price: Decimal,
    pub rule_found: bool,
}

impl BoardCharge {
    pub fn missing() -> Self {
        Self {
            base_price: Decimal::ZERO,
            length_charge: Decimal::ZERO,
            width_charge: Decimal::ZERO,
            mitre_charge: Decimal::ZERO,
            material_multiplier: Decimal::ZERO,
            unit_price: Decimal::ZERO,
            total_price: Decimal::ZERO,
            rule_found: false,
        }
    }
}

/// What a priced board line stands for.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LineKind {
    Tread {
        riser_number: u32,
        tread_type: TreadType,
    },
    LandingTread,
    Riser {
        riser_type: RiserType,
    },
    Stringer {
        side: StringerSide,
    },
    LegacyStringer,
    CenterHorse,
}

/// A board line after pricing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricedLine {
    pub kind: LineKind,
    pub board_type: BoardType,
    pub material_id: Option<i32>,
    pub length: Decimal,
    pub width: Decimal,
    pub quantity: u32,
    pub mitre: bool,
    pub charge: BoardCharge,
}

/// A special part after pricing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpecialPartLine {
    pub part_id: i32,
    pub material_id: i32,
    pub quantity: u32,
    pub unit_cost: Decimal,
    pub labor_cost: Decimal,
    pub total_price: Decimal,
    pub labor_total: Decimal,
    pub found: bool,
}

/// Itemized quote for one staircase. Never persisted as a whole.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceBreakdown {
    pub riser_height: Decimal,
    pub treads: Vec<PricedLine>,
    pub risers: Vec<PricedLine>,
    pub stringers: Vec<PricedLine>,
    pub special_parts: Vec<SpecialPartLine>,
    pub subtotal: Decimal,
    pub labor_total: Decimal,
    pub tax_rate: Decimal,
    pub tax_amount: Decimal,
    pub total: Decimal,
}
