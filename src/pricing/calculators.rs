//! Core pricing calculation functions.
//!
//! Pure functions for pricing math - no database access. Planning turns a
//! specification into board requests; pricing turns a request plus its catalog
//! rule into charges.

use std::collections::BTreeMap;

use rust_decimal::prelude::*;
use rust_decimal::Decimal;

use crate::config::EngineConfig;

use super::models::{
    BoardCharge, BoardPricingRule, BoardRuleKey, BoardType, LineKind, RiserType,
    StairSpecification, StringerConfig, StringerSide,
};

/// An intermediate amount outside the range of `Decimal` or `u32`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{0} is too large to compute")]
pub struct Overflow(pub &'static str);

fn mul(a: Decimal, b: Decimal, what: &'static str) -> Result<Decimal, Overflow> {
    a.checked_mul(b).ok_or(Overflow(what))
}

fn add(a: Decimal, b: Decimal, what: &'static str) -> Result<Decimal, Overflow> {
    a.checked_add(b).ok_or(Overflow(what))
}

/// Round money with banker's rounding; response DTOs use two places.
///
/// ```
/// use rust_decimal_macros::dec;
/// use stairshop_web::pricing::round_money;
///
/// assert_eq!(round_money(dec!(100.005), 2), dec!(100.00));
/// ```
pub fn round_money(amount: Decimal, places: u32) -> Decimal {
    amount.round_dp_with_strategy(places, RoundingStrategy::MidpointNearestEven)
}

/// Round a dimension in inches for display (4 places).
pub fn round_dimension(value: Decimal) -> Decimal {
    value
        .round_dp_with_strategy(4, RoundingStrategy::MidpointNearestEven)
        .normalize()
}

/// Charge for the overage of `actual` above `base`, billed per started increment.
///
/// No overage, or a non-positive increment size, is never charged.
pub fn increment_charge(
    actual: Decimal,
    base: Decimal,
    increment_size: Decimal,
    increment_price: Decimal,
) -> Result<Decimal, Overflow> {
    let overage = actual.checked_sub(base).ok_or(Overflow("increment"))?;
    if overage <= Decimal::ZERO || increment_size <= Decimal::ZERO {
        return Ok(Decimal::ZERO);
    }
    let increments = overage
        .checked_div(increment_size)
        .ok_or(Overflow("increment"))?
        .ceil();
    mul(increments, increment_price, "increment")
}

/// One board line to be priced through the board-rule formula.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardRequest {
    pub kind: LineKind,
    pub board_type: BoardType,
    pub material_id: Option<i32>,
    /// Value on the rule's length axis.
    pub length: Decimal,
    /// Value on the rule's width axis.
    pub width: Decimal,
    pub quantity: u32,
    pub mitre: bool,
}

impl BoardRequest {
    pub fn rule_key(&self) -> Option<BoardRuleKey> {
        self.material_id
            .map(|material_id| BoardRuleKey::new(self.board_type, material_id))
    }
}

/// Price one board line.
///
/// `unit_price = (base + length_charge + width_charge) * multiplier + mitre`,
/// `total_price = unit_price * quantity`. The multiplier never applies to the
/// mitre surcharge and defaults to 1 when the material has none.
pub fn price_board(
    rule: Option<&BoardPricingRule>,
    material_multiplier: Option<Decimal>,
    request: &BoardRequest,
) -> Result<BoardCharge, Overflow> {
    let Some(rule) = rule else {
        return Ok(BoardCharge::missing());
    };

    let length_charge = increment_charge(
        request.length,
        rule.base_length,
        rule.length_increment_size,
        rule.length_increment_price,
    )?;
    let width_charge = increment_charge(
        request.width,
        rule.base_width,
        rule.width_increment_size,
        rule.width_increment_price,
    )?;
    let multiplier = material_multiplier.unwrap_or(Decimal::ONE);
    let mitre_charge = if request.mitre {
        rule.mitre_price
    } else {
        Decimal::ZERO
    };

    let board = add(
        add(rule.base_price, length_charge, "unit_price")?,
        width_charge,
        "unit_price",
    )?;
    let unit_price = add(mul(board, multiplier, "unit_price")?, mitre_charge, "unit_price")?;
    let total_price = mul(unit_price, Decimal::from(request.quantity), "total_price")?;

    Ok(BoardCharge {
        base_price: rule.base_price,
        length_charge,
        width_charge,
        mitre_charge,
        material_multiplier: multiplier,
        unit_price,
        total_price,
        rule_found: true,
    })
}

/// A group of risers priced together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiserGroup {
    pub riser_type: RiserType,
    pub width: Decimal,
    pub count: u32,
}

/// Group the risers of a staircase by (riser type, stair width).
///
/// Groups come out ordered by key, so tread order never changes the result. The
/// landing tread adds one standard riser at the first tread's width.
pub fn group_risers(spec: &StairSpecification, config: &EngineConfig) -> Vec<RiserGroup> {
    let mut groups: BTreeMap<(RiserType, Decimal), u32> = BTreeMap::new();

    for tread in &spec.treads {
        let key = (tread.tread_type.riser_type(), tread.stair_width.normalize());
        *groups.entry(key).or_insert(0) += 1;
    }

    if spec.include_landing_tread {
        let width = spec
            .first_stair_width()
            .unwrap_or(config.default_stair_width)
            .normalize();
        *groups.entry((RiserType::Standard, width)).or_insert(0) += 1;
    }

    groups
        .into_iter()
        .map(|((riser_type, width), count)| RiserGroup {
            riser_type,
            width,
            count,
        })
        .collect()
}

/// Every board line of a specification, before any catalog lookup.
#[derive(Debug, Clone, Default)]
pub struct PricingPlan {
    pub treads: Vec<BoardRequest>,
    pub risers: Vec<BoardRequest>,
    pub stringers: Vec<BoardRequest>,
}

impl PricingPlan {
    pub fn lines(&self) -> impl Iterator<Item = &BoardRequest> {
        self.treads
            .iter()
            .chain(self.risers.iter())
            .chain(self.stringers.iter())
    }

    /// Distinct rule keys needed to price the plan, in key order.
    pub fn rule_keys(&self) -> Vec<BoardRuleKey> {
        let mut keys: Vec<BoardRuleKey> = self.lines().filter_map(BoardRequest::rule_key).collect();
        keys.sort();
        keys.dedup();
        keys
    }

    /// Distinct material ids needed to price the plan.
    pub fn material_ids(&self) -> Vec<i32> {
        let mut ids: Vec<i32> = self.lines().filter_map(|line| line.material_id).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}

/// Plan the tread, riser, stringer and center horse lines of a specification.
pub fn plan_lines(spec: &StairSpecification, config: &EngineConfig) -> Result<PricingPlan, Overflow> {
    Ok(PricingPlan {
        treads: plan_treads(spec, config)?,
        risers: plan_risers(spec, config),
        stringers: plan_stringers(spec, config)?,
    })
}

fn plan_treads(
    spec: &StairSpecification,
    config: &EngineConfig,
) -> Result<Vec<BoardRequest>, Overflow> {
    let tread_width = add(spec.rough_cut_width, spec.nose_size, "rough_cut_width")?;

    let mut lines: Vec<BoardRequest> = spec
        .treads
        .iter()
        .map(|tread| BoardRequest {
            kind: LineKind::Tread {
                riser_number: tread.riser_number,
                tread_type: tread.tread_type,
            },
            board_type: tread.tread_type.board_type(),
            material_id: spec.tread_material_id,
            length: tread.stair_width,
            width: tread_width,
            quantity: 1,
            mitre: spec.full_mitre,
        })
        .collect();

    if spec.include_landing_tread {
        lines.push(BoardRequest {
            kind: LineKind::LandingTread,
            board_type: BoardType::BoxTread,
            material_id: spec.tread_material_id,
            length: spec.first_stair_width().unwrap_or(config.default_stair_width),
            width: config.landing_tread_width,
            quantity: 1,
            mitre: spec.full_mitre,
        });
    }

    Ok(lines)
}

fn plan_risers(spec: &StairSpecification, config: &EngineConfig) -> Vec<BoardRequest> {
    group_risers(spec, config)
        .into_iter()
        .map(|group| BoardRequest {
            kind: LineKind::Riser {
                riser_type: group.riser_type,
            },
            board_type: BoardType::Riser,
            material_id: spec.riser_material_id,
            length: group.width,
            width: config.riser_board_width,
            quantity: group.count,
            mitre: false,
        })
        .collect()
}

fn plan_stringers(
    spec: &StairSpecification,
    config: &EngineConfig,
) -> Result<Vec<BoardRequest>, Overflow> {
    let mut lines = Vec::new();
    let mut center_priced = false;
    let stringers = spec.stringers.as_ref();
    let legacy = stringers.and_then(StringerConfig::legacy);

    if let Some(individual) = stringers.and_then(StringerConfig::individual) {
        for (side, stringer) in individual.sides() {
            let board_type = match side {
                StringerSide::Left | StringerSide::Right => BoardType::Stringer,
                StringerSide::Center => {
                    center_priced = true;
                    BoardType::CenterHorse
                }
            };
            // thickness rides the rule's length axis
            lines.push(BoardRequest {
                kind: LineKind::Stringer { side },
                board_type,
                material_id: Some(stringer.material_id),
                length: stringer.thickness,
                width: stringer.width,
                quantity: spec.num_risers,
                mitre: false,
            });
        }
    } else if let Some(legacy) = legacy {
        lines.push(BoardRequest {
            kind: LineKind::LegacyStringer,
            board_type: BoardType::Stringer,
            material_id: legacy.material_id,
            length: legacy.thickness,
            width: legacy.width,
            quantity: spec
                .num_risers
                .checked_mul(spec.num_stringers)
                .ok_or(Overflow("num_stringers"))?,
            mitre: false,
        });
    }

    if spec.center_horses > 0 && !center_priced {
        let (thickness, width) = match legacy {
            Some(legacy) => (
                mul(legacy.thickness, Decimal::TWO, "stringer_type")?,
                legacy.width,
            ),
            None => (
                config.default_center_horse_thickness,
                config.default_stringer_width,
            ),
        };
        let material_id = stringers
            .and_then(StringerConfig::material_id)
            .or(spec.tread_material_id)
            .unwrap_or(config.fallback_material_id);

        lines.push(BoardRequest {
            kind: LineKind::CenterHorse,
            board_type: BoardType::CenterHorse,
            material_id: Some(material_id),
            length: thickness,
            width,
            quantity: spec
                .num_risers
                .checked_mul(spec.center_horses)
                .ok_or(Overflow("center_horses"))?,
            mitre: false,
        });
    }

    Ok(lines)
}

/// Money totals of a breakdown.
#[derive(Debug, Clone, PartialEq)]
pub struct Totals {
    pub subtotal: Decimal,
    pub labor_total: Decimal,
    pub tax_rate: Decimal,
    pub tax_amount: Decimal,
    pub total: Decimal,
}

/// `tax = subtotal * rate`, `total = subtotal + labor + tax`. Labor is not taxed.
pub fn calculate_totals(
    subtotal: Decimal,
    labor_total: Decimal,
    tax_rate: Decimal,
) -> Result<Totals, Overflow> {
    let tax_amount = mul(subtotal, tax_rate, "tax_amount")?;
    let total = add(add(subtotal, labor_total, "total")?, tax_amount, "total")?;
    Ok(Totals {
        subtotal,
        labor_total,
        tax_rate,
        tax_amount,
        total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::models::{
        IndividualStringers, LegacyStringer, StringerSpec, TreadSpec, TreadType,
    };
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn rule() -> BoardPricingRule {
        BoardPricingRule {
            id: 1,
            board_type_id: 1,
            material_id: 1,
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

    fn request(length: Decimal, width: Decimal, quantity: u32, mitre: bool) -> BoardRequest {
        BoardRequest {
            kind: LineKind::LandingTread,
            board_type: BoardType::BoxTread,
            material_id: Some(1),
            length,
            width,
            quantity,
            mitre,
        }
    }

    fn tread(riser_number: u32, tread_type: TreadType, stair_width: Decimal) -> TreadSpec {
        TreadSpec {
            riser_number,
            tread_type,
            stair_width,
        }
    }

    fn spec(treads: Vec<TreadSpec>) -> StairSpecification {
        StairSpecification {
            floor_to_floor: dec!(108),
            num_risers: 14,
            tread_material_id: Some(1),
            riser_material_id: Some(2),
            rough_cut_width: dec!(10),
            nose_size: dec!(1.25),
            treads,
            stringers: None,
            num_stringers: 2,
            center_horses: 0,
            full_mitre: false,
            bracket_type: None,
            special_notes: None,
            special_parts: vec![],
            include_landing_tread: false,
        }
    }

    // ==================== round_money tests ====================

    #[test]
    fn test_round_money_bankers_rounding_to_even() {
        assert_eq!(round_money(dec!(2.5), 0), dec!(2));
        assert_eq!(round_money(dec!(3.5), 0), dec!(4));
        assert_eq!(round_money(dec!(2.345), 2), dec!(2.34));
        assert_eq!(round_money(dec!(2.355), 2), dec!(2.36));
    }

    #[test]
    fn test_round_money_normal_rounding() {
        assert_eq!(round_money(dec!(1.234), 2), dec!(1.23));
        assert_eq!(round_money(dec!(1.236), 2), dec!(1.24));
        assert_eq!(round_money(dec!(999999.995), 2), dec!(1000000.00));
    }

    #[test]
    fn test_round_dimension() {
        assert_eq!(round_dimension(dec!(108) / dec!(14)), dec!(7.7143));
        assert_eq!(round_dimension(dec!(36.7500)), dec!(36.75));
    }

    // ==================== increment_charge tests ====================

    #[test]
    fn test_increment_charge_at_or_below_base_is_free() {
        assert_eq!(increment_charge(dec!(36), dec!(36), dec!(1), dec!(2)).unwrap(), dec!(0));
        assert_eq!(increment_charge(dec!(30), dec!(36), dec!(1), dec!(2)).unwrap(), dec!(0));
        assert_eq!(increment_charge(dec!(0), dec!(36), dec!(6), dec!(100)).unwrap(), dec!(0));
    }

    #[test]
    fn test_increment_charge_bills_started_increments() {
        // 1.25 over at 1" increments -> 2 increments
        assert_eq!(increment_charge(dec!(11.25), dec!(10), dec!(1), dec!(3)).unwrap(), dec!(6));
        // 0.01 over still starts an increment
        assert_eq!(increment_charge(dec!(36.01), dec!(36), dec!(6), dec!(4)).unwrap(), dec!(4));
        // exactly two 6" increments
        assert_eq!(increment_charge(dec!(48), dec!(36), dec!(6), dec!(4)).unwrap(), dec!(8));
        // decimal increments stay exact
        assert_eq!(increment_charge(dec!(36.6), dec!(36), dec!(0.2), dec!(1)).unwrap(), dec!(3));
    }

    #[test]
    fn test_increment_charge_zero_increment_size() {
        assert_eq!(increment_charge(dec!(48), dec!(36), dec!(0), dec!(4)).unwrap(), dec!(0));
    }

    // ==================== price_board tests ====================

    #[test]
    fn test_price_board_box_tread_scenario() {
        let charge = price_board(Some(&rule()), Some(dec!(1.0)), &request(dec!(36), dec!(11.25), 1, false)).unwrap();
        assert_eq!(charge.base_price, dec!(50));
        assert_eq!(charge.length_charge, dec!(0));
        assert_eq!(charge.width_charge, dec!(6));
        assert_eq!(charge.mitre_charge, dec!(0));
        assert_eq!(charge.unit_price, dec!(56));
        assert_eq!(charge.total_price, dec!(56));
        assert!(charge.rule_found);
    }

    #[test]
    fn test_price_board_missing_rule_is_zero() {
        let charge = price_board(None, Some(dec!(2)), &request(dec!(48), dec!(12), 3, true)).unwrap();
        assert_eq!(charge, BoardCharge::missing());
        assert_eq!(charge.total_price, dec!(0));
        assert!(!charge.rule_found);
    }

    #[test]
    fn test_price_board_multiplier_defaults_to_one() {
        let charge = price_board(Some(&rule()), None, &request(dec!(36), dec!(10), 1, false)).unwrap();
        assert_eq!(charge.material_multiplier, dec!(1));
        assert_eq!(charge.unit_price, dec!(50));
    }

    #[test]
    fn test_price_board_multiplier_skips_mitre() {
        // (50 + 2*2 + 0) * 1.5 + 25 = 106
        let charge = price_board(Some(&rule()), Some(dec!(1.5)), &request(dec!(38), dec!(10), 1, true)).unwrap();
        assert_eq!(charge.length_charge, dec!(4));
        assert_eq!(charge.mitre_charge, dec!(25));
        assert_eq!(charge.unit_price, dec!(106));
    }

    #[test]
    fn test_price_board_mitre_is_multiplied_by_quantity() {
        // mitre is part of unit_price, so total carries mitre * quantity
        let charge = price_board(Some(&rule()), None, &request(dec!(36), dec!(10), 3, true)).unwrap();
        assert_eq!(charge.unit_price, dec!(75));
        assert_eq!(charge.total_price, dec!(225));
    }

    #[test]
    fn test_price_board_monotonic_in_dimensions_and_multiplier() {
        let r = rule();
        let mut previous = Decimal::ZERO;
        for length in [dec!(30), dec!(36), dec!(36.5), dec!(40), dec!(52)] {
            let unit = price_board(Some(&r), None, &request(length, dec!(10), 1, false)).unwrap().unit_price;
            assert!(unit >= previous);
            previous = unit;
        }

        let mut previous = Decimal::ZERO;
        for width in [dec!(8), dec!(10), dec!(10.1), dec!(12), dec!(15)] {
            let unit = price_board(Some(&r), None, &request(dec!(36), width, 1, false)).unwrap().unit_price;
            assert!(unit >= previous);
            previous = unit;
        }

        let mut previous = Decimal::ZERO;
        for multiplier in [dec!(0), dec!(0.5), dec!(1), dec!(1.25), dec!(3)] {
            let unit =
                price_board(Some(&r), Some(multiplier), &request(dec!(40), dec!(12), 1, true)).unwrap().unit_price;
            assert!(unit >= previous);
            previous = unit;
        }
    }

    #[test]
    fn test_price_board_overflow_is_an_error() {
        let huge = BoardPricingRule {
            base_price: Decimal::MAX,
            ..rule()
        };
        assert_eq!(
            price_board(Some(&huge), Some(dec!(2)), &request(dec!(36), dec!(10), 1, false)),
            Err(Overflow("unit_price"))
        );
        assert_eq!(
            price_board(Some(&rule()), None, &request(Decimal::MAX, dec!(10), 1, false)),
            Err(Overflow("increment"))
        );
        assert_eq!(
            price_board(Some(&huge), None, &request(dec!(36), dec!(10), 3, false)),
            Err(Overflow("total_price"))
        );
    }

    // ==================== riser grouping tests ====================

    #[test]
    fn test_group_risers_by_type_and_width() {
        let s = spec(vec![
            tread(1, TreadType::Box, dec!(36)),
            tread(2, TreadType::OpenLeft, dec!(36)),
            tread(3, TreadType::OpenRight, dec!(36)),
            tread(4, TreadType::Box, dec!(42)),
            tread(5, TreadType::DoubleOpen, dec!(36)),
            tread(6, TreadType::Box, dec!(36.0)),
        ]);
        let groups = group_risers(&s, &EngineConfig::default());

        assert_eq!(
            groups,
            vec![
                RiserGroup { riser_type: RiserType::Standard, width: dec!(36), count: 2 },
                RiserGroup { riser_type: RiserType::Standard, width: dec!(42), count: 1 },
                RiserGroup { riser_type: RiserType::Open, width: dec!(36), count: 2 },
                RiserGroup { riser_type: RiserType::DoubleOpen, width: dec!(36), count: 1 },
            ]
        );
    }

    #[test]
    fn test_group_risers_stable_under_reordering() {
        let treads = vec![
            tread(1, TreadType::Box, dec!(36)),
            tread(2, TreadType::OpenLeft, dec!(40)),
            tread(3, TreadType::DoubleOpen, dec!(36)),
            tread(4, TreadType::Box, dec!(40)),
            tread(5, TreadType::Box, dec!(36)),
        ];
        let config = EngineConfig::default();
        let forward = group_risers(&spec(treads.clone()), &config);

        let mut reversed = treads.clone();
        reversed.reverse();
        assert_eq!(group_risers(&spec(reversed), &config), forward);

        let mut rotated = treads;
        rotated.rotate_left(2);
        assert_eq!(group_risers(&spec(rotated), &config), forward);
    }

    #[test]
    fn test_group_risers_landing_adds_standard_riser() {
        let mut s = spec(vec![
            tread(1, TreadType::OpenLeft, dec!(40)),
            tread(2, TreadType::Box, dec!(36)),
        ]);
        s.include_landing_tread = true;
        let groups = group_risers(&s, &EngineConfig::default());

        // landing riser is keyed by the first tread's width
        assert!(groups.contains(&RiserGroup {
            riser_type: RiserType::Standard,
            width: dec!(40),
            count: 1,
        }));

        let mut landing_only = spec(vec![]);
        landing_only.include_landing_tread = true;
        assert_eq!(
            group_risers(&landing_only, &EngineConfig::default()),
            vec![RiserGroup { riser_type: RiserType::Standard, width: dec!(38), count: 1 }]
        );
    }

    // ==================== planning tests ====================

    #[test]
    fn test_plan_treads_map_dimensions() {
        let mut s = spec(vec![
            tread(1, TreadType::Box, dec!(36)),
            tread(2, TreadType::OpenLeft, dec!(36)),
            tread(3, TreadType::DoubleOpen, dec!(40)),
        ]);
        s.full_mitre = true;
        let plan = plan_lines(&s, &EngineConfig::default()).unwrap();

        let boards: Vec<BoardType> = plan.treads.iter().map(|t| t.board_type).collect();
        assert_eq!(
            boards,
            vec![BoardType::BoxTread, BoardType::SingleOpenTread, BoardType::DoubleOpenTread]
        );
        for line in &plan.treads {
            assert_eq!(line.width, dec!(11.25));
            assert_eq!(line.quantity, 1);
            // the global flag applies to every tread type
            assert!(line.mitre);
        }
        assert_eq!(plan.treads[2].length, dec!(40));
    }

    #[test]
    fn test_plan_landing_tread() {
        let mut s = spec(vec![tread(1, TreadType::Box, dec!(44))]);
        s.include_landing_tread = true;
        let plan = plan_lines(&s, &EngineConfig::default()).unwrap();

        let landing = plan.treads.last().unwrap();
        assert_eq!(landing.kind, LineKind::LandingTread);
        assert_eq!(landing.board_type, BoardType::BoxTread);
        assert_eq!(landing.length, dec!(44));
        assert_eq!(landing.width, dec!(3.5));

        let mut empty = spec(vec![]);
        empty.include_landing_tread = true;
        let plan = plan_lines(&empty, &EngineConfig::default()).unwrap();
        assert_eq!(plan.treads[0].length, dec!(38));
    }

    #[test]
    fn test_plan_risers_fixed_width_and_group_quantity() {
        let s = spec(vec![
            tread(1, TreadType::Box, dec!(36)),
            tread(2, TreadType::Box, dec!(36)),
            tread(3, TreadType::Box, dec!(36)),
        ]);
        let plan = plan_lines(&s, &EngineConfig::default()).unwrap();
        assert_eq!(plan.risers.len(), 1);
        let riser = &plan.risers[0];
        assert_eq!(riser.board_type, BoardType::Riser);
        assert_eq!(riser.material_id, Some(2));
        assert_eq!(riser.length, dec!(36));
        assert_eq!(riser.width, dec!(8));
        assert_eq!(riser.quantity, 3);
        assert!(!riser.mitre);
    }

    #[test]
    fn test_plan_individual_stringers() {
        let mut s = spec(vec![tread(1, TreadType::Box, dec!(36))]);
        s.center_horses = 1;
        s.stringers = Some(StringerConfig::Individual(IndividualStringers {
            left: Some(StringerSpec { width: dec!(11.25), thickness: dec!(1), material_id: 3 }),
            right: Some(StringerSpec { width: dec!(9.25), thickness: dec!(1.5), material_id: 3 }),
            center: Some(StringerSpec { width: dec!(9.25), thickness: dec!(2), material_id: 5 }),
        }));
        let plan = plan_lines(&s, &EngineConfig::default()).unwrap();

        assert_eq!(plan.stringers.len(), 3);
        let types: Vec<BoardType> = plan.stringers.iter().map(|l| l.board_type).collect();
        assert_eq!(
            types,
            vec![BoardType::Stringer, BoardType::Stringer, BoardType::CenterHorse]
        );
        let right = &plan.stringers[1];
        assert_eq!(right.length, dec!(1.5));
        assert_eq!(right.width, dec!(9.25));
        assert_eq!(right.quantity, 14);
        // center stringer already priced, no extra center horse line
        assert!(!plan.stringers.iter().any(|l| l.kind == LineKind::CenterHorse));
    }

    #[test]
    fn test_plan_legacy_stringer_and_center_horse() {
        let mut s = spec(vec![tread(1, TreadType::Box, dec!(36))]);
        s.num_stringers = 3;
        s.center_horses = 2;
        s.stringers = Some(StringerConfig::Legacy(
            LegacyStringer::parse_label("1.5x11.25_Oak", Some(7)).unwrap(),
        ));
        let plan = plan_lines(&s, &EngineConfig::default()).unwrap();

        assert_eq!(plan.stringers.len(), 2);
        let legacy = &plan.stringers[0];
        assert_eq!(legacy.kind, LineKind::LegacyStringer);
        assert_eq!(legacy.board_type, BoardType::Stringer);
        assert_eq!(legacy.length, dec!(1.5));
        assert_eq!(legacy.width, dec!(11.25));
        assert_eq!(legacy.quantity, 42);

        let horse = &plan.stringers[1];
        assert_eq!(horse.kind, LineKind::CenterHorse);
        assert_eq!(horse.length, dec!(3.0));
        assert_eq!(horse.width, dec!(11.25));
        assert_eq!(horse.quantity, 28);
        assert_eq!(horse.material_id, Some(7));
    }

    #[test]
    fn test_plan_center_horse_defaults() {
        let mut s = spec(vec![tread(1, TreadType::Box, dec!(36))]);
        s.center_horses = 1;
        s.tread_material_id = Some(8);
        let plan = plan_lines(&s, &EngineConfig::default()).unwrap();

        let horse = &plan.stringers[0];
        assert_eq!(horse.length, dec!(2));
        assert_eq!(horse.width, dec!(9.25));
        assert_eq!(horse.quantity, 14);
        // falls back to the tread material
        assert_eq!(horse.material_id, Some(8));

        s.tread_material_id = None;
        let config = EngineConfig {
            fallback_material_id: 99,
            ..EngineConfig::default()
        };
        let plan = plan_lines(&s, &config).unwrap();
        assert_eq!(plan.stringers[0].material_id, Some(99));
    }

    #[test]
    fn test_plan_rule_keys_are_distinct() {
        let s = spec(vec![
            tread(1, TreadType::Box, dec!(36)),
            tread(2, TreadType::Box, dec!(40)),
            tread(3, TreadType::OpenLeft, dec!(36)),
        ]);
        let plan = plan_lines(&s, &EngineConfig::default()).unwrap();
        assert_eq!(
            plan.rule_keys(),
            vec![
                BoardRuleKey::new(BoardType::BoxTread, 1),
                BoardRuleKey::new(BoardType::SingleOpenTread, 1),
                BoardRuleKey::new(BoardType::Riser, 2),
            ]
        );
        assert_eq!(plan.material_ids(), vec![1, 2]);
    }

    #[test]
    fn test_plan_stringer_quantity_overflow_is_an_error() {
        let mut s = spec(vec![tread(1, TreadType::Box, dec!(36))]);
        s.num_risers = 3_000_000_000;
        s.stringers = Some(StringerConfig::Legacy(
            LegacyStringer::parse_label("1x9.25_Maple", Some(3)).unwrap(),
        ));
        assert_eq!(
            plan_lines(&s, &EngineConfig::default()).unwrap_err(),
            Overflow("num_stringers")
        );

        s.stringers = None;
        s.center_horses = 2;
        assert_eq!(
            plan_lines(&s, &EngineConfig::default()).unwrap_err(),
            Overflow("center_horses")
        );
    }

    // ==================== calculate_totals tests ====================

    #[test]
    fn test_calculate_totals() {
        let totals = calculate_totals(dec!(168), dec!(20), dec!(0.06)).unwrap();
        assert_eq!(totals.tax_amount, dec!(10.08));
        assert_eq!(totals.total, dec!(198.08));
    }

    #[test]
    fn test_calculate_totals_overflow_is_an_error() {
        assert_eq!(
            calculate_totals(Decimal::MAX, dec!(1), dec!(0)),
            Err(Overflow("total"))
        );
        assert_eq!(
            calculate_totals(Decimal::MAX, dec!(0), dec!(2)),
            Err(Overflow("tax_amount"))
        );
    }
}
