//! Pricing service functions with catalog access.
//!
//! A specification is validated, planned into board lines, the catalog data for
//! every distinct key is fetched in one batch per table, and the plan is then
//! priced entirely in memory.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::config::EngineConfig;
use crate::db::{PricingCatalog, StoreError};

use super::calculators::{self, BoardRequest, Overflow, PricingPlan};
use super::models::{
    BoardPricingRule, BoardRuleKey, LineKind, PriceBreakdown, PricedLine, SpecialPartCost,
    SpecialPartLine, StairSpecification, StringerConfig, StringerSide, StringerSpec,
};

/// Which pricing endpoint is being served.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PricingFlow {
    #[default]
    Simplified,
    /// Older price-rule endpoint: also bills installation labor per legacy
    /// stringer unit.
    LegacyPriceRules,
}

#[derive(Debug, Clone, Default)]
pub struct PricingOptions {
    /// Owning job, whose stored tax rate overrides the default.
    pub job_id: Option<i64>,
    pub flow: PricingFlow,
    /// Point in time for rule activation (default: now).
    pub as_of: Option<DateTime<Utc>>,
}

/// Pricing calculation error types
#[derive(Debug, thiserror::Error)]
pub enum PricingError {
    #[error("Invalid specification: {field}: {reason}")]
    InvalidSpecification { field: String, reason: String },

    #[error("Pricing catalog unavailable: {0}")]
    LookupUnavailable(#[from] StoreError),
}

impl PricingError {
    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        PricingError::InvalidSpecification {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<Overflow> for PricingError {
    fn from(overflow: Overflow) -> Self {
        PricingError::invalid(overflow.0, overflow.to_string())
    }
}

/// Largest staircase accepted, in risers. Also bounds the tread list.
pub const MAX_RISERS: u32 = 100;
pub const MAX_STRINGERS: u32 = 10;
pub const MAX_CENTER_HORSES: u32 = 10;
pub const MAX_SPECIAL_PART_QUANTITY: u32 = 10_000;
/// Upper bound for every dimension, in inches.
pub const MAX_DIMENSION: Decimal = dec!(10000);

fn at_most<T>(field: impl Into<String>, value: T, max: T) -> Result<(), PricingError>
where
    T: PartialOrd + std::fmt::Display,
{
    if value > max {
        return Err(PricingError::invalid(field, format!("must be at most {max}")));
    }
    Ok(())
}

/// Reject a specification that is structurally unusable.
pub fn validate_specification(spec: &StairSpecification) -> Result<(), PricingError> {
    if spec.num_risers < 2 {
        return Err(PricingError::invalid("num_risers", "must be at least 2"));
    }
    at_most("num_risers", spec.num_risers, MAX_RISERS)?;
    at_most("num_stringers", spec.num_stringers, MAX_STRINGERS)?;
    at_most("center_horses", spec.center_horses, MAX_CENTER_HORSES)?;
    at_most("treads", spec.treads.len(), MAX_RISERS as usize)?;
    if spec.floor_to_floor <= Decimal::ZERO {
        return Err(PricingError::invalid("floor_to_floor", "must be positive"));
    }
    at_most("floor_to_floor", spec.floor_to_floor, MAX_DIMENSION)?;
    at_most("rough_cut_width", spec.rough_cut_width, MAX_DIMENSION)?;
    at_most("nose_size", spec.nose_size, MAX_DIMENSION)?;
    if spec.treads.is_empty() && !spec.include_landing_tread {
        return Err(PricingError::invalid(
            "treads",
            "at least one tread is required unless a landing tread is requested",
        ));
    }
    if spec.rough_cut_width < Decimal::ZERO {
        return Err(PricingError::invalid("rough_cut_width", "must not be negative"));
    }
    if spec.nose_size < Decimal::ZERO {
        return Err(PricingError::invalid("nose_size", "must not be negative"));
    }

    for (i, tread) in spec.treads.iter().enumerate() {
        if tread.stair_width <= Decimal::ZERO {
            return Err(PricingError::invalid(
                format!("treads[{i}].stair_width"),
                "must be positive",
            ));
        }
        at_most(format!("treads[{i}].stair_width"), tread.stair_width, MAX_DIMENSION)?;
        if tread.riser_number == 0 || tread.riser_number > spec.num_risers {
            return Err(PricingError::invalid(
                format!("treads[{i}].riser_number"),
                format!("must be between 1 and {}", spec.num_risers),
            ));
        }
    }

    match &spec.stringers {
        Some(StringerConfig::Individual(individual)) => {
            for (side, stringer) in individual.sides() {
                validate_stringer(&format!("stringers.{}", side_name(side)), stringer)?;
            }
        }
        Some(StringerConfig::Legacy(legacy)) => {
            if legacy.thickness <= Decimal::ZERO || legacy.width <= Decimal::ZERO {
                return Err(PricingError::invalid(
                    "stringer_type",
                    "thickness and width must be positive",
                ));
            }
            at_most("stringer_type", legacy.thickness.max(legacy.width), MAX_DIMENSION)?;
        }
        None => {}
    }

    for (i, part) in spec.special_parts.iter().enumerate() {
        at_most(
            format!("special_parts[{i}].quantity"),
            part.quantity,
            MAX_SPECIAL_PART_QUANTITY,
        )?;
    }

    if !spec.include_landing_tread && spec.num_risers as usize != spec.treads.len() + 1 {
        tracing::warn!(
            num_risers = spec.num_risers,
            treads = spec.treads.len(),
            "Riser count does not match tread count"
        );
    }

    Ok(())
}

fn validate_stringer(field: &str, stringer: &StringerSpec) -> Result<(), PricingError> {
    if stringer.width <= Decimal::ZERO {
        return Err(PricingError::invalid(format!("{field}.width"), "must be positive"));
    }
    if stringer.thickness <= Decimal::ZERO {
        return Err(PricingError::invalid(format!("{field}.thickness"), "must be positive"));
    }
    at_most(format!("{field}.width"), stringer.width, MAX_DIMENSION)?;
    at_most(format!("{field}.thickness"), stringer.thickness, MAX_DIMENSION)?;
    Ok(())
}

fn side_name(side: StringerSide) -> &'static str {
    match side {
        StringerSide::Left => "left",
        StringerSide::Right => "right",
        StringerSide::Center => "center",
    }
}

/// Catalog data needed to price one specification.
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    pub rules: HashMap<BoardRuleKey, BoardPricingRule>,
    pub multipliers: HashMap<i32, Decimal>,
    pub special_parts: HashMap<(i32, i32), SpecialPartCost>,
    /// Stored tax rate of the owning job, if any.
    pub job_tax_rate: Option<Decimal>,
}

/// Fetch everything the plan and the special parts reference, one batch per table.
pub async fn prefetch<C: PricingCatalog + ?Sized>(
    catalog: &C,
    spec: &StairSpecification,
    plan: &PricingPlan,
    job_id: Option<i64>,
    as_of: DateTime<Utc>,
) -> Result<CatalogSnapshot, PricingError> {
    let rule_keys = plan.rule_keys();
    let material_ids = plan.material_ids();
    let mut part_keys: Vec<(i32, i32)> = spec
        .special_parts
        .iter()
        .map(|part| (part.part_id, part.material_id))
        .collect();
    part_keys.sort_unstable();
    part_keys.dedup();

    let tax_rate = async {
        match job_id {
            Some(job_id) => catalog.job_tax_rate(job_id).await,
            None => Ok(None),
        }
    };

    let (rules, multipliers, parts, job_tax_rate) = tokio::try_join!(
        catalog.board_pricing_rules(&rule_keys, as_of),
        catalog.material_multipliers(&material_ids),
        catalog.special_parts(&part_keys),
        tax_rate,
    )?;

    Ok(CatalogSnapshot {
        rules: rules.into_iter().map(|rule| (rule.key(), rule)).collect(),
        multipliers: multipliers
            .into_iter()
            .filter(|m| {
                if m.multiplier < Decimal::ZERO {
                    tracing::warn!(
                        material_id = m.material_id,
                        multiplier = %m.multiplier,
                        "Negative material multiplier ignored"
                    );
                    return false;
                }
                true
            })
            .map(|m| (m.material_id, m.multiplier))
            .collect(),
        special_parts: parts
            .into_iter()
            .map(|part| ((part.part_id, part.material_id), part))
            .collect(),
        job_tax_rate,
    })
}

/// Compute the itemized price of a staircase.
///
/// Lines without an active rule, multiplier or special part record are priced at
/// zero; only an invalid specification or an unreachable catalog is an error.
pub async fn compute_stair_price<C: PricingCatalog + ?Sized>(
    catalog: &C,
    config: &EngineConfig,
    spec: &StairSpecification,
    options: &PricingOptions,
) -> Result<PriceBreakdown, PricingError> {
    validate_specification(spec)?;

    let as_of = options.as_of.unwrap_or_else(Utc::now);
    // grouping is complete before the first lookup
    let plan = calculators::plan_lines(spec, config)?;
    let snapshot = prefetch(catalog, spec, &plan, options.job_id, as_of).await?;

    let breakdown = price_plan(spec, &plan, &snapshot, config, options.flow)?;
    tracing::debug!(
        treads = breakdown.treads.len(),
        risers = breakdown.risers.len(),
        stringers = breakdown.stringers.len(),
        subtotal = %breakdown.subtotal,
        total = %breakdown.total,
        "Priced stair specification"
    );

    Ok(breakdown)
}

/// Price a plan against an already-fetched catalog snapshot.
pub fn price_plan(
    spec: &StairSpecification,
    plan: &PricingPlan,
    snapshot: &CatalogSnapshot,
    config: &EngineConfig,
    flow: PricingFlow,
) -> Result<PriceBreakdown, PricingError> {
    let price_lines = |requests: &[BoardRequest]| -> Result<Vec<PricedLine>, Overflow> {
        requests
            .iter()
            .map(|request| price_line(request, snapshot))
            .collect()
    };

    let treads = price_lines(&plan.treads)?;
    let risers = price_lines(&plan.risers)?;
    let stringers = price_lines(&plan.stringers)?;

    let mut subtotal = Decimal::ZERO;
    for line in treads.iter().chain(risers.iter()).chain(stringers.iter()) {
        subtotal = checked_sum(subtotal, line.charge.total_price, "subtotal")?;
    }
    let mut labor_total = Decimal::ZERO;

    if flow == PricingFlow::LegacyPriceRules {
        for line in &stringers {
            if line.kind == LineKind::LegacyStringer && line.charge.rule_found {
                let labor = config
                    .stringer_labor_per_unit
                    .checked_mul(Decimal::from(line.quantity))
                    .ok_or(Overflow("labor_total"))?;
                labor_total = checked_sum(labor_total, labor, "labor_total")?;
            }
        }
    }

    let special_parts = spec
        .special_parts
        .iter()
        .map(|part| {
            let quantity = Decimal::from(part.quantity);
            let line = match snapshot.special_parts.get(&(part.part_id, part.material_id)) {
                Some(cost) => SpecialPartLine {
                    part_id: part.part_id,
                    material_id: part.material_id,
                    quantity: part.quantity,
                    unit_cost: cost.unit_cost,
                    labor_cost: cost.labor_cost,
                    total_price: cost
                        .unit_cost
                        .checked_mul(quantity)
                        .ok_or(Overflow("special_parts"))?,
                    labor_total: cost
                        .labor_cost
                        .checked_mul(quantity)
                        .ok_or(Overflow("special_parts"))?,
                    found: true,
                },
                None => {
                    tracing::warn!(
                        part_id = part.part_id,
                        material_id = part.material_id,
                        "No special part record; priced at zero"
                    );
                    SpecialPartLine {
                        part_id: part.part_id,
                        material_id: part.material_id,
                        quantity: part.quantity,
                        unit_cost: Decimal::ZERO,
                        labor_cost: Decimal::ZERO,
                        total_price: Decimal::ZERO,
                        labor_total: Decimal::ZERO,
                        found: false,
                    }
                }
            };
            Ok::<_, Overflow>(line)
        })
        .collect::<Result<Vec<SpecialPartLine>, Overflow>>()?;

    for part in &special_parts {
        subtotal = checked_sum(subtotal, part.total_price, "subtotal")?;
        labor_total = checked_sum(labor_total, part.labor_total, "labor_total")?;
    }

    let tax_rate = snapshot.job_tax_rate.unwrap_or(config.default_tax_rate);
    let totals = calculators::calculate_totals(subtotal, labor_total, tax_rate)?;

    Ok(PriceBreakdown {
        riser_height: spec.riser_height(),
        treads,
        risers,
        stringers,
        special_parts,
        subtotal: totals.subtotal,
        labor_total: totals.labor_total,
        tax_rate: totals.tax_rate,
        tax_amount: totals.tax_amount,
        total: totals.total,
    })
}

fn checked_sum(total: Decimal, amount: Decimal, what: &'static str) -> Result<Decimal, Overflow> {
    total.checked_add(amount).ok_or(Overflow(what))
}

fn price_line(request: &BoardRequest, snapshot: &CatalogSnapshot) -> Result<PricedLine, Overflow> {
    let rule = request.rule_key().and_then(|key| snapshot.rules.get(&key));
    if rule.is_none() {
        tracing::warn!(
            board_type = request.board_type.id(),
            material_id = ?request.material_id,
            "No active pricing rule; line priced at zero"
        );
    }
    let multiplier = request
        .material_id
        .and_then(|id| snapshot.multipliers.get(&id).copied());

    Ok(PricedLine {
        kind: request.kind.clone(),
        board_type: request.board_type,
        material_id: request.material_id,
        length: request.length,
        width: request.width,
        quantity: request.quantity,
        mitre: request.mitre,
        charge: calculators::price_board(rule, multiplier, request)?,
    })
}
