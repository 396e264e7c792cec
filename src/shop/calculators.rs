//! Cut-dimension calculations for shop cut lists.
//!
//! Pure geometry: nominal configuration items in, saw dimensions out. Every
//! allowance is subtracted from the nominal length and depends on how the tread
//! at that riser number returns into the stringer.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::config::EngineConfig;
use crate::pricing::models::TreadType;

use super::models::{ConfigurationItem, CutSheetItem, ItemType, StairConfiguration};
use super::services::CutSheetError;

pub const TREAD_ALLOWANCE_BOX: Decimal = dec!(1.25);
pub const TREAD_ALLOWANCE_OPEN: Decimal = dec!(0.625);
pub const TREAD_ALLOWANCE_DOUBLE_OPEN: Decimal = dec!(0);

pub const RISER_ALLOWANCE_BOX: Decimal = dec!(1.25);
pub const RISER_ALLOWANCE_OPEN: Decimal = dec!(1.875);
pub const RISER_ALLOWANCE_DOUBLE_OPEN: Decimal = dec!(2.5);

/// Base trim board is cut this much narrower than the riser height.
pub const S4S_WIDTH_REDUCTION: Decimal = dec!(1);

/// Length deducted from a tread of the given type.
pub fn tread_allowance(tread_type: TreadType) -> Decimal {
    match tread_type {
        TreadType::Box => TREAD_ALLOWANCE_BOX,
        TreadType::OpenLeft | TreadType::OpenRight => TREAD_ALLOWANCE_OPEN,
        TreadType::DoubleOpen => TREAD_ALLOWANCE_DOUBLE_OPEN,
    }
}

/// Length deducted from a riser whose adjoining tread has the given type.
pub fn riser_allowance(tread_type: TreadType) -> Decimal {
    match tread_type {
        TreadType::Box => RISER_ALLOWANCE_BOX,
        TreadType::OpenLeft | TreadType::OpenRight => RISER_ALLOWANCE_OPEN,
        TreadType::DoubleOpen => RISER_ALLOWANCE_DOUBLE_OPEN,
    }
}

/// Allowance for the single base board, decided by the most open tread present.
pub fn s4s_allowance(configuration: &StairConfiguration) -> Decimal {
    let types: Vec<TreadType> = configuration
        .treads()
        .map(|item| item.tread_type.unwrap_or_default())
        .collect();

    if types.contains(&TreadType::DoubleOpen) {
        RISER_ALLOWANCE_DOUBLE_OPEN
    } else if types
        .iter()
        .any(|t| matches!(t, TreadType::OpenLeft | TreadType::OpenRight))
    {
        RISER_ALLOWANCE_OPEN
    } else {
        RISER_ALLOWANCE_BOX
    }
}

/// Compute every cut of one stored configuration: its treads, its risers and
/// one base trim board, in that order.
pub fn cut_configuration(
    configuration: &StairConfiguration,
    config: &EngineConfig,
) -> Result<Vec<CutSheetItem>, CutSheetError> {
    validate_configuration(configuration)?;

    let riser_height = configuration.riser_height();
    let nose_size = configuration.nose_size.unwrap_or(config.default_nose_size);
    let stair_id = configuration.stair_id();
    let location = configuration
        .location
        .as_deref()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .unwrap_or(config.default_location.as_str())
        .to_string();

    let cut = |item: &ConfigurationItem,
               tread_type: Option<TreadType>,
               cut_width: Decimal,
               cut_length: Decimal| CutSheetItem {
        item_type: item.item_type,
        tread_type,
        material: item.material.clone(),
        quantity: item.quantity,
        cut_width,
        cut_length,
        stair_id: stair_id.clone(),
        location: location.clone(),
    };

    let mut items = Vec::with_capacity(configuration.items.len() + 1);

    for tread in configuration.treads() {
        let tread_type = tread.tread_type.unwrap_or_default();
        let width = tread.width.unwrap_or(config.default_rough_cut_width);
        let what = describe(tread);
        items.push(cut(
            tread,
            Some(tread_type),
            positive("items.cut_width", &what, width.checked_add(nose_size))?,
            positive(
                "items.cut_length",
                &what,
                tread.length.checked_sub(tread_allowance(tread_type)),
            )?,
        ));
    }

    for riser in configuration.risers() {
        let adjoining = configuration
            .tread_type_at(riser.riser_number)
            .unwrap_or_default();
        let what = describe(riser);
        items.push(cut(
            riser,
            None,
            positive("items.cut_width", &what, Some(riser_height))?,
            positive(
                "items.cut_length",
                &what,
                riser.length.checked_sub(riser_allowance(adjoining)),
            )?,
        ));
    }

    let sample_length = configuration
        .risers()
        .next()
        .map(|riser| riser.length)
        .unwrap_or(configuration.floor_to_floor);
    let sample_material = configuration
        .risers()
        .next()
        .or_else(|| configuration.treads().next())
        .and_then(|item| item.material.clone());

    items.push(CutSheetItem {
        item_type: ItemType::S4s,
        tread_type: None,
        material: sample_material,
        quantity: 1,
        cut_width: positive(
            "s4s.cut_width",
            "base board",
            riser_height.checked_sub(S4S_WIDTH_REDUCTION),
        )?,
        cut_length: positive(
            "s4s.cut_length",
            "base board",
            sample_length.checked_sub(s4s_allowance(configuration)),
        )?,
        stair_id,
        location,
    });

    Ok(items)
}

fn describe(item: &ConfigurationItem) -> String {
    format!("{} at riser {}", item.item_type.as_str(), item.riser_number)
}

/// A cut dimension must be representable and leave material to cut.
fn positive(field: &str, what: &str, value: Option<Decimal>) -> Result<Decimal, CutSheetError> {
    match value {
        Some(value) if value > Decimal::ZERO => Ok(value),
        Some(value) => Err(CutSheetError::invalid(
            field,
            format!("{what} would be cut to {value}"),
        )),
        None => Err(CutSheetError::invalid(field, format!("{what} is out of range"))),
    }
}

fn validate_configuration(configuration: &StairConfiguration) -> Result<(), CutSheetError> {
    if configuration.num_risers == 0 {
        return Err(CutSheetError::invalid("num_risers", "must be greater than zero"));
    }
    if configuration.floor_to_floor <= Decimal::ZERO {
        return Err(CutSheetError::invalid(
            "floor_to_floor",
            "must be greater than zero",
        ));
    }
    if let Some(item) = configuration
        .items
        .iter()
        .find(|item| item.length <= Decimal::ZERO)
    {
        return Err(CutSheetError::invalid(
            "items.length",
            format!(
                "{} at riser {} has non-positive length",
                item.item_type.as_str(),
                item.riser_number
            ),
        ));
    }
    Ok(())
}
