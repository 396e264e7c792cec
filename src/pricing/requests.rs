//! Request DTOs for pricing API endpoints.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::config::EngineConfig;

use super::models::{
    IndividualStringers, LegacyStringer, SpecialPartSpec, StairSpecification, StringerConfig,
    TreadSpec,
};
use super::services::PricingError;

/// Request to price a staircase
#[derive(Debug, Deserialize)]
pub struct StairPriceRequest {
    #[serde(default)]
    pub job_id: Option<i64>,
    #[serde(default)]
    pub as_of: Option<DateTime<Utc>>,
    pub specification: StairSpecificationRequest,
}

/// Request to price and persist a staircase configuration
#[derive(Debug, Deserialize)]
pub struct SaveConfigurationRequest {
    #[serde(default)]
    pub job_id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub as_of: Option<DateTime<Utc>>,
    pub specification: StairSpecificationRequest,
}

/// Stair specification as sent by the quote UI.
///
/// Stringers may be given as individual sides, as an explicit legacy stringer,
/// or as a legacy type label such as `"1x9.25_Poplar"`, in that order of
/// precedence.
#[derive(Debug, Deserialize)]
pub struct StairSpecificationRequest {
    pub floor_to_floor: Decimal,
    pub num_risers: u32,
    #[serde(default)]
    pub tread_material_id: Option<i32>,
    #[serde(default)]
    pub riser_material_id: Option<i32>,
    #[serde(default)]
    pub rough_cut_width: Option<Decimal>,
    #[serde(default)]
    pub nose_size: Option<Decimal>,
    #[serde(default)]
    pub treads: Vec<TreadSpec>,
    #[serde(default)]
    pub stringers: Option<IndividualStringers>,
    #[serde(default)]
    pub legacy_stringer: Option<LegacyStringer>,
    #[serde(default)]
    pub stringer_type: Option<String>,
    #[serde(default)]
    pub stringer_material_id: Option<i32>,
    #[serde(default)]
    pub num_stringers: Option<u32>,
    #[serde(default)]
    pub center_horses: u32,
    #[serde(default)]
    pub full_mitre: bool,
    #[serde(default)]
    pub bracket_type: Option<String>,
    #[serde(default)]
    pub special_notes: Option<String>,
    #[serde(default)]
    pub special_parts: Vec<SpecialPartSpec>,
    #[serde(default)]
    pub include_landing_tread: bool,
}

impl StairSpecificationRequest {
    /// Resolve defaults and the stringer variant.
    pub fn into_specification(
        self,
        config: &EngineConfig,
    ) -> Result<StairSpecification, PricingError> {
        let stringers = self.resolve_stringers()?;

        Ok(StairSpecification {
            floor_to_floor: self.floor_to_floor,
            num_risers: self.num_risers,
            tread_material_id: self.tread_material_id,
            riser_material_id: self.riser_material_id,
            rough_cut_width: self.rough_cut_width.unwrap_or(config.default_rough_cut_width),
            nose_size: self.nose_size.unwrap_or(config.default_nose_size),
            treads: self.treads,
            stringers,
            num_stringers: self.num_stringers.unwrap_or(config.default_num_stringers),
            center_horses: self.center_horses,
            full_mitre: self.full_mitre,
            bracket_type: self.bracket_type,
            special_notes: self.special_notes,
            special_parts: self.special_parts,
            include_landing_tread: self.include_landing_tread,
        })
    }

    fn resolve_stringers(&self) -> Result<Option<StringerConfig>, PricingError> {
        if let Some(individual) = self.stringers.as_ref().filter(|s| !s.is_empty()) {
            return Ok(Some(StringerConfig::Individual(individual.clone())));
        }

        if let Some(legacy) = &self.legacy_stringer {
            let mut legacy = legacy.clone();
            if legacy.material_id.is_none() {
                legacy.material_id = self.stringer_material_id;
            }
            return Ok(Some(StringerConfig::Legacy(legacy)));
        }

        match self.stringer_type.as_deref().map(str::trim) {
            Some(label) if !label.is_empty() => {
                LegacyStringer::parse_label(label, self.stringer_material_id)
                    .map(|legacy| Some(StringerConfig::Legacy(legacy)))
                    .ok_or_else(|| {
                        PricingError::invalid(
                            "stringer_type",
                            format!("expected '<thickness>x<width>[_material]', got '{label}'"),
                        )
                    })
            }
            _ => Ok(None),
        }
    }
}
