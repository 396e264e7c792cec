//! Response DTOs for shop endpoints.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::pricing::calculators::round_dimension;
use crate::pricing::models::TreadType;

use super::models::{CutSheetItem, ItemType};

/// One cut, dimensions rounded for the saw
#[derive(Debug, Clone, Serialize)]
pub struct CutSheetItemResponse {
    pub item_type: ItemType,
    pub tread_type: Option<TreadType>,
    pub material: Option<String>,
    pub quantity: u32,
    #[serde(with = "rust_decimal::serde::str")]
    pub cut_width: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub cut_length: Decimal,
    pub stair_id: String,
    pub location: String,
}

impl From<&CutSheetItem> for CutSheetItemResponse {
    fn from(item: &CutSheetItem) -> Self {
        Self {
            item_type: item.item_type,
            tread_type: item.tread_type,
            material: item.material.clone(),
            quantity: item.quantity,
            cut_width: round_dimension(item.cut_width),
            cut_length: round_dimension(item.cut_length),
            stair_id: item.stair_id.clone(),
            location: item.location.clone(),
        }
    }
}

/// Cuts of one staircase at one location
#[derive(Debug, Serialize)]
pub struct CutSheetGroup {
    pub stair_id: String,
    pub location: String,
    pub items: Vec<CutSheetItemResponse>,
}

/// Response for cut sheet generation
#[derive(Debug, Serialize)]
pub struct CutSheetResponse {
    pub items: Vec<CutSheetItemResponse>,
    pub groups: Vec<CutSheetGroup>,
}

impl CutSheetResponse {
    /// Groups follow the order in which each (stair, location) pair first appears.
    pub fn from_items(items: &[CutSheetItem]) -> Self {
        let items: Vec<CutSheetItemResponse> = items.iter().map(Into::into).collect();

        let mut groups: Vec<CutSheetGroup> = Vec::new();
        for item in &items {
            match groups
                .iter_mut()
                .find(|g| g.stair_id == item.stair_id && g.location == item.location)
            {
                Some(group) => group.items.push(item.clone()),
                None => groups.push(CutSheetGroup {
                    stair_id: item.stair_id.clone(),
                    location: item.location.clone(),
                    items: vec![item.clone()],
                }),
            }
        }

        Self { items, groups }
    }
}
