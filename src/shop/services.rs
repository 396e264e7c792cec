//! Cut sheet generation for a production run.

use crate::config::EngineConfig;
use crate::db::{ConfigurationStore, StoreError};

use super::calculators;
use super::models::CutSheetItem;

/// Cut sheet generation error types
#[derive(Debug, thiserror::Error)]
pub enum CutSheetError {
    #[error("Invalid configuration: {field}: {reason}")]
    InvalidSpecification { field: String, reason: String },

    #[error("Stair configuration {0} not found")]
    ConfigurationNotFound(i64),

    #[error("Configuration store unavailable: {0}")]
    LookupUnavailable(#[from] StoreError),
}

impl CutSheetError {
    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        CutSheetError::InvalidSpecification {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Load each configuration and flatten their cuts, in request order.
///
/// Every configuration is validated and cut before anything is returned, so a
/// run either yields the whole list or an error.
pub async fn generate_cut_sheet<S: ConfigurationStore + ?Sized>(
    store: &S,
    config: &EngineConfig,
    configuration_ids: &[i64],
) -> Result<Vec<CutSheetItem>, CutSheetError> {
    if configuration_ids.is_empty() {
        return Err(CutSheetError::invalid(
            "configuration_ids",
            "at least one configuration is required",
        ));
    }

    let mut items = Vec::new();
    for &id in configuration_ids {
        let configuration = store
            .load_configuration(id)
            .await?
            .ok_or(CutSheetError::ConfigurationNotFound(id))?;

        let cuts = calculators::cut_configuration(&configuration, config).map_err(|err| {
            tracing::warn!(configuration_id = id, error = %err, "Configuration cannot be cut");
            err
        })?;
        tracing::debug!(configuration_id = id, cuts = cuts.len(), "Cut configuration");
        items.extend(cuts);
    }

    tracing::info!(
        configurations = configuration_ids.len(),
        items = items.len(),
        "Generated cut sheet"
    );
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::pricing::models::TreadType;
    use crate::shop::models::{ConfigurationItem, ItemType, StairConfiguration};
    use rust_decimal_macros::dec;

    fn stored(id: i64, name: &str, tread_type: TreadType) -> StairConfiguration {
        StairConfiguration {
            id,
            name: Some(name.to_string()),
            location: Some("Lot 3".to_string()),
            floor_to_floor: dec!(108),
            num_risers: 14,
            nose_size: None,
            items: vec![
                ConfigurationItem {
                    item_type: ItemType::Tread,
                    riser_number: 1,
                    tread_type: Some(tread_type),
                    material: Some("Maple".to_string()),
                    length: dec!(38),
                    width: Some(dec!(11)),
                    quantity: 1,
                },
                ConfigurationItem {
                    item_type: ItemType::Riser,
                    riser_number: 1,
                    tread_type: None,
                    material: Some("Poplar".to_string()),
                    length: dec!(38),
                    width: None,
                    quantity: 1,
                },
            ],
        }
    }

    #[tokio::test]
    async fn test_flattens_configurations_in_request_order() {
        let store = MemoryStore::new()
            .with_configuration(stored(1, "A", TreadType::Box))
            .with_configuration(stored(2, "B", TreadType::DoubleOpen));

        let items = generate_cut_sheet(&store, &EngineConfig::default(), &[2, 1])
            .await
            .unwrap();

        assert_eq!(items.len(), 6);
        assert!(items[..3].iter().all(|i| i.stair_id == "B"));
        assert!(items[3..].iter().all(|i| i.stair_id == "A"));
        // double open tread: no reduction, riser and base board take 2.5
        assert_eq!(items[0].cut_length, dec!(38));
        assert_eq!(items[1].cut_length, dec!(35.5));
        assert_eq!(items[2].cut_length, dec!(35.5));
        assert_eq!(items[3].cut_length, dec!(36.75));
    }

    #[tokio::test]
    async fn test_missing_configuration() {
        let store = MemoryStore::new().with_configuration(stored(1, "A", TreadType::Box));
        let result = generate_cut_sheet(&store, &EngineConfig::default(), &[1, 9]).await;
        assert!(matches!(result, Err(CutSheetError::ConfigurationNotFound(9))));
    }

    #[tokio::test]
    async fn test_empty_run_is_invalid() {
        let store = MemoryStore::new();
        let result = generate_cut_sheet(&store, &EngineConfig::default(), &[]).await;
        assert!(matches!(
            result,
            Err(CutSheetError::InvalidSpecification { .. })
        ));
        assert_eq!(store.lookup_calls(), 0);
    }

    #[tokio::test]
    async fn test_unavailable_store_propagates() {
        let store = MemoryStore::new().with_configuration(stored(1, "A", TreadType::Box));
        store.set_unavailable(true);
        let result = generate_cut_sheet(&store, &EngineConfig::default(), &[1]).await;
        assert!(matches!(result, Err(CutSheetError::LookupUnavailable(_))));
    }
}
