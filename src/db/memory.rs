//! In-memory store for tests and local fixtures.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tokio::sync::RwLock;

use crate::pricing::models::{BoardPricingRule, BoardRuleKey, MaterialMultiplier, SpecialPartCost};
use crate::shop::models::{ConfigurationItem, NewStairConfiguration, StairConfiguration};

use super::{ConfigurationStore, PricingCatalog, StoreError};

#[derive(Debug, Clone, Default)]
pub struct MemoryJob {
    pub tax_rate: Option<Decimal>,
    pub location: Option<String>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    rules: RwLock<Vec<BoardPricingRule>>,
    multipliers: RwLock<HashMap<i32, Decimal>>,
    special_parts: RwLock<Vec<SpecialPartCost>>,
    jobs: RwLock<HashMap<i64, MemoryJob>>,
    materials: RwLock<HashMap<i32, String>>,
    configurations: RwLock<BTreeMap<i64, StairConfiguration>>,
    next_configuration_id: AtomicI64,
    unavailable: AtomicBool,
    lookup_calls: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rule(mut self, rule: BoardPricingRule) -> Self {
        self.rules.get_mut().push(rule);
        self
    }

    pub fn with_multiplier(mut self, material_id: i32, multiplier: Decimal) -> Self {
        self.multipliers.get_mut().insert(material_id, multiplier);
        self
    }

    pub fn with_special_part(mut self, part: SpecialPartCost) -> Self {
        self.special_parts.get_mut().push(part);
        self
    }

    pub fn with_job(mut self, job_id: i64, job: MemoryJob) -> Self {
        self.jobs.get_mut().insert(job_id, job);
        self
    }

    pub fn with_material(mut self, material_id: i32, name: &str) -> Self {
        self.materials.get_mut().insert(material_id, name.to_string());
        self
    }

    pub fn with_configuration(mut self, configuration: StairConfiguration) -> Self {
        let next = self.next_configuration_id.get_mut();
        *next = (*next).max(configuration.id);
        self.configurations
            .get_mut()
            .insert(configuration.id, configuration);
        self
    }

    /// Make every subsequent lookup fail as if the database were down.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of catalog round-trips served so far.
    pub fn lookup_calls(&self) -> u64 {
        self.lookup_calls.load(Ordering::SeqCst)
    }

    pub async fn configuration(&self, id: i64) -> Option<StairConfiguration> {
        self.configurations.read().await.get(&id).cloned()
    }

    fn begin_lookup(&self) -> Result<(), StoreError> {
        self.lookup_calls.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl PricingCatalog for MemoryStore {
    async fn board_pricing_rules(
        &self,
        keys: &[BoardRuleKey],
        as_of: DateTime<Utc>,
    ) -> Result<Vec<BoardPricingRule>, StoreError> {
        self.begin_lookup()?;
        let rules = self.rules.read().await;

        let found = keys
            .iter()
            .filter_map(|key| {
                rules
                    .iter()
                    .filter(|rule| rule.key() == *key && rule.is_active_at(as_of))
                    .max_by_key(|rule| rule.effective_from)
                    .cloned()
            })
            .collect();

        Ok(found)
    }

    async fn material_multipliers(
        &self,
        material_ids: &[i32],
    ) -> Result<Vec<MaterialMultiplier>, StoreError> {
        self.begin_lookup()?;
        let multipliers = self.multipliers.read().await;

        Ok(material_ids
            .iter()
            .filter_map(|id| {
                multipliers.get(id).map(|multiplier| MaterialMultiplier {
                    material_id: *id,
                    multiplier: *multiplier,
                })
            })
            .collect())
    }

    async fn special_parts(&self, keys: &[(i32, i32)]) -> Result<Vec<SpecialPartCost>, StoreError> {
        self.begin_lookup()?;
        let parts = self.special_parts.read().await;

        Ok(parts
            .iter()
            .filter(|part| keys.contains(&(part.part_id, part.material_id)))
            .cloned()
            .collect())
    }

    async fn job_tax_rate(&self, job_id: i64) -> Result<Option<Decimal>, StoreError> {
        self.begin_lookup()?;
        Ok(self
            .jobs
            .read()
            .await
            .get(&job_id)
            .and_then(|job| job.tax_rate))
    }
}

#[async_trait]
impl ConfigurationStore for MemoryStore {
    async fn load_configuration(&self, id: i64) -> Result<Option<StairConfiguration>, StoreError> {
        self.begin_lookup()?;
        Ok(self.configurations.read().await.get(&id).cloned())
    }

    async fn save_configuration(&self, new: &NewStairConfiguration) -> Result<i64, StoreError> {
        self.begin_lookup()?;
        let materials = self.materials.read().await;
        let jobs = self.jobs.read().await;
        let location = new
            .job_id
            .and_then(|job_id| jobs.get(&job_id))
            .and_then(|job| job.location.clone());

        let items = new
            .items
            .iter()
            .map(|item| ConfigurationItem {
                item_type: item.item_type,
                riser_number: item.riser_number,
                tread_type: item.tread_type,
                material: item.material_id.and_then(|id| materials.get(&id).cloned()),
                length: item.length,
                width: item.width,
                quantity: item.quantity,
            })
            .collect();

        let id = self.next_configuration_id.fetch_add(1, Ordering::SeqCst) + 1;
        let configuration = StairConfiguration {
            id,
            name: new.name.clone(),
            location,
            floor_to_floor: new.specification.floor_to_floor,
            num_risers: new.specification.num_risers,
            nose_size: Some(new.specification.nose_size),
            items,
        };

        self.configurations.write().await.insert(id, configuration);
        Ok(id)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}
