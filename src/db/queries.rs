//! PostgreSQL store.
//!
//! Batched lookups bind key arrays and join them through `UNNEST`, so each
//! catalog table is read once per priced specification.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::pricing::models::{
    BoardPricingRule, BoardRuleKey, MaterialMultiplier, SpecialPartCost, TreadType,
};
use crate::shop::models::{
    ConfigurationItem, ConfigurationItemRow, ConfigurationRow, ItemType, NewStairConfiguration,
    StairConfiguration,
};

use super::{ConfigurationStore, PricingCatalog, StoreError};

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Check that the database answers.
pub async fn health_check(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

#[async_trait]
impl PricingCatalog for PgStore {
    async fn board_pricing_rules(
        &self,
        keys: &[BoardRuleKey],
        as_of: DateTime<Utc>,
    ) -> Result<Vec<BoardPricingRule>, StoreError> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let board_types: Vec<i32> = keys.iter().map(|k| k.board_type_id).collect();
        let materials: Vec<i32> = keys.iter().map(|k| k.material_id).collect();

        let rules = sqlx::query_as::<_, BoardPricingRule>(
            r#"
            SELECT DISTINCT ON (r.board_type_id, r.material_id)
                r.id, r.board_type_id, r.material_id,
                r.base_price, r.base_length, r.base_width,
                r.length_increment_price, r.length_increment_size,
                r.width_increment_price, r.width_increment_size,
                r.mitre_price, r.effective_from, r.effective_to
            FROM stair_board_pricing_rules r
            JOIN UNNEST($1::int4[], $2::int4[]) AS k(board_type_id, material_id)
              ON r.board_type_id = k.board_type_id
             AND r.material_id = k.material_id
            WHERE r.effective_from <= $3
              AND (r.effective_to IS NULL OR r.effective_to > $3)
            ORDER BY r.board_type_id, r.material_id, r.effective_from DESC
            "#,
        )
        .bind(board_types)
        .bind(materials)
        .bind(as_of)
        .fetch_all(&self.pool)
        .await?;

        Ok(rules)
    }

    async fn material_multipliers(
        &self,
        material_ids: &[i32],
    ) -> Result<Vec<MaterialMultiplier>, StoreError> {
        if material_ids.is_empty() {
            return Ok(Vec::new());
        }
        let multipliers = sqlx::query_as::<_, MaterialMultiplier>(
            r#"
            SELECT id AS material_id, multiplier
            FROM stair_materials
            WHERE id = ANY($1)
              AND multiplier IS NOT NULL
            "#,
        )
        .bind(material_ids.to_vec())
        .fetch_all(&self.pool)
        .await?;

        Ok(multipliers)
    }

    async fn special_parts(&self, keys: &[(i32, i32)]) -> Result<Vec<SpecialPartCost>, StoreError> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let parts: Vec<i32> = keys.iter().map(|(part, _)| *part).collect();
        let materials: Vec<i32> = keys.iter().map(|(_, material)| *material).collect();

        let costs = sqlx::query_as::<_, SpecialPartCost>(
            r#"
            SELECT p.part_id, p.material_id, p.unit_cost, p.labor_cost
            FROM stair_special_parts p
            JOIN UNNEST($1::int4[], $2::int4[]) AS k(part_id, material_id)
              ON p.part_id = k.part_id
             AND p.material_id = k.material_id
            WHERE p.is_active = true
            "#,
        )
        .bind(parts)
        .bind(materials)
        .fetch_all(&self.pool)
        .await?;

        Ok(costs)
    }

    async fn job_tax_rate(&self, job_id: i64) -> Result<Option<Decimal>, StoreError> {
        let rate: Option<Option<Decimal>> = sqlx::query_scalar(
            r#"
            SELECT tax_rate
            FROM jobs
            WHERE id = $1
            "#,
        )
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(rate.flatten())
    }
}

#[async_trait]
impl ConfigurationStore for PgStore {
    async fn load_configuration(&self, id: i64) -> Result<Option<StairConfiguration>, StoreError> {
        let row = sqlx::query_as::<_, ConfigurationRow>(
            r#"
            SELECT c.id, c.name, j.location, c.floor_to_floor, c.num_risers, c.nose_size
            FROM stair_configurations c
            LEFT JOIN jobs j ON j.id = c.job_id
            WHERE c.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let item_rows = sqlx::query_as::<_, ConfigurationItemRow>(
            r#"
            SELECT i.item_type, i.riser_number, i.tread_type,
                   m.name AS material, i.length, i.width, i.quantity
            FROM stair_configuration_items i
            LEFT JOIN stair_materials m ON m.id = i.material_id
            WHERE i.configuration_id = $1
            ORDER BY i.position
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let items = item_rows
            .into_iter()
            .map(item_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(StairConfiguration {
            id: row.id,
            name: row.name,
            location: row.location,
            floor_to_floor: row.floor_to_floor,
            num_risers: non_negative(row.num_risers, "num_risers")?,
            nose_size: row.nose_size,
            items,
        }))
    }

    async fn save_configuration(&self, new: &NewStairConfiguration) -> Result<i64, StoreError> {
        let specification = serde_json::to_value(&new.specification)
            .map_err(|e| StoreError::Corrupt(format!("specification: {e}")))?;
        let breakdown = serde_json::to_value(&new.breakdown)
            .map_err(|e| StoreError::Corrupt(format!("breakdown: {e}")))?;
        let spec = &new.specification;

        let mut tx = self.pool.begin().await?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO stair_configurations (
                job_id, name, floor_to_floor, num_risers,
                tread_material_id, riser_material_id, rough_cut_width, nose_size,
                full_mitre, bracket_type, special_notes,
                specification, breakdown,
                subtotal, labor_total, tax_amount, total
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            RETURNING id
            "#,
        )
        .bind(new.job_id)
        .bind(new.name.as_deref())
        .bind(spec.floor_to_floor)
        .bind(spec.num_risers as i32)
        .bind(spec.tread_material_id)
        .bind(spec.riser_material_id)
        .bind(spec.rough_cut_width)
        .bind(spec.nose_size)
        .bind(spec.full_mitre)
        .bind(spec.bracket_type.as_deref())
        .bind(spec.special_notes.as_deref())
        .bind(specification)
        .bind(breakdown)
        .bind(new.breakdown.subtotal)
        .bind(new.breakdown.labor_total)
        .bind(new.breakdown.tax_amount)
        .bind(new.breakdown.total)
        .fetch_one(&mut *tx)
        .await?;

        for (position, item) in new.items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO stair_configuration_items (
                    configuration_id, position, item_type, riser_number,
                    tread_type, material_id, length, width, quantity
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                "#,
            )
            .bind(id)
            .bind(position as i32)
            .bind(item.item_type.as_str())
            .bind(item.riser_number as i32)
            .bind(item.tread_type.map(TreadType::as_str))
            .bind(item.material_id)
            .bind(item.length)
            .bind(item.width)
            .bind(item.quantity as i32)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        tracing::info!(configuration_id = id, items = new.items.len(), "Saved stair configuration");

        Ok(id)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        health_check(&self.pool).await?;
        Ok(())
    }
}

fn item_from_row(row: ConfigurationItemRow) -> Result<ConfigurationItem, StoreError> {
    let item_type = ItemType::from_label(&row.item_type)
        .ok_or_else(|| StoreError::Corrupt(format!("unknown item type '{}'", row.item_type)))?;

    Ok(ConfigurationItem {
        item_type,
        riser_number: non_negative(row.riser_number, "riser_number")?,
        tread_type: row.tread_type.as_deref().map(TreadType::from_label),
        material: row.material,
        length: row.length,
        width: row.width,
        quantity: non_negative(row.quantity, "quantity")?,
    })
}

fn non_negative(value: i32, column: &str) -> Result<u32, StoreError> {
    u32::try_from(value).map_err(|_| StoreError::Corrupt(format!("negative {column}: {value}")))
}
