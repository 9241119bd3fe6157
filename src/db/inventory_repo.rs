// src/db/inventory_repo.rs

use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use crate::{
    common::{
        db_utils::{ensure_affected, map_delete_error, map_write_error},
        error::AppError,
    },
    models::inventory::{
        InventoryFigures, InventoryFilter, InventoryPayload, InventoryRecord, InventoryRecordView,
    },
};

const RECORD_VIEW_SELECT: &str = r#"
    SELECT
        r.*,
        o.name AS org_unit_name,
        b.name AS building_name,
        a.name AS area_name,
        p.name AS period_name,
        (u.first_names || ' ' || u.last_names) AS created_by_name
    FROM inventory_records r
    JOIN org_units o ON o.id = r.org_unit_id
    JOIN buildings b ON b.id = r.building_id
    JOIN areas a ON a.id = r.area_id
    JOIN inventory_periods p ON p.id = r.period_id
    LEFT JOIN users u ON u.id = r.created_by
"#;

#[derive(Clone)]
pub struct InventoryRepository {
    pool: PgPool,
}

impl InventoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Listado con filtros opcionales; `created_by` restringe a los registros de un capturista.
    pub async fn list(
        &self,
        filter: &InventoryFilter,
        created_by: Option<Uuid>,
    ) -> Result<Vec<InventoryRecordView>, AppError> {
        let sql = format!(
            r#"
            {}
            WHERE ($1::uuid IS NULL OR r.org_unit_id = $1)
              AND ($2::uuid IS NULL OR r.period_id = $2)
              AND ($3::inventory_kind IS NULL OR r.kind = $3)
              AND ($4::bool IS NULL OR r.active = $4)
              AND ($5::uuid IS NULL OR r.created_by = $5)
            ORDER BY b.name, a.name, r.created_at
            "#,
            RECORD_VIEW_SELECT
        );
        let records = sqlx::query_as::<_, InventoryRecordView>(&sql)
            .bind(filter.org_unit_id)
            .bind(filter.period_id)
            .bind(filter.kind)
            .bind(filter.active)
            .bind(created_by)
            .fetch_all(&self.pool)
            .await?;
        Ok(records)
    }

    pub async fn get(&self, id: Uuid) -> Result<InventoryRecord, AppError> {
        sqlx::query_as::<_, InventoryRecord>("SELECT * FROM inventory_records WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::NotFound("inventory"))
    }

    pub async fn create(
        &self,
        org_unit_id: Uuid,
        period_id: Uuid,
        payload: &InventoryPayload,
        figures: InventoryFigures,
        created_by: Uuid,
    ) -> Result<InventoryRecord, AppError> {
        sqlx::query_as::<_, InventoryRecord>(
            r#"
            INSERT INTO inventory_records (
                kind, org_unit_id, building_id, level, area_id, period_id, details,
                total_power_kw, monthly_hours, monthly_consumption, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(payload.details.kind())
        .bind(org_unit_id)
        .bind(payload.building_id)
        .bind(payload.level)
        .bind(payload.area_id)
        .bind(period_id)
        .bind(Json(&payload.details))
        .bind(figures.total_power_kw)
        .bind(payload.monthly_hours)
        .bind(figures.monthly_consumption)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)
    }

    /// El tipo de inventario no cambia una vez registrado.
    pub async fn update(
        &self,
        id: Uuid,
        payload: &InventoryPayload,
        figures: InventoryFigures,
        updated_by: Uuid,
    ) -> Result<InventoryRecord, AppError> {
        sqlx::query_as::<_, InventoryRecord>(
            r#"
            UPDATE inventory_records SET
                building_id = $3, level = $4, area_id = $5, details = $6,
                total_power_kw = $7, monthly_hours = $8, monthly_consumption = $9,
                updated_by = $10, updated_at = now()
            WHERE id = $1 AND kind = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(payload.details.kind())
        .bind(payload.building_id)
        .bind(payload.level)
        .bind(payload.area_id)
        .bind(Json(&payload.details))
        .bind(figures.total_power_kw)
        .bind(payload.monthly_hours)
        .bind(figures.monthly_consumption)
        .bind(updated_by)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_write_error)?
        .ok_or(AppError::NotFound("inventory"))
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM inventory_records WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_delete_error)?;
        ensure_affected(result.rows_affected(), "inventory")
    }

    /// Baja lógica con fecha y responsable.
    pub async fn deactivate(&self, id: Uuid, actor: Uuid) -> Result<InventoryRecord, AppError> {
        sqlx::query_as::<_, InventoryRecord>(
            r#"
            UPDATE inventory_records SET
                active = FALSE, deactivated_at = now(), deactivated_by = $2
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(actor)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::NotFound("inventory"))
    }

    pub async fn reactivate(&self, id: Uuid, actor: Uuid) -> Result<InventoryRecord, AppError> {
        sqlx::query_as::<_, InventoryRecord>(
            r#"
            UPDATE inventory_records SET
                active = TRUE, reactivated_at = now(), reactivated_by = $2
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(actor)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::NotFound("inventory"))
    }

    pub async fn count_by_creator(&self, created_by: Uuid, period_id: Option<Uuid>) -> Result<i64, AppError> {
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM inventory_records
            WHERE created_by = $1 AND ($2::uuid IS NULL OR period_id = $2)
            "#,
        )
        .bind(created_by)
        .bind(period_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(total)
    }
}
