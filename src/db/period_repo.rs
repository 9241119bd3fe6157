// src/db/period_repo.rs

use chrono::NaiveDate;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{
        db_utils::{ensure_affected, map_delete_error, map_write_error},
        error::AppError,
    },
    models::{
        auth::User,
        inventory::{InventoryPeriod, PeriodPayload, PeriodStatus},
    },
};

#[derive(Clone)]
pub struct PeriodRepository {
    pool: PgPool,
}

impl PeriodRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<InventoryPeriod>, AppError> {
        let periods = sqlx::query_as::<_, InventoryPeriod>(
            "SELECT * FROM inventory_periods ORDER BY starts_on DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(periods)
    }

    pub async fn latest(&self, limit: i64) -> Result<Vec<InventoryPeriod>, AppError> {
        let periods = sqlx::query_as::<_, InventoryPeriod>(
            "SELECT * FROM inventory_periods ORDER BY starts_on DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(periods)
    }

    pub async fn get(&self, id: Uuid) -> Result<InventoryPeriod, AppError> {
        sqlx::query_as::<_, InventoryPeriod>("SELECT * FROM inventory_periods WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::NotFound("period"))
    }

    /// Periodo vigente: `starts_on <= hoy <= ends_on` y marcado como activo.
    pub async fn find_active(&self, today: NaiveDate) -> Result<Option<InventoryPeriod>, AppError> {
        let period = sqlx::query_as::<_, InventoryPeriod>(
            r#"
            SELECT * FROM inventory_periods
            WHERE starts_on <= $1 AND ends_on >= $1 AND active = TRUE
            ORDER BY starts_on DESC
            LIMIT 1
            "#,
        )
        .bind(today)
        .fetch_optional(&self.pool)
        .await?;
        Ok(period)
    }

    /// Serializa altas y ediciones concurrentes: el nombre y el solape dependen del resto de filas.
    pub async fn lock_for_write<'e, E>(&self, executor: E) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("LOCK TABLE inventory_periods IN SHARE ROW EXCLUSIVE MODE")
            .execute(executor)
            .await?;
        Ok(())
    }

    /// Siguiente número de `PERIODO_NNN`: uno más que el mayor existente.
    pub async fn next_sequence<'e, E>(&self, executor: E) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let next: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(MAX(substring(name FROM 9)::bigint), 0) + 1
            FROM inventory_periods
            WHERE name ~ '^PERIODO_[0-9]+$'
            "#,
        )
        .fetch_one(executor)
        .await?;
        Ok(next)
    }

    /// ¿Existe otro periodo cuyo rango se cruce con `[starts_on, ends_on]`?
    pub async fn overlaps<'e, E>(
        &self,
        executor: E,
        starts_on: NaiveDate,
        ends_on: NaiveDate,
        exclude_id: Option<Uuid>,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let overlap: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM inventory_periods
                WHERE starts_on < $2 AND ends_on > $1
                  AND id IS DISTINCT FROM $3
            )
            "#,
        )
        .bind(starts_on)
        .bind(ends_on)
        .bind(exclude_id)
        .fetch_one(executor)
        .await?;
        Ok(overlap)
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        name: &str,
        payload: &PeriodPayload,
        status: PeriodStatus,
        authorized_by: &User,
    ) -> Result<InventoryPeriod, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, InventoryPeriod>(
            r#"
            INSERT INTO inventory_periods (
                name, starts_on, ends_on, status, notes, authorized_by, authorizer_role, active
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $4 = 'ACTIVO'::period_status)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(payload.starts_on)
        .bind(payload.ends_on)
        .bind(status)
        .bind(&payload.notes)
        .bind(authorized_by.full_name())
        .bind(authorized_by.role)
        .fetch_one(executor)
        .await
        .map_err(map_write_error)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        payload: &PeriodPayload,
        status: PeriodStatus,
    ) -> Result<InventoryPeriod, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, InventoryPeriod>(
            r#"
            UPDATE inventory_periods SET
                starts_on = $2, ends_on = $3, status = $4, notes = $5,
                active = ($4 = 'ACTIVO'::period_status)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(payload.starts_on)
        .bind(payload.ends_on)
        .bind(status)
        .bind(&payload.notes)
        .fetch_optional(executor)
        .await
        .map_err(map_write_error)?
        .ok_or(AppError::NotFound("period"))
    }

    /// Recalcula `status` y `active` de todos los periodos según la fecha de hoy.
    pub async fn refresh_statuses(&self, today: NaiveDate) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE inventory_periods SET
                status = CASE
                    WHEN $1 < starts_on THEN 'PENDIENTE'::period_status
                    WHEN $1 <= ends_on THEN 'ACTIVO'::period_status
                    ELSE 'FINALIZADO'::period_status
                END,
                active = (starts_on <= $1 AND $1 <= ends_on)
            WHERE status <> CASE
                    WHEN $1 < starts_on THEN 'PENDIENTE'::period_status
                    WHEN $1 <= ends_on THEN 'ACTIVO'::period_status
                    ELSE 'FINALIZADO'::period_status
                END
               OR active <> (starts_on <= $1 AND $1 <= ends_on)
            "#,
        )
        .bind(today)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn has_inventories(&self, id: Uuid) -> Result<bool, AppError> {
        let used: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM inventory_records WHERE period_id = $1)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(used)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM inventory_periods WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_delete_error)?;
        ensure_affected(result.rows_affected(), "period")
    }
}
