// src/db/environmental_repo.rs

use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use crate::{
    common::{
        db_utils::{ensure_affected, map_delete_error, map_write_error},
        error::AppError,
    },
    models::environmental::{
        EnvironmentalKind, EnvironmentalPayload, EnvironmentalRecord, EnvironmentalRecordView,
    },
};

// Las siete bitácoras ambientales comparten tabla; `kind` las distingue.
#[derive(Clone)]
pub struct EnvironmentalRepository {
    pool: PgPool,
}

impl EnvironmentalRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(
        &self,
        kind: EnvironmentalKind,
        org_unit_id: Option<Uuid>,
    ) -> Result<Vec<EnvironmentalRecordView>, AppError> {
        let records = sqlx::query_as::<_, EnvironmentalRecordView>(
            r#"
            SELECT e.*, o.name AS org_unit_name
            FROM environmental_records e
            JOIN org_units o ON o.id = e.org_unit_id
            WHERE e.kind = $1 AND e.status = TRUE
              AND ($2::uuid IS NULL OR e.org_unit_id = $2)
            ORDER BY e.created_at DESC
            "#,
        )
        .bind(kind)
        .bind(org_unit_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(records)
    }

    pub async fn get(&self, kind: EnvironmentalKind, id: Uuid) -> Result<EnvironmentalRecord, AppError> {
        sqlx::query_as::<_, EnvironmentalRecord>(
            "SELECT * FROM environmental_records WHERE id = $1 AND kind = $2",
        )
        .bind(id)
        .bind(kind)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::NotFound("environmental_record"))
    }

    pub async fn create(
        &self,
        payload: &EnvironmentalPayload,
        created_by: Uuid,
    ) -> Result<EnvironmentalRecord, AppError> {
        sqlx::query_as::<_, EnvironmentalRecord>(
            r#"
            INSERT INTO environmental_records (kind, org_unit_id, details, created_by)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(payload.details.kind())
        .bind(payload.org_unit_id)
        .bind(Json(&payload.details))
        .bind(created_by)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)
    }

    pub async fn update(
        &self,
        id: Uuid,
        payload: &EnvironmentalPayload,
        updated_by: Uuid,
    ) -> Result<EnvironmentalRecord, AppError> {
        sqlx::query_as::<_, EnvironmentalRecord>(
            r#"
            UPDATE environmental_records SET
                org_unit_id = $3, details = $4, updated_by = $5, updated_at = now()
            WHERE id = $1 AND kind = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(payload.details.kind())
        .bind(payload.org_unit_id)
        .bind(Json(&payload.details))
        .bind(updated_by)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_write_error)?
        .ok_or(AppError::NotFound("environmental_record"))
    }

    pub async fn delete(&self, kind: EnvironmentalKind, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM environmental_records WHERE id = $1 AND kind = $2")
            .bind(id)
            .bind(kind)
            .execute(&self.pool)
            .await
            .map_err(map_delete_error)?;
        ensure_affected(result.rows_affected(), "environmental_record")
    }
}
