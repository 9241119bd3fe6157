// src/db/organization_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{
        db_utils::{ensure_affected, map_delete_error, map_write_error},
        error::AppError,
    },
    models::organization::{
        Area, AreaFilter, AreaPayload, Building, BuildingPayload, Campus, CampusPayload,
        LookupOption, OrgUnit, OrgUnitPayload,
    },
};

// Campus, unidades responsables, edificios y áreas
#[derive(Clone)]
pub struct OrganizationRepository {
    pool: PgPool,
}

impl OrganizationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Campus
    // ---

    pub async fn list_campuses(&self) -> Result<Vec<Campus>, AppError> {
        let campuses = sqlx::query_as::<_, Campus>("SELECT * FROM campuses ORDER BY code")
            .fetch_all(&self.pool)
            .await?;
        Ok(campuses)
    }

    pub async fn get_campus(&self, id: Uuid) -> Result<Campus, AppError> {
        sqlx::query_as::<_, Campus>("SELECT * FROM campuses WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::NotFound("campus"))
    }

    pub async fn create_campus(&self, payload: &CampusPayload) -> Result<Campus, AppError> {
        sqlx::query_as::<_, Campus>(
            r#"
            INSERT INTO campuses (code, location, square_meters)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(&payload.code)
        .bind(&payload.location)
        .bind(payload.square_meters)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)
    }

    pub async fn update_campus(&self, id: Uuid, payload: &CampusPayload) -> Result<Campus, AppError> {
        sqlx::query_as::<_, Campus>(
            r#"
            UPDATE campuses SET code = $2, location = $3, square_meters = $4
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&payload.code)
        .bind(&payload.location)
        .bind(payload.square_meters)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_write_error)?
        .ok_or(AppError::NotFound("campus"))
    }

    pub async fn delete_campus(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM campuses WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_delete_error)?;
        ensure_affected(result.rows_affected(), "campus")
    }

    // ---
    // Unidades responsables
    // ---

    pub async fn list_org_units(&self) -> Result<Vec<OrgUnit>, AppError> {
        let units = sqlx::query_as::<_, OrgUnit>("SELECT * FROM org_units ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(units)
    }

    pub async fn get_org_unit(&self, id: Uuid) -> Result<OrgUnit, AppError> {
        sqlx::query_as::<_, OrgUnit>("SELECT * FROM org_units WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::NotFound("org_unit"))
    }

    pub async fn create_org_unit(&self, payload: &OrgUnitPayload) -> Result<OrgUnit, AppError> {
        sqlx::query_as::<_, OrgUnit>(
            r#"
            INSERT INTO org_units (name, total_people, campus_id)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(&payload.name)
        .bind(payload.total_people)
        .bind(payload.campus_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)
    }

    pub async fn update_org_unit(&self, id: Uuid, payload: &OrgUnitPayload) -> Result<OrgUnit, AppError> {
        sqlx::query_as::<_, OrgUnit>(
            r#"
            UPDATE org_units SET name = $2, total_people = $3, campus_id = $4
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&payload.name)
        .bind(payload.total_people)
        .bind(payload.campus_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_write_error)?
        .ok_or(AppError::NotFound("org_unit"))
    }

    pub async fn delete_org_unit(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM org_units WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_delete_error)?;
        ensure_affected(result.rows_affected(), "org_unit")
    }

    // ---
    // Edificios
    // ---

    pub async fn list_buildings(&self, org_unit_id: Option<Uuid>) -> Result<Vec<Building>, AppError> {
        let buildings = sqlx::query_as::<_, Building>(
            r#"
            SELECT * FROM buildings
            WHERE ($1::uuid IS NULL OR org_unit_id = $1)
            ORDER BY name
            "#,
        )
        .bind(org_unit_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(buildings)
    }

    pub async fn get_building(&self, id: Uuid) -> Result<Building, AppError> {
        sqlx::query_as::<_, Building>("SELECT * FROM buildings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::NotFound("building"))
    }

    pub async fn create_building(&self, org_unit_id: Uuid, payload: &BuildingPayload) -> Result<Building, AppError> {
        sqlx::query_as::<_, Building>(
            r#"
            INSERT INTO buildings (name, registered_by, org_unit_id)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(&payload.name)
        .bind(&payload.registered_by)
        .bind(org_unit_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)
    }

    /// Solo actualiza si el edificio pertenece a la UR indicada.
    pub async fn update_building(
        &self,
        id: Uuid,
        org_unit_id: Uuid,
        payload: &BuildingPayload,
    ) -> Result<Building, AppError> {
        sqlx::query_as::<_, Building>(
            r#"
            UPDATE buildings SET name = $3, registered_by = $4
            WHERE id = $1 AND org_unit_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(org_unit_id)
        .bind(&payload.name)
        .bind(&payload.registered_by)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_write_error)?
        .ok_or(AppError::NotFound("building"))
    }

    pub async fn delete_building(&self, id: Uuid, org_unit_id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM buildings WHERE id = $1 AND org_unit_id = $2")
            .bind(id)
            .bind(org_unit_id)
            .execute(&self.pool)
            .await
            .map_err(map_delete_error)?;
        ensure_affected(result.rows_affected(), "building")
    }

    pub async fn building_options(&self, org_unit_id: Uuid) -> Result<Vec<LookupOption>, AppError> {
        let options = sqlx::query_as::<_, LookupOption>(
            "SELECT id, name AS label FROM buildings WHERE org_unit_id = $1 ORDER BY name",
        )
        .bind(org_unit_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(options)
    }

    // ---
    // Áreas
    // ---

    pub async fn list_areas(&self, filter: &AreaFilter) -> Result<Vec<Area>, AppError> {
        let areas = sqlx::query_as::<_, Area>(
            r#"
            SELECT * FROM areas
            WHERE ($1::uuid IS NULL OR org_unit_id = $1)
              AND ($2::uuid IS NULL OR building_id = $2)
            ORDER BY name
            "#,
        )
        .bind(filter.org_unit_id)
        .bind(filter.building_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(areas)
    }

    pub async fn get_area(&self, id: Uuid) -> Result<Area, AppError> {
        sqlx::query_as::<_, Area>("SELECT * FROM areas WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::NotFound("area"))
    }

    pub async fn create_area(&self, org_unit_id: Uuid, payload: &AreaPayload) -> Result<Area, AppError> {
        sqlx::query_as::<_, Area>(
            r#"
            INSERT INTO areas (name, org_unit_id, building_id, manager, phone, position, education_level)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(&payload.name)
        .bind(org_unit_id)
        .bind(payload.building_id)
        .bind(&payload.manager)
        .bind(&payload.phone)
        .bind(&payload.position)
        .bind(&payload.education_level)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)
    }

    pub async fn update_area(&self, id: Uuid, org_unit_id: Uuid, payload: &AreaPayload) -> Result<Area, AppError> {
        sqlx::query_as::<_, Area>(
            r#"
            UPDATE areas SET
                name = $3, building_id = $4, manager = $5, phone = $6,
                position = $7, education_level = $8
            WHERE id = $1 AND org_unit_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(org_unit_id)
        .bind(&payload.name)
        .bind(payload.building_id)
        .bind(&payload.manager)
        .bind(&payload.phone)
        .bind(&payload.position)
        .bind(&payload.education_level)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_write_error)?
        .ok_or(AppError::NotFound("area"))
    }

    pub async fn delete_area(&self, id: Uuid, org_unit_id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM areas WHERE id = $1 AND org_unit_id = $2")
            .bind(id)
            .bind(org_unit_id)
            .execute(&self.pool)
            .await
            .map_err(map_delete_error)?;
        ensure_affected(result.rows_affected(), "area")
    }

    pub async fn area_options(&self, filter: &AreaFilter) -> Result<Vec<LookupOption>, AppError> {
        let options = sqlx::query_as::<_, LookupOption>(
            r#"
            SELECT id, name AS label FROM areas
            WHERE ($1::uuid IS NULL OR org_unit_id = $1)
              AND ($2::uuid IS NULL OR building_id = $2)
            ORDER BY name
            "#,
        )
        .bind(filter.org_unit_id)
        .bind(filter.building_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(options)
    }
}
