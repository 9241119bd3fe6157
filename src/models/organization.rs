// src/models/organization.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// --- Campus ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Campus {
    pub id: Uuid,
    pub code: String,
    pub location: Option<String>,
    pub square_meters: Option<Decimal>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CampusPayload {
    #[validate(length(min = 1, message = "La nomenclatura es obligatoria."))]
    pub code: String,
    pub location: Option<String>,
    pub square_meters: Option<Decimal>,
}

// --- Unidad Responsable ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrgUnit {
    pub id: Uuid,
    pub name: String,
    pub total_people: Option<i32>,
    pub campus_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrgUnitPayload {
    #[validate(length(min = 1, message = "El nombre es obligatorio."))]
    pub name: String,
    #[validate(range(min = 0, message = "El total de personas no puede ser negativo."))]
    pub total_people: Option<i32>,
    pub campus_id: Option<Uuid>,
}

// --- Edificio ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Building {
    pub id: Uuid,
    pub name: String,
    pub registered_by: Option<String>,
    pub org_unit_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BuildingPayload {
    #[validate(length(min = 1, message = "El nombre es obligatorio."))]
    pub name: String,
    pub registered_by: Option<String>,
}

// --- Área ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Area {
    pub id: Uuid,
    pub name: String,
    pub org_unit_id: Uuid,
    pub building_id: Uuid,
    pub manager: Option<String>,
    pub phone: Option<String>,
    pub position: Option<String>,
    pub education_level: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AreaPayload {
    #[validate(length(min = 1, message = "El nombre es obligatorio."))]
    pub name: String,
    pub building_id: Uuid,
    pub manager: Option<String>,
    #[validate(length(max = 20, message = "El teléfono admite máximo 20 caracteres."))]
    pub phone: Option<String>,
    pub position: Option<String>,
    pub education_level: Option<String>,
}

// Opción para selects en cascada (UR → edificios → áreas, UR → subestaciones)
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct LookupOption {
    pub id: Uuid,
    pub label: String,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UnitFilter {
    pub org_unit_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AreaFilter {
    pub org_unit_id: Option<Uuid>,
    pub building_id: Option<Uuid>,
}
