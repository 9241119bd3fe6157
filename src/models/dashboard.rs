// src/models/dashboard.rs

use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::models::{
    energy::TariffCode,
    environmental::EnvironmentalKind,
    inventory::InventoryPeriod,
};

// Conteos globales para administradores y usuarios de consulta
#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminDashboard {
    pub org_units: i64,
    pub buildings: i64,
    pub substations: i64,
    pub invoices: i64,
    pub areas: i64,
    pub hvac_inventories: i64,
    pub lighting_inventories: i64,
    pub misc_inventories: i64,
    #[sqlx(skip)]
    pub latest_periods: Vec<InventoryPeriod>,
}

#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentalKindCount {
    pub kind: EnvironmentalKind,
    pub total: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentalDashboard {
    pub counts: Vec<EnvironmentalKindCount>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ManagerDashboard {
    pub org_unit_name: Option<String>,
    pub active_period: Option<InventoryPeriod>,
    pub available_tariffs: Vec<TariffCode>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClerkDashboard {
    pub active_period: Option<InventoryPeriod>,
    pub my_records: i64,
}
