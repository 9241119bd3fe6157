// src/models/environmental.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::common::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "environmental_kind", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EnvironmentalKind {
    BitacoraMensual,
    AlmacenamientoTemporal,
    GeneracionRpbi,
    RecoleccionRpbi,
    CentroAcopioRme,
    VertederoMunicipal,
    CentroAcopioRrr,
}

impl EnvironmentalKind {
    pub const ALL: [EnvironmentalKind; 7] = [
        EnvironmentalKind::BitacoraMensual,
        EnvironmentalKind::AlmacenamientoTemporal,
        EnvironmentalKind::GeneracionRpbi,
        EnvironmentalKind::RecoleccionRpbi,
        EnvironmentalKind::CentroAcopioRme,
        EnvironmentalKind::VertederoMunicipal,
        EnvironmentalKind::CentroAcopioRrr,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            EnvironmentalKind::BitacoraMensual => "bitacora-mensual",
            EnvironmentalKind::AlmacenamientoTemporal => "almacenamiento-temporal",
            EnvironmentalKind::GeneracionRpbi => "generacion-rpbi",
            EnvironmentalKind::RecoleccionRpbi => "recoleccion-rpbi",
            EnvironmentalKind::CentroAcopioRme => "centro-acopio-rme",
            EnvironmentalKind::VertederoMunicipal => "vertedero-municipal",
            EnvironmentalKind::CentroAcopioRrr => "centro-acopio-rrr",
        }
    }

    pub fn from_slug(slug: &str) -> Result<Self, AppError> {
        Self::ALL
            .into_iter()
            .find(|k| k.slug() == slug)
            .ok_or_else(|| AppError::InvalidKind(slug.to_string()))
    }
}

// ---
// Detalle por tipo de bitácora
// ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyLogDetails {
    pub laboratory: Option<String>,
    pub waste_type: Option<String>,
    pub quantity: Option<Decimal>,
    pub physical_state: Option<String>,
    pub creti: Option<String>,
    pub container_type: Option<String>,
    pub capacity_measure: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TemporaryStorageDetails {
    pub collection_center: Option<String>,
    pub waste_type: Option<String>,
    pub quantity: Option<Decimal>,
    pub physical_state: Option<String>,
    pub creti: Option<String>,
    pub container_type: Option<String>,
    pub capacity_measure: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RpbiGenerationDetails {
    pub area: Option<String>,
    pub cultures_strains: Option<String>,
    pub sharps: Option<String>,
    pub pathological: Option<String>,
    pub non_anatomical: Option<String>,
    pub blood: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RpbiCollectionDetails {
    pub area: Option<String>,
    pub cultures_strains: Option<String>,
    pub sharps: Option<String>,
    pub pathological: Option<String>,
    pub non_anatomical: Option<String>,
    pub blood: Option<String>,
    pub red_bags: Option<i32>,
    pub yellow_bags: Option<i32>,
    pub sharps_containers: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RmeCollectionDetails {
    pub collection_center: Option<String>,
    pub waste_type: Option<String>,
    pub quantity: Option<Decimal>,
    pub physical_state: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LandfillDetails {
    pub dependency: Option<String>,
    pub waste_type: Option<String>,
    pub capacity: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RrrCollectionDetails {
    pub collection_center: Option<String>,
    pub dependency: Option<String>,
    pub pet: Option<String>,
    pub paper: Option<String>,
    pub cardboard: Option<String>,
    pub metals: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EnvironmentalDetails {
    BitacoraMensual(MonthlyLogDetails),
    AlmacenamientoTemporal(TemporaryStorageDetails),
    GeneracionRpbi(RpbiGenerationDetails),
    RecoleccionRpbi(RpbiCollectionDetails),
    CentroAcopioRme(RmeCollectionDetails),
    VertederoMunicipal(LandfillDetails),
    CentroAcopioRrr(RrrCollectionDetails),
}

impl EnvironmentalDetails {
    pub fn kind(&self) -> EnvironmentalKind {
        match self {
            EnvironmentalDetails::BitacoraMensual(_) => EnvironmentalKind::BitacoraMensual,
            EnvironmentalDetails::AlmacenamientoTemporal(_) => EnvironmentalKind::AlmacenamientoTemporal,
            EnvironmentalDetails::GeneracionRpbi(_) => EnvironmentalKind::GeneracionRpbi,
            EnvironmentalDetails::RecoleccionRpbi(_) => EnvironmentalKind::RecoleccionRpbi,
            EnvironmentalDetails::CentroAcopioRme(_) => EnvironmentalKind::CentroAcopioRme,
            EnvironmentalDetails::VertederoMunicipal(_) => EnvironmentalKind::VertederoMunicipal,
            EnvironmentalDetails::CentroAcopioRrr(_) => EnvironmentalKind::CentroAcopioRrr,
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentalRecord {
    pub id: Uuid,
    pub kind: EnvironmentalKind,
    pub org_unit_id: Uuid,
    #[schema(value_type = EnvironmentalDetails)]
    pub details: Json<EnvironmentalDetails>,
    pub status: bool,
    pub created_by: Option<Uuid>,
    pub updated_by: Option<Uuid>,
    pub updated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentalRecordView {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub record: EnvironmentalRecord,
    pub org_unit_name: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentalPayload {
    pub org_unit_id: Uuid,
    pub details: EnvironmentalDetails,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_has_a_unique_slug() {
        for kind in EnvironmentalKind::ALL {
            assert_eq!(EnvironmentalKind::from_slug(kind.slug()).unwrap(), kind);
        }
        assert!(EnvironmentalKind::from_slug("residuos").is_err());
    }

    #[test]
    fn details_are_tagged_with_their_kind() {
        let json = serde_json::json!({
            "kind": "RECOLECCION_RPBI",
            "area": "Laboratorio de microbiología",
            "redBags": 3,
            "yellowBags": 1,
            "sharpsContainers": 2
        });
        let details: EnvironmentalDetails = serde_json::from_value(json).unwrap();
        assert_eq!(details.kind(), EnvironmentalKind::RecoleccionRpbi);
        match details {
            EnvironmentalDetails::RecoleccionRpbi(d) => {
                assert_eq!(d.red_bags, Some(3));
                assert!(d.blood.is_none());
            }
            other => panic!("tipo inesperado: {:?}", other),
        }
    }
}
