// src/models/inventory.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::common::error::AppError;
use crate::models::{auth::UserRole, energy::validate_not_negative};

// --- 1. Periodos de inventario ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "period_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PeriodStatus {
    Activo,
    Pendiente,
    Finalizado,
}

impl PeriodStatus {
    /// Estado de un periodo `[starts_on, ends_on]` en la fecha indicada (límites inclusivos).
    pub fn on(starts_on: NaiveDate, ends_on: NaiveDate, today: NaiveDate) -> Self {
        if today < starts_on {
            PeriodStatus::Pendiente
        } else if today <= ends_on {
            PeriodStatus::Activo
        } else {
            PeriodStatus::Finalizado
        }
    }
}

/// Nombre automático del n-ésimo periodo: `PERIODO_001`, `PERIODO_002`, ...
/// El número sigue al mayor existente, no al total, para sobrevivir a borrados.
pub fn period_name(sequence: i64) -> String {
    format!("PERIODO_{:03}", sequence)
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventoryPeriod {
    pub id: Uuid,
    pub name: String,
    pub starts_on: NaiveDate,
    pub ends_on: NaiveDate,
    pub status: PeriodStatus,
    pub notes: Option<String>,
    pub authorized_by: Option<String>,
    pub authorizer_role: Option<UserRole>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
/// Quién autoriza se toma del administrador que crea el periodo.
pub struct PeriodPayload {
    pub starts_on: NaiveDate,
    pub ends_on: NaiveDate,
    pub notes: Option<String>,
}

// --- 2. Tipos de inventario ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "inventory_kind", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InventoryKind {
    Climatizacion,
    Luminarias,
    Miscelaneos,
}

impl InventoryKind {
    pub const ALL: [InventoryKind; 3] =
        [InventoryKind::Climatizacion, InventoryKind::Luminarias, InventoryKind::Miscelaneos];

    /// Segmento de URL: `climatizacion`, `luminarias`, `miscelaneos`.
    pub fn from_slug(slug: &str) -> Result<Self, AppError> {
        match slug.to_ascii_lowercase().as_str() {
            "climatizacion" => Ok(InventoryKind::Climatizacion),
            "luminarias" => Ok(InventoryKind::Luminarias),
            "miscelaneos" => Ok(InventoryKind::Miscelaneos),
            other => Err(AppError::InvalidKind(other.to_string())),
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            InventoryKind::Climatizacion => "climatizacion",
            InventoryKind::Luminarias => "luminarias",
            InventoryKind::Miscelaneos => "miscelaneos",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            InventoryKind::Climatizacion => "Climatización",
            InventoryKind::Luminarias => "Luminarias",
            InventoryKind::Miscelaneos => "Misceláneos",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "floor_level")]
pub enum FloorLevel {
    #[sqlx(rename = "1")]
    #[serde(rename = "1")]
    First,
    #[sqlx(rename = "2")]
    #[serde(rename = "2")]
    Second,
    #[sqlx(rename = "3")]
    #[serde(rename = "3")]
    Third,
    #[sqlx(rename = "4")]
    #[serde(rename = "4")]
    Fourth,
    #[sqlx(rename = "PLANTA_BAJA")]
    #[serde(rename = "PLANTA_BAJA")]
    GroundFloor,
    #[sqlx(rename = "PLANTA_ALTA")]
    #[serde(rename = "PLANTA_ALTA")]
    UpperFloor,
    #[sqlx(rename = "SIN_PLANTA")]
    #[serde(rename = "SIN_PLANTA")]
    NoFloor,
}

impl FloorLevel {
    pub fn label(self) -> &'static str {
        match self {
            FloorLevel::First => "1",
            FloorLevel::Second => "2",
            FloorLevel::Third => "3",
            FloorLevel::Fourth => "4",
            FloorLevel::GroundFloor => "Planta baja",
            FloorLevel::UpperFloor => "Planta alta",
            FloorLevel::NoFloor => "Sin planta",
        }
    }
}

// --- 3. Detalle por tipo (columna JSONB `details`) ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HvacDetails {
    pub hvac_type: String,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub capacity: Option<i32>,
    pub voltage: Option<Decimal>,
    pub amperage: Option<Decimal>,
    pub power: Option<Decimal>,
    /// Potencia total declarada en kW; de ella sale el consumo.
    pub total_power_kw: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LightingDetails {
    pub lamp_type: String,
    pub fixtures: i32,
    pub lamps_per_fixture: i32,
    pub lamp_watts: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MiscDetails {
    pub description: String,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub voltage: Decimal,
    pub amperage: Decimal,
}

impl MiscDetails {
    /// `None` si el producto desborda.
    pub fn power_watts(&self) -> Option<Decimal> {
        self.voltage.checked_mul(self.amperage)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InventoryDetails {
    Climatizacion(HvacDetails),
    Luminarias(LightingDetails),
    Miscelaneos(MiscDetails),
}

/// Potencia total y consumo mensual calculados para un registro.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InventoryFigures {
    pub total_power_kw: Decimal,
    pub monthly_consumption: Decimal,
}

fn round_half_up(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

// Dígitos enteros de las columnas NUMERIC(14,5), NUMERIC(10,2) y NUMERIC(14,2)
const POWER_KW_DIGITS: u32 = 9;
const HOURS_DIGITS: u32 = 8;
const CONSUMPTION_DIGITS: u32 = 12;

fn fits_column(value: Decimal, integer_digits: u32) -> bool {
    value.abs() < Decimal::from(10i64.pow(integer_digits))
}

impl InventoryDetails {
    pub fn kind(&self) -> InventoryKind {
        match self {
            InventoryDetails::Climatizacion(_) => InventoryKind::Climatizacion,
            InventoryDetails::Luminarias(_) => InventoryKind::Luminarias,
            InventoryDetails::Miscelaneos(_) => InventoryKind::Miscelaneos,
        }
    }

    /// Potencia en kW (5 decimales) y consumo = potencia × horas (2 decimales, mitad hacia arriba).
    /// `None` cuando el cálculo desborda o el resultado no cabe en las columnas del registro.
    pub fn figures(&self, monthly_hours: Decimal) -> Option<InventoryFigures> {
        let power_kw = match self {
            InventoryDetails::Climatizacion(d) => d.total_power_kw,
            InventoryDetails::Luminarias(d) => Decimal::from(d.fixtures)
                .checked_mul(Decimal::from(d.lamps_per_fixture))?
                .checked_mul(d.lamp_watts)?
                .checked_div(Decimal::ONE_THOUSAND)?,
            InventoryDetails::Miscelaneos(d) => d.power_watts()?.checked_div(Decimal::ONE_THOUSAND)?,
        };
        let figures = InventoryFigures {
            total_power_kw: round_half_up(power_kw, 5),
            monthly_consumption: round_half_up(power_kw.checked_mul(monthly_hours)?, 2),
        };

        let fits = fits_column(figures.total_power_kw, POWER_KW_DIGITS)
            && fits_column(monthly_hours, HOURS_DIGITS)
            && fits_column(figures.monthly_consumption, CONSUMPTION_DIGITS);
        fits.then_some(figures)
    }

    /// Valores negativos no tienen sentido físico.
    pub fn has_negative_values(&self) -> bool {
        let negative = |v: &Decimal| v.is_sign_negative();
        match self {
            InventoryDetails::Climatizacion(d) => {
                negative(&d.total_power_kw) || d.capacity.is_some_and(|c| c < 0)
            }
            InventoryDetails::Luminarias(d) => {
                d.fixtures < 0 || d.lamps_per_fixture < 0 || negative(&d.lamp_watts)
            }
            InventoryDetails::Miscelaneos(d) => negative(&d.voltage) || negative(&d.amperage),
        }
    }
}

// --- 4. Registro de inventario ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventoryRecord {
    pub id: Uuid,
    pub kind: InventoryKind,
    pub org_unit_id: Uuid,
    pub building_id: Uuid,
    pub level: FloorLevel,
    pub area_id: Uuid,
    pub period_id: Uuid,
    #[schema(value_type = InventoryDetails)]
    pub details: Json<InventoryDetails>,
    pub total_power_kw: Decimal,
    pub monthly_hours: Decimal,
    pub monthly_consumption: Decimal,
    pub created_by: Option<Uuid>,
    pub updated_by: Option<Uuid>,
    pub updated_at: Option<DateTime<Utc>>,
    pub active: bool,
    pub deactivated_at: Option<DateTime<Utc>>,
    pub deactivated_by: Option<Uuid>,
    pub reactivated_at: Option<DateTime<Utc>>,
    pub reactivated_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

// Registro con nombres de UR, edificio, área, periodo y capturista
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventoryRecordView {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub record: InventoryRecord,
    pub org_unit_name: String,
    pub building_name: String,
    pub area_name: String,
    pub period_name: String,
    pub created_by_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventoryPayload {
    /// Solo para administradores; capturistas registran en su propia UR.
    pub org_unit_id: Option<Uuid>,
    /// Solo para administradores; por defecto el periodo vigente.
    pub period_id: Option<Uuid>,
    pub building_id: Uuid,
    pub area_id: Uuid,
    pub level: FloorLevel,
    #[validate(custom(function = "validate_not_negative"))]
    pub monthly_hours: Decimal,
    pub details: InventoryDetails,
}

#[derive(Debug, Default, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventoryFilter {
    pub org_unit_id: Option<Uuid>,
    pub period_id: Option<Uuid>,
    pub kind: Option<InventoryKind>,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventoryTotals {
    pub records: usize,
    pub total_power_kw: Decimal,
    pub monthly_hours: Decimal,
    pub monthly_consumption: Decimal,
}

impl InventoryTotals {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a InventoryRecord>) -> Self {
        records.into_iter().fold(Self::default(), |acc, r| Self {
            records: acc.records + 1,
            total_power_kw: acc.total_power_kw + r.total_power_kw,
            monthly_hours: acc.monthly_hours + r.monthly_hours,
            monthly_consumption: acc.monthly_consumption + r.monthly_consumption,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventoryListResponse {
    pub records: Vec<InventoryRecordView>,
    pub totals: InventoryTotals,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventoryExportQuery {
    /// Obligatoria para administradores; los encargados exportan su propia UR.
    pub org_unit_id: Option<Uuid>,
    pub period_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(value: &str) -> Decimal {
        value.parse().unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn period_status_follows_today() {
        let (start, end) = (date(2025, 3, 1), date(2025, 3, 31));
        assert_eq!(PeriodStatus::on(start, end, date(2025, 2, 28)), PeriodStatus::Pendiente);
        assert_eq!(PeriodStatus::on(start, end, start), PeriodStatus::Activo);
        assert_eq!(PeriodStatus::on(start, end, end), PeriodStatus::Activo);
        assert_eq!(PeriodStatus::on(start, end, date(2025, 4, 1)), PeriodStatus::Finalizado);
    }

    #[test]
    fn oversized_equipment_yields_no_figures() {
        let details = InventoryDetails::Miscelaneos(MiscDetails {
            description: "Transformador".into(),
            brand: None,
            model: None,
            voltage: Decimal::from(10i64.pow(16)),
            amperage: Decimal::from(10i64.pow(14)),
        });
        assert_eq!(details.figures(dec("10")), None);

        // Sin desbordar, pero fuera de NUMERIC(14,2)
        let lighting = InventoryDetails::Luminarias(LightingDetails {
            lamp_type: "Reflector".into(),
            fixtures: i32::MAX,
            lamps_per_fixture: i32::MAX,
            lamp_watts: dec("1000"),
        });
        assert_eq!(lighting.figures(dec("720")), None);
    }

    #[test]
    fn excessive_hours_yield_no_figures() {
        let details = InventoryDetails::Luminarias(LightingDetails {
            lamp_type: "LED".into(),
            fixtures: 1,
            lamps_per_fixture: 1,
            lamp_watts: dec("10"),
        });
        assert!(details.figures(dec("720")).is_some());
        assert_eq!(details.figures(Decimal::from(10i64.pow(8))), None);
    }

    #[test]
    fn period_names_are_zero_padded() {
        assert_eq!(period_name(1), "PERIODO_001");
        assert_eq!(period_name(42), "PERIODO_042");
        assert_eq!(period_name(1234), "PERIODO_1234");
    }

    #[test]
    fn hvac_consumption_uses_declared_power() {
        let details = InventoryDetails::Climatizacion(HvacDetails {
            hvac_type: "Minisplit".into(),
            brand: Some("LG".into()),
            model: None,
            capacity: Some(12000),
            voltage: Some(dec("220")),
            amperage: Some(dec("5.5")),
            power: Some(dec("1210")),
            total_power_kw: dec("1.21"),
        });
        let figures = details.figures(dec("160")).unwrap();
        assert_eq!(figures.total_power_kw, dec("1.21"));
        assert_eq!(figures.monthly_consumption, dec("193.60"));
    }

    #[test]
    fn lighting_power_comes_from_fixtures() {
        let details = InventoryDetails::Luminarias(LightingDetails {
            lamp_type: "LED T8".into(),
            fixtures: 10,
            lamps_per_fixture: 2,
            lamp_watts: dec("18"),
        });
        let figures = details.figures(dec("200")).unwrap();
        assert_eq!(figures.total_power_kw, dec("0.36"));
        assert_eq!(figures.monthly_consumption, dec("72.00"));
    }

    #[test]
    fn misc_power_is_voltage_times_amperage() {
        let details = InventoryDetails::Miscelaneos(MiscDetails {
            description: "Refrigerador".into(),
            brand: None,
            model: None,
            voltage: dec("127"),
            amperage: dec("1.5"),
        });
        let figures = details.figures(dec("100.5")).unwrap();
        assert_eq!(figures.total_power_kw, dec("0.1905"));
        // 0.1905 × 100.5 = 19.14525 → 19.15
        assert_eq!(figures.monthly_consumption, dec("19.15"));
    }

    #[test]
    fn details_roundtrip_carries_kind_tag() {
        let json = serde_json::json!({
            "kind": "LUMINARIAS",
            "lampType": "Fluorescente",
            "fixtures": 4,
            "lampsPerFixture": 3,
            "lampWatts": 32
        });
        let details: InventoryDetails = serde_json::from_value(json).unwrap();
        assert_eq!(details.kind(), InventoryKind::Luminarias);
    }

    #[test]
    fn kind_slugs() {
        assert_eq!(InventoryKind::from_slug("Luminarias").unwrap(), InventoryKind::Luminarias);
        assert!(matches!(InventoryKind::from_slug("bombas"), Err(AppError::InvalidKind(_))));
    }

    #[test]
    fn negative_inputs_are_detected() {
        let details = InventoryDetails::Miscelaneos(MiscDetails {
            description: "Horno".into(),
            brand: None,
            model: None,
            voltage: dec("-127"),
            amperage: dec("1"),
        });
        assert!(details.has_negative_values());
    }
}
