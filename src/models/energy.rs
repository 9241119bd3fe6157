// src/models/energy.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::common::error::AppError;

// --- Tarifas CFE ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "tariff_code")]
pub enum TariffCode {
    #[sqlx(rename = "PDBT")]
    #[serde(rename = "PDBT")]
    Pdbt,
    #[sqlx(rename = "GDMTH")]
    #[serde(rename = "GDMTH")]
    Gdmth,
    #[sqlx(rename = "GDMTO")]
    #[serde(rename = "GDMTO")]
    Gdmto,
    #[sqlx(rename = "GDBT")]
    #[serde(rename = "GDBT")]
    Gdbt,
}

/// PDBT se factura con formato simple; el resto comparte el formato "triple".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TariffGroup {
    Pdbt,
    Triple,
}

impl TariffCode {
    pub const TRIPLE: [TariffCode; 3] = [TariffCode::Gdmth, TariffCode::Gdmto, TariffCode::Gdbt];

    pub fn group(self) -> TariffGroup {
        match self {
            TariffCode::Pdbt => TariffGroup::Pdbt,
            _ => TariffGroup::Triple,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TariffCode::Pdbt => "PDBT",
            TariffCode::Gdmth => "GDMTH",
            TariffCode::Gdmto => "GDMTO",
            TariffCode::Gdbt => "GDBT",
        }
    }
}

impl TariffGroup {
    pub fn codes(self) -> Vec<TariffCode> {
        match self {
            TariffGroup::Pdbt => vec![TariffCode::Pdbt],
            TariffGroup::Triple => TariffCode::TRIPLE.to_vec(),
        }
    }

    /// Segmento de URL de las exportaciones: `pdbt` o `triple`.
    pub fn from_slug(slug: &str) -> Result<Self, AppError> {
        match slug.to_ascii_lowercase().as_str() {
            "pdbt" => Ok(TariffGroup::Pdbt),
            "triple" => Ok(TariffGroup::Triple),
            other => Err(AppError::InvalidKind(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "invoice_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceStatus {
    Pagada,
    NoPagada,
}

impl InvoiceStatus {
    /// PDBT se registra ya pagada; las triples quedan pendientes de pago.
    pub fn default_for(tariff: TariffCode) -> Self {
        match tariff.group() {
            TariffGroup::Pdbt => InvoiceStatus::Pagada,
            TariffGroup::Triple => InvoiceStatus::NoPagada,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            InvoiceStatus::Pagada => "Pagada",
            InvoiceStatus::NoPagada => "No pagada",
        }
    }
}

// --- Subestación ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Substation {
    pub id: Uuid,
    pub org_unit_id: Uuid,
    pub service_number: i64,
    pub meter_number: String,
    pub tariff: TariffCode,
    pub multiplier: Decimal,
    pub created_at: DateTime<Utc>,
}

impl Substation {
    pub fn lookup_label(&self) -> String {
        format!(
            "Medidor: {} | Servicio: {} | Tarifa: {}",
            self.meter_number,
            self.service_number,
            self.tariff.as_str()
        )
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubstationPayload {
    /// Solo lo usan los administradores; el encargado siempre registra en su UR.
    pub org_unit_id: Option<Uuid>,
    #[validate(range(min = 1, message = "El número de servicio debe ser positivo."))]
    pub service_number: i64,
    #[validate(length(min = 1, message = "El número de medidor es obligatorio."))]
    pub meter_number: String,
    pub tariff: TariffCode,
    #[validate(custom(function = "validate_not_negative"))]
    pub multiplier: Decimal,
}

// --- Catálogo de tarifas ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Tariff {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub rate: Decimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct TariffPayload {
    #[validate(length(min = 1, max = 255, message = "El nombre es obligatorio (máximo 255 caracteres)."))]
    pub name: String,
    #[validate(length(min = 1, max = 500, message = "La descripción es obligatoria (máximo 500 caracteres)."))]
    pub description: String,
    #[validate(custom(function = "validate_not_negative"))]
    pub rate: Decimal,
}

// --- Medidores ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Meter {
    pub id: Uuid,
    pub org_unit_id: Uuid,
    pub meter_number: String,
    pub transformer_capacity: Option<Decimal>,
    pub status: bool,
    pub created_by: Option<Uuid>,
    pub updated_by: Option<Uuid>,
    pub updated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MeterPayload {
    pub org_unit_id: Uuid,
    #[validate(length(min = 1, message = "El número de medidor es obligatorio."))]
    pub meter_number: String,
    pub transformer_capacity: Option<Decimal>,
    #[serde(default = "default_true")]
    pub status: bool,
}

fn default_true() -> bool {
    true
}

// --- Facturas ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: Uuid,
    pub tariff_type: TariffCode,
    pub substation_id: Uuid,
    pub period_days: i32,
    pub billing_period: String,
    pub consumption_kwh: Decimal,
    pub energy_charge: Decimal,
    pub max_demand_amount: Decimal,
    pub dap: Decimal,
    pub vat: Decimal,
    pub total_due: Decimal,
    pub max_demand: Option<i32>,
    pub power_factor: Option<Decimal>,
    pub load_factor: Option<i32>,
    pub bt_amount: Option<Decimal>,
    pub pf_amount: Option<Decimal>,
    pub due_date: Option<NaiveDate>,
    pub status: InvoiceStatus,
    pub created_by: Option<Uuid>,
    pub updated_by: Option<Uuid>,
    pub updated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

// Factura con los datos de su subestación y UR, para listados y exportación
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceView {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub invoice: Invoice,
    pub service_number: i64,
    pub meter_number: String,
    pub org_unit_id: Uuid,
    pub org_unit_name: String,
    pub created_by_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvoicePayload {
    pub tariff_type: TariffCode,
    pub substation_id: Uuid,
    /// UR indicada por el administrador; para el encargado se usa la suya.
    pub org_unit_id: Option<Uuid>,
    #[validate(range(min = 1, max = 366, message = "Los días del periodo deben estar entre 1 y 366."))]
    pub period_days: i32,
    #[validate(length(min = 1, message = "El periodo es obligatorio."))]
    pub billing_period: String,
    #[validate(custom(function = "validate_not_negative"))]
    pub consumption_kwh: Decimal,
    #[validate(custom(function = "validate_not_negative"))]
    pub energy_charge: Decimal,
    #[validate(custom(function = "validate_not_negative"))]
    pub max_demand_amount: Decimal,
    #[validate(custom(function = "validate_not_negative"))]
    pub dap: Decimal,
    #[validate(custom(function = "validate_not_negative"))]
    pub vat: Decimal,
    #[validate(custom(function = "validate_not_negative"))]
    pub total_due: Decimal,
    pub max_demand: Option<i32>,
    pub power_factor: Option<Decimal>,
    pub load_factor: Option<i32>,
    pub bt_amount: Option<Decimal>,
    pub pf_amount: Option<Decimal>,
    pub due_date: Option<NaiveDate>,
    pub status: Option<InvoiceStatus>,
}

impl InvoicePayload {
    /// Campos exclusivos de tarifa triple que faltan en la captura.
    pub fn missing_triple_fields(&self) -> Vec<&'static str> {
        if self.tariff_type.group() != TariffGroup::Triple {
            return Vec::new();
        }
        let mut missing = Vec::new();
        if self.max_demand.is_none() {
            missing.push("maxDemand");
        }
        if self.power_factor.is_none() {
            missing.push("powerFactor");
        }
        if self.load_factor.is_none() {
            missing.push("loadFactor");
        }
        if self.bt_amount.is_none() {
            missing.push("btAmount");
        }
        if self.pf_amount.is_none() {
            missing.push("pfAmount");
        }
        missing
    }

    /// En PDBT los campos triples se descartan.
    pub fn strip_triple_fields(mut self) -> Self {
        if self.tariff_type.group() == TariffGroup::Pdbt {
            self.max_demand = None;
            self.power_factor = None;
            self.load_factor = None;
            self.bt_amount = None;
            self.pf_amount = None;
        }
        self
    }

    pub fn effective_status(&self) -> InvoiceStatus {
        self.status.unwrap_or_else(|| InvoiceStatus::default_for(self.tariff_type))
    }
}

#[derive(Debug, Default, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceFilter {
    pub org_unit_id: Option<Uuid>,
    pub substation_id: Option<Uuid>,
    pub tariff: Option<TariffCode>,
    pub group: Option<TariffGroup>,
    pub year: Option<i32>,
}

pub(crate) fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() {
        let mut err = ValidationError::new("range");
        err.message = Some("El valor no puede ser negativo.".into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(value: &str) -> Decimal {
        value.parse().unwrap()
    }

    fn invoice(tariff: TariffCode) -> InvoicePayload {
        InvoicePayload {
            tariff_type: tariff,
            substation_id: Uuid::new_v4(),
            org_unit_id: None,
            period_days: 30,
            billing_period: "01/01/2025 - 31/01/2025".into(),
            consumption_kwh: dec("1200.50"),
            energy_charge: dec("3500.00"),
            max_demand_amount: dec("0"),
            dap: dec("120.00"),
            vat: dec("560.00"),
            total_due: dec("4180.00"),
            max_demand: None,
            power_factor: Some(dec("0.95")),
            load_factor: None,
            bt_amount: None,
            pf_amount: None,
            due_date: None,
            status: None,
        }
    }

    #[test]
    fn tariff_groups() {
        assert_eq!(TariffCode::Pdbt.group(), TariffGroup::Pdbt);
        for code in TariffCode::TRIPLE {
            assert_eq!(code.group(), TariffGroup::Triple);
        }
        assert_eq!(TariffGroup::Triple.codes().len(), 3);
    }

    #[test]
    fn export_group_slugs() {
        assert_eq!(TariffGroup::from_slug("triple").unwrap(), TariffGroup::Triple);
        assert_eq!(TariffGroup::from_slug("PDBT").unwrap(), TariffGroup::Pdbt);
        assert!(matches!(TariffGroup::from_slug("gdmth"), Err(AppError::InvalidKind(_))));
    }

    #[test]
    fn default_status_depends_on_tariff() {
        assert_eq!(invoice(TariffCode::Pdbt).effective_status(), InvoiceStatus::Pagada);
        assert_eq!(invoice(TariffCode::Gdmth).effective_status(), InvoiceStatus::NoPagada);

        let mut explicit = invoice(TariffCode::Gdbt);
        explicit.status = Some(InvoiceStatus::Pagada);
        assert_eq!(explicit.effective_status(), InvoiceStatus::Pagada);
    }

    #[test]
    fn triple_invoices_require_their_columns() {
        assert!(invoice(TariffCode::Pdbt).missing_triple_fields().is_empty());
        let missing = invoice(TariffCode::Gdmto).missing_triple_fields();
        assert_eq!(missing, vec!["maxDemand", "loadFactor", "btAmount", "pfAmount"]);
    }

    #[test]
    fn pdbt_invoices_drop_triple_columns() {
        let stripped = invoice(TariffCode::Pdbt).strip_triple_fields();
        assert!(stripped.power_factor.is_none());
        let kept = invoice(TariffCode::Gdmth).strip_triple_fields();
        assert_eq!(kept.power_factor, Some(dec("0.95")));
    }

    #[test]
    fn substation_label() {
        let s = Substation {
            id: Uuid::new_v4(),
            org_unit_id: Uuid::new_v4(),
            service_number: 123456,
            meter_number: "M-01".into(),
            tariff: TariffCode::Gdmth,
            multiplier: dec("1.00"),
            created_at: Utc::now(),
        };
        assert_eq!(s.lookup_label(), "Medidor: M-01 | Servicio: 123456 | Tarifa: GDMTH");
    }

    #[test]
    fn negative_amounts_are_rejected() {
        let mut bad = invoice(TariffCode::Pdbt);
        bad.total_due = dec("-1");
        assert!(bad.validate().is_err());
        assert!(invoice(TariffCode::Pdbt).validate().is_ok());
    }
}
