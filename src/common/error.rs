// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::common::i18n::I18nStore;
use crate::middleware::i18n::Locale;

// Errores de dominio. Se traducen a `ApiError` en el borde HTTP.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Error de validación")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Credenciales inválidas")]
    InvalidCredentials,

    #[error("Cuenta bloqueada hasta {0}")]
    AccountLocked(DateTime<Utc>),

    #[error("Token inválido")]
    InvalidToken,

    #[error("Acceso denegado")]
    Forbidden,

    #[error("Usuario no encontrado")]
    UserNotFound,

    #[error("Recurso no encontrado: {0}")]
    NotFound(&'static str),

    #[error("El correo ya existe")]
    EmailAlreadyExists,

    #[error("La matrícula ya existe")]
    EnrollmentAlreadyExists,

    #[error("El correo y la matrícula ya existen")]
    EmailAndEnrollmentAlreadyExist,

    #[error("Violación de unicidad: {0}")]
    UniqueConstraintViolation(String),

    #[error("El registro está referenciado por otros registros")]
    RecordInUse,

    #[error("Referencia inválida: {0}")]
    InvalidReference(String),

    #[error("El usuario no tiene unidad responsable asignada")]
    MissingOrgUnit,

    #[error("La subestación no corresponde a la unidad responsable")]
    SubstationNotInUnit,

    #[error("La tarifa de la factura no corresponde a la subestación")]
    TariffMismatch,

    #[error("Faltan campos obligatorios para tarifa triple: {0}")]
    MissingTripleFields(String),

    #[error("El periodo se solapa con otro existente")]
    PeriodOverlap,

    #[error("La fecha de inicio debe ser menor a la de fin")]
    InvalidPeriodRange,

    #[error("No hay un periodo de inventario activo")]
    NoActivePeriod,

    #[error("Código inválido o expirado")]
    InvalidResetCode,

    #[error("Las contraseñas no coinciden")]
    PasswordMismatch,

    #[error("Tipo de inventario no válido: {0}")]
    InvalidKind(String),

    #[error("Fuente no encontrada: {0}")]
    FontNotFound(String),

    #[error("Error de base de datos")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Error interno del servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Error de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Error de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("Error al generar la hoja de cálculo: {0}")]
    SpreadsheetError(#[from] rust_xlsxwriter::XlsxError),

    #[error("Error al enviar correo: {0}")]
    MailError(String),
}

// Error listo para serializar como respuesta HTTP.
#[derive(Debug, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    pub status: StatusCode,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ApiError {
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self { status, error: error.into(), details: None }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status;
        (status, Json(self)).into_response()
    }
}

impl AppError {
    /// Código HTTP y clave del catálogo de mensajes.
    pub fn status_and_key(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::ValidationError(_) => (StatusCode::BAD_REQUEST, "error.validation"),
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "error.invalid_credentials"),
            AppError::AccountLocked(_) => (StatusCode::LOCKED, "error.account_locked"),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "error.invalid_token"),
            AppError::Forbidden => (StatusCode::FORBIDDEN, "error.forbidden"),
            AppError::UserNotFound => (StatusCode::NOT_FOUND, "error.user_not_found"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "error.not_found"),
            AppError::EmailAlreadyExists => (StatusCode::CONFLICT, "error.email_exists"),
            AppError::EnrollmentAlreadyExists => (StatusCode::CONFLICT, "error.enrollment_exists"),
            AppError::EmailAndEnrollmentAlreadyExist => {
                (StatusCode::CONFLICT, "error.email_and_enrollment_exist")
            }
            AppError::UniqueConstraintViolation(_) => (StatusCode::CONFLICT, "error.unique_violation"),
            AppError::RecordInUse => (StatusCode::CONFLICT, "error.record_in_use"),
            AppError::InvalidReference(_) => (StatusCode::BAD_REQUEST, "error.invalid_reference"),
            AppError::MissingOrgUnit => (StatusCode::FORBIDDEN, "error.missing_org_unit"),
            AppError::SubstationNotInUnit => (StatusCode::BAD_REQUEST, "error.substation_not_in_unit"),
            AppError::TariffMismatch => (StatusCode::BAD_REQUEST, "error.tariff_mismatch"),
            AppError::MissingTripleFields(_) => (StatusCode::BAD_REQUEST, "error.missing_triple_fields"),
            AppError::PeriodOverlap => (StatusCode::CONFLICT, "error.period_overlap"),
            AppError::InvalidPeriodRange => (StatusCode::BAD_REQUEST, "error.invalid_period_range"),
            AppError::NoActivePeriod => (StatusCode::CONFLICT, "error.no_active_period"),
            AppError::InvalidResetCode => (StatusCode::BAD_REQUEST, "error.invalid_reset_code"),
            AppError::PasswordMismatch => (StatusCode::BAD_REQUEST, "error.password_mismatch"),
            AppError::InvalidKind(_) => (StatusCode::BAD_REQUEST, "error.invalid_kind"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "error.internal"),
        }
    }

    /// Convierte el error de dominio en la respuesta HTTP, traducida al idioma del cliente.
    pub fn to_api_error(&self, locale: &Locale, store: &I18nStore) -> ApiError {
        let (status, key) = self.status_and_key();

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("Error interno del servidor: {:?}", self);
        }

        let mut params: Vec<(&str, String)> = Vec::new();
        match self {
            AppError::NotFound(resource) => {
                params.push(("resource", store.translate(&locale.0, &format!("resource.{}", resource))))
            }
            AppError::AccountLocked(until) => {
                params.push(("until", until.format("%d/%m/%Y %H:%M UTC").to_string()))
            }
            AppError::UniqueConstraintViolation(detail)
            | AppError::InvalidReference(detail)
            | AppError::MissingTripleFields(detail)
            | AppError::InvalidKind(detail) => params.push(("detail", detail.clone())),
            _ => {}
        }

        let message = store.translate_with(&locale.0, key, &params);

        let details = match self {
            AppError::ValidationError(errors) => {
                let mut fields = serde_json::Map::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    fields.insert(field.to_string(), json!(messages));
                }
                Some(Value::Object(fields))
            }
            _ => None,
        };

        ApiError { status, error: message, details }
    }
}

// Sin idioma explícito (p. ej. dentro de middleware) se responde en español.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let store = I18nStore::default();
        self.to_api_error(&Locale::default(), &store).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::{ValidationError, ValidationErrors};

    #[test]
    fn business_errors_map_to_expected_status() {
        assert_eq!(AppError::PeriodOverlap.status_and_key().0, StatusCode::CONFLICT);
        assert_eq!(AppError::RecordInUse.status_and_key().0, StatusCode::CONFLICT);
        assert_eq!(AppError::Forbidden.status_and_key().0, StatusCode::FORBIDDEN);
        assert_eq!(AppError::NotFound("building").status_and_key().0, StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::AccountLocked(Utc::now()).status_and_key().0,
            StatusCode::LOCKED
        );
        assert_eq!(
            AppError::MailError("smtp".into()).status_and_key().0,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn not_found_message_names_the_resource() {
        let store = I18nStore::default();
        let api = AppError::NotFound("building").to_api_error(&Locale("es".into()), &store);
        assert_eq!(api.status, StatusCode::NOT_FOUND);
        assert!(api.error.contains("Edificio"), "mensaje: {}", api.error);

        let api = AppError::NotFound("building").to_api_error(&Locale("en".into()), &store);
        assert!(api.error.contains("Building"), "message: {}", api.error);
    }

    #[test]
    fn validation_errors_are_reported_per_field() {
        let mut errors = ValidationErrors::new();
        let mut err = ValidationError::new("length");
        err.message = Some("El nombre es obligatorio.".into());
        errors.add("name", err);

        let api = AppError::ValidationError(errors).to_api_error(&Locale::default(), &I18nStore::default());
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        let details = api.details.expect("detalles de validación");
        assert_eq!(details["name"][0], "El nombre es obligatorio.");
    }
}
