// src/handlers/invoices.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        i18n::Locale,
        rbac::{EnergyStaff, RequireRole},
    },
    models::energy::{Invoice, InvoiceFilter, InvoicePayload, InvoiceView},
};

#[utoipa::path(
    get,
    path = "/api/invoices",
    tag = "Invoices",
    params(
        ("orgUnitId" = Option<Uuid>, Query, description = "Solo para administradores"),
        ("substationId" = Option<Uuid>, Query, description = "Subestación"),
        ("tariff" = Option<String>, Query, description = "PDBT, GDMTH, GDMTO o GDBT"),
        ("group" = Option<String>, Query, description = "pdbt o triple"),
        ("year" = Option<i32>, Query, description = "Año de registro")
    ),
    responses((status = 200, description = "Facturas visibles para el usuario", body = Vec<InvoiceView>)),
    security(("api_jwt" = []))
)]
pub async fn list_invoices(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<EnergyStaff>,
    Query(filter): Query<InvoiceFilter>,
) -> Result<Json<Vec<InvoiceView>>, ApiError> {
    let invoices = app_state
        .energy_service
        .list_invoices(&guard.user, filter)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(invoices))
}

#[utoipa::path(
    get,
    path = "/api/invoices/years",
    tag = "Invoices",
    responses((status = 200, description = "Años con facturas registradas", body = Vec<i32>)),
    security(("api_jwt" = []))
)]
pub async fn invoice_years(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<EnergyStaff>,
) -> Result<Json<Vec<i32>>, ApiError> {
    let years = app_state
        .energy_service
        .invoice_years(&guard.user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(years))
}

#[utoipa::path(
    get,
    path = "/api/invoices/{id}",
    tag = "Invoices",
    params(("id" = Uuid, Path, description = "ID de la factura")),
    responses(
        (status = 200, description = "Factura", body = InvoiceView),
        (status = 404, description = "No existe o está fuera del alcance del usuario")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_invoice(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<EnergyStaff>,
    Path(id): Path<Uuid>,
) -> Result<Json<InvoiceView>, ApiError> {
    let invoice = app_state
        .energy_service
        .get_invoice(&guard.user, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(invoice))
}

#[utoipa::path(
    post,
    path = "/api/invoices",
    tag = "Invoices",
    request_body = InvoicePayload,
    responses(
        (status = 201, description = "Factura registrada", body = Invoice),
        (status = 400, description = "Tarifa distinta a la de la subestación o columnas triple incompletas")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_invoice(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<EnergyStaff>,
    Json(payload): Json<InvoicePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let invoice = app_state
        .energy_service
        .create_invoice(&guard.user, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(invoice)))
}

#[utoipa::path(
    put,
    path = "/api/invoices/{id}",
    tag = "Invoices",
    request_body = InvoicePayload,
    params(("id" = Uuid, Path, description = "ID de la factura")),
    responses((status = 200, description = "Factura actualizada", body = Invoice)),
    security(("api_jwt" = []))
)]
pub async fn update_invoice(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<EnergyStaff>,
    Path(id): Path<Uuid>,
    Json(payload): Json<InvoicePayload>,
) -> Result<Json<Invoice>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let invoice = app_state
        .energy_service
        .update_invoice(&guard.user, id, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(invoice))
}

pub async fn delete_invoice(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<EnergyStaff>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    app_state
        .energy_service
        .delete_invoice(&guard.user, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(StatusCode::NO_CONTENT)
}
