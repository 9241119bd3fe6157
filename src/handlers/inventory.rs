// src/handlers/inventory.rs

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
        rbac::{Admins, InventoryEditors, InventoryStaff, RequireRole},
    },
    models::inventory::{InventoryFilter, InventoryListResponse, InventoryPayload, InventoryRecord},
};

// Capturistas, encargados y administradores comparten rutas;
// el servicio recorta el alcance según el rol.

#[utoipa::path(
    get,
    path = "/api/inventory",
    tag = "Inventory",
    params(
        ("orgUnitId" = Option<Uuid>, Query, description = "Solo para administradores"),
        ("periodId" = Option<Uuid>, Query, description = "Periodo (ignorado para capturistas)"),
        ("kind" = Option<String>, Query, description = "CLIMATIZACION, LUMINARIAS o MISCELANEOS"),
        ("active" = Option<bool>, Query, description = "false lista los registros dados de baja")
    ),
    responses((status = 200, description = "Registros con totales de potencia, horas y consumo", body = InventoryListResponse)),
    security(("api_jwt" = []))
)]
pub async fn list_inventory(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<InventoryStaff>,
    Query(filter): Query<InventoryFilter>,
) -> Result<Json<InventoryListResponse>, ApiError> {
    let response = app_state
        .inventory_service
        .list(&guard.user, filter)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(response))
}

pub async fn get_inventory(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<InventoryStaff>,
    Path(id): Path<Uuid>,
) -> Result<Json<InventoryRecord>, ApiError> {
    let record = app_state
        .inventory_service
        .get(&guard.user, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(record))
}

#[utoipa::path(
    post,
    path = "/api/inventory",
    tag = "Inventory",
    request_body = InventoryPayload,
    responses(
        (status = 201, description = "Equipo registrado en el periodo vigente", body = InventoryRecord),
        (status = 409, description = "No hay un periodo de inventario activo")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_inventory(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<InventoryEditors>,
    Json(payload): Json<InventoryPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let record = app_state
        .inventory_service
        .create(&guard.user, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(record)))
}

#[utoipa::path(
    put,
    path = "/api/inventory/{id}",
    tag = "Inventory",
    request_body = InventoryPayload,
    params(("id" = Uuid, Path, description = "ID del registro")),
    responses(
        (status = 200, description = "Registro actualizado y cifras recalculadas", body = InventoryRecord),
        (status = 403, description = "El registro no pertenece al usuario")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_inventory(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<InventoryEditors>,
    Path(id): Path<Uuid>,
    Json(payload): Json<InventoryPayload>,
) -> Result<Json<InventoryRecord>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let record = app_state
        .inventory_service
        .update(&guard.user, id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(record))
}

pub async fn delete_inventory(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<InventoryEditors>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    app_state
        .inventory_service
        .delete(&guard.user, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(StatusCode::NO_CONTENT)
}

// --- Baja lógica (administradores) ---

pub async fn deactivate_inventory(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<Admins>,
    Path(id): Path<Uuid>,
) -> Result<Json<InventoryRecord>, ApiError> {
    let record = app_state
        .inventory_service
        .deactivate(&guard.user, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(record))
}

pub async fn reactivate_inventory(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<Admins>,
    Path(id): Path<Uuid>,
) -> Result<Json<InventoryRecord>, ApiError> {
    let record = app_state
        .inventory_service
        .reactivate(&guard.user, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(record))
}
