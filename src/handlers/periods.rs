// src/handlers/periods.rs

use axum::{
    extract::{Path, State},
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
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{Admins, RequireRole},
    },
    models::inventory::{InventoryPeriod, PeriodPayload},
};

#[utoipa::path(
    get,
    path = "/api/periods",
    tag = "Periods",
    responses((status = 200, description = "Periodos de inventario, el más reciente primero", body = Vec<InventoryPeriod>)),
    security(("api_jwt" = []))
)]
pub async fn list_periods(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<Admins>,
) -> Result<Json<Vec<InventoryPeriod>>, ApiError> {
    let periods = app_state
        .period_service
        .list()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(periods))
}

#[utoipa::path(
    get,
    path = "/api/periods/active",
    tag = "Periods",
    responses((status = 200, description = "Periodo vigente hoy, o null", body = InventoryPeriod)),
    security(("api_jwt" = []))
)]
pub async fn active_period(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
) -> Result<Json<Option<InventoryPeriod>>, ApiError> {
    let period = app_state
        .period_service
        .active_period()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(period))
}

pub async fn get_period(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<Admins>,
    Path(id): Path<Uuid>,
) -> Result<Json<InventoryPeriod>, ApiError> {
    let period = app_state
        .period_service
        .get(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(period))
}

#[utoipa::path(
    post,
    path = "/api/periods",
    tag = "Periods",
    request_body = PeriodPayload,
    responses(
        (status = 201, description = "Periodo creado; se avisa por correo a capturistas y encargados", body = InventoryPeriod),
        (status = 409, description = "Se traslapa con otro periodo")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_period(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<Admins>,
    Json(payload): Json<PeriodPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let period = app_state
        .period_service
        .create(&guard.user, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(period)))
}

#[utoipa::path(
    put,
    path = "/api/periods/{id}",
    tag = "Periods",
    request_body = PeriodPayload,
    params(("id" = Uuid, Path, description = "ID del periodo")),
    responses(
        (status = 200, description = "Periodo actualizado", body = InventoryPeriod),
        (status = 409, description = "Se traslapa con otro periodo")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_period(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<Admins>,
    Path(id): Path<Uuid>,
    Json(payload): Json<PeriodPayload>,
) -> Result<Json<InventoryPeriod>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let period = app_state
        .period_service
        .update(id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(period))
}

#[utoipa::path(
    delete,
    path = "/api/periods/{id}",
    tag = "Periods",
    params(("id" = Uuid, Path, description = "ID del periodo")),
    responses(
        (status = 204, description = "Periodo eliminado"),
        (status = 409, description = "Tiene inventarios asociados")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_period(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<Admins>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    app_state
        .period_service
        .delete(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(StatusCode::NO_CONTENT)
}
