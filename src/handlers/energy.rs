// src/handlers/energy.rs

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
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{Admins, EnergyStaff, RequireRole},
    },
    models::{
        energy::{Meter, MeterPayload, Substation, SubstationPayload, Tariff, TariffPayload},
        organization::UnitFilter,
    },
};

// ---
// Subestaciones
// ---

#[utoipa::path(
    get,
    path = "/api/substations",
    tag = "Energy",
    params(("orgUnitId" = Option<Uuid>, Query, description = "Solo para administradores")),
    responses((status = 200, description = "Subestaciones visibles para el usuario", body = Vec<Substation>)),
    security(("api_jwt" = []))
)]
pub async fn list_substations(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<EnergyStaff>,
    Query(filter): Query<UnitFilter>,
) -> Result<Json<Vec<Substation>>, ApiError> {
    let substations = app_state
        .energy_service
        .list_substations(&guard.user, filter.org_unit_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(substations))
}

pub async fn get_substation(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<EnergyStaff>,
    Path(id): Path<Uuid>,
) -> Result<Json<Substation>, ApiError> {
    let substation = app_state
        .energy_service
        .get_substation(&guard.user, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(substation))
}

#[utoipa::path(
    post,
    path = "/api/substations",
    tag = "Energy",
    request_body = SubstationPayload,
    responses(
        (status = 201, description = "Subestación registrada", body = Substation),
        (status = 409, description = "Número de servicio duplicado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_substation(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<EnergyStaff>,
    Json(payload): Json<SubstationPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let substation = app_state
        .energy_service
        .create_substation(&guard.user, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok((StatusCode::CREATED, Json(substation)))
}

pub async fn update_substation(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<EnergyStaff>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SubstationPayload>,
) -> Result<Json<Substation>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let substation = app_state
        .energy_service
        .update_substation(&guard.user, id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(substation))
}

pub async fn delete_substation(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<EnergyStaff>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    app_state
        .energy_service
        .delete_substation(&guard.user, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(StatusCode::NO_CONTENT)
}

// ---
// Tarifas (lectura para todos, escritura para administradores)
// ---

#[utoipa::path(
    get,
    path = "/api/tariffs",
    tag = "Energy",
    responses((status = 200, description = "Catálogo de tarifas", body = Vec<Tariff>)),
    security(("api_jwt" = []))
)]
pub async fn list_tariffs(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
) -> Result<Json<Vec<Tariff>>, ApiError> {
    let tariffs = app_state
        .energy_service
        .list_tariffs()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(tariffs))
}

pub async fn get_tariff(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Tariff>, ApiError> {
    let tariff = app_state
        .energy_service
        .get_tariff(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(tariff))
}

pub async fn create_tariff(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<Admins>,
    Json(payload): Json<TariffPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let tariff = app_state
        .energy_service
        .create_tariff(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok((StatusCode::CREATED, Json(tariff)))
}

pub async fn update_tariff(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<Admins>,
    Path(id): Path<Uuid>,
    Json(payload): Json<TariffPayload>,
) -> Result<Json<Tariff>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let tariff = app_state
        .energy_service
        .update_tariff(id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(tariff))
}

pub async fn delete_tariff(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<Admins>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    app_state
        .energy_service
        .delete_tariff(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(StatusCode::NO_CONTENT)
}

// ---
// Medidores
// ---

#[utoipa::path(
    get,
    path = "/api/meters",
    tag = "Energy",
    params(("orgUnitId" = Option<Uuid>, Query, description = "Filtra por UR")),
    responses((status = 200, description = "Medidores", body = Vec<Meter>)),
    security(("api_jwt" = []))
)]
pub async fn list_meters(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<Admins>,
    Query(filter): Query<UnitFilter>,
) -> Result<Json<Vec<Meter>>, ApiError> {
    let meters = app_state
        .energy_service
        .list_meters(filter.org_unit_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(meters))
}

pub async fn get_meter(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<Admins>,
    Path(id): Path<Uuid>,
) -> Result<Json<Meter>, ApiError> {
    let meter = app_state
        .energy_service
        .get_meter(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(meter))
}

pub async fn create_meter(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<Admins>,
    Json(payload): Json<MeterPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let meter = app_state
        .energy_service
        .create_meter(&guard.user, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok((StatusCode::CREATED, Json(meter)))
}

pub async fn update_meter(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<Admins>,
    Path(id): Path<Uuid>,
    Json(payload): Json<MeterPayload>,
) -> Result<Json<Meter>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let meter = app_state
        .energy_service
        .update_meter(&guard.user, id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(meter))
}

pub async fn delete_meter(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<Admins>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    app_state
        .energy_service
        .delete_meter(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(StatusCode::NO_CONTENT)
}
