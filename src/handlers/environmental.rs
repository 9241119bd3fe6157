// src/handlers/environmental.rs

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
        rbac::{Admins, RequireRole},
    },
    models::{
        environmental::{EnvironmentalKind, EnvironmentalPayload, EnvironmentalRecord, EnvironmentalRecordView},
        organization::UnitFilter,
    },
};

// Las siete bitácoras comparten rutas: `/api/environmental/{kind}` con el slug del tipo.

#[utoipa::path(
    get,
    path = "/api/environmental/{kind}",
    tag = "Environmental",
    params(
        ("kind" = String, Path, description = "bitacora-mensual, generacion-rpbi, vertedero-municipal, ..."),
        ("orgUnitId" = Option<Uuid>, Query, description = "Filtra por UR")
    ),
    responses(
        (status = 200, description = "Registros activos del tipo", body = Vec<EnvironmentalRecordView>),
        (status = 400, description = "Tipo de bitácora desconocido")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_records(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<Admins>,
    Path(kind): Path<String>,
    Query(filter): Query<UnitFilter>,
) -> Result<Json<Vec<EnvironmentalRecordView>>, ApiError> {
    let kind = EnvironmentalKind::from_slug(&kind).map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let records = app_state
        .environmental_service
        .list(kind, filter.org_unit_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(records))
}

pub async fn get_record(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<Admins>,
    Path((kind, id)): Path<(String, Uuid)>,
) -> Result<Json<EnvironmentalRecord>, ApiError> {
    let kind = EnvironmentalKind::from_slug(&kind).map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let record = app_state
        .environmental_service
        .get(kind, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(record))
}

#[utoipa::path(
    post,
    path = "/api/environmental/{kind}",
    tag = "Environmental",
    request_body = EnvironmentalPayload,
    params(("kind" = String, Path, description = "Slug del tipo de bitácora")),
    responses(
        (status = 201, description = "Registro creado", body = EnvironmentalRecord),
        (status = 400, description = "El detalle no corresponde al tipo de la ruta")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_record(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<Admins>,
    Path(kind): Path<String>,
    Json(payload): Json<EnvironmentalPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let kind = EnvironmentalKind::from_slug(&kind).map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let record = app_state
        .environmental_service
        .create(&guard.user, kind, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn update_record(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<Admins>,
    Path((kind, id)): Path<(String, Uuid)>,
    Json(payload): Json<EnvironmentalPayload>,
) -> Result<Json<EnvironmentalRecord>, ApiError> {
    let kind = EnvironmentalKind::from_slug(&kind).map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let record = app_state
        .environmental_service
        .update(&guard.user, kind, id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(record))
}

pub async fn delete_record(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<Admins>,
    Path((kind, id)): Path<(String, Uuid)>,
) -> Result<StatusCode, ApiError> {
    let kind = EnvironmentalKind::from_slug(&kind).map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .environmental_service
        .delete(kind, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(StatusCode::NO_CONTENT)
}
