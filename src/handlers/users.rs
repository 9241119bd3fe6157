// src/handlers/users.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        i18n::Locale,
        rbac::{Admins, Managers, RequireRole},
    },
    models::auth::{ClerkPayload, User, UserPayload},
};

#[derive(Debug, Deserialize)]
pub struct ActiveQuery {
    pub active: Option<bool>,
}

// ---
// Usuarios (administración)
// ---

#[utoipa::path(
    get,
    path = "/api/users",
    tag = "Users",
    params(("active" = Option<bool>, Query, description = "true (por defecto) activos, false inactivos")),
    responses((status = 200, description = "Usuarios", body = Vec<User>)),
    security(("api_jwt" = []))
)]
pub async fn list_users(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<Admins>,
    Query(query): Query<ActiveQuery>,
) -> Result<Json<Vec<User>>, ApiError> {
    let users = app_state
        .user_service
        .list_users(query.active.unwrap_or(true))
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(users))
}

pub async fn get_user(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<Admins>,
    Path(id): Path<Uuid>,
) -> Result<Json<User>, ApiError> {
    let user = app_state
        .user_service
        .get_user(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(user))
}

#[utoipa::path(
    post,
    path = "/api/users",
    tag = "Users",
    request_body = UserPayload,
    responses(
        (status = 201, description = "Usuario creado; la contraseña temporal se envía por correo", body = User),
        (status = 409, description = "Correo y/o matrícula duplicados")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_user(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<Admins>,
    Json(payload): Json<UserPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let user = app_state
        .user_service
        .create_user(&payload, &guard.user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn update_user(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<Admins>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UserPayload>,
) -> Result<Json<User>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let user = app_state
        .user_service
        .update_user(id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(user))
}

pub async fn deactivate_user(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<Admins>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    app_state
        .user_service
        .deactivate_user(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn reactivate_user(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<Admins>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    app_state
        .user_service
        .reactivate_user(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_user(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<Admins>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    app_state
        .user_service
        .delete_user(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(StatusCode::NO_CONTENT)
}

// ---
// Capturistas (encargado de UR)
// ---

#[utoipa::path(
    get,
    path = "/api/clerks",
    tag = "Users",
    responses((status = 200, description = "Capturistas activos de la UR", body = Vec<User>)),
    security(("api_jwt" = []))
)]
pub async fn list_clerks(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<Managers>,
) -> Result<Json<Vec<User>>, ApiError> {
    let clerks = app_state
        .user_service
        .list_clerks(&guard.user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(clerks))
}

#[utoipa::path(
    post,
    path = "/api/clerks",
    tag = "Users",
    request_body = ClerkPayload,
    responses((status = 201, description = "Capturista creado", body = User)),
    security(("api_jwt" = []))
)]
pub async fn create_clerk(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<Managers>,
    Json(payload): Json<ClerkPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let clerk = app_state
        .user_service
        .create_clerk(&guard.user, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(clerk)))
}

pub async fn update_clerk(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<Managers>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ClerkPayload>,
) -> Result<Json<User>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let clerk = app_state
        .user_service
        .update_clerk(&guard.user, id, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(clerk))
}

pub async fn delete_clerk(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<Managers>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    app_state
        .user_service
        .delete_clerk(&guard.user, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(StatusCode::NO_CONTENT)
}
