// src/handlers/organization.rs

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
        rbac::{Admins, EnergyStaff, Managers, RequireRole},
    },
    models::organization::{
        Area, AreaFilter, AreaPayload, Building, BuildingPayload, Campus, CampusPayload, LookupOption, OrgUnit,
        OrgUnitPayload, UnitFilter,
    },
};

// ---
// Campus
// ---

#[utoipa::path(
    get,
    path = "/api/campuses",
    tag = "Organization",
    responses((status = 200, description = "Campus registrados", body = Vec<Campus>)),
    security(("api_jwt" = []))
)]
pub async fn list_campuses(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<Admins>,
) -> Result<Json<Vec<Campus>>, ApiError> {
    let campuses = app_state
        .organization_service
        .list_campuses()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(campuses))
}

pub async fn get_campus(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<Admins>,
    Path(id): Path<Uuid>,
) -> Result<Json<Campus>, ApiError> {
    let campus = app_state
        .organization_service
        .get_campus(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(campus))
}

#[utoipa::path(
    post,
    path = "/api/campuses",
    tag = "Organization",
    request_body = CampusPayload,
    responses(
        (status = 201, description = "Campus creado", body = Campus),
        (status = 409, description = "Código duplicado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_campus(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<Admins>,
    Json(payload): Json<CampusPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let campus = app_state
        .organization_service
        .create_campus(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok((StatusCode::CREATED, Json(campus)))
}

pub async fn update_campus(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<Admins>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CampusPayload>,
) -> Result<Json<Campus>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let campus = app_state
        .organization_service
        .update_campus(id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(campus))
}

pub async fn delete_campus(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<Admins>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    app_state
        .organization_service
        .delete_campus(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(StatusCode::NO_CONTENT)
}

// ---
// Unidades responsables
// ---

#[utoipa::path(
    get,
    path = "/api/org-units",
    tag = "Organization",
    responses((status = 200, description = "Unidades responsables", body = Vec<OrgUnit>)),
    security(("api_jwt" = []))
)]
pub async fn list_org_units(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<Admins>,
) -> Result<Json<Vec<OrgUnit>>, ApiError> {
    let units = app_state
        .organization_service
        .list_org_units()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(units))
}

pub async fn get_org_unit(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<Admins>,
    Path(id): Path<Uuid>,
) -> Result<Json<OrgUnit>, ApiError> {
    let unit = app_state
        .organization_service
        .get_org_unit(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(unit))
}

#[utoipa::path(
    post,
    path = "/api/org-units",
    tag = "Organization",
    request_body = OrgUnitPayload,
    responses((status = 201, description = "Unidad responsable creada", body = OrgUnit)),
    security(("api_jwt" = []))
)]
pub async fn create_org_unit(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<Admins>,
    Json(payload): Json<OrgUnitPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let unit = app_state
        .organization_service
        .create_org_unit(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok((StatusCode::CREATED, Json(unit)))
}

pub async fn update_org_unit(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<Admins>,
    Path(id): Path<Uuid>,
    Json(payload): Json<OrgUnitPayload>,
) -> Result<Json<OrgUnit>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let unit = app_state
        .organization_service
        .update_org_unit(id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(unit))
}

pub async fn delete_org_unit(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<Admins>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    app_state
        .organization_service
        .delete_org_unit(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(StatusCode::NO_CONTENT)
}

// ---
// Edificios (consulta: administradores y encargados; escritura: encargado de la UR)
// ---

#[utoipa::path(
    get,
    path = "/api/buildings",
    tag = "Organization",
    params(("orgUnitId" = Option<Uuid>, Query, description = "Solo para administradores")),
    responses((status = 200, description = "Edificios", body = Vec<Building>)),
    security(("api_jwt" = []))
)]
pub async fn list_buildings(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<EnergyStaff>,
    Query(filter): Query<UnitFilter>,
) -> Result<Json<Vec<Building>>, ApiError> {
    let buildings = app_state
        .organization_service
        .list_buildings(&guard.user, filter.org_unit_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(buildings))
}

#[utoipa::path(
    post,
    path = "/api/buildings",
    tag = "Organization",
    request_body = BuildingPayload,
    responses((status = 201, description = "Edificio creado en la UR del encargado", body = Building)),
    security(("api_jwt" = []))
)]
pub async fn create_building(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<Managers>,
    Json(payload): Json<BuildingPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let building = app_state
        .organization_service
        .create_building(&guard.user, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok((StatusCode::CREATED, Json(building)))
}

pub async fn update_building(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<Managers>,
    Path(id): Path<Uuid>,
    Json(payload): Json<BuildingPayload>,
) -> Result<Json<Building>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let building = app_state
        .organization_service
        .update_building(&guard.user, id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(building))
}

pub async fn delete_building(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<Managers>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    app_state
        .organization_service
        .delete_building(&guard.user, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(StatusCode::NO_CONTENT)
}

// ---
// Áreas
// ---

#[utoipa::path(
    get,
    path = "/api/areas",
    tag = "Organization",
    params(
        ("orgUnitId" = Option<Uuid>, Query, description = "Solo para administradores"),
        ("buildingId" = Option<Uuid>, Query, description = "Filtra por edificio")
    ),
    responses((status = 200, description = "Áreas", body = Vec<Area>)),
    security(("api_jwt" = []))
)]
pub async fn list_areas(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<EnergyStaff>,
    Query(filter): Query<AreaFilter>,
) -> Result<Json<Vec<Area>>, ApiError> {
    let areas = app_state
        .organization_service
        .list_areas(&guard.user, filter)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(areas))
}

#[utoipa::path(
    post,
    path = "/api/areas",
    tag = "Organization",
    request_body = AreaPayload,
    responses(
        (status = 201, description = "Área creada", body = Area),
        (status = 400, description = "El edificio no pertenece a la UR")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_area(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<Managers>,
    Json(payload): Json<AreaPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let area = app_state
        .organization_service
        .create_area(&guard.user, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok((StatusCode::CREATED, Json(area)))
}

pub async fn update_area(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<Managers>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AreaPayload>,
) -> Result<Json<Area>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let area = app_state
        .organization_service
        .update_area(&guard.user, id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(area))
}

pub async fn delete_area(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<Managers>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    app_state
        .organization_service
        .delete_area(&guard.user, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(StatusCode::NO_CONTENT)
}

// ---
// Selects en cascada (cualquier usuario autenticado)
// ---
// El administrador indica `orgUnitId`; el resto consulta su propia UR.

#[utoipa::path(
    get,
    path = "/api/lookups/buildings",
    tag = "Lookups",
    params(("orgUnitId" = Option<Uuid>, Query, description = "Obligatoria para administradores")),
    responses((status = 200, description = "Opciones de edificio", body = Vec<LookupOption>)),
    security(("api_jwt" = []))
)]
pub async fn building_options(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(filter): Query<UnitFilter>,
) -> Result<Json<Vec<LookupOption>>, ApiError> {
    let unit = user
        .resolve_org_unit(filter.org_unit_id)
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    let options = app_state
        .organization_service
        .building_options(unit)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(options))
}

#[utoipa::path(
    get,
    path = "/api/lookups/areas",
    tag = "Lookups",
    params(
        ("orgUnitId" = Option<Uuid>, Query, description = "Obligatoria para administradores"),
        ("buildingId" = Option<Uuid>, Query, description = "Edificio")
    ),
    responses((status = 200, description = "Opciones de área", body = Vec<LookupOption>)),
    security(("api_jwt" = []))
)]
pub async fn area_options(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(filter): Query<AreaFilter>,
) -> Result<Json<Vec<LookupOption>>, ApiError> {
    let unit = user
        .resolve_org_unit(filter.org_unit_id)
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    let filter = AreaFilter { org_unit_id: Some(unit), building_id: filter.building_id };
    let options = app_state
        .organization_service
        .area_options(&filter)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(options))
}

#[utoipa::path(
    get,
    path = "/api/lookups/substations",
    tag = "Lookups",
    params(("orgUnitId" = Option<Uuid>, Query, description = "Obligatoria para administradores")),
    responses((status = 200, description = "Opciones de subestación", body = Vec<LookupOption>)),
    security(("api_jwt" = []))
)]
pub async fn substation_options(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(filter): Query<UnitFilter>,
) -> Result<Json<Vec<LookupOption>>, ApiError> {
    let unit = user
        .resolve_org_unit(filter.org_unit_id)
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    let options = app_state
        .energy_service
        .substation_options(unit)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(options))
}
