// src/handlers/dashboard.rs

use axum::{extract::State, Json};

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{
        i18n::Locale,
        rbac::{Admins, Clerks, DashboardViewers, Managers, RequireRole},
    },
    models::dashboard::{AdminDashboard, ClerkDashboard, EnvironmentalDashboard, ManagerDashboard},
};

// GET /api/dashboard/admin
#[utoipa::path(
    get,
    path = "/api/dashboard/admin",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Conteos generales y últimos periodos", body = AdminDashboard),
        (status = 401, description = "No autenticado"),
        (status = 403, description = "Rol sin acceso al tablero")
    ),
    security(("api_jwt" = []))
)]
pub async fn admin_dashboard(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<DashboardViewers>,
) -> Result<Json<AdminDashboard>, ApiError> {
    let dashboard = app_state
        .dashboard_service
        .admin()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(dashboard))
}

// GET /api/dashboard/environmental
#[utoipa::path(
    get,
    path = "/api/dashboard/environmental",
    tag = "Dashboard",
    responses((status = 200, description = "Registros por tipo de bitácora", body = EnvironmentalDashboard)),
    security(("api_jwt" = []))
)]
pub async fn environmental_dashboard(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<Admins>,
) -> Result<Json<EnvironmentalDashboard>, ApiError> {
    let dashboard = app_state
        .dashboard_service
        .environmental()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(dashboard))
}

// GET /api/dashboard/manager
#[utoipa::path(
    get,
    path = "/api/dashboard/manager",
    tag = "Dashboard",
    responses((status = 200, description = "Periodo vigente y tarifas de la UR", body = ManagerDashboard)),
    security(("api_jwt" = []))
)]
pub async fn manager_dashboard(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<Managers>,
) -> Result<Json<ManagerDashboard>, ApiError> {
    let dashboard = app_state
        .dashboard_service
        .manager(&guard.user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(dashboard))
}

// GET /api/dashboard/clerk
#[utoipa::path(
    get,
    path = "/api/dashboard/clerk",
    tag = "Dashboard",
    responses((status = 200, description = "Periodo vigente y capturas propias", body = ClerkDashboard)),
    security(("api_jwt" = []))
)]
pub async fn clerk_dashboard(
    State(app_state): State<AppState>,
    locale: Locale,
    guard: RequireRole<Clerks>,
) -> Result<Json<ClerkDashboard>, ApiError> {
    let dashboard = app_state
        .dashboard_service
        .clerk(&guard.user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(dashboard))
}
