// src/routes.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{config::AppState, docs::ApiDoc, handlers, middleware::auth::auth_guard};

pub fn create_router(app_state: AppState) -> Router {
    // Rutas públicas
    let auth_routes = Router::new()
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/password-reset/request", post(handlers::auth::request_password_reset))
        .route("/api/auth/password-reset/confirm", post(handlers::auth::reset_password));

    // Perfil propio y selects en cascada
    let account_routes = Router::new()
        .route("/api/me", get(handlers::auth::get_me))
        .route("/api/me/password-change/request", post(handlers::auth::request_password_change))
        .route("/api/me/password-change/confirm", post(handlers::auth::confirm_password_change))
        .route("/api/lookups/buildings", get(handlers::organization::building_options))
        .route("/api/lookups/areas", get(handlers::organization::area_options))
        .route("/api/lookups/substations", get(handlers::organization::substation_options));

    let user_routes = Router::new()
        .route("/api/users", get(handlers::users::list_users).post(handlers::users::create_user))
        .route(
            "/api/users/{id}",
            get(handlers::users::get_user)
                .put(handlers::users::update_user)
                .delete(handlers::users::delete_user),
        )
        .route("/api/users/{id}/deactivate", post(handlers::users::deactivate_user))
        .route("/api/users/{id}/reactivate", post(handlers::users::reactivate_user))
        .route("/api/clerks", get(handlers::users::list_clerks).post(handlers::users::create_clerk))
        .route(
            "/api/clerks/{id}",
            put(handlers::users::update_clerk).delete(handlers::users::delete_clerk),
        );

    let organization_routes = Router::new()
        .route(
            "/api/campuses",
            get(handlers::organization::list_campuses).post(handlers::organization::create_campus),
        )
        .route(
            "/api/campuses/{id}",
            get(handlers::organization::get_campus)
                .put(handlers::organization::update_campus)
                .delete(handlers::organization::delete_campus),
        )
        .route(
            "/api/org-units",
            get(handlers::organization::list_org_units).post(handlers::organization::create_org_unit),
        )
        .route(
            "/api/org-units/{id}",
            get(handlers::organization::get_org_unit)
                .put(handlers::organization::update_org_unit)
                .delete(handlers::organization::delete_org_unit),
        )
        .route(
            "/api/buildings",
            get(handlers::organization::list_buildings).post(handlers::organization::create_building),
        )
        .route(
            "/api/buildings/{id}",
            put(handlers::organization::update_building).delete(handlers::organization::delete_building),
        )
        .route(
            "/api/areas",
            get(handlers::organization::list_areas).post(handlers::organization::create_area),
        )
        .route(
            "/api/areas/{id}",
            put(handlers::organization::update_area).delete(handlers::organization::delete_area),
        );

    let energy_routes = Router::new()
        .route(
            "/api/substations",
            get(handlers::energy::list_substations).post(handlers::energy::create_substation),
        )
        .route(
            "/api/substations/{id}",
            get(handlers::energy::get_substation)
                .put(handlers::energy::update_substation)
                .delete(handlers::energy::delete_substation),
        )
        .route("/api/tariffs", get(handlers::energy::list_tariffs).post(handlers::energy::create_tariff))
        .route(
            "/api/tariffs/{id}",
            get(handlers::energy::get_tariff)
                .put(handlers::energy::update_tariff)
                .delete(handlers::energy::delete_tariff),
        )
        .route("/api/meters", get(handlers::energy::list_meters).post(handlers::energy::create_meter))
        .route(
            "/api/meters/{id}",
            get(handlers::energy::get_meter)
                .put(handlers::energy::update_meter)
                .delete(handlers::energy::delete_meter),
        )
        .route(
            "/api/invoices",
            get(handlers::invoices::list_invoices).post(handlers::invoices::create_invoice),
        )
        .route("/api/invoices/years", get(handlers::invoices::invoice_years))
        .route("/api/invoices/export/{group}", get(handlers::documents::export_invoices))
        .route(
            "/api/invoices/{id}",
            get(handlers::invoices::get_invoice)
                .put(handlers::invoices::update_invoice)
                .delete(handlers::invoices::delete_invoice),
        )
        .route("/api/invoices/{id}/pdf", get(handlers::documents::invoice_pdf));

    let inventory_routes = Router::new()
        .route("/api/periods", get(handlers::periods::list_periods).post(handlers::periods::create_period))
        .route("/api/periods/active", get(handlers::periods::active_period))
        .route(
            "/api/periods/{id}",
            get(handlers::periods::get_period)
                .put(handlers::periods::update_period)
                .delete(handlers::periods::delete_period),
        )
        .route(
            "/api/inventory",
            get(handlers::inventory::list_inventory).post(handlers::inventory::create_inventory),
        )
        .route("/api/inventory/export/{kind}", get(handlers::documents::export_inventory))
        .route(
            "/api/inventory/{id}",
            get(handlers::inventory::get_inventory)
                .put(handlers::inventory::update_inventory)
                .delete(handlers::inventory::delete_inventory),
        )
        .route("/api/inventory/{id}/deactivate", post(handlers::inventory::deactivate_inventory))
        .route("/api/inventory/{id}/reactivate", post(handlers::inventory::reactivate_inventory));

    let environmental_routes = Router::new()
        .route(
            "/api/environmental/{kind}",
            get(handlers::environmental::list_records).post(handlers::environmental::create_record),
        )
        .route(
            "/api/environmental/{kind}/{id}",
            get(handlers::environmental::get_record)
                .put(handlers::environmental::update_record)
                .delete(handlers::environmental::delete_record),
        );

    let dashboard_routes = Router::new()
        .route("/api/dashboard/admin", get(handlers::dashboard::admin_dashboard))
        .route("/api/dashboard/environmental", get(handlers::dashboard::environmental_dashboard))
        .route("/api/dashboard/manager", get(handlers::dashboard::manager_dashboard))
        .route("/api/dashboard/clerk", get(handlers::dashboard::clerk_dashboard));

    // Todo lo protegido pasa por el guardián JWT; cada handler exige además su rol.
    let protected_routes = Router::new()
        .merge(account_routes)
        .merge(user_routes)
        .merge(organization_routes)
        .merge(energy_routes)
        .merge(inventory_routes)
        .merge(environmental_routes)
        .merge(dashboard_routes)
        .route_layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .merge(auth_routes)
        .merge(protected_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
