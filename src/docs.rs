// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::login,
        handlers::auth::request_password_reset,
        handlers::auth::reset_password,
        handlers::auth::get_me,
        handlers::auth::request_password_change,
        handlers::auth::confirm_password_change,

        // --- Users ---
        handlers::users::list_users,
        handlers::users::create_user,
        handlers::users::list_clerks,
        handlers::users::create_clerk,

        // --- Organization ---
        handlers::organization::list_campuses,
        handlers::organization::create_campus,
        handlers::organization::list_org_units,
        handlers::organization::create_org_unit,
        handlers::organization::list_buildings,
        handlers::organization::create_building,
        handlers::organization::list_areas,
        handlers::organization::create_area,
        handlers::organization::building_options,
        handlers::organization::area_options,
        handlers::organization::substation_options,

        // --- Energy ---
        handlers::energy::list_substations,
        handlers::energy::create_substation,
        handlers::energy::list_tariffs,
        handlers::energy::list_meters,

        // --- Invoices ---
        handlers::invoices::list_invoices,
        handlers::invoices::invoice_years,
        handlers::invoices::get_invoice,
        handlers::invoices::create_invoice,
        handlers::invoices::update_invoice,

        // --- Periods ---
        handlers::periods::list_periods,
        handlers::periods::active_period,
        handlers::periods::create_period,
        handlers::periods::update_period,
        handlers::periods::delete_period,

        // --- Inventory ---
        handlers::inventory::list_inventory,
        handlers::inventory::create_inventory,
        handlers::inventory::update_inventory,

        // --- Environmental ---
        handlers::environmental::list_records,
        handlers::environmental::create_record,

        // --- Documents ---
        handlers::documents::invoice_pdf,
        handlers::documents::export_invoices,
        handlers::documents::export_inventory,

        // --- Dashboard ---
        handlers::dashboard::admin_dashboard,
        handlers::dashboard::environmental_dashboard,
        handlers::dashboard::manager_dashboard,
        handlers::dashboard::clerk_dashboard,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::UserRole,
            models::auth::User,
            models::auth::LoginPayload,
            models::auth::AuthResponse,
            models::auth::MeResponse,
            models::auth::PasswordChangeRequestPayload,
            models::auth::PasswordChangeConfirmPayload,
            models::auth::PasswordResetRequestPayload,
            models::auth::PasswordResetConfirmPayload,
            models::auth::UserPayload,
            models::auth::ClerkPayload,

            // --- Organization ---
            models::organization::Campus,
            models::organization::CampusPayload,
            models::organization::OrgUnit,
            models::organization::OrgUnitPayload,
            models::organization::Building,
            models::organization::BuildingPayload,
            models::organization::Area,
            models::organization::AreaPayload,
            models::organization::LookupOption,

            // --- Energy ---
            models::energy::TariffCode,
            models::energy::TariffGroup,
            models::energy::InvoiceStatus,
            models::energy::Substation,
            models::energy::SubstationPayload,
            models::energy::Tariff,
            models::energy::TariffPayload,
            models::energy::Meter,
            models::energy::MeterPayload,
            models::energy::Invoice,
            models::energy::InvoiceView,
            models::energy::InvoicePayload,

            // --- Inventory ---
            models::inventory::PeriodStatus,
            models::inventory::InventoryPeriod,
            models::inventory::PeriodPayload,
            models::inventory::InventoryKind,
            models::inventory::FloorLevel,
            models::inventory::HvacDetails,
            models::inventory::LightingDetails,
            models::inventory::MiscDetails,
            models::inventory::InventoryDetails,
            models::inventory::InventoryRecord,
            models::inventory::InventoryRecordView,
            models::inventory::InventoryPayload,
            models::inventory::InventoryTotals,
            models::inventory::InventoryListResponse,

            // --- Environmental ---
            models::environmental::EnvironmentalKind,
            models::environmental::MonthlyLogDetails,
            models::environmental::TemporaryStorageDetails,
            models::environmental::RpbiGenerationDetails,
            models::environmental::RpbiCollectionDetails,
            models::environmental::RmeCollectionDetails,
            models::environmental::LandfillDetails,
            models::environmental::RrrCollectionDetails,
            models::environmental::EnvironmentalDetails,
            models::environmental::EnvironmentalRecord,
            models::environmental::EnvironmentalRecordView,
            models::environmental::EnvironmentalPayload,

            // --- Dashboard ---
            models::dashboard::AdminDashboard,
            models::dashboard::EnvironmentalKindCount,
            models::dashboard::EnvironmentalDashboard,
            models::dashboard::ManagerDashboard,
            models::dashboard::ClerkDashboard,
        )
    ),
    tags(
        (name = "Auth", description = "Sesión, perfil y recuperación de contraseña"),
        (name = "Users", description = "Usuarios y capturistas"),
        (name = "Organization", description = "Campus, unidades responsables, edificios y áreas"),
        (name = "Lookups", description = "Opciones para selects en cascada"),
        (name = "Energy", description = "Subestaciones, tarifas y medidores"),
        (name = "Invoices", description = "Facturas CFE"),
        (name = "Periods", description = "Periodos de inventario"),
        (name = "Inventory", description = "Inventario de equipos consumidores de energía"),
        (name = "Environmental", description = "Bitácoras ambientales"),
        (name = "Documents", description = "Exportaciones a Excel y fichas PDF"),
        (name = "Dashboard", description = "Tableros por rol")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme("api_jwt", SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_protected_and_public_paths() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/auth/login"));
        assert!(doc.paths.paths.contains_key("/api/invoices/{id}/pdf"));
        assert!(doc.paths.paths.contains_key("/api/environmental/{kind}"));
    }
}
