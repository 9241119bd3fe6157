pub mod auth;
pub use auth::AuthService;
pub mod user_service;
pub use user_service::UserService;
pub mod organization_service;
pub use organization_service::OrganizationService;
pub mod energy_service;
pub use energy_service::EnergyService;
pub mod period_service;
pub use period_service::PeriodService;
pub mod inventory_service;
pub use inventory_service::InventoryService;
pub mod environmental_service;
pub use environmental_service::EnvironmentalService;
pub mod dashboard_service;
pub use dashboard_service::DashboardService;
pub mod export_service;
pub use export_service::ExportService;
pub mod document_service;
pub use document_service::DocumentService;
pub mod mailer;
pub mod notifications;
