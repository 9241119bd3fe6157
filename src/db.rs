pub mod user_repo;
pub use user_repo::UserRepository;
pub mod organization_repo;
pub use organization_repo::OrganizationRepository;
pub mod energy_repo;
pub use energy_repo::EnergyRepository;
pub mod period_repo;
pub use period_repo::PeriodRepository;
pub mod inventory_repo;
pub use inventory_repo::InventoryRepository;
pub mod environmental_repo;
pub use environmental_repo::EnvironmentalRepository;
pub mod dashboard_repo;
pub use dashboard_repo::DashboardRepository;
