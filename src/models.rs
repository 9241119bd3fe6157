pub mod auth;
pub mod organization;
pub mod energy;
pub mod inventory;
pub mod environmental;
pub mod dashboard;
