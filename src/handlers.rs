pub mod auth;
pub mod dashboard;
pub mod documents;
pub mod energy;
pub mod environmental;
pub mod inventory;
pub mod invoices;
pub mod organization;
pub mod periods;
pub mod users;
