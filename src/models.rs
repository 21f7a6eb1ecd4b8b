pub mod auth;
pub mod clients;
pub mod opportunities;
pub mod appointments;
pub mod dashboard;
