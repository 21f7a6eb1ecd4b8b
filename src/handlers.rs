pub mod auth;
pub mod users;
pub mod clients;
pub mod opportunities;
pub mod appointments;
pub mod dashboard;
pub mod trash;
