pub mod auth;
pub mod scope;
pub mod lifecycle;
pub mod clients;
pub mod opportunities;
pub mod appointments;
pub mod dashboard;
pub mod notifications;
pub mod documents;
pub mod scheduler;
