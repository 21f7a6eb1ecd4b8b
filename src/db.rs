pub mod user_repo;
pub use user_repo::UserRepository;
pub mod client_repo;
pub use client_repo::ClientRepository;
pub mod opportunity_repo;
pub use opportunity_repo::OpportunityRepository;
pub mod appointment_repo;
pub use appointment_repo::AppointmentRepository;
pub mod dashboard_repo;
pub use dashboard_repo::DashboardRepository;
