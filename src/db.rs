pub mod user_repo;
pub use user_repo::UserRepository;
pub mod profile_repo;
pub use profile_repo::ProfileRepository;
pub mod appointment_repo;
pub use appointment_repo::AppointmentRepository;
pub mod billing_repo;
pub use billing_repo::BillingRepository;
pub mod notification_repo;
pub use notification_repo::NotificationRepository;
