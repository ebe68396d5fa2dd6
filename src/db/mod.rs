pub mod booking_repo;
pub use booking_repo::BookingRepository;
pub mod schedule_repo;
pub use schedule_repo::ScheduleRepository;
pub mod payment_repo;
pub use payment_repo::PaymentRepository;
pub mod catalog_repo;
pub use catalog_repo::CatalogRepository;
