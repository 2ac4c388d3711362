pub mod app_config;
pub mod booking_repo;
pub mod database;
pub mod memory;
pub mod summary_repo;
pub mod user_repo;

pub use booking_repo::PgBookingRepository;
pub use database::DbClient;
pub use memory::MemoryStore;
pub use summary_repo::PgSummaryRepository;
pub use user_repo::PgUserRepository;
