pub mod app_config;
pub mod booking_repo;
pub mod database;
pub mod memory;
pub mod registry_client;

pub use booking_repo::PgBookingRepository;
pub use database::DbClient;
pub use memory::InMemoryBookingRepository;
pub use registry_client::HttpLaunchRegistry;
