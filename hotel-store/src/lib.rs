pub mod app_config;
pub mod database;
pub mod guest_repo;
pub mod reservation_repo;
pub mod room_repo;

pub use app_config::Config;
pub use database::DbClient;
pub use guest_repo::PgGuestRepository;
pub use reservation_repo::PgReservationRepository;
pub use room_repo::PgRoomRepository;
