pub mod app_config;
pub mod booking_repo;
pub mod catalog_repo;
pub mod database;
pub mod events;
pub mod mailer;
pub mod memory;
pub mod queue;
pub mod user_repo;

pub use app_config::Config;
pub use database::DbClient;
pub use events::KafkaEventBus;
pub use mailer::SmtpMailer;
pub use queue::{KafkaIntakeQueue, DEDUP_TOKEN_HEADER};
