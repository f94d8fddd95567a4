pub mod identity;
pub mod ports;

pub use ports::{DeliveryQueue, EventBus, Mailer};
