pub mod messages;
pub mod pii;

pub use messages::{EventEnvelope, QueuedMessage};
pub use pii::Masked;
