pub mod cancelled;
pub mod confirmed;
pub mod error;
pub mod intake;
pub mod models;
pub mod notice;
pub mod repository;
pub mod status;
pub mod transition;
pub mod worker;

pub use cancelled::CancellationHandler;
pub use confirmed::ConfirmationHandler;
pub use error::BookingError;
pub use intake::{IntakeValidator, BOOKING_GROUP_ID};
pub use models::{
    Booking, BookingDraft, BookingFilter, BookingKey, BookingUpdate, CancellationDetail,
    CancellationRecord, StatusChange,
};
pub use repository::{BookingStore, CancellationStore};
pub use status::{BookingStatus, EventSource};
pub use transition::TransitionValidator;
pub use worker::BookingWorker;
