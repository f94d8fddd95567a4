#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("payload is required")]
    EmptyPayload,

    #[error("invalid request payload: {0}")]
    MalformedPayload(String),

    /// The rejected candidate is carried for logging only.
    #[error("invalid booking status")]
    InvalidStatus(String),

    #[error("invalid booking event source [valid: CONFIRMED, CANCELLED]")]
    InvalidEventSource,

    #[error("the booking record you're trying to update is non-existent")]
    NotFound,

    #[error("this booking has been cancelled and cannot be re-confirmed")]
    IllegalReconfirmation,

    #[error("'cancelled' fields are not set in the payload")]
    CancellationDetailMissing,

    #[error("object has missing required properties: [{0}]")]
    MissingCancellationFields(String),

    #[error("unknown user account: {0}")]
    UnknownUser(String),

    #[error("unknown bus route: {0}")]
    UnknownRoute(String),

    #[error(transparent)]
    Collaborator(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl BookingError {
    /// Caller errors surface to the client as rejections; everything else
    /// stays internal and is retried by the delivery runtime.
    pub fn is_caller_error(&self) -> bool {
        !matches!(
            self,
            BookingError::UnknownUser(_)
                | BookingError::UnknownRoute(_)
                | BookingError::Collaborator(_)
        )
    }
}
