#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("missing {0} field(s)")]
    MissingFields(String),

    #[error("invalid user_type value: {0}")]
    InvalidUserType(String),

    #[error("{0} username already exist")]
    DuplicateUsername(String),

    #[error("the account you're trying to update is non-existent")]
    NotFound,

    #[error("the username or password you entered is incorrect")]
    IncorrectCredentials,

    #[error(transparent)]
    Store(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl AccountError {
    /// Caller errors surface to the client; store errors stay internal.
    pub fn is_caller_error(&self) -> bool {
        !matches!(self, AccountError::Store(_))
    }
}
