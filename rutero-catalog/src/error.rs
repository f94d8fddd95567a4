#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("{0}")]
    Validation(String),

    #[error("{0} bus line from {1} company already exist")]
    DuplicateLine(String, String),

    #[error("already existing bus unit")]
    DuplicateUnit,

    #[error("already existing bus route")]
    DuplicateRoute,

    #[error("the bus line record you're trying to update is non-existent")]
    LineNotFound,

    #[error("the bus unit you're trying to update is non-existent")]
    UnitNotFound,

    #[error("the bus route you're trying to update is non-existent")]
    RouteNotFound,

    #[error(transparent)]
    Store(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl CatalogError {
    /// Caller errors surface to the client; store errors stay internal.
    pub fn is_caller_error(&self) -> bool {
        !matches!(self, CatalogError::Store(_))
    }
}
