pub mod error;
pub mod model;
pub mod repository;
pub mod service;

pub use error::AccountError;
pub use model::{is_staff_actor, Credentials, ProfileChange, Registration, User, UserType};
pub use repository::UserStore;
pub use service::AccountService;
