use crate::model::User;
use async_trait::async_trait;

/// Record store for user accounts, keyed by id with a unique username.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Writes the account, replacing an existing record with the same id.
    async fn put(&self, user: &User) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    async fn get(
        &self,
        id: &str,
        username: &str,
    ) -> Result<Option<User>, Box<dyn std::error::Error + Send + Sync>>;

    async fn get_by_id(
        &self,
        id: &str,
    ) -> Result<Option<User>, Box<dyn std::error::Error + Send + Sync>>;

    async fn username_taken(
        &self,
        username: &str,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;

    /// Looks an account up by exact credential match.
    async fn with_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, Box<dyn std::error::Error + Send + Sync>>;

    async fn record_login(
        &self,
        id: &str,
        username: &str,
        last_login: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
