use async_trait::async_trait;
use sqlx::PgPool;

use rutero_accounts::repository::UserStore;
use rutero_accounts::{User, UserType};
use rutero_shared::Masked;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Account records in Postgres, keyed by (id, username).
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal structs for type-safe querying
#[derive(sqlx::FromRow)]
struct UserRow {
    id: String,
    user_type: String,
    first_name: String,
    last_name: String,
    username: String,
    password: String,
    address: String,
    email: String,
    mobile_number: String,
    date_created: String,
    last_login: String,
}

impl UserRow {
    fn into_domain(self) -> Result<User, BoxError> {
        Ok(User {
            id: self.id,
            user_type: UserType::from_label(&self.user_type).ok_or("unknown account type")?,
            first_name: self.first_name,
            last_name: self.last_name,
            username: self.username,
            password: Masked(self.password),
            address: self.address,
            email: self.email,
            mobile_number: self.mobile_number,
            date_created: self.date_created,
            last_login: self.last_login,
        })
    }
}

const USER_COLUMNS: &str = "id, user_type, first_name, last_name, username, password, address, email, mobile_number, date_created, last_login";

#[async_trait]
impl UserStore for PgUserStore {
    async fn put(&self, user: &User) -> Result<(), BoxError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, user_type, first_name, last_name, username, password, address, email, mobile_number, date_created, last_login)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (id) DO UPDATE SET
                first_name = EXCLUDED.first_name,
                last_name = EXCLUDED.last_name,
                address = EXCLUDED.address,
                email = EXCLUDED.email,
                mobile_number = EXCLUDED.mobile_number,
                last_login = EXCLUDED.last_login
            "#,
        )
        .bind(&user.id)
        .bind(user.user_type.label())
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.username)
        .bind(user.password.inner())
        .bind(&user.address)
        .bind(&user.email)
        .bind(&user.mobile_number)
        .bind(&user.date_created)
        .bind(&user.last_login)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, id: &str, username: &str) -> Result<Option<User>, BoxError> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1 AND username = $2"
        ))
        .bind(id)
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserRow::into_domain).transpose()
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<User>, BoxError> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(UserRow::into_domain).transpose()
    }

    async fn username_taken(&self, username: &str) -> Result<bool, BoxError> {
        let found: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
                .bind(username)
                .fetch_one(&self.pool)
                .await?;

        Ok(found)
    }

    async fn with_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, BoxError> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1 AND password = $2"
        ))
        .bind(username)
        .bind(password)
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserRow::into_domain).transpose()
    }

    async fn record_login(&self, id: &str, username: &str, last_login: &str) -> Result<(), BoxError> {
        sqlx::query("UPDATE users SET last_login = $3 WHERE id = $1 AND username = $2")
            .bind(id)
            .bind(username)
            .bind(last_login)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
