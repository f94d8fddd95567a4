use std::sync::Arc;

use chrono::Utc;
use rutero_core::identity;
use tracing::info;

use crate::error::AccountError;
use crate::model::{Credentials, ProfileChange, Registration, User, UserType, LAST_LOGIN_FORMAT};
use crate::repository::UserStore;

/// Account registration, login, and profile maintenance.
pub struct AccountService {
    users: Arc<dyn UserStore>,
}

impl AccountService {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    /// Registers an account. The id derives from the account type code and
    /// the creation stamp, e.g. `CSTMR-854980`.
    pub async fn register(&self, registration: Registration) -> Result<User, AccountError> {
        validate_registration(&registration)?;

        let kind = UserType::from_code(&registration.user_type)
            .ok_or_else(|| AccountError::InvalidUserType(registration.user_type.clone()))?;

        if self.users.username_taken(&registration.username).await? {
            return Err(AccountError::DuplicateUsername(registration.username));
        }

        let date_created = identity::epoch_stamp();
        let user = User {
            id: format!("{}-{}", kind.id_code(), identity::stamp_digits(&date_created)),
            user_type: kind,
            first_name: registration.first_name,
            last_name: registration.last_name,
            username: registration.username,
            password: registration.password,
            address: registration.address,
            email: registration.email,
            mobile_number: registration.mobile_number,
            date_created,
            last_login: String::new(),
        };

        self.users.put(&user).await?;
        info!(id = %user.id, "registered account");

        Ok(user)
    }

    /// Checks the credentials and stamps the session. The rejection message
    /// never says which half of the pair was wrong.
    pub async fn login(&self, credentials: Credentials) -> Result<User, AccountError> {
        validate_credentials(&credentials)?;

        let account = self
            .users
            .with_credentials(&credentials.username, credentials.password.inner())
            .await?
            .ok_or(AccountError::IncorrectCredentials)?;

        let last_login = Utc::now().format(LAST_LOGIN_FORMAT).to_string();
        self.users
            .record_login(&account.id, &account.username, &last_login)
            .await?;

        Ok(User { last_login, ..account })
    }

    pub async fn find(&self, id: &str, username: &str) -> Result<Option<User>, AccountError> {
        Ok(self.users.get(id, username).await?)
    }

    /// Applies non-blank profile fields onto the stored account.
    pub async fn update(
        &self,
        id: &str,
        username: &str,
        change: ProfileChange,
    ) -> Result<User, AccountError> {
        let old = self
            .users
            .get(id, username)
            .await?
            .ok_or(AccountError::NotFound)?;

        let merged = merge_profile(change, old);
        self.users.put(&merged).await?;

        Ok(merged)
    }
}

fn validate_registration(registration: &Registration) -> Result<(), AccountError> {
    let mut fields = Vec::new();

    if registration.user_type.is_empty() {
        fields.push("user_type");
    }
    if registration.first_name.is_empty() {
        fields.push("first_name");
    }
    if registration.last_name.is_empty() {
        fields.push("last_name");
    }
    if registration.username.is_empty() {
        fields.push("username");
    }
    if registration.password.inner().is_empty() {
        fields.push("password");
    }
    if registration.address.is_empty() {
        fields.push("address");
    }
    if registration.email.is_empty() {
        fields.push("email");
    }
    if registration.mobile_number.is_empty() {
        fields.push("mobile_number");
    }

    if !fields.is_empty() {
        return Err(AccountError::MissingFields(fields.join(", ")));
    }

    Ok(())
}

fn validate_credentials(credentials: &Credentials) -> Result<(), AccountError> {
    let mut fields = Vec::new();

    if credentials.username.is_empty() {
        fields.push("username");
    }
    if credentials.password.inner().is_empty() {
        fields.push("password");
    }

    if !fields.is_empty() {
        return Err(AccountError::MissingFields(fields.join(", ")));
    }

    Ok(())
}

fn merge_profile(change: ProfileChange, mut user: User) -> User {
    if !change.first_name.is_empty() {
        user.first_name = change.first_name;
    }
    if !change.last_name.is_empty() {
        user.last_name = change.last_name;
    }
    if !change.address.is_empty() {
        user.address = change.address;
    }
    if !change.email.is_empty() {
        user.email = change.email;
    }
    if !change.mobile_number.is_empty() {
        user.mobile_number = change.mobile_number;
    }

    user
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use rutero_shared::Masked;
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct FakeUserStore {
        users: Mutex<HashMap<String, User>>,
    }

    impl FakeUserStore {
        fn new() -> Self {
            Self {
                users: Mutex::new(HashMap::new()),
            }
        }
    }

    #[async_trait]
    impl UserStore for FakeUserStore {
        async fn put(&self, user: &User) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
            self.users
                .lock()
                .unwrap()
                .insert(user.id.clone(), user.clone());
            Ok(())
        }

        async fn get(
            &self,
            id: &str,
            username: &str,
        ) -> Result<Option<User>, Box<dyn std::error::Error + Send + Sync>> {
            Ok(self
                .users
                .lock()
                .unwrap()
                .get(id)
                .filter(|u| u.username == username)
                .cloned())
        }

        async fn get_by_id(
            &self,
            id: &str,
        ) -> Result<Option<User>, Box<dyn std::error::Error + Send + Sync>> {
            Ok(self.users.lock().unwrap().get(id).cloned())
        }

        async fn username_taken(
            &self,
            username: &str,
        ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
            Ok(self
                .users
                .lock()
                .unwrap()
                .values()
                .any(|u| u.username == username))
        }

        async fn with_credentials(
            &self,
            username: &str,
            password: &str,
        ) -> Result<Option<User>, Box<dyn std::error::Error + Send + Sync>> {
            Ok(self
                .users
                .lock()
                .unwrap()
                .values()
                .find(|u| u.username == username && u.password.inner() == password)
                .cloned())
        }

        async fn record_login(
            &self,
            id: &str,
            _username: &str,
            last_login: &str,
        ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
            if let Some(user) = self.users.lock().unwrap().get_mut(id) {
                user.last_login = last_login.to_string();
            }
            Ok(())
        }
    }

    fn registration() -> Registration {
        Registration {
            user_type: "2".into(),
            first_name: "John".into(),
            last_name: "Doe".into(),
            username: "j.doe".into(),
            password: Masked("j.doe1234".into()),
            address: "South Calorina".into(),
            email: "j.doe@outlook.com".into(),
            mobile_number: "11223344556".into(),
        }
    }

    #[tokio::test]
    async fn register_derives_a_coded_id() {
        let service = AccountService::new(Arc::new(FakeUserStore::new()));

        let user = service.register(registration()).await.unwrap();

        assert!(user.id.starts_with("CSTMR-"));
        assert_eq!(user.user_type, UserType::Customer);
        assert!(!user.date_created.is_empty());
    }

    #[tokio::test]
    async fn register_rejects_missing_fields_by_name() {
        let service = AccountService::new(Arc::new(FakeUserStore::new()));
        let registration = Registration {
            first_name: String::new(),
            email: String::new(),
            ..registration()
        };

        let err = service.register(registration).await.unwrap_err();

        assert_eq!(err.to_string(), "missing first_name, email field(s)");
    }

    #[tokio::test]
    async fn register_rejects_duplicate_username() {
        let service = AccountService::new(Arc::new(FakeUserStore::new()));
        service.register(registration()).await.unwrap();

        let err = service.register(registration()).await.unwrap_err();

        assert_eq!(err.to_string(), "j.doe username already exist");
    }

    #[tokio::test]
    async fn login_rejects_wrong_credentials_without_detail() {
        let service = AccountService::new(Arc::new(FakeUserStore::new()));
        service.register(registration()).await.unwrap();

        let err = service
            .login(Credentials {
                username: "j.doe".into(),
                password: Masked("wrong".into()),
            })
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "the username or password you entered is incorrect"
        );
    }

    #[tokio::test]
    async fn login_stamps_the_session() {
        let store = Arc::new(FakeUserStore::new());
        let service = AccountService::new(store.clone());
        let user = service.register(registration()).await.unwrap();

        let logged_in = service
            .login(Credentials {
                username: "j.doe".into(),
                password: Masked("j.doe1234".into()),
            })
            .await
            .unwrap();

        assert!(!logged_in.last_login.is_empty());
        let stored = store.get_by_id(&user.id).await.unwrap().unwrap();
        assert_eq!(stored.last_login, logged_in.last_login);
    }

    #[tokio::test]
    async fn update_keeps_stored_values_for_blank_fields() {
        let service = AccountService::new(Arc::new(FakeUserStore::new()));
        let user = service.register(registration()).await.unwrap();

        let updated = service
            .update(
                &user.id,
                &user.username,
                ProfileChange {
                    address: "North Dakota".into(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.address, "North Dakota");
        assert_eq!(updated.first_name, "John");
        assert_eq!(updated.email, "j.doe@outlook.com");
    }
}
