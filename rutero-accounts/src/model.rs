use rutero_shared::Masked;
use serde::{Deserialize, Serialize};

/// Id prefix carried by staff accounts.
pub const STAFF_ID_CODE: &str = "ADMN";

/// Format of the `last_login` stamp, e.g. `02 Jan 2006 15:04:05`.
pub const LAST_LOGIN_FORMAT: &str = "%d %b %Y %H:%M:%S";

/// Account classification; the numeric codes are what registration
/// payloads carry, the id codes prefix the derived account id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserType {
    Admin,
    Customer,
}

impl UserType {
    /// Accepts the numeric account code used by registration payloads.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "1" => Some(Self::Admin),
            "2" => Some(Self::Customer),
            _ => None,
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "ADMIN" => Some(Self::Admin),
            "CUSTOMER" => Some(Self::Customer),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Customer => "CUSTOMER",
        }
    }

    pub fn id_code(&self) -> &'static str {
        match self {
            Self::Admin => STAFF_ID_CODE,
            Self::Customer => "CSTMR",
        }
    }
}

/// Whether an actor id belongs to a staff account. Cancellation notices
/// pick their wording by this test.
pub fn is_staff_actor(account_id: &str) -> bool {
    account_id.starts_with(STAFF_ID_CODE)
}

/// A registered account. The password never serializes; profile responses
/// and logs both stay clean of it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub user_type: UserType,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    #[serde(skip_serializing, default)]
    pub password: Masked<String>,
    pub address: String,
    pub email: String,
    pub mobile_number: String,
    #[serde(default)]
    pub date_created: String,
    #[serde(default)]
    pub last_login: String,
}

/// Registration payload; `user_type` arrives as the numeric account code
/// (`"1"` staff, `"2"` customer).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Registration {
    #[serde(default)]
    pub user_type: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: Masked<String>,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub mobile_number: String,
}

/// Login payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: Masked<String>,
}

/// Profile update; blank fields keep their stored values. The username,
/// account type and id never change.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileChange {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub mobile_number: String,
}
