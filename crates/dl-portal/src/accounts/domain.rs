use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::registry::domain::NationalId;

/// A stored portal account. The password hash never leaves this type except
/// through the repository; API responses use [`AccountView`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub national_id: NationalId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub date_joined: DateTime<Utc>,
}

impl Account {
    pub fn view(&self) -> AccountView {
        AccountView {
            national_id: self.national_id.clone(),
            email: self.email.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            is_active: self.is_active,
            is_staff: self.is_staff,
            date_joined: self.date_joined,
        }
    }
}

/// Sanitized account representation for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct AccountView {
    pub national_id: NationalId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub date_joined: DateTime<Utc>,
}

/// Input for account creation.
#[derive(Debug, Clone, Deserialize)]
pub struct Registration {
    pub national_id: NationalId,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}
