/// Account management
///
/// Handles account creation, password hashing and credential checks, and
/// builds the `user` object returned by authenticate and refresh.

mod manager;

pub use manager::AccountManager;

use crate::db::models::Account;
use serde::{Deserialize, Serialize};

/// Name/value pair used by user objects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    pub value: String,
}

/// User object, as returned with `"requestUser": true`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserObject {
    pub username: String,
    pub id: String,
    pub properties: Vec<Property>,
}

impl From<&Account> for UserObject {
    fn from(account: &Account) -> Self {
        UserObject {
            username: account.email.clone(),
            id: account.id.to_string(),
            properties: vec![
                Property {
                    name: "preferredLanguage".to_string(),
                    value: account.language.clone(),
                },
                Property {
                    name: "registrationCountry".to_string(),
                    value: account.country.clone(),
                },
            ],
        }
    }
}
