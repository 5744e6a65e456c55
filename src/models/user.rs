use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::OnceLock;

use crate::constants::ADMIN_ROLE;

/// Per-user news preferences
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub languages: Vec<String>,
}

impl Preferences {
    /// Build preferences from an untyped request body.
    ///
    /// Non-array values become empty lists; non-string elements and
    /// duplicates are dropped.
    pub fn from_values(categories: &Value, languages: &Value) -> Self {
        Self {
            categories: string_set(categories),
            languages: string_set(languages),
        }
    }
}

fn string_set(value: &Value) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    if let Some(items) = value.as_array() {
        for item in items.iter().filter_map(Value::as_str) {
            if !out.iter().any(|existing| existing == item) {
                out.push(item.to_string());
            }
        }
    }
    out
}

/// User record stored in the users file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub username: String,
    /// Salted password hash, never returned by the API
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub preferences: Preferences,
    #[serde(default)]
    pub read: Vec<String>,
    #[serde(default)]
    pub favorites: Vec<String>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role.as_deref() == Some(ADMIN_ROLE)
    }

    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            username: self.username.clone(),
            preferences: self.preferences.clone(),
            read: self.read.clone(),
            favorites: self.favorites.clone(),
        }
    }

    /// Validate that a username looks like an email address
    ///
    /// Accepts `local@domain.tld`: no whitespace, exactly one `@`, and some
    /// dot inside the domain with non-empty text on both sides.
    pub fn validate_username(username: &str) -> bool {
        email_pattern().is_some_and(|re| re.is_match(username))
    }
}

fn email_pattern() -> Option<&'static Regex> {
    static EMAIL: OnceLock<Option<Regex>> = OnceLock::new();
    EMAIL
        .get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok())
        .as_ref()
}

/// Public view of a user, without credentials
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: u64,
    pub username: String,
    pub preferences: Preferences,
    pub read: Vec<String>,
    pub favorites: Vec<String>,
}

/// On-disk layout of the users file: `{ "users": [...] }`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserSnapshot {
    #[serde(default)]
    pub users: Vec<User>,
}
