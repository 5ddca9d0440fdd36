//! User domain model and role→authority mapping.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role assigned to a user at registration.
///
/// External persons reuse [`Role::Employee`]; there is no separate
/// external role.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Role {
    Employee,
    Student,
    Guest,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Employee => "Employee",
            Role::Student => "Student",
            Role::Guest => "Guest",
        }
    }
}

/// Role→authority lookup table.
///
/// Injected into the account service at construction; purely a value
/// lookup with no side effects.
#[derive(Debug, Clone)]
pub struct RoleAuthorities {
    map: HashMap<Role, Vec<String>>,
}

impl RoleAuthorities {
    pub fn new(map: HashMap<Role, Vec<String>>) -> Self {
        Self { map }
    }

    /// Authorities granted to `role`. Roles absent from the table get
    /// none.
    pub fn authorities_for(&self, role: Role) -> Vec<String> {
        self.map.get(&role).cloned().unwrap_or_default()
    }
}

impl Default for RoleAuthorities {
    fn default() -> Self {
        let mut map = HashMap::new();
        map.insert(
            Role::Employee,
            vec!["user:read".to_string(), "user:update".to_string()],
        );
        map.insert(Role::Student, vec!["user:read".to_string()]);
        map.insert(Role::Guest, vec!["user:read".to_string()]);
        Self { map }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    /// Argon2id PHC-format hash.
    pub password_hash: String,
    /// Single pending one-time code, if any. Overwritten on each
    /// issuance, cleared on consumption.
    pub otp: Option<String>,
    pub locked: bool,
    pub active: bool,
    pub role: Role,
    pub authorities: Vec<String>,
    pub joined_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub username: String,
    /// Raw password (will be hashed with Argon2id before storage).
    pub password: String,
    /// Initial OTP issued at registration. New accounts start locked
    /// until this code is verified.
    pub otp: String,
    pub role: Role,
    pub authorities: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateUser {
    pub username: Option<String>,
    /// `Some(Some(code))` = set, `Some(None)` = clear, `None` = no change.
    pub otp: Option<Option<String>>,
    pub locked: Option<bool>,
    pub active: Option<bool>,
    pub last_login_at: Option<DateTime<Utc>>,
}

/// Mutation applied when a pending OTP is consumed.
///
/// Consumption is compare-and-clear: the repository clears the stored
/// code and applies the effect in a single conditional update, only if
/// the stored code equals the submitted one.
#[derive(Debug, Clone)]
pub enum OtpEffect {
    /// Clear the lockout flag (account-unlock flow).
    Unlock,
    /// Replace the password hash (password-recovery flow).
    SetPassword(String),
    /// Replace the username (username-recovery flow).
    Rename(String),
}
