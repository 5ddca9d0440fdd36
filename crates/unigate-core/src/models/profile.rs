//! Person-profile domain model.
//!
//! The four person types (employee, student, external, guest) are
//! variants of a single polymorphic record. A profile owns at most one
//! user; the link is set once, at successful registration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::user::Role;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ProfileKind {
    Employee,
    Student,
    External,
    Guest,
}

impl ProfileKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileKind::Employee => "Employee",
            ProfileKind::Student => "Student",
            ProfileKind::External => "External",
            ProfileKind::Guest => "Guest",
        }
    }

    /// Role granted to users registering under this person type.
    pub fn role(&self) -> Role {
        match self {
            ProfileKind::Employee | ProfileKind::External => Role::Employee,
            ProfileKind::Student => Role::Student,
            ProfileKind::Guest => Role::Guest,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub kind: ProfileKind,
    /// Domain-specific identifying number (employee number, student
    /// number, ...). Unique per kind.
    pub number: String,
    /// Address used exclusively for OTP delivery.
    pub email: String,
    pub user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProfile {
    pub kind: ProfileKind,
    pub number: String,
    pub email: String,
}
