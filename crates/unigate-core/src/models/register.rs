//! Transient registration aggregate.
//!
//! Not persisted as its own entity: the user sub-object becomes the
//! persisted user, and the claimed person profile is linked (or, for
//! guests, created).

use serde::{Deserialize, Serialize};

use crate::models::profile::ProfileKind;

/// A person-profile claim carried by a registration request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileClaim {
    pub number: String,
    /// Only consulted for guest registration, where the profile is
    /// created from the claim rather than looked up.
    #[serde(default)]
    pub email: Option<String>,
}

/// Registration request: a candidate user plus at most one populated
/// person-profile claim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub employee: Option<ProfileClaim>,
    #[serde(default)]
    pub student: Option<ProfileClaim>,
    #[serde(default)]
    pub external: Option<ProfileClaim>,
    #[serde(default)]
    pub guest: Option<ProfileClaim>,
}

impl RegisterRequest {
    /// The claim registration acts on.
    ///
    /// When several are mistakenly populated the precedence is
    /// employee > student > external > guest — the first claim
    /// carrying a non-empty number wins.
    pub fn primary_claim(&self) -> Option<(ProfileKind, &ProfileClaim)> {
        [
            (ProfileKind::Employee, &self.employee),
            (ProfileKind::Student, &self.student),
            (ProfileKind::External, &self.external),
            (ProfileKind::Guest, &self.guest),
        ]
        .into_iter()
        .find_map(|(kind, claim)| {
            claim
                .as_ref()
                .filter(|c| !c.number.is_empty())
                .map(|c| (kind, c))
        })
    }
}
