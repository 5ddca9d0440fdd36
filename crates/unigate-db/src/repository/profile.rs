//! SurrealDB implementation of [`ProfileRepository`].

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use unigate_core::error::UnigateResult;
use unigate_core::models::profile::{CreateProfile, Profile, ProfileKind};
use unigate_core::repository::ProfileRepository;
use uuid::Uuid;

use crate::error::DbError;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct ProfileRow {
    kind: String,
    number: String,
    email: String,
    user_id: Option<String>,
    created_at: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct ProfileRowWithId {
    record_id: String,
    kind: String,
    number: String,
    email: String,
    user_id: Option<String>,
    created_at: DateTime<Utc>,
}

fn parse_kind(s: &str) -> Result<ProfileKind, DbError> {
    match s {
        "Employee" => Ok(ProfileKind::Employee),
        "Student" => Ok(ProfileKind::Student),
        "External" => Ok(ProfileKind::External),
        "Guest" => Ok(ProfileKind::Guest),
        other => Err(DbError::Corrupt(format!("unknown profile kind: {other}"))),
    }
}

fn parse_user_id(user_id: Option<String>) -> Result<Option<Uuid>, DbError> {
    user_id
        .map(|s| {
            Uuid::parse_str(&s).map_err(|e| DbError::Corrupt(format!("invalid user UUID: {e}")))
        })
        .transpose()
}

impl ProfileRow {
    fn into_profile(self, id: Uuid) -> Result<Profile, DbError> {
        Ok(Profile {
            id,
            kind: parse_kind(&self.kind)?,
            number: self.number,
            email: self.email,
            user_id: parse_user_id(self.user_id)?,
            created_at: self.created_at,
        })
    }
}

impl ProfileRowWithId {
    fn try_into_profile(self) -> Result<Profile, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Corrupt(format!("invalid UUID: {e}")))?;
        Ok(Profile {
            id,
            kind: parse_kind(&self.kind)?,
            number: self.number,
            email: self.email,
            user_id: parse_user_id(self.user_id)?,
            created_at: self.created_at,
        })
    }
}

/// SurrealDB implementation of the person-profile repository.
#[derive(Clone)]
pub struct SurrealProfileRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealProfileRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> ProfileRepository for SurrealProfileRepository<C> {
    async fn create(&self, input: CreateProfile) -> UnigateResult<Profile> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('profile', $id) SET \
                 kind = $kind, \
                 number = $number, \
                 email = $email, \
                 user_id = NONE",
            )
            .bind(("id", id_str.clone()))
            .bind(("kind", input.kind.as_str().to_string()))
            .bind(("number", input.number))
            .bind(("email", input.email))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<ProfileRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "profile".into(),
            id: id_str,
        })?;

        Ok(row.into_profile(id)?)
    }

    async fn find_by_number(
        &self,
        kind: ProfileKind,
        number: &str,
    ) -> UnigateResult<Option<Profile>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM profile \
                 WHERE kind = $kind AND number = $number LIMIT 1",
            )
            .bind(("kind", kind.as_str().to_string()))
            .bind(("number", number.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ProfileRowWithId> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.try_into_profile()?)),
            None => Ok(None),
        }
    }

    async fn find_by_email(&self, email: &str) -> UnigateResult<Option<Profile>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM profile \
                 WHERE email = $email LIMIT 1",
            )
            .bind(("email", email.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ProfileRowWithId> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.try_into_profile()?)),
            None => Ok(None),
        }
    }

    async fn list_by_user(&self, user_id: Uuid) -> UnigateResult<Vec<Profile>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM profile \
                 WHERE user_id = $user_id",
            )
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ProfileRowWithId> = result.take(0).map_err(DbError::from)?;
        let profiles = rows
            .into_iter()
            .map(|row| row.try_into_profile())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(profiles)
    }

    async fn link_user(&self, profile_id: Uuid, user_id: Uuid) -> UnigateResult<Profile> {
        let id_str = profile_id.to_string();

        let result = self
            .db
            .query("UPDATE type::record('profile', $id) SET user_id = $user_id")
            .bind(("id", id_str.clone()))
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<ProfileRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "profile".into(),
            id: id_str,
        })?;

        Ok(row.into_profile(profile_id)?)
    }
}
