//! SurrealDB implementation of [`UserRepository`].
//!
//! Password hashing uses Argon2id with OWASP-recommended parameters
//! (memory: 19 MiB, iterations: 2, parallelism: 1). Salt is randomly
//! generated per hash. An optional pepper (server-side secret) can be
//! provided at construction time.
//!
//! OTP consumption is a single conditional UPDATE, so the
//! read-compare-clear sequence is atomic per user record.

use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHasher};
use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use unigate_core::error::UnigateResult;
use unigate_core::models::user::{CreateUser, OtpEffect, Role, UpdateUser, User};
use unigate_core::repository::{PaginatedResult, Pagination, UserRepository};
use uuid::Uuid;

use crate::error::DbError;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct UserRow {
    username: String,
    password_hash: String,
    otp: Option<String>,
    locked: bool,
    active: bool,
    role: String,
    authorities: Vec<String>,
    joined_at: DateTime<Utc>,
    last_login_at: Option<DateTime<Utc>>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct UserRowWithId {
    record_id: String,
    username: String,
    password_hash: String,
    otp: Option<String>,
    locked: bool,
    active: bool,
    role: String,
    authorities: Vec<String>,
    joined_at: DateTime<Utc>,
    last_login_at: Option<DateTime<Utc>>,
}

fn parse_role(s: &str) -> Result<Role, DbError> {
    match s {
        "Employee" => Ok(Role::Employee),
        "Student" => Ok(Role::Student),
        "Guest" => Ok(Role::Guest),
        other => Err(DbError::Corrupt(format!("unknown user role: {other}"))),
    }
}

impl UserRow {
    fn into_user(self, id: Uuid) -> Result<User, DbError> {
        Ok(User {
            id,
            username: self.username,
            password_hash: self.password_hash,
            otp: self.otp,
            locked: self.locked,
            active: self.active,
            role: parse_role(&self.role)?,
            authorities: self.authorities,
            joined_at: self.joined_at,
            last_login_at: self.last_login_at,
        })
    }
}

impl UserRowWithId {
    fn try_into_user(self) -> Result<User, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Corrupt(format!("invalid UUID: {e}")))?;
        Ok(User {
            id,
            username: self.username,
            password_hash: self.password_hash,
            otp: self.otp,
            locked: self.locked,
            active: self.active,
            role: parse_role(&self.role)?,
            authorities: self.authorities,
            joined_at: self.joined_at,
            last_login_at: self.last_login_at,
        })
    }
}

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// Hash a password with Argon2id using OWASP-recommended parameters.
///
/// If a pepper is provided, it is prepended to the password before
/// hashing. The salt is randomly generated for each call.
fn hash_password(password: &str, pepper: Option<&str>) -> Result<String, DbError> {
    // OWASP ASVS recommended: m=19456 (19 MiB), t=2, p=1
    let params = argon2::Params::new(19456, 2, 1, None)
        .map_err(|e| DbError::Corrupt(format!("argon2 params error: {e}")))?;
    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);

    let peppered: String;
    let input = match pepper {
        Some(p) => {
            peppered = format!("{p}{password}");
            peppered.as_bytes()
        }
        None => password.as_bytes(),
    };

    let salt = SaltString::generate(&mut argon2::password_hash::rand_core::OsRng);
    let hash = argon2
        .hash_password(input, &salt)
        .map_err(|e| DbError::Corrupt(format!("password hash error: {e}")))?;

    Ok(hash.to_string())
}

/// SurrealDB implementation of the User repository.
#[derive(Clone)]
pub struct SurrealUserRepository<C: Connection> {
    db: Surreal<C>,
    /// Optional server-side pepper for password hashing.
    pepper: Option<String>,
}

impl<C: Connection> SurrealUserRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db, pepper: None }
    }

    pub fn with_pepper(db: Surreal<C>, pepper: String) -> Self {
        Self {
            db,
            pepper: Some(pepper),
        }
    }

    async fn find_one(&self, clause: &str, value: String) -> UnigateResult<Option<User>> {
        let query = format!(
            "SELECT meta::id(id) AS record_id, * FROM user WHERE {clause} LIMIT 1"
        );
        let mut result = self
            .db
            .query(&query)
            .bind(("value", value))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRowWithId> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.try_into_user()?)),
            None => Ok(None),
        }
    }
}

impl<C: Connection> UserRepository for SurrealUserRepository<C> {
    async fn create(&self, input: CreateUser) -> UnigateResult<User> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let password_hash = hash_password(&input.password, self.pepper.as_deref())?;

        let result = self
            .db
            .query(
                "CREATE type::record('user', $id) SET \
                 username = $username, \
                 password_hash = $password_hash, \
                 otp = $otp, \
                 locked = true, \
                 active = true, \
                 role = $role, \
                 authorities = $authorities, \
                 last_login_at = NONE",
            )
            .bind(("id", id_str.clone()))
            .bind(("username", input.username))
            .bind(("password_hash", password_hash))
            .bind(("otp", input.otp))
            .bind(("role", input.role.as_str().to_string()))
            .bind(("authorities", input.authorities))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.into_user(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> UnigateResult<User> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('user', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.into_user(id)?)
    }

    async fn get_by_username(&self, username: &str) -> UnigateResult<User> {
        self.find_by_username(username)
            .await?
            .ok_or_else(|| {
                DbError::NotFound {
                    entity: "user".into(),
                    id: format!("username={username}"),
                }
                .into()
            })
    }

    async fn find_by_username(&self, username: &str) -> UnigateResult<Option<User>> {
        self.find_one("username = $value", username.to_string())
            .await
    }

    async fn find_by_otp(&self, otp: &str) -> UnigateResult<Option<User>> {
        self.find_one("otp = $value", otp.to_string()).await
    }

    async fn update(&self, id: Uuid, input: UpdateUser) -> UnigateResult<User> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.username.is_some() {
            sets.push("username = $username");
        }
        if input.otp.is_some() {
            sets.push("otp = $otp");
        }
        if input.locked.is_some() {
            sets.push("locked = $locked");
        }
        if input.active.is_some() {
            sets.push("active = $active");
        }
        if input.last_login_at.is_some() {
            sets.push("last_login_at = $last_login_at");
        }
        if sets.is_empty() {
            return self.get_by_id(id).await;
        }

        let query = format!(
            "UPDATE type::record('user', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(username) = input.username {
            builder = builder.bind(("username", username));
        }
        if let Some(otp) = input.otp {
            // otp is Option<Option<String>>: Some(Some(v)) = set, Some(None) = clear
            builder = builder.bind(("otp", otp));
        }
        if let Some(locked) = input.locked {
            builder = builder.bind(("locked", locked));
        }
        if let Some(active) = input.active {
            builder = builder.bind(("active", active));
        }
        if let Some(last_login_at) = input.last_login_at {
            builder = builder.bind(("last_login_at", last_login_at));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.into_user(id)?)
    }

    async fn consume_otp(
        &self,
        id: Uuid,
        otp: &str,
        effect: OtpEffect,
    ) -> UnigateResult<Option<User>> {
        let id_str = id.to_string();

        // One conditional statement: the WHERE guard and the clear of
        // `otp` happen in the same update, so a stale code can never
        // be consumed twice.
        let set_clause = match &effect {
            OtpEffect::Unlock => "otp = NONE, locked = false",
            OtpEffect::SetPassword(_) => "otp = NONE, password_hash = $password_hash",
            OtpEffect::Rename(_) => "otp = NONE, username = $username",
        };
        let query = format!(
            "UPDATE type::record('user', $id) SET {set_clause} WHERE otp = $otp"
        );

        let mut builder = self
            .db
            .query(&query)
            .bind(("id", id_str))
            .bind(("otp", otp.to_string()));

        match effect {
            OtpEffect::Unlock => {}
            OtpEffect::SetPassword(password_hash) => {
                builder = builder.bind(("password_hash", password_hash));
            }
            OtpEffect::Rename(username) => {
                builder = builder.bind(("username", username));
            }
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.into_user(id)?)),
            None => Ok(None),
        }
    }

    async fn list(&self, pagination: Pagination) -> UnigateResult<PaginatedResult<User>> {
        let mut count_result = self
            .db
            .query("SELECT count() AS total FROM user GROUP ALL")
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM user \
                 ORDER BY joined_at ASC \
                 LIMIT $limit START $offset",
            )
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_user())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}

/// Verify a password against an Argon2id hash.
///
/// Public for use by the auth layer and tests.
pub fn verify_password(password: &str, hash: &str, pepper: Option<&str>) -> Result<bool, DbError> {
    use argon2::PasswordVerifier;

    let peppered: String;
    let input = match pepper {
        Some(p) => {
            peppered = format!("{p}{password}");
            peppered.as_bytes()
        }
        None => password.as_bytes(),
    };

    let parsed_hash = argon2::PasswordHash::new(hash)
        .map_err(|e| DbError::Corrupt(format!("invalid hash format: {e}")))?;

    let argon2 = Argon2::default();
    match argon2.verify_password(input, &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(DbError::Corrupt(format!("verify error: {e}"))),
    }
}
