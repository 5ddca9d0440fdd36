//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async and return [`UnigateResult`].
//! `get_*` accessors error with `NotFound` when the record is absent;
//! `find_*` accessors return `Option` instead.

use uuid::Uuid;

use crate::error::UnigateResult;
use crate::models::{
    profile::{CreateProfile, Profile, ProfileKind},
    user::{CreateUser, OtpEffect, UpdateUser, User},
};

/// Pagination parameters for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

pub trait UserRepository: Send + Sync {
    fn create(&self, input: CreateUser) -> impl Future<Output = UnigateResult<User>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = UnigateResult<User>> + Send;
    fn get_by_username(
        &self,
        username: &str,
    ) -> impl Future<Output = UnigateResult<User>> + Send;
    fn find_by_username(
        &self,
        username: &str,
    ) -> impl Future<Output = UnigateResult<Option<User>>> + Send;
    /// Indexed lookup of the user holding a pending OTP, if any.
    fn find_by_otp(
        &self,
        otp: &str,
    ) -> impl Future<Output = UnigateResult<Option<User>>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateUser,
    ) -> impl Future<Output = UnigateResult<User>> + Send;
    /// Atomically consume a pending OTP: clear it and apply `effect`
    /// in one conditional update.
    ///
    /// Returns the updated user, or `None` when the stored code does
    /// not equal `otp` (including when no code is pending). Two racing
    /// consumers of the same code cannot both observe a match.
    fn consume_otp(
        &self,
        id: Uuid,
        otp: &str,
        effect: OtpEffect,
    ) -> impl Future<Output = UnigateResult<Option<User>>> + Send;
    fn list(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = UnigateResult<PaginatedResult<User>>> + Send;
}

pub trait ProfileRepository: Send + Sync {
    fn create(&self, input: CreateProfile) -> impl Future<Output = UnigateResult<Profile>> + Send;
    fn find_by_number(
        &self,
        kind: ProfileKind,
        number: &str,
    ) -> impl Future<Output = UnigateResult<Option<Profile>>> + Send;
    fn find_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = UnigateResult<Option<Profile>>> + Send;
    /// All profiles linked to `user_id`, in no guaranteed order.
    fn list_by_user(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = UnigateResult<Vec<Profile>>> + Send;
    /// Set the one-to-one profile→user link. Set once, at successful
    /// registration.
    fn link_user(
        &self,
        profile_id: Uuid,
        user_id: Uuid,
    ) -> impl Future<Output = UnigateResult<Profile>> + Send;
}
