//! HTTP handlers for the account endpoints.

use axum::Json;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use unigate_auth::service::{LoginInput, RenameInput, ResetPasswordInput};
use unigate_auth::token::JWT_TOKEN_HEADER;
use unigate_core::models::register::RegisterRequest;
use unigate_core::models::user::User;
use unigate_core::repository::Pagination;
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::SharedState;

/// User representation returned to clients. Credential material
/// (password hash, pending OTP) never leaves the service.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub role: String,
    pub authorities: Vec<String>,
    pub locked: bool,
    pub active: bool,
    pub joined_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            role: user.role.as_str().to_string(),
            authorities: user.authorities,
            locked: user.locked,
            active: user.active,
            joined_at: user.joined_at,
            last_login_at: user.last_login_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

fn message(text: &str) -> Json<MessageResponse> {
    Json(MessageResponse {
        message: text.to_string(),
    })
}

/// POST /user/register
pub async fn register(
    State(state): State<SharedState>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.accounts.register(request).await?;
    Ok(Json(user.into()))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// POST /user/login
///
/// The bearer token travels back in the `jwt-token` response header.
pub async fn login(
    State(state): State<SharedState>,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let out = state
        .accounts
        .login(LoginInput {
            username: request.username,
            password: request.password,
        })
        .await?;

    let mut headers = HeaderMap::new();
    headers.insert(
        HeaderName::from_static(JWT_TOKEN_HEADER),
        HeaderValue::from_str(&out.token)
            .map_err(|e| unigate_core::error::UnigateError::Internal(e.to_string()))?,
    );

    Ok((headers, Json(UserResponse::from(out.user))))
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub username: String,
}

/// POST /user/forgot-password
pub async fn forgot_password(
    State(state): State<SharedState>,
    Json(request): Json<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.accounts.forgot_password(&request.username).await?;
    Ok(message(
        "An OTP has been sent to your registered email address.",
    ))
}

#[derive(Debug, Deserialize)]
pub struct VerifyForgotPasswordRequest {
    pub username: String,
    pub otp: String,
    pub new_password: String,
}

/// POST /user/verify-forgot-password
pub async fn verify_forgot_password(
    State(state): State<SharedState>,
    Json(request): Json<VerifyForgotPasswordRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state
        .accounts
        .verify_otp_forgot_password(ResetPasswordInput {
            username: request.username,
            otp: request.otp,
            new_password: request.new_password,
        })
        .await?;
    Ok(Json(user.into()))
}

#[derive(Debug, Deserialize)]
pub struct VerifyOtpRequest {
    pub username: String,
    pub otp: String,
}

/// POST /user/verify-otp — account unlock.
pub async fn verify_otp(
    State(state): State<SharedState>,
    Json(request): Json<VerifyOtpRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let unlocked = state
        .accounts
        .verify_otp(&request.username, &request.otp)
        .await?;

    if unlocked {
        Ok((StatusCode::OK, message("Account unlocked successfully")))
    } else {
        Ok((StatusCode::UNAUTHORIZED, message("Invalid OTP")))
    }
}

#[derive(Debug, Deserialize)]
pub struct ForgotUsernameRequest {
    pub email: String,
}

/// POST /user/forgot-username
pub async fn forgot_username(
    State(state): State<SharedState>,
    Json(request): Json<ForgotUsernameRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.accounts.forgot_username(&request.email).await?;
    Ok(message(
        "An OTP has been sent to your registered email address.",
    ))
}

#[derive(Debug, Deserialize)]
pub struct VerifyForgotUsernameRequest {
    pub otp: String,
    pub new_username: String,
}

/// POST /user/verify-otp-forgot-username
pub async fn verify_forgot_username(
    State(state): State<SharedState>,
    Json(request): Json<VerifyForgotUsernameRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state
        .accounts
        .verify_otp_forgot_username(RenameInput {
            otp: request.otp,
            new_username: request.new_username,
        })
        .await?;
    Ok(Json(user.into()))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub offset: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
}

fn default_limit() -> u64 {
    50
}

#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub items: Vec<UserResponse>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

/// GET /user/list
pub async fn list_users(
    State(state): State<SharedState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<UserListResponse>, ApiError> {
    let page = state
        .accounts
        .list_users(Pagination {
            offset: query.offset,
            limit: query.limit,
        })
        .await?;

    Ok(Json(UserListResponse {
        items: page.items.into_iter().map(UserResponse::from).collect(),
        total: page.total,
        offset: page.offset,
        limit: page.limit,
    }))
}
