//! Account lifecycle orchestration — registration, login, and the
//! OTP-gated recovery flows.

use chrono::Utc;
use tracing::{info, warn};
use unigate_core::error::{UnigateError, UnigateResult};
use unigate_core::models::profile::{CreateProfile, ProfileKind};
use unigate_core::models::register::RegisterRequest;
use unigate_core::models::user::{CreateUser, OtpEffect, UpdateUser, User};
use unigate_core::repository::{
    PaginatedResult, Pagination, ProfileRepository, UserRepository,
};

use crate::attempts::LoginAttemptTracker;
use crate::config::AuthConfig;
use crate::email::OtpSender;
use crate::error::AuthError;
use crate::otp;
use crate::password;
use crate::token;

/// Input for the login flow.
#[derive(Debug)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
}

/// Successful login result.
#[derive(Debug)]
pub struct LoginOutput {
    /// Signed JWT bearer token, surfaced to clients under
    /// [`token::JWT_TOKEN_HEADER`].
    pub token: String,
    /// Token lifetime in seconds.
    pub expires_in: u64,
    /// The authenticated user.
    pub user: User,
}

/// Input for the password-recovery verification flow.
#[derive(Debug)]
pub struct ResetPasswordInput {
    pub username: String,
    pub otp: String,
    pub new_password: String,
}

/// Input for the username-recovery verification flow.
#[derive(Debug)]
pub struct RenameInput {
    pub otp: String,
    pub new_username: String,
}

/// Contact-email resolution order for password recovery: the first
/// linked profile with a non-empty email wins.
const RECOVERY_EMAIL_ORDER: [ProfileKind; 4] = [
    ProfileKind::Student,
    ProfileKind::Employee,
    ProfileKind::External,
    ProfileKind::Guest,
];

/// Account lifecycle service.
///
/// Generic over its collaborators so the orchestration layer has no
/// dependency on the database crate or a concrete mail transport.
pub struct AccountService<U, P, M, A>
where
    U: UserRepository,
    P: ProfileRepository,
    M: OtpSender,
    A: LoginAttemptTracker,
{
    users: U,
    profiles: P,
    mailer: M,
    attempts: A,
    config: AuthConfig,
}

impl<U, P, M, A> AccountService<U, P, M, A>
where
    U: UserRepository,
    P: ProfileRepository,
    M: OtpSender,
    A: LoginAttemptTracker,
{
    pub fn new(users: U, profiles: P, mailer: M, attempts: A, config: AuthConfig) -> Self {
        Self {
            users,
            profiles,
            mailer,
            attempts,
            config,
        }
    }

    /// Register a new account against a person profile.
    ///
    /// Employees, students, and externals must already have a profile
    /// on record, located by its domain number; guests are created
    /// from the request. The new account starts locked, with a fresh
    /// OTP delivered to the profile's email for the unlock step.
    pub async fn register(&self, request: RegisterRequest) -> UnigateResult<User> {
        // 1. Policy before any lookup.
        password::validate_policy(&request.password)?;

        // 2. The username must be globally unique.
        if self
            .users
            .find_by_username(&request.username)
            .await?
            .is_some()
        {
            return Err(UnigateError::AlreadyExists {
                entity: "username".into(),
            });
        }

        // 3. Exactly one person-profile claim drives the registration.
        let (kind, claim) =
            request
                .primary_claim()
                .ok_or_else(|| UnigateError::Validation {
                    message: "registration requires a person profile".into(),
                })?;

        // 4. Resolve the profile.
        let profile = match kind {
            ProfileKind::Guest => {
                let email = claim
                    .email
                    .clone()
                    .filter(|e| !e.is_empty())
                    .ok_or_else(|| UnigateError::Validation {
                        message: "guest registration requires an email address".into(),
                    })?;
                self.profiles
                    .create(CreateProfile {
                        kind,
                        number: claim.number.clone(),
                        email,
                    })
                    .await?
            }
            _ => self
                .profiles
                .find_by_number(kind, &claim.number)
                .await?
                .ok_or_else(|| UnigateError::NotFound {
                    entity: "profile".into(),
                    id: format!("{}={}", kind.as_str(), claim.number),
                })?,
        };

        // 5. Issue the initial OTP and deliver it before anything is
        //    persisted — a delivery failure aborts the registration.
        let code = otp::generate_otp();
        self.mailer.send_otp(&profile.email, &code).await?;

        let role = kind.role();
        let user = self
            .users
            .create(CreateUser {
                username: request.username.clone(),
                password: request.password.clone(),
                otp: code,
                role,
                authorities: self.config.role_authorities.authorities_for(role),
            })
            .await?;
        self.profiles.link_user(profile.id, user.id).await?;

        info!(username = %user.username, kind = kind.as_str(), "registered new account");
        Ok(user)
    }

    /// Authenticate a username/password pair and issue a bearer token.
    pub async fn login(&self, input: LoginInput) -> UnigateResult<LoginOutput> {
        // 1. Credential lookup. A missing user surfaces as NotFound,
        //    not as a credential failure.
        let user = self.users.get_by_username(&input.username).await?;

        // 2. Verify the password.
        let valid = password::verify_password(
            &input.password,
            &user.password_hash,
            self.config.pepper.as_deref(),
        )
        .map_err(UnigateError::from)?;
        if !valid {
            self.attempts.record_failure(&user.username);
            return Err(AuthError::InvalidCredentials.into());
        }

        // 3. Lock state is (re)computed only at successful-credential
        //    time: an unlocked account picks up the tracker's verdict,
        //    a locked one gets its counter reset.
        let locked = if !user.locked {
            self.attempts.has_exceeded_max_attempts(&user.username)
        } else {
            self.attempts.evict(&user.username);
            true
        };

        let user = self
            .users
            .update(
                user.id,
                UpdateUser {
                    locked: Some(locked),
                    last_login_at: Some(Utc::now()),
                    ..Default::default()
                },
            )
            .await?;

        if user.locked {
            warn!(username = %user.username, "login rejected: account locked");
            return Err(AuthError::AccountLocked.into());
        }
        if !user.active {
            return Err(AuthError::AccountDisabled.into());
        }

        // 4. Issue the bearer token.
        let token = token::issue_access_token(&user, &self.config)?;
        Ok(LoginOutput {
            token,
            expires_in: self.config.token_lifetime_secs,
            user,
        })
    }

    /// Start password recovery: issue a fresh OTP and mail it to the
    /// user's profile email.
    ///
    /// The code is dispatched before it is persisted, so a user with
    /// no reachable email keeps whatever OTP state they had.
    pub async fn forgot_password(&self, username: &str) -> UnigateResult<User> {
        let user = self.users.get_by_username(username).await?;

        let profiles = self.profiles.list_by_user(user.id).await?;
        let email = RECOVERY_EMAIL_ORDER.iter().find_map(|kind| {
            profiles
                .iter()
                .find(|p| p.kind == *kind && !p.email.is_empty())
                .map(|p| p.email.clone())
        });
        let Some(email) = email else {
            return Err(UnigateError::Delivery(
                "no email associated with this user for password reset".into(),
            ));
        };

        let code = otp::generate_otp();
        self.mailer.send_otp(&email, &code).await?;

        let user = self
            .users
            .update(
                user.id,
                UpdateUser {
                    otp: Some(Some(code)),
                    ..Default::default()
                },
            )
            .await?;
        info!(username = %user.username, "password-recovery OTP issued");
        Ok(user)
    }

    /// Complete password recovery: on a matching OTP, replace the
    /// password and clear the code.
    pub async fn verify_otp_forgot_password(
        &self,
        input: ResetPasswordInput,
    ) -> UnigateResult<User> {
        // Policy first: a weak replacement consumes no OTP attempt.
        password::validate_policy(&input.new_password)?;

        let user = self.users.get_by_username(&input.username).await?;
        let hash = password::hash_password(&input.new_password, self.config.pepper.as_deref())
            .map_err(UnigateError::from)?;

        self.users
            .consume_otp(user.id, &input.otp, OtpEffect::SetPassword(hash))
            .await?
            .ok_or(UnigateError::OtpMismatch)
    }

    /// Account-unlock verification.
    ///
    /// Boolean outcome: mismatches and unknown usernames report
    /// failure rather than raising an error, unlike the other OTP
    /// paths.
    pub async fn verify_otp(&self, username: &str, code: &str) -> UnigateResult<bool> {
        let Some(user) = self.users.find_by_username(username).await? else {
            return Ok(false);
        };

        let unlocked = self
            .users
            .consume_otp(user.id, code, OtpEffect::Unlock)
            .await?
            .is_some();
        if unlocked {
            info!(username, "account unlocked");
        }
        Ok(unlocked)
    }

    /// Start username recovery: locate the user through a profile
    /// email, issue a fresh OTP, and mail it to that address.
    ///
    /// Here the code is persisted before dispatch; a failed send
    /// leaves it pending.
    pub async fn forgot_username(&self, email: &str) -> UnigateResult<User> {
        let user_id = self
            .profiles
            .find_by_email(email)
            .await?
            .and_then(|p| p.user_id)
            .ok_or_else(|| UnigateError::NotFound {
                entity: "user".into(),
                id: format!("email={email}"),
            })?;
        let user = self.users.get_by_id(user_id).await?;

        let code = otp::generate_otp();
        let user = self
            .users
            .update(
                user.id,
                UpdateUser {
                    otp: Some(Some(code.clone())),
                    ..Default::default()
                },
            )
            .await?;
        self.mailer.send_otp(email, &code).await?;

        info!(username = %user.username, "username-recovery OTP issued");
        Ok(user)
    }

    /// Complete username recovery: the submitted OTP locates the
    /// account, and a matching consumption renames it.
    pub async fn verify_otp_forgot_username(&self, input: RenameInput) -> UnigateResult<User> {
        let user = self
            .users
            .find_by_otp(&input.otp)
            .await?
            .ok_or(UnigateError::OtpMismatch)?;

        // The desired name must not belong to anyone else.
        if let Some(existing) = self.users.find_by_username(&input.new_username).await? {
            if existing.id != user.id {
                return Err(UnigateError::AlreadyExists {
                    entity: "username".into(),
                });
            }
        }

        self.users
            .consume_otp(user.id, &input.otp, OtpEffect::Rename(input.new_username))
            .await?
            .ok_or(UnigateError::OtpMismatch)
    }

    /// Paginated listing of all users.
    pub async fn list_users(&self, pagination: Pagination) -> UnigateResult<PaginatedResult<User>> {
        self.users.list(pagination).await
    }
}
