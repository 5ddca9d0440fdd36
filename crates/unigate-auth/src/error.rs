//! Authentication error types.

use thiserror::Error;
use unigate_core::error::UnigateError;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("account is locked")]
    AccountLocked,

    #[error("account is disabled")]
    AccountDisabled,

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl From<AuthError> for UnigateError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials | AuthError::AccountLocked | AuthError::AccountDisabled => {
                UnigateError::AuthenticationFailed {
                    reason: err.to_string(),
                }
            }
            AuthError::Crypto(msg) => UnigateError::Crypto(msg),
        }
    }
}
