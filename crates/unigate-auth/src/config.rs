//! Account service configuration.

use unigate_core::models::user::RoleAuthorities;

/// Configuration for the account lifecycle service.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// PEM-encoded Ed25519 private key for JWT signing.
    pub jwt_private_key_pem: String,
    /// PEM-encoded Ed25519 public key for JWT verification.
    pub jwt_public_key_pem: String,
    /// Bearer token lifetime in seconds (default: 900 = 15 minutes).
    pub token_lifetime_secs: u64,
    /// JWT issuer (`iss` claim).
    pub jwt_issuer: String,
    /// Optional pepper prepended to passwords before Argon2id
    /// verification. Must match the pepper used during hashing.
    pub pepper: Option<String>,
    /// Failed login attempts tolerated before the lockout flag is
    /// raised at the next successful credential check (default: 5).
    pub max_failed_login_attempts: u32,
    /// Role→authority table applied at registration.
    pub role_authorities: RoleAuthorities,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_private_key_pem: String::new(),
            jwt_public_key_pem: String::new(),
            token_lifetime_secs: 900,
            jwt_issuer: "unigate".into(),
            pepper: None,
            max_failed_login_attempts: 5,
            role_authorities: RoleAuthorities::default(),
        }
    }
}
