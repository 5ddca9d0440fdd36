//! Password policy, hashing, and verification using Argon2id.

use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use unigate_core::error::UnigateError;

use crate::error::AuthError;

/// Enforce the password policy: at least one non-alphanumeric
/// character.
pub fn validate_policy(password: &str) -> Result<(), UnigateError> {
    if password.chars().any(|c| !c.is_ascii_alphanumeric()) {
        Ok(())
    } else {
        Err(UnigateError::Validation {
            message: "Please create a stronger password. \
                      Password should contain special characters."
                .into(),
        })
    }
}

fn peppered<'a>(password: &'a str, pepper: Option<&str>, buf: &'a mut String) -> &'a [u8] {
    match pepper {
        Some(p) => {
            *buf = format!("{p}{password}");
            buf.as_bytes()
        }
        None => password.as_bytes(),
    }
}

/// Hash a password with Argon2id using OWASP-recommended parameters
/// (memory: 19 MiB, iterations: 2, parallelism: 1).
///
/// If `pepper` is provided it is prepended to the password before
/// hashing. The salt is randomly generated for each call.
pub fn hash_password(password: &str, pepper: Option<&str>) -> Result<String, AuthError> {
    let params = argon2::Params::new(19456, 2, 1, None)
        .map_err(|e| AuthError::Crypto(format!("argon2 params error: {e}")))?;
    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);

    let mut buf = String::new();
    let input = peppered(password, pepper, &mut buf);

    let salt = SaltString::generate(&mut argon2::password_hash::rand_core::OsRng);
    let hash = argon2
        .hash_password(input, &salt)
        .map_err(|e| AuthError::Crypto(format!("password hash error: {e}")))?;

    Ok(hash.to_string())
}

/// Verify a plaintext password against an Argon2id PHC-format hash.
///
/// If `pepper` is provided it is prepended to the password before
/// verification — this must match the pepper used during hashing.
///
/// Returns `Ok(true)` on match, `Ok(false)` on mismatch, or
/// `Err(AuthError::Crypto)` if the stored hash is malformed.
pub fn verify_password(
    password: &str,
    hash: &str,
    pepper: Option<&str>,
) -> Result<bool, AuthError> {
    let mut buf = String::new();
    let input = peppered(password, pepper, &mut buf);

    let parsed_hash = argon2::PasswordHash::new(hash)
        .map_err(|e| AuthError::Crypto(format!("invalid hash format: {e}")))?;

    let argon2 = Argon2::default();
    match argon2.verify_password(input, &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AuthError::Crypto(format!("verify error: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_accepts_special_characters() {
        assert!(validate_policy("hunter2!").is_ok());
        assert!(validate_policy("with spaces too").is_ok());
        assert!(validate_policy("dash-dash").is_ok());
    }

    #[test]
    fn policy_rejects_alphanumeric_only() {
        let err = validate_policy("Hunter2Hunter2").unwrap_err();
        assert!(matches!(
            err,
            unigate_core::error::UnigateError::Validation { .. }
        ));
        assert!(validate_policy("").is_err());
    }

    #[test]
    fn correct_password_matches() {
        let hash = hash_password("hunter2!", None).unwrap();
        assert!(verify_password("hunter2!", &hash, None).unwrap());
    }

    #[test]
    fn wrong_password_does_not_match() {
        let hash = hash_password("hunter2!", None).unwrap();
        assert!(!verify_password("wrong", &hash, None).unwrap());
    }

    #[test]
    fn pepper_is_applied() {
        let hash = hash_password("hunter2!", Some("pepper!")).unwrap();
        assert!(verify_password("hunter2!", &hash, Some("pepper!")).unwrap());
        // Without pepper should fail.
        assert!(!verify_password("hunter2!", &hash, None).unwrap());
    }

    #[test]
    fn malformed_hash_returns_error() {
        let result = verify_password("pw", "not-a-hash", None);
        assert!(result.is_err());
    }

    #[test]
    fn salts_differ_between_hashes() {
        let h1 = hash_password("hunter2!", None).unwrap();
        let h2 = hash_password("hunter2!", None).unwrap();
        assert_ne!(h1, h2);
    }
}
