//! One-time password generation.
//!
//! Codes are short random strings attached to a user record. A code
//! carries no expiry: it stays valid until consumed or overwritten by
//! the next issuance. Validation is exact string equality, performed
//! by the repository's conditional update.

use rand::Rng;
use rand::distr::Alphanumeric;

/// Length of every generated code.
pub const OTP_LENGTH: usize = 10;

/// Generate a fresh one-time password: `OTP_LENGTH` characters,
/// uniform over the ASCII-alphanumeric alphabet.
pub fn generate_otp() -> String {
    rand::rng()
        .sample_iter(Alphanumeric)
        .take(OTP_LENGTH)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_has_fixed_length() {
        assert_eq!(generate_otp().len(), OTP_LENGTH);
    }

    #[test]
    fn code_is_alphanumeric() {
        let code = generate_otp();
        assert!(code.chars().all(|c| c.is_ascii_alphanumeric()), "{code}");
    }

    #[test]
    fn codes_differ_between_issuances() {
        // 62^10 possibilities — a collision here means the generator
        // is broken, not unlucky.
        assert_ne!(generate_otp(), generate_otp());
    }
}
