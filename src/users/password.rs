use argon2::{
    password_hash::{PasswordHasher, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::error;

/// Hash a submitted password into the PHC string stored in `password_hash`.
pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            error!(error = %e, "failed to hash user password");
            anyhow::anyhow!("password hashing failed: {e}")
        })
}

/// There is no login route; tests use this to check stored hashes.
#[cfg(test)]
pub(crate) fn verify_password(plain: &str, stored: &str) -> anyhow::Result<bool> {
    use argon2::password_hash::{PasswordHash, PasswordVerifier};

    let parsed = PasswordHash::new(stored)
        .map_err(|e| anyhow::anyhow!("stored password hash is malformed: {e}"))?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use argon2::password_hash::PasswordHash;

    #[test]
    fn stored_hash_is_phc_and_salted() {
        let first = hash_password("blackjack21").unwrap();
        let second = hash_password("blackjack21").unwrap();

        assert!(first.starts_with("$argon2id$"));
        assert!(PasswordHash::new(&first).is_ok());
        assert_ne!(first, second);
        assert!(!first.contains("blackjack21"));
    }

    #[test]
    fn stored_hash_matches_only_the_submitted_password() {
        let hash = hash_password("blackjack21").unwrap();
        assert!(verify_password("blackjack21", &hash).unwrap());
        assert!(!verify_password("blackjack22", &hash).unwrap());
    }

    #[test]
    fn malformed_stored_hash_is_an_error() {
        let err = verify_password("anything", "plaintext-password").unwrap_err();
        assert!(err.to_string().contains("malformed"));
    }
}
