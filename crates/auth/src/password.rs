use super::AuthError;
use argon2::Argon2;
use argon2::PasswordHash;
use argon2::PasswordHasher;
use argon2::PasswordVerifier;
use argon2::password_hash::SaltString;

fn salt() -> SaltString {
    use rand::Rng;
    let ref mut bytes = [0u8; 16];
    rand::rng().fill(bytes);
    SaltString::encode_b64(bytes).expect("salt")
}

/// One-way transform with a fresh random salt. Fails only on internal
/// hashing errors; credential strength policy belongs to the caller.
pub fn hash(password: &str) -> Result<String, AuthError> {
    Argon2::default()
        .hash_password(password.as_bytes(), &salt())
        .map(|h| h.to_string())
        .map_err(|_| AuthError::Hashing)
}

/// Mismatch and unparseable hashes both come back as false, never an error.
pub fn verify(password: &str, hashword: &str) -> bool {
    PasswordHash::new(hashword)
        .ok()
        .as_ref()
        .map(|hash| {
            Argon2::default()
                .verify_password(password.as_bytes(), hash)
                .is_ok()
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let hashword = hash("correct horse battery staple").unwrap();
        assert!(verify("correct horse battery staple", &hashword));
        assert!(!verify("incorrect horse battery staple", &hashword));
    }

    #[test]
    fn salts_are_fresh() {
        let a = hash("same input").unwrap();
        let b = hash("same input").unwrap();
        assert_ne!(a, b);
        assert!(verify("same input", &a));
        assert!(verify("same input", &b));
    }

    #[test]
    fn garbage_hash_is_false_not_error() {
        assert!(!verify("anything", "not-a-phc-string"));
        assert!(!verify("anything", ""));
    }
}
