use super::*;
use nvs_core::ID;

/// JWT payload: a string-encoded numeric subject and absolute expiry.
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(subject: ID<Account>, ttl: std::time::Duration) -> Self {
        Self::at(subject, std::time::SystemTime::now(), ttl)
    }
    /// Claims anchored at an explicit issue instant. The expiry is the
    /// only lifetime the token carries; nothing is persisted.
    pub fn at(subject: ID<Account>, issued: std::time::SystemTime, ttl: std::time::Duration) -> Self {
        let iat = issued
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time")
            .as_secs() as i64;
        Self {
            sub: subject.inner().to_string(),
            iat,
            exp: iat + ttl.as_secs() as i64,
        }
    }
    /// Parses the subject back into a typed account id. A subject that is
    /// absent or not a numeric string is a verification failure, never a
    /// panic.
    pub fn subject(&self) -> Result<ID<Account>, AuthError> {
        self.sub
            .parse::<i64>()
            .map(ID::from)
            .map_err(|_| AuthError::MissingSubject)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subject_survives_encoding() {
        let claims = Claims::new(ID::from(7), std::time::Duration::from_secs(300));
        assert_eq!(claims.sub, "7");
        assert_eq!(claims.subject().unwrap(), ID::from(7));
        assert_eq!(claims.exp - claims.iat, 300);
    }

    #[test]
    fn non_numeric_subject_is_rejected() {
        let ref mut claims = Claims::new(ID::from(7), std::time::Duration::from_secs(300));
        claims.sub = "sevens".to_string();
        assert!(matches!(claims.subject(), Err(AuthError::MissingSubject)));
    }
}
