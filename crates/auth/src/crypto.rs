use super::*;
use nvs_core::ID;

/// Access token validity window. Deployments have run anything from
/// 5-minute to 24-hour windows; override with the TOKEN_TTL env var
/// ("5m", "24h", ...). No call site carries its own literal.
const TOKEN_TTL: std::time::Duration = std::time::Duration::from_secs(24 * 60 * 60);

/// Cookie key the token travels under.
pub const TOKEN_COOKIE: &str = "token";

/// JWT signing and verification against a process-wide symmetric secret.
pub struct Crypto {
    encoding: jsonwebtoken::EncodingKey,
    decoding: jsonwebtoken::DecodingKey,
    validation: jsonwebtoken::Validation,
    ttl: std::time::Duration,
}

impl Crypto {
    pub fn new(secret: &[u8], ttl: std::time::Duration) -> Self {
        // HS256 only: a token asserting any other algorithm fails before
        // its payload is looked at. Expiry must be strictly in the future.
        let mut validation = jsonwebtoken::Validation::new(jsonwebtoken::Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);
        Self {
            encoding: jsonwebtoken::EncodingKey::from_secret(secret),
            decoding: jsonwebtoken::DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }
    /// A missing JWT_SECRET is a deployment defect, not a runtime
    /// condition to limp through.
    pub fn from_env() -> Self {
        let secret = std::env::var("JWT_SECRET").expect("JWT_SECRET must be set");
        let ttl = std::env::var("TOKEN_TTL")
            .ok()
            .and_then(|s| nvs_core::duration(&s))
            .unwrap_or(TOKEN_TTL);
        Self::new(secret.as_bytes(), ttl)
    }
    pub fn ttl(&self) -> std::time::Duration {
        self.ttl
    }
    /// Mints a signed token for the subject, valid for the configured
    /// window from now.
    pub fn issue(&self, subject: ID<Account>) -> Result<String, AuthError> {
        self.encode(&Claims::new(subject, self.ttl))
    }
    pub fn encode(&self, claims: &Claims) -> Result<String, AuthError> {
        jsonwebtoken::encode(&jsonwebtoken::Header::default(), claims, &self.encoding)
            .map_err(|_| AuthError::Signing)
    }
    /// Full verification pipeline: algorithm, signature, expiry, subject.
    pub fn verify(&self, token: &str) -> Result<ID<Account>, AuthError> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(verdict)
            .and_then(|data| data.claims.subject())
    }
}

fn verdict(e: jsonwebtoken::errors::Error) -> AuthError {
    use jsonwebtoken::errors::ErrorKind;
    match e.kind() {
        ErrorKind::ExpiredSignature => AuthError::Expired,
        ErrorKind::InvalidSignature => AuthError::BadSignature,
        ErrorKind::InvalidAlgorithm => AuthError::BadSignature,
        ErrorKind::InvalidAlgorithmName => AuthError::BadSignature,
        ErrorKind::MissingRequiredClaim(_) => AuthError::MissingSubject,
        _ => AuthError::Malformed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test-secret";
    const WINDOW: std::time::Duration = std::time::Duration::from_secs(5 * 60);

    fn crypto() -> Crypto {
        Crypto::new(SECRET, WINDOW)
    }

    #[test]
    fn subject_round_trips() {
        let crypto = crypto();
        let token = crypto.issue(ID::from(7)).unwrap();
        assert_eq!(crypto.verify(&token).unwrap(), ID::from(7));
    }

    /// Issue at t0 with a 5-minute window: valid at t0+4m, expired at t0+6m.
    #[test]
    fn expiry_is_strict() {
        let crypto = crypto();
        let now = std::time::SystemTime::now();
        let fresh = crypto
            .encode(&Claims::at(ID::from(7), now - std::time::Duration::from_secs(4 * 60), WINDOW))
            .unwrap();
        assert_eq!(crypto.verify(&fresh).unwrap(), ID::from(7));
        let stale = crypto
            .encode(&Claims::at(ID::from(7), now - std::time::Duration::from_secs(6 * 60), WINDOW))
            .unwrap();
        assert!(matches!(crypto.verify(&stale), Err(AuthError::Expired)));
    }

    #[test]
    fn tampered_payload_fails_signature() {
        let crypto = crypto();
        let token = crypto.issue(ID::from(7)).unwrap();
        // flip one character inside the payload segment
        let dot = token.find('.').unwrap();
        let ref mut bytes = token.clone().into_bytes();
        let target = dot + 2;
        bytes[target] = if bytes[target] == b'A' { b'B' } else { b'A' };
        let forged = String::from_utf8(bytes.clone()).unwrap();
        // the MAC is checked over the raw segments before any decoding,
        // so a payload flip always surfaces as a signature failure
        assert!(matches!(
            crypto.verify(&forged),
            Err(AuthError::BadSignature)
        ));
    }

    #[test]
    fn foreign_secret_fails_signature() {
        let token = Crypto::new(b"other-secret", WINDOW).issue(ID::from(7)).unwrap();
        assert!(matches!(
            crypto().verify(&token),
            Err(AuthError::BadSignature)
        ));
    }

    #[test]
    fn foreign_algorithm_is_rejected() {
        // same secret, different MAC family: algorithm confusion must fail
        let claims = Claims::new(ID::from(7), WINDOW);
        let token = jsonwebtoken::encode(
            &jsonwebtoken::Header::new(jsonwebtoken::Algorithm::HS384),
            &claims,
            &jsonwebtoken::EncodingKey::from_secret(SECRET),
        )
        .unwrap();
        assert!(matches!(
            crypto().verify(&token),
            Err(AuthError::BadSignature)
        ));
    }

    #[test]
    fn garbage_is_malformed() {
        assert!(matches!(
            crypto().verify("not-a-token"),
            Err(AuthError::Malformed)
        ));
    }

    #[test]
    fn non_numeric_subject_is_missing() {
        let crypto = crypto();
        let ref mut claims = Claims::new(ID::from(7), WINDOW);
        claims.sub = "nobody".to_string();
        let token = crypto.encode(claims).unwrap();
        assert!(matches!(
            crypto.verify(&token),
            Err(AuthError::MissingSubject)
        ));
    }
}
