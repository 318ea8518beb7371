/// Failure taxonomy for the authentication pipeline.
///
/// Verification failures all collapse to an unauthorized outcome at the
/// request boundary but stay distinguishable for logging and tests.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("malformed token")]
    Malformed,
    #[error("bad token signature")]
    BadSignature,
    #[error("token expired")]
    Expired,
    #[error("token subject missing or invalid")]
    MissingSubject,
    #[error("token signing failed")]
    Signing,
    #[error("password hashing failed")]
    Hashing,
    #[error("unknown role tag")]
    UnknownRole,
    #[cfg(feature = "database")]
    #[error("storage error: {0}")]
    Storage(#[from] nvs_pg::PgErr),
}
