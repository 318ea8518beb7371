/// Failure taxonomy for catalog operations.
///
/// Idempotent association operations never produce "already exists" or
/// "already absent" here; only genuine faults are errors.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The referenced target row does not exist.
    #[error("target not found")]
    TargetNotFound,
    #[error(transparent)]
    Auth(#[from] nvs_auth::AuthError),
    #[error("storage error: {0}")]
    Storage(#[from] nvs_pg::PgErr),
}
