use super::*;
use nvs_core::ID;
use nvs_pg::*;
use std::sync::Arc;
use tokio_postgres::Client;

/// Repository trait for account storage operations.
/// Abstracts SQL from domain modules and keeps handlers fake-testable.
#[allow(async_fn_in_trait)]
pub trait AccountRepository {
    async fn exists(&self, email: &str) -> Result<bool, AuthError>;
    async fn create(&self, name: &str, email: &str, hashword: &str) -> Result<ID<Account>, AuthError>;
    async fn by_email(&self, email: &str) -> Result<Option<(Account, String)>, AuthError>;
    async fn by_id(&self, id: ID<Account>) -> Result<Option<Account>, AuthError>;
    async fn delete_cascade(&self, id: ID<Account>) -> Result<bool, AuthError>;
}

/// An unknown role tag in storage is corruption, surfaced as an error
/// rather than silently downgraded.
fn hydrate(row: &tokio_postgres::Row) -> Result<Account, AuthError> {
    Ok(Account::new(
        ID::from(row.get::<_, i64>(0)),
        row.get::<_, String>(1),
        row.get::<_, String>(2),
        row.get::<_, String>(3).parse::<Role>()?,
    ))
}

impl AccountRepository for Arc<Client> {
    async fn exists(&self, email: &str) -> Result<bool, AuthError> {
        self.query_opt(
            const_format::concatcp!("SELECT 1 FROM ", USERS, " WHERE email = $1"),
            &[&email],
        )
        .await
        .map(|opt| opt.is_some())
        .map_err(AuthError::from)
    }

    /// New accounts always start with the default role; promotion is a
    /// separate administrative concern.
    async fn create(&self, name: &str, email: &str, hashword: &str) -> Result<ID<Account>, AuthError> {
        self.query_one(
            const_format::concatcp!(
                "INSERT INTO ",
                USERS,
                " (name, email, hashword) VALUES ($1, $2, $3) RETURNING id"
            ),
            &[&name, &email, &hashword],
        )
        .await
        .map(|row| ID::from(row.get::<_, i64>(0)))
        .map_err(AuthError::from)
    }

    async fn by_email(&self, email: &str) -> Result<Option<(Account, String)>, AuthError> {
        match self
            .query_opt(
                const_format::concatcp!(
                    "SELECT id, name, email, role, hashword FROM ",
                    USERS,
                    " WHERE email = $1"
                ),
                &[&email],
            )
            .await?
        {
            Some(row) => Ok(Some((hydrate(&row)?, row.get::<_, String>(4)))),
            None => Ok(None),
        }
    }

    async fn by_id(&self, id: ID<Account>) -> Result<Option<Account>, AuthError> {
        match self
            .query_opt(
                const_format::concatcp!(
                    "SELECT id, name, email, role FROM ",
                    USERS,
                    " WHERE id = $1"
                ),
                &[&id.inner()],
            )
            .await?
        {
            Some(row) => Ok(Some(hydrate(&row)?)),
            None => Ok(None),
        }
    }

    /// Clearing association rows and deleting the owner are one SQL
    /// statement, so the store's statement-level atomicity guarantees no
    /// owner-less association rows can ever be observed. Reviews outlive
    /// their author with the author reference nulled; posts go with their
    /// author.
    async fn delete_cascade(&self, id: ID<Account>) -> Result<bool, AuthError> {
        self.execute(
            const_format::concatcp!(
                "WITH cleared_bookmarks AS (DELETE FROM ",
                BOOKMARKS,
                " WHERE user_id = $1),
                cleared_enrollments AS (DELETE FROM ",
                ENROLLMENTS,
                " WHERE user_id = $1),
                cleared_posts AS (DELETE FROM ",
                POSTS,
                " WHERE user_id = $1),
                orphaned_reviews AS (UPDATE ",
                REVIEWS,
                " SET user_id = NULL WHERE user_id = $1)
                DELETE FROM ",
                USERS,
                " WHERE id = $1"
            ),
            &[&id.inner()],
        )
        .await
        .map(|deleted| deleted > 0)
        .map_err(AuthError::from)
    }
}
