//! PostgreSQL connectivity and schema management.
//!
//! Low-level database bootstrap plus compile-time DDL generation for every
//! persisted entity.
//!
//! ## Connectivity
//!
//! - [`db()`] — Establishes a database connection from `DB_URL`
//!
//! ## Schema
//!
//! - [`Schema`] — Table metadata and DDL generation
//! - [`migrate()`] — Replays DDL for one entity at startup
//!
//! ## Table Names
//!
//! Constants for all persistent entities: accounts, novels, reviews, posts,
//! classes, and the two association tables.

use std::sync::Arc;
use tokio_postgres::Client;

/// Establishes a database connection.
///
/// Connects to PostgreSQL using the `DB_URL` environment variable.
/// Returns an `Arc<Client>` suitable for sharing across async tasks.
///
/// # Panics
///
/// Panics if `DB_URL` is not set or if connection fails.
pub async fn db() -> Arc<Client> {
    log::info!("connecting to database");
    let tls = tokio_postgres::tls::NoTls;
    let ref url = std::env::var("DB_URL").expect("DB_URL must be set");
    let (client, connection) = tokio_postgres::connect(url, tls)
        .await
        .expect("database connection failed");
    tokio::spawn(connection);
    client
        .execute("SET client_min_messages TO WARNING", &[])
        .await
        .expect("set client_min_messages");
    Arc::new(client)
}

/// PostgreSQL error type alias.
pub type PgErr = tokio_postgres::Error;

/// Table for registered user accounts.
#[rustfmt::skip]
pub const USERS:       &str = "users";
/// Table for catalogued novels.
#[rustfmt::skip]
pub const NOVELS:      &str = "novels";
/// Table for reader reviews of novels.
#[rustfmt::skip]
pub const REVIEWS:     &str = "reviews";
/// Table for member-authored posts.
#[rustfmt::skip]
pub const POSTS:       &str = "posts";
/// Table for reading classes.
#[rustfmt::skip]
pub const CLASSES:     &str = "classes";
/// Association table for user bookmarks of novels.
#[rustfmt::skip]
pub const BOOKMARKS:   &str = "user_bookmarks";
/// Association table for user enrollment in classes.
#[rustfmt::skip]
pub const ENROLLMENTS: &str = "user_classes";

/// Schema metadata for PostgreSQL tables.
///
/// Provides compile-time SQL generation for table creation and indexing.
/// All methods return `&'static str` to enable compile-time string
/// construction via [`const_format::concatcp!`].
///
/// This trait contains no I/O operations, it purely describes table
/// structure. The uniqueness and cascade rules each table relies on are
/// stated here in the DDL rather than left to storage-library defaults.
pub trait Schema {
    /// Returns the table name in the database.
    fn name() -> &'static str;
    /// Returns `CREATE TABLE IF NOT EXISTS` DDL statement.
    fn creates() -> &'static str;
    /// Returns `CREATE INDEX IF NOT EXISTS` statements for all indices.
    fn indices() -> &'static str;
}

/// Replays the DDL for one entity. Idempotent: every statement is
/// `IF NOT EXISTS`.
pub async fn migrate<S>(client: &Client) -> Result<(), PgErr>
where
    S: Schema,
{
    log::debug!("migrating table {}", S::name());
    client.batch_execute(S::creates()).await?;
    client.batch_execute(S::indices()).await?;
    Ok(())
}
