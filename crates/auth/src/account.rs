use super::*;
use nvs_core::ID;
use nvs_core::Unique;

/// Registered account with verified identity.
///
/// The password credential is not part of this type; it lives only in
/// storage as an Argon2 hash and never travels with the account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    id: ID<Self>,
    name: String,
    email: String,
    role: Role,
}

impl Account {
    pub fn new(id: ID<Self>, name: String, email: String, role: Role) -> Self {
        Self {
            id,
            name,
            email,
            role,
        }
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn email(&self) -> &str {
        &self.email
    }
    pub fn role(&self) -> Role {
        self.role
    }
}

impl Unique for Account {
    fn id(&self) -> ID<Self> {
        self.id
    }
}

#[cfg(feature = "database")]
mod schema {
    use nvs_pg::*;

    /// Schema implementation for Account (users table).
    /// Note: hashword is a database-only column, not part of the Account
    /// domain type. The role CHECK keeps the tag set closed at the store.
    impl Schema for super::Account {
        fn name() -> &'static str {
            USERS
        }
        fn creates() -> &'static str {
            const_format::concatcp!(
                "CREATE TABLE IF NOT EXISTS ",
                USERS,
                " (
                    id        BIGSERIAL PRIMARY KEY,
                    name      VARCHAR(255) NOT NULL,
                    email     VARCHAR(255) UNIQUE NOT NULL,
                    hashword  TEXT NOT NULL,
                    role      VARCHAR(16) NOT NULL DEFAULT 'user'
                              CHECK (role IN ('user', 'admin'))
                );"
            )
        }
        fn indices() -> &'static str {
            const_format::concatcp!(
                "CREATE INDEX IF NOT EXISTS idx_users_email ON ",
                USERS,
                " (email);"
            )
        }
    }
}
