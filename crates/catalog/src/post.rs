use nvs_auth::Account;
use nvs_core::ID;
use nvs_core::Unique;

/// Member-authored post. Posts go with their author on account deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    id: ID<Self>,
    title: String,
    content: String,
    user: ID<Account>,
}

impl Post {
    pub fn new(id: ID<Self>, title: String, content: String, user: ID<Account>) -> Self {
        Self {
            id,
            title,
            content,
            user,
        }
    }
    pub fn title(&self) -> &str {
        &self.title
    }
    pub fn content(&self) -> &str {
        &self.content
    }
    pub fn user(&self) -> ID<Account> {
        self.user
    }
}

impl Unique for Post {
    fn id(&self) -> ID<Self> {
        self.id
    }
}

mod schema {
    use nvs_pg::*;

    impl Schema for super::Post {
        fn name() -> &'static str {
            POSTS
        }
        fn creates() -> &'static str {
            const_format::concatcp!(
                "CREATE TABLE IF NOT EXISTS ",
                POSTS,
                " (
                    id          BIGSERIAL PRIMARY KEY,
                    title       VARCHAR(255) NOT NULL,
                    content     TEXT NOT NULL,
                    user_id     BIGINT NOT NULL REFERENCES ",
                USERS,
                "(id),
                    created_at  TIMESTAMPTZ NOT NULL DEFAULT now()
                );"
            )
        }
        fn indices() -> &'static str {
            const_format::concatcp!(
                "CREATE INDEX IF NOT EXISTS idx_posts_user ON ",
                POSTS,
                " (user_id);"
            )
        }
    }
}
