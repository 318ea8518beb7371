use nvs_auth::Account;
use nvs_core::ID;
use nvs_core::Unique;

/// Reader review of a novel. The author reference is nullable: reviews
/// outlive deleted accounts with the reference cleared.
#[derive(Debug, Clone, PartialEq)]
pub struct Review {
    id: ID<Self>,
    rating: f64,
    comment: String,
    user: Option<ID<Account>>,
    novel: ID<super::Novel>,
}

impl Review {
    pub fn new(
        id: ID<Self>,
        rating: f64,
        comment: String,
        user: Option<ID<Account>>,
        novel: ID<super::Novel>,
    ) -> Self {
        Self {
            id,
            rating,
            comment,
            user,
            novel,
        }
    }
    pub fn rating(&self) -> f64 {
        self.rating
    }
    pub fn comment(&self) -> &str {
        &self.comment
    }
    pub fn user(&self) -> Option<ID<Account>> {
        self.user
    }
    pub fn novel(&self) -> ID<super::Novel> {
        self.novel
    }
    /// Review mutation policy: the author, or an admin.
    pub fn editable_by(&self, account: &Account) -> bool {
        self.user == Some(account.id()) || account.role().permits(nvs_auth::Role::Admin)
    }
}

impl Unique for Review {
    fn id(&self) -> ID<Self> {
        self.id
    }
}

mod schema {
    use nvs_pg::*;

    /// Referential integrity is declared, but cascade behavior on account
    /// and novel deletion is owned explicitly by the deletion statements,
    /// not by the constraints.
    impl Schema for super::Review {
        fn name() -> &'static str {
            REVIEWS
        }
        fn creates() -> &'static str {
            const_format::concatcp!(
                "CREATE TABLE IF NOT EXISTS ",
                REVIEWS,
                " (
                    id          BIGSERIAL PRIMARY KEY,
                    rating      DOUBLE PRECISION NOT NULL,
                    comment     TEXT NOT NULL,
                    user_id     BIGINT REFERENCES ",
                USERS,
                "(id),
                    novel_id    BIGINT NOT NULL REFERENCES ",
                NOVELS,
                "(id),
                    created_at  TIMESTAMPTZ NOT NULL DEFAULT now()
                );"
            )
        }
        fn indices() -> &'static str {
            const_format::concatcp!(
                "CREATE INDEX IF NOT EXISTS idx_reviews_novel ON ",
                REVIEWS,
                " (novel_id);
                 CREATE INDEX IF NOT EXISTS idx_reviews_user ON ",
                REVIEWS,
                " (user_id);"
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nvs_auth::Role;

    fn account(id: i64, role: Role) -> Account {
        Account::new(
            ID::from(id),
            "Reader".to_string(),
            "reader@example.com".to_string(),
            role,
        )
    }

    #[test]
    fn author_and_admin_may_edit() {
        let review = Review::new(ID::from(1), 4.0, "tight plot".to_string(), Some(ID::from(7)), ID::from(42));
        assert!(review.editable_by(&account(7, Role::User)));
        assert!(review.editable_by(&account(9, Role::Admin)));
        assert!(!review.editable_by(&account(9, Role::User)));
    }

    #[test]
    fn orphaned_review_is_admin_only() {
        let review = Review::new(ID::from(1), 4.0, "tight plot".to_string(), None, ID::from(42));
        assert!(!review.editable_by(&account(7, Role::User)));
        assert!(review.editable_by(&account(9, Role::Admin)));
    }
}
