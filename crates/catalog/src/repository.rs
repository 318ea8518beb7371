use super::*;
use nvs_auth::Account;
use nvs_core::ID;
use nvs_pg::*;
use std::sync::Arc;
use tokio_postgres::Client;
use tokio_postgres::types::ToSql;

pub(crate) fn novel_row(row: &tokio_postgres::Row) -> Novel {
    Novel::new(
        ID::from(row.get::<_, i64>(0)),
        row.get::<_, String>(1),
        row.get::<_, String>(2),
        row.get::<_, f64>(3),
        row.get::<_, String>(4),
        row.get::<_, i32>(5),
    )
}

fn review_row(row: &tokio_postgres::Row) -> Review {
    Review::new(
        ID::from(row.get::<_, i64>(0)),
        row.get::<_, f64>(1),
        row.get::<_, String>(2),
        row.get::<_, Option<i64>>(3).map(ID::from),
        ID::from(row.get::<_, i64>(4)),
    )
}

fn post_row(row: &tokio_postgres::Row) -> Post {
    Post::new(
        ID::from(row.get::<_, i64>(0)),
        row.get::<_, String>(1),
        row.get::<_, String>(2),
        ID::from(row.get::<_, i64>(3)),
    )
}

/// Repository trait for novel storage operations.
#[allow(async_fn_in_trait)]
pub trait NovelRepository {
    async fn search(&self, filter: &NovelFilter) -> Result<Vec<Novel>, PgErr>;
    async fn novel(&self, id: ID<Novel>) -> Result<Option<Novel>, PgErr>;
    async fn create_novel(&self, draft: &NovelDraft) -> Result<Novel, PgErr>;
    async fn update_novel(&self, id: ID<Novel>, patch: &NovelPatch) -> Result<Option<Novel>, PgErr>;
    async fn delete_novel(&self, id: ID<Novel>) -> Result<bool, PgErr>;
}

impl NovelRepository for Arc<Client> {
    /// Filters compose conjunctively; absent fields do not constrain.
    async fn search(&self, filter: &NovelFilter) -> Result<Vec<Novel>, PgErr> {
        let mut sql = String::from(const_format::concatcp!(
            "SELECT id, title, author, rating, language, year_published FROM ",
            NOVELS
        ));
        let mut params: Vec<&(dyn ToSql + Sync)> = Vec::new();
        let mut clauses: Vec<String> = Vec::new();
        let title = filter.title.as_ref().map(|t| format!("%{}%", t));
        let author = filter.author.as_ref().map(|a| format!("%{}%", a));
        if let Some(ref t) = title {
            params.push(t);
            clauses.push(format!("title LIKE ${}", params.len()));
        }
        if let Some(ref a) = author {
            params.push(a);
            clauses.push(format!("author LIKE ${}", params.len()));
        }
        if let Some(ref language) = filter.language {
            params.push(language);
            clauses.push(format!("language = ${}", params.len()));
        }
        if let Some(ref year) = filter.year_published {
            params.push(year);
            clauses.push(format!("year_published = ${}", params.len()));
        }
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        self.query(sql.as_str(), &params)
            .await
            .map(|rows| rows.iter().map(novel_row).collect())
    }

    async fn novel(&self, id: ID<Novel>) -> Result<Option<Novel>, PgErr> {
        self.query_opt(
            const_format::concatcp!(
                "SELECT id, title, author, rating, language, year_published FROM ",
                NOVELS,
                " WHERE id = $1"
            ),
            &[&id.inner()],
        )
        .await
        .map(|opt| opt.as_ref().map(novel_row))
    }

    async fn create_novel(&self, draft: &NovelDraft) -> Result<Novel, PgErr> {
        self.query_one(
            const_format::concatcp!(
                "INSERT INTO ",
                NOVELS,
                " (title, author, rating, language, year_published)
                  VALUES ($1, $2, $3, $4, $5)
                  RETURNING id, title, author, rating, language, year_published"
            ),
            &[
                &draft.title,
                &draft.author,
                &draft.rating,
                &draft.language,
                &draft.year_published,
            ],
        )
        .await
        .map(|row| novel_row(&row))
    }

    /// Partial update: only supplied fields are touched. An empty patch
    /// degrades to a fetch.
    async fn update_novel(&self, id: ID<Novel>, patch: &NovelPatch) -> Result<Option<Novel>, PgErr> {
        let mut params: Vec<&(dyn ToSql + Sync)> = Vec::new();
        let mut sets: Vec<String> = Vec::new();
        if let Some(ref title) = patch.title {
            params.push(title);
            sets.push(format!("title = ${}", params.len()));
        }
        if let Some(ref author) = patch.author {
            params.push(author);
            sets.push(format!("author = ${}", params.len()));
        }
        if let Some(ref rating) = patch.rating {
            params.push(rating);
            sets.push(format!("rating = ${}", params.len()));
        }
        if let Some(ref language) = patch.language {
            params.push(language);
            sets.push(format!("language = ${}", params.len()));
        }
        if let Some(ref year) = patch.year_published {
            params.push(year);
            sets.push(format!("year_published = ${}", params.len()));
        }
        if sets.is_empty() {
            return self.novel(id).await;
        }
        let key = id.inner();
        params.push(&key);
        let sql = format!(
            "UPDATE {} SET {} WHERE id = ${} RETURNING id, title, author, rating, language, year_published",
            NOVELS,
            sets.join(", "),
            params.len(),
        );
        self.query_opt(sql.as_str(), &params)
            .await
            .map(|opt| opt.as_ref().map(novel_row))
    }

    /// Deleting a novel clears every row that references it in the same
    /// statement: bookmarks pointing at it and its reviews either all go
    /// with it or nothing goes.
    async fn delete_novel(&self, id: ID<Novel>) -> Result<bool, PgErr> {
        self.execute(
            const_format::concatcp!(
                "WITH cleared_bookmarks AS (DELETE FROM ",
                BOOKMARKS,
                " WHERE novel_id = $1),
                cleared_reviews AS (DELETE FROM ",
                REVIEWS,
                " WHERE novel_id = $1)
                DELETE FROM ",
                NOVELS,
                " WHERE id = $1"
            ),
            &[&id.inner()],
        )
        .await
        .map(|deleted| deleted > 0)
    }
}

/// Repository trait for review storage operations.
#[allow(async_fn_in_trait)]
pub trait ReviewRepository {
    async fn reviews_for(&self, novel: ID<Novel>) -> Result<Vec<Review>, PgErr>;
    async fn review(&self, id: ID<Review>) -> Result<Option<Review>, PgErr>;
    async fn create_review(
        &self,
        user: ID<Account>,
        novel: ID<Novel>,
        rating: f64,
        comment: &str,
    ) -> Result<Review, CatalogError>;
    async fn update_review(&self, id: ID<Review>, rating: f64, comment: &str) -> Result<(), PgErr>;
    async fn delete_review(&self, id: ID<Review>) -> Result<(), PgErr>;
}

impl ReviewRepository for Arc<Client> {
    async fn reviews_for(&self, novel: ID<Novel>) -> Result<Vec<Review>, PgErr> {
        self.query(
            const_format::concatcp!(
                "SELECT id, rating, comment, user_id, novel_id FROM ",
                REVIEWS,
                " WHERE novel_id = $1"
            ),
            &[&novel.inner()],
        )
        .await
        .map(|rows| rows.iter().map(review_row).collect())
    }

    async fn review(&self, id: ID<Review>) -> Result<Option<Review>, PgErr> {
        self.query_opt(
            const_format::concatcp!(
                "SELECT id, rating, comment, user_id, novel_id FROM ",
                REVIEWS,
                " WHERE id = $1"
            ),
            &[&id.inner()],
        )
        .await
        .map(|opt| opt.as_ref().map(review_row))
    }

    /// The novel reference is checked by the insert itself; a vanished
    /// novel surfaces as the target being absent, not a server fault.
    async fn create_review(
        &self,
        user: ID<Account>,
        novel: ID<Novel>,
        rating: f64,
        comment: &str,
    ) -> Result<Review, CatalogError> {
        self.query_one(
            const_format::concatcp!(
                "INSERT INTO ",
                REVIEWS,
                " (rating, comment, user_id, novel_id) VALUES ($1, $2, $3, $4)
                  RETURNING id, rating, comment, user_id, novel_id"
            ),
            &[&rating, &comment, &user.inner(), &novel.inner()],
        )
        .await
        .map(|row| review_row(&row))
        .map_err(absent_target)
    }

    async fn update_review(&self, id: ID<Review>, rating: f64, comment: &str) -> Result<(), PgErr> {
        self.execute(
            const_format::concatcp!(
                "UPDATE ",
                REVIEWS,
                " SET rating = $1, comment = $2 WHERE id = $3"
            ),
            &[&rating, &comment, &id.inner()],
        )
        .await
        .map(|_| ())
    }

    async fn delete_review(&self, id: ID<Review>) -> Result<(), PgErr> {
        self.execute(
            const_format::concatcp!("DELETE FROM ", REVIEWS, " WHERE id = $1"),
            &[&id.inner()],
        )
        .await
        .map(|_| ())
    }
}

/// Repository trait for post storage operations.
#[allow(async_fn_in_trait)]
pub trait PostRepository {
    async fn posts(&self) -> Result<Vec<Post>, PgErr>;
    async fn post(&self, id: ID<Post>) -> Result<Option<Post>, PgErr>;
    async fn create_post(&self, user: ID<Account>, title: &str, content: &str) -> Result<Post, PgErr>;
}

impl PostRepository for Arc<Client> {
    async fn posts(&self) -> Result<Vec<Post>, PgErr> {
        self.query(
            const_format::concatcp!("SELECT id, title, content, user_id FROM ", POSTS),
            &[],
        )
        .await
        .map(|rows| rows.iter().map(post_row).collect())
    }

    async fn post(&self, id: ID<Post>) -> Result<Option<Post>, PgErr> {
        self.query_opt(
            const_format::concatcp!(
                "SELECT id, title, content, user_id FROM ",
                POSTS,
                " WHERE id = $1"
            ),
            &[&id.inner()],
        )
        .await
        .map(|opt| opt.as_ref().map(post_row))
    }

    async fn create_post(&self, user: ID<Account>, title: &str, content: &str) -> Result<Post, PgErr> {
        self.query_one(
            const_format::concatcp!(
                "INSERT INTO ",
                POSTS,
                " (title, content, user_id) VALUES ($1, $2, $3)
                  RETURNING id, title, content, user_id"
            ),
            &[&title, &content, &user.inner()],
        )
        .await
        .map(|row| post_row(&row))
    }
}

/// Repository trait for class storage operations. Membership is the
/// enrollment association's concern.
#[allow(async_fn_in_trait)]
pub trait ClassRepository {
    async fn create_class(&self, name: &str, code: &str) -> Result<Class, PgErr>;
    async fn class(&self, id: ID<Class>) -> Result<Option<Class>, PgErr>;
}

impl ClassRepository for Arc<Client> {
    async fn create_class(&self, name: &str, code: &str) -> Result<Class, PgErr> {
        self.query_one(
            const_format::concatcp!(
                "INSERT INTO ",
                CLASSES,
                " (name, code) VALUES ($1, $2) RETURNING id, name, code"
            ),
            &[&name, &code],
        )
        .await
        .map(|row| {
            Class::new(
                ID::from(row.get::<_, i64>(0)),
                row.get::<_, String>(1),
                row.get::<_, String>(2),
            )
        })
    }

    async fn class(&self, id: ID<Class>) -> Result<Option<Class>, PgErr> {
        self.query_opt(
            const_format::concatcp!("SELECT id, name, code FROM ", CLASSES, " WHERE id = $1"),
            &[&id.inner()],
        )
        .await
        .map(|opt| {
            opt.map(|row| {
                Class::new(
                    ID::from(row.get::<_, i64>(0)),
                    row.get::<_, String>(1),
                    row.get::<_, String>(2),
                )
            })
        })
    }
}
