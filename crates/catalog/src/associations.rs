use super::*;
use nvs_auth::Account;
use nvs_auth::Role;
use nvs_core::ID;
use nvs_pg::*;
use std::sync::Arc;
use tokio_postgres::Client;

/// Bookmark association row marker: (user, novel), unordered, at most one
/// row per pair. The composite primary key is the invariant concurrent
/// adds serialize on.
pub struct Bookmark;

mod bookmark_schema {
    use nvs_pg::*;

    impl Schema for super::Bookmark {
        fn name() -> &'static str {
            BOOKMARKS
        }
        fn creates() -> &'static str {
            const_format::concatcp!(
                "CREATE TABLE IF NOT EXISTS ",
                BOOKMARKS,
                " (
                    user_id   BIGINT NOT NULL REFERENCES ",
                USERS,
                "(id),
                    novel_id  BIGINT NOT NULL REFERENCES ",
                NOVELS,
                "(id),
                    PRIMARY KEY (user_id, novel_id)
                );"
            )
        }
        fn indices() -> &'static str {
            const_format::concatcp!(
                "CREATE INDEX IF NOT EXISTS idx_bookmarks_novel ON ",
                BOOKMARKS,
                " (novel_id);"
            )
        }
    }
}

/// Enrollment association row marker: (user, class).
pub struct Enrollment;

mod enrollment_schema {
    use nvs_pg::*;

    impl Schema for super::Enrollment {
        fn name() -> &'static str {
            ENROLLMENTS
        }
        fn creates() -> &'static str {
            const_format::concatcp!(
                "CREATE TABLE IF NOT EXISTS ",
                ENROLLMENTS,
                " (
                    user_id   BIGINT NOT NULL REFERENCES ",
                USERS,
                "(id),
                    class_id  BIGINT NOT NULL REFERENCES ",
                CLASSES,
                "(id),
                    PRIMARY KEY (user_id, class_id)
                );"
            )
        }
        fn indices() -> &'static str {
            const_format::concatcp!(
                "CREATE INDEX IF NOT EXISTS idx_enrollments_class ON ",
                ENROLLMENTS,
                " (class_id);"
            )
        }
    }
}

/// Association manager for user bookmarks of novels.
///
/// Add and remove are idempotent: repeating an add or removing an absent
/// row is success, not an error. The owner is always the authenticated
/// caller; only the target comes from outside.
#[allow(async_fn_in_trait)]
pub trait BookmarkRepository {
    async fn add(&self, owner: ID<Account>, novel: ID<Novel>) -> Result<(), CatalogError>;
    async fn remove(&self, owner: ID<Account>, novel: ID<Novel>) -> Result<(), CatalogError>;
    async fn list(&self, owner: ID<Account>) -> Result<Vec<Novel>, CatalogError>;
}

/// Association manager for class membership. Same contract as bookmarks.
#[allow(async_fn_in_trait)]
pub trait EnrollmentRepository {
    async fn join(&self, member: ID<Account>, class: ID<Class>) -> Result<(), CatalogError>;
    async fn leave(&self, member: ID<Account>, class: ID<Class>) -> Result<(), CatalogError>;
    async fn mine(&self, member: ID<Account>) -> Result<Vec<Class>, CatalogError>;
    async fn roster(&self, class: ID<Class>) -> Result<Vec<Account>, CatalogError>;
}

/// A foreign-key violation on insert means the target row is gone; the
/// insert and the existence check are one statement, so there is no
/// window for the target to vanish in between.
pub(crate) fn absent_target(e: PgErr) -> CatalogError {
    match e.code() == Some(&tokio_postgres::error::SqlState::FOREIGN_KEY_VIOLATION) {
        true => CatalogError::TargetNotFound,
        false => CatalogError::Storage(e),
    }
}

impl BookmarkRepository for Arc<Client> {
    async fn add(&self, owner: ID<Account>, novel: ID<Novel>) -> Result<(), CatalogError> {
        self.execute(
            const_format::concatcp!(
                "INSERT INTO ",
                BOOKMARKS,
                " (user_id, novel_id) VALUES ($1, $2) ON CONFLICT DO NOTHING"
            ),
            &[&owner.inner(), &novel.inner()],
        )
        .await
        .map(|_| ())
        .map_err(absent_target)
    }

    async fn remove(&self, owner: ID<Account>, novel: ID<Novel>) -> Result<(), CatalogError> {
        self.execute(
            const_format::concatcp!(
                "DELETE FROM ",
                BOOKMARKS,
                " WHERE user_id = $1 AND novel_id = $2"
            ),
            &[&owner.inner(), &novel.inner()],
        )
        .await
        .map(|_| ())
        .map_err(CatalogError::from)
    }

    async fn list(&self, owner: ID<Account>) -> Result<Vec<Novel>, CatalogError> {
        self.query(
            const_format::concatcp!(
                "SELECT n.id, n.title, n.author, n.rating, n.language, n.year_published FROM ",
                NOVELS,
                " n JOIN ",
                BOOKMARKS,
                " b ON b.novel_id = n.id WHERE b.user_id = $1"
            ),
            &[&owner.inner()],
        )
        .await
        .map(|rows| rows.iter().map(novel_row).collect())
        .map_err(CatalogError::from)
    }
}

impl EnrollmentRepository for Arc<Client> {
    async fn join(&self, member: ID<Account>, class: ID<Class>) -> Result<(), CatalogError> {
        self.execute(
            const_format::concatcp!(
                "INSERT INTO ",
                ENROLLMENTS,
                " (user_id, class_id) VALUES ($1, $2) ON CONFLICT DO NOTHING"
            ),
            &[&member.inner(), &class.inner()],
        )
        .await
        .map(|_| ())
        .map_err(absent_target)
    }

    async fn leave(&self, member: ID<Account>, class: ID<Class>) -> Result<(), CatalogError> {
        self.execute(
            const_format::concatcp!(
                "DELETE FROM ",
                ENROLLMENTS,
                " WHERE user_id = $1 AND class_id = $2"
            ),
            &[&member.inner(), &class.inner()],
        )
        .await
        .map(|_| ())
        .map_err(CatalogError::from)
    }

    async fn mine(&self, member: ID<Account>) -> Result<Vec<Class>, CatalogError> {
        self.query(
            const_format::concatcp!(
                "SELECT c.id, c.name, c.code FROM ",
                CLASSES,
                " c JOIN ",
                ENROLLMENTS,
                " e ON e.class_id = c.id WHERE e.user_id = $1"
            ),
            &[&member.inner()],
        )
        .await
        .map(|rows| {
            rows.iter()
                .map(|row| {
                    Class::new(
                        ID::from(row.get::<_, i64>(0)),
                        row.get::<_, String>(1),
                        row.get::<_, String>(2),
                    )
                })
                .collect()
        })
        .map_err(CatalogError::from)
    }

    async fn roster(&self, class: ID<Class>) -> Result<Vec<Account>, CatalogError> {
        self.query(
            const_format::concatcp!(
                "SELECT u.id, u.name, u.email, u.role FROM ",
                USERS,
                " u JOIN ",
                ENROLLMENTS,
                " e ON e.user_id = u.id WHERE e.class_id = $1"
            ),
            &[&class.inner()],
        )
        .await
        .map_err(CatalogError::from)?
        .iter()
        .map(|row| -> Result<Account, CatalogError> {
            Ok(Account::new(
                ID::from(row.get::<_, i64>(0)),
                row.get::<_, String>(1),
                row.get::<_, String>(2),
                row.get::<_, String>(3).parse::<Role>()?,
            ))
        })
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nvs_core::Unique;
    use std::collections::BTreeSet;
    use std::sync::Mutex;

    /// In-memory double with the same contract as the store: set
    /// semantics stand in for the composite primary key.
    struct Shelf {
        novels: BTreeSet<i64>,
        rows: Mutex<BTreeSet<(i64, i64)>>,
    }

    impl Shelf {
        fn with_novels(novels: &[i64]) -> Self {
            Self {
                novels: novels.iter().copied().collect(),
                rows: Mutex::new(BTreeSet::new()),
            }
        }
        /// Owner deletion contract: clearing rows and removing the owner
        /// happen as one step or not at all.
        fn purge(&self, owner: ID<Account>, owners: &mut BTreeSet<i64>) -> Result<(), CatalogError> {
            match owners.remove(&owner.inner()) {
                true => {
                    self.rows.lock().unwrap().retain(|(o, _)| *o != owner.inner());
                    Ok(())
                }
                false => Err(CatalogError::TargetNotFound),
            }
        }
    }

    impl BookmarkRepository for Shelf {
        async fn add(&self, owner: ID<Account>, novel: ID<Novel>) -> Result<(), CatalogError> {
            match self.novels.contains(&novel.inner()) {
                true => {
                    self.rows.lock().unwrap().insert((owner.inner(), novel.inner()));
                    Ok(())
                }
                false => Err(CatalogError::TargetNotFound),
            }
        }
        async fn remove(&self, owner: ID<Account>, novel: ID<Novel>) -> Result<(), CatalogError> {
            self.rows.lock().unwrap().remove(&(owner.inner(), novel.inner()));
            Ok(())
        }
        async fn list(&self, owner: ID<Account>) -> Result<Vec<Novel>, CatalogError> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|(o, _)| *o == owner.inner())
                .map(|(_, n)| {
                    Novel::new(
                        ID::from(*n),
                        String::new(),
                        String::new(),
                        0.0,
                        String::new(),
                        0,
                    )
                })
                .collect())
        }
    }

    #[tokio::test]
    async fn add_is_idempotent() {
        let shelf = Shelf::with_novels(&[42]);
        shelf.add(ID::from(7), ID::from(42)).await.unwrap();
        shelf.add(ID::from(7), ID::from(42)).await.unwrap();
        let marked = shelf.list(ID::from(7)).await.unwrap();
        assert_eq!(marked.len(), 1);
        assert_eq!(marked[0].id(), ID::from(42));
    }

    #[tokio::test]
    async fn remove_of_absent_row_is_success() {
        let shelf = Shelf::with_novels(&[42]);
        shelf.remove(ID::from(7), ID::from(42)).await.unwrap();
        shelf.add(ID::from(7), ID::from(42)).await.unwrap();
        shelf.remove(ID::from(7), ID::from(42)).await.unwrap();
        shelf.remove(ID::from(7), ID::from(42)).await.unwrap();
        assert!(shelf.list(ID::from(7)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn add_against_missing_target_is_rejected() {
        let shelf = Shelf::with_novels(&[42]);
        assert!(matches!(
            shelf.add(ID::from(7), ID::from(43)).await,
            Err(CatalogError::TargetNotFound)
        ));
        assert!(shelf.list(ID::from(7)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn owner_deletion_leaves_no_dangling_rows() {
        let shelf = Shelf::with_novels(&[41, 42, 43]);
        let ref mut owners: BTreeSet<i64> = [7, 8].into_iter().collect();
        shelf.add(ID::from(7), ID::from(41)).await.unwrap();
        shelf.add(ID::from(7), ID::from(42)).await.unwrap();
        shelf.add(ID::from(8), ID::from(43)).await.unwrap();
        shelf.purge(ID::from(7), owners).unwrap();
        assert!(shelf.list(ID::from(7)).await.unwrap().is_empty());
        assert_eq!(shelf.list(ID::from(8)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn failed_owner_deletion_changes_nothing() {
        let shelf = Shelf::with_novels(&[42]);
        let ref mut owners: BTreeSet<i64> = [7].into_iter().collect();
        shelf.add(ID::from(7), ID::from(42)).await.unwrap();
        assert!(shelf.purge(ID::from(9), owners).is_err());
        assert_eq!(shelf.list(ID::from(7)).await.unwrap().len(), 1);
        assert!(owners.contains(&7));
    }
}
