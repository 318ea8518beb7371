use nvs_core::ID;
use nvs_core::Unique;

/// Catalogued novel.
#[derive(Debug, Clone, PartialEq)]
pub struct Novel {
    id: ID<Self>,
    title: String,
    author: String,
    rating: f64,
    language: String,
    year_published: i32,
}

impl Novel {
    pub fn new(
        id: ID<Self>,
        title: String,
        author: String,
        rating: f64,
        language: String,
        year_published: i32,
    ) -> Self {
        Self {
            id,
            title,
            author,
            rating,
            language,
            year_published,
        }
    }
    pub fn title(&self) -> &str {
        &self.title
    }
    pub fn author(&self) -> &str {
        &self.author
    }
    pub fn rating(&self) -> f64 {
        self.rating
    }
    pub fn language(&self) -> &str {
        &self.language
    }
    pub fn year_published(&self) -> i32 {
        self.year_published
    }
}

impl Unique for Novel {
    fn id(&self) -> ID<Self> {
        self.id
    }
}

mod schema {
    use nvs_pg::*;

    impl Schema for super::Novel {
        fn name() -> &'static str {
            NOVELS
        }
        fn creates() -> &'static str {
            const_format::concatcp!(
                "CREATE TABLE IF NOT EXISTS ",
                NOVELS,
                " (
                    id              BIGSERIAL PRIMARY KEY,
                    title           VARCHAR(255) NOT NULL,
                    author          VARCHAR(255) NOT NULL,
                    rating          DOUBLE PRECISION NOT NULL DEFAULT 0,
                    language        VARCHAR(64) NOT NULL,
                    year_published  INTEGER NOT NULL
                );"
            )
        }
        fn indices() -> &'static str {
            const_format::concatcp!(
                "CREATE INDEX IF NOT EXISTS idx_novels_author ON ",
                NOVELS,
                " (author);
                 CREATE INDEX IF NOT EXISTS idx_novels_language ON ",
                NOVELS,
                " (language);"
            )
        }
    }
}
