use nvs_core::ID;
use nvs_core::Unique;

/// Reading class. Membership lives in the enrollment association table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Class {
    id: ID<Self>,
    name: String,
    code: String,
}

impl Class {
    pub fn new(id: ID<Self>, name: String, code: String) -> Self {
        Self { id, name, code }
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn code(&self) -> &str {
        &self.code
    }
}

impl Unique for Class {
    fn id(&self) -> ID<Self> {
        self.id
    }
}

mod schema {
    use nvs_pg::*;

    impl Schema for super::Class {
        fn name() -> &'static str {
            CLASSES
        }
        fn creates() -> &'static str {
            const_format::concatcp!(
                "CREATE TABLE IF NOT EXISTS ",
                CLASSES,
                " (
                    id    BIGSERIAL PRIMARY KEY,
                    name  VARCHAR(255) NOT NULL,
                    code  VARCHAR(100) UNIQUE NOT NULL
                );"
            )
        }
        fn indices() -> &'static str {
            const_format::concatcp!(
                "CREATE INDEX IF NOT EXISTS idx_classes_code ON ",
                CLASSES,
                " (code);"
            )
        }
    }
}
