use super::*;
use nvs_core::Unique;
use serde::Deserialize;
use serde::Serialize;

#[derive(Deserialize)]
pub struct NovelDraft {
    pub title: String,
    pub author: String,
    pub rating: f64,
    pub language: String,
    pub year_published: i32,
}

/// Absent fields leave the stored value untouched.
#[derive(Deserialize, Default)]
pub struct NovelPatch {
    pub title: Option<String>,
    pub author: Option<String>,
    pub rating: Option<f64>,
    pub language: Option<String>,
    pub year_published: Option<i32>,
}

/// Query-string filters for the public novel listing.
#[derive(Deserialize, Default)]
pub struct NovelFilter {
    pub title: Option<String>,
    pub author: Option<String>,
    pub language: Option<String>,
    pub year_published: Option<i32>,
}

#[derive(Deserialize)]
pub struct ReviewDraft {
    pub rating: f64,
    pub comment: String,
}

#[derive(Deserialize)]
pub struct PostDraft {
    pub title: String,
    pub content: String,
}

#[derive(Deserialize)]
pub struct ClassDraft {
    pub name: String,
    pub code: String,
}

#[derive(Serialize)]
pub struct NovelInfo {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub rating: f64,
    pub language: String,
    pub year_published: i32,
}

impl From<&Novel> for NovelInfo {
    fn from(novel: &Novel) -> Self {
        Self {
            id: novel.id().inner(),
            title: novel.title().to_string(),
            author: novel.author().to_string(),
            rating: novel.rating(),
            language: novel.language().to_string(),
            year_published: novel.year_published(),
        }
    }
}

#[derive(Serialize)]
pub struct ReviewInfo {
    pub id: i64,
    pub rating: f64,
    pub comment: String,
    pub user_id: Option<i64>,
    pub novel_id: i64,
}

impl From<&Review> for ReviewInfo {
    fn from(review: &Review) -> Self {
        Self {
            id: review.id().inner(),
            rating: review.rating(),
            comment: review.comment().to_string(),
            user_id: review.user().map(|id| id.inner()),
            novel_id: review.novel().inner(),
        }
    }
}

#[derive(Serialize)]
pub struct PostInfo {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub user_id: i64,
}

impl From<&Post> for PostInfo {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id().inner(),
            title: post.title().to_string(),
            content: post.content().to_string(),
            user_id: post.user().inner(),
        }
    }
}

#[derive(Serialize)]
pub struct ClassInfo {
    pub id: i64,
    pub name: String,
    pub code: String,
}

impl From<&Class> for ClassInfo {
    fn from(class: &Class) -> Self {
        Self {
            id: class.id().inner(),
            name: class.name().to_string(),
            code: class.code().to_string(),
        }
    }
}
