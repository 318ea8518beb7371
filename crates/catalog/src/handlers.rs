use super::*;
use nvs_auth::Admin;
use nvs_auth::Auth;
use nvs_auth::UserInfo;
use nvs_core::ID;
use actix_web::HttpResponse;
use actix_web::Responder;
use actix_web::web;
use std::sync::Arc;
use tokio_postgres::Client;

/// Internal faults are logged with their cause and reported without it.
fn internal<E>(context: &str, e: &E) -> HttpResponse
where
    E: std::fmt::Display,
{
    log::error!("{}: {}", context, e);
    HttpResponse::InternalServerError().json(serde_json::json!({ "error": "internal error" }))
}

// ============================================================================
// NOVELS
// ============================================================================
pub async fn list_novels(
    db: web::Data<Arc<Client>>,
    filter: web::Query<NovelFilter>,
) -> impl Responder {
    match db.search(&filter).await {
        Ok(novels) => HttpResponse::Ok().json(serde_json::json!({
            "novels": novels.iter().map(NovelInfo::from).collect::<Vec<_>>()
        })),
        Err(e) => internal("novel search failed", &e),
    }
}

pub async fn get_novel(db: web::Data<Arc<Client>>, path: web::Path<i64>) -> impl Responder {
    match db.novel(ID::from(path.into_inner())).await {
        Ok(Some(novel)) => {
            HttpResponse::Ok().json(serde_json::json!({ "novel": NovelInfo::from(&novel) }))
        }
        Ok(None) => {
            HttpResponse::NotFound().json(serde_json::json!({ "error": "novel not found" }))
        }
        Err(e) => internal("novel fetch failed", &e),
    }
}

pub async fn create_novel(
    db: web::Data<Arc<Client>>,
    _admin: Admin,
    draft: web::Json<NovelDraft>,
) -> impl Responder {
    match db.create_novel(&draft).await {
        Ok(novel) => {
            HttpResponse::Created().json(serde_json::json!({ "novel": NovelInfo::from(&novel) }))
        }
        Err(e) => internal("novel create failed", &e),
    }
}

pub async fn update_novel(
    db: web::Data<Arc<Client>>,
    _admin: Admin,
    path: web::Path<i64>,
    patch: web::Json<NovelPatch>,
) -> impl Responder {
    match db.update_novel(ID::from(path.into_inner()), &patch).await {
        Ok(Some(novel)) => {
            HttpResponse::Ok().json(serde_json::json!({ "novel": NovelInfo::from(&novel) }))
        }
        Ok(None) => {
            HttpResponse::NotFound().json(serde_json::json!({ "error": "novel not found" }))
        }
        Err(e) => internal("novel update failed", &e),
    }
}

pub async fn remove_novel(
    db: web::Data<Arc<Client>>,
    _admin: Admin,
    path: web::Path<i64>,
) -> impl Responder {
    match db.delete_novel(ID::from(path.into_inner())).await {
        Ok(true) => HttpResponse::Ok().json(serde_json::json!({ "message": "novel deleted" })),
        Ok(false) => {
            HttpResponse::NotFound().json(serde_json::json!({ "error": "novel not found" }))
        }
        Err(e) => internal("novel delete failed", &e),
    }
}

// ============================================================================
// REVIEWS
// ============================================================================
pub async fn novel_reviews(db: web::Data<Arc<Client>>, path: web::Path<i64>) -> impl Responder {
    match db.reviews_for(ID::from(path.into_inner())).await {
        Ok(reviews) => HttpResponse::Ok().json(serde_json::json!({
            "reviews": reviews.iter().map(ReviewInfo::from).collect::<Vec<_>>()
        })),
        Err(e) => internal("review listing failed", &e),
    }
}

pub async fn create_review(
    db: web::Data<Arc<Client>>,
    auth: Auth,
    path: web::Path<i64>,
    draft: web::Json<ReviewDraft>,
) -> impl Responder {
    let novel: ID<Novel> = ID::from(path.into_inner());
    match db
        .create_review(auth.user(), novel, draft.rating, &draft.comment)
        .await
    {
        Ok(review) => {
            HttpResponse::Created().json(serde_json::json!({ "review": ReviewInfo::from(&review) }))
        }
        Err(CatalogError::TargetNotFound) => {
            HttpResponse::NotFound().json(serde_json::json!({ "error": "novel not found" }))
        }
        Err(e) => internal("review create failed", &e),
    }
}

pub async fn get_review(
    db: web::Data<Arc<Client>>,
    _auth: Auth,
    path: web::Path<i64>,
) -> impl Responder {
    match db.review(ID::from(path.into_inner())).await {
        Ok(Some(review)) => {
            HttpResponse::Ok().json(serde_json::json!({ "review": ReviewInfo::from(&review) }))
        }
        Ok(None) => {
            HttpResponse::NotFound().json(serde_json::json!({ "error": "review not found" }))
        }
        Err(e) => internal("review fetch failed", &e),
    }
}

pub async fn update_review(
    db: web::Data<Arc<Client>>,
    auth: Auth,
    path: web::Path<i64>,
    draft: web::Json<ReviewDraft>,
) -> impl Responder {
    let id: ID<Review> = ID::from(path.into_inner());
    let review = match db.review(id).await {
        Ok(Some(review)) => review,
        Ok(None) => {
            return HttpResponse::NotFound()
                .json(serde_json::json!({ "error": "review not found" }));
        }
        Err(e) => return internal("review fetch failed", &e),
    };
    if !review.editable_by(auth.account()) {
        return HttpResponse::Forbidden()
            .json(serde_json::json!({ "error": "not your review" }));
    }
    match db.update_review(id, draft.rating, &draft.comment).await {
        Ok(()) => {
            let updated = Review::new(id, draft.rating, draft.comment.clone(), review.user(), review.novel());
            HttpResponse::Ok().json(serde_json::json!({ "review": ReviewInfo::from(&updated) }))
        }
        Err(e) => internal("review update failed", &e),
    }
}

pub async fn remove_review(
    db: web::Data<Arc<Client>>,
    auth: Auth,
    path: web::Path<i64>,
) -> impl Responder {
    let id: ID<Review> = ID::from(path.into_inner());
    let review = match db.review(id).await {
        Ok(Some(review)) => review,
        Ok(None) => {
            return HttpResponse::NotFound()
                .json(serde_json::json!({ "error": "review not found" }));
        }
        Err(e) => return internal("review fetch failed", &e),
    };
    if !review.editable_by(auth.account()) {
        return HttpResponse::Forbidden()
            .json(serde_json::json!({ "error": "not your review" }));
    }
    match db.delete_review(id).await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({ "message": "review deleted" })),
        Err(e) => internal("review delete failed", &e),
    }
}

// ============================================================================
// BOOKMARKS
// The owner is always the caller; the path only names the target.
// ============================================================================
pub async fn my_bookmarks(db: web::Data<Arc<Client>>, auth: Auth) -> impl Responder {
    match db.list(auth.user()).await {
        Ok(novels) => HttpResponse::Ok().json(serde_json::json!({
            "bookmarked_novels": novels.iter().map(NovelInfo::from).collect::<Vec<_>>()
        })),
        Err(e) => internal("bookmark listing failed", &e),
    }
}

pub async fn bookmark(
    db: web::Data<Arc<Client>>,
    auth: Auth,
    path: web::Path<i64>,
) -> impl Responder {
    match db.add(auth.user(), ID::from(path.into_inner())).await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({ "message": "novel bookmarked" })),
        Err(CatalogError::TargetNotFound) => {
            HttpResponse::NotFound().json(serde_json::json!({ "error": "novel not found" }))
        }
        Err(e) => internal("bookmark add failed", &e),
    }
}

pub async fn unbookmark(
    db: web::Data<Arc<Client>>,
    auth: Auth,
    path: web::Path<i64>,
) -> impl Responder {
    match db.remove(auth.user(), ID::from(path.into_inner())).await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({ "message": "bookmark removed" })),
        Err(e) => internal("bookmark remove failed", &e),
    }
}

// ============================================================================
// POSTS
// ============================================================================
pub async fn list_posts(db: web::Data<Arc<Client>>) -> impl Responder {
    match db.posts().await {
        Ok(posts) => HttpResponse::Ok().json(serde_json::json!({
            "posts": posts.iter().map(PostInfo::from).collect::<Vec<_>>()
        })),
        Err(e) => internal("post listing failed", &e),
    }
}

pub async fn get_post(db: web::Data<Arc<Client>>, path: web::Path<i64>) -> impl Responder {
    match db.post(ID::from(path.into_inner())).await {
        Ok(Some(post)) => {
            HttpResponse::Ok().json(serde_json::json!({ "post": PostInfo::from(&post) }))
        }
        Ok(None) => HttpResponse::NotFound().json(serde_json::json!({ "error": "post not found" })),
        Err(e) => internal("post fetch failed", &e),
    }
}

pub async fn create_post(
    db: web::Data<Arc<Client>>,
    auth: Auth,
    draft: web::Json<PostDraft>,
) -> impl Responder {
    match db.create_post(auth.user(), &draft.title, &draft.content).await {
        Ok(post) => {
            HttpResponse::Created().json(serde_json::json!({ "post": PostInfo::from(&post) }))
        }
        Err(e) => internal("post create failed", &e),
    }
}

// ============================================================================
// CLASSES
// ============================================================================
pub async fn create_class(
    db: web::Data<Arc<Client>>,
    _admin: Admin,
    draft: web::Json<ClassDraft>,
) -> impl Responder {
    match db.create_class(&draft.name, &draft.code).await {
        Ok(class) => {
            HttpResponse::Created().json(serde_json::json!({ "class": ClassInfo::from(&class) }))
        }
        Err(ref e) if e.code() == Some(&tokio_postgres::error::SqlState::UNIQUE_VIOLATION) => {
            HttpResponse::Conflict()
                .json(serde_json::json!({ "error": "class code already taken" }))
        }
        Err(e) => internal("class create failed", &e),
    }
}

pub async fn class_roster(
    db: web::Data<Arc<Client>>,
    _auth: Auth,
    path: web::Path<i64>,
) -> impl Responder {
    let id: ID<Class> = ID::from(path.into_inner());
    match db.class(id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return HttpResponse::NotFound()
                .json(serde_json::json!({ "error": "class not found" }));
        }
        Err(e) => return internal("class fetch failed", &e),
    }
    match db.roster(id).await {
        Ok(members) => HttpResponse::Ok().json(serde_json::json!({
            "users": members.iter().map(UserInfo::from).collect::<Vec<_>>()
        })),
        Err(e) => internal("class roster failed", &e),
    }
}

pub async fn join_class(
    db: web::Data<Arc<Client>>,
    auth: Auth,
    path: web::Path<i64>,
) -> impl Responder {
    match db.join(auth.user(), ID::from(path.into_inner())).await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({ "message": "enrolled" })),
        Err(CatalogError::TargetNotFound) => {
            HttpResponse::NotFound().json(serde_json::json!({ "error": "class not found" }))
        }
        Err(e) => internal("class join failed", &e),
    }
}

pub async fn leave_class(
    db: web::Data<Arc<Client>>,
    auth: Auth,
    path: web::Path<i64>,
) -> impl Responder {
    match db.leave(auth.user(), ID::from(path.into_inner())).await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({ "message": "left class" })),
        Err(e) => internal("class leave failed", &e),
    }
}

pub async fn my_classes(db: web::Data<Arc<Client>>, auth: Auth) -> impl Responder {
    match db.mine(auth.user()).await {
        Ok(classes) => HttpResponse::Ok().json(serde_json::json!({
            "classes": classes.iter().map(ClassInfo::from).collect::<Vec<_>>()
        })),
        Err(e) => internal("class listing failed", &e),
    }
}
