use super::*;
use nvs_core::ID;
use nvs_core::Unique;
use actix_web::HttpResponse;
use actix_web::Responder;
use actix_web::web;
use std::sync::Arc;
use tokio_postgres::Client;

fn production() -> bool {
    std::env::var("ENV").map(|v| v == "production").unwrap_or(false)
}

fn internal(context: &str, e: &AuthError) -> HttpResponse {
    log::error!("{}: {}", context, e);
    HttpResponse::InternalServerError().json(serde_json::json!({ "error": "internal error" }))
}

pub async fn register(
    db: web::Data<Arc<Client>>,
    req: web::Json<RegisterRequest>,
) -> impl Responder {
    if req.name.trim().len() < 2 {
        return HttpResponse::BadRequest()
            .json(serde_json::json!({ "error": "name must be at least 2 characters" }));
    }
    if !req.email.contains('@') {
        return HttpResponse::BadRequest()
            .json(serde_json::json!({ "error": "email is not valid" }));
    }
    if req.password.len() < 8 {
        return HttpResponse::BadRequest()
            .json(serde_json::json!({ "error": "password must be at least 8 characters" }));
    }
    match db.exists(&req.email).await {
        Ok(false) => {}
        Ok(true) => {
            return HttpResponse::Conflict()
                .json(serde_json::json!({ "error": "email already registered" }));
        }
        Err(e) => return internal("register lookup failed", &e),
    }
    let hashword = match password::hash(&req.password) {
        Ok(h) => h,
        Err(e) => return internal("password hash failed", &e),
    };
    match db.create(&req.name, &req.email, &hashword).await {
        Ok(id) => {
            let account = Account::new(id, req.name.clone(), req.email.clone(), Role::default());
            HttpResponse::Ok().json(serde_json::json!({ "user": UserInfo::from(&account) }))
        }
        // two concurrent registrations race past the exists() check; the
        // unique index is the arbiter
        Err(AuthError::Storage(ref pg))
            if pg.code() == Some(&tokio_postgres::error::SqlState::UNIQUE_VIOLATION) =>
        {
            HttpResponse::Conflict()
                .json(serde_json::json!({ "error": "email already registered" }))
        }
        Err(e) => internal("account create failed", &e),
    }
}

pub async fn login(
    db: web::Data<Arc<Client>>,
    tokens: web::Data<Crypto>,
    req: web::Json<LoginRequest>,
) -> impl Responder {
    let (account, hashword) = match db.by_email(&req.email).await {
        Ok(Some(row)) => row,
        Ok(None) => {
            return HttpResponse::Unauthorized()
                .json(serde_json::json!({ "error": "invalid credentials" }));
        }
        Err(e) => return internal("login lookup failed", &e),
    };
    if !password::verify(&req.password, &hashword) {
        return HttpResponse::Unauthorized()
            .json(serde_json::json!({ "error": "invalid credentials" }));
    }
    let token = match tokens.issue(account.id()) {
        Ok(t) => t,
        Err(e) => return internal("token issue failed", &e),
    };
    let cookie = actix_web::cookie::Cookie::build(TOKEN_COOKIE, token.clone())
        .path("/")
        .http_only(true)
        .secure(production())
        .max_age(actix_web::cookie::time::Duration::seconds(
            tokens.ttl().as_secs() as i64,
        ))
        .finish();
    HttpResponse::Ok().cookie(cookie).json(AuthResponse {
        token,
        user: UserInfo::from(&account),
    })
}

pub async fn profile(auth: Auth) -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({ "user": UserInfo::from(auth.account()) }))
}

/// Admin-only. Association rows and the account go in one atomic step;
/// a failed deletion leaves everything in place.
pub async fn remove_user(
    db: web::Data<Arc<Client>>,
    _admin: Admin,
    path: web::Path<i64>,
) -> impl Responder {
    let id: ID<Account> = ID::from(path.into_inner());
    match db.delete_cascade(id).await {
        Ok(true) => {
            HttpResponse::Ok().json(serde_json::json!({ "message": "user deleted" }))
        }
        Ok(false) => {
            HttpResponse::NotFound().json(serde_json::json!({ "error": "user not found" }))
        }
        Err(e) => internal("user delete failed", &e),
    }
}
