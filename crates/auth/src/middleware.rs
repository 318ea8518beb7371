use super::*;
use nvs_core::ID;
use nvs_core::Unique;
use actix_web::FromRequest;
use actix_web::HttpRequest;
use actix_web::HttpResponse;
use actix_web::dev::Payload;
use actix_web::web;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio_postgres::Client;

/// Extractor for authenticated requests: the access gate.
///
/// Verifies the presented token, then re-resolves the subject against
/// storage so role changes and deletions take effect immediately. Any
/// failure aborts the request before handler logic runs. The resulting
/// identity context lives exactly as long as the request.
pub struct Auth(pub Account);

impl Auth {
    pub fn account(&self) -> &Account {
        &self.0
    }
    pub fn user(&self) -> ID<Account> {
        self.0.id()
    }
}

/// Token lookup order: the `token` cookie, then an Authorization bearer
/// header for non-cookie clients.
fn presented(req: &HttpRequest) -> Option<String> {
    req.cookie(TOKEN_COOKIE)
        .map(|c| c.value().to_owned())
        .or_else(|| {
            req.headers()
                .get("Authorization")
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.strip_prefix("Bearer "))
                .map(|s| s.to_owned())
        })
}

pub(crate) fn unauthorized(msg: &str) -> actix_web::Error {
    actix_web::error::InternalError::from_response(
        msg.to_owned(),
        HttpResponse::Unauthorized().json(serde_json::json!({ "error": msg })),
    )
    .into()
}

pub(crate) fn forbidden(msg: &str) -> actix_web::Error {
    actix_web::error::InternalError::from_response(
        msg.to_owned(),
        HttpResponse::Forbidden().json(serde_json::json!({ "error": msg })),
    )
    .into()
}

pub(crate) fn unavailable(msg: &str) -> actix_web::Error {
    actix_web::error::InternalError::from_response(
        msg.to_owned(),
        HttpResponse::InternalServerError().json(serde_json::json!({ "error": msg })),
    )
    .into()
}

impl FromRequest for Auth {
    type Error = actix_web::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;
    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let crypto = req.app_data::<web::Data<Crypto>>().cloned();
        let db = req.app_data::<web::Data<Arc<Client>>>().cloned();
        let token = presented(req);
        Box::pin(async move {
            let token = token.ok_or_else(|| unauthorized("authentication required"))?;
            let crypto = crypto.ok_or_else(|| unavailable("token service not configured"))?;
            let subject = crypto
                .verify(&token)
                .inspect_err(|e| log::debug!("token rejected: {}", e))
                .map_err(|_| unauthorized("invalid token"))?;
            let db = db.ok_or_else(|| unavailable("database not configured"))?;
            // an account deleted after issuance is unauthorized, not a
            // server fault: token lifetime may outlive account lifetime
            match db.by_id(subject).await {
                Ok(Some(account)) => Ok(Auth(account)),
                Ok(None) => Err(unauthorized("account not found")),
                Err(e) => {
                    log::error!("identity load failed: {}", e);
                    Err(unavailable("internal error"))
                }
            }
        })
    }
}

/// Extractor for admin-gated requests. Composes [`Auth`] with the role
/// policy; a valid identity with an insufficient role is forbidden, not
/// unauthorized.
pub struct Admin(pub Account);

impl Admin {
    pub fn account(&self) -> &Account {
        &self.0
    }
}

impl FromRequest for Admin {
    type Error = actix_web::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;
    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let auth = Auth::from_request(req, payload);
        Box::pin(async move {
            let Auth(account) = auth.await?;
            match account.role().permits(Role::Admin) {
                true => Ok(Admin(account)),
                false => Err(forbidden("admins only")),
            }
        })
    }
}
