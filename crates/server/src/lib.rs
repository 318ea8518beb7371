//! Unified novelshelf API server.
//!
//! Wires the auth and catalog route families into a single actix-web
//! server behind CORS and request logging. Every privileged route goes
//! through the [`nvs_auth::Auth`] / [`nvs_auth::Admin`] extractors before
//! any handler logic runs.

use actix_cors::Cors;
use actix_web::App;
use actix_web::HttpResponse;
use actix_web::HttpServer;
use actix_web::Responder;
use actix_web::http::header;
use actix_web::middleware::Logger;
use actix_web::web;
use std::sync::Arc;
use tokio_postgres::Client;

async fn health(client: web::Data<Arc<Client>>) -> impl Responder {
    match client
        .execute("SELECT 1", &[])
        .await
        .inspect_err(|e| log::error!("health check failed: {}", e))
    {
        Ok(_) => HttpResponse::Ok().body("ok"),
        Err(_) => HttpResponse::ServiceUnavailable().body("database unavailable"),
    }
}

/// Replays DDL for every persisted entity. Ordered so that referenced
/// tables exist before their referrers.
async fn migrate(client: &Client) {
    nvs_pg::migrate::<nvs_auth::Account>(client).await.expect("migrate users");
    nvs_pg::migrate::<nvs_catalog::Novel>(client).await.expect("migrate novels");
    nvs_pg::migrate::<nvs_catalog::Class>(client).await.expect("migrate classes");
    nvs_pg::migrate::<nvs_catalog::Review>(client).await.expect("migrate reviews");
    nvs_pg::migrate::<nvs_catalog::Post>(client).await.expect("migrate posts");
    nvs_pg::migrate::<nvs_catalog::Bookmark>(client).await.expect("migrate bookmarks");
    nvs_pg::migrate::<nvs_catalog::Enrollment>(client).await.expect("migrate enrollments");
}

#[rustfmt::skip]
pub async fn run() -> Result<(), std::io::Error> {
    let client = nvs_pg::db().await;
    migrate(&client).await;
    let crypto = web::Data::new(nvs_auth::Crypto::from_env());
    let client = web::Data::new(client);
    let origin = std::env::var("ALLOWED_ORIGIN")
        .unwrap_or_else(|_| "http://localhost:3000".to_string());
    log::info!("starting novelshelf server");
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::new("%r %s %Ts"))
            .wrap(
                // cookie transport requires credentialed CORS against a
                // pinned origin, not a wildcard
                Cors::default()
                    .allowed_origin(&origin)
                    .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
                    .allowed_headers(vec![header::ORIGIN, header::CONTENT_TYPE, header::AUTHORIZATION])
                    .expose_headers(vec![header::CONTENT_LENGTH])
                    .supports_credentials(),
            )
            .app_data(crypto.clone())
            .app_data(client.clone())
            .route("/health", web::get().to(health))
            .service(
                web::scope("/auth")
                    .route("/register", web::post().to(nvs_auth::register))
                    .route("/login", web::post().to(nvs_auth::login))
                    .route("/me", web::get().to(nvs_auth::profile)),
            )
            .service(
                web::scope("/novels")
                    .route("", web::get().to(nvs_catalog::list_novels))
                    .route("", web::post().to(nvs_catalog::create_novel))
                    .route("/{id}", web::get().to(nvs_catalog::get_novel))
                    .route("/{id}", web::put().to(nvs_catalog::update_novel))
                    .route("/{id}", web::delete().to(nvs_catalog::remove_novel))
                    .route("/{id}/reviews", web::get().to(nvs_catalog::novel_reviews))
                    .route("/{id}/reviews", web::post().to(nvs_catalog::create_review)),
            )
            .service(
                web::scope("/reviews")
                    .route("/{id}", web::get().to(nvs_catalog::get_review))
                    .route("/{id}", web::put().to(nvs_catalog::update_review))
                    .route("/{id}", web::delete().to(nvs_catalog::remove_review)),
            )
            .service(
                web::scope("/bookmarks")
                    .route("", web::get().to(nvs_catalog::my_bookmarks))
                    .route("/{novel_id}", web::post().to(nvs_catalog::bookmark))
                    .route("/{novel_id}", web::delete().to(nvs_catalog::unbookmark)),
            )
            .service(
                web::scope("/posts")
                    .route("", web::get().to(nvs_catalog::list_posts))
                    .route("", web::post().to(nvs_catalog::create_post))
                    .route("/{id}", web::get().to(nvs_catalog::get_post)),
            )
            .service(
                web::scope("/classes")
                    .route("", web::post().to(nvs_catalog::create_class))
                    .route("/mine", web::get().to(nvs_catalog::my_classes))
                    .route("/{id}/members", web::get().to(nvs_catalog::class_roster))
                    .route("/{id}/join", web::post().to(nvs_catalog::join_class))
                    .route("/{id}/leave", web::delete().to(nvs_catalog::leave_class)),
            )
            .service(
                web::scope("/users")
                    .route("/{id}", web::delete().to(nvs_auth::remove_user)),
            )
    })
    .workers(6)
    .bind(std::env::var("BIND_ADDR").expect("BIND_ADDR must be set"))?
    .run()
    .await
}
