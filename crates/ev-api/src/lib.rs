//! # ev-api
//!
//! The web routing layer for Eventra: listing views, the login/session
//! flow and the community page, all served as JSON under `/api`.

pub mod catalog;
pub mod handlers;
pub mod middleware;

use actix_web::web;

/// Mounts every Eventra route.
///
/// Listing routes are public; `/dashboard` and `/admin/dashboard` go through
/// the session guard in the handlers.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .app_data(web::JsonConfig::default().error_handler(handlers::json_error))
            .app_data(web::QueryConfig::default().error_handler(handlers::query_error))
            .route("/events", web::get().to(handlers::list_events))
            .route("/hackathons", web::get().to(handlers::list_hackathons))
            .route("/projects", web::get().to(handlers::list_projects))
            .route("/projects/categories", web::get().to(handlers::project_categories))
            .route("/contributors", web::get().to(handlers::contributors))
            .service(
                web::scope("/auth")
                    .route("/login", web::post().to(handlers::login))
                    .route("/signup", web::post().to(handlers::signup))
                    .route("/password-strength", web::post().to(handlers::check_password_strength))
                    .route("/logout", web::post().to(handlers::logout))
                    .route("/session", web::get().to(handlers::current_session)),
            )
            .route("/dashboard", web::get().to(handlers::dashboard))
            .route("/admin/dashboard", web::get().to(handlers::admin_dashboard)),
    );
}
