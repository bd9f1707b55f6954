mod error;
mod state;
mod util;

pub mod routes;
pub mod services;

pub use error::ApiError;
pub use state::{AppState, OAuthStateStore, PendingLogin, Portal};
pub use util::SESSION_COOKIE;

use axum::{
    http::header::{AUTHORIZATION, CONTENT_TYPE},
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health::health_check))
        // Auth routes
        .route("/api/auth/line", get(routes::auth::line_login))
        .route("/api/auth/line/callback", get(routes::auth::line_callback))
        .route("/api/auth/logout", post(routes::auth::logout))
        .route("/api/auth/me", get(routes::auth::me))
        // Admin routes
        .route(
            "/api/admin/organizers",
            get(routes::admin::list_pending_organizers),
        )
        .route(
            "/api/admin/organizers/:organizer_id/approve",
            post(routes::admin::approve_organizer),
        )
        .route("/api/admin/events", get(routes::admin::list_pending_events))
        .route(
            "/api/admin/events/:event_id/approve",
            post(routes::admin::approve_event),
        )
        .route(
            "/api/admin/events/:event_id/reject",
            post(routes::admin::reject_event),
        )
        // Organizer routes
        .route("/api/organizer/profile", post(routes::organizer::register_profile))
        .route("/api/organizer/profile", get(routes::organizer::get_profile))
        .route("/api/organizer/events", post(routes::organizer::create_event))
        .route("/api/organizer/events", get(routes::organizer::list_events))
        .route(
            "/api/organizer/events/:event_id/applications",
            get(routes::organizer::list_event_applications),
        )
        .route(
            "/api/organizer/applications/:application_id/approve",
            post(routes::organizer::approve_application),
        )
        .route(
            "/api/organizer/applications/:application_id/reject",
            post(routes::organizer::reject_application),
        )
        .route(
            "/api/organizer/events/:event_id/close-applications",
            post(routes::organizer::close_applications),
        )
        .route(
            "/api/organizer/events/:event_id/export-csv",
            post(routes::organizer::export_csv),
        )
        .route(
            "/api/organizer/events/:event_id/export-sheets",
            post(routes::organizer::export_sheets),
        )
        .route(
            "/api/organizer/events/:event_id/close-and-export",
            post(routes::organizer::close_and_export),
        )
        // Store routes
        .route("/api/store/profile", post(routes::store::register_profile))
        .route("/api/store/profile", get(routes::store::get_profile))
        .route("/api/store/documents", post(routes::store::attach_document))
        .route(
            "/api/store/documents/verify",
            post(routes::store::verify_document),
        )
        .route("/api/store/events", get(routes::store::list_events))
        .route("/api/store/applications", post(routes::store::submit_application))
        .route("/api/store/applications", get(routes::store::list_applications))
        // Email dispatch
        .route("/api/email/send", post(routes::email::send_email))
        // Notification routes
        .route("/api/notifications", get(routes::notifications::get_notifications))
        .route(
            "/api/notifications/unread-count",
            get(routes::notifications::get_unread_count),
        )
        .route(
            "/api/notifications/:notification_id/read",
            post(routes::notifications::mark_read),
        )
        .route(
            "/api/notifications/read-all",
            post(routes::notifications::mark_all_read),
        )
        .with_state(state)
        .layer(cors_layer())
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PUT,
            axum::http::Method::PATCH,
            axum::http::Method::DELETE,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
}
