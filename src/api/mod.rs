use std::sync::Arc;

use axum::{
    http::StatusCode,
    routing::{get, patch, post, put},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::AppState;

pub mod admin;
pub mod auth;
pub mod bookings;
pub mod buildings;
pub mod notifications;
pub mod rooms;

/// Build the API router. All routes are relative — the caller mounts this
/// under `/api/v1`. Role checks live in the handlers, on the extracted
/// principal; there is no ambient session state.
pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        // auth
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        // public reference data
        .route("/buildings", get(buildings::list_buildings))
        .route("/rooms", get(rooms::list_rooms))
        .route("/rooms/:id", get(rooms::get_room))
        .route("/rooms/:id/bookings", get(rooms::room_schedule))
        // bookings
        .route("/bookings", post(bookings::create_booking))
        .route("/bookings/my-bookings", get(bookings::my_bookings))
        .route("/events/upcoming", get(bookings::upcoming_events))
        // notifications
        .route("/notifications", get(notifications::list_notifications))
        .route("/notifications/count", get(notifications::unread_count))
        .route(
            "/notifications/:id",
            get(notifications::get_notification).delete(notifications::delete_notification),
        )
        .route("/notifications/:id/read", patch(notifications::mark_read))
        // admin surface
        .route("/admin/bookings", get(admin::list_bookings))
        .route("/admin/bookings/:id/status", patch(admin::set_booking_status))
        .route("/admin/stats", get(admin::stats))
        .route("/admin/recent-bookings", get(admin::recent_bookings))
        .route("/admin/rooms", get(admin::list_rooms).post(admin::create_room))
        .route(
            "/admin/rooms/:id",
            put(admin::update_room).delete(admin::delete_room),
        )
        .route("/admin/users", get(admin::list_users).post(admin::create_user))
        .route(
            "/admin/users/:id",
            put(admin::update_user).delete(admin::delete_user),
        )
        .route(
            "/admin/users/:id/reset-password",
            patch(admin::reset_password),
        )
        .layer(TraceLayer::new_for_http())
        .fallback(fallback_404)
}

async fn fallback_404() -> StatusCode {
    StatusCode::NOT_FOUND
}
