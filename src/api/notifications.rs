use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::notification::Notification;
use crate::AppState;

/// GET /api/v1/notifications — the caller's notifications, newest first.
/// Expired rows are filtered out by the TTL-aware query; the background
/// sweep deletes them for good.
pub async fn list_notifications(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<Vec<Notification>>, AppError> {
    let rows = state
        .db
        .list_notifications(user.id, state.config.notification_ttl_days)
        .await?;
    Ok(Json(rows))
}

/// GET /api/v1/notifications/count — unread count for the badge.
pub async fn unread_count(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<Value>, AppError> {
    let count = state
        .db
        .count_unread_notifications(user.id, state.config.notification_ttl_days)
        .await?;
    Ok(Json(json!({ "count": count })))
}

/// GET /api/v1/notifications/:id — owner-scoped single read.
pub async fn get_notification(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Notification>, AppError> {
    let notification = state
        .db
        .get_notification(id, user.id)
        .await?
        .ok_or_else(|| AppError::not_found("notification not found"))?;
    Ok(Json(notification))
}

/// PATCH /api/v1/notifications/:id/read — idempotent.
pub async fn mark_read(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Notification>, AppError> {
    let notification = state
        .db
        .mark_notification_read(id, user.id)
        .await?
        .ok_or_else(|| AppError::not_found("notification not found"))?;
    Ok(Json(notification))
}

/// DELETE /api/v1/notifications/:id
pub async fn delete_notification(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let deleted = state.db.delete_notification(id, user.id).await?;
    if !deleted {
        return Err(AppError::not_found("notification not found"));
    }
    Ok(Json(json!({ "success": true })))
}
