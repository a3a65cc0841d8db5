//! Admin surface: booking review, room and user management. Every handler
//! gates on the extracted principal's role; SUPER_ADMIN accounts can only
//! be managed by a SUPER_ADMIN.

use std::sync::Arc;

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::booking::{BookingDetail, BookingStatus, SetStatusRequest};
use crate::models::room::{RoomForm, RoomWithBuilding};
use crate::models::user::{
    CreateUserRequest, ResetPasswordRequest, Role, UpdateUserRequest, UserSummary,
};
use crate::notify;
use crate::upload;
use crate::AppState;

// ── Bookings ─────────────────────────────────────────────────

/// GET /api/v1/admin/bookings — every booking, newest first.
pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
    admin: AuthUser,
) -> Result<Json<Vec<BookingDetail>>, AppError> {
    admin.require_admin()?;
    let bookings = state.db.list_all_bookings().await?;
    Ok(Json(bookings))
}

/// PATCH /api/v1/admin/bookings/:id/status — approve or reject a PENDING
/// booking. APPROVED and REJECTED are terminal. No conflict re-check is
/// done here; overlap is only guarded at submission time.
pub async fn set_booking_status(
    State(state): State<Arc<AppState>>,
    admin: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<SetStatusRequest>,
) -> Result<Json<Value>, AppError> {
    admin.require_admin()?;

    if payload.status == BookingStatus::Pending {
        return Err(AppError::validation("status must be APPROVED or REJECTED"));
    }

    let booking = state
        .db
        .get_booking(id)
        .await?
        .ok_or_else(|| AppError::not_found("booking not found"))?;

    if booking.status != BookingStatus::Pending {
        return Err(AppError::validation("booking has already been decided"));
    }

    state.db.set_booking_status(id, payload.status).await?;
    tracing::info!(booking_id = %id, status = ?payload.status, admin_id = %admin.id, "booking decided");

    // Fan-out to the owner and every other admin. Failures are logged, not
    // rolled back: the status change is already committed.
    let msg = notify::decision_for_owner(payload.status, &booking);
    if let Err(e) = state
        .db
        .create_notification(booking.user_id, &msg.title, &msg.message)
        .await
    {
        tracing::error!("failed to notify booking owner: {}", e);
    }

    match state.db.list_admin_ids(Some(admin.id)).await {
        Ok(other_admins) => {
            let msg = notify::decision_for_admins(&admin.name, payload.status, &booking);
            if let Err(e) = state
                .db
                .create_notifications(&other_admins, &msg.title, &msg.message)
                .await
            {
                tracing::error!("failed to notify other admins: {}", e);
            }
        }
        Err(e) => tracing::error!("failed to list admins for fan-out: {}", e),
    }

    Ok(Json(json!({ "success": true })))
}

/// GET /api/v1/admin/stats — dashboard counters.
pub async fn stats(
    State(state): State<Arc<AppState>>,
    admin: AuthUser,
) -> Result<Json<Value>, AppError> {
    admin.require_admin()?;
    let (total_users, total_bookings, pending_bookings, approved_bookings) =
        state.db.booking_stats().await?;
    Ok(Json(json!({
        "total_users": total_users,
        "total_bookings": total_bookings,
        "pending_bookings": pending_bookings,
        "approved_bookings": approved_bookings,
    })))
}

/// GET /api/v1/admin/recent-bookings — latest three, for the dashboard.
pub async fn recent_bookings(
    State(state): State<Arc<AppState>>,
    admin: AuthUser,
) -> Result<Json<Vec<BookingDetail>>, AppError> {
    admin.require_admin()?;
    let bookings = state.db.recent_bookings(3).await?;
    Ok(Json(bookings))
}

// ── Rooms ────────────────────────────────────────────────────

struct ImageFile {
    filename: String,
    bytes: Vec<u8>,
}

async fn read_room_form(
    mut multipart: Multipart,
    max_image_bytes: usize,
) -> Result<(RoomForm, Option<ImageFile>), AppError> {
    let mut form = RoomForm::default();
    let mut image = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("malformed multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "image" => {
                let filename = field.file_name().unwrap_or("room.jpg").to_string();
                let is_image = field
                    .content_type()
                    .map(|ct| ct.starts_with("image/"))
                    .unwrap_or(false);
                if !is_image {
                    return Err(AppError::validation("room image must be an image file"));
                }
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::validation(format!("failed to read image: {}", e)))?;
                if bytes.len() > max_image_bytes {
                    return Err(AppError::validation("image exceeds the 5 MB limit"));
                }
                image = Some(ImageFile {
                    filename,
                    bytes: bytes.to_vec(),
                });
            }
            other => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::validation(format!("failed to read field: {}", e)))?;
                match other {
                    "name" => form.name = Some(value),
                    "capacity" => {
                        form.capacity = Some(value.parse().map_err(|_| {
                            AppError::validation("capacity must be a positive number")
                        })?)
                    }
                    "facilities" => form.facilities = Some(value),
                    "building_id" => {
                        form.building_id = Some(
                            value
                                .parse()
                                .map_err(|_| AppError::validation("building_id must be a valid id"))?,
                        )
                    }
                    _ => {}
                }
            }
        }
    }

    Ok((form, image))
}

/// GET /api/v1/admin/rooms
pub async fn list_rooms(
    State(state): State<Arc<AppState>>,
    admin: AuthUser,
) -> Result<Json<Vec<RoomWithBuilding>>, AppError> {
    admin.require_admin()?;
    let rooms = state.db.list_rooms(None).await?;
    Ok(Json(rooms))
}

/// POST /api/v1/admin/rooms — multipart, image optional.
pub async fn create_room(
    State(state): State<Arc<AppState>>,
    admin: AuthUser,
    multipart: Multipart,
) -> Result<(StatusCode, Json<RoomWithBuilding>), AppError> {
    admin.require_admin()?;

    let (form, image) = read_room_form(multipart, state.config.max_image_bytes).await?;
    let name = form
        .name
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| AppError::validation("name is required"))?;
    let capacity = form
        .capacity
        .ok_or_else(|| AppError::validation("capacity is required"))?;
    if capacity <= 0 {
        return Err(AppError::validation("capacity must be a positive number"));
    }
    let building_id = form
        .building_id
        .ok_or_else(|| AppError::validation("building_id is required"))?;
    let facilities = form.facilities.unwrap_or_default();

    let image_url = match image {
        Some(img) => Some(
            upload::save(
                &state.config.upload_dir,
                upload::ROOMS_SUBDIR,
                &img.filename,
                &img.bytes,
            )
            .await?
            .url,
        ),
        None => None,
    };

    let room = state
        .db
        .insert_room(&name, capacity, &facilities, image_url.as_deref(), building_id)
        .await?;

    let detail = state
        .db
        .get_room(room.id)
        .await?
        .ok_or_else(|| AppError::not_found("room not found"))?;

    tracing::info!(room_id = %room.id, "room created");
    Ok((StatusCode::CREATED, Json(detail)))
}

/// PUT /api/v1/admin/rooms/:id — multipart; a new image replaces (and
/// unlinks) the old one.
pub async fn update_room(
    State(state): State<Arc<AppState>>,
    admin: AuthUser,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<RoomWithBuilding>, AppError> {
    admin.require_admin()?;

    let existing = state
        .db
        .get_room(id)
        .await?
        .ok_or_else(|| AppError::not_found("room not found"))?;

    let (form, image) = read_room_form(multipart, state.config.max_image_bytes).await?;
    let name = form.name.unwrap_or(existing.name);
    let capacity = form.capacity.unwrap_or(existing.capacity);
    if capacity <= 0 {
        return Err(AppError::validation("capacity must be a positive number"));
    }
    let facilities = form.facilities.unwrap_or(existing.facilities);
    let building_id = form.building_id.unwrap_or(existing.building_id);

    let image_url = match image {
        Some(img) => {
            if let Some(old) = &existing.image {
                upload::remove(&state.config.upload_dir, old).await;
            }
            Some(
                upload::save(
                    &state.config.upload_dir,
                    upload::ROOMS_SUBDIR,
                    &img.filename,
                    &img.bytes,
                )
                .await?
                .url,
            )
        }
        None => existing.image,
    };

    state
        .db
        .update_room(id, &name, capacity, &facilities, image_url.as_deref(), building_id)
        .await?;

    let detail = state
        .db
        .get_room(id)
        .await?
        .ok_or_else(|| AppError::not_found("room not found"))?;
    Ok(Json(detail))
}

/// DELETE /api/v1/admin/rooms/:id — refused while the room still has
/// PENDING or APPROVED bookings.
pub async fn delete_room(
    State(state): State<Arc<AppState>>,
    admin: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    admin.require_admin()?;

    let room = state
        .db
        .get_room(id)
        .await?
        .ok_or_else(|| AppError::not_found("room not found"))?;

    if state.db.room_has_active_bookings(id).await? {
        return Err(AppError::conflict(
            "room still has pending or approved bookings",
        ));
    }

    state.db.delete_room(id).await?;
    if let Some(image) = &room.image {
        upload::remove(&state.config.upload_dir, image).await;
    }

    tracing::info!(room_id = %id, "room deleted");
    Ok(Json(json!({ "success": true })))
}

// ── Users ────────────────────────────────────────────────────

/// Only a SUPER_ADMIN may touch a SUPER_ADMIN account or grant that role.
fn check_super_admin_rules(
    actor: &AuthUser,
    target_role: Role,
    granted_role: Option<Role>,
) -> Result<(), AppError> {
    let touches_super_admin =
        target_role == Role::SuperAdmin || granted_role == Some(Role::SuperAdmin);
    if touches_super_admin && actor.role != Role::SuperAdmin {
        return Err(AppError::forbidden(
            "only a super admin may manage super admin accounts",
        ));
    }
    Ok(())
}

/// GET /api/v1/admin/users
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    admin: AuthUser,
) -> Result<Json<Vec<UserSummary>>, AppError> {
    admin.require_admin()?;
    let users = state.db.list_users().await?;
    Ok(Json(users))
}

/// POST /api/v1/admin/users
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    admin: AuthUser,
    Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    admin.require_admin()?;
    check_super_admin_rules(&admin, payload.role, Some(payload.role))?;

    let name = payload.name.trim();
    let email = payload.email.trim().to_lowercase();
    if name.is_empty() || email.is_empty() {
        return Err(AppError::validation("name and email are required"));
    }
    if payload.password.len() < 6 {
        return Err(AppError::validation("password must be at least 6 characters"));
    }
    if state.db.email_taken(&email, None).await? {
        return Err(AppError::validation("email is already in use"));
    }

    let hash = bcrypt::hash(&payload.password, state.config.bcrypt_cost)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("password hashing failed: {}", e)))?;
    let user = state.db.insert_user(name, &email, &hash, payload.role).await?;

    tracing::info!(user_id = %user.id, role = ?user.role, "user created by admin");
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "id": user.id,
            "name": user.name,
            "email": user.email,
            "role": user.role,
        })),
    ))
}

/// PUT /api/v1/admin/users/:id
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    admin: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<Value>, AppError> {
    admin.require_admin()?;

    if id == admin.id {
        return Err(AppError::validation(
            "cannot edit your own account through the admin endpoint",
        ));
    }

    let existing = state
        .db
        .find_user(id)
        .await?
        .ok_or_else(|| AppError::not_found("user not found"))?;
    check_super_admin_rules(&admin, existing.role, Some(payload.role))?;

    let name = payload.name.trim();
    let email = payload.email.trim().to_lowercase();
    if name.is_empty() || email.is_empty() {
        return Err(AppError::validation("name and email are required"));
    }
    if state.db.email_taken(&email, Some(id)).await? {
        return Err(AppError::validation("email is already in use by another user"));
    }

    let user = state.db.update_user(id, name, &email, payload.role).await?;
    Ok(Json(json!({
        "id": user.id,
        "name": user.name,
        "email": user.email,
        "role": user.role,
        "updated_at": user.updated_at,
    })))
}

/// DELETE /api/v1/admin/users/:id — cascades the user's bookings and
/// notifications.
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    admin: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    admin.require_admin()?;

    if id == admin.id {
        return Err(AppError::validation(
            "cannot delete your own account through the admin endpoint",
        ));
    }

    let existing = state
        .db
        .find_user(id)
        .await?
        .ok_or_else(|| AppError::not_found("user not found"))?;
    check_super_admin_rules(&admin, existing.role, None)?;

    state.db.delete_user(id).await?;
    tracing::info!(user_id = %id, "user deleted by admin");
    Ok(Json(json!({ "success": true })))
}

/// PATCH /api/v1/admin/users/:id/reset-password
pub async fn reset_password(
    State(state): State<Arc<AppState>>,
    admin: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<Json<Value>, AppError> {
    admin.require_admin()?;

    if id == admin.id {
        return Err(AppError::validation(
            "use the change-password flow for your own account",
        ));
    }

    let existing = state
        .db
        .find_user(id)
        .await?
        .ok_or_else(|| AppError::not_found("user not found"))?;
    check_super_admin_rules(&admin, existing.role, None)?;

    if payload.password.len() < 6 {
        return Err(AppError::validation("password must be at least 6 characters"));
    }

    let hash = bcrypt::hash(&payload.password, state.config.bcrypt_cost)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("password hashing failed: {}", e)))?;
    state.db.update_password(id, &hash).await?;

    let msg = notify::password_reset();
    if let Err(e) = state
        .db
        .create_notification(id, &msg.title, &msg.message)
        .await
    {
        tracing::error!("failed to notify user of password reset: {}", e);
    }

    Ok(Json(json!({ "success": true })))
}
