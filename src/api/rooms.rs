use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::TimeZone;
use uuid::Uuid;

use crate::errors::AppError;
use crate::notify;
use crate::models::booking::ScheduleEntry;
use crate::models::room::{RoomQueryParams, RoomWithBuilding, ScheduleQueryParams};
use crate::AppState;

/// GET /api/v1/rooms — public listing, optionally filtered by building.
pub async fn list_rooms(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RoomQueryParams>,
) -> Result<Json<Vec<RoomWithBuilding>>, AppError> {
    let rooms = state.db.list_rooms(params.building_id).await?;
    Ok(Json(rooms))
}

/// GET /api/v1/rooms/:id
pub async fn get_room(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<RoomWithBuilding>, AppError> {
    let room = state
        .db
        .get_room(id)
        .await?
        .ok_or_else(|| AppError::not_found("room not found"))?;
    Ok(Json(room))
}

/// GET /api/v1/rooms/:id/bookings?date=YYYY-MM-DD — the room's schedule for
/// one day: PENDING and APPROVED bookings only, rejected slots are free.
pub async fn room_schedule(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Query(params): Query<ScheduleQueryParams>,
) -> Result<Json<Vec<ScheduleEntry>>, AppError> {
    let date = params
        .date
        .ok_or_else(|| AppError::validation("date parameter is required"))?;

    // Room existence is checked so an unknown id is a 404, not an empty list.
    state
        .db
        .get_room(id)
        .await?
        .ok_or_else(|| AppError::not_found("room not found"))?;

    // Day bounds follow the same WIB convention submissions are parsed in.
    let day_start = notify::wib()
        .from_local_datetime(&date.and_time(chrono::NaiveTime::MIN))
        .single()
        .ok_or_else(|| AppError::validation("date is out of range"))?
        .with_timezone(&chrono::Utc);
    let day_end = day_start + chrono::Duration::days(1);

    let entries = state.db.room_schedule(id, day_start, day_end).await?;
    Ok(Json(entries))
}
