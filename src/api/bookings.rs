use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::booking::{BookingDetail, NewBooking};
use crate::notify;
use crate::store::postgres::BookingInsert;
use crate::upload;
use crate::AppState;

const PDF_MIME: &str = "application/pdf";

/// Everything the multipart submission form carries.
#[derive(Default)]
struct BookingForm {
    title: Option<String>,
    description: Option<String>,
    date: Option<String>,
    start_time: Option<String>,
    end_time: Option<String>,
    participant_count: Option<String>,
    coordinator_name: Option<String>,
    phone_number: Option<String>,
    room_id: Option<String>,
    proposal: Option<ProposalFile>,
}

struct ProposalFile {
    filename: String,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

async fn read_form(mut multipart: Multipart) -> Result<BookingForm, AppError> {
    let mut form = BookingForm::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("malformed multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "proposal" => {
                let filename = field.file_name().unwrap_or("proposal.pdf").to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::validation(format!("failed to read proposal: {}", e)))?;
                form.proposal = Some(ProposalFile {
                    filename,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            other => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::validation(format!("failed to read field: {}", e)))?;
                match other {
                    "title" => form.title = Some(value),
                    "description" => form.description = Some(value),
                    "date" => form.date = Some(value),
                    "start_time" => form.start_time = Some(value),
                    "end_time" => form.end_time = Some(value),
                    "participant_count" => form.participant_count = Some(value),
                    "coordinator_name" => form.coordinator_name = Some(value),
                    "phone_number" => form.phone_number = Some(value),
                    "room_id" => form.room_id = Some(value),
                    _ => {}
                }
            }
        }
    }
    Ok(form)
}

fn required(value: Option<String>, field: &str) -> Result<String, AppError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(AppError::validation(format!("{field} is required"))),
    }
}

/// POST /api/v1/bookings — student submits a booking request with a PDF
/// proposal. Validates, stores the proposal, inserts the booking inside a
/// conflict-checking transaction, then fans out notifications.
pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Value>), AppError> {
    // Fail closed if the acting principal no longer exists in the store.
    let requester = state
        .db
        .find_user(user.id)
        .await?
        .ok_or_else(|| AppError::not_found("user not found"))?;

    let form = read_form(multipart).await?;

    let proposal = form
        .proposal
        .ok_or_else(|| AppError::validation("proposal file is required"))?;
    if proposal.content_type.as_deref() != Some(PDF_MIME) {
        return Err(AppError::validation("proposal must be a PDF file"));
    }
    if proposal.bytes.len() > state.config.max_proposal_bytes {
        return Err(AppError::validation("proposal exceeds the 10 MB limit"));
    }

    let title = required(form.title, "title")?;
    let description = required(form.description, "description")?;
    let date = required(form.date, "date")?;
    let start = required(form.start_time, "start_time")?;
    let end = required(form.end_time, "end_time")?;
    let coordinator_name = required(form.coordinator_name, "coordinator_name")?;
    let phone_number = required(form.phone_number, "phone_number")?;
    let room_id: Uuid = required(form.room_id, "room_id")?
        .parse()
        .map_err(|_| AppError::validation("room_id must be a valid id"))?;

    let participant_count: i32 = required(form.participant_count, "participant_count")?
        .parse()
        .map_err(|_| AppError::validation("participant_count must be a positive number"))?;
    if participant_count <= 0 {
        return Err(AppError::validation(
            "participant_count must be a positive number",
        ));
    }

    let date: NaiveDate = date
        .parse()
        .map_err(|_| AppError::validation("date must be YYYY-MM-DD"))?;
    let start = NaiveTime::parse_from_str(&start, "%H:%M")
        .map_err(|_| AppError::validation("start_time must be HH:MM"))?;
    let end = NaiveTime::parse_from_str(&end, "%H:%M")
        .map_err(|_| AppError::validation("end_time must be HH:MM"))?;

    // Submitted clock times are local WIB; stored and compared as UTC.
    let tz = notify::wib();
    let start_time = tz
        .from_local_datetime(&date.and_time(start))
        .single()
        .ok_or_else(|| AppError::validation("start_time is not a valid clock time"))?
        .with_timezone(&Utc);
    let end_time = tz
        .from_local_datetime(&date.and_time(end))
        .single()
        .ok_or_else(|| AppError::validation("end_time is not a valid clock time"))?
        .with_timezone(&Utc);

    if start_time >= end_time {
        return Err(AppError::validation("end time must be after start time"));
    }
    if start_time < Utc::now() {
        return Err(AppError::validation("cannot book a time in the past"));
    }

    let room = state
        .db
        .get_room(room_id)
        .await?
        .ok_or_else(|| AppError::not_found("room not found"))?;

    if !room.fits(participant_count) {
        return Err(AppError::validation(format!(
            "participant count exceeds room capacity ({} people)",
            room.capacity
        )));
    }

    if state
        .db
        .has_conflict(room_id, start_time, end_time, None)
        .await?
    {
        return Err(AppError::conflict(
            "the requested time overlaps an existing booking",
        ));
    }

    let saved = upload::save(
        &state.config.upload_dir,
        upload::PROPOSALS_SUBDIR,
        &proposal.filename,
        &proposal.bytes,
    )
    .await?;

    let new_booking = NewBooking {
        title,
        description,
        start_time,
        end_time,
        participant_count,
        coordinator_name: coordinator_name.clone(),
        phone_number,
        proposal_url: saved.url.clone(),
        proposal_name: saved.original_name,
        user_id: requester.id,
        room_id,
    };

    // The transactional insert re-checks the conflict; two simultaneous
    // submissions can both pass the check above.
    let booking = match state.db.create_booking(&new_booking).await? {
        BookingInsert::Created(b) => b,
        BookingInsert::Conflict => {
            upload::remove(&state.config.upload_dir, &saved.url).await;
            return Err(AppError::conflict(
                "the requested time overlaps an existing booking",
            ));
        }
    };

    tracing::info!(booking_id = %booking.id, room_id = %room_id, "booking submitted");

    // Fan-out. A failure here is logged, not rolled back: the booking row
    // is already committed.
    let msg = notify::submission_received(&booking.title);
    if let Err(e) = state
        .db
        .create_notification(requester.id, &msg.title, &msg.message)
        .await
    {
        tracing::error!("failed to notify requester: {}", e);
    }

    match state.db.list_admin_ids(None).await {
        Ok(admin_ids) => {
            let msg = notify::new_request(
                &requester.name,
                &booking.title,
                &room.name,
                &room.building_name,
                booking.start_time,
                booking.end_time,
                booking.participant_count,
                &coordinator_name,
            );
            if let Err(e) = state
                .db
                .create_notifications(&admin_ids, &msg.title, &msg.message)
                .await
            {
                tracing::error!("failed to notify admins: {}", e);
            }
        }
        Err(e) => tracing::error!("failed to list admins for fan-out: {}", e),
    }

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "booking_id": booking.id,
            "message": "booking request submitted",
        })),
    ))
}

/// GET /api/v1/bookings/my-bookings — the caller's own bookings, newest first.
pub async fn my_bookings(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<Vec<BookingDetail>>, AppError> {
    let bookings = state.db.list_user_bookings(user.id).await?;
    Ok(Json(bookings))
}

/// GET /api/v1/events/upcoming — next approved events visible to the caller.
pub async fn upcoming_events(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<Vec<BookingDetail>>, AppError> {
    let events = state.db.upcoming_events(user.id, 10).await?;
    Ok(Json(events))
}
