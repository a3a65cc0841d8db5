use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use sqlx::Type;
use uuid::Uuid;

/// Approval workflow states. PENDING is the only non-terminal state:
/// an admin moves a booking to APPROVED or REJECTED exactly once.
#[derive(Debug, Type, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[sqlx(type_name = "booking_status")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    #[sqlx(rename = "PENDING")]
    Pending,
    #[sqlx(rename = "APPROVED")]
    Approved,
    #[sqlx(rename = "REJECTED")]
    Rejected,
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Booking {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: BookingStatus,
    pub participant_count: i32,
    pub coordinator_name: String,
    pub phone_number: String,
    pub proposal_url: String,
    pub proposal_name: String,
    pub is_public: bool,
    pub user_id: Uuid,
    pub room_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Booking joined with its room, building and owner.
#[derive(Debug, Serialize, FromRow)]
pub struct BookingDetail {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: BookingStatus,
    pub participant_count: i32,
    pub coordinator_name: String,
    pub phone_number: String,
    pub proposal_url: String,
    pub proposal_name: String,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub room_id: Uuid,
    pub room_name: String,
    pub building_name: String,
    pub user_id: Uuid,
    pub user_name: String,
    pub user_email: String,
}

/// One entry of a room's per-day schedule; only the owner's name is exposed.
#[derive(Debug, Serialize, FromRow)]
pub struct ScheduleEntry {
    pub id: Uuid,
    pub title: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: BookingStatus,
    pub is_public: bool,
    pub user_name: String,
}

/// Validated booking submission, ready to insert.
#[derive(Debug)]
pub struct NewBooking {
    pub title: String,
    pub description: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub participant_count: i32,
    pub coordinator_name: String,
    pub phone_number: String,
    pub proposal_url: String,
    pub proposal_name: String,
    pub user_id: Uuid,
    pub room_id: Uuid,
}

#[derive(Deserialize)]
pub struct SetStatusRequest {
    pub status: BookingStatus,
}

/// Half-open interval overlap: [s1, e1) and [s2, e2) conflict iff
/// s1 < e2 && e1 > s2. Touching endpoints do not conflict.
pub fn intervals_overlap(
    s1: DateTime<Utc>,
    e1: DateTime<Utc>,
    s2: DateTime<Utc>,
    e2: DateTime<Utc>,
) -> bool {
    s1 < e2 && e1 > s2
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, hour, 0, 0).unwrap()
    }

    #[test]
    fn overlapping_intervals_conflict() {
        // 08:00-10:00 vs 09:00-11:00
        assert!(intervals_overlap(at(9), at(11), at(8), at(10)));
        // containment
        assert!(intervals_overlap(at(8), at(12), at(9), at(10)));
        assert!(intervals_overlap(at(9), at(10), at(8), at(12)));
        // identical
        assert!(intervals_overlap(at(8), at(10), at(8), at(10)));
    }

    #[test]
    fn touching_endpoints_do_not_conflict() {
        // 10:00-12:00 right after 08:00-10:00
        assert!(!intervals_overlap(at(10), at(12), at(8), at(10)));
        assert!(!intervals_overlap(at(6), at(8), at(8), at(10)));
    }

    #[test]
    fn disjoint_intervals_do_not_conflict() {
        assert!(!intervals_overlap(at(13), at(14), at(8), at(10)));
    }

    #[test]
    fn status_serializes_uppercase() {
        assert_eq!(
            serde_json::to_string(&BookingStatus::Pending).unwrap(),
            "\"PENDING\""
        );
        let s: BookingStatus = serde_json::from_str("\"REJECTED\"").unwrap();
        assert_eq!(s, BookingStatus::Rejected);
    }
}
