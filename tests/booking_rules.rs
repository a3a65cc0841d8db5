//! Tests for the booking-conflict and approval-workflow rules.
//!
//! These exercise the library surface directly; handlers over a live
//! database add only transport on top of what is covered here.

use chrono::{DateTime, TimeZone, Utc};
use roomserve::models::booking::{intervals_overlap, BookingStatus};

fn at(hour: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 9, 14, hour, min, 0).unwrap()
}

mod conflict_rules {
    use super::*;

    /// Room booked 08:00-10:00; a 09:00-11:00 request must conflict, a
    /// 10:00-12:00 request must not (touching boundary at 10:00).
    #[test]
    fn scenario_back_to_back_bookings() {
        let (a_start, a_end) = (at(8, 0), at(10, 0));

        let b = intervals_overlap(at(9, 0), at(11, 0), a_start, a_end);
        assert!(b, "B overlaps A and must be rejected");

        let c = intervals_overlap(at(10, 0), at(12, 0), a_start, a_end);
        assert!(!c, "C touches A at 10:00 and must be accepted");
    }

    #[test]
    fn full_containment_conflicts_both_ways() {
        assert!(intervals_overlap(at(8, 0), at(12, 0), at(9, 0), at(10, 0)));
        assert!(intervals_overlap(at(9, 0), at(10, 0), at(8, 0), at(12, 0)));
    }

    #[test]
    fn one_minute_overlap_still_conflicts() {
        assert!(intervals_overlap(at(9, 59), at(11, 0), at(8, 0), at(10, 0)));
    }

    #[test]
    fn disjoint_same_day_does_not_conflict() {
        assert!(!intervals_overlap(at(13, 0), at(15, 0), at(8, 0), at(10, 0)));
    }
}

mod status_workflow {
    use super::*;

    #[test]
    fn status_wire_format_is_screaming_snake() {
        for (status, wire) in [
            (BookingStatus::Pending, "\"PENDING\""),
            (BookingStatus::Approved, "\"APPROVED\""),
            (BookingStatus::Rejected, "\"REJECTED\""),
        ] {
            assert_eq!(serde_json::to_string(&status).unwrap(), wire);
            let back: BookingStatus = serde_json::from_str(wire).unwrap();
            assert_eq!(back, status);
        }
    }

    #[test]
    fn unknown_status_is_rejected_at_the_boundary() {
        let parsed: Result<BookingStatus, _> = serde_json::from_str("\"CANCELLED\"");
        assert!(parsed.is_err());
    }

    #[test]
    fn set_status_request_parses_the_patch_body() {
        let req: roomserve::models::booking::SetStatusRequest =
            serde_json::from_str(r#"{"status":"APPROVED"}"#).unwrap();
        assert_eq!(req.status, BookingStatus::Approved);
    }
}

mod capacity_rules {
    use roomserve::models::room::RoomWithBuilding;
    use uuid::Uuid;

    fn room_with_capacity(capacity: i32) -> RoomWithBuilding {
        RoomWithBuilding {
            id: Uuid::new_v4(),
            name: "Kelas F 4.10".into(),
            capacity,
            facilities: "Proyektor, AC".into(),
            image: None,
            building_id: Uuid::new_v4(),
            building_name: "Gedung F".into(),
            building_code: "GDF".into(),
        }
    }

    /// participant_count == capacity is accepted; capacity + 1 is not.
    #[test]
    fn boundary_is_inclusive() {
        let room = room_with_capacity(50);
        assert!(room.fits(50));
        assert!(!room.fits(51));
        assert!(room.fits(1));
    }
}
