//! Tests for the auth principal and the notification fan-out texts.

use chrono::{Duration, TimeZone, Utc};
use uuid::Uuid;

use roomserve::auth::{issue_token, verify_token, AuthUser};
use roomserve::models::booking::{BookingDetail, BookingStatus};
use roomserve::models::user::{Role, User};
use roomserve::notify;

fn user_with_role(role: Role) -> User {
    User {
        id: Uuid::new_v4(),
        name: "Dewi Lestari".into(),
        email: "dewi@example.ac.id".into(),
        password_hash: "$2b$12$abcdefghijklmnopqrstuv".into(),
        role,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn booking_detail() -> BookingDetail {
    // 08:00 local Jakarta time, stored as UTC like every booking row.
    let start = notify::wib()
        .with_ymd_and_hms(2026, 9, 14, 8, 0, 0)
        .unwrap()
        .with_timezone(&Utc);
    BookingDetail {
        id: Uuid::new_v4(),
        title: "Workshop Rust".into(),
        description: "Pengenalan sistem tipe".into(),
        start_time: start,
        end_time: start + Duration::hours(2),
        status: BookingStatus::Pending,
        participant_count: 35,
        coordinator_name: "Andi".into(),
        phone_number: "081234567890".into(),
        proposal_url: "/uploads/proposals/1757800000000-proposal.pdf".into(),
        proposal_name: "proposal.pdf".into(),
        is_public: true,
        created_at: start - Duration::days(2),
        room_id: Uuid::new_v4(),
        room_name: "Lab Komputer 1".into(),
        building_name: "Gedung G".into(),
        user_id: Uuid::new_v4(),
        user_name: "Dewi Lestari".into(),
        user_email: "dewi@example.ac.id".into(),
    }
}

mod principal {
    use super::*;

    #[test]
    fn login_token_round_trips_id_name_and_role() {
        let user = user_with_role(Role::Admin);
        let token = issue_token(&user, "secret", 600).unwrap();
        let claims = verify_token(&token, "secret").unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.name, "Dewi Lestari");
        assert_eq!(claims.role, Role::Admin);
    }

    #[test]
    fn tampered_token_is_unauthorized() {
        let user = user_with_role(Role::Student);
        let mut token = issue_token(&user, "secret", 600).unwrap();
        token.push('x');
        assert!(verify_token(&token, "secret").is_err());
    }

    #[test]
    fn student_principal_cannot_pass_the_admin_gate() {
        let principal = AuthUser {
            id: Uuid::new_v4(),
            name: "Dewi".into(),
            role: Role::Student,
        };
        assert!(principal.require_admin().is_err());
    }

    #[test]
    fn both_admin_roles_pass_the_admin_gate() {
        for role in [Role::Admin, Role::SuperAdmin] {
            let principal = AuthUser {
                id: Uuid::new_v4(),
                name: "Dewi".into(),
                role,
            };
            assert!(principal.require_admin().is_ok());
        }
    }
}

mod fan_out_texts {
    use super::*;

    /// Admin rejects booking A: the owner's notification title carries
    /// "Ditolak"; the broadcast to the other admins names the actor.
    #[test]
    fn scenario_rejection_fan_out() {
        let booking = booking_detail();

        let owner_msg = notify::decision_for_owner(BookingStatus::Rejected, &booking);
        assert!(owner_msg.title.contains("Ditolak"));
        assert!(owner_msg.message.contains("Workshop Rust"));
        assert!(owner_msg.message.contains("Lab Komputer 1 - Gedung G"));

        let admin_msg =
            notify::decision_for_admins("Bu Rektor", BookingStatus::Rejected, &booking);
        assert!(admin_msg.message.starts_with("Bu Rektor telah menolak"));
        assert!(admin_msg.message.contains("Pemohon: Dewi Lestari"));
    }

    #[test]
    fn approval_tells_the_owner_when_and_where() {
        let booking = booking_detail();
        let msg = notify::decision_for_owner(BookingStatus::Approved, &booking);
        assert!(msg.title.contains("Disetujui"));
        assert!(msg.message.contains("DISETUJUI"));
        assert!(msg.message.contains("14-09-2026"));
        assert!(msg.message.contains("08:00 - 10:00 WIB"));
    }

    #[test]
    fn submission_receipt_quotes_the_activity() {
        let msg = notify::submission_received("Workshop Rust");
        assert_eq!(msg.title, "Permintaan Peminjaman Dikirim");
        assert!(msg.message.contains("\"Workshop Rust\""));
    }

    #[test]
    fn new_request_broadcast_includes_review_call_to_action() {
        let start = notify::wib()
            .with_ymd_and_hms(2026, 9, 14, 8, 0, 0)
            .unwrap()
            .with_timezone(&Utc);
        let msg = notify::new_request(
            "Dewi Lestari",
            "Workshop Rust",
            "Lab Komputer 1",
            "Gedung G",
            start,
            start + Duration::hours(2),
            35,
            "Andi",
        );
        assert!(msg.message.contains("Silakan review"));
        assert!(msg.message.contains("Koordinator: Andi"));
    }
}

mod uploads {
    use roomserve::upload::sanitize_filename;

    #[test]
    fn proposal_filenames_are_made_url_safe() {
        assert_eq!(
            sanitize_filename("Proposal Acara 17/8.pdf"),
            "Proposal_Acara_17_8.pdf"
        );
    }
}
