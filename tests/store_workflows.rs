//! Store workflows against a live Postgres.
//!
//! **Requirements:**
//! - PostgreSQL running at DATABASE_URL
//! - e.g. `docker compose up -d db`, then `cargo test -- --ignored`
//!
//! Every test seeds its own user, building and room under random
//! identifiers so repeated runs do not collide.

use chrono::{Duration, Utc};
use uuid::Uuid;

use roomserve::models::booking::{BookingStatus, NewBooking};
use roomserve::models::user::Role;
use roomserve::store::postgres::{BookingInsert, PgStore};

async fn connect() -> PgStore {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for store tests");
    let store = PgStore::connect(&url).await.expect("connect");
    store.migrate().await.expect("migrate");
    store
}

async fn seed_user(store: &PgStore) -> Uuid {
    let email = format!("{}@example.ac.id", Uuid::new_v4());
    store
        .insert_user(
            "Penguji",
            &email,
            "$2b$12$abcdefghijklmnopqrstuv",
            Role::Student,
        )
        .await
        .expect("insert user")
        .id
}

async fn seed_room(store: &PgStore) -> Uuid {
    let tag = Uuid::new_v4().to_string();
    let building = store
        .insert_building(&format!("Gedung Uji {tag}"), &tag[..8])
        .await
        .expect("insert building");
    store
        .insert_room("Ruang Uji", 40, "Proyektor, AC", None, building.id)
        .await
        .expect("insert room")
        .id
}

fn submission(user_id: Uuid, room_id: Uuid, start: chrono::DateTime<Utc>) -> NewBooking {
    NewBooking {
        title: "Rapat Uji Coba".into(),
        description: "pengujian alur peminjaman".into(),
        start_time: start,
        end_time: start + Duration::hours(2),
        participant_count: 10,
        coordinator_name: "Siti".into(),
        phone_number: "081234567890".into(),
        proposal_url: "/uploads/proposals/uji.pdf".into(),
        proposal_name: "uji.pdf".into(),
        user_id,
        room_id,
    }
}

mod booking_round_trip {
    use super::*;

    /// A stored submission comes back through the owner listing as PENDING,
    /// joined with its room and building.
    #[tokio::test]
    #[ignore = "needs a live Postgres at DATABASE_URL"]
    async fn submission_shows_up_pending_in_my_bookings() {
        let store = connect().await;
        let user_id = seed_user(&store).await;
        let room_id = seed_room(&store).await;

        let start = Utc::now() + Duration::days(7);
        let created = match store
            .create_booking(&submission(user_id, room_id, start))
            .await
            .expect("create booking")
        {
            BookingInsert::Created(b) => b,
            BookingInsert::Conflict => panic!("fresh room cannot conflict"),
        };

        let mine = store.list_user_bookings(user_id).await.expect("list");
        let found = mine
            .iter()
            .find(|b| b.id == created.id)
            .expect("booking appears in the owner listing");
        assert_eq!(found.status, BookingStatus::Pending);
        assert_eq!(found.room_name, "Ruang Uji");
        assert_eq!(found.user_id, user_id);
    }

    /// The transactional insert refuses an overlap on the same room.
    #[tokio::test]
    #[ignore = "needs a live Postgres at DATABASE_URL"]
    async fn overlapping_insert_reports_conflict() {
        let store = connect().await;
        let user_id = seed_user(&store).await;
        let room_id = seed_room(&store).await;

        let start = Utc::now() + Duration::days(7);
        let first = store
            .create_booking(&submission(user_id, room_id, start))
            .await
            .expect("first insert");
        assert!(matches!(first, BookingInsert::Created(_)));

        let second = store
            .create_booking(&submission(user_id, room_id, start + Duration::hours(1)))
            .await
            .expect("second insert");
        assert!(matches!(second, BookingInsert::Conflict));
    }
}

mod notification_rules {
    use super::*;

    /// Marking a notification read twice leaves it read, and the unread
    /// count does not go negative or bounce back.
    #[tokio::test]
    #[ignore = "needs a live Postgres at DATABASE_URL"]
    async fn mark_read_is_idempotent() {
        let store = connect().await;
        let user_id = seed_user(&store).await;

        store
            .create_notification(user_id, "Judul Uji", "Isi uji")
            .await
            .expect("create notification");
        let list = store.list_notifications(user_id, 30).await.expect("list");
        let id = list[0].id;
        assert_eq!(
            store
                .count_unread_notifications(user_id, 30)
                .await
                .expect("count"),
            1
        );

        let first = store
            .mark_notification_read(id, user_id)
            .await
            .expect("mark read")
            .expect("row exists");
        assert!(first.read);

        let again = store
            .mark_notification_read(id, user_id)
            .await
            .expect("mark read again")
            .expect("row still exists");
        assert!(again.read);
        assert_eq!(
            store
                .count_unread_notifications(user_id, 30)
                .await
                .expect("count"),
            0
        );
    }

    /// With a 30-day TTL a 31-day-old row is invisible to reads while a
    /// 29-day-old one is still returned; the sweep then deletes the former.
    #[tokio::test]
    #[ignore = "needs a live Postgres at DATABASE_URL"]
    async fn reads_filter_out_expired_rows() {
        let store = connect().await;
        let user_id = seed_user(&store).await;

        store
            .create_notification(user_id, "Lama", "berumur 31 hari")
            .await
            .expect("create old");
        store
            .create_notification(user_id, "Baru", "berumur 29 hari")
            .await
            .expect("create fresh");

        for (title, age) in [("Lama", "31 days"), ("Baru", "29 days")] {
            sqlx::query(&format!(
                "UPDATE notifications SET created_at = NOW() - interval '{age}' \
                 WHERE user_id = $1 AND title = $2"
            ))
            .bind(user_id)
            .bind(title)
            .execute(store.pool())
            .await
            .expect("backdate");
        }

        let visible = store.list_notifications(user_id, 30).await.expect("list");
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].title, "Baru");
        assert_eq!(
            store
                .count_unread_notifications(user_id, 30)
                .await
                .expect("count"),
            1
        );

        let purged = store
            .purge_expired_notifications(30)
            .await
            .expect("purge");
        assert!(purged >= 1);
        let remaining = store.list_notifications(user_id, 365).await.expect("list");
        assert!(remaining.iter().all(|n| n.title != "Lama"));
    }
}
