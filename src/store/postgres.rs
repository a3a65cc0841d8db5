//! All database access goes through `PgStore` — one async method per query.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::booking::{Booking, BookingDetail, BookingStatus, NewBooking, ScheduleEntry};
use crate::models::building::Building;
use crate::models::notification::Notification;
use crate::models::room::{Room, RoomWithBuilding};
use crate::models::user::{Role, User, UserSummary};

const BOOKING_DETAIL_SELECT: &str = r#"
    SELECT b.id, b.title, b.description, b.start_time, b.end_time, b.status,
           b.participant_count, b.coordinator_name, b.phone_number,
           b.proposal_url, b.proposal_name, b.is_public, b.created_at,
           b.room_id, r.name AS room_name, bu.name AS building_name,
           b.user_id, u.name AS user_name, u.email AS user_email
    FROM bookings b
    JOIN rooms r ON r.id = b.room_id
    JOIN buildings bu ON bu.id = r.building_id
    JOIN users u ON u.id = b.user_id
"#;

/// Outcome of a transactional booking insert.
pub enum BookingInsert {
    Created(Booking),
    Conflict,
}

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run pending migrations from the migrations/ directory.
    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    // -- User operations --

    pub async fn insert_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        role: Role,
    ) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"INSERT INTO users (name, email, password_hash, role)
               VALUES ($1, $2, $3, $4)
               RETURNING id, name, email, password_hash, role, created_at, updated_at"#,
        )
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(role)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn find_user(&self, id: Uuid) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            "SELECT id, name, email, password_hash, role, created_at, updated_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            "SELECT id, name, email, password_hash, role, created_at, updated_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
    }

    /// True if another user already holds this email.
    pub async fn email_taken(
        &self,
        email: &str,
        exclude: Option<Uuid>,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE email = $1 AND ($2::uuid IS NULL OR id != $2))",
        )
        .bind(email)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn list_users(&self) -> Result<Vec<UserSummary>, sqlx::Error> {
        sqlx::query_as::<_, UserSummary>(
            r#"SELECT u.id, u.name, u.email, u.role, u.created_at, u.updated_at,
                      COUNT(b.id) AS booking_count
               FROM users u
               LEFT JOIN bookings b ON b.user_id = u.id
               GROUP BY u.id
               ORDER BY u.created_at DESC"#,
        )
        .fetch_all(&self.pool)
        .await
    }

    pub async fn update_user(
        &self,
        id: Uuid,
        name: &str,
        email: &str,
        role: Role,
    ) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"UPDATE users SET name = $2, email = $3, role = $4, updated_at = NOW()
               WHERE id = $1
               RETURNING id, name, email, password_hash, role, created_at, updated_at"#,
        )
        .bind(id)
        .bind(name)
        .bind(email)
        .bind(role)
        .fetch_one(&self.pool)
        .await
    }

    /// Cascades bookings and notifications via the schema's ON DELETE rules.
    pub async fn delete_user(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Ids of every ADMIN / SUPER_ADMIN, optionally excluding one (the actor).
    pub async fn list_admin_ids(&self, exclude: Option<Uuid>) -> Result<Vec<Uuid>, sqlx::Error> {
        sqlx::query_scalar::<_, Uuid>(
            r#"SELECT id FROM users
               WHERE role IN ('ADMIN', 'SUPER_ADMIN')
               AND ($1::uuid IS NULL OR id != $1)"#,
        )
        .bind(exclude)
        .fetch_all(&self.pool)
        .await
    }

    // -- Building operations --

    pub async fn list_buildings(&self) -> Result<Vec<Building>, sqlx::Error> {
        sqlx::query_as::<_, Building>("SELECT id, name, code FROM buildings ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await
    }

    pub async fn insert_building(&self, name: &str, code: &str) -> Result<Building, sqlx::Error> {
        sqlx::query_as::<_, Building>(
            "INSERT INTO buildings (name, code) VALUES ($1, $2) RETURNING id, name, code",
        )
        .bind(name)
        .bind(code)
        .fetch_one(&self.pool)
        .await
    }

    // -- Room operations --

    pub async fn list_rooms(
        &self,
        building_id: Option<Uuid>,
    ) -> Result<Vec<RoomWithBuilding>, sqlx::Error> {
        sqlx::query_as::<_, RoomWithBuilding>(
            r#"SELECT r.id, r.name, r.capacity, r.facilities, r.image, r.building_id,
                      b.name AS building_name, b.code AS building_code
               FROM rooms r
               JOIN buildings b ON b.id = r.building_id
               WHERE $1::uuid IS NULL OR r.building_id = $1
               ORDER BY r.name ASC"#,
        )
        .bind(building_id)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn get_room(&self, id: Uuid) -> Result<Option<RoomWithBuilding>, sqlx::Error> {
        sqlx::query_as::<_, RoomWithBuilding>(
            r#"SELECT r.id, r.name, r.capacity, r.facilities, r.image, r.building_id,
                      b.name AS building_name, b.code AS building_code
               FROM rooms r
               JOIN buildings b ON b.id = r.building_id
               WHERE r.id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn insert_room(
        &self,
        name: &str,
        capacity: i32,
        facilities: &str,
        image: Option<&str>,
        building_id: Uuid,
    ) -> Result<Room, sqlx::Error> {
        sqlx::query_as::<_, Room>(
            r#"INSERT INTO rooms (name, capacity, facilities, image, building_id)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING id, name, capacity, facilities, image, building_id"#,
        )
        .bind(name)
        .bind(capacity)
        .bind(facilities)
        .bind(image)
        .bind(building_id)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn update_room(
        &self,
        id: Uuid,
        name: &str,
        capacity: i32,
        facilities: &str,
        image: Option<&str>,
        building_id: Uuid,
    ) -> Result<Room, sqlx::Error> {
        sqlx::query_as::<_, Room>(
            r#"UPDATE rooms
               SET name = $2, capacity = $3, facilities = $4, image = $5, building_id = $6
               WHERE id = $1
               RETURNING id, name, capacity, facilities, image, building_id"#,
        )
        .bind(id)
        .bind(name)
        .bind(capacity)
        .bind(facilities)
        .bind(image)
        .bind(building_id)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn delete_room(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM rooms WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// A room with PENDING or APPROVED bookings cannot be deleted.
    pub async fn room_has_active_bookings(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            r#"SELECT EXISTS(
                   SELECT 1 FROM bookings
                   WHERE room_id = $1 AND status IN ('PENDING', 'APPROVED')
               )"#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
    }

    // -- Booking operations --

    /// Any non-rejected booking for this room overlapping [start, end)?
    /// Half-open: touching endpoints do not conflict.
    pub async fn has_conflict(
        &self,
        room_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude: Option<Uuid>,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            r#"SELECT EXISTS(
                   SELECT 1 FROM bookings
                   WHERE room_id = $1
                     AND status IN ('PENDING', 'APPROVED')
                     AND start_time < $3
                     AND end_time > $2
                     AND ($4::uuid IS NULL OR id != $4)
               )"#,
        )
        .bind(room_id)
        .bind(start)
        .bind(end)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await
    }

    /// Conflict check and insert run in one transaction. This narrows the
    /// read-then-write race between two simultaneous submissions; without a
    /// DB-level exclusion constraint it cannot close it entirely.
    pub async fn create_booking(&self, b: &NewBooking) -> Result<BookingInsert, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let conflict = sqlx::query_scalar::<_, bool>(
            r#"SELECT EXISTS(
                   SELECT 1 FROM bookings
                   WHERE room_id = $1
                     AND status IN ('PENDING', 'APPROVED')
                     AND start_time < $3
                     AND end_time > $2
               )"#,
        )
        .bind(b.room_id)
        .bind(b.start_time)
        .bind(b.end_time)
        .fetch_one(&mut *tx)
        .await?;

        if conflict {
            return Ok(BookingInsert::Conflict);
        }

        let booking = sqlx::query_as::<_, Booking>(
            r#"INSERT INTO bookings
                   (title, description, start_time, end_time, participant_count,
                    coordinator_name, phone_number, proposal_url, proposal_name,
                    user_id, room_id)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
               RETURNING id, title, description, start_time, end_time, status,
                         participant_count, coordinator_name, phone_number,
                         proposal_url, proposal_name, is_public, user_id, room_id,
                         created_at"#,
        )
        .bind(&b.title)
        .bind(&b.description)
        .bind(b.start_time)
        .bind(b.end_time)
        .bind(b.participant_count)
        .bind(&b.coordinator_name)
        .bind(&b.phone_number)
        .bind(&b.proposal_url)
        .bind(&b.proposal_name)
        .bind(b.user_id)
        .bind(b.room_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(BookingInsert::Created(booking))
    }

    pub async fn get_booking(&self, id: Uuid) -> Result<Option<BookingDetail>, sqlx::Error> {
        let sql = format!("{BOOKING_DETAIL_SELECT} WHERE b.id = $1");
        sqlx::query_as::<_, BookingDetail>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn list_user_bookings(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<BookingDetail>, sqlx::Error> {
        let sql = format!("{BOOKING_DETAIL_SELECT} WHERE b.user_id = $1 ORDER BY b.created_at DESC");
        sqlx::query_as::<_, BookingDetail>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
    }

    pub async fn list_all_bookings(&self) -> Result<Vec<BookingDetail>, sqlx::Error> {
        let sql = format!("{BOOKING_DETAIL_SELECT} ORDER BY b.created_at DESC");
        sqlx::query_as::<_, BookingDetail>(&sql)
            .fetch_all(&self.pool)
            .await
    }

    pub async fn recent_bookings(&self, limit: i64) -> Result<Vec<BookingDetail>, sqlx::Error> {
        let sql = format!("{BOOKING_DETAIL_SELECT} ORDER BY b.created_at DESC LIMIT $1");
        sqlx::query_as::<_, BookingDetail>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
    }

    pub async fn set_booking_status(
        &self,
        id: Uuid,
        status: BookingStatus,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE bookings SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// PENDING/APPROVED bookings starting within [day_start, day_end).
    pub async fn room_schedule(
        &self,
        room_id: Uuid,
        day_start: DateTime<Utc>,
        day_end: DateTime<Utc>,
    ) -> Result<Vec<ScheduleEntry>, sqlx::Error> {
        sqlx::query_as::<_, ScheduleEntry>(
            r#"SELECT b.id, b.title, b.start_time, b.end_time, b.status, b.is_public,
                      u.name AS user_name
               FROM bookings b
               JOIN users u ON u.id = b.user_id
               WHERE b.room_id = $1
                 AND b.start_time >= $2
                 AND b.start_time < $3
                 AND b.status IN ('PENDING', 'APPROVED')
               ORDER BY b.start_time ASC"#,
        )
        .bind(room_id)
        .bind(day_start)
        .bind(day_end)
        .fetch_all(&self.pool)
        .await
    }

    /// Future APPROVED bookings visible to this user: public ones plus their own.
    pub async fn upcoming_events(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<BookingDetail>, sqlx::Error> {
        let sql = format!(
            r#"{BOOKING_DETAIL_SELECT}
               WHERE b.status = 'APPROVED'
                 AND b.start_time >= NOW()
                 AND (b.is_public OR b.user_id = $1)
               ORDER BY b.start_time ASC
               LIMIT $2"#
        );
        sqlx::query_as::<_, BookingDetail>(&sql)
            .bind(user_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
    }

    pub async fn booking_stats(&self) -> Result<(i64, i64, i64, i64), sqlx::Error> {
        let row = sqlx::query_as::<_, (i64, i64, i64, i64)>(
            r#"SELECT (SELECT COUNT(*) FROM users),
                      (SELECT COUNT(*) FROM bookings),
                      (SELECT COUNT(*) FROM bookings WHERE status = 'PENDING'),
                      (SELECT COUNT(*) FROM bookings WHERE status = 'APPROVED')"#,
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    // -- Notification operations --

    pub async fn create_notification(
        &self,
        user_id: Uuid,
        title: &str,
        message: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT INTO notifications (user_id, title, message) VALUES ($1, $2, $3)")
            .bind(user_id)
            .bind(title)
            .bind(message)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Fan-out: one row per recipient in a single statement.
    pub async fn create_notifications(
        &self,
        user_ids: &[Uuid],
        title: &str,
        message: &str,
    ) -> Result<u64, sqlx::Error> {
        if user_ids.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query(
            r#"INSERT INTO notifications (user_id, title, message)
               SELECT uid, $2, $3 FROM UNNEST($1::uuid[]) AS uid"#,
        )
        .bind(user_ids)
        .bind(title)
        .bind(message)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Reads never return expired rows, whatever the sweep has gotten to.
    pub async fn list_notifications(
        &self,
        user_id: Uuid,
        ttl_days: i64,
    ) -> Result<Vec<Notification>, sqlx::Error> {
        sqlx::query_as::<_, Notification>(
            r#"SELECT id, title, message, read, created_at, user_id
               FROM notifications
               WHERE user_id = $1
                 AND created_at >= NOW() - make_interval(days => $2)
               ORDER BY created_at DESC"#,
        )
        .bind(user_id)
        .bind(ttl_days as i32)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn count_unread_notifications(
        &self,
        user_id: Uuid,
        ttl_days: i64,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            r#"SELECT COUNT(*) FROM notifications
               WHERE user_id = $1
                 AND read = false
                 AND created_at >= NOW() - make_interval(days => $2)"#,
        )
        .bind(user_id)
        .bind(ttl_days as i32)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn get_notification(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Notification>, sqlx::Error> {
        sqlx::query_as::<_, Notification>(
            r#"SELECT id, title, message, read, created_at, user_id
               FROM notifications WHERE id = $1 AND user_id = $2"#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Idempotent: marking an already-read notification changes nothing.
    pub async fn mark_notification_read(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Notification>, sqlx::Error> {
        sqlx::query_as::<_, Notification>(
            r#"UPDATE notifications SET read = true
               WHERE id = $1 AND user_id = $2
               RETURNING id, title, message, read, created_at, user_id"#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn delete_notification(&self, id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// TTL sweep across all users, called from the background job.
    pub async fn purge_expired_notifications(&self, ttl_days: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM notifications WHERE created_at < NOW() - make_interval(days => $1)",
        )
        .bind(ttl_days as i32)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
