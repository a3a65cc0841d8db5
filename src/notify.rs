//! Notification fan-out texts. One event produces one row per recipient:
//! the requester and every admin on submission, the owner and every other
//! admin on a decision. Texts are user-facing and stay in Indonesian.

use chrono::{DateTime, FixedOffset, Utc};

use crate::models::booking::{BookingDetail, BookingStatus};

/// Title and message body of one notification.
pub struct Message {
    pub title: String,
    pub message: String,
}

/// UTC+7. Submitted clock times are interpreted in this zone and every
/// user-facing date or time renders in it; storage stays UTC.
pub fn wib() -> FixedOffset {
    // 7h is within chrono's +-24h offset range, east_opt cannot fail here.
    FixedOffset::east_opt(7 * 3600).unwrap()
}

fn fmt_date(t: DateTime<Utc>) -> String {
    t.with_timezone(&wib()).format("%d-%m-%Y").to_string()
}

fn fmt_time_range(start: DateTime<Utc>, end: DateTime<Utc>) -> String {
    format!(
        "{} - {} WIB",
        start.with_timezone(&wib()).format("%H:%M"),
        end.with_timezone(&wib()).format("%H:%M")
    )
}

/// To the requester, right after their submission is stored.
pub fn submission_received(activity_title: &str) -> Message {
    Message {
        title: "Permintaan Peminjaman Dikirim".into(),
        message: format!(
            "Permintaan peminjaman ruangan untuk kegiatan \"{activity_title}\" \
             telah dikirim dan sedang menunggu persetujuan admin."
        ),
    }
}

/// To every admin, announcing a new request.
#[allow(clippy::too_many_arguments)]
pub fn new_request(
    requester_name: &str,
    activity_title: &str,
    room_name: &str,
    building_name: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    participant_count: i32,
    coordinator_name: &str,
) -> Message {
    Message {
        title: "Permintaan Booking Baru".into(),
        message: format!(
            "Ada permintaan peminjaman ruangan baru dari {requester_name}:\n\n\
             Kegiatan: {activity_title}\n\
             Ruangan: {room_name} - {building_name}\n\
             Tanggal: {}\n\
             Waktu: {}\n\
             Peserta: {participant_count} orang\n\
             Koordinator: {coordinator_name}\n\n\
             Silakan review dan berikan persetujuan.",
            fmt_date(start),
            fmt_time_range(start, end),
        ),
    }
}

fn decision_word(status: BookingStatus) -> &'static str {
    match status {
        BookingStatus::Approved => "Disetujui",
        BookingStatus::Rejected => "Ditolak",
        BookingStatus::Pending => "Menunggu",
    }
}

/// To the booking owner, describing the admin's decision.
pub fn decision_for_owner(status: BookingStatus, booking: &BookingDetail) -> Message {
    let date = fmt_date(booking.start_time);
    let time = fmt_time_range(booking.start_time, booking.end_time);
    let body = match status {
        BookingStatus::Approved => format!(
            "Selamat! Permintaan peminjaman ruangan Anda telah DISETUJUI.\n\n\
             Kegiatan: {}\n\
             Ruangan: {} - {}\n\
             Tanggal: {date}\n\
             Waktu: {time}\n\n\
             Ruangan siap digunakan sesuai jadwal. Pastikan untuk datang tepat \
             waktu dan menjaga kebersihan ruangan.",
            booking.title, booking.room_name, booking.building_name,
        ),
        _ => format!(
            "Mohon maaf, permintaan peminjaman ruangan Anda telah DITOLAK.\n\n\
             Kegiatan: {}\n\
             Ruangan: {} - {}\n\
             Tanggal: {date}\n\
             Waktu: {time}\n\n\
             Silakan hubungi admin untuk informasi lebih lanjut atau ajukan \
             permintaan baru dengan penyesuaian.",
            booking.title, booking.room_name, booking.building_name,
        ),
    };
    Message {
        title: format!("Booking {}", decision_word(status)),
        message: body,
    }
}

/// To every other admin, naming who decided.
pub fn decision_for_admins(
    acting_admin: &str,
    status: BookingStatus,
    booking: &BookingDetail,
) -> Message {
    let verb = match status {
        BookingStatus::Approved => "menyetujui",
        _ => "menolak",
    };
    Message {
        title: format!("Booking {}", decision_word(status)),
        message: format!(
            "{acting_admin} telah {verb} booking:\n\n\
             Kegiatan: {}\n\
             Pemohon: {}\n\
             Ruangan: {} - {}\n\
             Tanggal: {}",
            booking.title,
            booking.user_name,
            booking.room_name,
            booking.building_name,
            fmt_date(booking.start_time),
        ),
    }
}

/// To a user whose password an admin reset.
pub fn password_reset() -> Message {
    Message {
        title: "Password Direset".into(),
        message: "Password akun Anda telah direset oleh admin. Silakan login dengan \
                  password baru dan segera ganti password jika diperlukan."
            .into(),
    }
}
