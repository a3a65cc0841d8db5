use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Room {
    pub id: Uuid,
    pub name: String,
    pub capacity: i32,
    pub facilities: String,
    pub image: Option<String>,
    pub building_id: Uuid,
}

/// Room joined with its building, the shape every room listing returns.
#[derive(Debug, Serialize, FromRow)]
pub struct RoomWithBuilding {
    pub id: Uuid,
    pub name: String,
    pub capacity: i32,
    pub facilities: String,
    pub image: Option<String>,
    pub building_id: Uuid,
    pub building_name: String,
    pub building_code: String,
}

impl RoomWithBuilding {
    /// A group the size of the capacity still fits; only larger ones fail.
    pub fn fits(&self, participant_count: i32) -> bool {
        participant_count <= self.capacity
    }
}

#[derive(Deserialize)]
pub struct RoomQueryParams {
    pub building_id: Option<Uuid>,
}

#[derive(Deserialize)]
pub struct ScheduleQueryParams {
    /// YYYY-MM-DD
    pub date: Option<chrono::NaiveDate>,
}

/// Fields of the multipart room form, minus the optional image part.
#[derive(Debug, Default)]
pub struct RoomForm {
    pub name: Option<String>,
    pub capacity: Option<i32>,
    pub facilities: Option<String>,
    pub building_id: Option<Uuid>,
}
