use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

/// Static reference data; mutated only through seeding.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Building {
    pub id: Uuid,
    pub name: String,
    pub code: String,
}
