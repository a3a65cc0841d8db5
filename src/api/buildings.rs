use std::sync::Arc;

use axum::extract::State;
use axum::Json;

use crate::errors::AppError;
use crate::models::building::Building;
use crate::AppState;

/// GET /api/v1/buildings — static reference data, public.
pub async fn list_buildings(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Building>>, AppError> {
    let buildings = state.db.list_buildings().await?;
    Ok(Json(buildings))
}
