use axum::extract::Extension;

use crate::error::CinemaError;
use crate::extract::{Json, Path};
use crate::models::hall_model::{Hall, HallUpdate};
use crate::services::catalog;
use crate::AppState;

pub async fn load_halls(
    Extension(state): Extension<AppState>,
) -> Result<Json<Vec<Hall>>, CinemaError> {
    let halls = catalog::list_halls(state.gateway.as_ref(), None).await?;
    Ok(Json(halls))
}

pub async fn load_hall(
    Path(id): Path<i64>,
    Extension(state): Extension<AppState>,
) -> Result<Json<Hall>, CinemaError> {
    let hall = catalog::get_hall(state.gateway.as_ref(), id).await?;
    Ok(Json(hall))
}

pub async fn update_hall(
    Extension(state): Extension<AppState>,
    Path(id): Path<i64>,
    Json(update_data): Json<HallUpdate>,
) -> Result<Json<Hall>, CinemaError> {
    let hall = catalog::update_hall(state.gateway.as_ref(), id, update_data).await?;
    Ok(Json(hall))
}
