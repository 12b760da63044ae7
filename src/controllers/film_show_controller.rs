use axum::extract::Extension;

use crate::error::CinemaError;
use crate::extract::{Json, Path, Query};
use crate::models::{
    showing_model::{ShowingListQuery, ShowingRequest, ShowingResponse},
    DeleteResponse,
};
use crate::services::{listing, scheduler};
use crate::utils::parse_start_time;
use crate::AppState;

pub async fn load_film_shows(
    Extension(state): Extension<AppState>,
    Query(query): Query<ShowingListQuery>,
) -> Result<Json<Vec<ShowingResponse>>, CinemaError> {
    let showings = listing::list_showings(
        state.gateway.as_ref(),
        query.start_date.as_deref(),
        query.end_date.as_deref(),
    )
    .await?;
    Ok(Json(showings.iter().map(ShowingResponse::from).collect()))
}

pub async fn add_film_show(
    Extension(state): Extension<AppState>,
    Json(film_show): Json<ShowingRequest>,
) -> Result<Json<ShowingResponse>, CinemaError> {
    let start_time = parse_start_time(&film_show.start_time)?;
    let showing = scheduler::schedule(
        state.gateway.as_ref(),
        film_show.id_hall,
        film_show.id_film,
        start_time,
    )
    .await?;
    Ok(Json(ShowingResponse::from(&showing)))
}

pub async fn load_film_show(
    Path(id): Path<i64>,
    Extension(state): Extension<AppState>,
) -> Result<Json<ShowingResponse>, CinemaError> {
    let showing = listing::get_showing(state.gateway.as_ref(), id).await?;
    Ok(Json(ShowingResponse::from(&showing)))
}

pub async fn delete_film_show(
    Path(id): Path<i64>,
    Extension(state): Extension<AppState>,
) -> Result<Json<DeleteResponse>, CinemaError> {
    scheduler::delete_showing(state.gateway.as_ref(), id).await?;
    Ok(Json(DeleteResponse::new("Film show", id)))
}
