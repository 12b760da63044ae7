use axum::extract::Extension;

use crate::error::CinemaError;
use crate::extract::{Json, Path};
use crate::models::{
    cinema_model::{Cinema, CinemaUpdate, NewCinema},
    hall_model::{Hall, NewHall},
    showing_model::ShowingResponse,
};
use crate::services::{catalog, listing};
use crate::AppState;

pub async fn load_cinemas(
    Extension(state): Extension<AppState>,
) -> Result<Json<Vec<Cinema>>, CinemaError> {
    let cinemas = catalog::list_cinemas(state.gateway.as_ref()).await?;
    Ok(Json(cinemas))
}

pub async fn add_cinema(
    Extension(state): Extension<AppState>,
    Json(cinema): Json<NewCinema>,
) -> Result<Json<Cinema>, CinemaError> {
    let cinema = catalog::create_cinema(state.gateway.as_ref(), cinema).await?;
    Ok(Json(cinema))
}

pub async fn load_cinema(
    Path(id): Path<i64>,
    Extension(state): Extension<AppState>,
) -> Result<Json<Cinema>, CinemaError> {
    let cinema = catalog::get_cinema(state.gateway.as_ref(), id).await?;
    Ok(Json(cinema))
}

pub async fn update_cinema(
    Extension(state): Extension<AppState>,
    Path(id): Path<i64>,
    Json(update_data): Json<CinemaUpdate>,
) -> Result<Json<Cinema>, CinemaError> {
    let cinema = catalog::update_cinema(state.gateway.as_ref(), id, update_data).await?;
    Ok(Json(cinema))
}

pub async fn add_cinema_hall(
    Extension(state): Extension<AppState>,
    Path(cinema_id): Path<i64>,
    Json(hall): Json<NewHall>,
) -> Result<Json<Hall>, CinemaError> {
    let hall = catalog::create_hall(state.gateway.as_ref(), cinema_id, hall).await?;
    Ok(Json(hall))
}

pub async fn load_cinema_halls(
    Path(cinema_id): Path<i64>,
    Extension(state): Extension<AppState>,
) -> Result<Json<Vec<Hall>>, CinemaError> {
    let halls = catalog::list_halls(state.gateway.as_ref(), Some(cinema_id)).await?;
    Ok(Json(halls))
}

pub async fn load_cinema_hall(
    Path((cinema_id, hall_id)): Path<(i64, i64)>,
    Extension(state): Extension<AppState>,
) -> Result<Json<Hall>, CinemaError> {
    let hall = catalog::get_cinema_hall(state.gateway.as_ref(), cinema_id, hall_id).await?;
    Ok(Json(hall))
}

pub async fn load_hall_film_shows(
    Path((cinema_id, hall_id)): Path<(i64, i64)>,
    Extension(state): Extension<AppState>,
) -> Result<Json<Vec<ShowingResponse>>, CinemaError> {
    let showings = listing::hall_showings(state.gateway.as_ref(), cinema_id, hall_id).await?;
    Ok(Json(showings.iter().map(ShowingResponse::from).collect()))
}
