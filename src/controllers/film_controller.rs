use axum::extract::Extension;

use crate::error::CinemaError;
use crate::extract::{Json, Path};
use crate::models::film_model::{Film, FilmUpdate, NewFilm};
use crate::services::catalog;
use crate::AppState;

pub async fn load_films(
    Extension(state): Extension<AppState>,
) -> Result<Json<Vec<Film>>, CinemaError> {
    let films = catalog::list_films(state.gateway.as_ref()).await?;
    Ok(Json(films))
}

pub async fn add_film(
    Extension(state): Extension<AppState>,
    Json(film): Json<NewFilm>,
) -> Result<Json<Film>, CinemaError> {
    let film = catalog::create_film(state.gateway.as_ref(), film).await?;
    Ok(Json(film))
}

pub async fn load_film(
    Path(id): Path<i64>,
    Extension(state): Extension<AppState>,
) -> Result<Json<Film>, CinemaError> {
    let film = catalog::get_film(state.gateway.as_ref(), id).await?;
    Ok(Json(film))
}

pub async fn update_film(
    Extension(state): Extension<AppState>,
    Path(id): Path<i64>,
    Json(update_data): Json<FilmUpdate>,
) -> Result<Json<Film>, CinemaError> {
    let film = catalog::update_film(state.gateway.as_ref(), id, update_data).await?;
    Ok(Json(film))
}
