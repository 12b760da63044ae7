//! Cinemas, halls and films. Plain records; the only rules are that names are
//! non-empty and sizes and durations are positive.

use super::found;
use crate::error::CinemaError;
use crate::models::{
    cinema_model::{Cinema, CinemaUpdate, NewCinema},
    film_model::{Film, FilmUpdate, NewFilm},
    hall_model::{Hall, HallUpdate, NewHall},
};
use crate::store::{finish, Gateway};

fn require_text(field: &str, value: &str) -> Result<(), CinemaError> {
    if value.trim().is_empty() {
        return Err(CinemaError::invalid(format!("{field} must not be empty")));
    }
    Ok(())
}

fn require_positive(field: &str, value: i32) -> Result<(), CinemaError> {
    if value <= 0 {
        return Err(CinemaError::invalid(format!("{field} must be positive")));
    }
    Ok(())
}

fn check_optional_text(field: &str, value: &Option<String>) -> Result<(), CinemaError> {
    value.as_deref().map_or(Ok(()), |value| require_text(field, value))
}

fn check_optional_positive(field: &str, value: Option<i32>) -> Result<(), CinemaError> {
    value.map_or(Ok(()), |value| require_positive(field, value))
}

pub async fn create_cinema(
    gateway: &dyn Gateway,
    cinema: NewCinema,
) -> Result<Cinema, CinemaError> {
    require_text("name", &cinema.name)?;
    require_text("city", &cinema.city)?;

    let mut tx = gateway.begin().await?;
    let outcome = tx.insert_cinema(cinema).await.map_err(CinemaError::from);
    finish(tx, outcome).await
}

pub async fn list_cinemas(gateway: &dyn Gateway) -> Result<Vec<Cinema>, CinemaError> {
    let mut tx = gateway.begin().await?;
    let outcome = tx.list_cinemas().await.map_err(CinemaError::from);
    finish(tx, outcome).await
}

pub async fn get_cinema(gateway: &dyn Gateway, id: i64) -> Result<Cinema, CinemaError> {
    let mut tx = gateway.begin().await?;
    let outcome = found(tx.get_cinema(id).await, "cinema", id);
    finish(tx, outcome).await
}

pub async fn update_cinema(
    gateway: &dyn Gateway,
    id: i64,
    update: CinemaUpdate,
) -> Result<Cinema, CinemaError> {
    check_optional_text("name", &update.name)?;
    check_optional_text("city", &update.city)?;

    let mut tx = gateway.begin().await?;
    let outcome = found(tx.update_cinema(id, update).await, "cinema", id);
    finish(tx, outcome).await
}

#[tracing::instrument(skip(gateway))]
pub async fn create_hall(
    gateway: &dyn Gateway,
    cinema_id: i64,
    hall: NewHall,
) -> Result<Hall, CinemaError> {
    require_text("name", &hall.name)?;
    require_positive("rows", hall.rows)?;
    require_positive("places_in_row", hall.places_in_row)?;

    let mut tx = gateway.begin().await?;
    let outcome = async {
        found(tx.get_cinema(cinema_id).await, "cinema", cinema_id)?;
        let hall = tx.insert_hall(cinema_id, hall).await?;
        Ok::<_, CinemaError>(hall)
    }
    .await;
    finish(tx, outcome).await
}

/// Halls by id; with `cinema_id`, only the halls of that cinema.
pub async fn list_halls(
    gateway: &dyn Gateway,
    cinema_id: Option<i64>,
) -> Result<Vec<Hall>, CinemaError> {
    let mut tx = gateway.begin().await?;
    let outcome = tx.list_halls(cinema_id).await.map_err(CinemaError::from);
    finish(tx, outcome).await
}

pub async fn get_hall(gateway: &dyn Gateway, id: i64) -> Result<Hall, CinemaError> {
    let mut tx = gateway.begin().await?;
    let outcome = found(tx.get_hall(id).await, "hall", id);
    finish(tx, outcome).await
}

/// A hall looked up through its cinema; a hall of another cinema is not found.
pub async fn get_cinema_hall(
    gateway: &dyn Gateway,
    cinema_id: i64,
    hall_id: i64,
) -> Result<Hall, CinemaError> {
    let mut tx = gateway.begin().await?;
    let outcome = found(tx.get_hall(hall_id).await, "hall", hall_id).and_then(|hall| {
        if hall.id_cinema == cinema_id {
            Ok(hall)
        } else {
            Err(CinemaError::not_found("hall", hall_id))
        }
    });
    finish(tx, outcome).await
}

pub async fn update_hall(
    gateway: &dyn Gateway,
    id: i64,
    update: HallUpdate,
) -> Result<Hall, CinemaError> {
    check_optional_text("name", &update.name)?;
    check_optional_positive("rows", update.rows)?;
    check_optional_positive("places_in_row", update.places_in_row)?;

    let mut tx = gateway.begin().await?;
    let outcome = found(tx.update_hall(id, update).await, "hall", id);
    finish(tx, outcome).await
}

pub async fn create_film(gateway: &dyn Gateway, film: NewFilm) -> Result<Film, CinemaError> {
    require_text("title", &film.title)?;
    require_positive("duration", film.duration)?;

    let mut tx = gateway.begin().await?;
    let outcome = tx.insert_film(film).await.map_err(CinemaError::from);
    finish(tx, outcome).await
}

pub async fn list_films(gateway: &dyn Gateway) -> Result<Vec<Film>, CinemaError> {
    let mut tx = gateway.begin().await?;
    let outcome = tx.list_films().await.map_err(CinemaError::from);
    finish(tx, outcome).await
}

pub async fn get_film(gateway: &dyn Gateway, id: i64) -> Result<Film, CinemaError> {
    let mut tx = gateway.begin().await?;
    let outcome = found(tx.get_film(id).await, "film", id);
    finish(tx, outcome).await
}

/// Changing a duration does not move the end of existing showings.
pub async fn update_film(
    gateway: &dyn Gateway,
    id: i64,
    update: FilmUpdate,
) -> Result<Film, CinemaError> {
    check_optional_text("title", &update.title)?;
    check_optional_positive("duration", update.duration)?;

    let mut tx = gateway.begin().await?;
    let outcome = found(tx.update_film(id, update).await, "film", id);
    finish(tx, outcome).await
}
