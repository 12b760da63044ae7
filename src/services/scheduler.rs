//! Showtime scheduling.
//!
//! A showing occupies its hall over the closed interval `[start, end]`, with
//! `end = start + film duration`. No two showings of one hall may share an
//! instant, touching endpoints included, so back-to-back showings need at
//! least a minute between them.

use chrono::{Duration, NaiveDateTime};

use super::found;
use crate::error::CinemaError;
use crate::models::{
    film_model::Film,
    showing_model::{NewShowing, Showing},
};
use crate::store::{finish, Gateway, Transaction};

/// The closed interval a showing occupies its hall for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShowTime {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl ShowTime {
    pub fn for_film(start: NaiveDateTime, film: &Film) -> Result<Self, CinemaError> {
        if film.duration <= 0 {
            return Err(CinemaError::invalid(format!(
                "film {} has a non-positive duration",
                film.id
            )));
        }
        let end = start
            .checked_add_signed(Duration::minutes(i64::from(film.duration)))
            .ok_or_else(|| CinemaError::invalid("show end time is out of range"))?;
        Ok(ShowTime { start, end })
    }

    pub fn of(showing: &Showing) -> Self {
        ShowTime {
            start: showing.start_time,
            end: showing.end_time,
        }
    }

    pub fn overlaps(&self, other: &ShowTime) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

/// Creates a showing of `id_film` in `id_hall` starting at `start_time`.
///
/// Start times in the past are accepted.
#[tracing::instrument(skip(gateway))]
pub async fn schedule(
    gateway: &dyn Gateway,
    id_hall: i64,
    id_film: i64,
    start_time: NaiveDateTime,
) -> Result<Showing, CinemaError> {
    let mut tx = gateway.begin().await?;
    let outcome = schedule_in(tx.as_mut(), id_hall, id_film, start_time).await;
    finish(tx, outcome).await
}

async fn schedule_in(
    tx: &mut dyn Transaction,
    id_hall: i64,
    id_film: i64,
    start_time: NaiveDateTime,
) -> Result<Showing, CinemaError> {
    let film = found(tx.get_film(id_film).await, "film", id_film)?;
    found(tx.get_hall(id_hall).await, "hall", id_hall)?;
    let show_time = ShowTime::for_film(start_time, &film)?;

    // Held until commit, so the check below and the insert are atomic per hall.
    tx.lock_hall(id_hall).await?;

    let busy = tx
        .hall_showings_between(id_hall, show_time.start, show_time.end)
        .await?
        .into_iter()
        .find(|existing| show_time.overlaps(&ShowTime::of(existing)));
    if let Some(existing) = busy {
        tracing::info!(
            hall_id = id_hall,
            conflicting_show = existing.id,
            "show time already busy"
        );
        return Err(CinemaError::Conflict {
            hall_id: id_hall,
            showing_id: existing.id,
        });
    }

    let showing = tx
        .insert_showing(NewShowing {
            id_hall,
            id_film,
            show_date: start_time.date(),
            start_time: show_time.start,
            end_time: show_time.end,
        })
        .await?;
    tracing::info!(showing_id = showing.id, hall_id = id_hall, "film show scheduled");
    Ok(showing)
}

/// Removes a showing. Its bookings are left untouched.
#[tracing::instrument(skip(gateway))]
pub async fn delete_showing(gateway: &dyn Gateway, id: i64) -> Result<(), CinemaError> {
    let mut tx = gateway.begin().await?;
    let outcome = match tx.delete_showing(id).await {
        Ok(true) => Ok(()),
        Ok(false) => Err(CinemaError::not_found("film show", id)),
        Err(err) => Err(err.into()),
    };
    finish(tx, outcome).await
}
