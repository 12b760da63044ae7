//! Persistence gateway.
//!
//! Core operations never touch a database client directly. They open one
//! [`Transaction`] per call through a [`Gateway`], do their reads and their
//! single conditioned write on it, and hand it back to [`finish`] which
//! commits on success and rolls back on every error path.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use thiserror::Error;

use crate::error::CinemaError;
use crate::models::{
    booking_model::{Booking, NewBooking},
    cinema_model::{Cinema, CinemaUpdate, NewCinema},
    film_model::{Film, FilmUpdate, NewFilm},
    hall_model::{Hall, HallUpdate, NewHall},
    showing_model::{NewShowing, Showing, ShowingFilter},
};

pub mod memory;
pub mod mongo;

/// Name of the unique index over `(film_show, row, place)`.
pub const BOOKING_SEAT_INDEX: &str = "booking_showing_row_place";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unique constraint `{0}` violated")]
    UniqueViolation(&'static str),

    /// The transaction lost a write conflict against a concurrent one.
    #[error("storage is busy with a concurrent change, try again")]
    Busy,

    #[error("storage backend failure: {0}")]
    Backend(#[from] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait Gateway: Send + Sync {
    async fn begin(&self) -> StoreResult<Box<dyn Transaction>>;
}

/// One storage transaction. Dropping it without [`Transaction::commit`]
/// discards everything it wrote.
#[async_trait]
pub trait Transaction: Send {
    /// Serializes every other transaction that locks the same hall until this
    /// one ends.
    async fn lock_hall(&mut self, hall_id: i64) -> StoreResult<()>;

    async fn insert_cinema(&mut self, cinema: NewCinema) -> StoreResult<Cinema>;
    async fn get_cinema(&mut self, id: i64) -> StoreResult<Option<Cinema>>;
    async fn list_cinemas(&mut self) -> StoreResult<Vec<Cinema>>;
    async fn update_cinema(&mut self, id: i64, update: CinemaUpdate)
        -> StoreResult<Option<Cinema>>;

    async fn insert_hall(&mut self, id_cinema: i64, hall: NewHall) -> StoreResult<Hall>;
    async fn get_hall(&mut self, id: i64) -> StoreResult<Option<Hall>>;
    /// Halls ordered by id, optionally only those of one cinema.
    async fn list_halls(&mut self, id_cinema: Option<i64>) -> StoreResult<Vec<Hall>>;
    async fn update_hall(&mut self, id: i64, update: HallUpdate) -> StoreResult<Option<Hall>>;

    async fn insert_film(&mut self, film: NewFilm) -> StoreResult<Film>;
    async fn get_film(&mut self, id: i64) -> StoreResult<Option<Film>>;
    async fn list_films(&mut self) -> StoreResult<Vec<Film>>;
    async fn update_film(&mut self, id: i64, update: FilmUpdate) -> StoreResult<Option<Film>>;

    async fn insert_showing(&mut self, showing: NewShowing) -> StoreResult<Showing>;
    async fn get_showing(&mut self, id: i64) -> StoreResult<Option<Showing>>;
    /// Showings matching `filter`, ordered by id.
    async fn list_showings(&mut self, filter: ShowingFilter) -> StoreResult<Vec<Showing>>;
    /// Every showing of one hall, ordered by id.
    async fn hall_showings(&mut self, hall_id: i64) -> StoreResult<Vec<Showing>>;
    /// Showings of one hall whose `[start_time, end_time]` shares at least one
    /// instant with `[from, to]`, ordered by id.
    async fn hall_showings_between(
        &mut self,
        hall_id: i64,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> StoreResult<Vec<Showing>>;
    /// Returns whether a showing was removed.
    async fn delete_showing(&mut self, id: i64) -> StoreResult<bool>;

    /// Fails with [`StoreError::UniqueViolation`] naming [`BOOKING_SEAT_INDEX`]
    /// when the seat is already booked, including by a concurrent transaction.
    async fn insert_booking(&mut self, booking: NewBooking) -> StoreResult<Booking>;
    async fn get_booking(&mut self, id: i64) -> StoreResult<Option<Booking>>;
    async fn list_bookings(&mut self) -> StoreResult<Vec<Booking>>;
    async fn delete_booking(&mut self, id: i64) -> StoreResult<bool>;

    async fn commit(self: Box<Self>) -> StoreResult<()>;
    async fn rollback(self: Box<Self>) -> StoreResult<()>;
}

/// Ends `tx` according to `outcome`: commit on `Ok`, rollback on `Err`.
///
/// A failed rollback is logged and the operation's own error is returned, since the
/// transaction is discarded by the backend either way.
pub async fn finish<T>(
    tx: Box<dyn Transaction>,
    outcome: Result<T, CinemaError>,
) -> Result<T, CinemaError> {
    match outcome {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::warn!(error = %rollback_err, "rollback failed");
            }
            Err(err)
        }
    }
}
