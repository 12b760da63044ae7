//! In-process gateway.
//!
//! A transaction holds the store's mutex for its whole lifetime and works on a
//! staged copy of the tables, so transactions are serializable and an
//! uncommitted one leaves no trace.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::{Gateway, StoreError, StoreResult, Transaction, BOOKING_SEAT_INDEX};
use crate::models::{
    booking_model::{Booking, NewBooking},
    cinema_model::{Cinema, CinemaUpdate, NewCinema},
    film_model::{Film, FilmUpdate, NewFilm},
    hall_model::{Hall, HallUpdate, NewHall},
    showing_model::{NewShowing, Showing, ShowingFilter},
};

#[derive(Debug, Clone, Default)]
struct Tables {
    cinemas: BTreeMap<i64, Cinema>,
    halls: BTreeMap<i64, Hall>,
    films: BTreeMap<i64, Film>,
    showings: BTreeMap<i64, Showing>,
    bookings: BTreeMap<i64, Booking>,
    last_ids: Sequences,
}

#[derive(Debug, Clone, Default)]
struct Sequences {
    cinema: i64,
    hall: i64,
    film: i64,
    showing: i64,
    booking: i64,
}

fn next(sequence: &mut i64) -> i64 {
    *sequence += 1;
    *sequence
}

#[derive(Clone, Default)]
pub struct MemoryGateway {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Gateway for MemoryGateway {
    async fn begin(&self) -> StoreResult<Box<dyn Transaction>> {
        let guard = self.tables.clone().lock_owned().await;
        let staged = guard.clone();
        Ok(Box::new(MemoryTransaction { guard, staged }))
    }
}

pub struct MemoryTransaction {
    guard: OwnedMutexGuard<Tables>,
    staged: Tables,
}

#[async_trait]
impl Transaction for MemoryTransaction {
    async fn lock_hall(&mut self, _hall_id: i64) -> StoreResult<()> {
        // The store-wide guard already excludes every other transaction.
        Ok(())
    }

    async fn insert_cinema(&mut self, cinema: NewCinema) -> StoreResult<Cinema> {
        let id = next(&mut self.staged.last_ids.cinema);
        let cinema = Cinema {
            id,
            name: cinema.name,
            city: cinema.city,
        };
        self.staged.cinemas.insert(id, cinema.clone());
        Ok(cinema)
    }

    async fn get_cinema(&mut self, id: i64) -> StoreResult<Option<Cinema>> {
        Ok(self.staged.cinemas.get(&id).cloned())
    }

    async fn list_cinemas(&mut self) -> StoreResult<Vec<Cinema>> {
        Ok(self.staged.cinemas.values().cloned().collect())
    }

    async fn update_cinema(
        &mut self,
        id: i64,
        update: CinemaUpdate,
    ) -> StoreResult<Option<Cinema>> {
        Ok(self.staged.cinemas.get_mut(&id).map(|cinema| {
            cinema.apply(&update);
            cinema.clone()
        }))
    }

    async fn insert_hall(&mut self, id_cinema: i64, hall: NewHall) -> StoreResult<Hall> {
        let id = next(&mut self.staged.last_ids.hall);
        let hall = Hall {
            id,
            id_cinema,
            name: hall.name,
            rows: hall.rows,
            places_in_row: hall.places_in_row,
        };
        self.staged.halls.insert(id, hall.clone());
        Ok(hall)
    }

    async fn get_hall(&mut self, id: i64) -> StoreResult<Option<Hall>> {
        Ok(self.staged.halls.get(&id).cloned())
    }

    async fn list_halls(&mut self, id_cinema: Option<i64>) -> StoreResult<Vec<Hall>> {
        Ok(self
            .staged
            .halls
            .values()
            .filter(|hall| id_cinema.map_or(true, |cinema| hall.id_cinema == cinema))
            .cloned()
            .collect())
    }

    async fn update_hall(&mut self, id: i64, update: HallUpdate) -> StoreResult<Option<Hall>> {
        Ok(self.staged.halls.get_mut(&id).map(|hall| {
            hall.apply(&update);
            hall.clone()
        }))
    }

    async fn insert_film(&mut self, film: NewFilm) -> StoreResult<Film> {
        let id = next(&mut self.staged.last_ids.film);
        let film = Film {
            id,
            title: film.title,
            genre: film.genre,
            cast: film.cast,
            description: film.description,
            duration: film.duration,
        };
        self.staged.films.insert(id, film.clone());
        Ok(film)
    }

    async fn get_film(&mut self, id: i64) -> StoreResult<Option<Film>> {
        Ok(self.staged.films.get(&id).cloned())
    }

    async fn list_films(&mut self) -> StoreResult<Vec<Film>> {
        Ok(self.staged.films.values().cloned().collect())
    }

    async fn update_film(&mut self, id: i64, update: FilmUpdate) -> StoreResult<Option<Film>> {
        Ok(self.staged.films.get_mut(&id).map(|film| {
            film.apply(&update);
            film.clone()
        }))
    }

    async fn insert_showing(&mut self, showing: NewShowing) -> StoreResult<Showing> {
        let id = next(&mut self.staged.last_ids.showing);
        let showing = showing.into_showing(id);
        self.staged.showings.insert(id, showing.clone());
        Ok(showing)
    }

    async fn get_showing(&mut self, id: i64) -> StoreResult<Option<Showing>> {
        Ok(self.staged.showings.get(&id).cloned())
    }

    async fn list_showings(&mut self, filter: ShowingFilter) -> StoreResult<Vec<Showing>> {
        Ok(self
            .staged
            .showings
            .values()
            .filter(|showing| filter.matches(showing))
            .cloned()
            .collect())
    }

    async fn hall_showings(&mut self, hall_id: i64) -> StoreResult<Vec<Showing>> {
        Ok(self
            .staged
            .showings
            .values()
            .filter(|showing| showing.id_hall == hall_id)
            .cloned()
            .collect())
    }

    async fn hall_showings_between(
        &mut self,
        hall_id: i64,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> StoreResult<Vec<Showing>> {
        Ok(self
            .staged
            .showings
            .values()
            .filter(|showing| {
                showing.id_hall == hall_id && showing.start_time <= to && showing.end_time >= from
            })
            .cloned()
            .collect())
    }

    async fn delete_showing(&mut self, id: i64) -> StoreResult<bool> {
        Ok(self.staged.showings.remove(&id).is_some())
    }

    async fn insert_booking(&mut self, booking: NewBooking) -> StoreResult<Booking> {
        let taken = self
            .staged
            .bookings
            .values()
            .any(|existing| existing.occupies(booking.id_film_show, booking.row, booking.place));
        if taken {
            return Err(StoreError::UniqueViolation(BOOKING_SEAT_INDEX));
        }

        let id = next(&mut self.staged.last_ids.booking);
        let booking = Booking {
            id,
            id_film_show: booking.id_film_show,
            row: booking.row,
            place: booking.place,
        };
        self.staged.bookings.insert(id, booking.clone());
        Ok(booking)
    }

    async fn get_booking(&mut self, id: i64) -> StoreResult<Option<Booking>> {
        Ok(self.staged.bookings.get(&id).cloned())
    }

    async fn list_bookings(&mut self) -> StoreResult<Vec<Booking>> {
        Ok(self.staged.bookings.values().cloned().collect())
    }

    async fn delete_booking(&mut self, id: i64) -> StoreResult<bool> {
        Ok(self.staged.bookings.remove(&id).is_some())
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        let MemoryTransaction { mut guard, staged } = *self;
        *guard = staged;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> StoreResult<()> {
        Ok(())
    }
}
