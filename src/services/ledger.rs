//! Seat bookings.
//!
//! A seat of a showing is held by at most one booking. That guarantee lives in
//! the storage layer's unique index over `(film show, row, place)`: two racing
//! bookings of one seat both reach the insert, and the loser's index violation
//! is reported as [`CinemaError::SeatTaken`]. A backend that detects the race
//! as a write conflict before either side commits reports the loser as busy
//! instead, and a retry then sees the taken seat.

use super::found;
use crate::clock::Clock;
use crate::error::CinemaError;
use crate::models::booking_model::{Booking, NewBooking};
use crate::store::{finish, Gateway, StoreError, Transaction};

/// Books one seat. Fails once the showing has started, even by a second.
#[tracing::instrument(skip(gateway, clock))]
pub async fn book(
    gateway: &dyn Gateway,
    clock: &dyn Clock,
    request: NewBooking,
) -> Result<Booking, CinemaError> {
    let mut tx = gateway.begin().await?;
    let outcome = book_in(tx.as_mut(), clock, request).await;
    finish(tx, outcome).await
}

async fn book_in(
    tx: &mut dyn Transaction,
    clock: &dyn Clock,
    request: NewBooking,
) -> Result<Booking, CinemaError> {
    let showing_id = request.id_film_show;
    let showing = found(tx.get_showing(showing_id).await, "film show", showing_id)?;

    if clock.now() >= showing.start_time {
        tracing::info!(showing_id, "booking refused, film show already started");
        return Err(CinemaError::ShowAlreadyStarted { showing_id });
    }

    let hall = found(tx.get_hall(showing.id_hall).await, "hall", showing.id_hall)?;
    if !hall.has_seat(request.row, request.place) {
        return Err(CinemaError::invalid(format!(
            "hall {} has no seat at row {}, place {}",
            hall.id, request.row, request.place
        )));
    }

    match tx.insert_booking(request).await {
        Ok(booking) => {
            tracing::info!(booking_id = booking.id, showing_id, "seat booked");
            Ok(booking)
        }
        Err(StoreError::UniqueViolation(_)) => {
            tracing::info!(
                showing_id,
                row = request.row,
                place = request.place,
                "seat already taken"
            );
            Err(CinemaError::SeatTaken {
                showing_id,
                row: request.row,
                place: request.place,
            })
        }
        Err(err) => Err(err.into()),
    }
}

pub async fn get_booking(gateway: &dyn Gateway, id: i64) -> Result<Booking, CinemaError> {
    let mut tx = gateway.begin().await?;
    let outcome = found(tx.get_booking(id).await, "booking", id);
    finish(tx, outcome).await
}

/// All bookings in creation order.
pub async fn list_bookings(gateway: &dyn Gateway) -> Result<Vec<Booking>, CinemaError> {
    let mut tx = gateway.begin().await?;
    let outcome = tx.list_bookings().await.map_err(CinemaError::from);
    finish(tx, outcome).await
}

#[tracing::instrument(skip(gateway))]
pub async fn delete_booking(gateway: &dyn Gateway, id: i64) -> Result<(), CinemaError> {
    let mut tx = gateway.begin().await?;
    let outcome = match tx.delete_booking(id).await {
        Ok(true) => Ok(()),
        Ok(false) => Err(CinemaError::not_found("booking", id)),
        Err(err) => Err(err.into()),
    };
    finish(tx, outcome).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{FixedClock, SystemClock};
    use crate::models::{film_model::NewFilm, hall_model::NewHall, showing_model::NewShowing};
    use crate::services::scheduler::schedule;
    use crate::store::memory::MemoryGateway;
    use crate::utils::parse_start_time;
    use chrono::{Duration, FixedOffset, NaiveDate, NaiveDateTime, Utc};
    use std::sync::Arc;

    fn show_start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2021, 6, 1)
            .unwrap()
            .and_hms_opt(20, 0, 0)
            .unwrap()
    }

    fn before_show() -> FixedClock {
        FixedClock(show_start() - Duration::hours(1))
    }

    /// Returns `(hall_id, film_id)` for a 20x20 hall and a 120 minute film.
    async fn seed_hall_and_film(gateway: &MemoryGateway) -> (i64, i64) {
        let mut tx = gateway.begin().await.unwrap();
        let hall = tx
            .insert_hall(
                1,
                NewHall {
                    name: "First".to_string(),
                    rows: 20,
                    places_in_row: 20,
                },
            )
            .await
            .unwrap();
        let film = tx
            .insert_film(NewFilm {
                title: "The Avengers".to_string(),
                genre: "Fantastic".to_string(),
                cast: "Chris Evans".to_string(),
                description: "Big fight".to_string(),
                duration: 120,
            })
            .await
            .unwrap();
        tx.commit().await.unwrap();
        (hall.id, film.id)
    }

    /// Seeds a 20x20 hall with one showing at [`show_start`] and returns its id.
    async fn seed(gateway: &MemoryGateway) -> i64 {
        let (hall, film) = seed_hall_and_film(gateway).await;
        let mut tx = gateway.begin().await.unwrap();
        let showing = tx
            .insert_showing(NewShowing {
                id_hall: hall,
                id_film: film,
                show_date: show_start().date(),
                start_time: show_start(),
                end_time: show_start() + Duration::minutes(120),
            })
            .await
            .unwrap();
        tx.commit().await.unwrap();
        showing.id
    }

    fn seat(id_film_show: i64, row: i32, place: i32) -> NewBooking {
        NewBooking {
            id_film_show,
            row,
            place,
        }
    }

    #[tokio::test]
    async fn second_booking_of_a_seat_is_refused() {
        let gateway = MemoryGateway::new();
        let showing = seed(&gateway).await;

        let booking = book(&gateway, &before_show(), seat(showing, 20, 20))
            .await
            .unwrap();
        assert_eq!(booking.id_film_show, showing);
        assert_eq!((booking.row, booking.place), (20, 20));

        let again = book(&gateway, &before_show(), seat(showing, 20, 20)).await;
        assert!(matches!(
            again,
            Err(CinemaError::SeatTaken { row: 20, place: 20, .. })
        ));

        book(&gateway, &before_show(), seat(showing, 20, 19))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn booking_closes_at_start_time() {
        let gateway = MemoryGateway::new();
        let showing = seed(&gateway).await;

        let one_second_before = FixedClock(show_start() - Duration::seconds(1));
        book(&gateway, &one_second_before, seat(showing, 1, 1))
            .await
            .unwrap();

        for now in [show_start(), show_start() + Duration::seconds(1)] {
            let late = book(&gateway, &FixedClock(now), seat(showing, 1, 2)).await;
            assert!(matches!(late, Err(CinemaError::ShowAlreadyStarted { .. })));
        }
    }

    #[tokio::test]
    async fn offset_start_times_are_compared_with_the_system_clock() {
        let gateway = MemoryGateway::new();
        let (hall, film) = seed_hall_and_film(&gateway).await;
        let moscow = FixedOffset::east_opt(3 * 3600).unwrap();

        let soon = (Utc::now() + Duration::hours(2))
            .with_timezone(&moscow)
            .to_rfc3339();
        let soon = schedule(&gateway, hall, film, parse_start_time(&soon).unwrap())
            .await
            .unwrap();
        book(&gateway, &SystemClock, seat(soon.id, 1, 1))
            .await
            .unwrap();

        let started = (Utc::now() - Duration::hours(3))
            .with_timezone(&moscow)
            .to_rfc3339();
        let started = schedule(&gateway, hall, film, parse_start_time(&started).unwrap())
            .await
            .unwrap();
        let late = book(&gateway, &SystemClock, seat(started.id, 1, 1)).await;
        assert!(matches!(late, Err(CinemaError::ShowAlreadyStarted { .. })));
    }

    #[tokio::test]
    async fn unknown_showing_is_not_found() {
        let gateway = MemoryGateway::new();
        let err = book(&gateway, &before_show(), seat(99, 1, 1))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CinemaError::NotFound {
                entity: "film show",
                id: 99
            }
        ));
    }

    #[tokio::test]
    async fn seat_outside_hall_is_invalid() {
        let gateway = MemoryGateway::new();
        let showing = seed(&gateway).await;

        for (row, place) in [(0, 1), (21, 1), (1, 21), (-1, -1)] {
            let err = book(&gateway, &before_show(), seat(showing, row, place))
                .await
                .unwrap_err();
            assert!(matches!(err, CinemaError::InvalidInput(_)));
        }
    }

    #[tokio::test]
    async fn concurrent_bookings_of_one_seat_admit_exactly_one() {
        let gateway = Arc::new(MemoryGateway::new());
        let showing = seed(&gateway).await;

        let attempts: Vec<_> = (0..16)
            .map(|_| {
                let gateway = gateway.clone();
                tokio::spawn(async move {
                    book(gateway.as_ref(), &before_show(), seat(showing, 5, 5)).await
                })
            })
            .collect();

        let mut booked = 0;
        let mut taken = 0;
        for attempt in attempts {
            match attempt.await.unwrap() {
                Ok(_) => booked += 1,
                Err(CinemaError::SeatTaken { .. }) => taken += 1,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }
        assert_eq!((booked, taken), (1, 15));
    }

    #[tokio::test]
    async fn list_is_ordered_and_delete_removes() {
        let gateway = MemoryGateway::new();
        let showing = seed(&gateway).await;

        let first = book(&gateway, &before_show(), seat(showing, 1, 1))
            .await
            .unwrap();
        let second = book(&gateway, &before_show(), seat(showing, 1, 2))
            .await
            .unwrap();
        assert_eq!(
            list_bookings(&gateway).await.unwrap(),
            vec![first.clone(), second.clone()]
        );

        delete_booking(&gateway, first.id).await.unwrap();
        assert!(matches!(
            get_booking(&gateway, first.id).await,
            Err(CinemaError::NotFound { .. })
        ));
        assert!(matches!(
            delete_booking(&gateway, first.id).await,
            Err(CinemaError::NotFound { .. })
        ));
        assert_eq!(get_booking(&gateway, second.id).await.unwrap(), second);
    }
}
