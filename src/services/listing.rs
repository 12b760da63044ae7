//! Showing queries.
//!
//! Listings use a cinema day that runs from 07:00 to 07:00 the next morning,
//! so a 01:30 showing is listed under the previous date.

use chrono::{NaiveDate, NaiveDateTime};

use super::found;
use crate::error::CinemaError;
use crate::models::showing_model::{Showing, ShowingFilter};
use crate::store::{finish, Gateway};
use crate::utils::parse_date;

pub const DAY_START_HOUR: u32 = 7;

fn day_start(date: NaiveDate) -> Result<NaiveDateTime, CinemaError> {
    date.and_hms_opt(DAY_START_HOUR, 0, 0)
        .ok_or_else(|| CinemaError::invalid(format!("no day start for {date}")))
}

/// Bounds for showings that start on or after `start_date`'s day and end
/// before `end_date`'s day is over. Both dates are inclusive.
pub fn day_window(
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
) -> Result<ShowingFilter, CinemaError> {
    let starts_at_or_after = start_date.map(day_start).transpose()?;
    let ends_before = end_date
        .map(|date| {
            let next_day = date
                .succ_opt()
                .ok_or_else(|| CinemaError::invalid(format!("date {date} is out of range")))?;
            day_start(next_day)
        })
        .transpose()?;
    Ok(ShowingFilter {
        starts_at_or_after,
        ends_before,
    })
}

/// Lists showings by id within the day window of the given `YYYY-MM-DD` dates.
///
/// Malformed dates are rejected before storage is touched.
#[tracing::instrument(skip(gateway))]
pub async fn list_showings(
    gateway: &dyn Gateway,
    start_date: Option<&str>,
    end_date: Option<&str>,
) -> Result<Vec<Showing>, CinemaError> {
    let filter = day_window(parse_date(start_date)?, parse_date(end_date)?)?;

    let mut tx = gateway.begin().await?;
    let outcome = tx.list_showings(filter).await.map_err(CinemaError::from);
    finish(tx, outcome).await
}

pub async fn get_showing(gateway: &dyn Gateway, id: i64) -> Result<Showing, CinemaError> {
    let mut tx = gateway.begin().await?;
    let outcome = found(tx.get_showing(id).await, "film show", id);
    finish(tx, outcome).await
}

/// Showings of one hall of one cinema. A hall without showings is reported
/// as not found.
pub async fn hall_showings(
    gateway: &dyn Gateway,
    cinema_id: i64,
    hall_id: i64,
) -> Result<Vec<Showing>, CinemaError> {
    let mut tx = gateway.begin().await?;
    let outcome = async {
        found(tx.get_cinema(cinema_id).await, "cinema", cinema_id)?;
        let hall = found(tx.get_hall(hall_id).await, "hall", hall_id)?;
        if hall.id_cinema != cinema_id {
            return Err(CinemaError::not_found("hall", hall_id));
        }
        let showings = tx.hall_showings(hall_id).await?;
        if showings.is_empty() {
            return Err(CinemaError::not_found("film shows of hall", hall_id));
        }
        Ok::<_, CinemaError>(showings)
    }
    .await;
    finish(tx, outcome).await
}
