use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// A scheduled screening of a film in a hall.
///
/// `end_time` is derived from the film's duration when the showing is created
/// and is never recomputed. Showings are immutable; they can only be deleted.
#[derive(Debug, Clone, PartialEq)]
pub struct Showing {
    pub id: i64,
    pub id_hall: i64,
    pub id_film: i64,
    pub show_date: NaiveDate,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
}

/// A fully computed showing that has not been persisted yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewShowing {
    pub id_hall: i64,
    pub id_film: i64,
    pub show_date: NaiveDate,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
}

impl NewShowing {
    pub fn into_showing(self, id: i64) -> Showing {
        Showing {
            id,
            id_hall: self.id_hall,
            id_film: self.id_film,
            show_date: self.show_date,
            start_time: self.start_time,
            end_time: self.end_time,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct ShowingRequest {
    pub start_time: String,
    pub id_hall: i64,
    pub id_film: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ShowingResponse {
    pub id: i64,
    pub show_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub id_hall: i64,
    pub id_film: i64,
}

impl From<&Showing> for ShowingResponse {
    fn from(showing: &Showing) -> Self {
        ShowingResponse {
            id: showing.id,
            show_date: showing.show_date,
            start_time: showing.start_time.time(),
            end_time: showing.end_time.time(),
            id_hall: showing.id_hall,
            id_film: showing.id_film,
        }
    }
}

#[derive(Deserialize, Debug, Default)]
pub struct ShowingListQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Instant bounds applied to a showing listing. `None` leaves that side open.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ShowingFilter {
    pub starts_at_or_after: Option<NaiveDateTime>,
    pub ends_before: Option<NaiveDateTime>,
}

impl ShowingFilter {
    pub fn matches(&self, showing: &Showing) -> bool {
        let after = self
            .starts_at_or_after
            .map_or(true, |bound| showing.start_time >= bound);
        let before = self
            .ends_before
            .map_or(true, |bound| showing.end_time < bound);
        after && before
    }
}
