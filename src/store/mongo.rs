//! MongoDB gateway.
//!
//! Each [`Transaction`] is a `ClientSession` with a snapshot transaction
//! running on it. Integer ids come from the `counters` collection and are
//! drawn outside the session, so allocating an id never makes two
//! transactions collide. Hall locks are plain documents in `hall_locks` that
//! a transaction increments; MongoDB aborts the second of two concurrent
//! writers to the same document, which is what serializes scheduling per hall.

use anyhow::Context;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, TimeZone, Utc};
use futures::TryStreamExt;
use mongodb::{
    bson::{self, doc, Bson, DateTime, Document},
    error::{Error as MongoError, ErrorKind, WriteFailure, TRANSIENT_TRANSACTION_ERROR},
    options::{
        Acknowledgment, FindOneAndUpdateOptions, FindOptions, IndexOptions, ReadConcern,
        ReturnDocument, TransactionOptions, UpdateOptions, WriteConcern,
    },
    Client, ClientSession, Collection, Database, IndexModel,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use super::{Gateway, StoreError, StoreResult, Transaction, BOOKING_SEAT_INDEX};
use crate::models::{
    booking_model::{Booking, NewBooking},
    cinema_model::{Cinema, CinemaUpdate, NewCinema},
    film_model::{Film, FilmUpdate, NewFilm},
    hall_model::{Hall, HallUpdate, NewHall},
    showing_model::{NewShowing, Showing, ShowingFilter},
};

const CINEMAS: &str = "cinemas";
const HALLS: &str = "halls";
const FILMS: &str = "films";
const SHOWINGS: &str = "film_shows";
const BOOKINGS: &str = "bookings";
const COUNTERS: &str = "counters";
const HALL_LOCKS: &str = "hall_locks";

const DUPLICATE_KEY: i32 = 11000;
const WRITE_CONFLICT: i32 = 112;

#[derive(Clone)]
pub struct MongoGateway {
    client: Client,
    db: Database,
}

impl MongoGateway {
    pub fn new(client: Client, database: &str) -> Self {
        let db = client.database(database);
        MongoGateway { client, db }
    }

    pub async fn ping(&self) -> anyhow::Result<()> {
        self.db
            .run_command(doc! {"ping": 1}, None)
            .await
            .context("failed to ping MongoDB")?;
        Ok(())
    }

    /// Creates the seat uniqueness index and the lookup indexes. Idempotent.
    pub async fn ensure_indexes(&self) -> anyhow::Result<()> {
        let seat_index = IndexModel::builder()
            .keys(doc! {"id_film_show": 1, "row": 1, "place": 1})
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name(BOOKING_SEAT_INDEX.to_string())
                    .build(),
            )
            .build();
        self.db
            .collection::<Document>(BOOKINGS)
            .create_index(seat_index, None)
            .await
            .context("failed to create booking seat index")?;

        let hall_schedule = IndexModel::builder()
            .keys(doc! {"id_hall": 1, "start_time": 1})
            .build();
        self.db
            .collection::<Document>(SHOWINGS)
            .create_index(hall_schedule, None)
            .await
            .context("failed to create film show index")?;

        let cinema_halls = IndexModel::builder().keys(doc! {"id_cinema": 1}).build();
        self.db
            .collection::<Document>(HALLS)
            .create_index(cinema_halls, None)
            .await
            .context("failed to create hall index")?;

        Ok(())
    }
}

#[async_trait]
impl Gateway for MongoGateway {
    async fn begin(&self) -> StoreResult<Box<dyn Transaction>> {
        let mut session = self.client.start_session(None).await.map_err(classify)?;
        let options = TransactionOptions::builder()
            .read_concern(ReadConcern::snapshot())
            .write_concern(WriteConcern::builder().w(Acknowledgment::Majority).build())
            .build();
        session.start_transaction(options).await.map_err(classify)?;

        Ok(Box::new(MongoTransaction {
            db: self.db.clone(),
            session,
        }))
    }
}

fn error_code(err: &MongoError) -> Option<i32> {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => Some(write_error.code),
        ErrorKind::Command(command_error) => Some(command_error.code),
        _ => None,
    }
}

/// Only a duplicate key proves the seat is held by a committed booking.
fn is_seat_collision(code: Option<i32>) -> bool {
    code == Some(DUPLICATE_KEY)
}

/// A write conflict or transient transaction error means another transaction
/// got there first; the caller may retry.
fn is_retryable(code: Option<i32>, transient: bool) -> bool {
    code == Some(WRITE_CONFLICT) || transient
}

fn classify(err: MongoError) -> StoreError {
    if is_retryable(error_code(&err), err.contains_label(TRANSIENT_TRANSACTION_ERROR)) {
        StoreError::Busy
    } else {
        StoreError::Backend(err.into())
    }
}

fn to_bson_datetime(value: NaiveDateTime) -> DateTime {
    DateTime::from_chrono(Utc.from_utc_datetime(&value))
}

fn from_bson_datetime(value: DateTime) -> NaiveDateTime {
    value.to_chrono().naive_utc()
}

/// Turns a partial update into a `$set` body, dropping fields left as `None`.
fn set_fields<T: Serialize>(update: &T) -> StoreResult<Document> {
    let document = bson::to_document(update).context("failed to encode update")?;
    Ok(document
        .into_iter()
        .filter(|(_, value)| !matches!(value, Bson::Null))
        .collect())
}

async fn next_id(db: &Database, sequence: &str) -> StoreResult<i64> {
    let options = FindOneAndUpdateOptions::builder()
        .upsert(true)
        .return_document(ReturnDocument::After)
        .build();
    let counter = db
        .collection::<Document>(COUNTERS)
        .find_one_and_update(doc! {"_id": sequence}, doc! {"$inc": {"seq": 1_i64}}, options)
        .await
        .map_err(classify)?
        .context("counter upsert returned no document")?;
    let id = counter
        .get_i64("seq")
        .context("counter document has no integer `seq`")?;
    Ok(id)
}

#[derive(Debug, Serialize, Deserialize)]
struct CinemaRecord {
    #[serde(rename = "_id")]
    id: i64,
    name: String,
    city: String,
}

impl From<CinemaRecord> for Cinema {
    fn from(record: CinemaRecord) -> Self {
        Cinema {
            id: record.id,
            name: record.name,
            city: record.city,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct HallRecord {
    #[serde(rename = "_id")]
    id: i64,
    id_cinema: i64,
    name: String,
    rows: i32,
    places_in_row: i32,
}

impl From<HallRecord> for Hall {
    fn from(record: HallRecord) -> Self {
        Hall {
            id: record.id,
            id_cinema: record.id_cinema,
            name: record.name,
            rows: record.rows,
            places_in_row: record.places_in_row,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct FilmRecord {
    #[serde(rename = "_id")]
    id: i64,
    title: String,
    genre: String,
    cast: String,
    description: String,
    duration: i32,
}

impl From<FilmRecord> for Film {
    fn from(record: FilmRecord) -> Self {
        Film {
            id: record.id,
            title: record.title,
            genre: record.genre,
            cast: record.cast,
            description: record.description,
            duration: record.duration,
        }
    }
}

/// Wall-clock instants are stored as BSON dates read as UTC.
#[derive(Debug, Serialize, Deserialize)]
struct ShowingRecord {
    #[serde(rename = "_id")]
    id: i64,
    id_hall: i64,
    id_film: i64,
    show_date: NaiveDate,
    start_time: DateTime,
    end_time: DateTime,
}

impl From<ShowingRecord> for Showing {
    fn from(record: ShowingRecord) -> Self {
        Showing {
            id: record.id,
            id_hall: record.id_hall,
            id_film: record.id_film,
            show_date: record.show_date,
            start_time: from_bson_datetime(record.start_time),
            end_time: from_bson_datetime(record.end_time),
        }
    }
}

impl From<&Showing> for ShowingRecord {
    fn from(showing: &Showing) -> Self {
        ShowingRecord {
            id: showing.id,
            id_hall: showing.id_hall,
            id_film: showing.id_film,
            show_date: showing.show_date,
            start_time: to_bson_datetime(showing.start_time),
            end_time: to_bson_datetime(showing.end_time),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct BookingRecord {
    #[serde(rename = "_id")]
    id: i64,
    id_film_show: i64,
    row: i32,
    place: i32,
}

impl From<BookingRecord> for Booking {
    fn from(record: BookingRecord) -> Self {
        Booking {
            id: record.id,
            id_film_show: record.id_film_show,
            row: record.row,
            place: record.place,
        }
    }
}

pub struct MongoTransaction {
    db: Database,
    session: ClientSession,
}

impl MongoTransaction {
    fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection::<T>(name)
    }

    async fn find_by_id<R, T>(&mut self, name: &str, id: i64) -> StoreResult<Option<T>>
    where
        R: DeserializeOwned + Unpin + Send + Sync,
        T: From<R>,
    {
        let record = self
            .collection::<R>(name)
            .find_one_with_session(doc! {"_id": id}, None, &mut self.session)
            .await
            .map_err(classify)?;
        Ok(record.map(T::from))
    }

    async fn find_all<R, T>(&mut self, name: &str, filter: Document) -> StoreResult<Vec<T>>
    where
        R: DeserializeOwned + Unpin + Send + Sync,
        T: From<R>,
    {
        let options = FindOptions::builder().sort(doc! {"_id": 1}).build();
        let mut cursor = self
            .collection::<R>(name)
            .find_with_session(filter, options, &mut self.session)
            .await
            .map_err(classify)?;
        let records: Vec<R> = cursor
            .stream(&mut self.session)
            .try_collect()
            .await
            .map_err(classify)?;
        Ok(records.into_iter().map(T::from).collect())
    }

    async fn insert<R: Serialize + Send + Sync>(
        &mut self,
        name: &str,
        record: &R,
    ) -> StoreResult<()> {
        self.collection::<R>(name)
            .insert_one_with_session(record, None, &mut self.session)
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn update_by_id<R, T, U>(
        &mut self,
        name: &str,
        id: i64,
        update: &U,
    ) -> StoreResult<Option<T>>
    where
        R: DeserializeOwned + Unpin + Send + Sync,
        T: From<R>,
        U: Serialize + Sync,
    {
        let fields = set_fields(update)?;
        if fields.is_empty() {
            return self.find_by_id::<R, T>(name, id).await;
        }

        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();
        let record = self
            .collection::<R>(name)
            .find_one_and_update_with_session(
                doc! {"_id": id},
                doc! {"$set": fields},
                options,
                &mut self.session,
            )
            .await
            .map_err(classify)?;
        Ok(record.map(T::from))
    }

    async fn delete_by_id(&mut self, name: &str, id: i64) -> StoreResult<bool> {
        let result = self
            .collection::<Document>(name)
            .delete_one_with_session(doc! {"_id": id}, None, &mut self.session)
            .await
            .map_err(classify)?;
        Ok(result.deleted_count == 1)
    }
}

#[async_trait]
impl Transaction for MongoTransaction {
    async fn lock_hall(&mut self, hall_id: i64) -> StoreResult<()> {
        let options = UpdateOptions::builder().upsert(true).build();
        let locked = self
            .collection::<Document>(HALL_LOCKS)
            .update_one_with_session(
                doc! {"_id": hall_id},
                doc! {"$inc": {"version": 1_i64}},
                options,
                &mut self.session,
            )
            .await;
        match locked {
            Ok(_) => Ok(()),
            // Two first-time upserts of the same lock race on `_id`.
            Err(err) if error_code(&err) == Some(DUPLICATE_KEY) => Err(StoreError::Busy),
            Err(err) => Err(classify(err)),
        }
    }

    async fn insert_cinema(&mut self, cinema: NewCinema) -> StoreResult<Cinema> {
        let record = CinemaRecord {
            id: next_id(&self.db, CINEMAS).await?,
            name: cinema.name,
            city: cinema.city,
        };
        self.insert(CINEMAS, &record).await?;
        Ok(record.into())
    }

    async fn get_cinema(&mut self, id: i64) -> StoreResult<Option<Cinema>> {
        self.find_by_id::<CinemaRecord, _>(CINEMAS, id).await
    }

    async fn list_cinemas(&mut self) -> StoreResult<Vec<Cinema>> {
        self.find_all::<CinemaRecord, _>(CINEMAS, doc! {}).await
    }

    async fn update_cinema(
        &mut self,
        id: i64,
        update: CinemaUpdate,
    ) -> StoreResult<Option<Cinema>> {
        self.update_by_id::<CinemaRecord, _, _>(CINEMAS, id, &update)
            .await
    }

    async fn insert_hall(&mut self, id_cinema: i64, hall: NewHall) -> StoreResult<Hall> {
        let record = HallRecord {
            id: next_id(&self.db, HALLS).await?,
            id_cinema,
            name: hall.name,
            rows: hall.rows,
            places_in_row: hall.places_in_row,
        };
        self.insert(HALLS, &record).await?;
        Ok(record.into())
    }

    async fn get_hall(&mut self, id: i64) -> StoreResult<Option<Hall>> {
        self.find_by_id::<HallRecord, _>(HALLS, id).await
    }

    async fn list_halls(&mut self, id_cinema: Option<i64>) -> StoreResult<Vec<Hall>> {
        let filter = match id_cinema {
            Some(id_cinema) => doc! {"id_cinema": id_cinema},
            None => doc! {},
        };
        self.find_all::<HallRecord, _>(HALLS, filter).await
    }

    async fn update_hall(&mut self, id: i64, update: HallUpdate) -> StoreResult<Option<Hall>> {
        self.update_by_id::<HallRecord, _, _>(HALLS, id, &update).await
    }

    async fn insert_film(&mut self, film: NewFilm) -> StoreResult<Film> {
        let record = FilmRecord {
            id: next_id(&self.db, FILMS).await?,
            title: film.title,
            genre: film.genre,
            cast: film.cast,
            description: film.description,
            duration: film.duration,
        };
        self.insert(FILMS, &record).await?;
        Ok(record.into())
    }

    async fn get_film(&mut self, id: i64) -> StoreResult<Option<Film>> {
        self.find_by_id::<FilmRecord, _>(FILMS, id).await
    }

    async fn list_films(&mut self) -> StoreResult<Vec<Film>> {
        self.find_all::<FilmRecord, _>(FILMS, doc! {}).await
    }

    async fn update_film(&mut self, id: i64, update: FilmUpdate) -> StoreResult<Option<Film>> {
        self.update_by_id::<FilmRecord, _, _>(FILMS, id, &update).await
    }

    async fn insert_showing(&mut self, showing: NewShowing) -> StoreResult<Showing> {
        let showing = showing.into_showing(next_id(&self.db, SHOWINGS).await?);
        self.insert(SHOWINGS, &ShowingRecord::from(&showing)).await?;
        Ok(showing)
    }

    async fn get_showing(&mut self, id: i64) -> StoreResult<Option<Showing>> {
        self.find_by_id::<ShowingRecord, _>(SHOWINGS, id).await
    }

    async fn list_showings(&mut self, filter: ShowingFilter) -> StoreResult<Vec<Showing>> {
        let mut query = Document::new();
        if let Some(bound) = filter.starts_at_or_after {
            query.insert("start_time", doc! {"$gte": to_bson_datetime(bound)});
        }
        if let Some(bound) = filter.ends_before {
            query.insert("end_time", doc! {"$lt": to_bson_datetime(bound)});
        }
        self.find_all::<ShowingRecord, _>(SHOWINGS, query).await
    }

    async fn hall_showings(&mut self, hall_id: i64) -> StoreResult<Vec<Showing>> {
        self.find_all::<ShowingRecord, _>(SHOWINGS, doc! {"id_hall": hall_id})
            .await
    }

    async fn hall_showings_between(
        &mut self,
        hall_id: i64,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> StoreResult<Vec<Showing>> {
        let filter = doc! {
            "id_hall": hall_id,
            "start_time": {"$lte": to_bson_datetime(to)},
            "end_time": {"$gte": to_bson_datetime(from)},
        };
        self.find_all::<ShowingRecord, _>(SHOWINGS, filter).await
    }

    async fn delete_showing(&mut self, id: i64) -> StoreResult<bool> {
        self.delete_by_id(SHOWINGS, id).await
    }

    async fn insert_booking(&mut self, booking: NewBooking) -> StoreResult<Booking> {
        let record = BookingRecord {
            id: next_id(&self.db, BOOKINGS).await?,
            id_film_show: booking.id_film_show,
            row: booking.row,
            place: booking.place,
        };
        let inserted = self
            .collection::<BookingRecord>(BOOKINGS)
            .insert_one_with_session(&record, None, &mut self.session)
            .await;
        match inserted {
            Ok(_) => Ok(record.into()),
            // A write conflict with a still-open transaction stays `Busy`: that
            // transaction may abort and leave the seat free.
            Err(err) if is_seat_collision(error_code(&err)) => {
                Err(StoreError::UniqueViolation(BOOKING_SEAT_INDEX))
            }
            Err(err) => Err(classify(err)),
        }
    }

    async fn get_booking(&mut self, id: i64) -> StoreResult<Option<Booking>> {
        self.find_by_id::<BookingRecord, _>(BOOKINGS, id).await
    }

    async fn list_bookings(&mut self) -> StoreResult<Vec<Booking>> {
        self.find_all::<BookingRecord, _>(BOOKINGS, doc! {}).await
    }

    async fn delete_booking(&mut self, id: i64) -> StoreResult<bool> {
        self.delete_by_id(BOOKINGS, id).await
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        let mut tx = *self;
        tx.session.commit_transaction().await.map_err(classify)
    }

    async fn rollback(self: Box<Self>) -> StoreResult<()> {
        let mut tx = *self;
        tx.session.abort_transaction().await.map_err(classify)
    }
}
