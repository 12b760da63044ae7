use axum::extract::Extension;

use crate::error::CinemaError;
use crate::extract::{Json, Path};
use crate::models::{
    booking_model::{Booking, NewBooking},
    DeleteResponse,
};
use crate::services::ledger;
use crate::AppState;

pub async fn load_bookings(
    Extension(state): Extension<AppState>,
) -> Result<Json<Vec<Booking>>, CinemaError> {
    let bookings = ledger::list_bookings(state.gateway.as_ref()).await?;
    Ok(Json(bookings))
}

pub async fn add_booking(
    Extension(state): Extension<AppState>,
    Json(booking): Json<NewBooking>,
) -> Result<Json<Booking>, CinemaError> {
    let booking = ledger::book(state.gateway.as_ref(), state.clock.as_ref(), booking).await?;
    Ok(Json(booking))
}

pub async fn load_booking(
    Path(id): Path<i64>,
    Extension(state): Extension<AppState>,
) -> Result<Json<Booking>, CinemaError> {
    let booking = ledger::get_booking(state.gateway.as_ref(), id).await?;
    Ok(Json(booking))
}

pub async fn delete_booking(
    Path(id): Path<i64>,
    Extension(state): Extension<AppState>,
) -> Result<Json<DeleteResponse>, CinemaError> {
    ledger::delete_booking(state.gateway.as_ref(), id).await?;
    Ok(Json(DeleteResponse::new("Booking", id)))
}
