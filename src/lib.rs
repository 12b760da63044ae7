use std::sync::Arc;

use axum::{extract::Extension, routing::get, Router};
use tower_http::trace::TraceLayer;

pub mod clock;
pub mod config;
pub mod controllers;
pub mod error;
pub mod extract;
pub mod models;
pub mod services;
pub mod store;
pub mod utils;

use clock::Clock;
use controllers::{
    booking_controller::*, cinema_controller::*, film_controller::*, film_show_controller::*,
    hall_controller::*, home_controller,
};
use store::Gateway;

/// Shared by every handler through an `Extension` layer.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<dyn Gateway>,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(gateway: Arc<dyn Gateway>, clock: Arc<dyn Clock>) -> Self {
        AppState { gateway, clock }
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(home_controller::index))
        .route("/cinema", get(load_cinemas).post(add_cinema))
        .route("/cinema/:cinema_id", get(load_cinema).patch(update_cinema))
        .route(
            "/cinema/:cinema_id/hall",
            get(load_cinema_halls).post(add_cinema_hall),
        )
        .route("/cinema/:cinema_id/hall/:hall_id", get(load_cinema_hall))
        .route(
            "/cinema/:cinema_id/hall/:hall_id/film-show",
            get(load_hall_film_shows),
        )
        .route("/cinema-hall", get(load_halls))
        .route("/cinema-hall/:id", get(load_hall).patch(update_hall))
        .route("/film", get(load_films).post(add_film))
        .route("/film/:id", get(load_film).patch(update_film))
        .route("/film-show", get(load_film_shows).post(add_film_show))
        .route(
            "/film-show/:id",
            get(load_film_show).delete(delete_film_show),
        )
        .route("/booking", get(load_bookings).post(add_booking))
        .route("/booking/:id", get(load_booking).delete(delete_booking))
        .layer(TraceLayer::new_for_http())
        .layer(Extension(state))
}
