#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{NaiveDate, NaiveDateTime};
use cinema_booking::{app, clock::FixedClock, store::memory::MemoryGateway, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

pub fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, min, 0)
        .unwrap()
}

/// A router over an empty in-memory store whose clock is stuck at `now`.
pub fn test_app(now: NaiveDateTime) -> Router {
    let state = AppState::new(Arc::new(MemoryGateway::new()), Arc::new(FixedClock(now)));
    app(state)
}

pub async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            request = request.header(header::CONTENT_TYPE, "application/json");
            Body::from(serde_json::to_vec(&json).unwrap())
        }
        None => Body::empty(),
    };

    let response = router
        .clone()
        .oneshot(request.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

pub async fn get(router: &Router, uri: &str) -> (StatusCode, Value) {
    send(router, Method::GET, uri, None).await
}

pub async fn post(router: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(router, Method::POST, uri, Some(body)).await
}

pub async fn patch(router: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(router, Method::PATCH, uri, Some(body)).await
}

pub async fn delete(router: &Router, uri: &str) -> (StatusCode, Value) {
    send(router, Method::DELETE, uri, None).await
}

pub async fn create_cinema(router: &Router) -> i64 {
    let (status, body) = post(router, "/cinema", json!({"name": "Star", "city": "Moscow"})).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["id"].as_i64().unwrap()
}

/// A 20x20 hall in a fresh cinema. Returns `(cinema_id, hall_id)`.
pub async fn create_hall(router: &Router) -> (i64, i64) {
    let id_cinema = create_cinema(router).await;
    let (status, body) = post(
        router,
        &format!("/cinema/{id_cinema}/hall"),
        json!({"name": "First", "rows": 20, "places_in_row": 20}),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    (id_cinema, body["id"].as_i64().unwrap())
}

/// A 120 minute film.
pub async fn create_film(router: &Router) -> i64 {
    let (status, body) = post(
        router,
        "/film",
        json!({
            "title": "The Avengers",
            "genre": "Fantastic",
            "cast": "Robert Downey Jr., Chris Evans, Chris Hemsworth, Tom Hiddleston",
            "description": "Big fight",
            "duration": 120,
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["id"].as_i64().unwrap()
}

pub async fn create_film_show(
    router: &Router,
    id_hall: i64,
    id_film: i64,
    start_time: &str,
) -> (StatusCode, Value) {
    post(
        router,
        "/film-show",
        json!({"start_time": start_time, "id_hall": id_hall, "id_film": id_film}),
    )
    .await
}
