mod common;

use axum::http::StatusCode;
use common::*;
use serde_json::json;

fn router() -> axum::Router {
    test_app(at(2021, 5, 30, 12, 0))
}

#[tokio::test]
async fn empty_list() {
    let app = router();
    let (status, body) = get(&app, "/film-show").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn create_computes_end_time_from_duration() {
    let app = router();
    let (_, id_hall) = create_hall(&app).await;
    let id_film = create_film(&app).await;

    let (status, body) =
        create_film_show(&app, id_hall, id_film, "2021-06-01T20:00:00.000000Z").await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(
        body,
        json!({
            "id": body["id"],
            "show_date": "2021-06-01",
            "start_time": "20:00:00",
            "end_time": "22:00:00",
            "id_hall": id_hall,
            "id_film": id_film,
        })
    );

    let (status, fetched) = get(&app, &format!("/film-show/{}", body["id"])).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, body);

    let (status, listed) = get(&app, "/film-show").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed, json!([body]));
}

#[tokio::test]
async fn overlapping_and_touching_shows_are_rejected() {
    let app = router();
    let (_, id_hall) = create_hall(&app).await;
    let id_film = create_film(&app).await;

    let (status, _) = create_film_show(&app, id_hall, id_film, "2021-06-01T20:00:00").await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = create_film_show(&app, id_hall, id_film, "2021-06-01T21:00:00").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "SHOW_TIME_CONFLICT");

    let (status, _) = create_film_show(&app, id_hall, id_film, "2021-06-01T22:00:00").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = create_film_show(&app, id_hall, id_film, "2021-06-01T19:00:00").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = create_film_show(&app, id_hall, id_film, "2021-06-01T22:01:00").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn shows_two_days_apart_do_not_conflict() {
    let app = router();
    let (_, id_hall) = create_hall(&app).await;
    let id_film = create_film(&app).await;

    let (status, _) = create_film_show(&app, id_hall, id_film, "2021-06-04T20:00:00").await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = create_film_show(&app, id_hall, id_film, "2021-06-06T20:00:00").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn overlap_across_midnight_is_rejected() {
    let app = router();
    let (_, id_hall) = create_hall(&app).await;
    let id_film = create_film(&app).await;

    let (status, _) = create_film_show(&app, id_hall, id_film, "2020-03-03T23:50:00").await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = create_film_show(&app, id_hall, id_film, "2020-03-04T00:20:00").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_film_is_not_found_and_bad_time_is_rejected() {
    let app = router();
    let (_, id_hall) = create_hall(&app).await;
    let id_film = create_film(&app).await;

    let (status, _) = create_film_show(&app, id_hall, id_film + 100, "2021-06-01T20:00:00").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = create_film_show(&app, id_hall, id_film, "next friday").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn date_filter_uses_seven_oclock_day_boundary() {
    let app = router();
    let (_, id_hall) = create_hall(&app).await;
    let id_film = create_film(&app).await;

    let (_, evening) = create_film_show(&app, id_hall, id_film, "2021-06-01T20:00:00").await;
    let (_, night) = create_film_show(&app, id_hall, id_film, "2021-06-02T01:30:00").await;
    let (_, noon) = create_film_show(&app, id_hall, id_film, "2021-06-02T12:00:00").await;

    let (status, day_one) = get(&app, "/film-show?start_date=2021-06-01&end_date=2021-06-01").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(day_one, json!([evening, night]));

    let (_, day_two) = get(&app, "/film-show?start_date=2021-06-02&end_date=2021-06-02").await;
    assert_eq!(day_two, json!([noon]));

    let (_, from_two) = get(&app, "/film-show?start_date=2021-06-02").await;
    assert_eq!(from_two, json!([noon]));

    let (_, until_one) = get(&app, "/film-show?end_date=2021-06-01").await;
    assert_eq!(until_one, json!([evening, night]));
}

#[tokio::test]
async fn malformed_date_filter_is_rejected() {
    let app = router();
    let (status, body) = get(&app, "/film-show?start_date=01-06-2021").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn get_not_found() {
    let app = router();
    let (status, _) = get(&app, "/film-show/99").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_removes_show() {
    let app = router();
    let (_, id_hall) = create_hall(&app).await;
    let id_film = create_film(&app).await;
    let (_, show) = create_film_show(&app, id_hall, id_film, "2021-06-01T20:00:00").await;
    let uri = format!("/film-show/{}", show["id"]);

    let (status, body) = delete(&app, &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], show["id"]);

    let (status, _) = get(&app, &uri).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_not_found() {
    let app = router();
    let (status, _) = delete(&app, "/film-show/99").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn hall_listing_goes_through_cinema() {
    let app = router();
    let (id_cinema, id_hall) = create_hall(&app).await;
    let id_film = create_film(&app).await;

    let uri = format!("/cinema/{id_cinema}/hall/{id_hall}/film-show");
    let (status, _) = get(&app, &uri).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, show) = create_film_show(&app, id_hall, id_film, "2021-06-01T20:00:00").await;
    let (status, body) = get(&app, &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([show]));

    let other_cinema = id_cinema + 1;
    let (status, _) = get(&app, &format!("/cinema/{other_cinema}/hall/{id_hall}/film-show")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_film_show_is_invalid_input() {
    let app = router();
    let (_, id_hall) = create_hall(&app).await;
    let id_film = create_film(&app).await;

    let (status, body) = post(
        &app,
        "/film-show",
        json!({"start_time": "2021-06-01T20:00:00", "id_hall": id_hall}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_INPUT");

    let (status, body) = post(
        &app,
        "/film-show",
        json!({"start_time": "2021-06-01T20:00:00", "id_hall": id_hall, "id_film": "one"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_INPUT");

    let (status, _) = create_film_show(&app, id_hall, id_film, "2021-06-01T20:00:00").await;
    assert_eq!(status, StatusCode::OK);
}
