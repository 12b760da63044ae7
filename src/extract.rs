//! Request extractors whose rejections are reported as [`CinemaError`].
//!
//! axum's own `Json`, `Path` and `Query` answer malformed input with plain
//! text 400/415/422 responses. These wrappers route the same rejections
//! through `CinemaError::InvalidInput` so every client error has the JSON
//! `{code, detail}` body.

use axum::{
    extract::{FromRequest, FromRequestParts},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::error::CinemaError;

#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(CinemaError))]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(CinemaError))]
pub struct Path<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(CinemaError))]
pub struct Query<T>(pub T);
