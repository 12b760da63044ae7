use serde::Serialize;

pub mod booking_model;
pub mod cinema_model;
pub mod film_model;
pub mod hall_model;
pub mod showing_model;

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct DeleteResponse {
    pub message: String,
    pub id: i64,
}

impl DeleteResponse {
    pub fn new(entity: &str, id: i64) -> Self {
        DeleteResponse {
            message: format!("{entity} deleted successfully"),
            id,
        }
    }
}
