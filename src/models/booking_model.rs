use serde::{Deserialize, Serialize};

/// One reserved seat of one film show. Never updated, only deleted.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Booking {
    pub id: i64,
    pub id_film_show: i64,
    pub row: i32,
    pub place: i32,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
pub struct NewBooking {
    pub id_film_show: i64,
    pub row: i32,
    pub place: i32,
}

impl Booking {
    pub fn occupies(&self, id_film_show: i64, row: i32, place: i32) -> bool {
        self.id_film_show == id_film_show && self.row == row && self.place == place
    }
}
