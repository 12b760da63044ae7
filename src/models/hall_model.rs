use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Hall {
    pub id: i64,
    pub id_cinema: i64,
    pub name: String,
    pub rows: i32,
    pub places_in_row: i32,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct NewHall {
    pub name: String,
    pub rows: i32,
    pub places_in_row: i32,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct HallUpdate {
    pub name: Option<String>,
    pub rows: Option<i32>,
    pub places_in_row: Option<i32>,
}

impl Hall {
    /// Seats are addressed from 1 in both directions.
    pub fn has_seat(&self, row: i32, place: i32) -> bool {
        (1..=self.rows).contains(&row) && (1..=self.places_in_row).contains(&place)
    }

    pub fn apply(&mut self, update: &HallUpdate) {
        if let Some(name) = &update.name {
            self.name = name.clone();
        }
        if let Some(rows) = update.rows {
            self.rows = rows;
        }
        if let Some(places_in_row) = update.places_in_row {
            self.places_in_row = places_in_row;
        }
    }
}
