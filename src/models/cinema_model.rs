use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Cinema {
    pub id: i64,
    pub name: String,
    pub city: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct NewCinema {
    pub name: String,
    pub city: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct CinemaUpdate {
    pub name: Option<String>,
    pub city: Option<String>,
}

impl Cinema {
    pub fn apply(&mut self, update: &CinemaUpdate) {
        if let Some(name) = &update.name {
            self.name = name.clone();
        }
        if let Some(city) = &update.city {
            self.city = city.clone();
        }
    }
}
