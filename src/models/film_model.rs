use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Film {
    pub id: i64,
    pub title: String,
    pub genre: String,
    pub cast: String,
    pub description: String,
    /// Running time in minutes.
    pub duration: i32,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct NewFilm {
    pub title: String,
    pub genre: String,
    pub cast: String,
    pub description: String,
    pub duration: i32,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct FilmUpdate {
    pub title: Option<String>,
    pub genre: Option<String>,
    pub cast: Option<String>,
    pub description: Option<String>,
    pub duration: Option<i32>,
}

impl Film {
    pub fn apply(&mut self, update: &FilmUpdate) {
        if let Some(title) = &update.title {
            self.title = title.clone();
        }
        if let Some(genre) = &update.genre {
            self.genre = genre.clone();
        }
        if let Some(cast) = &update.cast {
            self.cast = cast.clone();
        }
        if let Some(description) = &update.description {
            self.description = description.clone();
        }
        if let Some(duration) = update.duration {
            self.duration = duration;
        }
    }
}
