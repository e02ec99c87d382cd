use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::movie::MovieDetail;

pub const MIN_USER_RATING: u8 = 1;
pub const MAX_USER_RATING: u8 = 10;

/// A title the user has watched and rated
///
/// Field names on the wire match the slot layout the browser version of the
/// app wrote (`imdbID`, `poster`, `released`, `runtime`, ...), so an exported
/// slot can be loaded unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WatchedEntry {
    #[serde(rename = "imdbID")]
    pub id: String,
    pub title: String,
    #[serde(rename = "poster", default)]
    pub poster_url: String,
    #[serde(rename = "released", default)]
    pub release_date: String,
    #[serde(rename = "runtime", default)]
    pub runtime_minutes: Option<u32>,
    #[serde(rename = "imdbRating", default, deserialize_with = "lenient_rating::deserialize")]
    pub imdb_rating: Option<f64>,
    #[serde(default)]
    pub plot: String,
    #[serde(default)]
    pub actors: String,
    #[serde(default)]
    pub director: String,
    #[serde(rename = "userRating")]
    pub user_rating: u8, // 1-10
    /// When the entry was added (absent in slots written by the browser app)
    #[serde(rename = "addedAt", default, skip_serializing_if = "Option::is_none")]
    pub added_at: Option<DateTime<Utc>>,
}

impl WatchedEntry {
    /// Build an entry from a loaded detail record and the user's rating
    pub fn from_detail(detail: &MovieDetail, user_rating: u8) -> Self {
        Self {
            id: detail.id.clone(),
            title: detail.title.clone(),
            poster_url: detail.poster_url.clone(),
            release_date: detail.release_date.clone(),
            runtime_minutes: detail.runtime_minutes,
            imdb_rating: detail.imdb_rating,
            plot: detail.plot.clone(),
            actors: detail.actors.clone(),
            director: detail.director.clone(),
            user_rating,
            added_at: Some(Utc::now()),
        }
    }
}

/// The browser app stored the IMDB rating exactly as the API returned it,
/// which is a string ("8.8" or "N/A"). Accept both that and a plain number.
mod lenient_rating {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawRating {
        Number(f64),
        Text(String),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<RawRating>::deserialize(deserializer)?;
        Ok(match raw {
            Some(RawRating::Number(n)) => Some(n),
            Some(RawRating::Text(s)) => s.trim().parse::<f64>().ok(),
            None => None,
        })
    }
}
