use serde::{Deserialize, Serialize};

/// One row of a title search
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MovieSummary {
    pub id: String, // IMDB id, e.g. "tt1375666"
    pub title: String,
    pub year: String, // Kept as text: series report ranges like "2008–2013"
    pub poster_url: String,
}

/// Full record for a single title
///
/// `runtime_minutes` and `imdb_rating` are `None` when the remote service
/// reports them as unknown ("N/A").
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieDetail {
    pub id: String,
    pub title: String,
    pub poster_url: String,
    pub release_date: String,
    pub runtime_minutes: Option<u32>,
    pub imdb_rating: Option<f64>,
    pub plot: String,
    pub actors: String,
    pub director: String,
}

impl MovieDetail {
    /// Runtime as the remote service displays it ("142 min")
    pub fn runtime_label(&self) -> String {
        match self.runtime_minutes {
            Some(minutes) => format!("{} min", minutes),
            None => "N/A".to_string(),
        }
    }
}
