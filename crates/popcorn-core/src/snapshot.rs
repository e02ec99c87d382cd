use crate::search::{SearchPhase, SearchSession};
use crate::selection::{DetailState, SelectionController};
use crate::watchlist::Watchlist;
use popcorn_models::{MovieSummary, WatchedEntry, WatchedSummary};
use serde::Serialize;

/// Read-only view of everything the presentation layer renders
#[derive(Debug, Clone, Serialize)]
pub struct AppSnapshot {
    pub query: String,
    pub phase: SearchPhase,
    pub loading: bool,
    pub error: Option<String>,
    pub results: Vec<MovieSummary>,
    pub selected_id: Option<String>,
    pub detail: DetailState,
    /// The user's rating when the selected title is already watched
    pub selected_user_rating: Option<u8>,
    pub watched: Vec<WatchedEntry>,
    pub summary: WatchedSummary,
}

impl AppSnapshot {
    pub(crate) fn capture(search: &SearchSession, selection: &SelectionController, watchlist: &Watchlist) -> Self {
        let selected_id = selection.selected_id().map(str::to_string);
        let selected_user_rating = selected_id.as_deref().and_then(|id| watchlist.user_rating_for(id));

        Self {
            query: search.text().to_string(),
            phase: search.phase(),
            loading: search.is_loading(),
            error: search.error().map(str::to_string),
            results: search.results().to_vec(),
            selected_id,
            detail: selection.detail().clone(),
            selected_user_rating,
            watched: watchlist.entries().to_vec(),
            summary: watchlist.summarize(),
        }
    }

    pub fn result_count(&self) -> usize {
        self.results.len()
    }

    pub fn is_selected_watched(&self) -> bool {
        self.selected_user_rating.is_some()
    }

    /// Index of a result row by id
    pub fn result_position(&self, id: &str) -> Option<usize> {
        self.results.iter().position(|m| m.id == id)
    }
}
