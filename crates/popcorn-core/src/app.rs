use crate::search::{SearchSession, SearchTicket};
use crate::selection::{DetailTicket, SelectionController};
use crate::snapshot::AppSnapshot;
use crate::store::{Persisted, WatchedStore};
use crate::watchlist::{Watchlist, WatchlistError};
use popcorn_models::{MovieDetail, MovieSummary, WatchedEntry};
use popcorn_sources::{LookupError, MovieLookup};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AppError {
    #[error("No movie is selected")]
    NothingSelected,

    #[error("Details for {0} are not loaded yet")]
    DetailsNotLoaded(String),

    #[error(transparent)]
    Watchlist(#[from] WatchlistError),
}

/// Outcome of a spawned lookup, delivered back to the owner of the `App`
#[derive(Debug)]
pub enum Completion {
    Search {
        ticket: SearchTicket,
        result: Result<Vec<MovieSummary>, LookupError>,
    },
    Detail {
        ticket: DetailTicket,
        result: Result<MovieDetail, LookupError>,
    },
}

pub type CompletionReceiver = mpsc::UnboundedReceiver<Completion>;

/// Application state: one controller per concern, mutated only through the
/// callback hooks and `apply`
///
/// Lookups run on spawned tasks. A task holds only its ticket and posts a
/// `Completion`; the owner feeds completions back through `apply`, which is
/// where stale and cancelled results are discarded.
pub struct App {
    lookup: Arc<dyn MovieLookup>,
    search: SearchSession,
    selection: SelectionController,
    watchlist: Watchlist,
    completions: mpsc::UnboundedSender<Completion>,
}

impl App {
    pub fn new(lookup: Arc<dyn MovieLookup>, store: Box<dyn WatchedStore>) -> (Self, CompletionReceiver) {
        let (completions, receiver) = mpsc::unbounded_channel();
        let app = Self {
            lookup,
            search: SearchSession::new(),
            selection: SelectionController::new(),
            watchlist: Watchlist::load(store),
            completions,
        };
        info!("App started with {} lookup", app.lookup.source_name());
        (app, receiver)
    }

    pub fn search(&self) -> &SearchSession {
        &self.search
    }

    pub fn selection(&self) -> &SelectionController {
        &self.selection
    }

    pub fn watchlist(&self) -> &Watchlist {
        &self.watchlist
    }

    pub fn on_query_change(&mut self, text: impl Into<String>) {
        if let Some(ticket) = self.search.set_query(text) {
            self.spawn_search(ticket);
        }
    }

    pub fn on_select(&mut self, id: impl Into<String>) {
        if let Some(ticket) = self.selection.select(id) {
            self.spawn_detail(ticket);
        }
    }

    pub fn on_deselect(&mut self) {
        self.selection.clear();
    }

    /// Rate the selected title and put it on the watched list
    ///
    /// Closes the details view on success.
    pub fn on_add_to_watchlist(&mut self, user_rating: u8) -> Result<Persisted<WatchedEntry>, AppError> {
        let id = self.selection.selected_id().ok_or(AppError::NothingSelected)?;
        let detail = self
            .selection
            .detail()
            .loaded()
            .ok_or_else(|| AppError::DetailsNotLoaded(id.to_string()))?;

        let added = self.watchlist.add(detail, user_rating)?;
        self.selection.clear();
        Ok(added)
    }

    pub fn on_delete_watched(&mut self, id: &str) -> Persisted<bool> {
        self.watchlist.remove(id)
    }

    /// Feed a finished lookup back in; returns whether visible state changed
    pub fn apply(&mut self, completion: Completion) -> bool {
        match completion {
            Completion::Search { ticket, result } => self.search.complete(&ticket, result),
            Completion::Detail { ticket, result } => self.selection.complete(&ticket, result),
        }
    }

    pub fn snapshot(&self) -> AppSnapshot {
        AppSnapshot::capture(&self.search, &self.selection, &self.watchlist)
    }

    fn spawn_search(&self, ticket: SearchTicket) {
        let lookup = Arc::clone(&self.lookup);
        let completions = self.completions.clone();
        tokio::spawn(async move {
            let result = lookup.search_by_title(&ticket.query, &ticket.cancel).await;
            if matches!(result, Err(LookupError::Cancelled)) {
                debug!("Search for {:?} cancelled", ticket.query);
                return;
            }
            // The receiver is gone once the front-end shuts down
            let _ = completions.send(Completion::Search { ticket, result });
        });
    }

    fn spawn_detail(&self, ticket: DetailTicket) {
        let lookup = Arc::clone(&self.lookup);
        let completions = self.completions.clone();
        tokio::spawn(async move {
            let result = lookup.fetch_detail(&ticket.id, &ticket.cancel).await;
            if matches!(result, Err(LookupError::Cancelled)) {
                debug!("Detail fetch for {} cancelled", ticket.id);
                return;
            }
            let _ = completions.send(Completion::Detail { ticket, result });
        });
    }
}

#[cfg(test)]
mod tests;
