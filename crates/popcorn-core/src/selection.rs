use popcorn_models::MovieDetail;
use popcorn_sources::LookupError;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// What the details pane can show for the selected title
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum DetailState {
    /// Nothing selected
    Empty,
    Loading,
    Loaded(MovieDetail),
    /// The fetch failed; carries the reason
    Unavailable(String),
}

impl DetailState {
    pub fn loaded(&self) -> Option<&MovieDetail> {
        match self {
            DetailState::Loaded(detail) => Some(detail),
            _ => None,
        }
    }
}

/// Handle for one issued detail fetch
#[derive(Debug, Clone)]
pub struct DetailTicket {
    pub(crate) seq: u64,
    pub id: String,
    pub cancel: CancellationToken,
}

#[derive(Debug)]
struct InFlight {
    seq: u64,
    cancel: CancellationToken,
}

/// Owns the selected id and its detail record
///
/// Selecting a new id supersedes (cancels) the fetch for the previous one, so
/// an older detail response can never overwrite a newer selection.
#[derive(Debug)]
pub struct SelectionController {
    selected_id: Option<String>,
    detail: DetailState,
    in_flight: Option<InFlight>,
    next_seq: u64,
}

impl SelectionController {
    pub fn new() -> Self {
        Self {
            selected_id: None,
            detail: DetailState::Empty,
            in_flight: None,
            next_seq: 0,
        }
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected_id.as_deref()
    }

    pub fn detail(&self) -> &DetailState {
        &self.detail
    }

    /// Select a title, or deselect it when it is already selected
    ///
    /// Returns the ticket for the one detail fetch the caller must issue.
    pub fn select(&mut self, id: impl Into<String>) -> Option<DetailTicket> {
        let id = id.into();
        if self.selected_id.as_deref() == Some(id.as_str()) {
            debug!("{} selected again, deselecting", id);
            self.clear();
            return None;
        }

        self.cancel_in_flight();
        let seq = self.next_seq;
        self.next_seq += 1;
        let cancel = CancellationToken::new();
        self.in_flight = Some(InFlight { seq, cancel: cancel.clone() });
        self.selected_id = Some(id.clone());
        self.detail = DetailState::Loading;

        debug!("Detail fetch #{} issued for {}", seq, id);
        Some(DetailTicket { seq, id, cancel })
    }

    pub fn clear(&mut self) {
        self.cancel_in_flight();
        self.selected_id = None;
        self.detail = DetailState::Empty;
    }

    /// Apply the outcome of a detail fetch; returns whether state changed
    pub fn complete(&mut self, ticket: &DetailTicket, result: Result<MovieDetail, LookupError>) -> bool {
        if ticket.cancel.is_cancelled() {
            debug!("Dropping detail for {} (superseded)", ticket.id);
            return false;
        }
        match &self.in_flight {
            Some(current) if current.seq == ticket.seq => {}
            _ => return false,
        }

        match result {
            Err(LookupError::Cancelled) => return false,
            Ok(detail) => {
                self.detail = DetailState::Loaded(detail);
            }
            Err(e) => {
                debug!("Detail for {} unavailable: {}", ticket.id, e);
                self.detail = DetailState::Unavailable(e.to_string());
            }
        }
        self.in_flight = None;
        true
    }

    fn cancel_in_flight(&mut self) {
        if let Some(previous) = self.in_flight.take() {
            previous.cancel.cancel();
        }
    }
}

impl Default for SelectionController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::movie_detail;

    #[test]
    fn test_select_issues_one_fetch() {
        let mut selection = SelectionController::new();
        let ticket = selection.select("tt0111161").unwrap();
        assert_eq!(ticket.id, "tt0111161");
        assert_eq!(selection.selected_id(), Some("tt0111161"));
        assert_eq!(selection.detail(), &DetailState::Loading);
    }

    #[test]
    fn test_select_same_id_toggles_off() {
        let mut selection = SelectionController::new();
        let mut issued = 0;
        if selection.select("tt0111161").is_some() {
            issued += 1;
        }
        let first_cancel = selection.in_flight.as_ref().map(|f| f.cancel.clone()).unwrap();
        if selection.select("tt0111161").is_some() {
            issued += 1;
        }

        assert_eq!(issued, 1);
        assert_eq!(selection.selected_id(), None);
        assert_eq!(selection.detail(), &DetailState::Empty);
        assert!(first_cancel.is_cancelled());
    }

    #[test]
    fn test_loaded_detail() {
        let mut selection = SelectionController::new();
        let ticket = selection.select("tt0111161").unwrap();
        assert!(selection.complete(&ticket, Ok(movie_detail("tt0111161", "142 min"))));
        let detail = selection.detail().loaded().unwrap();
        assert_eq!(detail.runtime_minutes, Some(142));
    }

    #[test]
    fn test_reselection_discards_older_detail() {
        let mut selection = SelectionController::new();
        let first = selection.select("tt001").unwrap();
        let second = selection.select("tt002").unwrap();
        assert!(first.cancel.is_cancelled());

        assert!(selection.complete(&second, Ok(movie_detail("tt002", "90 min"))));
        // The older response arrives late
        assert!(!selection.complete(&first, Ok(movie_detail("tt001", "100 min"))));

        assert_eq!(selection.selected_id(), Some("tt002"));
        assert_eq!(selection.detail().loaded().unwrap().id, "tt002");
    }

    #[test]
    fn test_failed_fetch_is_visible() {
        let mut selection = SelectionController::new();
        let ticket = selection.select("bogus").unwrap();
        assert!(selection.complete(&ticket, Err(LookupError::NotFound("Incorrect IMDb ID.".to_string()))));
        assert_eq!(selection.detail(), &DetailState::Unavailable("Incorrect IMDb ID.".to_string()));
        assert_eq!(selection.selected_id(), Some("bogus"));
    }

    #[test]
    fn test_clear_drops_pending_fetch() {
        let mut selection = SelectionController::new();
        let ticket = selection.select("tt001").unwrap();
        selection.clear();
        assert!(!selection.complete(&ticket, Ok(movie_detail("tt001", "100 min"))));
        assert_eq!(selection.detail(), &DetailState::Empty);
    }

    #[test]
    fn test_reselect_after_clear_fetches_again() {
        let mut selection = SelectionController::new();
        selection.select("tt001").unwrap();
        selection.clear();
        assert!(selection.select("tt001").is_some());
    }
}
