use popcorn_models::MovieSummary;
use popcorn_sources::LookupError;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::debug;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SearchPhase {
    /// Empty query: no results, no error, nothing in flight
    Idle,
    Searching,
    Loaded,
    Failed,
}

/// Handle for one issued search
///
/// The task running the request keeps only this: the query it was issued for
/// and the token that lets the session discard it.
#[derive(Debug, Clone)]
pub struct SearchTicket {
    pub(crate) seq: u64,
    pub query: String,
    pub cancel: CancellationToken,
}

#[derive(Debug)]
struct InFlight {
    seq: u64,
    cancel: CancellationToken,
}

/// Owns the query text and the at-most-one live search request
#[derive(Debug)]
pub struct SearchSession {
    text: String,
    phase: SearchPhase,
    results: Vec<MovieSummary>,
    error: Option<String>,
    in_flight: Option<InFlight>,
    next_seq: u64,
}

impl SearchSession {
    pub fn new() -> Self {
        Self {
            text: String::new(),
            phase: SearchPhase::Idle,
            results: Vec::new(),
            error: None,
            in_flight: None,
            next_seq: 0,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn phase(&self) -> SearchPhase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase == SearchPhase::Searching
    }

    pub fn results(&self) -> &[MovieSummary] {
        &self.results
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Replace the query text
    ///
    /// Cancels whatever search is still running. Returns the ticket for the
    /// request the caller must now issue, or `None` for an empty query.
    pub fn set_query(&mut self, text: impl Into<String>) -> Option<SearchTicket> {
        self.text = text.into();
        self.cancel_in_flight();

        if self.text.is_empty() {
            self.phase = SearchPhase::Idle;
            self.results.clear();
            self.error = None;
            return None;
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        let cancel = CancellationToken::new();
        self.in_flight = Some(InFlight { seq, cancel: cancel.clone() });
        self.phase = SearchPhase::Searching;
        self.error = None;

        debug!("Search #{} issued for {:?}", seq, self.text);
        Some(SearchTicket {
            seq,
            query: self.text.clone(),
            cancel,
        })
    }

    /// Apply the outcome of a search request
    ///
    /// Only the latest, uncancelled ticket may change state. Returns whether
    /// it did.
    pub fn complete(&mut self, ticket: &SearchTicket, result: Result<Vec<MovieSummary>, LookupError>) -> bool {
        if ticket.cancel.is_cancelled() {
            debug!("Dropping result of cancelled search #{} ({:?})", ticket.seq, ticket.query);
            return false;
        }
        match &self.in_flight {
            Some(current) if current.seq == ticket.seq => {}
            _ => {
                debug!("Dropping result of stale search #{}", ticket.seq);
                return false;
            }
        }

        match result {
            Err(LookupError::Cancelled) => {
                // The token is live, so this request is still the current one
                return false;
            }
            Ok(movies) => {
                debug!("Search #{} loaded {} results", ticket.seq, movies.len());
                self.results = movies;
                self.error = None;
                self.phase = SearchPhase::Loaded;
            }
            Err(e) => {
                debug!("Search #{} failed: {}", ticket.seq, e);
                self.results.clear();
                self.error = Some(e.to_string());
                self.phase = SearchPhase::Failed;
            }
        }
        self.in_flight = None;
        true
    }

    fn cancel_in_flight(&mut self) {
        if let Some(previous) = self.in_flight.take() {
            debug!("Cancelling search #{}", previous.seq);
            previous.cancel.cancel();
        }
    }
}

impl Default for SearchSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::movie_summary;

    #[test]
    fn test_new_session_is_idle() {
        let session = SearchSession::new();
        assert_eq!(session.phase(), SearchPhase::Idle);
        assert!(session.results().is_empty());
        assert!(session.error().is_none());
        assert!(!session.is_loading());
    }

    #[test]
    fn test_empty_query_clears_without_request() {
        let mut session = SearchSession::new();
        let ticket = session.set_query("matrix").unwrap();
        session.complete(&ticket, Err(LookupError::NotFound("Movie not found!".to_string())));
        assert_eq!(session.error(), Some("Movie not found!"));

        assert!(session.set_query("").is_none());
        assert_eq!(session.phase(), SearchPhase::Idle);
        assert!(session.results().is_empty());
        assert!(session.error().is_none());
        assert_eq!(session.text(), "");
    }

    #[test]
    fn test_clearing_query_cancels_pending_search() {
        let mut session = SearchSession::new();
        let ticket = session.set_query("matrix").unwrap();
        session.set_query("");

        assert!(ticket.cancel.is_cancelled());
        assert!(!session.complete(&ticket, Ok(vec![movie_summary("tt0133093")])));
        assert!(session.results().is_empty());
        assert_eq!(session.phase(), SearchPhase::Idle);
    }

    #[test]
    fn test_search_loads_results() {
        let mut session = SearchSession::new();
        let ticket = session.set_query("inception").unwrap();
        assert_eq!(ticket.query, "inception");
        assert!(session.is_loading());

        assert!(session.complete(&ticket, Ok(vec![movie_summary("tt1375666")])));
        assert_eq!(session.phase(), SearchPhase::Loaded);
        assert_eq!(session.results().len(), 1);
        assert!(!session.is_loading());
    }

    #[test]
    fn test_failure_sets_error_and_clears_results() {
        let mut session = SearchSession::new();
        let first = session.set_query("incep").unwrap();
        session.complete(&first, Ok(vec![movie_summary("tt1375666")]));

        let second = session.set_query("incepxx").unwrap();
        assert!(session.complete(&second, Err(LookupError::Connection("HTTP 503".to_string()))));
        assert_eq!(session.phase(), SearchPhase::Failed);
        assert!(session.results().is_empty());
        assert_eq!(session.error(), Some("Connection lost: HTTP 503"));
    }

    #[test]
    fn test_new_query_clears_previous_error() {
        let mut session = SearchSession::new();
        let ticket = session.set_query("zzzz").unwrap();
        session.complete(&ticket, Err(LookupError::NotFound("Movie not found!".to_string())));
        session.set_query("zzzzz");
        assert!(session.error().is_none());
        assert!(session.is_loading());
    }

    #[test]
    fn test_only_latest_response_commits() {
        let mut session = SearchSession::new();
        let a = session.set_query("a").unwrap();
        let ab = session.set_query("ab").unwrap();
        let abc = session.set_query("abc").unwrap();
        assert!(a.cancel.is_cancelled());
        assert!(ab.cancel.is_cancelled());
        assert!(!abc.cancel.is_cancelled());

        // Responses arrive in scrambled order
        assert!(!session.complete(&ab, Ok(vec![movie_summary("tt-ab")])));
        assert!(session.complete(&abc, Ok(vec![movie_summary("tt-abc")])));
        assert!(!session.complete(&a, Err(LookupError::Connection("reset".to_string()))));

        assert_eq!(session.phase(), SearchPhase::Loaded);
        assert_eq!(session.results().len(), 1);
        assert_eq!(session.results()[0].id, "tt-abc");
        assert!(session.error().is_none());
    }

    #[test]
    fn test_cancelled_outcome_is_never_visible() {
        let mut session = SearchSession::new();
        let ticket = session.set_query("alien").unwrap();
        assert!(!session.complete(&ticket, Err(LookupError::Cancelled)));
        assert!(session.error().is_none());
        assert!(session.is_loading());

        // The same ticket can still deliver its real outcome
        assert!(session.complete(&ticket, Ok(vec![movie_summary("tt0078748")])));
        assert_eq!(session.results().len(), 1);
    }

    #[test]
    fn test_duplicate_completion_is_ignored() {
        let mut session = SearchSession::new();
        let ticket = session.set_query("heat").unwrap();
        assert!(session.complete(&ticket, Ok(vec![movie_summary("tt0113277")])));
        assert!(!session.complete(&ticket, Ok(vec![])));
        assert_eq!(session.results().len(), 1);
    }
}
