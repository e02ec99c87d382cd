use super::*;
use crate::search::SearchPhase;
use crate::selection::DetailState;
use crate::store::MemoryStore;
use crate::test_support::{movie_detail, movie_summary, watched_entry};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

type SearchReply = Result<Vec<MovieSummary>, LookupError>;

/// Lookup whose search responses are released by the test, in any order
///
/// It deliberately ignores cancellation tokens so stale responses really do
/// arrive at the app.
#[derive(Default)]
struct ScriptedLookup {
    pending: Mutex<HashMap<String, oneshot::Receiver<SearchReply>>>,
    search_calls: AtomicUsize,
    detail_calls: AtomicUsize,
}

impl ScriptedLookup {
    /// Hold the response for `query` until the returned sender fires
    fn script(&self, query: &str) -> oneshot::Sender<SearchReply> {
        let (tx, rx) = oneshot::channel();
        self.pending.lock().unwrap().insert(query.to_string(), rx);
        tx
    }

    fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    fn detail_calls(&self) -> usize {
        self.detail_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MovieLookup for ScriptedLookup {
    fn source_name(&self) -> &str {
        "scripted"
    }

    async fn search_by_title(&self, text: &str, _cancel: &CancellationToken) -> SearchReply {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        let pending = self.pending.lock().unwrap().remove(text);
        match pending {
            Some(rx) => rx
                .await
                .unwrap_or_else(|_| Err(LookupError::Connection("script dropped".to_string()))),
            None => Ok(vec![movie_summary(&format!("tt-{}", text))]),
        }
    }

    async fn fetch_detail(&self, id: &str, _cancel: &CancellationToken) -> Result<MovieDetail, LookupError> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        if id.starts_with("bad") {
            return Err(LookupError::NotFound("Incorrect IMDb ID.".to_string()));
        }
        Ok(movie_detail(id, "142 min"))
    }
}

fn new_app(lookup: &Arc<ScriptedLookup>, store: &MemoryStore) -> (App, CompletionReceiver) {
    App::new(lookup.clone(), Box::new(store.clone()))
}

/// Select a title and wait for its detail to land
async fn select_and_load(app: &mut App, rx: &mut CompletionReceiver, id: &str) {
    app.on_select(id);
    let completion = rx.recv().await.unwrap();
    assert!(app.apply(completion));
}

#[tokio::test]
async fn test_empty_query_issues_no_request() {
    let lookup = Arc::new(ScriptedLookup::default());
    let (mut app, mut rx) = new_app(&lookup, &MemoryStore::new());

    app.on_query_change("");
    tokio::task::yield_now().await;

    let snapshot = app.snapshot();
    assert_eq!(snapshot.phase, SearchPhase::Idle);
    assert!(snapshot.results.is_empty());
    assert!(snapshot.error.is_none());
    assert!(!snapshot.loading);
    assert_eq!(lookup.search_calls(), 0);
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_search_round_trip() {
    let lookup = Arc::new(ScriptedLookup::default());
    let (mut app, mut rx) = new_app(&lookup, &MemoryStore::new());

    app.on_query_change("heat");
    assert!(app.snapshot().loading);

    let completion = rx.recv().await.unwrap();
    assert!(app.apply(completion));

    let snapshot = app.snapshot();
    assert_eq!(snapshot.phase, SearchPhase::Loaded);
    assert_eq!(snapshot.result_count(), 1);
    assert_eq!(snapshot.results[0].id, "tt-heat");
    assert_eq!(snapshot.result_position("tt-heat"), Some(0));
}

#[tokio::test]
async fn test_only_final_query_is_observed() {
    let lookup = Arc::new(ScriptedLookup::default());
    let release_a = lookup.script("a");
    let release_ab = lookup.script("ab");
    let release_abc = lookup.script("abc");
    let (mut app, mut rx) = new_app(&lookup, &MemoryStore::new());

    app.on_query_change("a");
    app.on_query_change("ab");
    app.on_query_change("abc");

    // Newest answers first, then the stale ones trickle in
    release_abc.send(Ok(vec![movie_summary("tt-abc")])).unwrap();
    let completion = rx.recv().await.unwrap();
    assert!(app.apply(completion));

    release_a.send(Ok(vec![movie_summary("tt-a")])).unwrap();
    let completion = rx.recv().await.unwrap();
    assert!(!app.apply(completion));

    release_ab.send(Err(LookupError::NotFound("Movie not found!".to_string()))).unwrap();
    let completion = rx.recv().await.unwrap();
    assert!(!app.apply(completion));

    let snapshot = app.snapshot();
    assert_eq!(snapshot.query, "abc");
    assert_eq!(snapshot.results.len(), 1);
    assert_eq!(snapshot.results[0].id, "tt-abc");
    assert!(snapshot.error.is_none());
    assert_eq!(lookup.search_calls(), 3);
}

#[tokio::test]
async fn test_search_error_is_shown() {
    let lookup = Arc::new(ScriptedLookup::default());
    let release = lookup.script("zzzz");
    let (mut app, mut rx) = new_app(&lookup, &MemoryStore::new());

    app.on_query_change("zzzz");
    release.send(Err(LookupError::NotFound("Movie not found!".to_string()))).unwrap();
    let completion = rx.recv().await.unwrap();
    assert!(app.apply(completion));

    let snapshot = app.snapshot();
    assert_eq!(snapshot.phase, SearchPhase::Failed);
    assert_eq!(snapshot.error.as_deref(), Some("Movie not found!"));
    assert!(snapshot.results.is_empty());

    app.on_query_change("");
    let snapshot = app.snapshot();
    assert!(snapshot.error.is_none());
    assert_eq!(snapshot.phase, SearchPhase::Idle);
}

#[tokio::test]
async fn test_selecting_twice_toggles_off_with_one_fetch() {
    let lookup = Arc::new(ScriptedLookup::default());
    let (mut app, mut rx) = new_app(&lookup, &MemoryStore::new());

    app.on_select("tt0111161");
    app.on_select("tt0111161");
    assert_eq!(app.snapshot().selected_id, None);

    // The first fetch still completes, but it no longer applies
    let completion = rx.recv().await.unwrap();
    assert!(!app.apply(completion));
    assert_eq!(lookup.detail_calls(), 1);
    assert!(rx.try_recv().is_err());
    assert_eq!(app.snapshot().detail, DetailState::Empty);
}

#[tokio::test]
async fn test_selection_does_not_touch_query_or_watchlist() {
    let lookup = Arc::new(ScriptedLookup::default());
    let store = MemoryStore::with_entries(vec![watched_entry("tt001", 7)]);
    let (mut app, mut rx) = new_app(&lookup, &store);

    app.on_query_change("heat");
    let completion = rx.recv().await.unwrap();
    app.apply(completion);

    select_and_load(&mut app, &mut rx, "tt0113277").await;
    let snapshot = app.snapshot();
    assert_eq!(snapshot.query, "heat");
    assert_eq!(snapshot.results.len(), 1);
    assert_eq!(snapshot.watched.len(), 1);
    assert_eq!(snapshot.detail.loaded().unwrap().id, "tt0113277");
}

#[tokio::test]
async fn test_add_to_watchlist_from_details() {
    let lookup = Arc::new(ScriptedLookup::default());
    let store = MemoryStore::new();
    let (mut app, mut rx) = new_app(&lookup, &store);

    select_and_load(&mut app, &mut rx, "tt0111161").await;
    let added = app.on_add_to_watchlist(8).unwrap();

    assert!(added.is_durable());
    assert_eq!(added.value.runtime_minutes, Some(142));
    assert_eq!(added.value.user_rating, 8);

    let snapshot = app.snapshot();
    assert_eq!(snapshot.selected_id, None);
    assert_eq!(snapshot.watched.len(), 1);
    assert_eq!(snapshot.summary.count, 1);
    assert!((snapshot.summary.mean_runtime_minutes - 142.0).abs() < 1e-9);
    assert_eq!(store.saved_entries().len(), 1);
}

#[tokio::test]
async fn test_add_requires_loaded_selection() {
    let lookup = Arc::new(ScriptedLookup::default());
    let (mut app, _rx) = new_app(&lookup, &MemoryStore::new());

    assert_eq!(app.on_add_to_watchlist(5).unwrap_err(), AppError::NothingSelected);

    app.on_select("tt0111161");
    assert_eq!(
        app.on_add_to_watchlist(5).unwrap_err(),
        AppError::DetailsNotLoaded("tt0111161".to_string())
    );
    assert!(app.watchlist().is_empty());
}

#[tokio::test]
async fn test_invalid_rating_keeps_selection() {
    let lookup = Arc::new(ScriptedLookup::default());
    let (mut app, mut rx) = new_app(&lookup, &MemoryStore::new());

    select_and_load(&mut app, &mut rx, "tt0111161").await;
    assert_eq!(
        app.on_add_to_watchlist(0).unwrap_err(),
        AppError::Watchlist(WatchlistError::InvalidRating(0))
    );
    assert_eq!(app.snapshot().selected_id.as_deref(), Some("tt0111161"));
}

#[tokio::test]
async fn test_detail_failure_is_visible() {
    let lookup = Arc::new(ScriptedLookup::default());
    let (mut app, mut rx) = new_app(&lookup, &MemoryStore::new());

    select_and_load(&mut app, &mut rx, "bad-id").await;
    assert_eq!(
        app.snapshot().detail,
        DetailState::Unavailable("Incorrect IMDb ID.".to_string())
    );
}

#[tokio::test]
async fn test_watched_title_reports_user_rating() {
    let lookup = Arc::new(ScriptedLookup::default());
    let store = MemoryStore::with_entries(vec![watched_entry("tt001", 7)]);
    let (mut app, mut rx) = new_app(&lookup, &store);

    select_and_load(&mut app, &mut rx, "tt001").await;
    let snapshot = app.snapshot();
    assert!(snapshot.is_selected_watched());
    assert_eq!(snapshot.selected_user_rating, Some(7));

    app.on_deselect();
    assert_eq!(app.snapshot().selected_user_rating, None);
}

#[tokio::test]
async fn test_failed_save_still_updates_collection() {
    let lookup = Arc::new(ScriptedLookup::default());
    let store = MemoryStore::with_entries(vec![watched_entry("tt001", 7)]);
    store.set_fail_saves(true);
    let (mut app, mut rx) = new_app(&lookup, &store);

    select_and_load(&mut app, &mut rx, "tt002").await;
    let added = app.on_add_to_watchlist(9).unwrap();
    assert!(added.warning.is_some());
    assert_eq!(app.snapshot().watched.len(), 2);

    let removed = app.on_delete_watched("tt001");
    assert!(removed.value);
    assert!(!removed.is_durable());

    let watched = app.snapshot().watched;
    assert_eq!(watched.len(), 1);
    assert_eq!(watched[0].id, "tt002");
    // The slot still holds what was there before the failures
    assert_eq!(store.saved_entries().len(), 1);
    assert_eq!(store.saved_entries()[0].id, "tt001");
}
