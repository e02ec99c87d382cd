use crate::store::{Persisted, WatchedStore};
use popcorn_models::{MovieDetail, WatchedEntry, WatchedSummary, MAX_USER_RATING, MIN_USER_RATING};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WatchlistError {
    #[error("Rating must be between 1 and 10, got {0}")]
    InvalidRating(u8),
}

/// The user's watched collection and the slot it is persisted to
///
/// Every mutation is written through to the store before it returns. A failed
/// write is reported in `Persisted::warning` but the in-memory change stands.
pub struct Watchlist {
    entries: Vec<WatchedEntry>,
    store: Box<dyn WatchedStore>,
}

impl Watchlist {
    /// Initialize from the store's slot (empty when absent or unreadable)
    pub fn load(store: Box<dyn WatchedStore>) -> Self {
        let entries = store.load();
        info!("Watched list initialized with {} entries", entries.len());
        Self { entries, store }
    }

    pub fn entries(&self) -> &[WatchedEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&WatchedEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn user_rating_for(&self, id: &str) -> Option<u8> {
        self.get(id).map(|e| e.user_rating)
    }

    /// Add a rated title
    ///
    /// A title that is already on the list is replaced in place, keeping its
    /// position.
    pub fn add(&mut self, detail: &MovieDetail, user_rating: u8) -> Result<Persisted<WatchedEntry>, WatchlistError> {
        if !(MIN_USER_RATING..=MAX_USER_RATING).contains(&user_rating) {
            return Err(WatchlistError::InvalidRating(user_rating));
        }

        let entry = WatchedEntry::from_detail(detail, user_rating);
        match self.entries.iter_mut().find(|e| e.id == entry.id) {
            Some(existing) => {
                debug!("Replacing watched entry {} (rating {} -> {})", entry.id, existing.user_rating, user_rating);
                *existing = entry.clone();
            }
            None => {
                debug!("Adding watched entry {} with rating {}", entry.id, user_rating);
                self.entries.push(entry.clone());
            }
        }

        Ok(Persisted {
            value: entry,
            warning: self.persist(),
        })
    }

    /// Remove a title; the value reports whether anything was removed
    pub fn remove(&mut self, id: &str) -> Persisted<bool> {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        if self.entries.len() == before {
            debug!("Watched entry {} not found, nothing to remove", id);
            return Persisted::durable(false);
        }

        debug!("Removed watched entry {}", id);
        Persisted {
            value: true,
            warning: self.persist(),
        }
    }

    pub fn summarize(&self) -> WatchedSummary {
        WatchedSummary::from_entries(&self.entries)
    }

    fn persist(&self) -> Option<crate::store::StoreError> {
        match self.store.save(&self.entries) {
            Ok(()) => None,
            Err(e) => {
                warn!("Watched list not saved, changes will not survive a restart: {}", e);
                Some(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::test_support::{movie_detail, watched_entry};

    fn empty_watchlist() -> (Watchlist, MemoryStore) {
        let store = MemoryStore::new();
        (Watchlist::load(Box::new(store.clone())), store)
    }

    #[test]
    fn test_load_from_store() {
        let store = MemoryStore::with_entries(vec![watched_entry("tt001", 6), watched_entry("tt002", 8)]);
        let watchlist = Watchlist::load(Box::new(store));
        assert_eq!(watchlist.len(), 2);
        assert_eq!(watchlist.user_rating_for("tt002"), Some(8));
    }

    #[test]
    fn test_add_builds_entry_from_detail() {
        let (mut watchlist, store) = empty_watchlist();
        let added = watchlist.add(&movie_detail("tt0111161", "142 min"), 8).unwrap();

        assert!(added.is_durable());
        assert_eq!(added.value.runtime_minutes, Some(142));
        assert_eq!(added.value.user_rating, 8);
        assert_eq!(store.saved_entries(), watchlist.entries().to_vec());
    }

    #[test]
    fn test_add_rejects_out_of_range_rating() {
        let (mut watchlist, store) = empty_watchlist();
        let detail = movie_detail("tt001", "100 min");
        assert_eq!(watchlist.add(&detail, 0).unwrap_err(), WatchlistError::InvalidRating(0));
        assert_eq!(watchlist.add(&detail, 11).unwrap_err(), WatchlistError::InvalidRating(11));
        assert!(watchlist.is_empty());
        assert_eq!(store.save_count(), 0);
    }

    #[test]
    fn test_add_then_remove_round_trip() {
        let store = MemoryStore::with_entries(vec![watched_entry("tt001", 6)]);
        let mut watchlist = Watchlist::load(Box::new(store.clone()));
        let before = watchlist.entries().to_vec();

        watchlist.add(&movie_detail("tt002", "95 min"), 7).unwrap();
        assert_eq!(watchlist.len(), 2);
        let removed = watchlist.remove("tt002");

        assert!(removed.value);
        assert_eq!(watchlist.entries(), before.as_slice());
        assert_eq!(store.saved_entries(), before);
    }

    #[test]
    fn test_duplicate_add_replaces_in_place() {
        let (mut watchlist, _store) = empty_watchlist();
        watchlist.add(&movie_detail("tt001", "100 min"), 4).unwrap();
        watchlist.add(&movie_detail("tt002", "100 min"), 5).unwrap();
        watchlist.add(&movie_detail("tt001", "100 min"), 9).unwrap();

        let ids: Vec<&str> = watchlist.entries().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["tt001", "tt002"]);
        assert_eq!(watchlist.user_rating_for("tt001"), Some(9));
    }

    #[test]
    fn test_remove_missing_id_does_not_write() {
        let (mut watchlist, store) = empty_watchlist();
        let removed = watchlist.remove("tt404");
        assert!(!removed.value);
        assert_eq!(store.save_count(), 0);
    }

    #[test]
    fn test_failed_save_keeps_memory_change() {
        let (mut watchlist, store) = empty_watchlist();
        store.set_fail_saves(true);

        let added = watchlist.add(&movie_detail("tt001", "120 min"), 6).unwrap();
        assert!(!added.is_durable());
        assert!(watchlist.contains("tt001"));

        let removed = watchlist.remove("tt001");
        assert!(removed.value);
        assert!(removed.warning.is_some());
        assert!(watchlist.is_empty());
        assert!(store.saved_entries().is_empty());
    }

    #[test]
    fn test_summarize_empty() {
        let (watchlist, _store) = empty_watchlist();
        let summary = watchlist.summarize();
        assert_eq!(summary.count, 0);
        assert_eq!(summary.mean_imdb_rating, 0.0);
        assert_eq!(summary.mean_user_rating, 0.0);
        assert_eq!(summary.mean_runtime_minutes, 0.0);
    }
}
