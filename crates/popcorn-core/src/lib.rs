pub mod app;
pub mod search;
pub mod selection;
pub mod snapshot;
pub mod store;
pub mod watchlist;

pub use app::{App, AppError, Completion, CompletionReceiver};
pub use search::{SearchPhase, SearchSession, SearchTicket};
pub use selection::{DetailState, DetailTicket, SelectionController};
pub use snapshot::AppSnapshot;
pub use store::{JsonFileStore, MemoryStore, Persisted, StoreError, WatchedStore};
pub use watchlist::{Watchlist, WatchlistError};
