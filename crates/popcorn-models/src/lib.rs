pub mod movie;
pub mod summary;
pub mod watched;

pub use movie::{MovieDetail, MovieSummary};
pub use summary::WatchedSummary;
pub use watched::{WatchedEntry, MAX_USER_RATING, MIN_USER_RATING};
