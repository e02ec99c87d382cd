pub mod traits;
pub mod omdb;
pub mod error;

pub use traits::MovieLookup;
pub use omdb::OmdbClient;
pub use error::LookupError;
pub use tokio_util::sync::CancellationToken;
