use async_trait::async_trait;
use popcorn_models::{MovieDetail, MovieSummary};
use tokio_util::sync::CancellationToken;
use crate::error::LookupError;

/// Read access to a remote movie database
///
/// Implementations must resolve to `LookupError::Cancelled` once `cancel` has
/// fired, whatever the state of the underlying request.
#[async_trait]
pub trait MovieLookup: Send + Sync {
    fn source_name(&self) -> &str;

    async fn search_by_title(
        &self,
        text: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<MovieSummary>, LookupError>;

    async fn fetch_detail(
        &self,
        id: &str,
        cancel: &CancellationToken,
    ) -> Result<MovieDetail, LookupError>;
}
