use crate::error::LookupError;
use crate::omdb::api;
use crate::traits::MovieLookup;
use async_trait::async_trait;
use popcorn_config::ApiConfig;
use popcorn_models::{MovieDetail, MovieSummary};
use reqwest::Client;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Create a reqwest Client for the OMDb API
pub fn create_omdb_client(timeout: Duration) -> Client {
    Client::builder()
        .user_agent(concat!("popcorn/", env!("CARGO_PKG_VERSION")))
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| Client::new())
}

#[derive(Clone)]
pub struct OmdbClient {
    client: Arc<Client>,
    base_url: String,
    api_key: String,
}

impl OmdbClient {
    pub fn new(base_url: String, api_key: String, timeout: Duration) -> Self {
        Self {
            client: Arc::new(create_omdb_client(timeout)),
            base_url,
            api_key,
        }
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self, LookupError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or(LookupError::MissingApiKey)?;
        Ok(Self::new(
            config.base_url.clone(),
            api_key,
            Duration::from_secs(config.timeout_secs),
        ))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Race a request against its cancellation token
///
/// Once the token has fired the result is always `Cancelled`, even when the
/// request finished in the same poll.
async fn cancellable<T, F>(cancel: &CancellationToken, request: F) -> Result<T, LookupError>
where
    F: Future<Output = Result<T, LookupError>>,
{
    if cancel.is_cancelled() {
        return Err(LookupError::Cancelled);
    }

    let result = tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(LookupError::Cancelled),
        result = request => result,
    };

    if cancel.is_cancelled() {
        debug!("Discarding result of cancelled request");
        return Err(LookupError::Cancelled);
    }
    result
}

#[async_trait]
impl MovieLookup for OmdbClient {
    fn source_name(&self) -> &str {
        "omdb"
    }

    async fn search_by_title(
        &self,
        text: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<MovieSummary>, LookupError> {
        cancellable(cancel, api::search(&self.client, &self.base_url, &self.api_key, text)).await
    }

    async fn fetch_detail(
        &self,
        id: &str,
        cancel: &CancellationToken,
    ) -> Result<MovieDetail, LookupError> {
        cancellable(cancel, api::detail(&self.client, &self.base_url, &self.api_key, id)).await
    }
}
