use popcorn_models::{MovieDetail, MovieSummary};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};
use crate::error::LookupError;

#[derive(Debug, Deserialize)]
struct OmdbSearchResponse {
    #[serde(rename = "Search")]
    search: Option<Vec<OmdbSearchItem>>,
    #[serde(rename = "totalResults")]
    total_results: Option<String>,
    #[serde(rename = "Response")]
    response: Option<String>,
    #[serde(rename = "Error")]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OmdbSearchItem {
    #[serde(rename = "Title")]
    title: String,
    #[serde(rename = "Year", default)]
    year: String,
    #[serde(rename = "imdbID")]
    imdb_id: String,
    #[serde(rename = "Poster", default)]
    poster: String,
}

#[derive(Debug, Deserialize)]
struct OmdbDetail {
    #[serde(rename = "Response")]
    response: Option<String>,
    #[serde(rename = "Error")]
    error: Option<String>,
    #[serde(rename = "imdbID")]
    imdb_id: Option<String>,
    #[serde(rename = "Title")]
    title: Option<String>,
    #[serde(rename = "Poster", default)]
    poster: String,
    #[serde(rename = "Released", default)]
    released: String,
    #[serde(rename = "Runtime", default)]
    runtime: String,
    #[serde(rename = "imdbRating", default)]
    imdb_rating: String,
    #[serde(rename = "Plot", default)]
    plot: String,
    #[serde(rename = "Actors", default)]
    actors: String,
    #[serde(rename = "Director", default)]
    director: String,
}

/// The service signals failures in-band with `"Response": "False"`
fn is_failure(response: Option<&str>) -> bool {
    response.map(|r| r.eq_ignore_ascii_case("false")).unwrap_or(false)
}

/// Extract the leading integer of a runtime such as "142 min"
pub fn parse_runtime(runtime: &str) -> Option<u32> {
    runtime.split_whitespace().next()?.parse().ok()
}

fn parse_rating(rating: &str) -> Option<f64> {
    rating.trim().parse::<f64>().ok()
}

/// Decode a title search body
pub fn decode_search(body: &str) -> Result<Vec<MovieSummary>, LookupError> {
    let response: OmdbSearchResponse = serde_json::from_str(body)
        .map_err(|e| LookupError::Malformed(format!("search response: {}", e)))?;

    if is_failure(response.response.as_deref()) {
        let message = response.error.unwrap_or_else(|| "Movie not found!".to_string());
        return Err(LookupError::NotFound(message));
    }

    let items = response
        .search
        .ok_or_else(|| LookupError::Malformed("search response has no results list".to_string()))?;

    debug!(
        "OMDb search returned {} items (total {})",
        items.len(),
        response.total_results.as_deref().unwrap_or("?")
    );

    Ok(items
        .into_iter()
        .map(|item| MovieSummary {
            id: item.imdb_id,
            title: item.title,
            year: item.year,
            poster_url: item.poster,
        })
        .collect())
}

/// Decode a fetch-by-id body
///
/// `requested_id` fills in the id when the body omits it.
pub fn decode_detail(requested_id: &str, body: &str) -> Result<MovieDetail, LookupError> {
    let detail: OmdbDetail = serde_json::from_str(body)
        .map_err(|e| LookupError::Malformed(format!("detail response: {}", e)))?;

    if is_failure(detail.response.as_deref()) {
        let message = detail.error.unwrap_or_else(|| "Incorrect IMDb ID.".to_string());
        return Err(LookupError::NotFound(message));
    }

    let title = detail
        .title
        .ok_or_else(|| LookupError::Malformed("detail response has no title".to_string()))?;

    let id = match detail.imdb_id {
        Some(id) if !id.is_empty() => {
            if id != requested_id {
                warn!("OMDb returned {} for requested id {}", id, requested_id);
            }
            id
        }
        _ => requested_id.to_string(),
    };

    Ok(MovieDetail {
        id,
        title,
        poster_url: detail.poster,
        release_date: detail.released,
        runtime_minutes: parse_runtime(&detail.runtime),
        imdb_rating: parse_rating(&detail.imdb_rating),
        plot: detail.plot,
        actors: detail.actors,
        director: detail.director,
    })
}

/// Issue a GET with the given query parameters and return the raw body
async fn get_body(client: &Client, base_url: &str, params: &[(&str, &str)]) -> Result<String, LookupError> {
    let response = client.get(base_url).query(params).send().await?;

    if !response.status().is_success() {
        let status = response.status();
        return Err(LookupError::Connection(format!("HTTP {}", status)));
    }

    Ok(response.text().await?)
}

/// Search titles by text
pub async fn search(client: &Client, base_url: &str, api_key: &str, text: &str) -> Result<Vec<MovieSummary>, LookupError> {
    debug!("OMDb search: {:?}", text);
    let body = get_body(client, base_url, &[("apikey", api_key), ("s", text)]).await?;
    decode_search(&body)
}

/// Fetch the full record for one IMDB id
pub async fn detail(client: &Client, base_url: &str, api_key: &str, id: &str) -> Result<MovieDetail, LookupError> {
    debug!("OMDb detail: {}", id);
    let body = get_body(client, base_url, &[("apikey", api_key), ("i", id)]).await?;
    decode_detail(id, &body)
}
