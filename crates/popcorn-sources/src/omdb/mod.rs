pub mod client;
pub mod api;

pub use client::OmdbClient;
pub use api::{decode_detail, decode_search, parse_runtime};
