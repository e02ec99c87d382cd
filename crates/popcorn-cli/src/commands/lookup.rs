use super::Context;
use crate::output::Output;
use crate::render;
use crate::ui::LoadingIndicator;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use popcorn_core::Watchlist;
use popcorn_sources::{CancellationToken, MovieLookup};
use serde_json::json;

/// One-shot title search
pub async fn run_search(ctx: &Context, query: &str, output: &Output) -> Result<()> {
    let query = query.trim();
    if query.is_empty() {
        return Err(eyre!("Search text must not be empty"));
    }
    let client = ctx.lookup()?;

    let mut loading = LoadingIndicator::new();
    loading.start(format!("Searching {:?}...", query));
    let result = client.search_by_title(query, &CancellationToken::new()).await;
    loading.stop();

    let results = result.map_err(|e| eyre!("Search failed: {}", e))?;

    if output.is_human() {
        output.println(format!("Found {} results", results.len()));
        output.println(render::results_table(&results, None).to_string());
    } else {
        output.json(&json!({ "query": query, "results": results }));
    }
    Ok(())
}

/// One-shot detail lookup, annotated with the stored rating if the title is watched
pub async fn run_show(ctx: &Context, id: &str, output: &Output) -> Result<()> {
    let client = ctx.lookup()?;

    let mut loading = LoadingIndicator::new();
    loading.start(format!("Loading {}...", id));
    let result = client.fetch_detail(id, &CancellationToken::new()).await;
    loading.stop();

    let detail = result.map_err(|e| eyre!("Lookup of {} failed: {}", id, e))?;

    let watchlist = Watchlist::load(Box::new(ctx.store()));
    let user_rating = watchlist.user_rating_for(&detail.id);

    if output.is_human() {
        output.println(render::detail_view(&detail, user_rating));
    } else {
        output.json(&json!({ "detail": detail, "user_rating": user_rating }));
    }
    Ok(())
}
