use super::Context;
use crate::output::Output;
use crate::render;
use crate::WatchedCommands;
use color_eyre::Result;
use popcorn_core::Watchlist;
use serde_json::json;

pub fn run_watched(ctx: &Context, cmd: WatchedCommands, output: &Output) -> Result<()> {
    let store = ctx.store();
    tracing::debug!("Using watched list slot {}", store.path().display());
    let mut watchlist = Watchlist::load(Box::new(store));

    match cmd {
        WatchedCommands::List => list(&watchlist, output),
        WatchedCommands::Remove { id } => remove(&mut watchlist, &id, output),
        WatchedCommands::Summary => summary(&watchlist, output),
    }
    Ok(())
}

fn list(watchlist: &Watchlist, output: &Output) {
    if !output.is_human() {
        output.json(&json!({ "watched": watchlist.entries() }));
        return;
    }
    if watchlist.is_empty() {
        output.info("Your watched list is empty.");
        return;
    }
    output.println(render::watched_table(watchlist.entries()).to_string());
    output.println(render::summary_line(&watchlist.summarize()));
}

fn remove(watchlist: &mut Watchlist, id: &str, output: &Output) {
    let removed = watchlist.remove(id);
    if let Some(warning) = &removed.warning {
        output.warn(format!("Removed in memory, but the change was not saved: {}", warning));
    }

    if !output.is_human() {
        output.json(&json!({ "id": id, "removed": removed.value, "saved": removed.is_durable() }));
    } else if removed.value {
        output.success(format!("Removed {} from your watched list", id));
    } else {
        output.warn(format!("{} is not on your watched list", id));
    }
}

fn summary(watchlist: &Watchlist, output: &Output) {
    let summary = watchlist.summarize();
    if output.is_human() {
        output.println(render::summary_line(&summary));
    } else {
        output.json(&json!({ "summary": summary }));
    }
}
