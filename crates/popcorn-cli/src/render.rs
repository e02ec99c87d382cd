use comfy_table::{presets, modifiers, Attribute, Cell, Color, Table};
use owo_colors::OwoColorize;
use popcorn_core::{AppSnapshot, DetailState};
use popcorn_models::{MovieDetail, MovieSummary, WatchedEntry, WatchedSummary};
use std::fmt::Write;

pub const APP_TITLE: &str = "usePopcorn";

/// Terminal title for the current view
pub fn window_title(snapshot: &AppSnapshot) -> String {
    match snapshot.detail.loaded() {
        Some(detail) if snapshot.selected_id.is_some() => format!("Movie | {}", detail.title),
        _ => APP_TITLE.to_string(),
    }
}

fn new_table() -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL);
    table.apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table
}

pub fn results_table(results: &[MovieSummary], selected_id: Option<&str>) -> Table {
    let mut table = new_table();
    table.set_header(vec![
        Cell::new("#").add_attribute(Attribute::Bold),
        Cell::new("Title").add_attribute(Attribute::Bold),
        Cell::new("🗓 Year").add_attribute(Attribute::Bold),
        Cell::new("IMDB id").add_attribute(Attribute::Bold),
    ]);
    for (i, movie) in results.iter().enumerate() {
        let mut title = Cell::new(&movie.title);
        if selected_id == Some(movie.id.as_str()) {
            title = title.fg(Color::Cyan).add_attribute(Attribute::Bold);
        }
        table.add_row(vec![
            Cell::new(i + 1),
            title,
            Cell::new(&movie.year),
            Cell::new(&movie.id),
        ]);
    }
    table
}

pub fn watched_table(entries: &[WatchedEntry]) -> Table {
    let mut table = new_table();
    table.set_header(vec![
        Cell::new("#").add_attribute(Attribute::Bold),
        Cell::new("Title").add_attribute(Attribute::Bold),
        Cell::new("⭐️ IMDB").add_attribute(Attribute::Bold),
        Cell::new("🌟 Yours").add_attribute(Attribute::Bold),
        Cell::new("⏳ Runtime").add_attribute(Attribute::Bold),
        Cell::new("IMDB id").add_attribute(Attribute::Bold),
    ]);
    for (i, entry) in entries.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&entry.title),
            Cell::new(entry.imdb_rating.map(|r| r.to_string()).unwrap_or_else(|| "N/A".to_string())),
            Cell::new(entry.user_rating),
            Cell::new(entry.runtime_minutes.map(|m| format!("{} min", m)).unwrap_or_else(|| "N/A".to_string())),
            Cell::new(&entry.id),
        ]);
    }
    table
}

pub fn summary_line(summary: &WatchedSummary) -> String {
    format!(
        "#️⃣ {} movies   ⭐️ {:.1}   🌟 {:.1}   ⏳ {:.1} min",
        summary.count, summary.mean_imdb_rating, summary.mean_user_rating, summary.mean_runtime_minutes
    )
}

pub fn detail_view(detail: &MovieDetail, user_rating: Option<u8>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", detail.title.bold());
    let _ = writeln!(out, "{} - {}", detail.release_date, detail.runtime_label());
    let rating = detail.imdb_rating.map(|r| r.to_string()).unwrap_or_else(|| "N/A".to_string());
    let _ = writeln!(out, "⭐ {} IMDB rating", rating);
    let _ = writeln!(out, "Poster: {}", detail.poster_url);
    let _ = writeln!(out);
    match user_rating {
        Some(rating) => {
            let _ = writeln!(out, "You rated this movie with {}⭐", rating);
        }
        None => {
            let _ = writeln!(out, "{}", "Rate it with `rate <1-10>` to add it to your list".bright_black());
        }
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", detail.plot.italic());
    let _ = writeln!(out, "Starring {}", detail.actors);
    let _ = write!(out, "Directed by {}", detail.director);
    out
}

/// Whole screen: search box on top, then either the open title or the watched list
pub fn screen(snapshot: &AppSnapshot) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "🍿 {}   Search: {:?}   Found {} results", APP_TITLE.bold(), snapshot.query, snapshot.result_count());
    if snapshot.loading {
        let _ = writeln!(out, "LOADING...");
    } else if let Some(error) = &snapshot.error {
        let _ = writeln!(out, "⛔ {}", error.red());
    } else if !snapshot.results.is_empty() {
        let _ = writeln!(out, "{}", results_table(&snapshot.results, snapshot.selected_id.as_deref()));
    }
    let _ = writeln!(out);

    match (&snapshot.selected_id, &snapshot.detail) {
        (Some(_), DetailState::Loaded(detail)) => {
            let _ = writeln!(out, "{}", detail_view(detail, snapshot.selected_user_rating));
        }
        (Some(id), DetailState::Loading) => {
            let _ = writeln!(out, "Loading details for {}...", id);
        }
        (Some(id), DetailState::Unavailable(reason)) => {
            let _ = writeln!(out, "⛔ Details for {} unavailable: {}", id, reason);
        }
        _ => {
            let _ = writeln!(out, "{}", "Movies you watched".bold());
            let _ = writeln!(out, "{}", summary_line(&snapshot.summary));
            if !snapshot.watched.is_empty() {
                let _ = writeln!(out, "{}", watched_table(&snapshot.watched));
            }
        }
    }
    out
}
