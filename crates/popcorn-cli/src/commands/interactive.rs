use super::{prompts, Context};
use crate::output::Output;
use crate::render;
use crate::ui::{is_interactive, LoadingIndicator, WindowTitle};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use popcorn_core::{App, AppSnapshot, DetailState, MemoryStore, WatchedStore};
use popcorn_models::{MAX_USER_RATING, MIN_USER_RATING};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

const HELP: &str = "\
Commands:
  /<text>, search <text>   search titles (an empty search clears the results)
  clear                    clear the search
  select <n|id>            open a result; selecting it again closes it
  back                     close the open title
  rate <1-10>              rate the open title and add it to your watched list
  delete <n|id>            remove an entry from your watched list
  help                     show this help
  quit                     exit";

/// Row reference typed by the user: 1-based position or an IMDB id
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Index(usize),
    Id(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Query(String),
    Select(Target),
    Deselect,
    Rate(u8),
    Delete(Target),
    Help,
    Quit,
}

/// Parse one input line; `Ok(None)` for a blank line
pub fn parse_action(line: &str) -> Result<Option<Action>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    if let Some(text) = line.strip_prefix('/') {
        return Ok(Some(Action::Query(text.trim().to_string())));
    }

    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };

    let action = match command.to_lowercase().as_str() {
        "search" => Action::Query(rest.to_string()),
        "clear" => Action::Query(String::new()),
        "select" | "s" => Action::Select(parse_target(rest)?),
        "back" | "b" => Action::Deselect,
        "rate" | "r" => Action::Rate(parse_rating(rest)?),
        "delete" | "d" => Action::Delete(parse_target(rest)?),
        "help" | "?" => Action::Help,
        "quit" | "q" | "exit" => Action::Quit,
        other => return Err(format!("Unknown command {:?}. Type `help` for commands.", other)),
    };
    Ok(Some(action))
}

fn parse_target(text: &str) -> Result<Target, String> {
    if text.is_empty() {
        return Err("Expected a row number or an IMDB id".to_string());
    }
    if text.chars().all(|c| c.is_ascii_digit()) {
        return match text.parse::<usize>() {
            Ok(n) if n > 0 => Ok(Target::Index(n)),
            _ => Err(format!("Invalid row number {:?}", text)),
        };
    }
    Ok(Target::Id(text.to_string()))
}

fn parse_rating(text: &str) -> Result<u8, String> {
    text.parse::<u8>().map_err(|_| {
        format!("Rating must be a number between {} and {}", MIN_USER_RATING, MAX_USER_RATING)
    })
}

fn resolve_result(snapshot: &AppSnapshot, target: Target) -> Result<String, String> {
    match target {
        Target::Id(id) => Ok(id),
        Target::Index(n) => snapshot
            .results
            .get(n - 1)
            .map(|m| m.id.clone())
            .ok_or_else(|| format!("There is no result #{}", n)),
    }
}

fn resolve_watched(snapshot: &AppSnapshot, target: Target) -> Result<String, String> {
    match target {
        Target::Id(id) => Ok(id),
        Target::Index(n) => snapshot
            .watched
            .get(n - 1)
            .map(|e| e.id.clone())
            .ok_or_else(|| format!("There is no watched entry #{}", n)),
    }
}

pub async fn run_interactive(ctx: &Context, ephemeral: bool, output: &Output) -> Result<()> {
    let client = match ctx.lookup() {
        Ok(client) => client,
        Err(e) if is_interactive() => {
            output.warn(e.to_string());
            prompt_for_api_key(ctx, output)?.lookup()?
        }
        Err(e) => return Err(e),
    };

    let store: Box<dyn WatchedStore> = if ephemeral {
        info!("Running with an in-memory watched list");
        Box::new(MemoryStore::new())
    } else {
        Box::new(ctx.store())
    };

    let (mut app, mut completions) = App::new(Arc::new(client), store);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut loading = LoadingIndicator::new();
    let mut title = WindowTitle::new();

    output.info("Type /<text> to search, `help` for all commands.");
    redraw(&app, output, &mut loading, &mut title);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    debug!("stdin closed");
                    break;
                };
                match parse_action(&line) {
                    Ok(None) => {}
                    Ok(Some(Action::Quit)) => break,
                    Ok(Some(Action::Help)) => {
                        output.println(HELP);
                        continue;
                    }
                    Ok(Some(action)) => handle_action(&mut app, action, output),
                    Err(msg) => {
                        output.error(msg);
                        continue;
                    }
                }
            }
            Some(completion) = completions.recv() => {
                if !app.apply(completion) {
                    continue;
                }
            }
        }
        redraw(&app, output, &mut loading, &mut title);
    }

    loading.stop();
    title.set(render::APP_TITLE);
    Ok(())
}

fn handle_action(app: &mut App, action: Action, output: &Output) {
    let snapshot = app.snapshot();
    match action {
        Action::Query(text) => app.on_query_change(text),
        Action::Select(target) => match resolve_result(&snapshot, target) {
            Ok(id) => app.on_select(id),
            Err(msg) => output.error(msg),
        },
        Action::Deselect => app.on_deselect(),
        Action::Rate(rating) => match app.on_add_to_watchlist(rating) {
            Ok(added) => {
                if let Some(warning) = &added.warning {
                    output.warn(format!("Added, but your watched list could not be saved: {}", warning));
                } else {
                    output.success(format!("Added {} with {}⭐", added.value.title, added.value.user_rating));
                }
            }
            Err(e) => output.error(e.to_string()),
        },
        Action::Delete(target) => match resolve_watched(&snapshot, target) {
            Ok(id) => {
                let removed = app.on_delete_watched(&id);
                if let Some(warning) = &removed.warning {
                    output.warn(format!("Removed, but your watched list could not be saved: {}", warning));
                } else if !removed.value {
                    output.warn(format!("{} is not on your watched list", id));
                }
            }
            Err(msg) => output.error(msg),
        },
        Action::Help | Action::Quit => {}
    }
}

fn redraw(app: &App, output: &Output, loading: &mut LoadingIndicator, title: &mut WindowTitle) {
    let snapshot = app.snapshot();
    title.set(&render::window_title(&snapshot));

    loading.stop();
    if output.is_human() {
        output.println(render::screen(&snapshot));
    } else {
        match serde_json::to_value(&snapshot) {
            Ok(value) => output.json(&value),
            Err(e) => output.error(format!("Failed to serialize state: {}", e)),
        }
    }

    if snapshot.loading {
        loading.start(format!("Searching {:?}...", snapshot.query));
    } else if matches!(snapshot.detail, DetailState::Loading) {
        loading.start("Loading details...");
    }
}

fn prompt_for_api_key(ctx: &Context, output: &Output) -> Result<Context> {
    output.info("Get a free key at https://www.omdbapi.com/apikey.aspx");
    let key = prompts::prompt_secret("OMDb API key")?;
    let key = key.trim();
    if key.is_empty() {
        return Err(eyre!("An OMDb API key is required to search"));
    }

    let mut config = ctx.config.clone();
    config.api.api_key = Some(key.to_string());
    let config_file = ctx.paths.config_file();
    config
        .save_to_file(&config_file)
        .map_err(|e| eyre!("Failed to save config to {}: {}", config_file.display(), e))?;
    output.success(format!("API key saved to {}", config_file.display()));

    Context::load()
}
