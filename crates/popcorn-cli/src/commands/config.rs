use super::prompts;
use super::Context;
use crate::output::Output;
use crate::ConfigCommands;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use comfy_table::{Cell, Table};
use owo_colors::OwoColorize;
use serde_json::json;

pub fn run_config(ctx: &Context, cmd: ConfigCommands, output: &Output) -> Result<()> {
    match cmd {
        ConfigCommands::Show { full } => show_config(ctx, full, output),
        ConfigCommands::Set { api_key, base_url, timeout_secs, slot } => {
            set_config(ctx, api_key, base_url, timeout_secs, slot, output)
        }
        ConfigCommands::Path => {
            let config_file = ctx.paths.config_file();
            if output.is_human() {
                output.println(config_file.display().to_string());
            } else {
                output.json(&json!({ "config_file": config_file }));
            }
            Ok(())
        }
    }
}

fn show_config(ctx: &Context, full: bool, output: &Output) -> Result<()> {
    let config = &ctx.config;
    let config_file = ctx.paths.config_file();
    let slot_file = ctx.store().path().to_path_buf();
    let api_key = config.api.api_key.as_deref().unwrap_or_default();
    let api_key_display = if full { api_key.to_string() } else { mask_string(api_key) };

    if !output.is_human() {
        output.json(&json!({
            "config_file": config_file,
            "api": {
                "base_url": config.api.base_url,
                "api_key": api_key_display,
                "timeout_secs": config.api.timeout_secs,
            },
            "storage": {
                "slot": config.storage.slot,
                "slot_file": slot_file,
                "data_dir": ctx.paths.data_dir(),
            },
            "log_dir": ctx.paths.log_dir(),
        }));
        return Ok(());
    }

    if !config_file.exists() {
        output.warn(format!("Configuration file not found at: {}", config_file.display()));
        output.info("Defaults are in use. Run 'popcorn config set' to create it.");
    }

    let mut table = Table::new();
    table.set_header(vec![
        Cell::new("Setting").add_attribute(comfy_table::Attribute::Bold),
        Cell::new("Value").add_attribute(comfy_table::Attribute::Bold),
    ]);
    table.add_row(vec![Cell::new("Config File"), Cell::new(config_file.display().to_string())]);
    table.add_row(vec![Cell::new("API Base URL"), Cell::new(&config.api.base_url)]);
    table.add_row(vec![
        Cell::new("API Key"),
        Cell::new(if config.is_api_configured() {
            api_key_display
        } else {
            "<not set>".red().to_string()
        }),
    ]);
    table.add_row(vec![Cell::new("Timeout"), Cell::new(format!("{}s", config.api.timeout_secs))]);
    table.add_row(vec![Cell::new("Slot"), Cell::new(&config.storage.slot)]);
    table.add_row(vec![Cell::new("Slot File"), Cell::new(slot_file.display().to_string())]);
    table.add_row(vec![Cell::new("Data Dir"), Cell::new(ctx.paths.data_dir().display().to_string())]);
    table.add_row(vec![Cell::new("Log Dir"), Cell::new(ctx.paths.log_dir().display().to_string())]);
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    output.println(table.to_string());
    Ok(())
}

fn set_config(
    ctx: &Context,
    api_key: Option<String>,
    base_url: Option<String>,
    timeout_secs: Option<u64>,
    slot: Option<String>,
    output: &Output,
) -> Result<()> {
    let mut config = ctx.config.clone();
    let nothing_given = api_key.is_none() && base_url.is_none() && timeout_secs.is_none() && slot.is_none();

    if nothing_given {
        output.info("Get a free key at https://www.omdbapi.com/apikey.aspx");
        let key = prompts::prompt_secret("OMDb API key")?;
        if !key.trim().is_empty() {
            config.api.api_key = Some(key.trim().to_string());
        }
        config.api.base_url = prompts::prompt_string("API base URL", Some(&config.api.base_url))?;
        config.api.timeout_secs = prompts::prompt_number("Timeout (seconds)", config.api.timeout_secs)?;
        config.storage.slot = prompts::prompt_string("Watched list slot", Some(&config.storage.slot))?;
    } else {
        if let Some(key) = api_key {
            config.api.api_key = Some(key);
        }
        if let Some(url) = base_url {
            config.api.base_url = url;
        }
        if let Some(timeout) = timeout_secs {
            config.api.timeout_secs = timeout;
        }
        if let Some(slot) = slot {
            config.storage.slot = slot;
        }
    }

    config.validate().map_err(|e| eyre!("{}", e))?;

    let config_file = ctx.paths.config_file();
    config
        .save_to_file(&config_file)
        .map_err(|e| eyre!("Failed to save config to {}: {}", config_file.display(), e))?;

    tracing::info!("Configuration saved to {}", config_file.display());
    output.success(format!("Configuration saved to {}", config_file.display()));
    Ok(())
}

fn mask_string(s: &str) -> String {
    if s.is_empty() {
        return "<not set>".to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..2].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{}***{}", head, tail)
}
