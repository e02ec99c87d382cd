use indicatif::{ProgressBar, ProgressStyle};
use std::io::{IsTerminal, Write};
use std::time::Duration;

/// "Loading..." spinner shown while a lookup is in flight
pub struct LoadingIndicator {
    spinner: Option<ProgressBar>,
    interactive: bool,
}

impl LoadingIndicator {
    pub fn new() -> Self {
        Self {
            spinner: None,
            interactive: is_interactive(),
        }
    }

    pub fn start(&mut self, msg: impl Into<String>) {
        let msg = msg.into();
        if !self.interactive {
            tracing::debug!(operation = "loading", message = %msg, "Waiting for lookup");
            return;
        }
        match &self.spinner {
            Some(spinner) => spinner.set_message(msg),
            None => {
                let spinner = ProgressBar::new_spinner();
                if let Ok(style) = ProgressStyle::default_spinner()
                    .template("{spinner:.green} {msg}")
                {
                    spinner.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ "));
                }
                spinner.set_message(msg);
                spinner.enable_steady_tick(Duration::from_millis(100));
                self.spinner = Some(spinner);
            }
        }
    }

    pub fn stop(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }
}

impl Drop for LoadingIndicator {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Sets the terminal window title when it changes
///
/// Mirrors the details view's attach/detach: "Movie | <title>" while a title
/// is open, the app name otherwise.
pub struct WindowTitle {
    current: Option<String>,
    enabled: bool,
}

impl WindowTitle {
    pub fn new() -> Self {
        Self {
            current: None,
            enabled: is_interactive(),
        }
    }

    pub fn set(&mut self, title: &str) {
        if self.current.as_deref() == Some(title) {
            return;
        }
        self.current = Some(title.to_string());
        if self.enabled {
            let mut stdout = std::io::stdout();
            let _ = write!(stdout, "\x1b]0;{}\x07", title);
            let _ = stdout.flush();
        }
    }
}

pub fn is_interactive() -> bool {
    std::io::stdout().is_terminal() && std::io::stderr().is_terminal()
}
