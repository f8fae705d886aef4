use std::{
    io::IsTerminal,
    sync::{OnceLock, RwLock},
};

use colored::{Color, Colorize};

use crate::cli::output::current_preferences;

#[derive(Clone, Debug)]
pub struct UiStyle {
    pub horizontal: char,
    pub use_color: bool,
    pub color_header: Option<Color>,
    pub color_negative: Option<Color>,
}

static STYLE: OnceLock<RwLock<UiStyle>> = OnceLock::new();

pub fn style() -> UiStyle {
    let lock = STYLE.get_or_init(|| RwLock::new(UiStyle::detect()));
    match lock.read() {
        Ok(guard) => guard.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

/// Re-reads terminal state and output preferences, e.g. after a config change.
pub fn refresh_style() {
    let lock = STYLE.get_or_init(|| RwLock::new(UiStyle::detect()));
    if let Ok(mut guard) = lock.write() {
        *guard = UiStyle::detect();
    }
}

impl UiStyle {
    fn detect() -> Self {
        let prefs = current_preferences();
        let stdout_tty = std::io::stdout().is_terminal();
        let no_color = std::env::var_os("NO_COLOR").is_some();
        Self::new(stdout_tty && prefs.color_enabled && !no_color)
    }

    pub fn new(use_color: bool) -> Self {
        Self {
            horizontal: '-',
            use_color,
            color_header: use_color.then_some(Color::BrightBlue),
            color_negative: use_color.then_some(Color::Red),
        }
    }

    pub fn horizontal_line(&self, width: usize) -> String {
        self.horizontal.to_string().repeat(width.max(20))
    }

    pub fn apply_header_style(&self, text: &str) -> String {
        match self.color_header {
            Some(color) => text.color(color).bold().to_string(),
            None => text.to_string(),
        }
    }

    /// Highlights a balance cell when the balance is below zero.
    pub fn apply_balance_style(&self, text: &str, balance: f64) -> String {
        match self.color_negative {
            Some(color) if balance < 0.0 => text.color(color).to_string(),
            _ => text.to_string(),
        }
    }
}
