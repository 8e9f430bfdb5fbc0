use owo_colors::Style;
use std::sync::OnceLock;
use crate::contract::{Priority, Status};

static THEME: OnceLock<Theme> = OnceLock::new();

#[derive(Debug, Clone)]
pub struct Theme {
    pub header: Style,
    pub success: Style,
    pub error: Style,
    pub warn: Style,
    pub info: Style,
    pub dim: Style,
    pub high: Style,
    pub medium: Style,
    pub low: Style,
    pub done: Style,
}

impl Theme {
    pub fn detect() -> Self {
        if !console::Term::stdout().is_term() {
            return Self::plain();
        }
        Self::colored()
    }

    pub fn colored() -> Self {
        Self {
            header: Style::new().cyan().bold(),
            success: Style::new().green().bold(),
            error: Style::new().red().bold(),
            warn: Style::new().yellow().bold(),
            info: Style::new().magenta(),
            dim: Style::new().white().dimmed(),
            high: Style::new().red().bold(),
            medium: Style::new().yellow(),
            low: Style::new().bright_black(),
            done: Style::new().green().strikethrough(),
        }
    }

    pub fn plain() -> Self {
        Self {
            header: Style::new(),
            success: Style::new(),
            error: Style::new(),
            warn: Style::new(),
            info: Style::new(),
            dim: Style::new(),
            high: Style::new(),
            medium: Style::new(),
            low: Style::new(),
            done: Style::new(),
        }
    }

    pub fn priority(&self, priority: Priority) -> Style {
        match priority {
            Priority::High => self.high.clone(),
            Priority::Medium => self.medium.clone(),
            Priority::Low => self.low.clone(),
        }
    }

    pub fn status(&self, status: Status) -> Style {
        match status {
            Status::Done => self.done.clone(),
            Status::InProgress => self.info.clone(),
            Status::Todo => Style::new(),
        }
    }
}

pub fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::detect)
}
