//! Process-wide light/dark theme.
//!
//! One explicit choice is kept for the whole process and persisted. Until
//! the user picks one, each request falls back to the browser's
//! `Sec-CH-Prefers-Color-Scheme` hint, then to light.

use crate::errors::AppError;
use crate::storage::{Preferences, persist_preferences};
use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::sync::Mutex;
use tracing::info;

pub const PREFERS_COLOR_SCHEME: &str = "sec-ch-prefers-color-scheme";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    /// Label of the toggle button, naming the theme it switches to.
    pub fn toggle_label(self) -> &'static str {
        match self {
            Self::Light => "🌙 Escuro",
            Self::Dark => "☀️ Claro",
        }
    }
}

pub fn system_preference(headers: &HeaderMap) -> Option<Theme> {
    let hint = headers.get(PREFERS_COLOR_SCHEME)?.to_str().ok()?;
    match hint.trim().trim_matches('"') {
        "dark" => Some(Theme::Dark),
        "light" => Some(Theme::Light),
        _ => None,
    }
}

#[derive(Debug)]
pub struct ThemeState {
    path: PathBuf,
    chosen: Mutex<Option<Theme>>,
}

impl ThemeState {
    pub fn new(path: PathBuf, stored: Option<Theme>) -> Self {
        Self {
            path,
            chosen: Mutex::new(stored),
        }
    }

    pub async fn resolve(&self, system: Option<Theme>) -> Theme {
        self.chosen.lock().await.or(system).unwrap_or_default()
    }

    /// The only way the theme changes.
    pub async fn set(&self, theme: Theme) -> Result<Theme, AppError> {
        let mut chosen = self.chosen.lock().await;
        persist_preferences(&self.path, &Preferences { theme: Some(theme) }).await?;
        *chosen = Some(theme);
        info!(theme = theme.as_str(), "theme changed");
        Ok(theme)
    }

    pub async fn toggle(&self, system: Option<Theme>) -> Result<Theme, AppError> {
        let current = self.resolve(system).await;
        self.set(current.toggled()).await
    }
}
