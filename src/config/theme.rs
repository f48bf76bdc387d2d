use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use super::persistence::{KeyValueStore, StoreResult};

pub const THEME_STORAGE_KEY: &str = "theme";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    #[must_use]
    pub const fn toggle(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    /// Name of the bundled syntect theme used for highlighting.
    #[must_use]
    pub const fn syntect_theme(self) -> &'static str {
        match self {
            Self::Light => "InspiredGitHub",
            Self::Dark => "base16-ocean.dark",
        }
    }

    /// Guesses the terminal background from `COLORFGBG`, falling back to dark.
    #[must_use]
    pub fn detect() -> Self {
        std::env::var("COLORFGBG")
            .ok()
            .and_then(|value| Self::from_colorfgbg(&value))
            .unwrap_or_default()
    }

    /// `COLORFGBG` is `fg;bg` (sometimes `fg;default;bg`); the last field is
    /// the background palette index.
    #[must_use]
    pub fn from_colorfgbg(value: &str) -> Option<Self> {
        let background: u8 = value.rsplit(';').next()?.trim().parse().ok()?;
        Some(if matches!(background, 7 | 9..=15) {
            Self::Light
        } else {
            Self::Dark
        })
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(format!("unknown theme '{other}' (expected light or dark)")),
        }
    }
}

/// The persisted light/dark choice.
#[derive(Clone)]
pub struct ThemePreference {
    store: Arc<dyn KeyValueStore>,
}

impl ThemePreference {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Stored theme, or the detected one when nothing valid is stored.
    #[must_use]
    pub fn load(&self) -> Theme {
        self.load_or(Theme::detect())
    }

    #[must_use]
    pub fn load_or(&self, fallback: Theme) -> Theme {
        match self.store.get(THEME_STORAGE_KEY) {
            Ok(Some(value)) => value.parse().unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Ignoring stored theme");
                fallback
            }),
            Ok(None) => fallback,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read theme preference");
                fallback
            }
        }
    }

    pub fn save(&self, theme: Theme) -> StoreResult<()> {
        self.store.set(THEME_STORAGE_KEY, theme.as_str())
    }
}

impl fmt::Debug for ThemePreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemePreference").finish_non_exhaustive()
    }
}
