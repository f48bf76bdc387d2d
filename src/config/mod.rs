pub mod credentials;
pub mod event_handler;
pub mod persistence;
pub mod theme;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::{fmt, fs, io};

use crate::core::chat::{ChatConfig, OutputFormat};
use crate::core::types::CompletionRequest;
use crate::providers::deepseek::DeepSeekConfig;

pub use credentials::Credentials;
pub use event_handler::{StoreEvent, StoreEventHandler, StoreEventSender};
pub use persistence::{FileStore, KeyValueStore, MemoryStore, StoreError, StoreResult};
pub use theme::{Theme, ThemePreference};

const APP_DIR: &str = "svgchat";
const ENV_PREFIX: &str = "SVGCHAT";

pub fn get_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME")
            .map(PathBuf::from)
            .map(|h| h.join("Library/Application Support").join(APP_DIR))
    }

    #[cfg(target_os = "linux")]
    {
        std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))
            .map(|c| c.join(APP_DIR))
    }

    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA")
            .map(PathBuf::from)
            .map(|a| a.join(APP_DIR))
    }

    #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
    {
        std::env::var_os("HOME")
            .map(PathBuf::from)
            .map(|h| h.join(".config").join(APP_DIR))
    }
}

/// How a finished SVG reply is shown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// Written to an `.svg` file.
    #[default]
    Render,
    /// Printed as highlighted markup.
    Code,
}

impl ViewMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Render => "render",
            Self::Code => "code",
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "render" => Ok(Self::Render),
            "code" => Ok(Self::Code),
            other => Err(format!("unknown view '{other}' (expected render or code)")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub temperature: Option<f32>,
    pub force_svg: bool,
    pub view: ViewMode,
    pub output_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model: None,
            base_url: None,
            temperature: None,
            force_svg: true,
            view: ViewMode::Render,
            output_dir: None,
        }
    }
}

impl AppConfig {
    #[must_use]
    pub fn load() -> Self {
        Self::load_from(Self::get_config_path().as_deref()).unwrap_or_else(|e| {
            eprintln!("Warning: Failed to load config: {e}");
            Self::default()
        })
    }

    /// Reads the optional file at `path`, then `SVGCHAT_*` variables on top.
    pub fn load_from(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(false));
        }

        builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true));

        builder.build().and_then(Config::try_deserialize)
    }

    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        get_config_dir().map(|dir| dir.join("config.toml"))
    }

    #[must_use]
    pub fn get_store_path() -> Option<PathBuf> {
        get_config_dir().map(|dir| dir.join("store.toml"))
    }

    pub fn init_default() -> Result<PathBuf, io::Error> {
        let path = Self::get_config_path().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                "Could not determine config directory",
            )
        })?;
        Self::write_template(&path)?;
        Ok(path)
    }

    pub fn write_template(path: &Path) -> Result<(), io::Error> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        if path.exists() {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("Config file already exists at {}", path.display()),
            ));
        }

        fs::write(path, include_str!("config.template.toml"))
    }

    #[must_use]
    pub fn output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }

    #[must_use]
    pub fn chat_config(&self) -> ChatConfig {
        ChatConfig {
            format: if self.force_svg {
                OutputFormat::Svg
            } else {
                OutputFormat::Free
            },
            temperature: self
                .temperature
                .unwrap_or(CompletionRequest::DEFAULT_TEMPERATURE),
        }
    }

    #[must_use]
    pub fn deepseek_config(&self) -> DeepSeekConfig {
        let mut config = DeepSeekConfig::default();
        if let Some(base_url) = &self.base_url {
            config = config.with_base_url(base_url.clone());
        }
        if let Some(model) = &self.model {
            config = config.with_default_model(model.clone());
        }
        config
    }
}
