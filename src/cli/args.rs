//! CLI argument definitions.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::config::{AppConfig, ViewMode};

#[derive(Parser, Debug)]
#[command(name = "svgchat")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Model to use (e.g., deepseek-chat)
    #[arg(short, long, global = true)]
    pub model: Option<String>,

    /// API root, requests go to <BASE_URL>/chat/completions
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Plain chat: do not steer replies into SVG
    #[arg(long, global = true)]
    pub no_svg: bool,

    /// How finished drawings are shown
    #[arg(long, value_enum, global = true)]
    pub view: Option<ViewMode>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Layers command-line flags over the loaded configuration.
    #[must_use]
    pub fn apply_to(&self, mut config: AppConfig) -> AppConfig {
        if let Some(model) = &self.model {
            config.model = Some(model.clone());
        }
        if let Some(base_url) = &self.base_url {
            config.base_url = Some(base_url.clone());
        }
        if self.no_svg {
            config.force_svg = false;
        }
        if let Some(view) = self.view {
            config.view = view;
        }
        config
    }
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Interactive chat (default)
    Chat,
    /// Manage the stored API key
    Key {
        #[command(subcommand)]
        command: KeySubcommands,
    },
    /// Show or change the color theme
    Theme {
        #[arg(value_enum)]
        choice: Option<ThemeChoice>,
    },
    /// Print the normalized SVG found in a file
    Normalize { file: PathBuf },
    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigSubcommands,
    },
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum KeySubcommands {
    /// Store an API key
    Set { key: String },
    /// Remove the stored API key
    Clear,
    /// Show the active API key, redacted
    Show,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ThemeChoice {
    Light,
    Dark,
    Toggle,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum ConfigSubcommands {
    /// Initialize a new config file
    Init,
    /// Print config file location
    Where,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_chat() {
        let cli = Cli::try_parse_from(["svgchat"]).expect("parse");
        assert!(cli.command.is_none());
        assert!(!cli.no_svg);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["svgchat", "chat", "--no-svg", "--view", "code", "-m", "x"])
            .expect("parse");
        assert_eq!(cli.command, Some(Commands::Chat));

        let config = cli.apply_to(AppConfig::default());
        assert!(!config.force_svg);
        assert_eq!(config.view, ViewMode::Code);
        assert_eq!(config.model.as_deref(), Some("x"));
    }

    #[test]
    fn test_flags_keep_unset_config_values() {
        let cli = Cli::try_parse_from(["svgchat"]).expect("parse");
        let loaded = AppConfig {
            base_url: Some("http://localhost:9".into()),
            view: ViewMode::Code,
            ..AppConfig::default()
        };
        assert_eq!(cli.apply_to(loaded.clone()), loaded);
    }

    #[test]
    fn test_key_and_theme_subcommands() {
        let cli = Cli::try_parse_from(["svgchat", "key", "set", "sk-1"]).expect("parse");
        assert_eq!(
            cli.command,
            Some(Commands::Key {
                command: KeySubcommands::Set { key: "sk-1".into() }
            })
        );

        let cli = Cli::try_parse_from(["svgchat", "theme", "toggle"]).expect("parse");
        assert_eq!(
            cli.command,
            Some(Commands::Theme {
                choice: Some(ThemeChoice::Toggle)
            })
        );

        assert!(Cli::try_parse_from(["svgchat", "view", "sepia"]).is_err());
    }
}
