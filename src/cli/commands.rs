use std::fs;
use std::path::Path;
use std::sync::Arc;

use super::args::{Cli, Commands, ConfigSubcommands, KeySubcommands, ThemeChoice};
use super::repl::Repl;
use crate::config::credentials::KeySource;
use crate::config::{
    AppConfig, Credentials, FileStore, KeyValueStore, MemoryStore, StoreEventHandler, Theme,
    ThemePreference, ViewMode,
};
use crate::core::{ChatError, ChatSession, Result};
use crate::providers::DeepSeekProvider;
use crate::providers::deepseek::API_KEY_ENV_VAR;
use crate::providers::types::ApiKey;
use crate::svg::{self, highlight};

pub async fn run(cli: Cli) -> Result<()> {
    let config = cli.apply_to(AppConfig::load());

    match &cli.command {
        Some(Commands::Config { command }) => {
            config_command(command);
            Ok(())
        }
        Some(Commands::Key { command }) => key_command(command, &open_store()?),
        Some(Commands::Theme { choice }) => theme_command(*choice, &open_store()?),
        Some(Commands::Normalize { file }) => normalize_command(file, &config),
        Some(Commands::Chat) | None => chat(config).await,
    }
}

fn config_command(command: &ConfigSubcommands) {
    match command {
        ConfigSubcommands::Init => match AppConfig::init_default() {
            Ok(path) => {
                println!("✓ Created config file at {}", path.display());
            }
            Err(e) => {
                eprintln!("✗ Failed to create config: {e}");
            }
        },
        ConfigSubcommands::Where => match AppConfig::get_config_path() {
            Some(path) => println!("{}", path.display()),
            None => eprintln!("✗ Could not determine config path"),
        },
    }
}

fn open_store() -> Result<Arc<dyn KeyValueStore>> {
    Ok(Arc::new(FileStore::with_default_path()?))
}

/// The file store, or a session-only store when no config directory exists.
fn open_store_or_memory() -> Arc<dyn KeyValueStore> {
    open_store().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Using an in-memory store; preferences will not be saved");
        Arc::new(MemoryStore::new())
    })
}

fn key_command(command: &KeySubcommands, store: &Arc<dyn KeyValueStore>) -> Result<()> {
    let credentials = Credentials::new(Arc::clone(store));
    match command {
        KeySubcommands::Set { key } => {
            let key = ApiKey::parse(key)
                .ok_or_else(|| ChatError::Config("API key must not be blank".to_string()))?;
            credentials.save(&key)?;
            println!("✓ API key saved ({})", key.redacted());
        }
        KeySubcommands::Clear => {
            credentials.clear()?;
            println!("✓ API key removed");
        }
        KeySubcommands::Show => match credentials.load()? {
            Some((key, KeySource::Environment)) => {
                println!("{} (from {API_KEY_ENV_VAR})", key.redacted());
            }
            Some((key, KeySource::Store)) => println!("{}", key.redacted()),
            None => println!("No API key set"),
        },
    }
    Ok(())
}

fn theme_command(choice: Option<ThemeChoice>, store: &Arc<dyn KeyValueStore>) -> Result<()> {
    let preference = ThemePreference::new(Arc::clone(store));
    let current = preference.load();

    let theme = match choice {
        None => {
            println!("{current}");
            return Ok(());
        }
        Some(ThemeChoice::Light) => Theme::Light,
        Some(ThemeChoice::Dark) => Theme::Dark,
        Some(ThemeChoice::Toggle) => current.toggle(),
    };

    preference.save(theme)?;
    println!("✓ Theme set to {theme}");
    Ok(())
}

fn normalize_command(file: &Path, config: &AppConfig) -> Result<()> {
    let content = fs::read_to_string(file)?;
    let closed = svg::close_fragment(&content, svg::ROOT_PREFIX);
    let fragment = svg::normalize(&closed, false).ok_or_else(|| {
        ChatError::Config(format!("No SVG markup found in {}", file.display()))
    })?;

    let markup = fragment.to_markup();
    match config.view {
        ViewMode::Code => {
            let theme = ThemePreference::new(open_store_or_memory()).load();
            println!("{}", highlight::highlight_markup(&markup, theme));
        }
        ViewMode::Render => println!("{markup}"),
    }
    Ok(())
}

async fn chat(config: AppConfig) -> Result<()> {
    let store = open_store_or_memory();
    let credentials = Credentials::new(Arc::clone(&store));
    let preference = ThemePreference::new(Arc::clone(&store));
    let theme = preference.load();

    let provider = DeepSeekProvider::new(config.deepseek_config())?;
    let mut session = ChatSession::with_config(Arc::new(provider), config.chat_config());
    match credentials.load() {
        Ok(key) => session.set_credential(key.map(|(key, _)| key)),
        Err(e) => tracing::warn!(error = %e, "Failed to read stored API key"),
    }

    let (handler, events) = StoreEventHandler::new(credentials, preference);
    let persist = tokio::spawn(handler.run());

    let repl = Repl::new(session, config.view, theme, config.output_dir(), events);
    let result = repl.run().await;

    // The sender was dropped with the loop; wait for pending writes.
    let _ = persist.await;
    result
}
