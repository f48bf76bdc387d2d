use std::path::PathBuf;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};

use super::display::Display;
use crate::config::{StoreEvent, StoreEventSender, Theme, ViewMode};
use crate::core::{ChatError, ChatSession, Conversation, Result};
use crate::providers::types::ApiKey;

const PROMPT: &str = "❯ ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Clear,
    View(Option<ViewMode>),
    Theme(Option<Theme>),
    Key(String),
    Quit,
    Help,
    Unknown(String),
}

impl ReplCommand {
    /// `None` for ordinary chat input.
    #[must_use]
    pub fn parse(line: &str) -> Option<Self> {
        let rest = line.trim().strip_prefix('/')?;
        let (name, arg) = rest
            .split_once(char::is_whitespace)
            .map_or((rest, ""), |(name, arg)| (name, arg.trim()));

        let command = match name {
            "clear" => Self::Clear,
            "view" if arg.is_empty() => Self::View(None),
            "view" => match arg.parse() {
                Ok(view) => Self::View(Some(view)),
                Err(e) => Self::Unknown(e),
            },
            "theme" if arg.is_empty() => Self::Theme(None),
            "theme" => match arg.parse() {
                Ok(theme) => Self::Theme(Some(theme)),
                Err(e) => Self::Unknown(e),
            },
            "key" => Self::Key(arg.to_string()),
            "quit" | "exit" => Self::Quit,
            "help" => Self::Help,
            other => Self::Unknown(format!("unknown command '/{other}'")),
        };
        Some(command)
    }
}

const HELP: &str = "\
Commands:
  /clear               start a new conversation
  /view [render|code]  switch how drawings are shown
  /theme [light|dark]  switch the highlight theme
  /key <KEY>           set the API key
  /quit                leave
Ctrl-C while a reply streams stops it and keeps what arrived.
Ctrl-C at the prompt quits.";

pub struct Repl {
    session: ChatSession,
    conversation: Conversation,
    display: Display,
    view: ViewMode,
    theme: Theme,
    output_dir: PathBuf,
    events: StoreEventSender,
}

impl Repl {
    #[must_use]
    pub fn new(
        session: ChatSession,
        view: ViewMode,
        theme: Theme,
        output_dir: PathBuf,
        events: StoreEventSender,
    ) -> Self {
        let display = Display::new(session.config().format);
        Self {
            session,
            conversation: Conversation::new(),
            display,
            view,
            theme,
            output_dir,
            events,
        }
    }

    pub async fn run(mut self) -> Result<()> {
        println!(
            "svgchat · {} · view: {} · /help for commands",
            self.session.llm().model(),
            self.view
        );
        if !self.session.has_credential() {
            self.display
                .info("No API key set. Use /key <KEY> or `svgchat key set <KEY>`.");
        }

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            print!("{PROMPT}");
            let _ = std::io::Write::flush(&mut std::io::stdout());

            let line = match read_prompt(&mut lines, tokio::signal::ctrl_c()).await? {
                PromptInput::Line(line) => line,
                PromptInput::Interrupted => {
                    println!();
                    break;
                }
                PromptInput::Closed => break,
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            match ReplCommand::parse(line) {
                Some(ReplCommand::Quit) => break,
                Some(command) => self.handle_command(command),
                None => self.chat(line).await,
            }
        }

        Ok(())
    }

    fn handle_command(&mut self, command: ReplCommand) {
        match command {
            ReplCommand::Clear => {
                self.conversation.reset();
                self.display.info("Conversation cleared.");
            }
            ReplCommand::View(view) => {
                self.view = view.unwrap_or(match self.view {
                    ViewMode::Render => ViewMode::Code,
                    ViewMode::Code => ViewMode::Render,
                });
                self.display.info(&format!("View: {}", self.view));
            }
            ReplCommand::Theme(theme) => {
                self.theme = theme.unwrap_or_else(|| self.theme.toggle());
                self.persist(StoreEvent::ThemeChanged(self.theme));
                self.display.info(&format!("Theme: {}", self.theme));
            }
            ReplCommand::Key(input) => match ApiKey::parse(&input) {
                Some(key) => {
                    self.session.set_credential(Some(key.clone()));
                    self.display
                        .info(&format!("✓ API key set ({})", key.redacted()));
                    self.persist(StoreEvent::CredentialChanged(Some(key)));
                }
                None => self.display.error("Usage: /key <KEY>"),
            },
            ReplCommand::Help => self.display.info(HELP),
            ReplCommand::Unknown(message) => self.display.error(&message),
            ReplCommand::Quit => {}
        }
    }

    async fn chat(&mut self, text: &str) {
        let mut turn = match self.session.send_turn(&mut self.conversation, text).await {
            Ok(turn) => turn,
            Err(e) => {
                report(&mut self.display, &e);
                return;
            }
        };

        loop {
            tokio::select! {
                update = turn.next_update() => match update {
                    Some(Ok(update)) => self.display.update(&update),
                    Some(Err(e)) => {
                        self.display.error(&e.to_string());
                        break;
                    }
                    None => break,
                },
                _ = tokio::signal::ctrl_c() => {
                    self.display.error("Stopped; keeping the partial reply.");
                    break;
                }
            }
        }
        drop(turn);

        if let Some(reply) = self.conversation.last().filter(|m| !m.is_user()) {
            self.display
                .reply(&reply.content, self.view, self.theme, &self.output_dir);
        }
    }

    fn persist(&self, event: StoreEvent) {
        if self.events.send(event).is_err() {
            tracing::warn!("Preference store is gone; change kept for this session only");
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum PromptInput {
    Line(String),
    Interrupted,
    Closed,
}

/// Waits for the next input line or for `interrupt`. Once a Ctrl-C handler
/// has been installed for streaming, SIGINT no longer ends the process, so
/// the prompt has to listen for it too.
async fn read_prompt<R, F>(lines: &mut Lines<R>, interrupt: F) -> std::io::Result<PromptInput>
where
    R: AsyncBufRead + Unpin,
    F: Future<Output = std::io::Result<()>>,
{
    tokio::select! {
        line = lines.next_line() => Ok(line?.map_or(PromptInput::Closed, PromptInput::Line)),
        signal = interrupt => {
            signal?;
            Ok(PromptInput::Interrupted)
        }
    }
}

fn report(display: &mut Display, err: &ChatError) {
    match err {
        ChatError::MissingCredential => {
            display.error(&format!("{err}. Use /key <KEY> to set one."));
        }
        other => display.error(&other.to_string()),
    }
}
