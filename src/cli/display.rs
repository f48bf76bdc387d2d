use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::config::{Theme, ViewMode};
use crate::core::chat::{OutputFormat, TurnUpdate};
use crate::svg::{self, highlight};

/// Markup to show for a finished reply, or `None` when it holds no drawing.
#[must_use]
pub fn final_markup(content: &str, format: OutputFormat) -> Option<String> {
    let content = match format.prefix() {
        Some(prefix) => svg::close_fragment(content, prefix),
        None => content.to_string(),
    };
    svg::normalize(&content, false).map(|fragment| fragment.to_markup())
}

/// One-line status while an SVG reply streams in.
#[must_use]
pub fn progress_line(content: &str) -> String {
    format!(
        "  drawing… {} elements, {} bytes",
        svg::element_count(content),
        content.len()
    )
}

/// Writes `markup` to a fresh `svgchat-<timestamp>.svg` under `dir`.
pub fn write_svg(dir: &Path, markup: &str) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S%3f");
    let path = dir.join(format!("svgchat-{stamp}.svg"));
    fs::write(&path, markup)?;
    Ok(path)
}

/// Terminal output for the interactive loop.
#[derive(Debug)]
pub struct Display {
    format: OutputFormat,
    progress_shown: bool,
}

impl Display {
    #[must_use]
    pub const fn new(format: OutputFormat) -> Self {
        Self {
            format,
            progress_shown: false,
        }
    }

    pub fn update(&mut self, update: &TurnUpdate) {
        let mut stdout = io::stdout().lock();
        if self.format.is_forced() {
            let _ = write!(stdout, "\r\x1b[2K{}", progress_line(&update.content));
        } else {
            let _ = write!(stdout, "{}", update.delta);
        }
        let _ = stdout.flush();
        self.progress_shown = true;
    }

    pub fn end_stream(&mut self) {
        if self.progress_shown {
            println!();
            self.progress_shown = false;
        }
    }

    pub fn reply(&mut self, content: &str, view: ViewMode, theme: Theme, output_dir: &Path) {
        self.end_stream();

        let Some(markup) = final_markup(content, self.format) else {
            if self.format.is_forced() && !content.is_empty() {
                println!("{content}");
            }
            return;
        };

        match view {
            ViewMode::Render => match write_svg(output_dir, &markup) {
                Ok(path) => println!("✓ Saved drawing to {}", path.display()),
                Err(e) => self.error(&format!("Failed to write SVG: {e}")),
            },
            ViewMode::Code => println!("{}", highlight::highlight_markup(&markup, theme)),
        }
    }

    pub fn error(&mut self, message: &str) {
        self.end_stream();
        eprintln!("✗ {message}");
    }

    pub fn info(&mut self, message: &str) {
        self.end_stream();
        println!("{message}");
    }
}
