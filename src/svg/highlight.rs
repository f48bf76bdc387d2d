use std::sync::OnceLock;

use syntect::easy::HighlightLines;
use syntect::highlighting::ThemeSet;
use syntect::parsing::SyntaxSet;
use syntect::util::{LinesWithEndings, as_24_bit_terminal_escaped};

use crate::config::Theme;

struct HighlightAssets {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
}

fn assets() -> &'static HighlightAssets {
    static ASSETS: OnceLock<HighlightAssets> = OnceLock::new();
    ASSETS.get_or_init(|| HighlightAssets {
        syntax_set: SyntaxSet::load_defaults_newlines(),
        theme_set: ThemeSet::load_defaults(),
    })
}

/// Renders markup as XML with 24-bit terminal colors.
///
/// Falls back to the plain text when the theme is unavailable or a line
/// fails to highlight.
#[must_use]
pub fn highlight_markup(markup: &str, theme: Theme) -> String {
    let assets = assets();
    let Some(syntect_theme) = assets.theme_set.themes.get(theme.syntect_theme()) else {
        tracing::debug!(theme = theme.syntect_theme(), "Highlight theme missing");
        return markup.to_string();
    };
    let syntax = assets
        .syntax_set
        .find_syntax_by_extension("xml")
        .unwrap_or_else(|| assets.syntax_set.find_syntax_plain_text());

    let mut highlighter = HighlightLines::new(syntax, syntect_theme);
    let mut out = String::with_capacity(markup.len() * 2);
    for line in LinesWithEndings::from(markup) {
        match highlighter.highlight_line(line, &assets.syntax_set) {
            Ok(ranges) => out.push_str(&as_24_bit_terminal_escaped(&ranges, false)),
            Err(e) => {
                tracing::debug!(error = %e, "Highlighting failed");
                return markup.to_string();
            }
        }
    }
    out.push_str("\x1b[0m");
    out
}
