mod args;
mod commands;
mod display;
mod repl;

pub use args::{Cli, Commands, ConfigSubcommands, KeySubcommands, ThemeChoice};
pub use commands::run;
pub use display::{final_markup, write_svg};
pub use repl::ReplCommand;
