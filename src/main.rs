use clap::Parser;

use svgchat::cli::{self, Cli};
use svgchat::core::Result;
use svgchat::logging;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = logging::init(cli.verbose);

    cli::run(cli).await
}
