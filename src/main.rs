//! Studio Preview (spv) - CLI entry point

mod commands;

use anyhow::Result;
use clap::Parser;

use commands::preview::PreviewArgs;
use studio_preview::cli::{Cli, Commands, ConfigCommands};

#[cfg(not(tarpaulin_include))]
fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Preview {
            files,
            out,
            concurrency,
            no_worker,
            timeout,
            json,
        } => commands::preview::handle(PreviewArgs {
            files,
            out,
            concurrency,
            no_worker,
            timeout,
            json,
        }),
        Commands::Config(cmd) => match cmd {
            ConfigCommands::Show => commands::config::handle_show(),
            ConfigCommands::Init { force } => commands::config::handle_init(force),
            ConfigCommands::Path => commands::config::handle_path(),
        },
        Commands::Completions { shell } => commands::completions::handle::<Cli>(shell),
    }
}
