//! xtask - Build tasks for spv
//!
//! Run with: cargo xtask <command>
//!
//! Commands:
//! - gen-man: Generate man pages from the CLI definitions

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Command, CommandFactory, Parser, Subcommand};
use clap_mangen::Man;

use studio_preview::cli::Cli;

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Build tasks for spv")]
struct Xtask {
    #[command(subcommand)]
    command: XtaskCommand,
}

#[derive(Subcommand)]
enum XtaskCommand {
    /// Generate man pages from CLI definitions
    #[command(name = "gen-man")]
    GenMan {
        /// Output directory (default: docs/man)
        #[arg(long, short, default_value = "docs/man")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    let args = Xtask::parse();

    match args.command {
        XtaskCommand::GenMan { output } => generate_man_pages(&output),
    }
}

/// Generate man pages using clap_mangen
fn generate_man_pages(man_dir: &Path) -> Result<()> {
    fs::create_dir_all(man_dir).context("Failed to create man directory")?;

    let cmd = Cli::command();
    render(&cmd, &man_dir.join("spv.1"))?;

    for subcommand in cmd.get_subcommands() {
        if subcommand.is_hide_set() {
            continue;
        }
        let name = subcommand.get_name();
        render(subcommand, &man_dir.join(format!("spv-{}.1", name)))?;

        for nested in subcommand.get_subcommands() {
            if nested.is_hide_set() {
                continue;
            }
            let nested_name = nested.get_name();
            render(
                nested,
                &man_dir.join(format!("spv-{}-{}.1", name, nested_name)),
            )?;
        }
    }

    println!("Man pages generated in {}", man_dir.display());
    Ok(())
}

fn render(cmd: &Command, path: &Path) -> Result<()> {
    let mut buffer = Vec::new();
    Man::new(cmd.clone()).render(&mut buffer)?;
    fs::write(path, buffer).with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Generated: {}", path.display());
    Ok(())
}
