//! CLI definitions for spv
//!
//! Kept apart from main.rs so xtask can render man pages from the same
//! definitions.

use std::path::PathBuf;

use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::{Parser, Subcommand};
use clap_complete::Shell as CompletionShell;

/// Version string; dev builds carry the commit they were built from
#[cfg(not(feature = "release"))]
pub const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("VERGEN_GIT_SHA"), ")");
#[cfg(feature = "release")]
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build clap styles.
///
/// - Green: headers, usage, command names
/// - White: descriptions, placeholders (light gray on dark terminals)
pub fn build_cli_styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Green.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::White.on_default())
        .valid(AnsiColor::White.on_default())
        .invalid(AnsiColor::Red.on_default())
        .error(AnsiColor::Red.on_default() | Effects::BOLD)
}

#[derive(Parser)]
#[command(name = "spv")]
#[command(about = "[ Studio Preview ] - progressive previews for photo-session uploads")]
#[command(
    long_about = "Studio Preview (spv) - build upload previews for photo-session images.

Each image gets a blurred tiny placeholder right away, then a downscaled
full preview produced in the background with a bounded number of jobs
running at once. Images that cannot be processed fall back to the original.

QUICK START:
    spv preview shot-01.jpg shot-02.png     Preview two images
    spv preview *.jpg --out previews/       Write data URLs to previews/
    spv config show                         Show the active configuration"
)]
#[command(version = VERSION)]
#[command(styles = build_cli_styles())]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate previews for image files
    #[command(long_about = "Generate tiny and full previews for image files.

Files are treated as one upload session. Non-image files are skipped.
The full preview is at most 800px on its longer edge by default; see
`spv config show` for the active settings.

EXAMPLES:
    spv preview a.jpg b.png                 Print a summary table
    spv preview a.jpg --json                Print records as JSON
    spv preview *.jpg --concurrency 1       One downscale at a time
    spv preview *.jpg --no-worker           Skip the background worker")]
    Preview {
        /// Image files to preview
        #[arg(required = true, help = "Image files to preview")]
        files: Vec<PathBuf>,
        /// Write each preview data URL to <DIR>/<file name>.txt
        #[arg(long, short, value_name = "DIR", help = "Directory for preview data URLs")]
        out: Option<PathBuf>,
        /// Maximum downscale jobs running at once (overrides config)
        #[arg(long, short = 'j', help = "Maximum concurrent downscale jobs")]
        concurrency: Option<usize>,
        /// Downscale in queue slots only
        #[arg(long, help = "Do not use the background worker")]
        no_worker: bool,
        /// Give up waiting after this many seconds
        #[arg(long, default_value_t = 60, help = "Seconds to wait for previews")]
        timeout: u64,
        /// Print JSON instead of a table
        #[arg(long, help = "Print file records as JSON")]
        json: bool,
    },

    /// Configuration management
    #[command(
        subcommand,
        long_about = "View and create the spv configuration file.

Configuration is stored in ~/.config/studio-preview/config.toml.

EXAMPLES:
    spv config show          Display current configuration
    spv config init          Write the default configuration
    spv config path          Print the config file location"
    )]
    Config(ConfigCommands),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: CompletionShell,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration as TOML
    Show,
    /// Write the default configuration file if none exists
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the configuration file path
    Path,
}
