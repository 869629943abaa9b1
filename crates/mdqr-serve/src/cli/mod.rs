//! Command-line interface definition for mdqr.
//!
//! # Command Structure
//!
//! - `mdqr serve <FILE>` - Serve a markdown file on the local network
//! - `mdqr render <FILE>` - Print the sanitized HTML for a markdown file

mod commands;

use clap::Parser;

pub use commands::{Command, RenderArgs, ServeArgs};

/// mdqr - Share one markdown document on your local network
#[derive(Parser, Debug)]
#[command(
    name = "mdqr",
    version,
    about = "Share one markdown document on your local network",
    long_about = "mdqr renders a markdown file (with tables, math and diagrams) and serves it\n\
                  to other devices on your network behind a per-session token. Open pages\n\
                  reload when the file changes."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}
