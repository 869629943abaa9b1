use clap::{Args, Subcommand};
use std::net::IpAddr;
use std::path::PathBuf;

/// Available mdqr subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve a markdown file to your local network
    ///
    /// Prints a URL containing a one-time token. Anyone on the network with
    /// the URL can view the rendered document; open pages reload when the
    /// file is saved. Runs until Ctrl+C.
    Serve(ServeArgs),

    /// Render a markdown file to sanitized HTML on stdout
    Render(RenderArgs),
}

/// Arguments for the serve command
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Markdown file to serve (must end in .md)
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// First port to try; the next nine are tried if it is taken
    ///
    /// Defaults to the configured port (13579).
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Address to listen on
    ///
    /// Defaults to 0.0.0.0 (all interfaces).
    #[arg(long, value_name = "IP")]
    pub host: Option<IpAddr>,

    /// Path to a config file (defaults to ./mdqr.config.json if present)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Arguments for the render command
#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Markdown file to render
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Wrap the output in the full page served by `mdqr serve`
    #[arg(long)]
    pub page: bool,
}
