//! mdqr CLI entry point: argument parsing, logging setup and command dispatch.

use clap::Parser;
use mdqr_serve::{cli, commands, error, logger, ui};
use miette::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    logger::init_logger(args.verbose, args.quiet, args.no_color);
    ui::init_colors(args.no_color);

    let result = match args.command {
        cli::Command::Serve(serve_args) => commands::serve_execute(serve_args).await,
        cli::Command::Render(render_args) => commands::render_execute(render_args).await,
    };

    result.map_err(error::serve_error_to_miette)
}
