//! `mdqr render`: print sanitized HTML without starting a server.

use crate::cli::RenderArgs;
use crate::error::{Result, ResultExt};
use crate::server::page;
use std::io::Write;

/// Execute the render command.
pub async fn execute(args: RenderArgs) -> Result<()> {
    let html = render_file(&args)?;

    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(html.as_bytes())
        .and_then(|()| stdout.flush())
        .context("Failed to write HTML to stdout")
}

fn render_file(args: &RenderArgs) -> Result<String> {
    let source = std::fs::read_to_string(&args.file).with_path(&args.file)?;
    let body = mdqr_render::render(&source)?;

    if !args.page {
        return Ok(body);
    }

    let title = args
        .file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    // No server behind this page, so the reload script gets no token.
    Ok(page::build_html_document(&title, &body, ""))
}
