//! # mdqr-render
//!
//! Markdown to sanitized HTML for the mdqr document server.
//!
//! The pipeline has two stages. [`markdown_to_html`] parses the source with the
//! `markdown` crate (GitHub-flavored extensions and math constructs enabled) and
//! walks the resulting mdast into HTML, rendering math server-side as MathML.
//! [`sanitize`] then runs the result through a declarative allowlist so that
//! only prose markup, math markup and diagram code fences survive.
//!
//! ```
//! let html = mdqr_render::render("Inline $a_b$ and **bold**").unwrap();
//! assert!(html.contains("katex"));
//! assert!(!html.contains("<em>"));
//! ```

pub mod error;
pub mod escape;
pub mod math;
pub mod nodes;
pub mod sanitize;

pub use error::RenderError;
pub use escape::escape_html;
pub use sanitize::sanitize;

use bon::Builder;
use markdown::ParseOptions;

/// Maximum accepted source size (10 MiB).
pub const MAX_SOURCE_SIZE: usize = 10 * 1024 * 1024;

/// Options for rendering a document.
#[derive(Debug, Clone, Builder)]
pub struct RenderOptions {
    /// Enable GitHub Flavored Markdown (tables, strikethrough, task lists,
    /// autolink literals, footnotes).
    #[builder(default = true)]
    pub gfm: bool,

    /// Enable math support (inline `$...$` and block `$$...$$`).
    #[builder(default = true)]
    pub math: bool,

    /// Render a single newline inside a paragraph as `<br>`.
    #[builder(default = true)]
    pub hard_breaks: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Render markdown to sanitized HTML with the default options.
pub fn render(source: &str) -> Result<String, RenderError> {
    render_with_options(source, &RenderOptions::default())
}

/// Render markdown to sanitized HTML.
pub fn render_with_options(source: &str, options: &RenderOptions) -> Result<String, RenderError> {
    let html = markdown_to_html(source, options)?;
    let clean = sanitize(&html);
    tracing::debug!(
        source_len = source.len(),
        raw_len = html.len(),
        clean_len = clean.len(),
        "rendered markdown"
    );
    Ok(clean)
}

/// Convert markdown to HTML without sanitizing.
///
/// Raw HTML embedded in the source is passed through untouched, so the output of
/// this function must never be served directly.
pub fn markdown_to_html(source: &str, options: &RenderOptions) -> Result<String, RenderError> {
    if source.len() > MAX_SOURCE_SIZE {
        return Err(RenderError::TooLarge {
            size: source.len(),
            limit: MAX_SOURCE_SIZE,
        });
    }

    let parse_options = parse_options(options);
    let tree = markdown::to_mdast(source, &parse_options)
        .map_err(|message| RenderError::Parse(message.to_string()))?;

    let html = nodes::mdast_to_html(&tree, options);
    nodes::release_tree(tree);
    html
}

fn parse_options(options: &RenderOptions) -> ParseOptions {
    let mut parse_options = if options.gfm {
        ParseOptions::gfm()
    } else {
        ParseOptions::default()
    };

    if options.math {
        parse_options.constructs.math_text = true;
        parse_options.constructs.math_flow = true;
    }

    parse_options
}
