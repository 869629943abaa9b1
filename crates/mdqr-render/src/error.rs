//! Render errors

use thiserror::Error;

/// Errors produced while turning markdown into HTML.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Source exceeds [`crate::MAX_SOURCE_SIZE`].
    #[error("Markdown source is {size} bytes, which exceeds the {limit} byte limit")]
    TooLarge { size: usize, limit: usize },

    /// The markdown parser rejected the source.
    #[error("Failed to parse markdown: {0}")]
    Parse(String),

    /// The tree nests deeper than [`crate::nodes::MAX_NESTING_DEPTH`].
    #[error("Markdown nests {depth} levels deep, which exceeds the {limit} level limit")]
    TooDeep { depth: usize, limit: usize },

    /// The parser produced a tree without a root node.
    #[error("Unexpected markdown tree: {0}")]
    UnexpectedTree(String),
}
