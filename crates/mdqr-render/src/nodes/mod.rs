//! mdast to HTML conversion
//!
//! [`mdast_to_html`] walks the tree produced by the `markdown` crate and writes
//! HTML into a single buffer. Each node family lives in its own submodule;
//! [`node_to_html`] is the dispatcher they all recurse through.

mod block;
mod code;
mod footnote;
mod inline;
mod list;
mod table;

use std::collections::HashMap;

use markdown::mdast::{Definition, FootnoteDefinition, Node};

use crate::{RenderError, RenderOptions};

pub use block::*;
pub use code::*;
pub use footnote::*;
pub use inline::*;
pub use list::*;
pub use table::*;

/// Deepest tree [`mdast_to_html`] will walk. The walk recurses once per
/// level, so anything deeper is rejected before it starts.
pub const MAX_NESTING_DEPTH: usize = 128;

/// State shared across one document conversion.
pub struct RenderContext<'a> {
    /// Turn soft line endings into `<br>`.
    pub hard_breaks: bool,
    definitions: HashMap<&'a str, &'a Definition>,
    footnote_definitions: HashMap<&'a str, &'a FootnoteDefinition>,
    /// Footnote identifiers in order of first reference.
    footnote_order: Vec<&'a str>,
}

impl<'a> RenderContext<'a> {
    pub fn new(options: &RenderOptions) -> Self {
        Self {
            hard_breaks: options.hard_breaks,
            definitions: HashMap::new(),
            footnote_definitions: HashMap::new(),
            footnote_order: Vec::new(),
        }
    }

    /// Record link and footnote definitions anywhere in the tree so that
    /// references resolve regardless of where the definition appears.
    pub fn collect_definitions(&mut self, nodes: &'a [Node]) {
        for node in nodes {
            match node {
                Node::Definition(definition) => {
                    // First definition wins
                    self.definitions
                        .entry(definition.identifier.as_str())
                        .or_insert(definition);
                }
                Node::FootnoteDefinition(definition) => {
                    self.footnote_definitions
                        .entry(definition.identifier.as_str())
                        .or_insert(definition);
                }
                _ => {}
            }
            if let Some(children) = node.children() {
                self.collect_definitions(children);
            }
        }
    }

    pub fn definition(&self, identifier: &str) -> Option<&'a Definition> {
        self.definitions.get(identifier).copied()
    }

    /// Number a footnote reference.
    ///
    /// Returns `None` when no definition exists, otherwise the 1-based number
    /// and whether this is the first reference to it.
    pub fn footnote_number(&mut self, identifier: &'a str) -> Option<(usize, bool)> {
        let (&key, _) = self.footnote_definitions.get_key_value(identifier)?;
        match self.footnote_order.iter().position(|id| *id == key) {
            Some(index) => Some((index + 1, false)),
            None => {
                self.footnote_order.push(key);
                Some((self.footnote_order.len(), true))
            }
        }
    }

    fn footnote_at(&self, index: usize) -> Option<&'a FootnoteDefinition> {
        let identifier = self.footnote_order.get(index)?;
        self.footnote_definitions.get(identifier).copied()
    }
}

/// Convert a parsed markdown tree to (unsanitized) HTML.
pub fn mdast_to_html(root: &Node, options: &RenderOptions) -> Result<String, RenderError> {
    let Node::Root(root) = root else {
        return Err(RenderError::UnexpectedTree(
            "expected a root node".to_string(),
        ));
    };

    let depth = nesting_depth(&root.children);
    if depth > MAX_NESTING_DEPTH {
        return Err(RenderError::TooDeep {
            depth,
            limit: MAX_NESTING_DEPTH,
        });
    }

    let mut ctx = RenderContext::new(options);
    ctx.collect_definitions(&root.children);

    let mut out = String::new();
    children_to_html(&root.children, &mut ctx, &mut out);
    footnote::footnotes_section(&mut ctx, &mut out);

    Ok(out)
}

/// Depth of the deepest node below `nodes`, counting `nodes` as level 1.
fn nesting_depth(nodes: &[Node]) -> usize {
    let mut deepest = 0;
    let mut stack: Vec<(&Node, usize)> = nodes.iter().map(|node| (node, 1)).collect();

    while let Some((node, depth)) = stack.pop() {
        deepest = deepest.max(depth);
        if let Some(children) = node.children() {
            stack.extend(children.iter().map(|child| (child, depth + 1)));
        }
    }

    deepest
}

/// Drop a tree without recursing.
///
/// The derived drop glue recurses once per level, which overflows a worker
/// stack on the deep trees [`mdast_to_html`] refuses to walk.
pub fn release_tree(root: Node) {
    let mut stack = vec![root];
    while let Some(mut node) = stack.pop() {
        if let Some(children) = node.children_mut() {
            stack.append(children);
        }
    }
}

/// Convert a single mdast node to HTML
///
/// Central dispatcher that routes nodes to specialized handlers
pub fn node_to_html<'a>(node: &'a Node, ctx: &mut RenderContext<'a>, out: &mut String) {
    match node {
        // Block elements
        Node::Heading(heading) => block::heading_to_html(heading, ctx, out),
        Node::Paragraph(paragraph) => block::paragraph_to_html(paragraph, ctx, out),
        Node::Blockquote(quote) => block::blockquote_to_html(quote, ctx, out),
        Node::ThematicBreak(_) => out.push_str("<hr>\n"),
        Node::Html(html) => out.push_str(&html.value),

        // Code
        Node::Code(code) => code::code_block_to_html(code, out),
        Node::InlineCode(code) => code::inline_code_to_html(code, out),

        // Math
        Node::Math(math) => {
            out.push_str(&crate::math::render_display(&math.value));
            out.push('\n');
        }
        Node::InlineMath(math) => out.push_str(&crate::math::render_inline(&math.value)),

        // Lists
        Node::List(list) => list::list_to_html(list, ctx, out),
        Node::ListItem(item) => list::list_item_to_html(item, false, ctx, out),

        // Tables
        Node::Table(table) => table::table_to_html(table, ctx, out),

        // Inline elements
        Node::Text(text) => inline::text_to_html(&text.value, ctx, out),
        Node::Emphasis(emphasis) => inline::wrap_children("em", &emphasis.children, ctx, out),
        Node::Strong(strong) => inline::wrap_children("strong", &strong.children, ctx, out),
        Node::Delete(delete) => inline::wrap_children("del", &delete.children, ctx, out),
        Node::Break(_) => out.push_str("<br>\n"),
        Node::Link(link) => inline::link_to_html(link, ctx, out),
        Node::Image(image) => inline::image_to_html(image, out),
        Node::LinkReference(reference) => inline::link_reference_to_html(reference, ctx, out),
        Node::ImageReference(reference) => inline::image_reference_to_html(reference, ctx, out),

        // Footnotes
        Node::FootnoteReference(reference) => {
            footnote::footnote_reference_to_html(reference, ctx, out)
        }

        // Nested roots render their children
        Node::Root(root) => children_to_html(&root.children, ctx, out),

        // Definitions render where they are referenced; frontmatter and
        // anything else never reaches the output
        _ => {}
    }
}

/// Convert a list of sibling nodes
pub fn children_to_html<'a>(children: &'a [Node], ctx: &mut RenderContext<'a>, out: &mut String) {
    for child in children {
        node_to_html(child, ctx, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown_to_html;

    fn html(source: &str) -> String {
        markdown_to_html(source, &RenderOptions::default()).unwrap()
    }

    #[test]
    fn test_paragraph_and_heading() {
        assert_eq!(html("# Title\n\nBody"), "<h1>Title</h1>\n<p>Body</p>\n");
    }

    #[test]
    fn test_soft_break_becomes_br() {
        assert_eq!(html("one\ntwo"), "<p>one<br>\ntwo</p>\n");
    }

    #[test]
    fn test_soft_break_kept_without_hard_breaks() {
        let options = RenderOptions::builder().hard_breaks(false).build();
        let out = markdown_to_html("one\ntwo", &options).unwrap();
        assert_eq!(out, "<p>one\ntwo</p>\n");
    }

    #[test]
    fn test_inline_math_is_not_emphasis() {
        let out = html("$a_b$ and $c_d$");
        assert!(out.contains(r#"<span class="katex">"#));
        assert!(!out.contains("<em>"));
    }

    #[test]
    fn test_block_math() {
        let out = html("$$\nx^2\n$$");
        assert!(out.contains("katex-display"));
        assert!(out.contains("x^2</annotation>"));
    }

    #[test]
    fn test_root_required() {
        let node = Node::Text(markdown::mdast::Text {
            value: "x".into(),
            position: None,
        });
        let err = mdast_to_html(&node, &RenderOptions::default()).unwrap_err();
        assert!(matches!(err, RenderError::UnexpectedTree(_)));
    }

    #[test]
    fn test_nesting_depth_counts_levels() {
        let tree = markdown::to_mdast("> > quoted", &markdown::ParseOptions::default()).unwrap();
        let Node::Root(root) = &tree else {
            panic!("expected root");
        };
        // blockquote > blockquote > paragraph > text
        assert_eq!(nesting_depth(&root.children), 4);
    }

    #[test]
    fn test_too_deep_tree_is_rejected() {
        let source = format!("{} a", ">".repeat(MAX_NESTING_DEPTH + 1));
        let err = markdown_to_html(&source, &RenderOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            RenderError::TooDeep { limit: MAX_NESTING_DEPTH, .. }
        ));
    }

    #[test]
    fn test_depth_at_limit_renders() {
        // Each `>` adds a blockquote; the paragraph and text add two more levels.
        let source = format!("{} a", ">".repeat(MAX_NESTING_DEPTH - 2));
        let out = html(&source);
        assert!(out.contains("<p>a</p>"));
    }

    #[test]
    fn test_thematic_break() {
        assert_eq!(html("---"), "<hr>\n");
    }
}
