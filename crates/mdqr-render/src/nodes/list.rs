//! List node conversions (ordered, unordered, task lists)

use markdown::mdast::{List, ListItem, Node};

use super::{RenderContext, children_to_html, node_to_html};

/// Convert list node to HTML
pub fn list_to_html<'a>(list: &'a List, ctx: &mut RenderContext<'a>, out: &mut String) {
    // A list is loose when any item is separated by, or contains, blank lines
    let tight = !list.spread
        && list
            .children
            .iter()
            .all(|child| !matches!(child, Node::ListItem(item) if item.spread));

    let tag = if list.ordered { "ol" } else { "ul" };
    match list.start {
        Some(start) if list.ordered && start != 1 => {
            out.push_str(&format!("<ol start=\"{start}\">\n"));
        }
        _ => out.push_str(&format!("<{tag}>\n")),
    }

    for child in &list.children {
        match child {
            Node::ListItem(item) => list_item_to_html(item, tight, ctx, out),
            other => node_to_html(other, ctx, out),
        }
    }

    out.push_str(&format!("</{tag}>\n"));
}

/// Convert list item node to HTML
///
/// In a tight list, paragraphs render without `<p>` wrappers.
pub fn list_item_to_html<'a>(
    item: &'a ListItem,
    tight: bool,
    ctx: &mut RenderContext<'a>,
    out: &mut String,
) {
    out.push_str("<li>");

    if let Some(checked) = item.checked {
        out.push_str(if checked {
            r#"<input type="checkbox" checked="" disabled=""> "#
        } else {
            r#"<input type="checkbox" disabled=""> "#
        });
    }

    for child in &item.children {
        match child {
            Node::Paragraph(paragraph) if tight => {
                children_to_html(&paragraph.children, ctx, out);
            }
            other => {
                if !out.ends_with('\n') {
                    out.push('\n');
                }
                node_to_html(other, ctx, out);
            }
        }
    }

    out.push_str("</li>\n");
}

#[cfg(test)]
mod tests {
    use crate::{RenderOptions, markdown_to_html};

    fn html(source: &str) -> String {
        markdown_to_html(source, &RenderOptions::default()).unwrap()
    }

    #[test]
    fn test_tight_unordered_list() {
        assert_eq!(html("- a\n- b"), "<ul>\n<li>a</li>\n<li>b</li>\n</ul>\n");
    }

    #[test]
    fn test_loose_list_keeps_paragraphs() {
        assert_eq!(
            html("- a\n\n- b"),
            "<ul>\n<li>\n<p>a</p>\n</li>\n<li>\n<p>b</p>\n</li>\n</ul>\n"
        );
    }

    #[test]
    fn test_ordered_list_start() {
        assert_eq!(html("1. a"), "<ol>\n<li>a</li>\n</ol>\n");
        assert_eq!(html("3. a"), "<ol start=\"3\">\n<li>a</li>\n</ol>\n");
    }

    #[test]
    fn test_task_list() {
        let out = html("- [x] done\n- [ ] todo");
        assert!(out.contains(r#"<li><input type="checkbox" checked="" disabled=""> done</li>"#));
        assert!(out.contains(r#"<li><input type="checkbox" disabled=""> todo</li>"#));
    }

    #[test]
    fn test_nested_list() {
        let out = html("- a\n  - b");
        assert_eq!(out, "<ul>\n<li>a\n<ul>\n<li>b</li>\n</ul>\n</li>\n</ul>\n");
    }
}
