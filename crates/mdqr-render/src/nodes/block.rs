//! Block-level node conversions (headings, paragraphs, blockquotes)

use markdown::mdast::{Blockquote, Heading, Paragraph};

use super::{RenderContext, children_to_html};

/// Convert heading node to HTML
pub fn heading_to_html<'a>(heading: &'a Heading, ctx: &mut RenderContext<'a>, out: &mut String) {
    let level = heading.depth.clamp(1, 6);
    out.push_str(&format!("<h{level}>"));
    children_to_html(&heading.children, ctx, out);
    out.push_str(&format!("</h{level}>\n"));
}

/// Convert paragraph node to HTML
pub fn paragraph_to_html<'a>(
    paragraph: &'a Paragraph,
    ctx: &mut RenderContext<'a>,
    out: &mut String,
) {
    out.push_str("<p>");
    children_to_html(&paragraph.children, ctx, out);
    out.push_str("</p>\n");
}

/// Convert blockquote node to HTML
pub fn blockquote_to_html<'a>(
    quote: &'a Blockquote,
    ctx: &mut RenderContext<'a>,
    out: &mut String,
) {
    out.push_str("<blockquote>\n");
    children_to_html(&quote.children, ctx, out);
    out.push_str("</blockquote>\n");
}

#[cfg(test)]
mod tests {
    use crate::{RenderOptions, markdown_to_html};

    fn html(source: &str) -> String {
        markdown_to_html(source, &RenderOptions::default()).unwrap()
    }

    #[test]
    fn test_heading_levels() {
        assert_eq!(html("### Three"), "<h3>Three</h3>\n");
        assert_eq!(html("###### Six"), "<h6>Six</h6>\n");
    }

    #[test]
    fn test_blockquote() {
        assert_eq!(html("> quoted"), "<blockquote>\n<p>quoted</p>\n</blockquote>\n");
    }

    #[test]
    fn test_raw_html_passes_through_unsanitized() {
        assert!(html("<div>raw</div>").contains("<div>raw</div>"));
    }
}
