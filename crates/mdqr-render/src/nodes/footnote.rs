//! Footnote references and the trailing footnotes section

use markdown::mdast::FootnoteReference;

use super::{RenderContext, children_to_html};
use crate::escape::escape_html;

/// Convert footnote reference to a numbered superscript link
pub fn footnote_reference_to_html<'a>(
    reference: &'a FootnoteReference,
    ctx: &mut RenderContext<'a>,
    out: &mut String,
) {
    match ctx.footnote_number(&reference.identifier) {
        Some((number, true)) => out.push_str(&format!(
            "<sup id=\"fnref-{number}\"><a href=\"#fn-{number}\">{number}</a></sup>"
        )),
        Some((number, false)) => {
            out.push_str(&format!("<sup><a href=\"#fn-{number}\">{number}</a></sup>"))
        }
        None => {
            let label = reference.label.as_deref().unwrap_or(&reference.identifier);
            out.push_str(&format!("[^{}]", escape_html(label)));
        }
    }
}

/// Append the footnotes section for every referenced footnote
///
/// Footnotes referenced only from inside other footnotes are numbered as
/// they are reached.
pub fn footnotes_section(ctx: &mut RenderContext<'_>, out: &mut String) {
    let Some(first) = ctx.footnote_at(0) else {
        return;
    };

    out.push_str("<hr>\n<section>\n<ol>\n");
    let mut index = 0;
    let mut next = Some(first);
    while let Some(definition) = next {
        let number = index + 1;
        out.push_str(&format!("<li id=\"fn-{number}\">\n"));
        children_to_html(&definition.children, ctx, out);
        out.push_str(&format!("<a href=\"#fnref-{number}\">\u{21a9}</a>\n</li>\n"));
        index += 1;
        next = ctx.footnote_at(index);
    }
    out.push_str("</ol>\n</section>\n");
}

#[cfg(test)]
mod tests {
    use crate::{RenderOptions, markdown_to_html};

    fn html(source: &str) -> String {
        markdown_to_html(source, &RenderOptions::default()).unwrap()
    }

    #[test]
    fn test_footnote_reference_and_section() {
        let out = html("Claim[^a].\n\n[^a]: Source.");
        assert!(out.contains(r##"<sup id="fnref-1"><a href="#fn-1">1</a></sup>"##));
        assert!(out.contains("<li id=\"fn-1\">\n<p>Source.</p>\n"));
        assert!(out.contains(r##"<a href="#fnref-1">"##));
    }

    #[test]
    fn test_footnotes_numbered_by_first_reference() {
        let out = html("B[^b] A[^a] B again[^b]\n\n[^a]: a\n\n[^b]: b");
        assert!(out.contains(r##"B<sup id="fnref-1"><a href="#fn-1">1</a></sup>"##));
        assert!(out.contains(r##"A<sup id="fnref-2"><a href="#fn-2">2</a></sup>"##));
        assert!(out.contains(r##"again<sup><a href="#fn-1">1</a></sup>"##));
    }

    #[test]
    fn test_no_section_without_references() {
        assert!(!html("plain").contains("<section>"));
    }
}
