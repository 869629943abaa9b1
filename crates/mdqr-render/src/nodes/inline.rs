//! Inline node conversions (text, emphasis, links, images)

use markdown::mdast::{Image, ImageReference, Link, LinkReference, Node, ReferenceKind};

use super::{RenderContext, children_to_html};
use crate::escape::escape_html;

/// Convert text, turning soft line endings into `<br>` when enabled
pub fn text_to_html(value: &str, ctx: &RenderContext<'_>, out: &mut String) {
    let escaped = escape_html(value);
    if ctx.hard_breaks {
        out.push_str(&escaped.replace('\n', "<br>\n"));
    } else {
        out.push_str(&escaped);
    }
}

/// Wrap converted children in a simple element
pub fn wrap_children<'a>(
    tag: &str,
    children: &'a [Node],
    ctx: &mut RenderContext<'a>,
    out: &mut String,
) {
    out.push_str(&format!("<{tag}>"));
    children_to_html(children, ctx, out);
    out.push_str(&format!("</{tag}>"));
}

fn title_attribute(title: Option<&str>) -> String {
    title
        .map(|title| format!(r#" title="{}""#, escape_html(title)))
        .unwrap_or_default()
}

/// Convert link node to HTML
pub fn link_to_html<'a>(link: &'a Link, ctx: &mut RenderContext<'a>, out: &mut String) {
    anchor(&link.url, link.title.as_deref(), &link.children, ctx, out);
}

fn anchor<'a>(
    url: &str,
    title: Option<&str>,
    children: &'a [Node],
    ctx: &mut RenderContext<'a>,
    out: &mut String,
) {
    out.push_str(&format!(
        r#"<a href="{}"{}>"#,
        escape_html(url),
        title_attribute(title)
    ));
    children_to_html(children, ctx, out);
    out.push_str("</a>");
}

/// Convert image node to HTML
pub fn image_to_html(image: &Image, out: &mut String) {
    img(&image.url, &image.alt, out);
}

fn img(url: &str, alt: &str, out: &mut String) {
    out.push_str(&format!(
        r#"<img src="{}" alt="{}">"#,
        escape_html(url),
        escape_html(alt)
    ));
}

/// Convert a link reference (`[text][label]`)
///
/// Unresolved references render as the literal source text.
pub fn link_reference_to_html<'a>(
    reference: &'a LinkReference,
    ctx: &mut RenderContext<'a>,
    out: &mut String,
) {
    if let Some(definition) = ctx.definition(&reference.identifier) {
        anchor(
            &definition.url,
            definition.title.as_deref(),
            &reference.children,
            ctx,
            out,
        );
        return;
    }

    out.push('[');
    children_to_html(&reference.children, ctx, out);
    out.push(']');
    push_reference_suffix(&reference.reference_kind, reference.label.as_deref(), out);
}

/// Convert an image reference (`![alt][label]`)
pub fn image_reference_to_html(
    reference: &ImageReference,
    ctx: &RenderContext<'_>,
    out: &mut String,
) {
    if let Some(definition) = ctx.definition(&reference.identifier) {
        img(&definition.url, &reference.alt, out);
        return;
    }

    out.push_str("![");
    out.push_str(&escape_html(&reference.alt));
    out.push(']');
    push_reference_suffix(&reference.reference_kind, reference.label.as_deref(), out);
}

fn push_reference_suffix(kind: &ReferenceKind, label: Option<&str>, out: &mut String) {
    match kind {
        ReferenceKind::Shortcut => {}
        ReferenceKind::Collapsed => out.push_str("[]"),
        ReferenceKind::Full => {
            out.push('[');
            out.push_str(&escape_html(label.unwrap_or_default()));
            out.push(']');
        }
    }
}
