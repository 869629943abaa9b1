//! Code node conversions (fenced blocks and inline code)

use markdown::mdast::{Code, InlineCode};

use crate::escape::escape_html;

/// Convert code block node to HTML
///
/// The first word of the info string becomes a `language-*` class, which is
/// how diagram fences (`mermaid`) reach the client-side renderer.
pub fn code_block_to_html(code: &Code, out: &mut String) {
    out.push_str("<pre><code");
    if let Some(language) = code.lang.as_deref().and_then(|l| l.split_whitespace().next()) {
        out.push_str(&format!(r#" class="language-{}""#, escape_html(language)));
    }
    out.push('>');
    out.push_str(&escape_html(&code.value));
    if !code.value.is_empty() {
        out.push('\n');
    }
    out.push_str("</code></pre>\n");
}

/// Convert inline code node to HTML
pub fn inline_code_to_html(code: &InlineCode, out: &mut String) {
    out.push_str("<code>");
    out.push_str(&escape_html(&code.value));
    out.push_str("</code>");
}
