//! Server-side math rendering
//!
//! TeX is converted to MathML with `latex2mathml` and wrapped in the markup
//! shape KaTeX produces, so the KaTeX stylesheet applies and the original TeX
//! stays available in an `annotation` element for copy/paste and assistive
//! technology.

use latex2mathml::{DisplayStyle, latex_to_mathml};

use crate::escape::escape_html;

/// Text `latex2mathml` emits in place of a node it could not convert.
const PARSE_ERROR_MARKER: &str = "[PARSE ERROR";

/// MathML namespace used on the generated `<math>` element.
pub const MATHML_NAMESPACE: &str = "http://www.w3.org/1998/Math/MathML";

/// How a math expression is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathMode {
    /// `$...$`, flows with the surrounding text.
    Inline,
    /// `$$...$$`, rendered as its own centered block.
    Display,
}

/// Render inline math (`$...$`).
pub fn render_inline(tex: &str) -> String {
    render_math(tex, MathMode::Inline)
}

/// Render display math (`$$...$$`).
pub fn render_display(tex: &str) -> String {
    render_math(tex, MathMode::Display)
}

/// Render a TeX expression.
///
/// Invalid TeX never fails the document; it renders as a `katex-error` span
/// holding the escaped source instead.
pub fn render_math(tex: &str, mode: MathMode) -> String {
    let style = match mode {
        MathMode::Inline => DisplayStyle::Inline,
        MathMode::Display => DisplayStyle::Block,
    };

    let converted = latex_to_mathml(tex, style)
        .map_err(|e| e.to_string())
        .and_then(|mathml| {
            if mathml.contains(PARSE_ERROR_MARKER) {
                Err("unsupported construct".to_string())
            } else {
                Ok(mathml)
            }
        });

    match converted {
        Ok(mathml) => {
            let math = with_annotation(&mathml, tex);
            match mode {
                MathMode::Inline => format!(r#"<span class="katex">{math}</span>"#),
                MathMode::Display => format!(
                    r#"<span class="katex-display"><span class="katex">{math}</span></span>"#
                ),
            }
        }
        Err(error) => {
            tracing::debug!(?error, tex, "math expression failed to render");
            format!(r#"<span class="katex-error">{}</span>"#, escape_html(tex))
        }
    }
}

/// Wrap the body of a `<math>` element in `<semantics>` and append the TeX
/// source as an annotation.
fn with_annotation(mathml: &str, tex: &str) -> String {
    let annotation = format!(
        r#"<annotation encoding="application/x-tex">{}</annotation>"#,
        escape_html(tex.trim())
    );

    let open_end = mathml.find('>');
    let close_start = mathml.rfind("</math>");

    match (open_end, close_start) {
        (Some(open_end), Some(close_start))
            if mathml.starts_with("<math") && open_end < close_start =>
        {
            let open = &mathml[..=open_end];
            let body = &mathml[open_end + 1..close_start];
            format!("{open}<semantics><mrow>{body}</mrow>{annotation}</semantics></math>")
        }
        _ => format!(
            r#"<math xmlns="{MATHML_NAMESPACE}"><semantics><mrow>{mathml}</mrow>{annotation}</semantics></math>"#
        ),
    }
}
