//! HTML page wrapped around the rendered document.

use mdqr_render::escape_html;

const BASE_CSS: &str = include_str!("../../assets/page/base.css");
const DIAGRAMS_CSS: &str = include_str!("../../assets/page/diagrams.css");
const THEME_CSS: &str = include_str!("../../assets/page/theme.css");
const THEME_TOGGLE_JS: &str = include_str!("../../assets/page/theme-toggle.js");
const MERMAID_JS: &str = include_str!("../../assets/page/mermaid.js");
const RELOAD_JS: &str = include_str!("../../assets/page/reload.js");

const SSE_URL_PLACEHOLDER: &str = "__MDQR_SSE_URL__";

const KATEX_STYLESHEET: &str = "https://cdn.jsdelivr.net/npm/katex@0.16.11/dist/katex.min.css";

/// Hosts the page loads scripts, styles and fonts from.
pub fn cdn_domains() -> &'static [&'static str] {
    &["cdn.jsdelivr.net"]
}

/// Content-Security-Policy sent with the page.
pub fn content_security_policy() -> String {
    let cdn = cdn_domains().join(" ");

    format!(
        "default-src 'self'; \
         script-src 'self' 'unsafe-inline' {cdn}; \
         style-src 'self' 'unsafe-inline' {cdn}; \
         font-src {cdn}; \
         img-src 'self' data:;"
    )
}

/// Build the full page for a rendered (already sanitized) body.
///
/// `title` is escaped here. `token` is URL-encoded into the live-reload
/// subscription URL.
pub fn build_html_document(title: &str, body_html: &str, token: &str) -> String {
    let encoded_token: String = url::form_urlencoded::byte_serialize(token.as_bytes()).collect();
    let reload_js = RELOAD_JS.replace(SSE_URL_PLACEHOLDER, &format!("/sse?token={encoded_token}"));

    let mut html = String::with_capacity(body_html.len() + 8 * 1024);
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"UTF-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");
    html.push_str("<title>");
    html.push_str(&escape_html(title));
    html.push_str("</title>\n<style>\n");
    for css in [BASE_CSS, DIAGRAMS_CSS, THEME_CSS] {
        html.push_str(css);
    }
    html.push_str("</style>\n");
    html.push_str("<link rel=\"stylesheet\" href=\"");
    html.push_str(KATEX_STYLESHEET);
    html.push_str("\">\n<script type=\"module\">\n");
    html.push_str(MERMAID_JS);
    html.push_str("</script>\n</head>\n<body>\n");
    html.push_str(
        "<button class=\"theme-toggle\" id=\"theme-toggle\" aria-label=\"Toggle theme\">\u{1F313}</button>\n",
    );
    html.push_str("<script>\n");
    html.push_str(THEME_TOGGLE_JS);
    html.push_str("</script>\n");
    html.push_str(body_html);
    html.push_str("\n<script>\n");
    html.push_str(&reload_js);
    html.push_str("</script>\n</body>\n</html>\n");
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_structure() {
        let html = build_html_document("notes.md", "<p>hi</p>", "abc123");
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>notes.md</title>"));
        assert!(html.contains("<p>hi</p>"));
        assert!(html.contains("name=\"viewport\""));
        assert!(html.trim_end().ends_with("</html>"));

        let body_pos = html.find("<p>hi</p>").unwrap();
        let reload_pos = html.find("EventSource").unwrap();
        assert!(reload_pos > body_pos);
    }

    #[test]
    fn test_title_is_escaped() {
        let html = build_html_document("<script>x</script>.md", "", "t");
        assert!(html.contains("<title>&lt;script&gt;x&lt;/script&gt;.md</title>"));
    }

    #[test]
    fn test_reload_script_uses_encoded_token() {
        let html = build_html_document("a.md", "", "a b&c");
        assert!(html.contains("new EventSource(\"/sse?token=a+b%26c\")"));
        assert!(html.contains("addEventListener(\"reload\""));
        assert!(!html.contains(SSE_URL_PLACEHOLDER));
    }

    #[test]
    fn test_math_and_diagram_support() {
        let html = build_html_document("a.md", "", "t");
        assert!(html.contains(KATEX_STYLESHEET));
        assert!(html.contains("mermaid.esm.min.mjs"));
        assert!(html.contains("pre > code.language-mermaid"));
        assert!(html.contains(".katex-display"));
    }

    #[test]
    fn test_theme_toggle() {
        let html = build_html_document("a.md", "", "t");
        assert!(html.contains("id=\"theme-toggle\""));
        assert!(html.contains("localStorage"));
        assert!(html.contains("prefers-color-scheme: dark"));
        assert!(html.contains("html[data-theme=\"dark\"]"));
    }

    #[test]
    fn test_content_security_policy() {
        assert_eq!(
            content_security_policy(),
            "default-src 'self'; \
             script-src 'self' 'unsafe-inline' cdn.jsdelivr.net; \
             style-src 'self' 'unsafe-inline' cdn.jsdelivr.net; \
             font-src cdn.jsdelivr.net; \
             img-src 'self' data:;"
        );
    }

    #[test]
    fn test_assets_are_referenced_by_cdn_domain() {
        let html = build_html_document("a.md", "", "t");
        for url in [KATEX_STYLESHEET, "https://cdn.jsdelivr.net/npm/mermaid@11"] {
            assert!(cdn_domains().iter().any(|d| url.contains(d)));
            assert!(html.contains(url));
        }
    }
}
