//! End-to-end tests for markdown rendering plus sanitization

use mdqr_render::{RenderError, render};
use std::thread;

#[test]
fn inline_math_with_underscores_is_not_emphasis() {
    let html = render("Inline $a_b$ and $c_d$ math").unwrap();

    assert!(html.contains("katex"));
    assert!(html.contains("annotation"));
    assert!(!html.contains("<em>"));
}

#[test]
fn block_math_renders_display_markup() {
    let html = render("$$\n\\frac{1}{2}\n$$").unwrap();

    assert!(html.contains("katex-display"));
    assert!(html.contains("<mfrac>"));
    assert!(html.contains(r#"<annotation encoding="application/x-tex">\frac{1}{2}</annotation>"#));
}

#[test]
fn mermaid_fence_survives_alongside_math() {
    let source = "# Diagram\n\n$x^2$\n\n```mermaid\ngraph TD\n  A --> B\n```\n";
    let html = render(source).unwrap();

    assert!(html.contains("language-mermaid"));
    assert!(html.contains("A --&gt; B"));
    assert!(html.contains("katex"));
}

#[test]
fn script_tags_are_removed_with_content() {
    let html = render("Hello\n\n<script>alert('x')</script>\n\nWorld").unwrap();

    assert!(!html.contains("<script"));
    assert!(!html.contains("alert"));
    assert!(html.contains("Hello"));
    assert!(html.contains("World"));
}

#[test]
fn event_handler_attributes_are_removed() {
    let html = render(r#"<img src="x.png" onerror="alert(1)">"#).unwrap();

    assert!(!html.contains("onerror"));
    assert!(html.contains("x.png"));
}

#[test]
fn javascript_urls_are_removed() {
    let html = render("[click](javascript:alert(1))").unwrap();

    assert!(!html.contains("javascript:"));
    assert!(html.contains("click"));
}

#[test]
fn raw_html_keeps_allowed_subset() {
    let html = render(r#"<div class="x"><span class="katex" style="color:red">ok</span></div>"#)
        .unwrap();

    assert!(html.contains(r#"<div><span class="katex">ok</span></div>"#));
}

#[test]
fn gfm_features_survive_sanitization() {
    let source = "\
| a | b |
|---|:-:|
| 1 | 2 |

- [x] done
- [ ] open

~~gone~~ https://example.com
";
    let html = render(source).unwrap();

    assert!(html.contains("<table>"));
    assert!(html.contains(r#"<th align="center">b</th>"#));
    assert!(html.contains(r#"type="checkbox""#));
    assert!(html.contains("<del>gone</del>"));
    assert!(html.contains(r#"href="https://example.com""#));
}

#[test]
fn line_breaks_render_as_br() {
    let html = render("first\nsecond").unwrap();

    assert!(html.contains("first<br>"));
}

#[test]
fn footnotes_survive_sanitization() {
    let html = render("Fact[^1].\n\n[^1]: Proof.").unwrap();

    assert!(html.contains(r#"<sup id="fnref-1">"#));
    assert!(html.contains(r#"<li id="fn-1">"#));
}

#[test]
fn invalid_tex_does_not_fail_the_document() {
    let html = render("before $\\begin{nosuch}x\\end{nosuch}$ after").unwrap();

    assert!(html.contains("katex-error"));
    assert!(html.contains("after"));
}

#[test]
fn oversized_input_is_an_error() {
    let source = "x".repeat(mdqr_render::MAX_SOURCE_SIZE + 1);

    assert!(matches!(render(&source), Err(RenderError::TooLarge { .. })));
}

#[test]
fn deeply_nested_quotes_fail_instead_of_overflowing() {
    // Same stack size as a tokio blocking worker.
    let handle = thread::Builder::new()
        .stack_size(2 * 1024 * 1024)
        .spawn(|| {
            let source = format!("{} a", ">".repeat(20_000));
            render(&source).map(|_| ())
        })
        .unwrap();

    let result = handle.join().unwrap();
    assert!(matches!(result, Err(RenderError::TooDeep { .. })));
}

#[test]
fn malformed_tex_renders_error_span_without_parser_noise() {
    for tex in ["}", "^", r"\right)"] {
        let html = render(&format!("before ${tex}$ after")).unwrap();

        assert!(html.contains("katex-error"), "{tex}: {html}");
        assert!(!html.contains("PARSE"), "{tex}: {html}");
        assert!(html.contains("after"));
    }
}
