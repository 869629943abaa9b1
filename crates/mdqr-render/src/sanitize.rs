//! Allowlist HTML sanitizer
//!
//! [`ALLOWLIST`] is the single declarative source of truth for which elements
//! and attributes survive sanitization, and which values each attribute may
//! hold. It is compiled once into an `ammonia` builder plus a table of value
//! rules applied through ammonia's attribute filter.

use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use ammonia::{Builder, UrlRelative};
use regex::Regex;

/// Rule applied to an attribute value.
#[derive(Debug, Clone, Copy)]
pub enum ValueRule {
    /// Any value is kept (URL attributes are still scheme-checked).
    Any,
    /// The whole value must match the pattern.
    Pattern(&'static str),
    /// Whitespace-separated class list; classes matching none of the patterns
    /// are dropped, and the attribute is removed when nothing is left.
    Classes(&'static [&'static str]),
    /// Inline style; only the listed properties survive, each with a value
    /// matching `value`.
    Styles {
        properties: &'static [&'static str],
        value: &'static str,
    },
}

/// An allowed attribute on a tag.
#[derive(Debug, Clone, Copy)]
pub struct AttributeRule {
    pub name: &'static str,
    pub value: ValueRule,
}

/// An allowed tag and its allowed attributes.
#[derive(Debug, Clone, Copy)]
pub struct TagRule {
    pub tag: &'static str,
    pub attributes: &'static [AttributeRule],
}

const fn tag(tag: &'static str) -> TagRule {
    TagRule {
        tag,
        attributes: &[],
    }
}

const fn attr(name: &'static str, value: ValueRule) -> AttributeRule {
    AttributeRule { name, value }
}

/// Class names KaTeX emits on `span` elements.
pub const KATEX_CLASS_PATTERNS: &[&str] = &[
    r"^katex(?:-[a-z0-9-]+)?$",
    r"^m[a-z0-9-]*$",
    r"^text[a-z0-9-]*$",
    r"^math[a-z0-9-]*$",
    r"^base$",
    r"^strut$",
    r"^fontsize(?:-[a-z0-9-]+)?$",
    r"^sizing$",
    r"^size\d+$",
    r"^reset-size\d+$",
    r"^vlist(?:-[a-z0-9-]+)?$",
    r"^pstrut$",
    r"^overline(?:-[a-z0-9-]+)?$",
    r"^underline(?:-[a-z0-9-]+)?$",
    r"^accent(?:-[a-z0-9-]+)?$",
    r"^rule$",
    r"^frac-line$",
    r"^sqrt$",
    r"^root$",
    r"^delim[a-z0-9-]*$",
    r"^op(?:-[a-z0-9-]+)?$",
    r"^stretchy$",
    r"^hide-tail$",
    r"^nulldelimiter$",
    r"^llap$",
    r"^rlap$",
    r"^clap$",
    r"^col-align-[lcr]$",
];

/// Inline style properties KaTeX uses for layout.
pub const KATEX_STYLE_PROPERTIES: &[&str] = &[
    "width",
    "height",
    "min-width",
    "margin-left",
    "margin-right",
    "top",
    "padding-left",
    "padding-right",
    "border-bottom-width",
    "vertical-align",
];

/// A CSS length: zero, or a signed number with a unit.
pub const KATEX_STYLE_LENGTH_PATTERN: &str = r"^(?:0|-?(?:\d+|\d*\.\d+)(?:em|ex|px|pt|rem|%))$";

const FOOTNOTE_ID_PATTERN: &str = r"^fn(?:ref)?-\d+$";

/// Every element and attribute that survives sanitization.
pub static ALLOWLIST: &[TagRule] = &[
    // Sections and grouping
    tag("address"),
    tag("article"),
    tag("aside"),
    tag("footer"),
    tag("header"),
    tag("h1"),
    tag("h2"),
    tag("h3"),
    tag("h4"),
    tag("h5"),
    tag("h6"),
    tag("hgroup"),
    tag("main"),
    tag("nav"),
    tag("section"),
    tag("blockquote"),
    tag("dd"),
    tag("div"),
    tag("dl"),
    tag("dt"),
    tag("figcaption"),
    tag("figure"),
    tag("hr"),
    TagRule {
        tag: "li",
        attributes: &[attr("id", ValueRule::Pattern(FOOTNOTE_ID_PATTERN))],
    },
    TagRule {
        tag: "ol",
        attributes: &[attr("start", ValueRule::Pattern(r"^\d{1,9}$"))],
    },
    tag("p"),
    tag("pre"),
    tag("ul"),
    // Text-level
    TagRule {
        tag: "a",
        attributes: &[
            attr("href", ValueRule::Any),
            attr("name", ValueRule::Pattern(r"^[A-Za-z0-9_-]+$")),
            attr("title", ValueRule::Any),
        ],
    },
    tag("abbr"),
    tag("b"),
    tag("bdi"),
    tag("bdo"),
    tag("br"),
    tag("cite"),
    TagRule {
        tag: "code",
        attributes: &[attr(
            "class",
            ValueRule::Classes(&[r"^language-[A-Za-z0-9_+#.-]+$"]),
        )],
    },
    tag("data"),
    tag("del"),
    tag("dfn"),
    tag("em"),
    tag("i"),
    TagRule {
        tag: "img",
        attributes: &[
            attr("src", ValueRule::Any),
            attr("alt", ValueRule::Any),
            attr("width", ValueRule::Pattern(r"^\d{1,5}%?$")),
            attr("height", ValueRule::Pattern(r"^\d{1,5}%?$")),
        ],
    },
    TagRule {
        tag: "input",
        attributes: &[
            attr("type", ValueRule::Pattern(r"^checkbox$")),
            attr("checked", ValueRule::Any),
            attr("disabled", ValueRule::Any),
        ],
    },
    tag("kbd"),
    tag("mark"),
    tag("q"),
    tag("rb"),
    tag("rp"),
    tag("rt"),
    tag("rtc"),
    tag("ruby"),
    tag("s"),
    tag("samp"),
    tag("small"),
    TagRule {
        tag: "span",
        attributes: &[
            attr("class", ValueRule::Classes(KATEX_CLASS_PATTERNS)),
            attr(
                "style",
                ValueRule::Styles {
                    properties: KATEX_STYLE_PROPERTIES,
                    value: KATEX_STYLE_LENGTH_PATTERN,
                },
            ),
            attr("aria-hidden", ValueRule::Pattern(r"^(?:true|false)$")),
        ],
    },
    tag("strong"),
    tag("sub"),
    TagRule {
        tag: "sup",
        attributes: &[attr("id", ValueRule::Pattern(FOOTNOTE_ID_PATTERN))],
    },
    tag("time"),
    tag("u"),
    tag("var"),
    tag("wbr"),
    // Tables
    tag("caption"),
    tag("col"),
    tag("colgroup"),
    tag("table"),
    tag("tbody"),
    TagRule {
        tag: "td",
        attributes: &[attr("align", ValueRule::Pattern(r"^(?:left|center|right)$"))],
    },
    tag("tfoot"),
    TagRule {
        tag: "th",
        attributes: &[attr("align", ValueRule::Pattern(r"^(?:left|center|right)$"))],
    },
    tag("thead"),
    tag("tr"),
    // MathML
    TagRule {
        tag: "math",
        attributes: &[
            attr(
                "xmlns",
                ValueRule::Pattern(r"^http://www\.w3\.org/1998/Math/MathML$"),
            ),
            attr("display", ValueRule::Pattern(r"^(?:block|inline)$")),
        ],
    },
    tag("semantics"),
    tag("mrow"),
    tag("mi"),
    tag("mo"),
    tag("mn"),
    tag("mtext"),
    tag("ms"),
    tag("mspace"),
    tag("mstyle"),
    tag("mpadded"),
    tag("mphantom"),
    tag("mfrac"),
    tag("msqrt"),
    tag("mroot"),
    tag("munder"),
    tag("mover"),
    tag("munderover"),
    tag("msub"),
    tag("msup"),
    tag("msubsup"),
    tag("mtable"),
    tag("mtr"),
    tag("mtd"),
    tag("mlabeledtr"),
    tag("menclose"),
    tag("mprescripts"),
    tag("none"),
    TagRule {
        tag: "annotation",
        attributes: &[attr("encoding", ValueRule::Pattern(r"^[A-Za-z0-9/+.-]+$"))],
    },
    tag("annotation-xml"),
];

/// Elements removed together with everything inside them.
pub const CONTENT_STRIPPED_TAGS: &[&str] = &["script", "style", "textarea", "option", "noscript"];

/// URL schemes allowed in `href` and `src`.
pub const URL_SCHEMES: &[&str] = &["http", "https", "ftp", "mailto", "tel"];

enum CompiledRule {
    Any,
    Reject,
    Pattern(Regex),
    Classes(Vec<Regex>),
    Styles {
        properties: &'static [&'static str],
        value: Regex,
    },
}

type RuleTable = HashMap<&'static str, HashMap<&'static str, CompiledRule>>;

static VALUE_RULES: LazyLock<RuleTable> = LazyLock::new(compile_rules);

static SANITIZER: LazyLock<Builder<'static>> = LazyLock::new(build_sanitizer);

fn compile(pattern: &str) -> Option<Regex> {
    Regex::new(pattern)
        .inspect_err(|error| tracing::error!(pattern, %error, "invalid allowlist pattern"))
        .ok()
}

fn compile_rule(rule: ValueRule) -> CompiledRule {
    match rule {
        ValueRule::Any => CompiledRule::Any,
        ValueRule::Pattern(pattern) => {
            compile(pattern).map_or(CompiledRule::Reject, CompiledRule::Pattern)
        }
        ValueRule::Classes(patterns) => {
            CompiledRule::Classes(patterns.iter().filter_map(|p| compile(p)).collect())
        }
        ValueRule::Styles { properties, value } => match compile(value) {
            Some(value) => CompiledRule::Styles { properties, value },
            None => CompiledRule::Reject,
        },
    }
}

fn compile_rules() -> RuleTable {
    ALLOWLIST
        .iter()
        .filter(|rule| !rule.attributes.is_empty())
        .map(|rule| {
            let attributes = rule
                .attributes
                .iter()
                .map(|attribute| (attribute.name, compile_rule(attribute.value)))
                .collect();
            (rule.tag, attributes)
        })
        .collect()
}

fn build_sanitizer() -> Builder<'static> {
    let tags: HashSet<&'static str> = ALLOWLIST.iter().map(|rule| rule.tag).collect();
    let tag_attributes: HashMap<&'static str, HashSet<&'static str>> = ALLOWLIST
        .iter()
        .filter(|rule| !rule.attributes.is_empty())
        .map(|rule| (rule.tag, rule.attributes.iter().map(|a| a.name).collect()))
        .collect();

    let mut builder = Builder::empty();
    builder
        .tags(tags)
        .tag_attributes(tag_attributes)
        .clean_content_tags(CONTENT_STRIPPED_TAGS.iter().copied().collect())
        .url_schemes(URL_SCHEMES.iter().copied().collect())
        .url_relative(UrlRelative::PassThrough)
        .link_rel(Some("noopener noreferrer"))
        .strip_comments(true)
        .attribute_filter(filter_attribute);
    builder
}

fn filter_attribute<'u>(element: &str, attribute: &str, value: &'u str) -> Option<Cow<'u, str>> {
    let Some(rule) = VALUE_RULES
        .get(element)
        .and_then(|attributes| attributes.get(attribute))
    else {
        return Some(Cow::Borrowed(value));
    };

    match rule {
        CompiledRule::Any => Some(Cow::Borrowed(value)),
        CompiledRule::Reject => None,
        CompiledRule::Pattern(pattern) => pattern.is_match(value).then_some(Cow::Borrowed(value)),
        CompiledRule::Classes(patterns) => {
            let kept: Vec<&str> = value
                .split_ascii_whitespace()
                .filter(|class| patterns.iter().any(|p| p.is_match(class)))
                .collect();
            if kept.is_empty() {
                None
            } else {
                Some(Cow::Owned(kept.join(" ")))
            }
        }
        CompiledRule::Styles {
            properties,
            value: pattern,
        } => {
            let kept: Vec<String> = value
                .split(';')
                .filter_map(|declaration| {
                    let (property, length) = declaration.split_once(':')?;
                    let property = property.trim().to_ascii_lowercase();
                    let length = length.trim();
                    (properties.contains(&property.as_str()) && pattern.is_match(length))
                        .then(|| format!("{property}:{length}"))
                })
                .collect();
            if kept.is_empty() {
                None
            } else {
                Some(Cow::Owned(kept.join(";")))
            }
        }
    }
}

/// Sanitize an HTML fragment against [`ALLOWLIST`].
pub fn sanitize(html: &str) -> String {
    SANITIZER.clean(html).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowlist_patterns_compile() {
        for rule in ALLOWLIST {
            for attribute in rule.attributes {
                let compiled = &VALUE_RULES[rule.tag][attribute.name];
                assert!(!matches!(compiled, CompiledRule::Reject), "{}", attribute.name);
                if let CompiledRule::Classes(patterns) = compiled {
                    assert!(!patterns.is_empty());
                }
            }
        }
    }

    #[test]
    fn test_allowlist_and_stripped_tags_are_disjoint() {
        for stripped in CONTENT_STRIPPED_TAGS {
            assert!(ALLOWLIST.iter().all(|rule| rule.tag != *stripped));
        }
    }

    #[test]
    fn test_script_removed_with_content() {
        let clean = sanitize("<p>hi</p><script>alert(1)</script>");
        assert_eq!(clean, "<p>hi</p>");
    }

    #[test]
    fn test_event_handlers_removed() {
        let clean = sanitize(r#"<img src="x.png" onerror="alert(1)">"#);
        assert!(clean.contains(r#"src="x.png""#));
        assert!(!clean.contains("onerror"));
    }

    #[test]
    fn test_javascript_links_removed() {
        let clean = sanitize(r#"<a href="javascript:alert(1)">x</a>"#);
        assert!(!clean.contains("javascript:"));
        assert!(clean.contains(">x</a>"));
    }

    #[test]
    fn test_links_get_rel() {
        let clean = sanitize(r#"<a href="https://example.com">x</a>"#);
        assert!(clean.contains(r#"href="https://example.com""#));
        assert!(clean.contains(r#"rel="noopener noreferrer""#));
    }

    #[test]
    fn test_relative_links_pass_through() {
        let clean = sanitize(r##"<a href="#fn-1">1</a>"##);
        assert!(clean.contains(r##"href="#fn-1""##));
    }

    #[test]
    fn test_span_classes_filtered() {
        let clean = sanitize(r#"<span class="katex evil mord">x</span>"#);
        assert!(clean.contains(r#"class="katex mord""#));
        assert!(!clean.contains("evil"));
    }

    #[test]
    fn test_span_class_removed_when_nothing_matches() {
        let clean = sanitize(r#"<span class="evil">x</span>"#);
        assert_eq!(clean, "<span>x</span>");
    }

    #[test]
    fn test_span_style_filtered() {
        let clean = sanitize(
            r#"<span style="height:1.2em; background:url(x); top:-0.5em; width:calc(1px)">x</span>"#,
        );
        assert!(clean.contains(r#"style="height:1.2em;top:-0.5em""#));
        assert!(!clean.contains("background"));
        assert!(!clean.contains("calc"));
    }

    #[test]
    fn test_code_language_class_kept() {
        let clean = sanitize(r#"<pre><code class="language-mermaid">graph</code></pre>"#);
        assert!(clean.contains(r#"class="language-mermaid""#));

        let clean = sanitize(r#"<pre><code class="hljs">x</code></pre>"#);
        assert!(!clean.contains("hljs"));
    }

    #[test]
    fn test_mathml_survives() {
        let clean = sanitize(
            r#"<math xmlns="http://www.w3.org/1998/Math/MathML" display="inline"><semantics><mrow><msub><mi>a</mi><mi>b</mi></msub></mrow><annotation encoding="application/x-tex">a_b</annotation></semantics></math>"#,
        );
        assert!(clean.contains("<msub>"));
        assert!(clean.contains(r#"<annotation encoding="application/x-tex">a_b</annotation>"#));
    }

    #[test]
    fn test_style_and_iframe_stripped() {
        let clean = sanitize("<style>p{}</style><iframe src=\"x\"></iframe><p>ok</p>");
        assert_eq!(clean, "<p>ok</p>");
    }

    #[test]
    fn test_checkbox_input_kept_other_inputs_lose_type() {
        let clean = sanitize(r#"<input type="checkbox" checked="" disabled="">"#);
        assert!(clean.contains(r#"type="checkbox""#));
        assert!(clean.contains("disabled"));

        let clean = sanitize(r#"<input type="text" value="x">"#);
        assert!(!clean.contains("text"));
        assert!(!clean.contains("value"));
    }

    #[test]
    fn test_footnote_ids_restricted() {
        let clean = sanitize(r#"<sup id="fnref-1">1</sup><sup id="other">2</sup>"#);
        assert!(clean.contains(r#"id="fnref-1""#));
        assert!(!clean.contains("other"));
    }
}
