//! Denylist sanitizer for surface markup.
//!
//! Strips the constructs that would execute when the markup is echoed into a
//! same-site preview frame: script elements, `javascript:` frames, inline
//! event handlers, `javascript:` link/source references and CSS
//! `expression()`. This is demo-grade filtering and not a security boundary
//! for any other trust context.

use std::sync::LazyLock;

use regex::Regex;

use crate::dom::{Dom, NodeId};
use crate::parse::parse_offline;

pub static SCRIPT_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*javascript:").unwrap());

static CSS_EXPRESSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)expression\s*\(").unwrap());

/// What one sanitize pass removed. Used for logging only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SanitizeReport {
    pub removed_nodes: usize,
    pub removed_attrs: usize,
}

/// Sanitize `markup` and return the inner markup of the parsed body.
///
/// Never fails; malformed input is repaired by the parser first.
pub fn sanitize(markup: &str) -> String {
    let (mut dom, body) = parse_offline(markup);
    let report = sanitize_tree(&mut dom, body);
    if report != SanitizeReport::default() {
        tracing::debug!(
            target: "consent_editor::sanitize",
            removed_nodes = report.removed_nodes,
            removed_attrs = report.removed_attrs,
            "stripped dangerous markup"
        );
    }
    dom.inner_html(body)
}

/// Sanitize the subtree under `root` in place.
pub fn sanitize_tree(dom: &mut Dom, root: NodeId) -> SanitizeReport {
    let mut report = SanitizeReport::default();

    let doomed: Vec<NodeId> = dom
        .descendants(root)
        .filter(|&n| is_dangerous_node(dom, n))
        .collect();
    for node in doomed {
        // An ancestor may already have taken it out of the tree.
        if dom.contains(root, node) {
            dom.detach(node);
            report.removed_nodes += 1;
        }
    }

    let elements: Vec<NodeId> = dom.descendants(root).filter(|&n| dom.is_element(n)).collect();
    for el in elements {
        let Some(data) = dom.element_mut(el) else {
            continue;
        };
        let before = data.attrs.len();
        data.attrs
            .retain(|attr| !is_dangerous_attr(&attr.name, &attr.value));
        report.removed_attrs += before - data.attrs.len();
    }

    report
}

fn is_dangerous_node(dom: &Dom, node: NodeId) -> bool {
    match dom.tag_name(node) {
        Some("script") => true,
        Some("iframe") => dom
            .attr(node, "src")
            .is_some_and(|src| SCRIPT_URL_RE.is_match(src)),
        _ => false,
    }
}

fn is_dangerous_attr(name: &str, value: &str) -> bool {
    let name = name.to_ascii_lowercase();
    if name.starts_with("on") {
        return true;
    }
    match name.as_str() {
        "href" | "src" => SCRIPT_URL_RE.is_match(value),
        "style" => CSS_EXPRESSION_RE.is_match(value),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_removes_scripts_and_handlers() {
        let out = sanitize(
            r#"<p onclick="steal()">Hi<script>alert(1)</script></p><img src=x.png ONERROR="boom()">"#,
        );
        insta::assert_snapshot!(out, @r#"<p>Hi</p><img src="x.png">"#);
    }

    #[test]
    fn test_strips_script_urls_any_casing() {
        let out = sanitize(
            "<a href=\"  JaVaScRiPt:alert(1)\">x</a><a href=\"https://ok.example\">y</a>",
        );
        insta::assert_snapshot!(out, @r#"<a>x</a><a href="https://ok.example">y</a>"#);
    }

    #[test]
    fn test_drops_script_frames_only() {
        let out = sanitize(
            "<iframe src=\" javascript:alert(1)\"></iframe><iframe src=\"https://v.example/embed\"></iframe>",
        );
        insta::assert_snapshot!(out, @r#"<iframe src="https://v.example/embed"></iframe>"#);
    }

    #[test]
    fn test_removes_css_expression_styles() {
        let out = sanitize(
            "<span style=\"width: EXPRESSION (alert(1))\">a</span><span style=\"color: red\">b</span>",
        );
        insta::assert_snapshot!(out, @r#"<span>a</span><span style="color: red">b</span>"#);
    }

    #[test]
    fn test_safe_markup_passes_through() {
        let input = r#"<p><b>bold</b> <span class="size-larger">big</span></p><table class="editor-table"><tbody><tr><td>1</td></tr></tbody></table>"#;
        assert_eq!(sanitize(input), input);
    }

    #[test]
    fn test_noscript_fallback_is_stable() {
        let once = sanitize("<p>a</p><noscript><b>fallback</b> &amp; more</noscript>");
        insta::assert_snapshot!(once, @"<p>a</p><noscript><b>fallback</b> &amp; more</noscript>");
        assert_eq!(sanitize(&once), once);
    }

    #[test]
    fn test_malformed_input_never_fails() {
        let out = sanitize("<p><b>unclosed <script>x");
        assert!(!out.contains("script"));
        assert!(out.contains("unclosed"));
    }

    fn attribute() -> impl Strategy<Value = String> {
        prop_oneof![
            Just(r#" onclick="x()""#.to_string()),
            Just(r#" ONMOUSEOVER="x()""#.to_string()),
            Just(r#" href="  javascript:alert(1)""#.to_string()),
            Just(r#" src="JavaScript:void(0)""#.to_string()),
            Just(r#" href="https://example.com/a""#.to_string()),
            Just(r#" style="width: expression(alert(1))""#.to_string()),
            Just(r#" style="color: red""#.to_string()),
            Just(r#" class="size-smaller""#.to_string()),
        ]
    }

    fn inline() -> impl Strategy<Value = String> {
        let leaf = prop_oneof![
            "[a-z ]{0,8}",
            Just("<script>alert(1)</script>".to_string()),
            Just("<noscript><b>fallback</b> &amp; more</noscript>".to_string()),
            attribute().prop_map(|a| format!("<img{a}>")),
        ];
        leaf.prop_recursive(3, 16, 4, |inner| {
            (
                prop_oneof![Just("b"), Just("i"), Just("span"), Just("em")],
                proptest::collection::vec(attribute(), 0..3),
                proptest::collection::vec(inner, 0..4),
            )
                .prop_map(|(tag, attrs, children)| {
                    format!("<{tag}{}>{}</{tag}>", attrs.concat(), children.concat())
                })
        })
    }

    fn document() -> impl Strategy<Value = String> {
        proptest::collection::vec(inline(), 1..4)
            .prop_map(|blocks| blocks.iter().map(|b| format!("<p>{b}</p>")).collect())
    }

    proptest! {
        #[test]
        fn prop_sanitize_is_idempotent_and_clean(input in document()) {
            let once = sanitize(&input);
            prop_assert_eq!(sanitize(&once), once.clone());
            let lower = once.to_ascii_lowercase();
            prop_assert!(!lower.contains("<script"));
            let (dom, body) = parse_offline(&once);
            for el in dom.descendants(body).filter(|&n| dom.is_element(n)) {
                let attrs = &dom.element(el).unwrap().attrs;
                prop_assert!(attrs.iter().all(|a| !a.name.starts_with("on")));
            }
            prop_assert!(!lower.contains("javascript:"));
            prop_assert!(!lower.contains("expression("));
        }
    }
}
