//! HTML fragment serialization for the arena tree.
//!
//! Follows the HTML fragment serialization algorithm (what `innerHTML`
//! returns), so output re-parses to the same tree.

use std::fmt::Write;

use crate::dom::{Dom, NodeId, NodeKind, is_void_element};

/// Parents whose text children are emitted verbatim.
const RAW_TEXT_PARENTS: &[&str] = &[
    "style",
    "script",
    "xmp",
    "iframe",
    "noembed",
    "noframes",
    "noscript",
    "plaintext",
];

pub fn inner_html(dom: &Dom, id: NodeId) -> String {
    let mut out = String::new();
    write_children(dom, id, &mut out);
    out
}

pub fn outer_html(dom: &Dom, id: NodeId) -> String {
    let mut out = String::new();
    write_node(dom, id, &mut out);
    out
}

fn write_children(dom: &Dom, id: NodeId, out: &mut String) {
    if let Some(name) = dom.tag_name(id) {
        if matches!(name, "pre" | "textarea" | "listing")
            && dom
                .first_child(id)
                .and_then(|c| match dom.kind(c) {
                    NodeKind::Text(t) => Some(t.starts_with('\n')),
                    _ => None,
                })
                .unwrap_or(false)
        {
            out.push('\n');
        }
    }
    for &child in dom.children(id) {
        write_node(dom, child, out);
    }
}

fn write_node(dom: &Dom, id: NodeId, out: &mut String) {
    match dom.kind(id) {
        NodeKind::Document => write_children(dom, id, out),
        NodeKind::Element(el) => {
            out.push('<');
            out.push_str(&el.name);
            for attr in &el.attrs {
                let _ = write!(out, " {}=\"", attr.name);
                escape_attribute(&attr.value, out);
                out.push('"');
            }
            out.push('>');
            if is_void_element(&el.name) {
                return;
            }
            write_children(dom, id, out);
            let _ = write!(out, "</{}>", el.name);
        }
        NodeKind::Text(text) => {
            let raw = dom
                .parent(id)
                .and_then(|p| dom.tag_name(p))
                .is_some_and(|p| RAW_TEXT_PARENTS.contains(&p));
            if raw {
                out.push_str(text);
            } else {
                escape_text(text, out);
            }
        }
        NodeKind::Comment(text) => {
            let _ = write!(out, "<!--{text}-->");
        }
    }
}

fn escape_text(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
}

fn escape_attribute(value: &str, out: &mut String) {
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            '"' => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
}
