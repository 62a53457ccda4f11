//! Markup parsing into the arena tree.
//!
//! Parsing goes through `scraper` (html5ever), which never fails: malformed
//! input always yields some tree. Only the `<body>` content is copied into
//! the arena; head-level nodes are dropped the same way a browser's
//! `DOMParser` + `body.innerHTML` would drop them.

use scraper::{Html, Node};

use crate::dom::{Dom, NodeId};

/// Parse `markup` as a document and append its body content to `container`.
pub fn parse_into(dom: &mut Dom, container: NodeId, markup: &str) {
    let html = Html::parse_document(markup);
    let Some(body) = html
        .tree
        .root()
        .descendants()
        .find(|n| n.value().as_element().is_some_and(|e| e.name() == "body"))
    else {
        tracing::debug!(target: "consent_editor::parse", "parsed document has no body");
        return;
    };

    // Explicit stack instead of recursion; deeply nested garbage input must
    // not blow the call stack.
    let mut stack: Vec<_> = body.children().map(|c| (c, container)).collect();
    stack.reverse();

    while let Some((node, parent)) = stack.pop() {
        let id = match node.value() {
            Node::Element(el) => {
                let id = dom.create_element(el.name());
                for (name, value) in el.attrs() {
                    dom.set_attr(id, name, value);
                }
                id
            }
            Node::Text(text) => dom.create_text(&text[..]),
            Node::Comment(comment) => dom.create_comment(&comment[..]),
            _ => continue,
        };
        dom.append_child(parent, id);

        let mut children: Vec<_> = node.children().map(|c| (c, id)).collect();
        children.reverse();
        stack.extend(children);
    }
}

/// Parse `markup` into a fresh, offline tree. Returns the tree and its body
/// element.
pub fn parse_offline(markup: &str) -> (Dom, NodeId) {
    let mut dom = Dom::new();
    let body = dom.create_element("body");
    let doc = dom.document();
    dom.append_child(doc, body);
    parse_into(&mut dom, body, markup);
    (dom, body)
}

/// Parse markup into detached nodes owned by `dom`.
pub fn parse_fragment(dom: &mut Dom, markup: &str) -> Vec<NodeId> {
    let holder = dom.create_element("template");
    parse_into(dom, holder, markup);
    dom.remove_children(holder)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_drops_head_content() {
        let (dom, body) = parse_offline("<title>x</title><p class=a>hi</p>");
        assert_eq!(dom.inner_html(body), "<p class=\"a\">hi</p>");
    }

    #[test]
    fn test_parse_repairs_malformed_markup() {
        let (dom, body) = parse_offline("<p><b>bold<i>both</p>tail");
        let html = dom.inner_html(body);
        assert!(html.starts_with("<p><b>bold<i>both</i></b></p>"));
        assert!(html.contains("tail"));
    }

    #[test]
    fn test_parse_fragment_is_detached() {
        let mut dom = Dom::new();
        let nodes = parse_fragment(&mut dom, "a<br>b");
        assert_eq!(nodes.len(), 3);
        assert!(nodes.iter().all(|&n| dom.parent(n).is_none()));
    }
}
