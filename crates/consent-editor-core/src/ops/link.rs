//! Link creation and removal.

use crate::dom::{Dom, NodeId};
use crate::ops::wrap_selection;
use crate::range::{common_ancestor, intersects_node, unwrap_preserving};
use crate::types::DomRange;

pub const LINK_TARGET: &str = "_blank";
pub const LINK_REL: &str = "noopener noreferrer";

/// Link the selected content to `href` (already normalized).
///
/// A selection entirely inside an existing anchor retargets that anchor;
/// otherwise the content moves into a fresh `<a>`, dropping any anchors it
/// contained. The anchor nearest the resulting selection then gets `href`,
/// `target` and `rel` forced. Returns the new selection, or `None` when the
/// range is collapsed.
pub fn create_link(
    dom: &mut Dom,
    surface: NodeId,
    mut range: DomRange,
    href: &str,
) -> Option<DomRange> {
    if range.is_collapsed() {
        return None;
    }

    let common = common_ancestor(dom, &range);
    if enclosing_anchor(dom, surface, common).is_none() {
        let anchor = dom.create_element("a");
        range = wrap_selection(dom, &mut range, anchor, |dom, n| {
            dom.is_element_named(n, &["a"])
        });
    }

    let common = common_ancestor(dom, &range);
    if let Some(anchor) = enclosing_anchor(dom, surface, common) {
        dom.set_attr(anchor, "href", href);
        dom.set_attr(anchor, "target", LINK_TARGET);
        dom.set_attr(anchor, "rel", LINK_REL);
        tracing::debug!(target: "consent_editor::ops", %anchor, href, "linked selection");
    }
    Some(range)
}

/// Strip link semantics from the selection, keeping the linked content.
///
/// Returns the selection remapped onto the unwrapped content.
pub fn remove_link(dom: &mut Dom, surface: NodeId, mut range: DomRange) -> DomRange {
    let common = common_ancestor(dom, &range);
    let mut anchors: Vec<NodeId> = dom
        .descendants(common)
        .filter(|&n| dom.is_element_named(n, &["a"]) && intersects_node(dom, &range, n))
        .collect();
    anchors.extend(
        dom.ancestors(common)
            .take_while(|&n| n != surface)
            .filter(|&n| dom.is_element_named(n, &["a"])),
    );
    if dom.is_element_named(common, &["a"]) && common != surface {
        anchors.push(common);
    }

    for anchor in anchors {
        unwrap_preserving(dom, anchor, &mut range);
    }
    range
}

fn enclosing_anchor(dom: &Dom, surface: NodeId, node: NodeId) -> Option<NodeId> {
    dom.closest(node, &["a"])
        .filter(|&a| a != surface && dom.contains(surface, a))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::range::select_node_contents;
    use crate::types::BoundaryPoint;

    fn surface(markup: &str) -> (Dom, NodeId) {
        let mut dom = Dom::new();
        let root = dom.create_element("div");
        let doc = dom.document();
        dom.append_child(doc, root);
        dom.set_inner_html(root, markup);
        (dom, root)
    }

    #[test]
    fn test_create_link_wraps_selection() {
        let (mut dom, root) = surface("<p>visit our site today</p>");
        let text = dom.first_child(dom.first_child(root).unwrap()).unwrap();
        let range = DomRange::new(BoundaryPoint::new(text, 6), BoundaryPoint::new(text, 14));

        let after = create_link(&mut dom, root, range, "https://example.com").unwrap();
        assert_eq!(
            dom.inner_html(root),
            r#"<p>visit <a href="https://example.com" target="_blank" rel="noopener noreferrer">our site</a> today</p>"#
        );
        let anchor = dom.closest(after.start.node, &["a"]).unwrap();
        assert_eq!(after, select_node_contents(&dom, anchor));
    }

    #[test]
    fn test_create_link_inside_anchor_retargets() {
        let (mut dom, root) = surface(r#"<p><a href="https://old.example">old link</a></p>"#);
        let a = dom.first_child(dom.first_child(root).unwrap()).unwrap();
        let text = dom.first_child(a).unwrap();
        let range = DomRange::new(BoundaryPoint::new(text, 0), BoundaryPoint::new(text, 3));

        create_link(&mut dom, root, range, "https://new.example").unwrap();
        assert_eq!(
            dom.inner_html(root),
            r#"<p><a href="https://new.example" target="_blank" rel="noopener noreferrer">old link</a></p>"#
        );
    }

    #[test]
    fn test_create_link_absorbs_nested_anchors() {
        let (mut dom, root) = surface(r#"<p>a <a href="x">b</a> c</p>"#);
        let p = dom.first_child(root).unwrap();
        let range = select_node_contents(&dom, p);
        create_link(&mut dom, root, range, "https://y.example").unwrap();
        assert_eq!(dom.descendants(root).filter(|&n| dom.tag_name(n) == Some("a")).count(), 1);
        assert_eq!(dom.text_content(root), "a b c");
    }

    #[test]
    fn test_remove_link_keeps_text() {
        let (mut dom, root) = surface(r#"<p>go <a href="x">here</a> now</p>"#);
        let p = dom.first_child(root).unwrap();
        let range = select_node_contents(&dom, p);
        let after = remove_link(&mut dom, root, range);
        assert_eq!(dom.inner_html(root), "<p>go here now</p>");
        assert_eq!(after, select_node_contents(&dom, p));
    }

    #[test]
    fn test_remove_link_from_caret_inside_anchor() {
        let (mut dom, root) = surface(r#"<p><a href="x">here</a></p>"#);
        let a = dom.first_child(dom.first_child(root).unwrap()).unwrap();
        let text = dom.first_child(a).unwrap();
        remove_link(&mut dom, root, DomRange::caret(BoundaryPoint::new(text, 2)));
        assert_eq!(dom.inner_html(root), "<p>here</p>");
    }
}
