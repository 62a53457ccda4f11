//! Size classes on inline wrappers.

use std::collections::HashSet;

use crate::dom::{Dom, NodeId};
use crate::ops::strip_elements;
use crate::range::{
    common_ancestor, covers_contents_of, extract_contents, insert_nodes, is_within,
    select_node_contents,
};
use crate::types::{DomRange, SizeClass};

/// Put the selection under exactly one size class.
///
/// The content moves into a new `<span>` carrying `class` and nothing else
/// from the size set; size spans inside the moved content give up their
/// size classes (and disappear when that leaves them bare). A selection that
/// already spans a whole size span reuses it. Returns the range over the
/// wrapper's contents, or `None` for a collapsed or out-of-surface range.
pub fn apply_size_class(
    dom: &mut Dom,
    surface: NodeId,
    mut range: DomRange,
    class: SizeClass,
) -> Option<DomRange> {
    if range.is_collapsed() || !is_within(dom, &range, surface) {
        return None;
    }

    if let Some(span) = existing_size_span(dom, surface, &range) {
        set_only_class(dom, span, class);
        return Some(select_node_contents(dom, span));
    }

    let extracted = extract_contents(dom, &mut range);
    let holder = dom.create_element("template");
    for node in extracted {
        dom.append_child(holder, node);
    }
    let sized: Vec<NodeId> = dom
        .descendants(holder)
        .filter(|&n| has_size_class(dom, n))
        .collect();
    let mut bare = HashSet::new();
    for span in sized {
        clear_size_classes(dom, span);
        if dom.is_element_named(span, &["span"])
            && dom.element(span).is_some_and(|el| el.attrs.is_empty())
        {
            bare.insert(span);
        }
    }
    let moved = dom.remove_children(holder);

    let wrapper = dom.create_element("span");
    for node in strip_elements(dom, moved, |_, n| bare.contains(&n)) {
        dom.append_child(wrapper, node);
    }
    set_only_class(dom, wrapper, class);
    insert_nodes(dom, &mut range, &[wrapper])?;

    tracing::debug!(target: "consent_editor::ops", %wrapper, %class, "applied size class");
    Some(select_node_contents(dom, wrapper))
}

fn existing_size_span(dom: &Dom, surface: NodeId, range: &DomRange) -> Option<NodeId> {
    let common = common_ancestor(dom, range);
    std::iter::once(common)
        .chain(dom.ancestors(common))
        .take_while(|&n| n != surface)
        .find(|&n| dom.is_element_named(n, &["span"]) && has_size_class(dom, n))
        .filter(|&span| covers_contents_of(dom, range, span))
}

fn has_size_class(dom: &Dom, node: NodeId) -> bool {
    dom.classes(node)
        .iter()
        .any(|c| SizeClass::from_class_name(c).is_some())
}

fn clear_size_classes(dom: &mut Dom, node: NodeId) {
    for size in SizeClass::ALL {
        dom.remove_class(node, size.class_name());
    }
}

fn set_only_class(dom: &mut Dom, node: NodeId, class: SizeClass) {
    clear_size_classes(dom, node);
    dom.add_class(node, class.class_name());
}
