//! Range primitives over the arena tree.
//!
//! These mirror the DOM `Range` operations the editing core relies on:
//! tree-order comparison, containment, `extractContents`, `insertNode`.
//! Operations that mutate the tree also update the range passed to them, the
//! way a live DOM range would be updated.

use std::cmp::Ordering;

use crate::dom::{Dom, NodeId};
use crate::types::{BoundaryPoint, DomRange};

/// Child-index path from the tree root down to `node`.
fn path_to(dom: &Dom, node: NodeId) -> Vec<usize> {
    let mut path = Vec::new();
    let mut current = node;
    while let Some(idx) = dom.index_of(current) {
        path.push(idx);
        match dom.parent(current) {
            Some(parent) => current = parent,
            None => break,
        }
    }
    path.reverse();
    path
}

/// Tree-order comparison of two boundary points in the same tree.
///
/// A point expressed as `(parent, i)` sorts before anything inside child `i`,
/// which is exactly lexicographic order on `path ++ [offset]`.
pub fn compare_points(dom: &Dom, a: BoundaryPoint, b: BoundaryPoint) -> Ordering {
    if a.node == b.node {
        return a.offset.cmp(&b.offset);
    }
    let mut pa = path_to(dom, a.node);
    pa.push(a.offset);
    let mut pb = path_to(dom, b.node);
    pb.push(b.offset);
    pa.cmp(&pb)
}

/// Order the endpoints so that `start <= end`.
pub fn normalized(dom: &Dom, range: DomRange) -> DomRange {
    if compare_points(dom, range.start, range.end) == Ordering::Greater {
        DomRange::new(range.end, range.start)
    } else {
        range
    }
}

pub fn point_is_valid(dom: &Dom, point: BoundaryPoint) -> bool {
    point.offset <= dom.node_length(point.node)
}

/// Both endpoints are inclusive descendants of `root` and in bounds.
pub fn is_within(dom: &Dom, range: &DomRange, root: NodeId) -> bool {
    range
        .endpoints()
        .iter()
        .all(|&n| dom.contains(root, n))
        && point_is_valid(dom, range.start)
        && point_is_valid(dom, range.end)
}

/// Deepest node that is an inclusive ancestor of both endpoints.
pub fn common_ancestor(dom: &Dom, range: &DomRange) -> NodeId {
    let mut candidate = range.start.node;
    loop {
        if dom.contains(candidate, range.end.node) {
            return candidate;
        }
        match dom.parent(candidate) {
            Some(parent) => candidate = parent,
            None => return candidate,
        }
    }
}

/// Point just before `node` in its parent.
pub fn point_before(dom: &Dom, node: NodeId) -> Option<BoundaryPoint> {
    Some(BoundaryPoint::new(dom.parent(node)?, dom.index_of(node)?))
}

/// Point just after `node` in its parent.
pub fn point_after(dom: &Dom, node: NodeId) -> Option<BoundaryPoint> {
    Some(BoundaryPoint::new(dom.parent(node)?, dom.index_of(node)? + 1))
}

/// Range spanning all content of `node`.
pub fn select_node_contents(dom: &Dom, node: NodeId) -> DomRange {
    DomRange::new(
        BoundaryPoint::new(node, 0),
        BoundaryPoint::new(node, dom.node_length(node)),
    )
}

/// `node` lies entirely inside the range.
pub fn contains_node(dom: &Dom, range: &DomRange, node: NodeId) -> bool {
    compare_points(dom, BoundaryPoint::new(node, 0), range.start) == Ordering::Greater
        && compare_points(dom, BoundaryPoint::new(node, dom.node_length(node)), range.end)
            == Ordering::Less
}

/// `node` overlaps the range at all.
pub fn intersects_node(dom: &Dom, range: &DomRange, node: NodeId) -> bool {
    let (Some(before), Some(after)) = (point_before(dom, node), point_after(dom, node)) else {
        return true;
    };
    compare_points(dom, before, range.end) == Ordering::Less
        && compare_points(dom, after, range.start) == Ordering::Greater
}

/// `point` is the first position inside `el`: offset zero on `el` or on a
/// first-child chain below it.
pub fn is_at_start_of(dom: &Dom, point: BoundaryPoint, el: NodeId) -> bool {
    if point.offset != 0 {
        return false;
    }
    let mut node = point.node;
    while node != el {
        let Some(parent) = dom.parent(node) else {
            return false;
        };
        if dom.first_child(parent) != Some(node) {
            return false;
        }
        node = parent;
    }
    true
}

/// `point` is the last position inside `el`.
pub fn is_at_end_of(dom: &Dom, point: BoundaryPoint, el: NodeId) -> bool {
    if point.offset != dom.node_length(point.node) {
        return false;
    }
    let mut node = point.node;
    while node != el {
        let Some(parent) = dom.parent(node) else {
            return false;
        };
        if dom.last_child(parent) != Some(node) {
            return false;
        }
        node = parent;
    }
    true
}

/// The range covers every position inside `el`.
pub fn covers_contents_of(dom: &Dom, range: &DomRange, el: NodeId) -> bool {
    let inner = select_node_contents(dom, el);
    let starts_before = is_at_start_of(dom, range.start, el)
        || compare_points(dom, range.start, inner.start) != Ordering::Greater;
    let ends_after = is_at_end_of(dom, range.end, el)
        || compare_points(dom, range.end, inner.end) != Ordering::Less;
    starts_before && ends_after
}

fn char_byte_index(text: &str, char_offset: usize) -> usize {
    text.char_indices()
        .nth(char_offset)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}

/// Characters `start..end` of `text`.
pub fn char_slice(text: &str, start: usize, end: usize) -> &str {
    let s = char_byte_index(text, start);
    let e = char_byte_index(text, end.max(start));
    &text[s..e]
}

/// Replace characters `start..end` of a character-data node.
fn replace_data(dom: &mut Dom, node: NodeId, start: usize, end: usize, with: &str) {
    let Some(data) = dom.character_data(node) else {
        return;
    };
    let s = char_byte_index(data, start);
    let e = char_byte_index(data, end.max(start));
    let mut updated = String::with_capacity(data.len());
    updated.push_str(&data[..s]);
    updated.push_str(with);
    updated.push_str(&data[e..]);
    dom.set_character_data(node, updated);
}

/// Split a text node at `offset`; the tail becomes a new next sibling.
pub fn split_text(dom: &mut Dom, node: NodeId, offset: usize) -> NodeId {
    let data = dom.character_data(node).unwrap_or_default().to_string();
    let len = data.chars().count();
    let tail = dom.create_text(char_slice(&data, offset, len));
    replace_data(dom, node, offset, len, "");
    if let Some(parent) = dom.parent(node) {
        let reference = dom.next_sibling(node);
        dom.insert_before(parent, tail, reference);
    }
    tail
}

/// Child of `ancestor` that is an inclusive ancestor of `node`.
fn child_toward(dom: &Dom, ancestor: NodeId, node: NodeId) -> Option<NodeId> {
    let mut current = node;
    loop {
        let parent = dom.parent(current)?;
        if parent == ancestor {
            return Some(current);
        }
        current = parent;
    }
}

/// Move the range's content out of the tree.
///
/// Returns the extracted top-level nodes (detached, in order). Partially
/// selected containers are cloned shallowly so the extracted fragment keeps
/// its structure. The range collapses to where the content was.
pub fn extract_contents(dom: &mut Dom, range: &mut DomRange) -> Vec<NodeId> {
    let mut fragment = Vec::new();
    if range.is_collapsed() {
        return fragment;
    }
    let start = range.start;
    let end = range.end;

    if start.node == end.node && dom.is_character_data(start.node) {
        let data = dom.character_data(start.node).unwrap_or_default().to_string();
        let clone = dom.shallow_clone(start.node);
        dom.set_character_data(clone, char_slice(&data, start.offset, end.offset).to_string());
        replace_data(dom, start.node, start.offset, end.offset, "");
        fragment.push(clone);
        range.collapse(true);
        return fragment;
    }

    let common = common_ancestor(dom, range);
    let first_partial = if dom.contains(start.node, end.node) {
        None
    } else {
        child_toward(dom, common, start.node)
    };
    let last_partial = if dom.contains(end.node, start.node) {
        None
    } else {
        child_toward(dom, common, end.node)
    };
    let contained: Vec<NodeId> = dom
        .children(common)
        .iter()
        .copied()
        .filter(|&c| contains_node(dom, range, c))
        .collect();

    let new_point = if dom.contains(start.node, end.node) {
        start
    } else {
        let mut reference = start.node;
        while let Some(parent) = dom.parent(reference) {
            if dom.contains(parent, end.node) {
                break;
            }
            reference = parent;
        }
        point_after(dom, reference).unwrap_or(start)
    };

    if let Some(first) = first_partial {
        if dom.is_character_data(first) {
            let data = dom.character_data(first).unwrap_or_default().to_string();
            let len = data.chars().count();
            let clone = dom.shallow_clone(first);
            dom.set_character_data(clone, char_slice(&data, start.offset, len).to_string());
            replace_data(dom, first, start.offset, len, "");
            fragment.push(clone);
        } else {
            let clone = dom.shallow_clone(first);
            let mut sub = DomRange::new(start, BoundaryPoint::new(first, dom.node_length(first)));
            for node in extract_contents(dom, &mut sub) {
                dom.append_child(clone, node);
            }
            fragment.push(clone);
        }
    }

    for node in contained {
        dom.detach(node);
        fragment.push(node);
    }

    if let Some(last) = last_partial {
        if dom.is_character_data(last) {
            let data = dom.character_data(last).unwrap_or_default().to_string();
            let clone = dom.shallow_clone(last);
            dom.set_character_data(clone, char_slice(&data, 0, end.offset).to_string());
            replace_data(dom, last, 0, end.offset, "");
            fragment.push(clone);
        } else {
            let clone = dom.shallow_clone(last);
            let mut sub = DomRange::new(BoundaryPoint::new(last, 0), end);
            for node in extract_contents(dom, &mut sub) {
                dom.append_child(clone, node);
            }
            fragment.push(clone);
        }
    }

    *range = DomRange::caret(new_point);
    fragment
}

/// Remove the range's content; the range collapses in place.
pub fn delete_contents(dom: &mut Dom, range: &mut DomRange) {
    extract_contents(dom, range);
}

/// Insert `nodes` at the range start, splitting a text node if needed.
///
/// A collapsed range grows to cover the inserted nodes, as with DOM
/// `insertNode`. Returns the insertion parent and index of the first node.
pub fn insert_nodes(
    dom: &mut Dom,
    range: &mut DomRange,
    nodes: &[NodeId],
) -> Option<(NodeId, usize)> {
    let start = range.start;
    let was_collapsed = range.is_collapsed();

    let (parent, index) = if dom.is_character_data(start.node) {
        let parent = dom.parent(start.node)?;
        let node_index = dom.index_of(start.node)?;
        let len = dom.node_length(start.node);
        if start.offset == 0 {
            (parent, node_index)
        } else if start.offset >= len {
            (parent, node_index + 1)
        } else {
            let tail = split_text(dom, start.node, start.offset);
            if range.end.node == start.node && range.end.offset > start.offset {
                range.end = BoundaryPoint::new(tail, range.end.offset - start.offset);
            } else if range.end.node == parent && range.end.offset > node_index {
                range.end.offset += 1;
            }
            (parent, node_index + 1)
        }
    } else {
        (start.node, start.offset.min(dom.node_length(start.node)))
    };

    for (i, &node) in nodes.iter().enumerate() {
        dom.insert_child(parent, index + i, node);
    }

    if was_collapsed {
        range.end = BoundaryPoint::new(parent, index + nodes.len());
        if dom.is_character_data(start.node) && start.offset == 0 {
            range.start = BoundaryPoint::new(parent, index);
        }
    } else if range.end.node == parent && range.end.offset > index {
        range.end.offset += nodes.len();
    }

    Some((parent, index))
}

/// Replace the range content with `text` and collapse after it.
///
/// Text typed into an existing text node extends it in place.
pub fn insert_text(dom: &mut Dom, range: &mut DomRange, text: &str) -> Option<()> {
    delete_contents(dom, range);
    let at = range.start;
    if dom.is_text(at.node) {
        let offset = at.offset.min(dom.node_length(at.node));
        replace_data(dom, at.node, offset, offset, text);
        *range = DomRange::caret(BoundaryPoint::new(at.node, offset + text.chars().count()));
        return Some(());
    }
    let node = dom.create_text(text);
    insert_nodes(dom, range, &[node])?;
    *range = DomRange::caret(BoundaryPoint::new(node, dom.node_length(node)));
    Some(())
}

/// Unwrap `el`, keeping `range` pointing at the same content.
pub fn unwrap_preserving(dom: &mut Dom, el: NodeId, range: &mut DomRange) {
    let (Some(parent), Some(index)) = (dom.parent(el), dom.index_of(el)) else {
        return;
    };
    let count = dom.node_length(el);
    let fix = |p: BoundaryPoint| -> BoundaryPoint {
        if p.node == el {
            BoundaryPoint::new(parent, index + p.offset)
        } else if p.node == parent && p.offset > index {
            BoundaryPoint::new(parent, p.offset + count - 1)
        } else {
            p
        }
    };
    range.start = fix(range.start);
    range.end = fix(range.end);
    dom.unwrap_element(el);
}
