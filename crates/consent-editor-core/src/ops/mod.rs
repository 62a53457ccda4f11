//! Mutation operations on the surface tree.
//!
//! Every operation takes the tree, the surface root and the current
//! selection, mutates the tree, and reports the selection it leaves behind.
//! Nothing here touches focus or the sync pipeline; the session does that.

use std::sync::LazyLock;

use regex::Regex;

use crate::dom::{Dom, NodeId};
use crate::range::{extract_contents, insert_nodes, select_node_contents};
use crate::types::DomRange;

pub mod image;
pub mod link;
pub mod size;
pub mod table;

pub use image::insert_image;
pub use link::{create_link, remove_link};
pub use size::apply_size_class;
pub use table::{CellDirection, TableSpec, delete_table, insert_table, navigate_cell};

static LINK_SCHEME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(https?://|mailto:|tel:|data:image/)").unwrap());

static IMAGE_SCHEME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(https?://|data:image/)").unwrap());

/// Trim a link target and prefix `https://` unless it already has a
/// recognised scheme. `None` for an empty input.
pub fn normalize_link_url(url: &str) -> Option<String> {
    normalize_with(url, &LINK_SCHEME_RE)
}

/// Like [`normalize_link_url`] but only web and inline image URLs pass as-is.
pub fn normalize_image_url(url: &str) -> Option<String> {
    normalize_with(url, &IMAGE_SCHEME_RE)
}

fn normalize_with(url: &str, scheme: &Regex) -> Option<String> {
    let url = url.trim();
    if url.is_empty() {
        return None;
    }
    if scheme.is_match(url) {
        Some(url.to_string())
    } else {
        Some(format!("https://{url}"))
    }
}

/// Unwrap every element in `nodes` (and below) that `strip` matches.
///
/// `nodes` must be detached; the flattened top-level list is returned.
pub(crate) fn strip_elements(
    dom: &mut Dom,
    nodes: Vec<NodeId>,
    strip: impl Fn(&Dom, NodeId) -> bool,
) -> Vec<NodeId> {
    let holder = dom.create_element("template");
    for node in nodes {
        dom.append_child(holder, node);
    }
    let matches: Vec<NodeId> = dom
        .descendants(holder)
        .filter(|&n| dom.is_element(n) && strip(dom, n))
        .collect();
    for el in matches {
        dom.unwrap_element(el);
    }
    dom.remove_children(holder)
}

/// Move the selected content into `wrapper`, put the wrapper where the
/// content was and return the range covering the wrapper's contents.
pub(crate) fn wrap_selection(
    dom: &mut Dom,
    range: &mut DomRange,
    wrapper: NodeId,
    strip: impl Fn(&Dom, NodeId) -> bool,
) -> DomRange {
    let extracted = extract_contents(dom, range);
    for node in strip_elements(dom, extracted, strip) {
        dom.append_child(wrapper, node);
    }
    insert_nodes(dom, range, &[wrapper]);
    let inner = select_node_contents(dom, wrapper);
    *range = inner;
    inner
}
