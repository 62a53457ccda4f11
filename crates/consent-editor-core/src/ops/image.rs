//! Image insertion at the caret.

use crate::dom::{Dom, NodeId};
use crate::ops::normalize_image_url;
use crate::range::{insert_nodes, point_after};
use crate::types::{BoundaryPoint, DomRange};

pub const IMAGE_STYLE: &str = "max-width: 100%; height: auto;";

/// Result of [`insert_image`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertedImage {
    pub image: NodeId,
    pub wrapper: NodeId,
    pub selection: DomRange,
}

/// Insert an image wrapped in its own paragraph.
///
/// With a selection inside the surface the wrapper goes at the selection's
/// end and the caret lands right after it. Without one the wrapper is
/// appended to the surface and the caret goes to the end. An empty url
/// inserts nothing.
pub fn insert_image(
    dom: &mut Dom,
    surface: NodeId,
    selection: Option<DomRange>,
    url: &str,
) -> Option<InsertedImage> {
    let src = normalize_image_url(url)?;

    let image = dom.create_element("img");
    dom.set_attr(image, "src", &src);
    dom.set_attr(image, "alt", "");
    dom.set_attr(image, "style", IMAGE_STYLE);
    let wrapper = dom.create_element("p");
    dom.append_child(wrapper, image);

    let placed = selection.and_then(|range| {
        let mut range = range.collapsed(false);
        insert_nodes(dom, &mut range, &[wrapper])?;
        point_after(dom, wrapper)
    });
    let caret = match placed {
        Some(after) => after,
        None => {
            dom.append_child(surface, wrapper);
            BoundaryPoint::new(surface, dom.node_length(surface))
        }
    };

    tracing::debug!(target: "consent_editor::ops", %image, src, "inserted image");
    Some(InsertedImage {
        image,
        wrapper,
        selection: DomRange::caret(caret),
    })
}
