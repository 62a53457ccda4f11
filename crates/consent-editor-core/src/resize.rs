//! Image resize overlay.
//!
//! A small state machine: hidden, bound to one image, or dragging one of
//! the four corner handles. Resizing is uniform: width follows the pointer's
//! horizontal travel and height is derived from a fixed aspect ratio.

use std::fmt;
use std::str::FromStr;

use crate::dom::{Dom, NodeId};
use crate::style::format_px;
use crate::types::{Rect, Size};

/// Corner handle of the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handle {
    Nw,
    Ne,
    Sw,
    Se,
}

impl Handle {
    pub const ALL: [Handle; 4] = [Handle::Nw, Handle::Ne, Handle::Sw, Handle::Se];

    /// Right-side handles grow with rightward travel, left-side ones with
    /// leftward travel.
    fn is_right(self) -> bool {
        matches!(self, Handle::Ne | Handle::Se)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Handle::Nw => "nw",
            Handle::Ne => "ne",
            Handle::Sw => "sw",
            Handle::Se => "se",
        }
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Handle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Handle::ALL
            .into_iter()
            .find(|h| h.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown resize handle: {s}"))
    }
}

/// An in-progress drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragState {
    pub handle: Handle,
    pub start_x: f64,
    pub start_y: f64,
    pub start_width: f64,
    pub start_height: f64,
    pub aspect: f64,
    pub width: f64,
}

impl DragState {
    pub fn height(&self) -> f64 {
        self.width / self.aspect
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum OverlayState {
    #[default]
    Hidden,
    Bound { image: NodeId },
    Dragging { image: NodeId, drag: DragState },
}

/// Size written onto the image when a drag ends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeCommit {
    pub image: NodeId,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone)]
pub struct ResizeOverlay {
    state: OverlayState,
    /// Where the overlay box is drawn, viewport-relative.
    rect: Option<Rect>,
    min_width: f64,
}

impl ResizeOverlay {
    pub fn new(min_width: f64) -> Self {
        Self {
            state: OverlayState::Hidden,
            rect: None,
            min_width,
        }
    }

    pub fn state(&self) -> OverlayState {
        self.state
    }

    pub fn rect(&self) -> Option<Rect> {
        self.rect
    }

    pub fn is_visible(&self) -> bool {
        self.state != OverlayState::Hidden
    }

    pub fn image(&self) -> Option<NodeId> {
        match self.state {
            OverlayState::Hidden => None,
            OverlayState::Bound { image } | OverlayState::Dragging { image, .. } => Some(image),
        }
    }

    pub fn drag(&self) -> Option<&DragState> {
        match &self.state {
            OverlayState::Dragging { drag, .. } => Some(drag),
            _ => None,
        }
    }

    /// Track `image`, drawn over `rect`.
    pub fn bind(&mut self, image: NodeId, rect: Option<Rect>) {
        tracing::trace!(target: "consent_editor::resize", %image, ?rect, "bound overlay");
        self.state = OverlayState::Bound { image };
        self.rect = rect;
    }

    pub fn hide(&mut self) {
        if self.is_visible() {
            tracing::trace!(target: "consent_editor::resize", "hid overlay");
        }
        self.state = OverlayState::Hidden;
        self.rect = None;
    }

    /// Follow the tracked image after scroll, resize or content changes.
    /// An image that left the surface hides the overlay.
    pub fn reposition(&mut self, dom: &Dom, surface: NodeId, rect: impl FnOnce(NodeId) -> Option<Rect>) {
        let Some(image) = self.image() else {
            return;
        };
        if !dom.contains(surface, image) {
            self.hide();
            return;
        }
        if self.drag().is_none() {
            self.rect = rect(image);
        }
    }

    /// Start dragging `handle`. Inert without a bound image.
    pub fn pointer_down(&mut self, handle: Handle, x: f64, y: f64, natural: Option<Size>) -> bool {
        let Some(image) = self.image() else {
            tracing::debug!(target: "consent_editor::resize", "pointer down with no image, ignored");
            return false;
        };
        let rect = self.rect.unwrap_or_default();
        let aspect = match natural {
            Some(n) if n.width > 0.0 && n.height > 0.0 => n.width / n.height,
            _ => rect.width / rect.height.max(1.0),
        };
        // A zero-width box has no usable ratio either.
        let aspect = if aspect > 0.0 { aspect } else { 1.0 };
        let drag = DragState {
            handle,
            start_x: x,
            start_y: y,
            start_width: rect.width,
            start_height: rect.height,
            aspect,
            width: rect.width,
        };
        self.state = OverlayState::Dragging { image, drag };
        true
    }

    /// Update the preview box. Returns the previewed size while dragging.
    pub fn pointer_move(&mut self, x: f64, _y: f64) -> Option<Size> {
        let OverlayState::Dragging { drag, .. } = &mut self.state else {
            return None;
        };
        let dx = x - drag.start_x;
        let width = if drag.handle.is_right() {
            drag.start_width + dx
        } else {
            drag.start_width - dx
        };
        drag.width = width.max(self.min_width);
        let size = Size::new(drag.width, drag.height());
        if let Some(rect) = &mut self.rect {
            rect.width = size.width;
            rect.height = size.height;
        }
        Some(size)
    }

    /// End the drag and write the size onto the image.
    ///
    /// The drag is dropped regardless; nothing is committed if the image is
    /// no longer inside `surface`.
    pub fn pointer_up(&mut self, dom: &mut Dom, surface: NodeId) -> Option<ResizeCommit> {
        let OverlayState::Dragging { image, drag } = self.state else {
            return None;
        };
        self.state = OverlayState::Bound { image };
        if !dom.contains(surface, image) {
            self.hide();
            return None;
        }

        dom.set_style_property(image, "display", "inline-block");
        dom.set_style_property(image, "width", &format_px(drag.width));
        dom.set_style_property(image, "height", "auto");
        tracing::debug!(target: "consent_editor::resize", %image, width = drag.width, "committed resize");
        Some(ResizeCommit {
            image,
            width: drag.width,
            height: drag.height(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (Dom, NodeId, NodeId) {
        let mut dom = Dom::new();
        let surface = dom.create_element("div");
        let doc = dom.document();
        dom.append_child(doc, surface);
        dom.set_inner_html(
            surface,
            r#"<p><img src="https://example.com/a.png" style="max-width: 100%; height: auto;"></p>"#,
        );
        let img = dom
            .descendants(surface)
            .find(|&n| dom.tag_name(n) == Some("img"))
            .unwrap();
        (dom, surface, img)
    }

    #[test]
    fn test_se_drag_keeps_aspect() {
        let (mut dom, surface, img) = setup();
        let mut overlay = ResizeOverlay::new(40.0);
        overlay.bind(img, Some(Rect::new(0.0, 0.0, 100.0, 50.0)));

        assert!(overlay.pointer_down(Handle::Se, 100.0, 50.0, None));
        assert_eq!(overlay.pointer_move(140.0, 80.0), Some(Size::new(140.0, 70.0)));
        let commit = overlay.pointer_up(&mut dom, surface).unwrap();
        assert_eq!((commit.width, commit.height), (140.0, 70.0));
        assert_eq!(
            dom.attr(img, "style"),
            Some("max-width: 100%; height: auto; display: inline-block; width: 140px;")
        );
        assert_eq!(overlay.state(), OverlayState::Bound { image: img });
    }

    #[test]
    fn test_left_handles_grow_leftwards_with_floor() {
        let (_dom, _surface, img) = setup();
        let mut overlay = ResizeOverlay::new(40.0);
        overlay.bind(img, Some(Rect::new(0.0, 0.0, 100.0, 50.0)));
        overlay.pointer_down(Handle::Nw, 0.0, 0.0, Some(Size::new(400.0, 100.0)));
        assert_eq!(overlay.pointer_move(-20.0, 0.0), Some(Size::new(120.0, 30.0)));
        assert_eq!(overlay.pointer_move(500.0, 0.0), Some(Size::new(40.0, 10.0)));
    }

    #[test]
    fn test_drag_without_image_is_inert() {
        let (mut dom, surface, _img) = setup();
        let mut overlay = ResizeOverlay::new(40.0);
        assert!(!overlay.pointer_down(Handle::Se, 0.0, 0.0, None));
        assert_eq!(overlay.pointer_move(10.0, 0.0), None);
        assert_eq!(overlay.pointer_up(&mut dom, surface), None);
    }

    #[test]
    fn test_removed_image_discards_drag() {
        let (mut dom, surface, img) = setup();
        let mut overlay = ResizeOverlay::new(40.0);
        overlay.bind(img, Some(Rect::new(0.0, 0.0, 100.0, 50.0)));
        overlay.pointer_down(Handle::Ne, 0.0, 0.0, None);
        let p = dom.parent(img).unwrap();
        dom.detach(p);
        assert_eq!(overlay.pointer_up(&mut dom, surface), None);
        assert_eq!(overlay.state(), OverlayState::Hidden);
    }

    #[test]
    fn test_reposition_follows_image() {
        let (mut dom, surface, img) = setup();
        let mut overlay = ResizeOverlay::new(40.0);
        overlay.bind(img, Some(Rect::new(0.0, 0.0, 100.0, 50.0)));
        overlay.reposition(&dom, surface, |_| Some(Rect::new(0.0, -30.0, 100.0, 50.0)));
        assert_eq!(overlay.rect(), Some(Rect::new(0.0, -30.0, 100.0, 50.0)));

        dom.set_inner_html(surface, "<p>gone</p>");
        overlay.reposition(&dom, surface, |_| None);
        assert!(!overlay.is_visible());
    }

    #[test]
    fn test_handle_parsing() {
        assert_eq!("SE".parse::<Handle>(), Ok(Handle::Se));
        assert!("n".parse::<Handle>().is_err());
    }
}
