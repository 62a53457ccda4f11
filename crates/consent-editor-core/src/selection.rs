//! Selection tracking across focus changes.
//!
//! The tracker owns the live selection, the single saved snapshot and the
//! focus flag. Losing focus clears the live selection (as a browser does
//! when a dialog input takes focus), so callers must `save` first.

use crate::dom::{Dom, NodeId};
use crate::range::{is_within, normalized};
use crate::types::{BoundaryPoint, DomRange};

/// Where input focus currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    Surface,
    #[default]
    Elsewhere,
}

#[derive(Debug, Clone)]
pub struct SelectionTracker {
    surface: NodeId,
    live: Option<DomRange>,
    saved: Option<DomRange>,
    focus: Focus,
}

impl SelectionTracker {
    pub fn new(surface: NodeId) -> Self {
        Self {
            surface,
            live: None,
            saved: None,
            focus: Focus::Elsewhere,
        }
    }

    pub fn surface(&self) -> NodeId {
        self.surface
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn has_focus(&self) -> bool {
        self.focus == Focus::Surface
    }

    /// The live selection as the host reported it, valid or not.
    pub fn live(&self) -> Option<DomRange> {
        self.live
    }

    /// The live selection if both endpoints are still inside the surface.
    pub fn live_in_surface(&self, dom: &Dom) -> Option<DomRange> {
        self.live.filter(|r| is_within(dom, r, self.surface))
    }

    pub fn saved(&self) -> Option<DomRange> {
        self.saved
    }

    /// Replace the live selection. Endpoints are put in tree order.
    pub fn set_live(&mut self, dom: &Dom, range: Option<DomRange>) {
        self.live = range.map(|r| normalized(dom, r));
    }

    pub fn focus_surface(&mut self) {
        self.focus = Focus::Surface;
    }

    /// Focus moves elsewhere; the live selection goes with it.
    pub fn blur(&mut self) {
        self.focus = Focus::Elsewhere;
        self.live = None;
    }

    /// Snapshot the live selection if it lies inside the surface, otherwise
    /// record that there is nothing to restore. Returns whether a range was
    /// captured.
    pub fn save(&mut self, dom: &Dom) -> bool {
        self.saved = self.live_in_surface(dom);
        tracing::trace!(
            target: "consent_editor::selection",
            saved = ?self.saved,
            "saved selection"
        );
        self.saved.is_some()
    }

    pub fn clear_saved(&mut self) {
        self.saved = None;
    }

    /// Focus the surface and reinstate the saved selection.
    ///
    /// A missing or invalidated snapshot falls back to a caret at the end of
    /// the surface and returns `false`. Either way the surface ends up
    /// focused with a live selection. The snapshot is consumed.
    pub fn restore(&mut self, dom: &Dom) -> bool {
        self.focus_surface();
        match self.saved.take() {
            Some(range) if is_within(dom, &range, self.surface) => {
                tracing::trace!(target: "consent_editor::selection", ?range, "restored selection");
                self.live = Some(range);
                true
            }
            stale => {
                tracing::trace!(
                    target: "consent_editor::selection",
                    stale = stale.is_some(),
                    "no usable saved selection, caret to end"
                );
                self.place_caret_at_end(dom, self.surface);
                false
            }
        }
    }

    /// Collapse the live selection after the last content of `node`.
    pub fn place_caret_at_end(&mut self, dom: &Dom, node: NodeId) {
        self.live = Some(DomRange::caret(BoundaryPoint::new(
            node,
            dom.node_length(node),
        )));
    }

    pub fn select(&mut self, range: DomRange) {
        self.live = Some(range);
    }
}
