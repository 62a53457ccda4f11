//! Platform abstraction for host-provided editor services.
//!
//! The core never touches a real page. Layout boxes, intrinsic image sizes,
//! scrolling, user notifications and native formatting commands come from
//! the host through [`EditorPlatform`]. [`HeadlessPlatform`] answers from
//! preset tables and is what the CLI and the tests run against.

use std::collections::HashMap;
use std::fmt;

use crate::dom::{Dom, NodeId};
use crate::format::{FormatCommand, FormatOutcome, apply_builtin};
use crate::types::{DomRange, Rect, Size};

/// Error type for platform operations.
#[derive(Debug, Clone)]
pub struct PlatformError(pub String);

impl fmt::Display for PlatformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for PlatformError {}

impl From<&str> for PlatformError {
    fn from(s: &str) -> Self {
        PlatformError(s.to_string())
    }
}

impl From<String> for PlatformError {
    fn from(s: String) -> Self {
        PlatformError(s)
    }
}

/// A user-visible message, shown synchronously by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    SelectTextToLink,
    NoTableSelected,
    NothingToCopy,
    Copied,
    CopyFailed(String),
    ImportFailed(String),
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::SelectTextToLink => f.write_str("Select some text to link first."),
            Notice::NoTableSelected => f.write_str("No table selected."),
            Notice::NothingToCopy => {
                f.write_str("Nothing to copy yet. Click Update first or make an edit.")
            }
            Notice::Copied => f.write_str("Copied!"),
            Notice::CopyFailed(reason) => write!(f, "Copy failed: {reason}"),
            Notice::ImportFailed(message) => f.write_str(message),
        }
    }
}

/// Host hooks the editing core calls into.
pub trait EditorPlatform {
    /// Show a message to the user.
    fn notify(&mut self, notice: Notice);

    /// Viewport-relative box of a node, if it is laid out.
    fn client_rect(&self, dom: &Dom, node: NodeId) -> Option<Rect>;

    /// Intrinsic size of an image, when known.
    fn natural_size(&self, dom: &Dom, image: NodeId) -> Option<Size>;

    /// Bring a node into view.
    fn scroll_into_view(&mut self, dom: &Dom, node: NodeId);

    /// Run a named formatting command against the selection.
    ///
    /// The default is the built-in tree formatter. Browser hosts override
    /// this to hand the command to the native editing engine.
    fn exec_format(
        &mut self,
        dom: &mut Dom,
        surface: NodeId,
        selection: Option<DomRange>,
        command: &FormatCommand,
    ) -> Result<FormatOutcome, PlatformError> {
        Ok(apply_builtin(dom, surface, selection, command))
    }
}

/// Platform with no real layout. Boxes and natural sizes are whatever the
/// caller preset; notices are collected in order.
#[derive(Debug, Clone, Default)]
pub struct HeadlessPlatform {
    rects: HashMap<NodeId, Rect>,
    natural_sizes: HashMap<NodeId, Size>,
    pub notices: Vec<Notice>,
    pub scrolled: Vec<NodeId>,
}

impl HeadlessPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_rect(&mut self, node: NodeId, rect: Rect) {
        self.rects.insert(node, rect);
    }

    pub fn set_natural_size(&mut self, image: NodeId, size: Size) {
        self.natural_sizes.insert(image, size);
    }

    pub fn last_notice(&self) -> Option<&Notice> {
        self.notices.last()
    }
}

impl EditorPlatform for HeadlessPlatform {
    fn notify(&mut self, notice: Notice) {
        tracing::info!(target: "consent_editor::platform", "{notice}");
        self.notices.push(notice);
    }

    fn client_rect(&self, _dom: &Dom, node: NodeId) -> Option<Rect> {
        self.rects.get(&node).copied()
    }

    fn natural_size(&self, _dom: &Dom, image: NodeId) -> Option<Size> {
        self.natural_sizes.get(&image).copied()
    }

    fn scroll_into_view(&mut self, _dom: &Dom, node: NodeId) {
        self.scrolled.push(node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_text() {
        assert_eq!(Notice::NoTableSelected.to_string(), "No table selected.");
        assert_eq!(
            Notice::CopyFailed("denied".into()).to_string(),
            "Copy failed: denied"
        );
    }

    #[test]
    fn test_headless_rects() {
        let mut dom = Dom::new();
        let img = dom.create_element("img");
        let mut platform = HeadlessPlatform::new();
        assert_eq!(platform.client_rect(&dom, img), None);
        platform.set_rect(img, Rect::new(10.0, 20.0, 100.0, 50.0));
        assert_eq!(
            platform.client_rect(&dom, img),
            Some(Rect::new(10.0, 20.0, 100.0, 50.0))
        );
    }
}
