//! Core editor types: boundary points, ranges, size classes and geometry.
//!
//! These types are framework-agnostic; positions refer to nodes in a
//! [`Dom`](crate::dom::Dom).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::dom::NodeId;

/// A position inside the tree.
///
/// For text and comment nodes `offset` counts characters (NOT bytes!);
/// for elements it counts children.
#[derive(Clone, Debug, Copy, PartialEq, Eq, Hash)]
pub struct BoundaryPoint {
    pub node: NodeId,
    pub offset: usize,
}

impl BoundaryPoint {
    pub fn new(node: NodeId, offset: usize) -> Self {
        Self { node, offset }
    }
}

/// A range between two boundary points, start before end in tree order.
///
/// A collapsed range is a caret. The live selection is an
/// `Option<DomRange>`, `None` meaning no selection at all.
#[derive(Clone, Debug, Copy, PartialEq, Eq)]
pub struct DomRange {
    pub start: BoundaryPoint,
    pub end: BoundaryPoint,
}

impl DomRange {
    pub fn new(start: BoundaryPoint, end: BoundaryPoint) -> Self {
        Self { start, end }
    }

    /// Create a collapsed range (caret) at the given point.
    pub fn caret(point: BoundaryPoint) -> Self {
        Self {
            start: point,
            end: point,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }

    /// Collapse onto one of the endpoints.
    pub fn collapse(&mut self, to_start: bool) {
        if to_start {
            self.end = self.start;
        } else {
            self.start = self.end;
        }
    }

    pub fn collapsed(mut self, to_start: bool) -> Self {
        self.collapse(to_start);
        self
    }

    /// Both endpoint nodes, for validity checks.
    pub fn endpoints(&self) -> [NodeId; 2] {
        [self.start.node, self.end.node]
    }
}

/// The closed set of font-size markers applied as classes on inline wrappers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SizeClass {
    Normal,
    Smaller,
    Smallest,
    Larger,
    Largest,
}

impl SizeClass {
    /// Stylesheet order used by the preview and export documents.
    pub const ALL: [SizeClass; 5] = [
        SizeClass::Smallest,
        SizeClass::Smaller,
        SizeClass::Normal,
        SizeClass::Larger,
        SizeClass::Largest,
    ];

    pub fn class_name(self) -> &'static str {
        match self {
            SizeClass::Normal => "size-normal",
            SizeClass::Smaller => "size-smaller",
            SizeClass::Smallest => "size-smallest",
            SizeClass::Larger => "size-larger",
            SizeClass::Largest => "size-largest",
        }
    }

    pub fn font_size(self) -> &'static str {
        match self {
            SizeClass::Smallest => ".75rem",
            SizeClass::Smaller => ".875rem",
            SizeClass::Normal => "1rem",
            SizeClass::Larger => "1.125rem",
            SizeClass::Largest => "1.25rem",
        }
    }

    pub fn from_class_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.class_name() == name)
    }

    /// The five rules on one line, e.g. `.size-smallest{font-size:.75rem}...`.
    pub fn stylesheet() -> String {
        Self::ALL
            .iter()
            .map(|c| format!(".{}{{font-size:{}}}", c.class_name(), c.font_size()))
            .collect()
    }
}

impl fmt::Display for SizeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.class_name())
    }
}

impl FromStr for SizeClass {
    type Err = String;

    /// Accepts both `size-larger` and bare `larger`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::from_class_name(s)
            .or_else(|| Self::from_class_name(&format!("size-{s}")))
            .ok_or_else(|| format!("unknown size class: {s}"))
    }
}

/// Viewport-relative box, in CSS pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }
}

/// Intrinsic size of an image, when the host knows it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Dom;

    #[test]
    fn test_range_collapse() {
        let mut dom = Dom::new();
        let p = dom.create_element("p");
        let range = DomRange::new(BoundaryPoint::new(p, 0), BoundaryPoint::new(p, 2));
        assert!(!range.is_collapsed());
        let caret = range.collapsed(false);
        assert!(caret.is_collapsed());
        assert_eq!(caret.start, BoundaryPoint::new(p, 2));
        assert_eq!(range.collapsed(true).end, BoundaryPoint::new(p, 0));
    }

    #[test]
    fn test_size_class_parsing() {
        assert_eq!("size-larger".parse(), Ok(SizeClass::Larger));
        assert_eq!("smallest".parse(), Ok(SizeClass::Smallest));
        assert!("size-huge".parse::<SizeClass>().is_err());
    }

    #[test]
    fn test_size_stylesheet_order() {
        assert_eq!(
            SizeClass::stylesheet(),
            ".size-smallest{font-size:.75rem}.size-smaller{font-size:.875rem}.size-normal{font-size:1rem}.size-larger{font-size:1.125rem}.size-largest{font-size:1.25rem}"
        );
    }
}
