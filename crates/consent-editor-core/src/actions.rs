//! Editor actions and keyboard input types.
//!
//! Platform-agnostic definitions for editor operations. [`EditorAction`]
//! names every operation a toolbar, dialog, pointer or keyboard handler can
//! trigger, with typed parameters, so the whole operation set can be driven
//! without a rendered surface.

use smol_str::SmolStr;

use crate::ops::CellDirection;
use crate::resize::Handle;
use crate::types::SizeClass;

/// The modal dialogs that take focus away from the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DialogKind {
    Link,
    Image,
    Table,
}

/// Raw table dialog input, as typed.
///
/// Counts and border width are parsed when the dialog is confirmed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TableInput {
    pub rows: String,
    pub cols: String,
    pub header: bool,
    pub border_color: String,
    pub border_size: String,
}

/// All possible editor actions.
///
/// These represent semantic operations on the surface, decoupled from
/// how they're triggered (toolbar, dialog buttons, pointer, keyboard).
#[derive(Debug, Clone, PartialEq)]
pub enum EditorAction {
    // === Toolbar ===
    /// Run a named formatting command (`bold`, `justifyCenter`, ...).
    Format { name: SmolStr, value: Option<String> },

    /// Put the selection under one size class.
    ApplySize(SizeClass),

    /// Strip links from the selection.
    RemoveLink,

    /// Remove the table around the selection.
    DeleteTable,

    // === Dialogs ===
    /// Open a dialog. Saves the selection before focus moves.
    OpenDialog(DialogKind),

    ConfirmLink { url: String },

    ConfirmImage { url: String },

    ConfirmTable(TableInput),

    /// Close the open dialog without applying it.
    CancelDialog,

    // === Tables ===
    /// Move to the adjacent cell (Tab / Shift+Tab).
    NavigateCell(CellDirection),

    /// Soft line break inside a cell.
    InsertLineBreak,

    // === Surface ===
    /// Re-run the sync pipeline now.
    Refresh,

    /// Pointer click on a node of the surface tree.
    Click { target: crate::dom::NodeId },

    /// The viewport scrolled or resized.
    ViewportChanged,

    // === Image resizing ===
    ResizePointerDown { handle: Handle, x: f64, y: f64 },

    ResizePointerMove { x: f64, y: f64 },

    ResizePointerUp,
}

/// Key values for keyboard input.
///
/// Platform-agnostic key representation covering the keys the editor
/// binds. Platform-specific code converts from native key events.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    /// A character key.
    Character(SmolStr),

    /// Unknown/unidentified key.
    Unidentified,

    Backspace,
    Delete,
    Enter,
    Tab,
    Escape,
    Space,

    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Home,
    End,
    PageUp,
    PageDown,

    Alt,
    Control,
    Meta,
    Shift,
}

impl Key {
    /// Create a character key.
    pub fn character(s: impl Into<SmolStr>) -> Self {
        Self::Character(s.into())
    }

    /// Map a DOM `KeyboardEvent.key` value.
    pub fn from_key_value(value: &str) -> Self {
        match value {
            "Backspace" => Self::Backspace,
            "Delete" => Self::Delete,
            "Enter" => Self::Enter,
            "Tab" => Self::Tab,
            "Escape" => Self::Escape,
            " " => Self::Space,
            "ArrowLeft" => Self::ArrowLeft,
            "ArrowRight" => Self::ArrowRight,
            "ArrowUp" => Self::ArrowUp,
            "ArrowDown" => Self::ArrowDown,
            "Home" => Self::Home,
            "End" => Self::End,
            "PageUp" => Self::PageUp,
            "PageDown" => Self::PageDown,
            "Alt" => Self::Alt,
            "Control" => Self::Control,
            "Meta" => Self::Meta,
            "Shift" => Self::Shift,
            s if s.chars().count() == 1 => Self::character(s),
            _ => Self::Unidentified,
        }
    }

    /// Check if this is a navigation key.
    pub fn is_navigation(&self) -> bool {
        matches!(
            self,
            Self::ArrowLeft
                | Self::ArrowRight
                | Self::ArrowUp
                | Self::ArrowDown
                | Self::Home
                | Self::End
                | Self::PageUp
                | Self::PageDown
        )
    }

    /// Check if this is a modifier key.
    pub fn is_modifier(&self) -> bool {
        matches!(self, Self::Alt | Self::Control | Self::Meta | Self::Shift)
    }
}

/// Modifier key state for a key combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        ctrl: false,
        alt: false,
        shift: false,
        meta: false,
    };

    pub const SHIFT: Self = Self {
        ctrl: false,
        alt: false,
        shift: true,
        meta: false,
    };
}

/// A key combination as delivered by a keydown event.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyCombo {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyCombo {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn shift(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::SHIFT,
        }
    }
}

/// Result of handling a keydown event.
#[derive(Debug, Clone, PartialEq)]
pub enum KeydownResult {
    /// Event was handled, prevent default.
    Handled,
    /// Event was not a keybinding, let platform handle it.
    NotHandled,
    /// Event should be passed through (navigation, etc.).
    PassThrough,
}
