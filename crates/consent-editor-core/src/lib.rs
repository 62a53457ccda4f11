//! consent-editor-core: the sanitize-and-edit core of a rich-text editor,
//! without framework dependencies.
//!
//! This crate provides:
//! - `Dom` - an owned, mutable markup tree standing in for the live surface
//! - `sanitize` - denylist sanitizer for echoing surface markup into a preview
//! - `SelectionTracker` - selection save/restore across focus loss
//! - `ops` - link, image, size-class and table mutations
//! - `ResizeOverlay` - corner-handle image resizing
//! - `SyncPipeline` - debounced sanitize-and-publish
//! - `EditorSession` + `execute_action` - the session context and dispatch

pub mod actions;
pub mod clipboard;
pub mod config;
pub mod debounce;
pub mod dom;
pub mod error;
pub mod execute;
pub mod format;
pub mod import;
pub mod ops;
pub mod parse;
pub mod platform;
pub mod preview;
pub mod range;
pub mod resize;
pub mod sanitize;
pub mod selection;
pub mod serialize;
pub mod session;
pub mod style;
pub mod sync;
pub mod types;

pub use actions::{
    DialogKind, EditorAction, Key, KeyCombo, KeydownResult, Modifiers, TableInput,
};
pub use clipboard::{ClipboardPlatform, CopyMethod, MemoryClipboard};
pub use config::{EditorConfig, FileStore, TableConfig};
pub use dom::{Dom, NodeId};
pub use error::{ConfigError, EditorError, ImportError};
pub use execute::{execute_action, handle_keydown};
pub use format::{Alignment, FormatCommand, FormatOutcome};
pub use import::{
    DocxConverter, FileKind, ImportFile, Importer, PdfConverter, PdfMode, PdfPage,
};
pub use ops::{CellDirection, TableSpec};
pub use platform::{EditorPlatform, HeadlessPlatform, Notice, PlatformError};
pub use preview::{export_document, preview_document};
pub use resize::{Handle, OverlayState, ResizeCommit, ResizeOverlay};
pub use sanitize::{SanitizeReport, sanitize, sanitize_tree};
pub use selection::{Focus, SelectionTracker};
pub use session::EditorSession;
pub use smol_str::SmolStr;
pub use sync::{Artifacts, SyncPipeline};
pub use types::{BoundaryPoint, DomRange, Rect, Size, SizeClass};
