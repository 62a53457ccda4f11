//! Copying the published fragment to the system clipboard.

use crate::error::EditorError;
use crate::platform::PlatformError;

/// Clipboard access provided by the host.
pub trait ClipboardPlatform {
    /// Whether the native async clipboard API may be used.
    fn is_secure_context(&self) -> bool;

    /// Write through the native clipboard API.
    fn write_text(&mut self, text: &str) -> Result<(), PlatformError>;

    /// Select-and-copy through a hidden text field.
    fn fallback_copy(&mut self, text: &str) -> Result<(), PlatformError>;
}

/// Which mechanism ended up doing the copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyMethod {
    Native,
    Fallback,
}

/// Copy `fragment`, preferring the native API and falling back silently.
pub fn copy_fragment(
    clipboard: &mut impl ClipboardPlatform,
    fragment: &str,
) -> Result<CopyMethod, EditorError> {
    if fragment.trim().is_empty() {
        return Err(EditorError::NothingToCopy);
    }

    if clipboard.is_secure_context() {
        match clipboard.write_text(fragment) {
            Ok(()) => return Ok(CopyMethod::Native),
            Err(err) => {
                tracing::warn!(target: "consent_editor::clipboard", %err, "native clipboard write failed, falling back");
            }
        }
    }

    clipboard
        .fallback_copy(fragment)
        .map(|()| CopyMethod::Fallback)
        .map_err(EditorError::CopyFailed)
}

/// In-memory clipboard for headless sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    pub secure: bool,
    pub native_fails: bool,
    pub fallback_fails: bool,
    pub contents: Option<String>,
}

impl MemoryClipboard {
    pub fn secure() -> Self {
        Self {
            secure: true,
            ..Default::default()
        }
    }
}

impl ClipboardPlatform for MemoryClipboard {
    fn is_secure_context(&self) -> bool {
        self.secure
    }

    fn write_text(&mut self, text: &str) -> Result<(), PlatformError> {
        if self.native_fails {
            return Err("clipboard permission denied".into());
        }
        self.contents = Some(text.to_string());
        Ok(())
    }

    fn fallback_copy(&mut self, text: &str) -> Result<(), PlatformError> {
        if self.fallback_fails {
            return Err("copy command unavailable".into());
        }
        self.contents = Some(text.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secure_context_uses_native() {
        let mut clipboard = MemoryClipboard::secure();
        assert_eq!(
            copy_fragment(&mut clipboard, "<p>x</p>").unwrap(),
            CopyMethod::Native
        );
        assert_eq!(clipboard.contents.as_deref(), Some("<p>x</p>"));
    }

    #[test]
    fn test_falls_back_when_native_unavailable_or_failing() {
        let mut insecure = MemoryClipboard::default();
        assert_eq!(
            copy_fragment(&mut insecure, "<p>x</p>").unwrap(),
            CopyMethod::Fallback
        );

        let mut failing = MemoryClipboard {
            native_fails: true,
            ..MemoryClipboard::secure()
        };
        assert_eq!(
            copy_fragment(&mut failing, "<p>x</p>").unwrap(),
            CopyMethod::Fallback
        );
    }

    #[test]
    fn test_empty_fragment() {
        let mut clipboard = MemoryClipboard::secure();
        assert!(matches!(
            copy_fragment(&mut clipboard, "  \n"),
            Err(EditorError::NothingToCopy)
        ));
        assert_eq!(clipboard.contents, None);
    }
}
