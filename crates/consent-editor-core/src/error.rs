//! Error types for the editing core.

use std::path::PathBuf;

use miette::Diagnostic;

pub use crate::import::ImportError;
use crate::platform::{Notice, PlatformError};

/// Main error type for editor operations
#[derive(thiserror::Error, Debug, Diagnostic)]
pub enum EditorError {
    /// An operation that needs a selection ran without one inside the surface
    #[error("no usable selection inside the editing surface")]
    #[diagnostic(
        code(consent_editor::selection),
        help("select some text in the editor first")
    )]
    InvalidSelection,

    /// Empty or unparseable dialog input. Treated as a silent cancel.
    #[error("invalid input: {0}")]
    #[diagnostic(code(consent_editor::input))]
    InvalidInput(String),

    #[error("no table selected")]
    #[diagnostic(code(consent_editor::table))]
    NoTableSelected,

    #[error("nothing to copy")]
    #[diagnostic(code(consent_editor::clipboard))]
    NothingToCopy,

    /// Both clipboard mechanisms failed
    #[error("copy failed: {0}")]
    #[diagnostic(code(consent_editor::clipboard))]
    CopyFailed(PlatformError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Import(#[from] ImportError),

    #[error("platform error: {0}")]
    #[diagnostic(code(consent_editor::platform))]
    Platform(#[from] PlatformError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}

impl EditorError {
    /// The message to show the user, if this error is user-visible at all.
    pub fn notice(&self) -> Option<Notice> {
        match self {
            EditorError::InvalidSelection => Some(Notice::SelectTextToLink),
            EditorError::NoTableSelected => Some(Notice::NoTableSelected),
            EditorError::NothingToCopy => Some(Notice::NothingToCopy),
            EditorError::CopyFailed(err) => Some(Notice::CopyFailed(err.to_string())),
            EditorError::Import(err) => Some(Notice::ImportFailed(err.to_string())),
            EditorError::InvalidInput(_) | EditorError::Platform(_) | EditorError::Config(_) => {
                None
            }
        }
    }

    /// Silent cancels are not failures from the user's point of view.
    pub fn is_silent(&self) -> bool {
        self.notice().is_none()
    }
}

/// Configuration file errors
#[derive(thiserror::Error, Debug, Diagnostic)]
#[non_exhaustive]
pub enum ConfigError {
    #[error(transparent)]
    #[diagnostic(code(consent_editor::config::io))]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    #[diagnostic(code(consent_editor::config::json))]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    #[diagnostic(code(consent_editor::config::toml))]
    TomlDe(#[from] toml::de::Error),

    #[error(transparent)]
    #[diagnostic(code(consent_editor::config::toml))]
    TomlSer(#[from] toml::ser::Error),

    #[error("unsupported config format: {}", .0.display())]
    #[diagnostic(
        code(consent_editor::config::format),
        help("use a .json or .toml file")
    )]
    UnsupportedFormat(PathBuf),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notices() {
        assert_eq!(
            EditorError::InvalidSelection.notice(),
            Some(Notice::SelectTextToLink)
        );
        assert!(EditorError::InvalidInput("url".into()).is_silent());
        assert_eq!(
            EditorError::Import(ImportError::UnsupportedType("a.rtf".into())).notice(),
            Some(Notice::ImportFailed(
                "Unsupported file type. Please use .docx, .html, or .txt.".into()
            ))
        );
    }
}
