//! File import: turns an uploaded file into surface markup.
//!
//! HTML and plain text are handled here. DOCX and PDF go through converter
//! traits the host implements; the core only shapes their output into
//! markup. Import is all-or-nothing: an error leaves the surface as it was.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use miette::Diagnostic;
use pulldown_cmark_escape::{FmtWriter, escape_html};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::parse::parse_offline;

static PARAGRAPH_BREAK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{2,}").unwrap());

/// Error returned by a host converter.
pub type ConversionError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    Html,
    Text,
    Docx,
    Pdf,
}

impl FileKind {
    /// Classify by (case-insensitive) file extension.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.to_lowercase();
        if name.ends_with(".html") || name.ends_with(".htm") {
            Some(FileKind::Html)
        } else if name.ends_with(".txt") {
            Some(FileKind::Text)
        } else if name.ends_with(".docx") {
            Some(FileKind::Docx)
        } else if name.ends_with(".pdf") {
            Some(FileKind::Pdf)
        } else {
            None
        }
    }

    fn failure_prefix(self) -> &'static str {
        match self {
            FileKind::Docx => "DOCX conversion failed",
            FileKind::Pdf => "PDF import failed",
            FileKind::Html | FileKind::Text => "Import failed",
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FileKind::Html => "HTML",
            FileKind::Text => "TXT",
            FileKind::Docx => "DOCX",
            FileKind::Pdf => "PDF",
        })
    }
}

/// How PDF pages become markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PdfMode {
    /// Editable paragraphs from the page text.
    #[default]
    Text,
    /// One image snapshot per page.
    Image,
}

impl FromStr for PdfMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(PdfMode::Text),
            "image" => Ok(PdfMode::Image),
            other => Err(format!("unknown pdf mode: {other}")),
        }
    }
}

/// Import failures. The display text is what the user sees.
#[derive(thiserror::Error, Debug, Diagnostic)]
pub enum ImportError {
    #[error("Unsupported file type. Please use .docx, .html, or .txt.")]
    #[diagnostic(code(consent_editor::import::unsupported))]
    UnsupportedType(String),

    #[error("{}: no converter available", .0.failure_prefix())]
    #[diagnostic(code(consent_editor::import::converter))]
    ConverterUnavailable(FileKind),

    #[error("{}: {message}", .kind.failure_prefix())]
    #[diagnostic(code(consent_editor::import::conversion))]
    Conversion { kind: FileKind, message: String },
}

/// A file handed over by the host.
#[derive(Debug, Clone)]
pub struct ImportFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl ImportFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

/// DOCX to markup.
pub trait DocxConverter {
    fn convert_to_html(&self, bytes: &[u8]) -> Result<String, ConversionError>;
}

/// One page of converter output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PdfPage {
    /// The page's text items, in reading order.
    Text(Vec<String>),
    /// A rendered snapshot of the page.
    Image { data_url: String },
}

/// PDF to per-page content.
pub trait PdfConverter {
    fn pages(&self, bytes: &[u8], mode: PdfMode) -> Result<Vec<PdfPage>, ConversionError>;
}

/// Dispatches a file to the right conversion.
#[derive(Default)]
pub struct Importer {
    docx: Option<Box<dyn DocxConverter>>,
    pdf: Option<Box<dyn PdfConverter>>,
    pdf_mode: PdfMode,
}

impl Importer {
    pub fn new(pdf_mode: PdfMode) -> Self {
        Self {
            docx: None,
            pdf: None,
            pdf_mode,
        }
    }

    pub fn with_docx(mut self, converter: impl DocxConverter + 'static) -> Self {
        self.docx = Some(Box::new(converter));
        self
    }

    pub fn with_pdf(mut self, converter: impl PdfConverter + 'static) -> Self {
        self.pdf = Some(Box::new(converter));
        self
    }

    pub fn pdf_mode(&self) -> PdfMode {
        self.pdf_mode
    }

    /// Produce the markup to load for `file`.
    pub fn to_markup(&self, file: &ImportFile) -> Result<String, ImportError> {
        let kind = FileKind::from_name(&file.name)
            .ok_or_else(|| ImportError::UnsupportedType(file.name.clone()))?;
        tracing::debug!(target: "consent_editor::import", name = %file.name, %kind, "importing file");

        match kind {
            FileKind::Html => Ok(extract_body_html(&file.text())),
            FileKind::Text => Ok(text_to_paragraphs(&file.text())),
            FileKind::Docx => {
                let converter = self
                    .docx
                    .as_ref()
                    .ok_or(ImportError::ConverterUnavailable(kind))?;
                converter
                    .convert_to_html(&file.bytes)
                    .map_err(|e| conversion_error(kind, e))
            }
            FileKind::Pdf => {
                let converter = self
                    .pdf
                    .as_ref()
                    .ok_or(ImportError::ConverterUnavailable(kind))?;
                let pages = converter
                    .pages(&file.bytes, self.pdf_mode)
                    .map_err(|e| conversion_error(kind, e))?;
                let html = pdf_pages_to_html(&pages);
                if html.is_empty() {
                    Ok("<p>(No text extracted)</p>".to_string())
                } else {
                    Ok(html)
                }
            }
        }
    }
}

fn conversion_error(kind: FileKind, err: ConversionError) -> ImportError {
    tracing::warn!(target: "consent_editor::import", %kind, error = %err, "conversion failed");
    ImportError::Conversion {
        kind,
        message: err.to_string(),
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let _ = escape_html(FmtWriter(&mut out), text);
    out
}

/// Body content of an HTML document, or the input itself when the body
/// comes out empty.
pub fn extract_body_html(html: &str) -> String {
    let (dom, body) = parse_offline(html);
    let inner = dom.inner_html(body);
    if inner.is_empty() {
        html.to_string()
    } else {
        inner
    }
}

/// Plain text to paragraphs: blank-line runs separate paragraphs, single
/// newlines become `<br>`.
pub fn text_to_paragraphs(text: &str) -> String {
    let text = text.replace("\r\n", "\n");
    PARAGRAPH_BREAK_RE
        .split(&text)
        .map(|block| format!("<p>{}</p>", escape(block.trim()).replace('\n', "<br>")))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Markup for converted PDF pages, one chunk per page joined by newlines.
pub fn pdf_pages_to_html(pages: &[PdfPage]) -> String {
    pages
        .iter()
        .enumerate()
        .map(|(i, page)| {
            let number = i + 1;
            match page {
                PdfPage::Image { data_url } => {
                    format!(
                        r#"<p><img src="{}" alt="Page {number}" /></p>"#,
                        escape(data_url)
                    )
                }
                PdfPage::Text(items) => {
                    let text = items.join(" ");
                    let paragraphs: Vec<String> = PARAGRAPH_BREAK_RE
                        .split(&text)
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(|s| format!("<p>{}</p>", escape(s)))
                        .collect();
                    if paragraphs.is_empty() {
                        format!("<p><!-- empty page {number} --></p>")
                    } else {
                        paragraphs.join("\n")
                    }
                }
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
