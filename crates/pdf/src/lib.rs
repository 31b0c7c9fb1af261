use std::path::Path;

use log::info;
use thiserror::Error;

use pdfdiff_core::document::Document;
use pdfdiff_core::layout::LayoutConfig;

pub mod parser;

use parser::backend::LopdfBackend;

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("PDF parsing error: {0}")]
    Parse(String),
    #[error("Document is encrypted")]
    Encrypted,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Parse PDF bytes and reconstruct the text of every page.
///
/// `name` is carried into the [`Document`] for reports; it is not read.
pub fn load_document(
    name: impl Into<String>,
    bytes: &[u8],
    config: &LayoutConfig,
) -> Result<Document, PdfError> {
    let name = name.into();
    let backend = LopdfBackend::load_bytes(bytes)?;
    let pages = parser::fragments::extract_all_pages(&backend)?;
    info!("{}: extracted {} pages", name, pages.len());
    Ok(Document::from_content(name, pages, config))
}

/// Read a PDF from disk. The document is named after the file name.
pub fn read_document(path: &Path, config: &LayoutConfig) -> Result<Document, PdfError> {
    let bytes = std::fs::read(path)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    load_document(name, &bytes, config)
}
