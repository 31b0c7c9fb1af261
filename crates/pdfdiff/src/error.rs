use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("File not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("Not a file: {}", .0.display())]
    NotAFile(PathBuf),

    #[error("Failed to load {}: {reason}", path.display())]
    Load { path: PathBuf, reason: pdf::PdfError },

    #[error("PDF export failed: {0}")]
    Export(String),
}
