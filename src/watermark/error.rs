//! Watermark error types.
//!
//! Every variant is fatal to a single watermarking run: callers never receive
//! a partially stamped document.

use std::path::PathBuf;

/// Errors that can occur during watermark processing.
#[derive(Debug, thiserror::Error)]
pub enum WatermarkError {
    /// Source document does not exist
    #[error("Source document not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    /// Source document exists but could not be read
    #[error("Failed to read source document: {0}")]
    Io(#[from] std::io::Error),

    /// Identifier has too few digits to be masked
    #[error("Invalid identifier: expected at least {required} digits, got {found}")]
    InvalidIdentifier { required: usize, found: usize },

    /// Source bytes are not a PDF we can work with
    #[error("Failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to build or merge the overlay for a page
    #[error("Failed to render watermark on page {page}: {message}")]
    Render { page: u32, message: String },

    /// Failed to write the stamped document
    #[error("Failed to serialize watermarked PDF: {0}")]
    Serialize(String),

    /// Invalid configuration
    #[error("Watermark configuration error: {0}")]
    Config(String),
}

impl WatermarkError {
    pub(crate) fn render(page: u32, message: impl std::fmt::Display) -> Self {
        Self::Render {
            page,
            message: message.to_string(),
        }
    }
}
