//! Error types for the todocx library.

use std::io;
use thiserror::Error;

/// Result type alias for todocx operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during document conversion.
///
/// Per-element failures (a single image, table cell, or run) are never
/// surfaced through this type; converters recover from them locally and
/// degrade to placeholder content. Only document-level failures abort a
/// conversion call.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading a source or writing an output file.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The Markdown source cannot be read as text.
    #[error("Markdown parsing error: {0}")]
    MarkdownParse(String),

    /// Error parsing PDF structure.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// Page number is out of range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(u32, u32),

    /// Error extracting an image from a PDF.
    #[error("Image extraction error: {0}")]
    ImageExtract(String),

    /// Error assembling or packing the output document.
    #[error("Document build error: {0}")]
    DocxBuild(String),

    /// The input archive is missing or malformed.
    #[error("Archive error: {0}")]
    Archive(String),

    /// The input archive contains no Markdown files.
    #[error("No markdown files found in the archive")]
    NoMarkdownFiles,
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            _ => Error::PdfParse(err.to_string()),
        }
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => Error::Io(e),
            _ => Error::Archive(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::NoMarkdownFiles;
        assert_eq!(err.to_string(), "No markdown files found in the archive");

        let err = Error::PageOutOfRange(10, 5);
        assert_eq!(
            err.to_string(),
            "Page 10 is out of range (document has 5 pages)"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
