//! # todocx
//!
//! Convert structured documents (Markdown with embedded images and tables,
//! and PDF) into Word `.docx` files, preserving headings, lists, tables,
//! inline styling, and images.
//!
//! ## Quick Start
//!
//! ```no_run
//! use todocx::{convert_markdown_file, convert_pdf_file};
//!
//! fn main() -> todocx::Result<()> {
//!     // Markdown, resolving images against the source directory
//!     convert_markdown_file("notes.md", "notes.docx")?;
//!
//!     // PDF with heading detection, tables, and embedded images
//!     convert_pdf_file("report.pdf", "report.docx", true)?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Markdown**: headings, lists (nested), tables, code blocks, block
//!   quotes, links, and images, via a single depth-first tree walk
//! - **PDF**: per-page text with heuristic heading detection, table
//!   reconstruction, and image extraction
//! - **Batch**: convert a whole zip archive of Markdown files (nested
//!   archives included) into one downloadable archive
//! - **CJK-safe output**: every run carries an explicit East-Asian font
//!   fallback so Chinese/Japanese/Korean text renders correctly in Word
//!
//! Each conversion call is an independent one-shot transformation with no
//! shared state, safe to invoke concurrently from isolated call contexts.

pub mod archive;
pub mod error;
pub mod markdown;
pub mod model;
pub mod pdf;
pub mod render;

pub use archive::{convert_archive, BatchFailure, BatchReport};
pub use error::{Error, Result};
pub use markdown::MarkdownConverter;
pub use model::{Block, Document, FontFamily, Paragraph, Run, RunStyle, Table};
pub use pdf::{PdfConverter, PdfMode};

use std::path::Path;

/// Convert a Markdown file to a `.docx` file.
///
/// Image references resolve against the source file's directory.
///
/// # Example
///
/// ```no_run
/// todocx::convert_markdown_file("page.md", "page.docx").unwrap();
/// ```
pub fn convert_markdown_file<P: AsRef<Path>, Q: AsRef<Path>>(input: P, output: Q) -> Result<()> {
    MarkdownConverter::new().convert_file(input.as_ref(), output.as_ref())
}

/// Convert a PDF file to a `.docx` file.
///
/// With `extract_images` set, detected raster images are embedded at their
/// placed width (capped at six inches).
///
/// # Example
///
/// ```no_run
/// todocx::convert_pdf_file("report.pdf", "report.docx", true).unwrap();
/// ```
pub fn convert_pdf_file<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    extract_images: bool,
) -> Result<()> {
    PdfConverter::new()
        .with_images(extract_images)
        .convert_file(input.as_ref(), output.as_ref())
}

/// Convert a PDF file to a `.docx` file in simple mode.
///
/// Text and tables only; faster and more robust for text-dominant documents.
pub fn convert_pdf_file_simple<P: AsRef<Path>, Q: AsRef<Path>>(input: P, output: Q) -> Result<()> {
    PdfConverter::simple().convert_file(input.as_ref(), output.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markdown_string_to_document() {
        let doc = MarkdownConverter::new()
            .convert_str("# Title\n\nSome text.\n")
            .unwrap();
        assert_eq!(doc.block_count(), 2);
        assert_eq!(doc.headings().next(), Some((1, "Title".to_string())));
    }

    #[test]
    fn test_missing_markdown_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = convert_markdown_file(
            dir.path().join("missing.md"),
            dir.path().join("out.docx"),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_missing_pdf_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = convert_pdf_file(
            dir.path().join("missing.pdf"),
            dir.path().join("out.docx"),
            false,
        );
        assert!(result.is_err());
    }
}
