//! PDF to target document conversion.
//!
//! Pages are processed in order. Each page may emit a page break (except
//! before the first page), headings and body paragraphs classified from its
//! text lines, its detected tables, and its embedded images. A failing
//! sub-step never aborts the document.

use std::path::Path;

use unicode_normalization::UnicodeNormalization;

use crate::error::Result;
use crate::model::{Document, EmbeddedImage, Paragraph, Table};
use crate::render;

use super::extract::{PageContent, PdfExtractor};
use super::heading::classify_heading;

/// Images smaller than this on either axis (points) are treated as
/// decorative artifacts and skipped.
const MIN_IMAGE_SIZE_PT: f32 = 20.0;

/// Maximum display width for embedded images, in inches.
const MAX_IMAGE_WIDTH_INCHES: f32 = 6.0;

const POINTS_PER_INCH: f32 = 72.0;

/// Conversion mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PdfMode {
    /// Heading heuristics, layout-preserving text, tables, and images.
    #[default]
    Full,

    /// Text and tables only. A faster and safer fallback for text-dominant
    /// documents: no image extraction, plain text spacing.
    Simple,
}

/// Converts PDF documents to target documents.
#[derive(Debug, Clone)]
pub struct PdfConverter {
    mode: PdfMode,
    extract_images: bool,
}

impl Default for PdfConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfConverter {
    /// Create a full-mode converter with image extraction enabled.
    pub fn new() -> Self {
        Self {
            mode: PdfMode::Full,
            extract_images: true,
        }
    }

    /// Create a simple-mode converter (text and tables only).
    pub fn simple() -> Self {
        Self {
            mode: PdfMode::Simple,
            extract_images: false,
        }
    }

    /// Enable or disable image extraction (full mode only).
    pub fn with_images(mut self, extract: bool) -> Self {
        self.extract_images = extract;
        self
    }

    /// The conversion mode.
    pub fn mode(&self) -> PdfMode {
        self.mode
    }

    /// Convert a PDF file into a target document.
    pub fn convert_to_document(&self, input: &Path) -> Result<Document> {
        let extractor = PdfExtractor::open(input)?
            .with_layout_text(self.mode == PdfMode::Full);

        let page_count = extractor.page_count();
        log::debug!("converting {} ({} pages)", input.display(), page_count);

        let mut doc = Document::new();
        for page_num in 1..=page_count {
            match extractor.extract_page(page_num) {
                Ok(page) => self.emit_page(&mut doc, &page, page_num == 1),
                Err(e) => {
                    log::warn!("page {} skipped: {}", page_num, e);
                }
            }
        }
        Ok(doc)
    }

    /// Convert a PDF file and write the result as a `.docx` file.
    pub fn convert_file(&self, input: &Path, output: &Path) -> Result<()> {
        let doc = self.convert_to_document(input)?;
        render::write_docx(&doc, output)
    }

    /// Build a document from already-extracted page content.
    pub fn document_from_pages(&self, pages: &[PageContent]) -> Document {
        let mut doc = Document::new();
        for (i, page) in pages.iter().enumerate() {
            self.emit_page(&mut doc, page, i == 0);
        }
        doc
    }

    /// Emit one page: break + page heading, classified text, tables, images.
    fn emit_page(&self, doc: &mut Document, page: &PageContent, first: bool) {
        if !first {
            doc.add_page_break();
            if self.mode == PdfMode::Full {
                doc.add_heading(format!("Page {}", page.number), 2);
            }
        }

        self.emit_text(doc, &page.text);

        // Tables land after the page's text, not at their original vertical
        // position. Known limitation.
        for matrix in &page.tables {
            if let Some(table) = build_table(matrix) {
                doc.add_table(table);
            }
        }

        if self.mode == PdfMode::Full && self.extract_images {
            self.emit_images(doc, page);
        }
    }

    /// Classify cleaned lines into headings and body text. Consecutive body
    /// lines accumulate into one paragraph, flushed on a blank line, on a
    /// heading, and at end of page.
    fn emit_text(&self, doc: &mut Document, text: &str) {
        let mut pending: Vec<String> = Vec::new();

        for raw in text.lines() {
            let cleaned = clean_line(raw);
            let line = cleaned.trim();

            if line.is_empty() {
                flush_paragraph(doc, &mut pending);
                continue;
            }

            match classify_heading(line) {
                Some(level) => {
                    flush_paragraph(doc, &mut pending);
                    doc.add_heading(line, level);
                }
                None => pending.push(line.to_string()),
            }
        }
        flush_paragraph(doc, &mut pending);
    }

    fn emit_images(&self, doc: &mut Document, page: &PageContent) {
        for region in &page.images {
            if region.width() < MIN_IMAGE_SIZE_PT || region.height() < MIN_IMAGE_SIZE_PT {
                log::debug!(
                    "page {}: skipping {:.0}x{:.0}pt image artifact",
                    page.number,
                    region.width(),
                    region.height()
                );
                continue;
            }
            let width_inches = (region.width() / POINTS_PER_INCH).min(MAX_IMAGE_WIDTH_INCHES);
            doc.add_image(EmbeddedImage {
                data: region.data.clone(),
                pixel_width: region.pixel_width,
                pixel_height: region.pixel_height,
                width_inches,
            });
        }
    }
}

fn flush_paragraph(doc: &mut Document, pending: &mut Vec<String>) {
    if !pending.is_empty() {
        doc.add_paragraph(Paragraph::with_text(pending.join(" ")));
        pending.clear();
    }
}

/// Normalize a line and strip characters that cannot survive the trip into
/// the output document: NUL and control characters (tab excepted) and the
/// replacement character left by undecodable input.
fn clean_line(line: &str) -> String {
    line.nfc()
        .filter(|c| *c != '\u{FFFD}')
        .filter(|c| !c.is_control() || matches!(c, '\t' | '\r' | '\n'))
        .collect()
}

/// Build a model table from an extracted cell matrix. Rows with no non-empty
/// cell are dropped; the column count is the widest surviving row; the first
/// row renders bold (PDF tables carry no header markup).
fn build_table(matrix: &[Vec<String>]) -> Option<Table> {
    let surviving: Vec<&Vec<String>> = matrix
        .iter()
        .filter(|row| row.iter().any(|cell| !cell.trim().is_empty()))
        .collect();
    let cols = surviving.iter().map(|row| row.len()).max().unwrap_or(0);
    if surviving.is_empty() || cols == 0 {
        return None;
    }

    let mut table = Table::new(surviving.len(), cols);
    for (i, row) in surviving.iter().enumerate() {
        for (j, cell) in row.iter().enumerate() {
            table.set_cell(i, j, cell.trim(), i == 0);
        }
    }
    Some(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Block;

    fn page(number: u32, text: &str) -> PageContent {
        PageContent {
            number,
            width: 612.0,
            height: 792.0,
            text: text.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_body_lines_merge_into_one_paragraph() {
        let doc = PdfConverter::simple()
            .document_from_pages(&[page(1, "first line\nsecond line\n\nnew paragraph")]);

        let paras: Vec<String> = doc
            .blocks
            .iter()
            .filter_map(|b| match b {
                Block::Paragraph(p) => Some(p.plain_text()),
                _ => None,
            })
            .collect();
        assert_eq!(paras, vec!["first line second line", "new paragraph"]);
    }

    #[test]
    fn test_heading_flushes_pending_body() {
        let doc = PdfConverter::simple()
            .document_from_pages(&[page(1, "body before\n1.1 Background\nbody after")]);

        assert_eq!(doc.headings().next(), Some((3, "1.1 Background".into())));
        let kinds: Vec<bool> = doc.blocks.iter().map(|b| b.is_paragraph()).collect();
        assert_eq!(kinds, vec![true, false, true]);
    }

    #[test]
    fn test_page_break_between_pages_only() {
        let doc = PdfConverter::simple()
            .document_from_pages(&[page(1, "one"), page(2, "two"), page(3, "three")]);

        let breaks = doc
            .blocks
            .iter()
            .filter(|b| matches!(b, Block::PageBreak))
            .count();
        assert_eq!(breaks, 2);
        assert!(!matches!(doc.blocks[0], Block::PageBreak));
    }

    #[test]
    fn test_full_mode_adds_page_heading() {
        let doc =
            PdfConverter::new().document_from_pages(&[page(1, "one"), page(2, "two")]);
        assert_eq!(doc.headings().next(), Some((2, "Page 2".into())));
    }

    #[test]
    fn test_table_rows_without_content_are_dropped() {
        let mut p = page(1, "");
        p.tables = vec![vec![
            vec!["Name".into(), "Age".into()],
            vec!["".into(), "  ".into()],
            vec!["Alice".into(), "30".into(), "extra".into()],
        ]];
        let doc = PdfConverter::simple().document_from_pages(&[p]);

        let Block::Table(table) = &doc.blocks[0] else {
            panic!("expected table");
        };
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column_count(), 3);
        assert!(table.cell(0, 0).unwrap().bold);
        assert!(!table.cell(1, 0).unwrap().bold);
        // Missing cells render empty.
        assert_eq!(table.cell(0, 2).unwrap().text, "");
    }

    #[test]
    fn test_small_images_are_filtered() {
        use crate::pdf::extract::ImageRegion;

        let mut p = page(1, "");
        p.images = vec![
            ImageRegion {
                x0: 0.0,
                top: 0.0,
                x1: 10.0,
                bottom: 10.0,
                data: vec![1],
                pixel_width: 10,
                pixel_height: 10,
            },
            ImageRegion {
                x0: 0.0,
                top: 0.0,
                x1: 720.0,
                bottom: 360.0,
                data: vec![2],
                pixel_width: 200,
                pixel_height: 100,
            },
        ];
        let doc = PdfConverter::new().document_from_pages(&[p]);

        let images: Vec<&EmbeddedImage> = doc
            .blocks
            .iter()
            .filter_map(|b| match b {
                Block::Image(i) => Some(i),
                _ => None,
            })
            .collect();
        assert_eq!(images.len(), 1);
        // 720pt is 10in, capped at 6in.
        assert_eq!(images[0].width_inches, 6.0);
    }

    #[test]
    fn test_simple_mode_ignores_images() {
        use crate::pdf::extract::ImageRegion;

        let mut p = page(1, "");
        p.images = vec![ImageRegion {
            x0: 0.0,
            top: 0.0,
            x1: 100.0,
            bottom: 100.0,
            data: vec![1],
            pixel_width: 100,
            pixel_height: 100,
        }];
        let doc = PdfConverter::simple().document_from_pages(&[p]);
        assert!(doc.is_empty());
    }

    #[test]
    fn test_clean_line_strips_control_characters() {
        assert_eq!(clean_line("a\u{0}b\u{7}c"), "abc");
        assert_eq!(clean_line("keep\ttab"), "keep\ttab");
        assert_eq!(clean_line("bad\u{FFFD}char"), "badchar");
    }
}
