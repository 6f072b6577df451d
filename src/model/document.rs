//! Document-level types.

use super::{EmbeddedImage, Paragraph, Run, Table};
use serde::{Deserialize, Serialize};

/// The target document: an ordered sequence of blocks.
///
/// Converters only ever append; once a document is handed to the writer it is
/// not mutated again.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Content blocks in document order
    pub blocks: Vec<Block>,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a heading block. The level is clamped to 1-6.
    pub fn add_heading(&mut self, text: impl Into<String>, level: u8) {
        self.blocks.push(Block::Heading {
            level: level.clamp(1, 6),
            runs: vec![Run::text(text)],
        });
    }

    /// Append a paragraph block.
    pub fn add_paragraph(&mut self, paragraph: Paragraph) {
        self.blocks.push(Block::Paragraph(paragraph));
    }

    /// Append a table block.
    pub fn add_table(&mut self, table: Table) {
        self.blocks.push(Block::Table(table));
    }

    /// Append a block-level image.
    pub fn add_image(&mut self, image: EmbeddedImage) {
        self.blocks.push(Block::Image(image));
    }

    /// Append a page break.
    pub fn add_page_break(&mut self) {
        self.blocks.push(Block::PageBreak);
    }

    /// Get the number of blocks.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Check if the document has any blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Get plain text content of the entire document.
    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .filter_map(|block| match block {
                Block::Heading { runs, .. } => Some(
                    runs.iter()
                        .filter_map(|r| r.text_content())
                        .collect::<String>(),
                ),
                Block::Paragraph(p) => Some(p.plain_text()),
                Block::Table(t) => Some(t.plain_text()),
                Block::Image(_) | Block::PageBreak => None,
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Iterate over heading blocks as (level, text) pairs.
    pub fn headings(&self) -> impl Iterator<Item = (u8, String)> + '_ {
        self.blocks.iter().filter_map(|block| match block {
            Block::Heading { level, runs } => Some((
                *level,
                runs.iter()
                    .filter_map(|r| r.text_content())
                    .collect::<String>(),
            )),
            _ => None,
        })
    }

    /// Find the most recently emitted paragraph, if any.
    pub fn last_paragraph_mut(&mut self) -> Option<&mut Paragraph> {
        self.blocks.iter_mut().rev().find_map(|block| match block {
            Block::Paragraph(p) => Some(p),
            _ => None,
        })
    }
}

/// A top-level document unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// A heading at level 1-6
    Heading {
        /// Heading level (1-6)
        level: u8,
        /// Heading text runs
        runs: Vec<Run>,
    },

    /// A paragraph of runs
    Paragraph(Paragraph),

    /// A table
    Table(Table),

    /// A standalone image
    Image(EmbeddedImage),

    /// A page break
    PageBreak,
}

impl Block {
    /// Check if this block is a paragraph.
    pub fn is_paragraph(&self) -> bool {
        matches!(self, Block::Paragraph(_))
    }

    /// Check if this block is a table.
    pub fn is_table(&self) -> bool {
        matches!(self, Block::Table(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_new() {
        let doc = Document::new();
        assert!(doc.is_empty());
        assert_eq!(doc.block_count(), 0);
    }

    #[test]
    fn test_heading_level_clamped() {
        let mut doc = Document::new();
        doc.add_heading("too deep", 9);
        assert_eq!(doc.headings().next().unwrap().0, 6);
    }

    #[test]
    fn test_plain_text() {
        let mut doc = Document::new();
        doc.add_heading("Title", 1);
        doc.add_paragraph(Paragraph::with_text("Body text."));
        doc.add_page_break();

        assert_eq!(doc.plain_text(), "Title\n\nBody text.");
    }

    #[test]
    fn test_last_paragraph_mut_skips_trailing_blocks() {
        let mut doc = Document::new();
        doc.add_paragraph(Paragraph::with_text("quoted"));
        doc.add_table(Table::new(1, 1));

        let para = doc.last_paragraph_mut().unwrap();
        assert_eq!(para.plain_text(), "quoted");
    }
}
