//! Markdown to target document conversion.
//!
//! Walks the parsed source tree once, depth-first, appending target blocks in
//! document order. Per-element failures (a missing or unreadable image)
//! degrade to placeholder runs; they never abort the document.

use std::fs;
use std::path::{Path, PathBuf};

use percent_encoding::percent_decode_str;

use crate::error::{Error, Result};
use crate::model::{Document, EmbeddedImage, Paragraph, Run, RunStyle, Table};
use crate::render;

use super::node::SourceNode;
use super::tree::parse_markdown;

/// Display width for embedded images, in inches.
const IMAGE_WIDTH_INCHES: f32 = 6.0;

/// Character width of the horizontal-rule separator paragraph.
const RULE_WIDTH: usize = 50;

/// Indent applied to the last paragraph of a block quote, in inches.
const BLOCKQUOTE_INDENT_INCHES: f32 = 0.5;

/// Converts Markdown text to a target document.
#[derive(Debug, Clone, Default)]
pub struct MarkdownConverter {
    images_dir: Option<PathBuf>,
}

impl MarkdownConverter {
    /// Create a new converter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base directory for resolving relative image references.
    ///
    /// When unset, `convert_file` falls back to the source file's directory;
    /// `convert_str` skips image embedding entirely.
    pub fn with_images_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.images_dir = Some(dir.into());
        self
    }

    /// Convert Markdown text into a target document.
    pub fn convert_str(&self, markdown: &str) -> Result<Document> {
        let root = parse_markdown(markdown);
        let walker = Walker {
            images_dir: self.images_dir.as_deref(),
        };
        let mut doc = Document::new();
        walker.walk_blocks(root.children(), &mut doc, 0);
        Ok(doc)
    }

    /// Convert a Markdown file and write the result as a `.docx` file.
    pub fn convert_file(&self, input: &Path, output: &Path) -> Result<()> {
        let bytes = fs::read(input)?;
        let text = String::from_utf8(bytes).map_err(|_| {
            Error::MarkdownParse(format!("{}: source is not valid UTF-8", input.display()))
        })?;

        let images_dir = self
            .images_dir
            .clone()
            .or_else(|| input.parent().map(Path::to_path_buf));
        let walker = Walker {
            images_dir: images_dir.as_deref(),
        };

        let root = parse_markdown(&text);
        let mut doc = Document::new();
        walker.walk_blocks(root.children(), &mut doc, 0);

        render::write_docx(&doc, output)
    }
}

/// One conversion pass over the source tree.
struct Walker<'a> {
    images_dir: Option<&'a Path>,
}

impl Walker<'_> {
    /// Block-level dispatch. `list_depth` tracks list nesting for indents.
    fn walk_blocks(&self, nodes: &[SourceNode], doc: &mut Document, list_depth: u8) {
        for node in nodes {
            match node {
                SourceNode::Text(text) => {
                    let trimmed = text.trim();
                    if !trimmed.is_empty() {
                        doc.add_paragraph(Paragraph::with_text(trimmed));
                    }
                }
                SourceNode::Heading { level, .. } => {
                    doc.add_heading(node.plain_text(), *level);
                }
                SourceNode::Paragraph { children } => {
                    let mut para = Paragraph::new();
                    self.emit_inlines(children, &mut para);
                    doc.add_paragraph(para);
                }
                SourceNode::UnorderedList { children } => {
                    self.emit_list(children, false, list_depth, doc);
                }
                SourceNode::OrderedList { children } => {
                    self.emit_list(children, true, list_depth, doc);
                }
                SourceNode::Table { children } => {
                    self.emit_table(children, doc);
                }
                SourceNode::CodeBlock(text) => {
                    let mut para = Paragraph::new();
                    para.add_run(Run::code(text.clone()));
                    doc.add_paragraph(para);
                }
                SourceNode::Blockquote { children } => {
                    self.walk_blocks(children, doc, list_depth);
                    // Known limitation: the indent lands on the last paragraph
                    // the quote produced, not on all of them.
                    if let Some(para) = doc.last_paragraph_mut() {
                        para.indent_inches = Some(BLOCKQUOTE_INDENT_INCHES);
                    }
                }
                SourceNode::HorizontalRule => {
                    doc.add_paragraph(Paragraph::with_text("_".repeat(RULE_WIDTH)));
                }
                SourceNode::Container { children } => {
                    self.walk_blocks(children, doc, list_depth);
                }
                // Stray inline nodes at block level emit nothing.
                _ => {}
            }
        }
    }

    /// Inline dispatch within one paragraph.
    fn emit_inlines(&self, nodes: &[SourceNode], para: &mut Paragraph) {
        for node in nodes {
            match node {
                SourceNode::Text(text) => {
                    // Keep meaningful inter-element spacing (a single literal
                    // space) while dropping pure-whitespace noise nodes.
                    if !text.trim().is_empty() || text == " " {
                        para.add_run(Run::text(text.clone()));
                    }
                }
                SourceNode::Bold { .. } => {
                    para.add_run(Run::styled(node.plain_text(), RunStyle::bold()));
                }
                SourceNode::Italic { .. } => {
                    para.add_run(Run::styled(node.plain_text(), RunStyle::italic()));
                }
                SourceNode::InlineCode(text) => {
                    para.add_run(Run::code(text.clone()));
                }
                SourceNode::Link { href, .. } => {
                    // Styled text only; not a clickable hyperlink field.
                    let text = format!("{} ({})", node.plain_text(), href);
                    para.add_run(Run::styled(text, RunStyle::link()));
                }
                SourceNode::Image { src } => {
                    if let Some(run) = self.image_run(src) {
                        para.add_run(run);
                    }
                }
                // Unknown wrappers are transparent.
                _ => self.emit_inlines(node.children(), para),
            }
        }
    }

    /// Emit one list level: each item's own text becomes a list paragraph,
    /// nested lists recurse one level deeper.
    fn emit_list(&self, items: &[SourceNode], ordered: bool, depth: u8, doc: &mut Document) {
        for item in items {
            let SourceNode::ListItem { children } = item else {
                continue;
            };

            let text: String = children
                .iter()
                .filter(|c| !c.is_list())
                .map(|c| c.plain_text())
                .collect();
            let text = text.trim();
            if !text.is_empty() {
                doc.add_paragraph(Paragraph::list_item(text, ordered, depth));
            }

            for nested in children.iter().filter(|c| c.is_list()) {
                let nested_ordered = matches!(nested, SourceNode::OrderedList { .. });
                self.emit_list(nested.children(), nested_ordered, depth + 1, doc);
            }
        }
    }

    /// Emit a table sized to (row count, first-row column count). Cells past
    /// the first row's width are dropped; the first row and any header-tagged
    /// cell render bold.
    fn emit_table(&self, children: &[SourceNode], doc: &mut Document) {
        let rows: Vec<&SourceNode> = children
            .iter()
            .filter(|n| matches!(n, SourceNode::TableRow { .. }))
            .collect();
        let Some(first) = rows.first() else {
            return;
        };
        let cols = first
            .children()
            .iter()
            .filter(|c| matches!(c, SourceNode::TableCell { .. }))
            .count();
        if cols == 0 {
            return;
        }

        let mut table = Table::new(rows.len(), cols);
        for (i, row) in rows.iter().enumerate() {
            let cells = row
                .children()
                .iter()
                .filter_map(|c| match c {
                    SourceNode::TableCell { header, .. } => Some((*header, c)),
                    _ => None,
                })
                .take(cols);
            for (j, (header, cell)) in cells.enumerate() {
                let text = cell.plain_text();
                table.set_cell(i, j, text.trim(), i == 0 || header);
            }
        }
        doc.add_table(table);
    }

    /// Resolve and load an image reference, degrading to placeholder text.
    fn image_run(&self, src: &str) -> Option<Run> {
        let images_dir = self.images_dir?;
        if src.is_empty() {
            return None;
        }

        let run = match load_image(src, images_dir) {
            Ok(image) => Run::image(image),
            Err(ImageLoad::NotFound) => {
                log::debug!("image not found: {}", src);
                Run::styled(format!("[Image not found: {}]", src), RunStyle::italic())
            }
            Err(ImageLoad::Failed(reason)) => {
                log::warn!("failed to load image {}: {}", src, reason);
                Run::styled(format!("[Error loading image: {}]", src), RunStyle::italic())
            }
        };
        Some(run)
    }
}

enum ImageLoad {
    NotFound,
    Failed(String),
}

/// Load an image referenced from Markdown.
///
/// The `src` attribute is percent-decoded first (export tools encode
/// non-ASCII filenames); relative paths resolve against the images base
/// directory.
fn load_image(src: &str, images_dir: &Path) -> std::result::Result<EmbeddedImage, ImageLoad> {
    let decoded = percent_decode_str(src)
        .decode_utf8()
        .map_err(|e| ImageLoad::Failed(e.to_string()))?
        .into_owned();

    let path = if Path::new(&decoded).is_absolute() {
        PathBuf::from(&decoded)
    } else {
        images_dir.join(&decoded)
    };

    if !path.exists() {
        return Err(ImageLoad::NotFound);
    }

    let data = fs::read(&path).map_err(|e| ImageLoad::Failed(e.to_string()))?;
    let img = image::load_from_memory(&data).map_err(|e| ImageLoad::Failed(e.to_string()))?;

    Ok(EmbeddedImage {
        pixel_width: img.width(),
        pixel_height: img.height(),
        data,
        width_inches: IMAGE_WIDTH_INCHES,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Block, FontFamily};

    fn convert(markdown: &str) -> Document {
        MarkdownConverter::new().convert_str(markdown).unwrap()
    }

    #[test]
    fn test_horizontal_rule_width() {
        let doc = convert("---\n");
        let Block::Paragraph(p) = &doc.blocks[0] else {
            panic!("expected paragraph");
        };
        assert_eq!(p.plain_text(), "_".repeat(50));
    }

    #[test]
    fn test_code_block_is_monospace() {
        let doc = convert("```\nfn main() {}\n```\n");
        let Block::Paragraph(p) = &doc.blocks[0] else {
            panic!("expected paragraph");
        };
        assert_eq!(p.runs.len(), 1);
        assert_eq!(p.runs[0].style.font, FontFamily::Mono);
        assert_eq!(p.runs[0].text_content(), Some("fn main() {}\n"));
    }

    #[test]
    fn test_link_run_text_and_style() {
        let doc = convert("[docs](https://example.com)\n");
        let Block::Paragraph(p) = &doc.blocks[0] else {
            panic!("expected paragraph");
        };
        let run = &p.runs[0];
        assert_eq!(run.text_content(), Some("docs (https://example.com)"));
        assert!(run.style.underline);
        assert_eq!(run.style.color.as_deref(), Some("0000FF"));
    }

    #[test]
    fn test_blockquote_indents_last_paragraph_only() {
        let doc = convert("> first\n>\n> second\n");
        let paras: Vec<&Paragraph> = doc
            .blocks
            .iter()
            .filter_map(|b| match b {
                Block::Paragraph(p) => Some(p),
                _ => None,
            })
            .collect();
        assert_eq!(paras.len(), 2);
        assert_eq!(paras[0].indent_inches, None);
        assert_eq!(paras[1].indent_inches, Some(0.5));
    }

    #[test]
    fn test_images_skipped_without_base_dir() {
        let doc = convert("![pic](missing.png)\n");
        let Block::Paragraph(p) = &doc.blocks[0] else {
            panic!("expected paragraph");
        };
        assert!(p.is_empty());
    }

    #[test]
    fn test_nested_bold_flattens_to_plain_text() {
        let doc = convert("**bold *both***\n");
        let Block::Paragraph(p) = &doc.blocks[0] else {
            panic!("expected paragraph");
        };
        assert_eq!(p.runs[0].text_content(), Some("bold both"));
        assert!(p.runs[0].style.bold);
        assert!(!p.runs[0].style.italic);
    }
}
