//! Target document model to `.docx` serialization.
//!
//! The only module that touches the docx library. Every text run is written
//! with an explicit ascii + hAnsi + eastAsia font assignment; the eastAsia
//! slot is what keeps CJK text rendering correctly in Word.

use std::fs;
use std::path::Path;

use docx_rs::{
    AbstractNumbering, BreakType, Docx, IndentLevel, Level, LevelJc, LevelText, NumberFormat,
    Numbering, NumberingId, Paragraph, Pic, Run, RunFonts, Start, Style, StyleType, Table,
    TableCell, TableRow, WidthType,
};

use crate::error::{Error, Result};
use crate::model::{self, Block, Document, FontFamily, RunContent, BODY_FONT, EAST_ASIAN_FONT, MONO_FONT};

/// Numbering ids registered for list paragraphs.
const BULLET_NUMBERING_ID: usize = 1;
const DECIMAL_NUMBERING_ID: usize = 2;

/// Deepest list level with a numbering definition.
const MAX_LIST_LEVELS: usize = 6;

/// Usable table width in twips (6.5 inches).
const TABLE_WIDTH_TWIPS: usize = 9360;

/// Twips per half inch of list indent.
const INDENT_STEP_TWIPS: i32 = 720;

/// Heading style sizes in half-points, levels 1 through 6.
const HEADING_SIZES: [usize; 6] = [36, 32, 28, 26, 24, 22];

/// Write a target document to a `.docx` file.
pub fn write_docx(doc: &Document, path: &Path) -> Result<()> {
    let docx = build_docx(doc);
    let file = fs::File::create(path)?;
    docx.build()
        .pack(file)
        .map_err(|e| Error::DocxBuild(e.to_string()))?;
    Ok(())
}

/// Assemble the docx document from the model.
fn build_docx(doc: &Document) -> Docx {
    let mut docx = register_styles(Docx::new());
    docx = register_numberings(docx);

    for block in &doc.blocks {
        docx = match block {
            Block::Heading { level, runs } => {
                let mut para = Paragraph::new().style(&format!("Heading{}", level));
                for run in runs {
                    para = para.add_run(convert_run(run));
                }
                docx.add_paragraph(para)
            }
            Block::Paragraph(p) => docx.add_paragraph(convert_paragraph(p)),
            Block::Table(t) => docx.add_table(convert_table(t)),
            Block::Image(image) => {
                let (w, h) = image.emu_size();
                let run = Run::new().add_image(Pic::new(&image.data).size(w, h));
                docx.add_paragraph(Paragraph::new().add_run(run))
            }
            Block::PageBreak => docx
                .add_paragraph(Paragraph::new().add_run(Run::new().add_break(BreakType::Page))),
        };
    }
    docx
}

/// Register Heading1-6 paragraph styles.
fn register_styles(mut docx: Docx) -> Docx {
    for (i, size) in HEADING_SIZES.iter().enumerate() {
        let level = i + 1;
        let style = Style::new(format!("Heading{}", level), StyleType::Paragraph)
            .name(format!("heading {}", level))
            .size(*size)
            .bold();
        docx = docx.add_style(style);
    }
    docx
}

/// Register bullet and decimal numbering definitions used by list items.
fn register_numberings(docx: Docx) -> Docx {
    let mut bullet = AbstractNumbering::new(BULLET_NUMBERING_ID);
    let mut decimal = AbstractNumbering::new(DECIMAL_NUMBERING_ID);
    for level in 0..MAX_LIST_LEVELS {
        bullet = bullet.add_level(Level::new(
            level,
            Start::new(1),
            NumberFormat::new("bullet"),
            LevelText::new("•"),
            LevelJc::new("left"),
        ));
        decimal = decimal.add_level(Level::new(
            level,
            Start::new(1),
            NumberFormat::new("decimal"),
            LevelText::new(format!("%{}.", level + 1)),
            LevelJc::new("left"),
        ));
    }
    docx.add_abstract_numbering(bullet)
        .add_abstract_numbering(decimal)
        .add_numbering(Numbering::new(BULLET_NUMBERING_ID, BULLET_NUMBERING_ID))
        .add_numbering(Numbering::new(DECIMAL_NUMBERING_ID, DECIMAL_NUMBERING_ID))
}

fn convert_paragraph(p: &model::Paragraph) -> Paragraph {
    let mut para = Paragraph::new();
    for run in &p.runs {
        para = para.add_run(convert_run(run));
    }

    if let Some(list) = &p.list {
        let id = if list.ordered {
            DECIMAL_NUMBERING_ID
        } else {
            BULLET_NUMBERING_ID
        };
        let level = (list.depth as usize).min(MAX_LIST_LEVELS - 1);
        para = para.numbering(NumberingId::new(id), IndentLevel::new(level));
    }

    if let Some(inches) = p.indent_inches {
        let twips = (inches * 2.0 * INDENT_STEP_TWIPS as f32) as i32;
        para = para.indent(Some(twips), None, None, None);
    }
    para
}

fn convert_run(run: &model::Run) -> Run {
    match &run.content {
        RunContent::Text(text) => {
            let style = &run.style;
            let mut r = Run::new().add_text(text.as_str()).fonts(run_fonts(style.font));
            if let Some(size) = style.size_pt {
                r = r.size((size * 2.0) as usize);
            }
            if style.bold {
                r = r.bold();
            }
            if style.italic {
                r = r.italic();
            }
            if style.underline {
                r = r.underline("single");
            }
            if let Some(color) = &style.color {
                r = r.color(color.as_str());
            }
            r
        }
        RunContent::Image(image) => {
            let (w, h) = image.emu_size();
            Run::new().add_image(Pic::new(&image.data).size(w, h))
        }
    }
}

/// Font triple for a run: Latin + hAnsi + East-Asian fallback.
fn run_fonts(font: FontFamily) -> RunFonts {
    let latin = match font {
        FontFamily::Body => BODY_FONT,
        FontFamily::Mono => MONO_FONT,
    };
    RunFonts::new()
        .ascii(latin)
        .hi_ansi(latin)
        .east_asia(EAST_ASIAN_FONT)
}

fn convert_table(table: &model::Table) -> Table {
    let cols = table.column_count().max(1);
    let rows: Vec<TableRow> = table
        .rows
        .iter()
        .map(|row| {
            let cells: Vec<TableCell> = row
                .cells
                .iter()
                .map(|cell| {
                    let style = if cell.bold {
                        model::RunStyle::bold()
                    } else {
                        model::RunStyle::body()
                    };
                    let run = model::Run::styled(cell.text.clone(), style);
                    let para = Paragraph::new().add_run(convert_run(&run));
                    TableCell::new().add_paragraph(para)
                })
                .collect();
            TableRow::new(cells)
        })
        .collect();

    Table::new(rows)
        .set_grid(vec![TABLE_WIDTH_TWIPS / cols; cols])
        .width(TABLE_WIDTH_TWIPS, WidthType::Dxa)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Paragraph as ModelParagraph, RunStyle};

    #[test]
    fn test_write_docx_produces_zip_container() {
        let mut doc = Document::new();
        doc.add_heading("标题", 1);
        let mut para = ModelParagraph::with_text("Hello 世界");
        para.add_run(model::Run::styled("bold", RunStyle::bold()));
        doc.add_paragraph(para);
        doc.add_page_break();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.docx");
        write_docx(&doc, &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        // docx files are zip containers.
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn test_write_docx_with_table_and_list() {
        let mut doc = Document::new();
        let mut table = model::Table::new(2, 2);
        table.set_cell(0, 0, "h", true);
        table.set_cell(1, 1, "v", false);
        doc.add_table(table);
        doc.add_paragraph(ModelParagraph::list_item("item", true, 1));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.docx");
        write_docx(&doc, &path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_unwritable_output_is_an_io_error() {
        let doc = Document::new();
        let err = write_docx(&doc, Path::new("/nonexistent-dir/out.docx")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
