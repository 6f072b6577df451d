//! Target document model.
//!
//! An in-memory representation of the output word-processor document,
//! decoupled from the docx library. Converters append blocks to a
//! [`Document`]; the render module serializes the finished model to a
//! `.docx` file.

mod document;
mod paragraph;
mod table;

pub use document::{Block, Document};
pub use paragraph::{
    EmbeddedImage, FontFamily, ListInfo, Paragraph, Run, RunContent, RunStyle, BODY_FONT,
    CODE_FONT_SIZE_PT, EAST_ASIAN_FONT, LINK_COLOR, MONO_FONT,
};
pub use table::{Table, TableCell, TableRow};
