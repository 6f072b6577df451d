//! Target document rendering.

mod docx;

pub use docx::write_docx;
