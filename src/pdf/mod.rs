//! PDF to Word conversion.
//!
//! [`extract`] pulls per-page text, tables, and images out of the PDF;
//! [`convert`] classifies and re-emits them as target document blocks, with
//! [`heading`] providing the line-level heading heuristic.

mod convert;
mod extract;
mod heading;

pub use convert::{PdfConverter, PdfMode};
pub use extract::{ImageRegion, PageContent, PdfExtractor};
pub use heading::classify_heading;
