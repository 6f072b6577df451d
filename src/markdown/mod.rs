//! Markdown to Word conversion.
//!
//! The pipeline has two stages: [`tree`] folds the Markdown event stream into
//! a closed [`SourceNode`] tree, and [`convert`] walks that tree once,
//! depth-first, emitting target document blocks in order.

mod convert;
mod node;
mod tree;

pub use convert::MarkdownConverter;
pub use node::SourceNode;
pub use tree::parse_markdown;
