//! Paragraph and text-level types.

use serde::{Deserialize, Serialize};

/// Latin-script font applied to regular text runs.
pub const BODY_FONT: &str = "Calibri";

/// East-Asian fallback font applied to every run.
///
/// Word resolves CJK glyphs through the eastAsia font slot; leaving it to the
/// viewer's default produces garbled rendering on machines without a CJK
/// default. Every run in the output carries this assignment.
pub const EAST_ASIAN_FONT: &str = "Microsoft YaHei";

/// Monospace font applied to code runs.
pub const MONO_FONT: &str = "Consolas";

/// Point size for code runs.
pub const CODE_FONT_SIZE_PT: f32 = 9.0;

/// Hex color applied to link runs.
pub const LINK_COLOR: &str = "0000FF";

/// A paragraph of text content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    /// Text runs in the paragraph
    pub runs: Vec<Run>,

    /// List membership, if this paragraph is a list item
    pub list: Option<ListInfo>,

    /// Explicit left indent in inches
    pub indent_inches: Option<f32>,
}

impl Paragraph {
    /// Create a new empty paragraph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a paragraph holding a single body-styled text run.
    pub fn with_text(text: impl Into<String>) -> Self {
        let mut p = Self::new();
        p.add_run(Run::text(text));
        p
    }

    /// Create a list-item paragraph at the given nesting depth.
    ///
    /// The left indent grows by half an inch per nesting step.
    pub fn list_item(text: impl Into<String>, ordered: bool, depth: u8) -> Self {
        let mut p = Self::with_text(text);
        p.list = Some(ListInfo { ordered, depth });
        p.indent_inches = Some(0.5 * (depth as f32 + 1.0));
        p
    }

    /// Append a run.
    pub fn add_run(&mut self, run: Run) {
        self.runs.push(run);
    }

    /// Get plain text content of the paragraph.
    pub fn plain_text(&self) -> String {
        self.runs
            .iter()
            .filter_map(|r| match &r.content {
                RunContent::Text(t) => Some(t.as_str()),
                RunContent::Image(_) => None,
            })
            .collect()
    }

    /// Check if the paragraph holds no runs.
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }
}

/// A run of content with one style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    /// The run content (text or an inline image)
    pub content: RunContent,

    /// Run styling
    pub style: RunStyle,
}

impl Run {
    /// Create a plain body-styled text run.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: RunContent::Text(text.into()),
            style: RunStyle::body(),
        }
    }

    /// Create a text run with an explicit style.
    pub fn styled(text: impl Into<String>, style: RunStyle) -> Self {
        Self {
            content: RunContent::Text(text.into()),
            style,
        }
    }

    /// Create a monospace code run.
    pub fn code(text: impl Into<String>) -> Self {
        Self::styled(text, RunStyle::code())
    }

    /// Create an inline image run.
    pub fn image(image: EmbeddedImage) -> Self {
        Self {
            content: RunContent::Image(image),
            style: RunStyle::body(),
        }
    }

    /// Get the run text, if any.
    pub fn text_content(&self) -> Option<&str> {
        match &self.content {
            RunContent::Text(t) => Some(t),
            RunContent::Image(_) => None,
        }
    }
}

/// Content carried by a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RunContent {
    /// A span of text
    Text(String),

    /// An inline embedded image
    Image(EmbeddedImage),
}

/// Run styling properties.
///
/// The font family is not optional: every run carries an explicit font so the
/// output never falls back to the viewer's default (which may not cover CJK).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunStyle {
    /// Bold text
    pub bold: bool,

    /// Italic text
    pub italic: bool,

    /// Underlined text
    pub underline: bool,

    /// Font family assignment
    pub font: FontFamily,

    /// Font size in points, if overriding the style default
    pub size_pt: Option<f32>,

    /// Text color as an RRGGBB hex string
    pub color: Option<String>,
}

impl RunStyle {
    /// Default body style.
    pub fn body() -> Self {
        Self {
            bold: false,
            italic: false,
            underline: false,
            font: FontFamily::Body,
            size_pt: None,
            color: None,
        }
    }

    /// Monospace code style at the fixed code size.
    pub fn code() -> Self {
        Self {
            font: FontFamily::Mono,
            size_pt: Some(CODE_FONT_SIZE_PT),
            ..Self::body()
        }
    }

    /// Bold body style.
    pub fn bold() -> Self {
        Self {
            bold: true,
            ..Self::body()
        }
    }

    /// Italic body style.
    pub fn italic() -> Self {
        Self {
            italic: true,
            ..Self::body()
        }
    }

    /// Underlined blue link style.
    pub fn link() -> Self {
        Self {
            underline: true,
            color: Some(LINK_COLOR.to_string()),
            ..Self::body()
        }
    }
}

impl Default for RunStyle {
    fn default() -> Self {
        Self::body()
    }
}

/// Font family assignment for a run.
///
/// Both variants resolve to a (Latin, East-Asian) font pair in the writer;
/// `Mono` swaps the Latin slot for the monospace font.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontFamily {
    /// Regular text font pair
    #[default]
    Body,
    /// Monospace font pair for code
    Mono,
}

/// List membership of a paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListInfo {
    /// Ordered (numbered) rather than bulleted
    pub ordered: bool,

    /// Nesting depth (0 = top level)
    pub depth: u8,
}

/// An image embedded in the output document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddedImage {
    /// Encoded image bytes (PNG or JPEG)
    #[serde(skip)]
    pub data: Vec<u8>,

    /// Pixel width of the decoded image
    pub pixel_width: u32,

    /// Pixel height of the decoded image
    pub pixel_height: u32,

    /// Display width in inches (already capped at the page maximum)
    pub width_inches: f32,
}

impl EmbeddedImage {
    /// Display size in EMU (914,400 per inch), aspect ratio preserved.
    pub fn emu_size(&self) -> (u32, u32) {
        let width = (self.width_inches * 914_400.0) as u32;
        let height = if self.pixel_width > 0 {
            (width as u64 * self.pixel_height as u64 / self.pixel_width as u64) as u32
        } else {
            width
        };
        (width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paragraph_plain_text() {
        let mut p = Paragraph::new();
        p.add_run(Run::text("Hello "));
        p.add_run(Run::styled("world", RunStyle::bold()));
        p.add_run(Run::text("!"));

        assert_eq!(p.plain_text(), "Hello world!");
    }

    #[test]
    fn test_list_item_indent() {
        let p = Paragraph::list_item("item", false, 0);
        assert_eq!(p.indent_inches, Some(0.5));

        let nested = Paragraph::list_item("item", true, 2);
        assert_eq!(nested.indent_inches, Some(1.5));
        assert!(nested.list.unwrap().ordered);
    }

    #[test]
    fn test_every_run_has_a_font() {
        // Font assignment is structural, not optional.
        assert_eq!(Run::text("x").style.font, FontFamily::Body);
        assert_eq!(Run::code("x").style.font, FontFamily::Mono);
        assert_eq!(Run::code("x").style.size_pt, Some(CODE_FONT_SIZE_PT));
    }

    #[test]
    fn test_link_style() {
        let style = RunStyle::link();
        assert!(style.underline);
        assert_eq!(style.color.as_deref(), Some(LINK_COLOR));
        assert_eq!(style.font, FontFamily::Body);
    }

    #[test]
    fn test_image_emu_size_preserves_aspect() {
        let img = EmbeddedImage {
            data: vec![],
            pixel_width: 400,
            pixel_height: 200,
            width_inches: 6.0,
        };
        let (w, h) = img.emu_size();
        assert_eq!(w, 6 * 914_400);
        assert_eq!(h, 3 * 914_400);
    }
}
