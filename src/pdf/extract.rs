//! Per-page PDF content extraction.
//!
//! Pulls positioned text spans, table-like cell grids, and placed images out
//! of each page. Everything here degrades per sub-step: a page whose table or
//! image extraction fails still yields its text, and vice versa.

use std::collections::{BTreeMap, HashMap};
use std::io::Cursor;
use std::path::Path;

use lopdf::{Document as LopdfDocument, Object, ObjectId};

use crate::error::{Error, Result};

/// Minimum horizontal gap (points) separating table columns.
const MIN_COLUMN_GAP: f32 = 15.0;

/// Tolerance (points) when clustering cell start positions into columns.
const COLUMN_CLUSTER_TOLERANCE: f32 = 12.0;

/// Table shape limits: at least 2x2, at most this many columns (more usually
/// means word-level splitting, not a table).
const MIN_TABLE_ROWS: usize = 2;
const MIN_TABLE_COLUMNS: usize = 2;
const MAX_TABLE_COLUMNS: usize = 6;

/// Extracted content of a single page.
#[derive(Debug, Clone, Default)]
pub struct PageContent {
    /// Page number (1-indexed)
    pub number: u32,

    /// Page width in points
    pub width: f32,

    /// Page height in points
    pub height: f32,

    /// Raw page text, one extracted line per `\n`
    pub text: String,

    /// Detected tables as row/cell text matrices
    pub tables: Vec<Vec<Vec<String>>>,

    /// Placed raster images with their page-space bounding boxes
    pub images: Vec<ImageRegion>,
}

/// A raster image placed on a page.
///
/// Coordinates are in points with `top` measured from the top edge of the
/// page, so `bottom > top`.
#[derive(Debug, Clone)]
pub struct ImageRegion {
    /// Left edge
    pub x0: f32,
    /// Top edge (distance from page top)
    pub top: f32,
    /// Right edge
    pub x1: f32,
    /// Bottom edge
    pub bottom: f32,
    /// Encoded image bytes (PNG or JPEG)
    pub data: Vec<u8>,
    /// Pixel width of the decoded image
    pub pixel_width: u32,
    /// Pixel height of the decoded image
    pub pixel_height: u32,
}

impl ImageRegion {
    /// Placed width in points.
    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    /// Placed height in points.
    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }
}

/// Page-by-page PDF content extractor.
pub struct PdfExtractor {
    doc: LopdfDocument,
    layout_text: bool,
}

impl PdfExtractor {
    /// Open a PDF file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let doc = LopdfDocument::load(path.as_ref())?;
        Ok(Self {
            doc,
            layout_text: true,
        })
    }

    /// Load a PDF from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let doc = LopdfDocument::load_mem(data)?;
        Ok(Self {
            doc,
            layout_text: true,
        })
    }

    /// Enable or disable layout-preserving spacing in extracted text.
    pub fn with_layout_text(mut self, layout: bool) -> Self {
        self.layout_text = layout;
        self
    }

    /// Number of pages in the document.
    pub fn page_count(&self) -> u32 {
        self.doc.get_pages().len() as u32
    }

    /// Extract the content of one page (1-indexed).
    pub fn extract_page(&self, page_num: u32) -> Result<PageContent> {
        let pages = self.doc.get_pages();
        let page_id = *pages
            .get(&page_num)
            .ok_or(Error::PageOutOfRange(page_num, pages.len() as u32))?;

        let (width, height) = self.page_dimensions(page_id);

        let mut content = PageContent {
            number: page_num,
            width,
            height,
            ..Default::default()
        };

        let walk = match self.walk_page(page_id, height) {
            Ok(walk) => walk,
            Err(e) => {
                log::warn!("page {}: content stream unreadable: {}", page_num, e);
                return Ok(content);
            }
        };

        let lines = group_spans_into_lines(walk.spans);
        content.text = lines
            .iter()
            .map(|line| line_text(line, self.layout_text))
            .collect::<Vec<_>>()
            .join("\n");
        content.tables = detect_tables(&lines);
        content.images = walk.images;

        Ok(content)
    }

    /// Page dimensions from the MediaBox, defaulting to Letter.
    fn page_dimensions(&self, page_id: ObjectId) -> (f32, f32) {
        if let Ok(page_dict) = self.doc.get_dictionary(page_id) {
            if let Ok(media_box) = page_dict.get(b"MediaBox") {
                if let Ok(array) = media_box.as_array() {
                    if array.len() >= 4 {
                        let width = array[2].as_float().unwrap_or(612.0);
                        let height = array[3].as_float().unwrap_or(792.0);
                        return (width, height);
                    }
                }
            }
        }
        (612.0, 792.0)
    }

    /// Get the page's raw (decompressed) content stream bytes.
    fn page_content_bytes(&self, page_id: ObjectId) -> Result<Vec<u8>> {
        self.doc
            .get_page_content(page_id)
            .map_err(|e| Error::PdfParse(e.to_string()))
    }

    /// Map XObject resource names to their object ids for a page.
    fn page_xobjects(&self, page_id: ObjectId) -> HashMap<Vec<u8>, ObjectId> {
        let mut xobjects = HashMap::new();
        let Ok(page_dict) = self.doc.get_dictionary(page_id) else {
            return xobjects;
        };
        let Ok(res) = page_dict.get(b"Resources") else {
            return xobjects;
        };
        let res_dict = match res {
            Object::Reference(r) => self.doc.get_dictionary(*r).ok(),
            Object::Dictionary(d) => Some(d),
            _ => None,
        };
        let Some(res_dict) = res_dict else {
            return xobjects;
        };
        let Ok(xobj) = res_dict.get(b"XObject") else {
            return xobjects;
        };
        let xobj_dict = match xobj {
            Object::Reference(r) => self.doc.get_dictionary(*r).ok(),
            Object::Dictionary(d) => Some(d),
            _ => None,
        };
        if let Some(xobj_dict) = xobj_dict {
            for (name, obj) in xobj_dict.iter() {
                if let Ok(obj_ref) = obj.as_reference() {
                    xobjects.insert(name.clone(), obj_ref);
                }
            }
        }
        xobjects
    }

    /// Walk a page's content stream, collecting text spans and image
    /// placements in one pass.
    fn walk_page(&self, page_id: ObjectId, page_height: f32) -> Result<PageWalk> {
        let content = self.page_content_bytes(page_id)?;
        let content =
            lopdf::content::Content::decode(&content).map_err(|e| Error::PdfParse(e.to_string()))?;

        let fonts = self.doc.get_page_fonts(page_id).unwrap_or_default();
        let xobjects = self.page_xobjects(page_id);

        let mut spans = Vec::new();
        let mut images = Vec::new();

        let mut current_font_name: Vec<u8> = Vec::new();
        let mut current_font_size: f32 = 12.0;
        let mut text_matrix = TextMatrix::default();
        let mut in_text_block = false;

        let mut ctm = Matrix::identity();
        let mut ctm_stack: Vec<Matrix> = Vec::new();

        for op in content.operations {
            match op.operator.as_str() {
                "q" => ctm_stack.push(ctm),
                "Q" => ctm = ctm_stack.pop().unwrap_or_else(Matrix::identity),
                "cm" => {
                    if op.operands.len() >= 6 {
                        let m = Matrix::from_operands(&op.operands);
                        ctm = m.multiply(&ctm);
                    }
                }
                "BT" => {
                    in_text_block = true;
                    text_matrix = TextMatrix::default();
                }
                "ET" => {
                    in_text_block = false;
                }
                "Tf" => {
                    if op.operands.len() >= 2 {
                        if let Object::Name(font_name) = &op.operands[0] {
                            current_font_name = font_name.clone();
                        }
                        current_font_size = get_number(&op.operands[1]).unwrap_or(12.0);
                    }
                }
                "Td" | "TD" => {
                    if op.operands.len() >= 2 {
                        let tx = get_number(&op.operands[0]).unwrap_or(0.0);
                        let ty = get_number(&op.operands[1]).unwrap_or(0.0);
                        text_matrix.translate(tx, ty);
                    }
                }
                "Tm" => {
                    if op.operands.len() >= 6 {
                        text_matrix.set(
                            get_number(&op.operands[0]).unwrap_or(1.0),
                            get_number(&op.operands[1]).unwrap_or(0.0),
                            get_number(&op.operands[2]).unwrap_or(0.0),
                            get_number(&op.operands[3]).unwrap_or(1.0),
                            get_number(&op.operands[4]).unwrap_or(0.0),
                            get_number(&op.operands[5]).unwrap_or(0.0),
                        );
                    }
                }
                "T*" => {
                    text_matrix.next_line();
                }
                "Tj" | "TJ" => {
                    if in_text_block {
                        let text = self.decode_text_operands(&op, &fonts, &current_font_name);
                        if !text.trim().is_empty() {
                            let (x, y) = text_matrix.position();
                            let size = current_font_size * text_matrix.scale();
                            spans.push(TextSpan::new(text, x, y, size));
                        }
                    }
                }
                "'" | "\"" => {
                    text_matrix.next_line();
                    if in_text_block {
                        let text_idx = if op.operator == "\"" { 2 } else { 0 };
                        if let Some(Object::String(bytes, _)) = op.operands.get(text_idx) {
                            let text = self.decode_string(bytes, &fonts, &current_font_name);
                            if !text.trim().is_empty() {
                                let (x, y) = text_matrix.position();
                                let size = current_font_size * text_matrix.scale();
                                spans.push(TextSpan::new(text, x, y, size));
                            }
                        }
                    }
                }
                "Do" => {
                    if let Some(Object::Name(name)) = op.operands.first() {
                        if let Some(obj_ref) = xobjects.get(name.as_slice()) {
                            match self.placed_image(*obj_ref, &ctm, page_height) {
                                Ok(Some(region)) => images.push(region),
                                Ok(None) => {}
                                Err(e) => {
                                    log::warn!("image extraction failed: {}", e);
                                }
                            }
                        }
                    }
                }
                _ => {}
            }
        }

        Ok(PageWalk { spans, images })
    }

    /// Decode the string operands of a Tj/TJ operator. TJ kerning adjustments
    /// beyond the word-space threshold become literal spaces.
    fn decode_text_operands(
        &self,
        op: &lopdf::content::Operation,
        fonts: &BTreeMap<Vec<u8>, &lopdf::Dictionary>,
        font_name: &[u8],
    ) -> String {
        if op.operator == "TJ" {
            let mut combined = String::new();
            // 1/1000 text-space units; larger negative adjustments are word gaps.
            let space_threshold = 200.0;
            if let Some(Object::Array(arr)) = op.operands.first() {
                for item in arr {
                    match item {
                        Object::String(bytes, _) => {
                            combined.push_str(&self.decode_string(bytes, fonts, font_name));
                        }
                        Object::Integer(n) => {
                            if -(*n as f32) > space_threshold {
                                push_word_gap(&mut combined);
                            }
                        }
                        Object::Real(n) => {
                            if -n > space_threshold {
                                push_word_gap(&mut combined);
                            }
                        }
                        _ => {}
                    }
                }
            }
            combined
        } else if let Some(Object::String(bytes, _)) = op.operands.first() {
            self.decode_string(bytes, fonts, font_name)
        } else {
            String::new()
        }
    }

    /// Decode a text string using the current font's encoding, falling back
    /// to simple byte decoding.
    fn decode_string(
        &self,
        bytes: &[u8],
        fonts: &BTreeMap<Vec<u8>, &lopdf::Dictionary>,
        font_name: &[u8],
    ) -> String {
        let encoding = fonts
            .get(font_name)
            .and_then(|f| f.get_font_encoding(&self.doc).ok());
        if let Some(enc) = encoding {
            if let Ok(decoded) = LopdfDocument::decode_text(&enc, bytes) {
                return decoded;
            }
        }
        decode_text_simple(bytes)
    }

    /// Resolve a Do target into a placed raster image, if it is an image
    /// XObject the decoder understands.
    fn placed_image(
        &self,
        obj_ref: ObjectId,
        ctm: &Matrix,
        page_height: f32,
    ) -> Result<Option<ImageRegion>> {
        let obj = self
            .doc
            .get_object(obj_ref)
            .map_err(|e| Error::ImageExtract(e.to_string()))?;
        let Object::Stream(stream) = obj else {
            return Ok(None);
        };

        match stream.dict.get(b"Subtype").and_then(|s| s.as_name_str()) {
            Ok("Image") => {}
            _ => return Ok(None),
        }

        // An image XObject maps the unit square through the CTM.
        let (x0, y0, x1, y1) = ctm.unit_square_bounds();

        let Some((data, pixel_width, pixel_height)) = self.decode_image_stream(stream)? else {
            return Ok(None);
        };

        Ok(Some(ImageRegion {
            x0,
            top: page_height - y1,
            x1,
            bottom: page_height - y0,
            data,
            pixel_width,
            pixel_height,
        }))
    }

    /// Decode an image XObject stream into encoded bytes plus pixel size.
    ///
    /// JPEG streams pass through unchanged; flate-compressed RGB/grayscale
    /// rasters are re-encoded as PNG. Unsupported filters and color spaces
    /// return `None`.
    fn decode_image_stream(
        &self,
        stream: &lopdf::Stream,
    ) -> Result<Option<(Vec<u8>, u32, u32)>> {
        let dict = &stream.dict;

        let width = dict
            .get(b"Width")
            .ok()
            .and_then(|w| w.as_i64().ok())
            .unwrap_or(0) as u32;
        let height = dict
            .get(b"Height")
            .ok()
            .and_then(|h| h.as_i64().ok())
            .unwrap_or(0) as u32;
        if width == 0 || height == 0 {
            return Ok(None);
        }

        let filter = dict
            .get(b"Filter")
            .ok()
            .and_then(|f| match f {
                Object::Name(n) => Some(String::from_utf8_lossy(n).to_string()),
                Object::Array(arr) => arr
                    .first()
                    .and_then(|o| o.as_name_str().ok())
                    .map(String::from),
                _ => None,
            })
            .unwrap_or_default();

        match filter.as_str() {
            "DCTDecode" => {
                // JPEG data embeds directly.
                let data = stream.content.clone();
                match image::load_from_memory(&data) {
                    Ok(img) => Ok(Some((data, img.width(), img.height()))),
                    Err(e) => Err(Error::ImageExtract(format!("bad JPEG stream: {}", e))),
                }
            }
            "FlateDecode" | "" => {
                let raw = stream
                    .decompressed_content()
                    .map_err(|e| Error::ImageExtract(e.to_string()))?;
                let color_space = dict
                    .get(b"ColorSpace")
                    .ok()
                    .and_then(|cs| match cs {
                        Object::Name(n) => Some(String::from_utf8_lossy(n).to_string()),
                        Object::Array(arr) => arr
                            .first()
                            .and_then(|o| o.as_name_str().ok())
                            .map(String::from),
                        _ => None,
                    })
                    .unwrap_or_default();

                let encoded = match color_space.as_str() {
                    "DeviceRGB" => {
                        let expected = (width * height * 3) as usize;
                        if raw.len() < expected {
                            return Ok(None);
                        }
                        image::RgbImage::from_raw(width, height, raw[..expected].to_vec())
                            .map(image::DynamicImage::ImageRgb8)
                    }
                    "DeviceGray" => {
                        let expected = (width * height) as usize;
                        if raw.len() < expected {
                            return Ok(None);
                        }
                        image::GrayImage::from_raw(width, height, raw[..expected].to_vec())
                            .map(image::DynamicImage::ImageLuma8)
                    }
                    other => {
                        log::debug!("unsupported image color space: {}", other);
                        None
                    }
                };

                let Some(img) = encoded else {
                    return Ok(None);
                };
                let mut png = Vec::new();
                img.write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
                    .map_err(|e| Error::ImageExtract(e.to_string()))?;
                Ok(Some((png, width, height)))
            }
            other => {
                log::debug!("unsupported image filter: {}", other);
                Ok(None)
            }
        }
    }
}

/// Everything one content-stream pass produces.
struct PageWalk {
    spans: Vec<TextSpan>,
    images: Vec<ImageRegion>,
}

/// A positioned text span.
#[derive(Debug, Clone)]
pub(crate) struct TextSpan {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub font_size: f32,
}

impl TextSpan {
    fn new(text: String, x: f32, y: f32, font_size: f32) -> Self {
        // Width estimate for gap analysis; exact glyph metrics are not needed.
        let width = text.chars().count() as f32 * font_size * 0.5;
        Self {
            text,
            x,
            y,
            width,
            font_size,
        }
    }
}

/// Group spans into lines by baseline Y, top to bottom, left to right.
pub(crate) fn group_spans_into_lines(mut spans: Vec<TextSpan>) -> Vec<Vec<TextSpan>> {
    if spans.is_empty() {
        return vec![];
    }

    spans.sort_by(|a, b| {
        let y_cmp = b.y.partial_cmp(&a.y).unwrap_or(std::cmp::Ordering::Equal);
        if y_cmp == std::cmp::Ordering::Equal {
            a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal)
        } else {
            y_cmp
        }
    });

    let mut lines: Vec<Vec<TextSpan>> = Vec::new();
    let mut current: Vec<TextSpan> = Vec::new();
    let mut current_y: Option<f32> = None;

    for span in spans {
        let tolerance = span.font_size * 0.3;
        match current_y {
            Some(y) if (span.y - y).abs() <= tolerance => current.push(span),
            _ => {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                current_y = Some(span.y);
                current.push(span);
            }
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }

    for line in &mut lines {
        line.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal));
    }
    lines
}

/// Join a line's spans into text. In layout mode, X gaps between spans become
/// spaces; otherwise spans join with single spaces.
pub(crate) fn line_text(line: &[TextSpan], layout: bool) -> String {
    if !layout {
        return line
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
    }

    let mut result = String::new();
    for (i, span) in line.iter().enumerate() {
        if i > 0 {
            let prev = &line[i - 1];
            let gap = span.x - (prev.x + prev.width);
            let threshold = span.font_size * 0.2;
            let cjk_adjacent = result.chars().last().map(is_spaceless_script_char) == Some(true)
                && span.text.chars().next().map(is_spaceless_script_char) == Some(true);
            if gap > threshold
                && !cjk_adjacent
                && !result.ends_with(' ')
                && !span.text.starts_with(' ')
            {
                result.push(' ');
            }
        }
        result.push_str(&span.text);
    }
    result
}

/// Append a word gap unless the text already ends with one or the previous
/// character comes from a script written without word spaces.
fn push_word_gap(text: &mut String) {
    if text.is_empty() || text.ends_with(' ') {
        return;
    }
    if text.chars().last().map(is_spaceless_script_char) == Some(true) {
        return;
    }
    text.push(' ');
}

/// Check if a character belongs to a script written without word spaces
/// (Chinese and Japanese; Korean uses spaces like English).
fn is_spaceless_script_char(c: char) -> bool {
    let code = c as u32;

    // CJK Unified Ideographs and extensions
    (0x4E00..=0x9FFF).contains(&code)
        || (0x3400..=0x4DBF).contains(&code)
        || (0x20000..=0x2EBEF).contains(&code)
        // Hiragana and Katakana
        || (0x3040..=0x30FF).contains(&code)
        // CJK symbols and punctuation
        || (0x3000..=0x303F).contains(&code)
}

/// Detect table-like regions from aligned multi-span lines.
///
/// A line is tabular when it has several spans separated by clear column
/// gaps; two or more consecutive tabular lines whose spans cluster into the
/// same column positions form a table.
pub(crate) fn detect_tables(lines: &[Vec<TextSpan>]) -> Vec<Vec<Vec<String>>> {
    let mut tables = Vec::new();
    let mut run_start: Option<usize> = None;

    for (i, line) in lines.iter().enumerate() {
        if is_tabular_line(line) {
            run_start.get_or_insert(i);
        } else if let Some(start) = run_start.take() {
            if i - start >= MIN_TABLE_ROWS {
                if let Some(table) = build_table(&lines[start..i]) {
                    tables.push(table);
                }
            }
        }
    }
    if let Some(start) = run_start {
        if lines.len() - start >= MIN_TABLE_ROWS {
            if let Some(table) = build_table(&lines[start..]) {
                tables.push(table);
            }
        }
    }
    tables
}

fn is_tabular_line(line: &[TextSpan]) -> bool {
    if line.len() < MIN_TABLE_COLUMNS || line.len() > MAX_TABLE_COLUMNS {
        return false;
    }
    line.windows(2)
        .all(|w| w[1].x - (w[0].x + w[0].width) >= MIN_COLUMN_GAP)
}

/// Build a cell matrix from a run of tabular lines by clustering span start
/// positions into columns.
fn build_table(lines: &[Vec<TextSpan>]) -> Option<Vec<Vec<String>>> {
    let mut edges: Vec<f32> = Vec::new();
    for line in lines {
        for span in line {
            match edges
                .iter()
                .position(|e| (e - span.x).abs() <= COLUMN_CLUSTER_TOLERANCE)
            {
                Some(i) => edges[i] = (edges[i] + span.x) / 2.0,
                None => edges.push(span.x),
            }
        }
    }
    edges.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    if edges.len() < MIN_TABLE_COLUMNS || edges.len() > MAX_TABLE_COLUMNS {
        return None;
    }

    let mut rows = Vec::new();
    for line in lines {
        let mut row = vec![String::new(); edges.len()];
        for span in line {
            let col = edges
                .iter()
                .enumerate()
                .min_by(|(_, a), (_, b)| {
                    (**a - span.x)
                        .abs()
                        .partial_cmp(&(**b - span.x).abs())
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
                .map(|(i, _)| i)
                .unwrap_or(0);
            if !row[col].is_empty() {
                row[col].push(' ');
            }
            row[col].push_str(span.text.trim());
        }
        rows.push(row);
    }

    if rows.len() >= MIN_TABLE_ROWS {
        Some(rows)
    } else {
        None
    }
}

/// A 2D affine transform from a `cm` operator.
#[derive(Debug, Clone, Copy)]
struct Matrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
}

impl Matrix {
    fn identity() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
        }
    }

    fn from_operands(operands: &[Object]) -> Self {
        Self {
            a: get_number(&operands[0]).unwrap_or(1.0),
            b: get_number(&operands[1]).unwrap_or(0.0),
            c: get_number(&operands[2]).unwrap_or(0.0),
            d: get_number(&operands[3]).unwrap_or(1.0),
            e: get_number(&operands[4]).unwrap_or(0.0),
            f: get_number(&operands[5]).unwrap_or(0.0),
        }
    }

    /// `self * other` in PDF row-vector convention.
    fn multiply(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    fn transform(&self, x: f32, y: f32) -> (f32, f32) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }

    /// Bounds of the transformed unit square as (x0, y0, x1, y1).
    fn unit_square_bounds(&self) -> (f32, f32, f32, f32) {
        let corners = [
            self.transform(0.0, 0.0),
            self.transform(1.0, 0.0),
            self.transform(0.0, 1.0),
            self.transform(1.0, 1.0),
        ];
        let mut x0 = f32::MAX;
        let mut y0 = f32::MAX;
        let mut x1 = f32::MIN;
        let mut y1 = f32::MIN;
        for (x, y) in corners {
            x0 = x0.min(x);
            y0 = y0.min(y);
            x1 = x1.max(x);
            y1 = y1.max(y);
        }
        (x0, y0, x1, y1)
    }
}

/// Text matrix tracking position within a text block.
#[derive(Debug, Clone)]
struct TextMatrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
}

impl Default for TextMatrix {
    fn default() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
        }
    }
}

impl TextMatrix {
    fn set(&mut self, a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) {
        self.a = a;
        self.b = b;
        self.c = c;
        self.d = d;
        self.e = e;
        self.f = f;
    }

    fn translate(&mut self, tx: f32, ty: f32) {
        self.e += tx * self.a + ty * self.c;
        self.f += tx * self.b + ty * self.d;
    }

    fn next_line(&mut self) {
        // Default leading; a TL-aware implementation is not needed for
        // line-level extraction.
        self.f -= 12.0 * self.d;
    }

    fn position(&self) -> (f32, f32) {
        (self.e, self.f)
    }

    fn scale(&self) -> f32 {
        (self.a * self.a + self.c * self.c).sqrt()
    }
}

/// Helper to extract a number from a PDF object.
fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Simple text decoding fallback when no font encoding is available.
fn decode_text_simple(bytes: &[u8]) -> String {
    // UTF-16BE with BOM
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks(2)
            .filter_map(|c| {
                if c.len() == 2 {
                    Some(u16::from_be_bytes([c[0], c[1]]))
                } else {
                    None
                }
            })
            .collect();
        return String::from_utf16(&utf16).unwrap_or_default();
    }

    if let Ok(s) = String::from_utf8(bytes.to_vec()) {
        return s;
    }

    // Latin-1 fallback
    bytes.iter().map(|&b| b as char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(text: &str, x: f32, y: f32) -> TextSpan {
        TextSpan::new(text.to_string(), x, y, 12.0)
    }

    #[test]
    fn test_group_spans_top_to_bottom() {
        let spans = vec![span("bottom", 10.0, 100.0), span("top", 10.0, 700.0)];
        let lines = group_spans_into_lines(spans);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0][0].text, "top");
        assert_eq!(lines[1][0].text, "bottom");
    }

    #[test]
    fn test_same_baseline_merges_left_to_right() {
        let spans = vec![span("world", 200.0, 500.0), span("hello", 10.0, 500.5)];
        let lines = group_spans_into_lines(spans);
        assert_eq!(lines.len(), 1);
        assert_eq!(line_text(&lines[0], true), "hello world");
    }

    #[test]
    fn test_detect_tables_from_aligned_columns() {
        let lines = vec![
            vec![span("Name", 50.0, 700.0), span("Age", 200.0, 700.0)],
            vec![span("Alice", 50.0, 680.0), span("30", 200.0, 680.0)],
            vec![span("Bob", 50.0, 660.0), span("25", 200.0, 660.0)],
        ];
        let tables = detect_tables(&lines);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].len(), 3);
        assert_eq!(tables[0][0], vec!["Name".to_string(), "Age".to_string()]);
        assert_eq!(tables[0][2], vec!["Bob".to_string(), "25".to_string()]);
    }

    #[test]
    fn test_prose_lines_are_not_tables() {
        let lines = vec![
            vec![span("A plain sentence on one line.", 50.0, 700.0)],
            vec![span("Another plain sentence.", 50.0, 680.0)],
        ];
        assert!(detect_tables(&lines).is_empty());
    }

    #[test]
    fn test_unit_square_bounds() {
        // 100x50 image placed at (20, 30).
        let m = Matrix {
            a: 100.0,
            b: 0.0,
            c: 0.0,
            d: 50.0,
            e: 20.0,
            f: 30.0,
        };
        let (x0, y0, x1, y1) = m.unit_square_bounds();
        assert_eq!((x0, y0, x1, y1), (20.0, 30.0, 120.0, 80.0));
    }

    #[test]
    fn test_decode_text_simple_utf16() {
        let bytes = [0xFE, 0xFF, 0x00, b'H', 0x00, b'i'];
        assert_eq!(decode_text_simple(&bytes), "Hi");
    }
}
