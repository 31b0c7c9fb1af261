//! Content stream to positioned fragments.
//!
//! Walks a page's content stream through a [`PdfBackend`] and emits one
//! [`ContentItem`] per text-showing operation, in stream order, with page-space
//! coordinates. Image and form XObject invocations become
//! [`ContentItem::Marker`].
//!
//! ```text
//! content ops  ->  ContentItem[]  ->  pdfdiff_core::layout
//!   (per page)      extract_page_items
//! ```

use log::{debug, warn};
use pdfdiff_core::layout::{ContentItem, PositionedFragment};

use super::backend::{
    decode_text_simple, get_number_from_value, BackendFontInfo, FontMetrics, PageId, PdfBackend,
    PdfValue, TextDecoder,
};
use crate::PdfError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Elements [a, b, c, d, e, f] of a PDF transformation matrix.
type Matrix = [f32; 6];

const IDENTITY_MATRIX: Matrix = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

/// Approximate character width as a fraction of font size when the font
/// carries no `Widths` array.
const APPROX_CHAR_WIDTH_RATIO: f32 = 0.5;

/// A `TJ` kerning displacement wider than this fraction of an average glyph
/// is treated as a word break.
const TJ_SPACE_FRACTION: f32 = 0.3;

// ---------------------------------------------------------------------------
// Matrix helpers
// ---------------------------------------------------------------------------

/// `m1 × m2` in PDF row-vector convention: `m1` is applied first.
fn multiply(m1: &Matrix, m2: &Matrix) -> Matrix {
    [
        m1[0] * m2[0] + m1[1] * m2[2],
        m1[0] * m2[1] + m1[1] * m2[3],
        m1[2] * m2[0] + m1[3] * m2[2],
        m1[2] * m2[1] + m1[3] * m2[3],
        m1[4] * m2[0] + m1[5] * m2[2] + m2[4],
        m1[4] * m2[1] + m1[5] * m2[3] + m2[5],
    ]
}

fn matrix_operands(operands: &[PdfValue]) -> Option<Matrix> {
    if operands.len() < 6 {
        return None;
    }
    let vals: Vec<f32> = operands
        .iter()
        .take(6)
        .filter_map(get_number_from_value)
        .collect();
    (vals.len() == 6).then(|| [vals[0], vals[1], vals[2], vals[3], vals[4], vals[5]])
}

// ---------------------------------------------------------------------------
// Internal: PDF text-state machine
// ---------------------------------------------------------------------------

/// Text parameters tracked while walking a page's content stream.
#[derive(Debug, Clone)]
struct TextState {
    /// Current font resource name (the `/F1`-style key).
    font_key: Vec<u8>,
    /// Font size set by `Tf`, in text-space units.
    font_size: f32,
    text_matrix: Matrix,
    /// Text line matrix, set by BT and updated by Td/TD/T*/Tm.
    line_matrix: Matrix,
    /// Horizontal scaling factor (percent / 100).
    horiz_scale: f32,
    char_spacing: f32,
    word_spacing: f32,
    text_rise: f32,
    leading: f32,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            font_key: Vec::new(),
            font_size: 0.0,
            text_matrix: IDENTITY_MATRIX,
            line_matrix: IDENTITY_MATRIX,
            horiz_scale: 1.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            text_rise: 0.0,
            leading: 0.0,
        }
    }
}

impl TextState {
    /// Advance the text matrix horizontally by `dx` text-space units.
    fn advance_x(&mut self, dx: f32) {
        self.text_matrix[4] += dx * self.text_matrix[0];
        self.text_matrix[5] += dx * self.text_matrix[1];
    }

    /// Multiply the text line matrix by a translation (used by Td / TD).
    fn translate_line(&mut self, tx: f32, ty: f32) {
        let new_tx = self.line_matrix[0] * tx + self.line_matrix[2] * ty + self.line_matrix[4];
        let new_ty = self.line_matrix[1] * tx + self.line_matrix[3] * ty + self.line_matrix[5];
        self.line_matrix[4] = new_tx;
        self.line_matrix[5] = new_ty;
        self.text_matrix = self.line_matrix;
    }

    fn next_line(&mut self) {
        self.translate_line(0.0, -self.leading);
    }

    /// Width of an average glyph in unscaled text space.
    fn approx_glyph_width(&self) -> f32 {
        self.font_size * APPROX_CHAR_WIDTH_RATIO * self.horiz_scale
    }

    /// Horizontal displacement, in unscaled text space, of showing `bytes`.
    ///
    /// Uses the font's glyph widths when known, otherwise estimates one
    /// average glyph per decoded character.
    fn show_advance(&self, bytes: &[u8], text: &str, metrics: Option<&FontMetrics>) -> f32 {
        match metrics {
            Some(metrics) => bytes
                .iter()
                .map(|&code| {
                    let glyph = metrics.code_width(code) / 1000.0 * self.font_size;
                    let word = if code == b' ' { self.word_spacing } else { 0.0 };
                    (glyph + self.char_spacing + word) * self.horiz_scale
                })
                .sum(),
            None => text
                .chars()
                .map(|ch| {
                    let word = if ch == ' ' { self.word_spacing } else { 0.0 };
                    self.approx_glyph_width() + (self.char_spacing + word) * self.horiz_scale
                })
                .sum(),
        }
    }
}

// ---------------------------------------------------------------------------
// Internal: page walker
// ---------------------------------------------------------------------------

/// Per-page walk over the content stream.
struct PageWalker<'a> {
    decoder: Box<dyn TextDecoder + 'a>,
    fonts: &'a [BackendFontInfo],
    state: TextState,
    /// Current transformation matrix.
    ctm: Matrix,
    /// Graphics states saved by `q`.
    saved: Vec<(Matrix, TextState)>,
    items: Vec<ContentItem>,
}

impl<'a> PageWalker<'a> {
    fn new(decoder: Box<dyn TextDecoder + 'a>, fonts: &'a [BackendFontInfo]) -> Self {
        Self {
            decoder,
            fonts,
            state: TextState::default(),
            ctm: IDENTITY_MATRIX,
            saved: Vec::new(),
            items: Vec::new(),
        }
    }

    fn metrics(&self) -> Option<&'a FontMetrics> {
        self.fonts
            .iter()
            .find(|info| info.name == self.state.font_key)
            .and_then(|info| info.metrics.as_ref())
    }

    fn decode(&self, bytes: &[u8]) -> String {
        let decoded = self.decoder.decode(&self.state.font_key, bytes);
        if decoded.is_empty() {
            decode_text_simple(bytes)
        } else {
            decoded
        }
    }

    /// Emit a fragment that starts at `start` and spans `dx` text-space units.
    fn push_fragment(&mut self, text: String, start: &Matrix, dx: f32) {
        if text.is_empty() {
            return;
        }
        let m = multiply(start, &self.ctm);
        let rise = self.state.text_rise;
        let x = m[2] * rise + m[4];
        let y = m[3] * rise + m[5];
        let width = (dx * (m[0].powi(2) + m[1].powi(2)).sqrt()).abs();
        self.items
            .push(PositionedFragment::new(text, x, y, width).into());
    }

    /// Shared by `Tj`, `'` and `"`.
    fn show_string(&mut self, operand: &PdfValue) {
        let PdfValue::Str(bytes) = operand else {
            return;
        };
        let text = self.decode(bytes);
        let start = self.state.text_matrix;
        let dx = self.state.show_advance(bytes, &text, self.metrics());
        self.state.advance_x(dx);
        self.push_fragment(text, &start, dx);
    }

    /// Process a `TJ` array: strings to show interleaved with kerning
    /// adjustments in thousandths of a text-space unit. One fragment per
    /// array; large negative adjustments become spaces.
    fn show_array(&mut self, arr: &[PdfValue]) {
        let mut buf = String::new();
        let mut start: Option<Matrix> = None;
        let mut run_dx: f32 = 0.0;

        for elem in arr {
            match elem {
                PdfValue::Str(bytes) => {
                    let text = self.decode(bytes);
                    if start.is_none() {
                        start = Some(self.state.text_matrix);
                    }
                    let dx = self.state.show_advance(bytes, &text, self.metrics());
                    self.state.advance_x(dx);
                    run_dx += dx;
                    buf.push_str(&text);
                }
                val => {
                    if let Some(adj) = get_number_from_value(val) {
                        let dx = -adj / 1000.0 * self.state.font_size * self.state.horiz_scale;
                        let gap_threshold = self.state.approx_glyph_width() * TJ_SPACE_FRACTION;
                        if dx > gap_threshold && !buf.is_empty() && !buf.ends_with(' ') {
                            buf.push(' ');
                        }
                        self.state.advance_x(dx);
                        if start.is_some() {
                            run_dx += dx;
                        }
                    }
                }
            }
        }

        if let Some(start) = start {
            let text = buf.trim_end().to_string();
            self.push_fragment(text, &start, run_dx);
        }
    }

    fn set_font(&mut self, operands: &[PdfValue]) {
        if operands.len() < 2 {
            return;
        }
        let key = match &operands[0] {
            PdfValue::Name(n) => n.clone(),
            PdfValue::Str(s) => s.clone(),
            _ => return,
        };
        if !self.fonts.iter().any(|info| info.name == key) {
            debug!(
                "font {} not in page resources, estimating widths",
                String::from_utf8_lossy(&key)
            );
        }
        self.state.font_key = key;
        self.state.font_size = get_number_from_value(&operands[1]).unwrap_or(0.0);
    }

    fn apply(&mut self, operator: &str, operands: &[PdfValue]) {
        let number = |i: usize| operands.get(i).and_then(get_number_from_value);

        match operator {
            // -- Graphics state -----------------------------------------
            "q" => self.saved.push((self.ctm, self.state.clone())),
            "Q" => {
                if let Some((ctm, state)) = self.saved.pop() {
                    self.ctm = ctm;
                    self.state = state;
                }
            }
            "cm" => {
                if let Some(m) = matrix_operands(operands) {
                    self.ctm = multiply(&m, &self.ctm);
                }
            }

            // -- Text object delimiters ---------------------------------
            "BT" => {
                self.state.text_matrix = IDENTITY_MATRIX;
                self.state.line_matrix = IDENTITY_MATRIX;
            }
            "ET" => {}

            // -- Font ---------------------------------------------------
            "Tf" => self.set_font(operands),

            // -- Text matrix / position ---------------------------------
            "Tm" => {
                if let Some(m) = matrix_operands(operands) {
                    self.state.text_matrix = m;
                    self.state.line_matrix = m;
                }
            }
            "Td" => {
                if let (Some(tx), Some(ty)) = (number(0), number(1)) {
                    self.state.translate_line(tx, ty);
                }
            }
            "TD" => {
                if let (Some(tx), Some(ty)) = (number(0), number(1)) {
                    self.state.leading = -ty;
                    self.state.translate_line(tx, ty);
                }
            }
            "T*" => self.state.next_line(),
            "TL" => {
                if let Some(v) = number(0) {
                    self.state.leading = v;
                }
            }

            // -- Spacing / scaling --------------------------------------
            "Tc" => {
                if let Some(v) = number(0) {
                    self.state.char_spacing = v;
                }
            }
            "Tw" => {
                if let Some(v) = number(0) {
                    self.state.word_spacing = v;
                }
            }
            "Tz" => {
                if let Some(v) = number(0) {
                    self.state.horiz_scale = v / 100.0;
                }
            }
            "Ts" => {
                if let Some(v) = number(0) {
                    self.state.text_rise = v;
                }
            }

            // -- Show text ----------------------------------------------
            "Tj" => {
                if let Some(first) = operands.first() {
                    self.show_string(first);
                }
            }
            "TJ" => {
                if let Some(PdfValue::Array(arr)) = operands.first() {
                    self.show_array(arr);
                }
            }
            "'" => {
                self.state.next_line();
                if let Some(first) = operands.first() {
                    self.show_string(first);
                }
            }
            "\"" => {
                if operands.len() >= 3 {
                    if let Some(aw) = number(0) {
                        self.state.word_spacing = aw;
                    }
                    if let Some(ac) = number(1) {
                        self.state.char_spacing = ac;
                    }
                    self.state.next_line();
                    self.show_string(&operands[2]);
                }
            }

            // -- Images and forms ---------------------------------------
            "Do" | "BI" => self.items.push(ContentItem::Marker),

            _ => {}
        }
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Walk a single page's content stream and return its items in emission
/// order.
///
/// | Operator          | Action |
/// |-------------------|--------|
/// | `q` `Q` `cm`      | Save / restore / concatenate the CTM |
/// | `BT`              | Begin text object, reset matrices |
/// | `Tf`              | Set font and size |
/// | `Tm` `Td` `TD` `T*` `TL` | Position the text cursor |
/// | `Tc` `Tw` `Tz` `Ts` | Spacing, scaling, rise |
/// | `Tj` `'` `"`      | Show a string |
/// | `TJ`              | Show strings with kerning adjustments |
/// | `Do` `BI`         | Emit a marker |
pub fn extract_page_items(
    backend: &dyn PdfBackend,
    page_id: PageId,
) -> Result<Vec<ContentItem>, PdfError> {
    let raw_content = backend.page_content(page_id)?;
    let ops = backend.decode_content(&raw_content)?;
    let fonts = backend.page_fonts(page_id).unwrap_or_else(|e| {
        warn!("page {:?}: {}, falling back to estimated widths", page_id, e);
        Vec::new()
    });
    for font in fonts.iter().filter(|font| font.metrics.is_none()) {
        debug!(
            "font {} ({}) has no Widths, estimating",
            String::from_utf8_lossy(&font.name),
            font.subtype.as_deref().unwrap_or("unknown")
        );
    }

    let mut walker = PageWalker::new(backend.page_decoder(page_id), &fonts);
    for op in &ops {
        walker.apply(&op.operator, &op.operands);
    }

    Ok(walker.items)
}

/// Extract the items of every page, ordered by page number.
pub fn extract_all_pages(backend: &dyn PdfBackend) -> Result<Vec<Vec<ContentItem>>, PdfError> {
    let page_map = backend.pages();
    let mut result = Vec::with_capacity(page_map.len());

    for (&page_num, &page_id) in &page_map {
        let items = extract_page_items(backend, page_id)?;
        debug!("page {}: {} content items", page_num, items.len());
        result.push(items);
    }

    Ok(result)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
