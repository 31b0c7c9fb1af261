use std::collections::BTreeMap;

use log::debug;
use lopdf::{self, content::Content};

use crate::PdfError;

// ---------------------------------------------------------------------------
// Type aliases
// ---------------------------------------------------------------------------

/// A page identifier mirroring `lopdf::ObjectId`: (object number, generation number).
pub type PageId = (u32, u16);

// ---------------------------------------------------------------------------
// Supporting types
// ---------------------------------------------------------------------------

/// Glyph advance widths of a simple (single-byte) font.
#[derive(Debug, Clone, PartialEq)]
pub struct FontMetrics {
    /// Character code of the first entry in `widths`.
    pub first_char: u32,
    /// Advance widths in glyph space (thousandths of a text-space unit).
    pub widths: Vec<f32>,
    /// Width used for codes outside `widths`.
    pub missing_width: f32,
}

impl FontMetrics {
    /// Advance width of a character code, in glyph space.
    pub fn code_width(&self, code: u8) -> f32 {
        (code as u32)
            .checked_sub(self.first_char)
            .and_then(|i| self.widths.get(i as usize))
            .copied()
            .unwrap_or(self.missing_width)
    }
}

/// Font information extracted from a page's resource dictionary.
#[derive(Debug, Clone)]
pub struct BackendFontInfo {
    /// The font name key as it appears in the resource dictionary (e.g. `b"F1"`).
    pub name: Vec<u8>,
    /// Font subtype (e.g. `Type1`, `TrueType`, `Type0`).
    pub subtype: Option<String>,
    /// Glyph widths for simple fonts that declare a `Widths` array.
    pub metrics: Option<FontMetrics>,
}

/// A simplified, lopdf-independent representation of a PDF value.
///
/// This enum decouples the content-stream walker from the concrete
/// `lopdf::Object` type so that it can be tested with plain data.
#[derive(Debug, Clone, PartialEq)]
pub enum PdfValue {
    Null,
    Bool(bool),
    Integer(i64),
    Real(f32),
    Name(Vec<u8>),
    Str(Vec<u8>),
    Array(Vec<PdfValue>),
    Dict(Vec<(Vec<u8>, PdfValue)>),
    Reference(PageId),
}

/// A single content-stream operation (operator + operands).
#[derive(Debug, Clone)]
pub struct ContentOp {
    pub operator: String,
    pub operands: Vec<PdfValue>,
}

impl ContentOp {
    pub fn new(operator: impl Into<String>, operands: Vec<PdfValue>) -> Self {
        Self {
            operator: operator.into(),
            operands,
        }
    }
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Extract an `f32` from a [`PdfValue`], accepting both `Integer` and `Real`.
pub fn get_number_from_value(val: &PdfValue) -> Option<f32> {
    match val {
        PdfValue::Integer(i) => Some(*i as f32),
        PdfValue::Real(f) => Some(*f),
        _ => None,
    }
}

/// Convert a `lopdf::Object` into a [`PdfValue`].
///
/// Stream dictionaries are converted but the raw stream bytes are discarded.
pub fn convert_object(obj: &lopdf::Object) -> PdfValue {
    match obj {
        lopdf::Object::Null => PdfValue::Null,
        lopdf::Object::Boolean(b) => PdfValue::Bool(*b),
        lopdf::Object::Integer(i) => PdfValue::Integer(*i),
        lopdf::Object::Real(f) => PdfValue::Real(*f),
        lopdf::Object::Name(n) => PdfValue::Name(n.clone()),
        lopdf::Object::String(s, _) => PdfValue::Str(s.clone()),
        lopdf::Object::Array(arr) => PdfValue::Array(arr.iter().map(convert_object).collect()),
        lopdf::Object::Dictionary(dict) => PdfValue::Dict(
            dict.iter()
                .map(|(k, v)| (k.clone(), convert_object(v)))
                .collect(),
        ),
        lopdf::Object::Stream(stream) => PdfValue::Dict(
            stream
                .dict
                .iter()
                .map(|(k, v)| (k.clone(), convert_object(v)))
                .collect(),
        ),
        lopdf::Object::Reference(id) => PdfValue::Reference(*id),
    }
}

/// Best-effort decoding of raw PDF string bytes into a Rust `String`.
///
/// 1. UTF-16BE with BOM (`\xFE\xFF` prefix).
/// 2. Valid UTF-8.
/// 3. Latin-1, each byte mapped to its Unicode code point.
pub fn decode_text_simple(bytes: &[u8]) -> String {
    if let Some(payload) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let code_units: Vec<u16> = payload
            .chunks_exact(2)
            .map(|chunk| u16::from_be_bytes([chunk[0], chunk[1]]))
            .collect();
        return String::from_utf16_lossy(&code_units);
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    bytes.iter().map(|&b| b as char).collect()
}

// ---------------------------------------------------------------------------
// PdfBackend trait
// ---------------------------------------------------------------------------

/// Abstraction over the PDF parsing library (currently `lopdf`).
///
/// The fragment extractor only talks to this trait, so it can be exercised
/// against hand-written content streams in tests.
pub trait PdfBackend {
    /// Return a mapping from 1-based page number to [`PageId`].
    fn pages(&self) -> BTreeMap<u32, PageId>;

    /// Return font information for every font referenced by the given page.
    fn page_fonts(&self, page: PageId) -> Result<Vec<BackendFontInfo>, PdfError>;

    /// Return the raw (decompressed) content stream bytes for a page.
    fn page_content(&self, page: PageId) -> Result<Vec<u8>, PdfError>;

    /// Decode raw content-stream bytes into a sequence of [`ContentOp`]s.
    fn decode_content(&self, data: &[u8]) -> Result<Vec<ContentOp>, PdfError>;

    /// Build a text decoder for the fonts of one page. Font encodings are
    /// resolved once here and reused for every text-showing operator.
    fn page_decoder<'a>(&'a self, page: PageId) -> Box<dyn TextDecoder + 'a>;
}

/// Turns the raw bytes of a text-showing operator into Unicode for the
/// currently selected font.
pub trait TextDecoder {
    fn decode(&self, font_name: &[u8], bytes: &[u8]) -> String;
}

/// Decoder used when a page has no usable font encodings.
pub struct SimpleDecoder;

impl TextDecoder for SimpleDecoder {
    fn decode(&self, _font_name: &[u8], bytes: &[u8]) -> String {
        decode_text_simple(bytes)
    }
}

// ---------------------------------------------------------------------------
// LopdfBackend
// ---------------------------------------------------------------------------

/// Concrete [`PdfBackend`] implementation backed by [`lopdf::Document`].
pub struct LopdfBackend {
    doc: lopdf::Document,
}

impl LopdfBackend {
    /// Parse a PDF from an in-memory byte slice.
    pub fn load_bytes(data: &[u8]) -> Result<Self, PdfError> {
        let doc = lopdf::Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        if doc.is_encrypted() {
            return Err(PdfError::Encrypted);
        }

        Ok(Self { doc })
    }

    // -- private helpers ----------------------------------------------------

    /// Follow a single level of indirection.
    fn resolve<'a>(&'a self, obj: &'a lopdf::Object) -> Option<&'a lopdf::Object> {
        match obj {
            lopdf::Object::Reference(id) => self.doc.get_object(*id).ok(),
            other => Some(other),
        }
    }

    fn resolve_number(&self, obj: &lopdf::Object) -> Option<f32> {
        match self.resolve(obj)? {
            lopdf::Object::Integer(i) => Some(*i as f32),
            lopdf::Object::Real(f) => Some(*f),
            _ => None,
        }
    }

    /// Read `FirstChar`, `Widths` and the descriptor's `MissingWidth` from a
    /// simple font dictionary. Composite (`Type0`) fonts index glyphs by CID
    /// and are left to the width estimate.
    fn font_metrics(&self, dict: &lopdf::Dictionary) -> Option<FontMetrics> {
        if let Ok(subtype) = dict.get(b"Subtype").and_then(|o| o.as_name()) {
            if subtype == b"Type0" {
                return None;
            }
        }

        let first_char = dict
            .get(b"FirstChar")
            .ok()
            .and_then(|o| self.resolve_number(o))? as u32;

        let widths = match self.resolve(dict.get(b"Widths").ok()?)? {
            lopdf::Object::Array(arr) => arr
                .iter()
                .map(|o| self.resolve_number(o).unwrap_or(0.0))
                .collect::<Vec<f32>>(),
            _ => return None,
        };

        let missing_width = dict
            .get(b"FontDescriptor")
            .ok()
            .and_then(|o| self.resolve(o))
            .and_then(|o| o.as_dict().ok())
            .and_then(|d| d.get(b"MissingWidth").ok())
            .and_then(|o| self.resolve_number(o))
            .unwrap_or(0.0);

        Some(FontMetrics {
            first_char,
            widths,
            missing_width,
        })
    }
}

/// Per-page font encodings resolved through lopdf: the standard single-byte
/// encodings (`WinAnsiEncoding`, `MacRomanEncoding`, ...) and `ToUnicode`
/// CMaps of composite fonts.
struct LopdfPageDecoder<'a> {
    encodings: BTreeMap<Vec<u8>, lopdf::Encoding<'a>>,
}

impl TextDecoder for LopdfPageDecoder<'_> {
    fn decode(&self, font_name: &[u8], bytes: &[u8]) -> String {
        self.encodings
            .get(font_name)
            .and_then(|enc| lopdf::Document::decode_text(enc, bytes).ok())
            .unwrap_or_else(|| decode_text_simple(bytes))
    }
}

/// Whether lopdf has anything to go on for this font. Fonts with neither a
/// named encoding nor a `ToUnicode` CMap are left to [`decode_text_simple`].
fn has_usable_encoding(dict: &lopdf::Dictionary) -> bool {
    dict.get(b"Encoding").and_then(|o| o.as_name()).is_ok() || dict.has(b"ToUnicode")
}

// ---------------------------------------------------------------------------
// PdfBackend implementation for LopdfBackend
// ---------------------------------------------------------------------------

impl PdfBackend for LopdfBackend {
    fn pages(&self) -> BTreeMap<u32, PageId> {
        self.doc.get_pages()
    }

    fn page_fonts(&self, page: PageId) -> Result<Vec<BackendFontInfo>, PdfError> {
        let fonts_map = self
            .doc
            .get_page_fonts(page)
            .map_err(|e| PdfError::Parse(format!("cannot get page fonts: {}", e)))?;

        let mut result = Vec::with_capacity(fonts_map.len());
        for (name, dict) in &fonts_map {
            let subtype = dict
                .get(b"Subtype")
                .ok()
                .and_then(|o| o.as_name().ok())
                .map(|n| String::from_utf8_lossy(n).into_owned());

            result.push(BackendFontInfo {
                name: name.clone(),
                subtype,
                metrics: self.font_metrics(dict),
            });
        }

        Ok(result)
    }

    fn page_content(&self, page: PageId) -> Result<Vec<u8>, PdfError> {
        self.doc
            .get_page_content(page)
            .map_err(|e| PdfError::Parse(format!("cannot get page content: {}", e)))
    }

    fn decode_content(&self, data: &[u8]) -> Result<Vec<ContentOp>, PdfError> {
        let content = Content::decode(data)
            .map_err(|e| PdfError::Parse(format!("content stream decode error: {}", e)))?;

        Ok(content
            .operations
            .into_iter()
            .map(|op| ContentOp::new(op.operator, op.operands.iter().map(convert_object).collect()))
            .collect())
    }

    fn page_decoder<'a>(&'a self, page: PageId) -> Box<dyn TextDecoder + 'a> {
        let fonts = match self.doc.get_page_fonts(page) {
            Ok(fonts) => fonts,
            Err(e) => {
                debug!("page {:?}: no font encodings ({})", page, e);
                return Box::new(SimpleDecoder);
            }
        };

        let mut encodings = BTreeMap::new();
        for (name, dict) in fonts {
            if !has_usable_encoding(dict) {
                continue;
            }
            match dict.get_font_encoding(&self.doc) {
                Ok(enc) => {
                    encodings.insert(name, enc);
                }
                Err(e) => debug!(
                    "font {}: unsupported encoding ({})",
                    String::from_utf8_lossy(&name),
                    e
                ),
            }
        }

        Box::new(LopdfPageDecoder { encodings })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- decode_text_simple -------------------------------------------------

    #[test]
    fn decode_text_simple_utf8() {
        assert_eq!(decode_text_simple("Hello, world!".as_bytes()), "Hello, world!");
    }

    #[test]
    fn decode_text_simple_latin1() {
        // 0xE9 is U+00E9 in Latin-1 but not valid standalone UTF-8.
        let input: &[u8] = &[0x63, 0x61, 0x66, 0xE9];
        assert_eq!(decode_text_simple(input), "caf\u{00E9}");
    }

    #[test]
    fn decode_text_simple_utf16be() {
        let input: &[u8] = &[0xFE, 0xFF, 0x00, 0x41, 0x00, 0x42];
        assert_eq!(decode_text_simple(input), "AB");
    }

    #[test]
    fn decode_text_simple_utf16be_odd_trailing_byte() {
        let input: &[u8] = &[0xFE, 0xFF, 0x00, 0x41, 0x00];
        assert_eq!(decode_text_simple(input), "A");
    }

    #[test]
    fn decode_text_simple_empty() {
        assert_eq!(decode_text_simple(&[]), "");
    }

    // -- get_number_from_value ----------------------------------------------

    #[test]
    fn get_number_accepts_integer_and_real() {
        assert_eq!(get_number_from_value(&PdfValue::Integer(42)), Some(42.0));
        assert_eq!(get_number_from_value(&PdfValue::Real(2.5)), Some(2.5));
        assert_eq!(get_number_from_value(&PdfValue::Null), None);
        assert_eq!(get_number_from_value(&PdfValue::Str(b"1".to_vec())), None);
    }

    // -- convert_object -----------------------------------------------------

    #[test]
    fn convert_string_and_array() {
        let arr = lopdf::Object::Array(vec![
            lopdf::Object::String(b"Hi".to_vec(), lopdf::StringFormat::Literal),
            lopdf::Object::Integer(-120),
        ]);
        assert_eq!(
            convert_object(&arr),
            PdfValue::Array(vec![PdfValue::Str(b"Hi".to_vec()), PdfValue::Integer(-120)]),
        );
    }

    #[test]
    fn convert_reference() {
        let obj = lopdf::Object::Reference((7, 0));
        assert_eq!(convert_object(&obj), PdfValue::Reference((7, 0)));
    }

    // -- FontMetrics --------------------------------------------------------

    #[test]
    fn font_metrics_code_width() {
        let metrics = FontMetrics {
            first_char: 32,
            widths: vec![250.0, 333.0, 408.0],
            missing_width: 500.0,
        };
        assert_eq!(metrics.code_width(32), 250.0);
        assert_eq!(metrics.code_width(34), 408.0);
        // Below FirstChar and past the end of Widths.
        assert_eq!(metrics.code_width(10), 500.0);
        assert_eq!(metrics.code_width(35), 500.0);
    }

    // -- LopdfBackend -------------------------------------------------------

    #[test]
    fn load_bytes_rejects_garbage() {
        assert!(matches!(
            LopdfBackend::load_bytes(b"not a pdf"),
            Err(PdfError::Parse(_))
        ));
    }

    #[test]
    fn decode_content_parses_text_operators() {
        let doc = lopdf::Document::with_version("1.5");
        let backend = LopdfBackend { doc };
        let ops = backend
            .decode_content(b"BT /F1 12 Tf 72 700 Td (Hello) Tj ET")
            .unwrap();
        let operators: Vec<&str> = ops.iter().map(|op| op.operator.as_str()).collect();
        assert_eq!(operators, vec!["BT", "Tf", "Td", "Tj", "ET"]);
        assert_eq!(ops[3].operands, vec![PdfValue::Str(b"Hello".to_vec())]);
    }

    #[test]
    fn page_decoder_without_fonts_decodes_simply() {
        let backend = LopdfBackend {
            doc: lopdf::Document::with_version("1.5"),
        };
        let decoder = backend.page_decoder((1, 0));
        assert_eq!(decoder.decode(b"F1", &[0x63, 0x61, 0x66, 0xE9]), "caf\u{00E9}");
    }
}
