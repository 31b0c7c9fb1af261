//! Positioned fragments to linear page text.
//!
//! A PDF page does not store lines or words, only runs of glyphs placed at
//! coordinates. This module turns the runs of one page, in the order the
//! extractor emitted them, into a single string with inferred line breaks and
//! inter-word spaces.
//!
//! ```text
//! ContentItem[]  ->  String
//!  (per page)        reconstruct_page_text
//! ```
//!
//! Emission order is trusted as reading order. Fragments are never sorted by
//! position, so multi-column layouts and tables whose runs interleave vertically
//! may come out interleaved. Diffing only needs a deterministic string per page.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// A single run of text at a specific position on the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionedFragment {
    pub text: String,
    /// X origin of the run.
    pub x: f32,
    /// Baseline Y of the run.
    pub y: f32,
    /// Rendered width of the run.
    pub width: f32,
}

impl PositionedFragment {
    pub fn new(text: impl Into<String>, x: f32, y: f32, width: f32) -> Self {
        Self {
            text: text.into(),
            x,
            y,
            width,
        }
    }

    /// X coordinate where the run ends.
    pub fn right(&self) -> f32 {
        self.x + self.width
    }
}

/// One item of a page's content, in emission order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ContentItem {
    Text(PositionedFragment),
    /// A non-text item such as an image or form XObject invocation.
    /// Contributes no text.
    Marker,
}

impl ContentItem {
    fn as_text(&self) -> Option<&PositionedFragment> {
        match self {
            ContentItem::Text(fragment) => Some(fragment),
            ContentItem::Marker => None,
        }
    }
}

impl From<PositionedFragment> for ContentItem {
    fn from(fragment: PositionedFragment) -> Self {
        ContentItem::Text(fragment)
    }
}

/// Geometry tolerances used by [`reconstruct_page_text`].
///
/// Font metrics and producer quirks vary between documents, so both values are
/// meant to be tuned per corpus.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Baseline shift, in geometry units, above which a new line starts.
    pub line_tolerance: f32,
    /// Horizontal gap, in geometry units, above which two runs are separate words.
    pub word_gap: f32,
}

/// Default baseline shift that starts a new line.
pub const DEFAULT_LINE_TOLERANCE: f32 = 5.0;

/// Default horizontal gap that separates two words.
pub const DEFAULT_WORD_GAP: f32 = 2.0;

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            line_tolerance: DEFAULT_LINE_TOLERANCE,
            word_gap: DEFAULT_WORD_GAP,
        }
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Rebuild the text of one page from its content items.
///
/// - A fragment whose baseline differs from the previous fragment's by more
///   than `line_tolerance` starts a new line. The first fragment never does.
/// - A space follows a fragment when the next item is a fragment starting more
///   than `word_gap` after this one ends.
/// - Markers are skipped. They do not move the tracked baseline, but they do
///   separate their neighbours, so no space is inserted before a marker.
///
/// Never fails: non-finite geometry only affects where breaks and spaces land.
pub fn reconstruct_page_text(items: &[ContentItem], config: &LayoutConfig) -> String {
    let mut text = String::new();
    let mut last_y: Option<f32> = None;

    for (index, item) in items.iter().enumerate() {
        let Some(fragment) = item.as_text() else {
            continue;
        };

        if let Some(prev_y) = last_y {
            if (fragment.y - prev_y).abs() > config.line_tolerance {
                text.push('\n');
            }
        }
        last_y = Some(fragment.y);

        text.push_str(&fragment.text);

        let next = items.get(index + 1).and_then(ContentItem::as_text);
        if let Some(next) = next {
            if next.x - fragment.right() > config.word_gap {
                text.push(' ');
            }
        }
    }

    text
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn frag(text: &str, x: f32, y: f32, width: f32) -> ContentItem {
        ContentItem::Text(PositionedFragment::new(text, x, y, width))
    }

    #[test]
    fn test_empty_page() {
        assert_eq!(reconstruct_page_text(&[], &LayoutConfig::default()), "");
    }

    #[test]
    fn test_only_markers() {
        let items = vec![ContentItem::Marker, ContentItem::Marker];
        assert_eq!(reconstruct_page_text(&items, &LayoutConfig::default()), "");
    }

    #[test]
    fn test_single_fragment_has_no_leading_break() {
        let items = vec![frag("Hello", 72.0, 700.0, 25.0)];
        assert_eq!(
            reconstruct_page_text(&items, &LayoutConfig::default()),
            "Hello"
        );
    }

    #[test]
    fn test_word_gap_inserts_space() {
        let items = vec![
            frag("Hello", 72.0, 700.0, 25.0),
            frag("world", 102.0, 700.0, 25.0),
        ];
        assert_eq!(
            reconstruct_page_text(&items, &LayoutConfig::default()),
            "Hello world"
        );
    }

    #[test]
    fn test_letter_spacing_does_not_insert_space() {
        // 1.5 units between runs is below the default word gap.
        let items = vec![frag("Hel", 72.0, 700.0, 15.0), frag("lo", 88.5, 700.0, 10.0)];
        assert_eq!(
            reconstruct_page_text(&items, &LayoutConfig::default()),
            "Hello"
        );
    }

    #[test]
    fn test_baseline_shift_inserts_newline() {
        let items = vec![
            frag("First line", 72.0, 700.0, 50.0),
            frag("Second line", 72.0, 686.0, 55.0),
        ];
        assert_eq!(
            reconstruct_page_text(&items, &LayoutConfig::default()),
            "First line\nSecond line"
        );
    }

    #[test]
    fn test_small_baseline_jitter_stays_on_line() {
        // Superscripts and mixed fonts move the baseline a little.
        let items = vec![frag("x", 72.0, 700.0, 5.0), frag("2", 77.0, 703.0, 3.0)];
        assert_eq!(reconstruct_page_text(&items, &LayoutConfig::default()), "x2");
    }

    #[test]
    fn test_newline_and_space_on_line_wrap() {
        // The next fragment starts far to the left, so no space; the baseline
        // drops, so a newline.
        let items = vec![
            frag("end", 300.0, 700.0, 15.0),
            frag("start", 72.0, 686.0, 25.0),
        ];
        assert_eq!(
            reconstruct_page_text(&items, &LayoutConfig::default()),
            "end\nstart"
        );
    }

    #[test]
    fn test_marker_is_skipped_and_keeps_baseline() {
        let items = vec![
            frag("Before", 72.0, 700.0, 30.0),
            ContentItem::Marker,
            frag("after", 110.0, 700.0, 25.0),
        ];
        // No newline: the marker did not reset the tracked baseline.
        // No space: the item right after "Before" is not text.
        assert_eq!(
            reconstruct_page_text(&items, &LayoutConfig::default()),
            "Beforeafter"
        );
    }

    #[test]
    fn test_custom_tolerances() {
        let items = vec![
            frag("a", 0.0, 100.0, 5.0),
            frag("b", 8.0, 97.0, 5.0),
        ];
        let tight = LayoutConfig {
            line_tolerance: 1.0,
            word_gap: 10.0,
        };
        assert_eq!(reconstruct_page_text(&items, &tight), "a\nb");

        let loose = LayoutConfig {
            line_tolerance: 10.0,
            word_gap: 1.0,
        };
        assert_eq!(reconstruct_page_text(&items, &loose), "a b");
    }

    #[test]
    fn test_non_finite_geometry_is_defined() {
        let items = vec![
            frag("a", f32::NAN, f32::NAN, f32::NAN),
            frag("b", f32::INFINITY, 10.0, 1.0),
            frag("c", 0.0, f32::NEG_INFINITY, 1.0),
        ];
        let text = reconstruct_page_text(&items, &LayoutConfig::default());
        assert!(text.contains('a'));
        assert!(text.contains('b'));
        assert!(text.contains('c'));
    }

    #[test]
    fn test_deterministic() {
        let items = vec![
            frag("one", 72.0, 700.0, 15.0),
            frag("two", 95.0, 700.0, 15.0),
            frag("three", 72.0, 680.0, 25.0),
        ];
        let config = LayoutConfig::default();
        assert_eq!(
            reconstruct_page_text(&items, &config),
            reconstruct_page_text(&items, &config)
        );
        assert_eq!(reconstruct_page_text(&items, &config), "one two\nthree");
    }
}
