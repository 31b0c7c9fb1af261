//! Word and line diffs, change statistics, page pairing and the pass/fail gate.
//!
//! ```text
//! (old text, new text)  ->  DiffPart[]  ->  DiffStats
//!                           word_diff        compute_stats
//!                           line_diff
//!
//! DiffStats[]  ->  DiffStats          (Document, Document)  ->  AggregateResult
//!   combine_stats                       compare_documents
//! ```
//!
//! Every part sequence satisfies the round-trip property: concatenating the
//! values of all parts except `Removed` reproduces the new text exactly, and
//! all parts except `Added` reproduce the old text exactly.

use serde::{Deserialize, Serialize};
use similar::{Algorithm, ChangeTag, TextDiff};

use crate::document::Document;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Which side(s) of the comparison a span of text belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffTag {
    Unchanged,
    /// Present only in the modified text.
    Added,
    /// Present only in the original text.
    Removed,
}

impl From<ChangeTag> for DiffTag {
    fn from(tag: ChangeTag) -> Self {
        match tag {
            ChangeTag::Equal => DiffTag::Unchanged,
            ChangeTag::Insert => DiffTag::Added,
            ChangeTag::Delete => DiffTag::Removed,
        }
    }
}

/// A tagged span of text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffPart {
    pub value: String,
    pub tag: DiffTag,
}

impl DiffPart {
    pub fn new(value: impl Into<String>, tag: DiffTag) -> Self {
        Self {
            value: value.into(),
            tag,
        }
    }

    pub fn is_change(&self) -> bool {
        matches!(self.tag, DiffTag::Added | DiffTag::Removed)
    }
}

/// Word counts for one or more diffs.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffStats {
    pub additions: usize,
    pub deletions: usize,
    pub unchanged: usize,
    pub total_changes: usize,
    /// `total_changes / (total_changes + unchanged) * 100`, or 0 when there are
    /// no words at all.
    pub change_percentage: f64,
}

impl DiffStats {
    /// Build stats from raw counters, deriving the totals.
    pub fn from_counts(additions: usize, deletions: usize, unchanged: usize) -> Self {
        let total_changes = additions + deletions;
        let total_words = total_changes + unchanged;
        let change_percentage = if total_words > 0 {
            total_changes as f64 / total_words as f64 * 100.0
        } else {
            0.0
        };

        Self {
            additions,
            deletions,
            unchanged,
            total_changes,
            change_percentage,
        }
    }
}

/// The diff of one page pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageDiff {
    pub page_number: usize,
    pub parts: Vec<DiffPart>,
    pub has_changes: bool,
    pub stats: DiffStats,
}

impl PageDiff {
    pub fn new(page_number: usize, parts: Vec<DiffPart>) -> Self {
        let has_changes = has_changes(&parts);
        let stats = compute_stats(&parts);
        Self {
            page_number,
            parts,
            has_changes,
            stats,
        }
    }
}

/// The outcome of comparing two documents over a set of pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateResult {
    /// Combined statistics, recomputed from the summed page counters.
    pub stats: DiffStats,
    /// Page diffs in comparison order.
    pub pages: Vec<PageDiff>,
}

impl AggregateResult {
    pub fn from_pages(pages: Vec<PageDiff>) -> Self {
        let stats = combine_stats(pages.iter().map(|p| p.stats));
        Self { stats, pages }
    }

    /// True iff any compared page changed.
    pub fn has_differences(&self) -> bool {
        self.pages.iter().any(|p| p.has_changes)
    }

    pub fn changed_pages(&self) -> usize {
        self.pages.iter().filter(|p| p.has_changes).count()
    }

    /// Apply a pass/fail policy. `true` means the gate was exceeded.
    pub fn exceeds(&self, policy: &GatePolicy) -> bool {
        match policy {
            GatePolicy::AnyChange => self.has_differences(),
            GatePolicy::Threshold(limit) => self.stats.change_percentage > *limit,
        }
    }
}

/// Pass/fail policy for a comparison. Exactly one applies per run.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum GatePolicy {
    /// Fail when any page has a change.
    #[default]
    AnyChange,
    /// Fail when the combined change percentage is strictly above the limit.
    Threshold(f64),
}

impl GatePolicy {
    pub fn from_threshold(threshold: Option<f64>) -> Self {
        threshold.map_or(GatePolicy::AnyChange, GatePolicy::Threshold)
    }
}

/// Unit of alignment used when diffing page text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffGranularity {
    /// Words and the whitespace between them; inline highlighting.
    #[default]
    Word,
    /// Whole lines; line-level grouping.
    Line,
}

// ---------------------------------------------------------------------------
// Diffing
// ---------------------------------------------------------------------------

/// Diff two texts at word granularity.
///
/// Words and whitespace runs are separate tokens, so a change in spacing alone
/// is reported as a change (it contributes no words to the statistics).
pub fn word_diff(old: &str, new: &str) -> Vec<DiffPart> {
    let diff = TextDiff::configure()
        .algorithm(Algorithm::Myers)
        .diff_words(old, new);
    collect_parts(&diff)
}

/// Diff two texts at line granularity. Line terminators stay with their line.
pub fn line_diff(old: &str, new: &str) -> Vec<DiffPart> {
    let diff = TextDiff::configure()
        .algorithm(Algorithm::Myers)
        .diff_lines(old, new);
    collect_parts(&diff)
}

/// Diff two texts at the requested granularity.
pub fn diff_text(old: &str, new: &str, granularity: DiffGranularity) -> Vec<DiffPart> {
    match granularity {
        DiffGranularity::Word => word_diff(old, new),
        DiffGranularity::Line => line_diff(old, new),
    }
}

/// Merge the token-level changes of a diff into parts, one per run of equal
/// tags.
fn collect_parts<'a>(diff: &TextDiff<'a, 'a, '_, str>) -> Vec<DiffPart> {
    let mut parts: Vec<DiffPart> = Vec::new();

    for change in diff.iter_all_changes() {
        let tag = DiffTag::from(change.tag());
        let value = change.value();

        match parts.last_mut() {
            Some(last) if last.tag == tag => last.value.push_str(value),
            _ => parts.push(DiffPart::new(value, tag)),
        }
    }

    parts
}

/// True iff any part is an addition or a removal.
pub fn has_changes(parts: &[DiffPart]) -> bool {
    parts.iter().any(DiffPart::is_change)
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

/// Number of whitespace-separated words in a span.
fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Count the words of each part towards additions, deletions or unchanged.
pub fn compute_stats(parts: &[DiffPart]) -> DiffStats {
    let mut additions = 0;
    let mut deletions = 0;
    let mut unchanged = 0;

    for part in parts {
        let words = word_count(&part.value);
        match part.tag {
            DiffTag::Added => additions += words,
            DiffTag::Removed => deletions += words,
            DiffTag::Unchanged => unchanged += words,
        }
    }

    DiffStats::from_counts(additions, deletions, unchanged)
}

/// Sum the counters of several stats and recompute the percentage from the
/// sums. Per-entry percentages are ignored.
pub fn combine_stats<I>(stats: I) -> DiffStats
where
    I: IntoIterator<Item = DiffStats>,
{
    let (additions, deletions, unchanged) = stats
        .into_iter()
        .fold((0, 0, 0), |(a, d, u), s| {
            (a + s.additions, d + s.deletions, u + s.unchanged)
        });

    DiffStats::from_counts(additions, deletions, unchanged)
}

// ---------------------------------------------------------------------------
// Document comparison
// ---------------------------------------------------------------------------

/// Diff one page of two documents. A page missing from either side is
/// treated as empty.
pub fn compare_page(
    original: &Document,
    modified: &Document,
    page_number: usize,
    granularity: DiffGranularity,
) -> PageDiff {
    let old = original.page_text(page_number).unwrap_or_default();
    let new = modified.page_text(page_number).unwrap_or_default();
    PageDiff::new(page_number, diff_text(old, new, granularity))
}

/// Compare two documents page by page, pairing pages strictly by number.
pub fn compare_documents(
    original: &Document,
    modified: &Document,
    pages: &[usize],
    granularity: DiffGranularity,
) -> AggregateResult {
    let page_diffs = pages
        .iter()
        .map(|&n| compare_page(original, modified, n, granularity))
        .collect();
    AggregateResult::from_pages(page_diffs)
}

/// Number of pages a full comparison covers: the page count of the longer
/// document.
pub fn comparable_pages(original: &Document, modified: &Document) -> usize {
    original.total_pages().max(modified.total_pages())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
