//! Projections of one comparison into text, JSON, JUnit-XML and HTML.
//!
//! Every renderer is a pure function of [`ReportData`]. Counts are read from
//! the same [`DiffStats`](crate::diff::DiffStats) values in all formats, so the
//! formats always agree.

use serde::{Deserialize, Serialize};

use crate::diff::AggregateResult;
use crate::document::Document;

mod html;
mod json;
mod junit;
mod text;

pub use html::{escape_html, render_html};
pub use json::render_json;
pub use junit::render_junit;
pub use text::render_text;

/// Everything a report needs. Borrowed from the caller; nothing is computed
/// here that the diff engine has not already produced.
#[derive(Debug, Clone, Copy)]
pub struct ReportData<'a> {
    pub original: &'a Document,
    pub modified: &'a Document,
    pub result: &'a AggregateResult,
    /// Generation time, already formatted for display.
    pub generated_at: &'a str,
}

impl<'a> ReportData<'a> {
    pub fn new(
        original: &'a Document,
        modified: &'a Document,
        result: &'a AggregateResult,
        generated_at: &'a str,
    ) -> Self {
        Self {
            original,
            modified,
            result,
            generated_at,
        }
    }

    fn changed_pages(&self) -> usize {
        self.result.changed_pages()
    }

    fn compared_pages(&self) -> usize {
        self.result.pages.len()
    }
}

/// Format used for the console projection of a comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Junit,
}

/// Render the console projection in the given format.
pub fn render(format: OutputFormat, data: &ReportData<'_>) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Text => Ok(render_text(data)),
        OutputFormat::Json => render_json(data),
        OutputFormat::Junit => Ok(render_junit(data)),
    }
}

/// Format a percentage with one decimal, as shown in every report.
pub fn format_percentage(value: f64) -> String {
    format!("{:.1}", value)
}

/// Which report artifacts to write to the output directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    Html,
    Pdf,
    #[default]
    Both,
}

impl ReportKind {
    /// Whether the HTML report is kept as an artifact.
    pub fn keeps_html(&self) -> bool {
        matches!(self, ReportKind::Html | ReportKind::Both)
    }

    /// Whether the HTML report is printed to PDF.
    pub fn wants_pdf(&self) -> bool {
        matches!(self, ReportKind::Pdf | ReportKind::Both)
    }
}

/// File name of the HTML report inside the output directory.
pub const HTML_REPORT_NAME: &str = "report.html";

/// File name of the PDF report inside the output directory.
pub const PDF_REPORT_NAME: &str = "report.pdf";

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::diff::{compare_documents, AggregateResult, DiffGranularity};
    use crate::document::Document;

    /// Five pages, pages 2 and 4 changed.
    pub fn five_pages() -> (Document, Document, AggregateResult) {
        let original = Document::from_texts(
            "contract-v1.pdf",
            ["intro", "pay 100 dollars", "terms", "signed by Alice", "end"],
        );
        let modified = Document::from_texts(
            "contract-v2.pdf",
            ["intro", "pay 200 dollars", "terms", "signed by Alice and Bob", "end"],
        );
        let result = compare_documents(&original, &modified, &[1, 2, 3, 4, 5], DiffGranularity::Word);
        (original, modified, result)
    }

    pub const GENERATED_AT: &str = "2024-05-01 10:00:00";
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_all_formats_agree_on_counts() {
        let (original, modified, result) = five_pages();
        let data = ReportData::new(&original, &modified, &result, GENERATED_AT);

        let stats = result.stats;
        assert_eq!(stats.additions, 3);
        assert_eq!(stats.deletions, 1);

        let text = render_text(&data);
        assert!(text.contains(&format!("+ Additions:  {}", stats.additions)));
        assert!(text.contains(&format!("- Deletions:  {}", stats.deletions)));

        let json: serde_json::Value = serde_json::from_str(&render_json(&data).unwrap()).unwrap();
        assert_eq!(json["statistics"]["additions"], stats.additions);
        assert_eq!(json["statistics"]["deletions"], stats.deletions);
        assert_eq!(json["statistics"]["unchanged"], stats.unchanged);

        let html = render_html(&data);
        assert!(html.contains(&format!("<div class=\"value\">+{}</div>", stats.additions)));
        assert!(html.contains(&format!("<div class=\"value\">-{}</div>", stats.deletions)));
        assert!(html.contains(&format!("<div class=\"value\">{}</div>", stats.unchanged)));
    }

    #[test]
    fn test_render_dispatch() {
        let (original, modified, result) = five_pages();
        let data = ReportData::new(&original, &modified, &result, GENERATED_AT);

        assert_eq!(render(OutputFormat::Text, &data).unwrap(), render_text(&data));
        assert_eq!(render(OutputFormat::Junit, &data).unwrap(), render_junit(&data));
        assert!(render(OutputFormat::Json, &data).unwrap().starts_with('{'));
    }

    #[test]
    fn test_report_kind() {
        assert!(ReportKind::Both.keeps_html() && ReportKind::Both.wants_pdf());
        assert!(ReportKind::Html.keeps_html() && !ReportKind::Html.wants_pdf());
        assert!(!ReportKind::Pdf.keeps_html() && ReportKind::Pdf.wants_pdf());
    }

    #[test]
    fn test_format_percentage() {
        assert_eq!(format_percentage(0.0), "0.0");
        assert_eq!(format_percentage(25.0), "25.0");
        assert_eq!(format_percentage(100.0 / 101.0), "1.0");
    }
}
