use super::{format_percentage, ReportData};

const WIDTH: usize = 60;

/// Plain-text summary for terminals and logs.
pub fn render_text(data: &ReportData<'_>) -> String {
    let stats = &data.result.stats;
    let heavy = "═".repeat(WIDTH);
    let light = "─".repeat(WIDTH);
    let mut lines: Vec<String> = Vec::new();

    lines.push(heavy.clone());
    lines.push(centered("PDF DIFF REPORT"));
    lines.push(heavy.clone());
    lines.push(String::new());
    lines.push(format!(
        "Original: {} ({} pages)",
        data.original.name,
        data.original.total_pages()
    ));
    lines.push(format!(
        "Modified: {} ({} pages)",
        data.modified.name,
        data.modified.total_pages()
    ));
    lines.push(String::new());

    lines.push(light.clone());
    lines.push(centered("STATISTICS"));
    lines.push(light.clone());
    lines.push(format!("  + Additions:  {}", stats.additions));
    lines.push(format!("  - Deletions:  {}", stats.deletions));
    lines.push(format!("    Unchanged:  {}", stats.unchanged));
    lines.push(format!(
        "    Changed:    {}%",
        format_percentage(stats.change_percentage)
    ));
    lines.push(String::new());

    lines.push(light.clone());
    lines.push(centered(&format!(
        "PAGE SUMMARY ({}/{} changed)",
        data.changed_pages(),
        data.compared_pages()
    )));
    lines.push(light);

    for page in &data.result.pages {
        let status = if page.has_changes {
            "✎ CHANGED"
        } else {
            "✓ OK"
        };
        lines.push(format!("  Page {}: {}", page.page_number, status));
    }

    lines.push(String::new());
    lines.push(heavy);

    lines.join("\n")
}

/// Center a title within the banner width.
fn centered(title: &str) -> String {
    let len = title.chars().count();
    let pad = WIDTH.saturating_sub(len) / 2;
    format!("{}{}", " ".repeat(pad), title)
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::*;
    use super::*;
    use crate::diff::{compare_documents, DiffGranularity};
    use crate::document::Document;

    #[test]
    fn test_text_banner_and_files() {
        let (original, modified, result) = five_pages();
        let data = ReportData::new(&original, &modified, &result, GENERATED_AT);
        let text = render_text(&data);

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "═".repeat(60));
        assert_eq!(lines[1].trim(), "PDF DIFF REPORT");
        assert!(text.contains("Original: contract-v1.pdf (5 pages)"));
        assert!(text.contains("Modified: contract-v2.pdf (5 pages)"));
        assert_eq!(*lines.last().unwrap(), "═".repeat(60));
    }

    #[test]
    fn test_text_page_lines() {
        let (original, modified, result) = five_pages();
        let data = ReportData::new(&original, &modified, &result, GENERATED_AT);
        let text = render_text(&data);

        assert!(text.contains("PAGE SUMMARY (2/5 changed)"));
        assert!(text.contains("  Page 1: ✓ OK"));
        assert!(text.contains("  Page 2: ✎ CHANGED"));
        assert!(text.contains("  Page 4: ✎ CHANGED"));

        let page_lines = text.lines().filter(|l| l.starts_with("  Page ")).count();
        assert_eq!(page_lines, 5);
    }

    #[test]
    fn test_text_percentage() {
        let original = Document::from_texts("a.pdf", ["one two three"]);
        let modified = Document::from_texts("b.pdf", ["one two three four"]);
        let result = compare_documents(&original, &modified, &[1], DiffGranularity::Word);
        let data = ReportData::new(&original, &modified, &result, GENERATED_AT);

        assert!(render_text(&data).contains("    Changed:    25.0%"));
    }

    #[test]
    fn test_centered() {
        assert_eq!(centered("ab").len(), 29 + 2);
        assert_eq!(centered(&"x".repeat(80)), "x".repeat(80));
    }
}
