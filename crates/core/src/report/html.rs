use std::fmt::Write;

use super::{format_percentage, ReportData};
use crate::diff::{DiffPart, DiffTag, PageDiff};

/// Escape user-supplied text for embedding in HTML.
///
/// `&`, `<`, `>`, `"` and `'` become entities and newlines become `<br>`.
pub fn escape_html(text: &str) -> String {
    html_escape::encode_quoted_attribute(text).replace('\n', "<br>")
}

/// Self-contained styled report: file cards, stat tiles, a page index and the
/// highlighted diff of every compared page.
pub fn render_html(data: &ReportData<'_>) -> String {
    let stats = &data.result.stats;
    let mut html = String::with_capacity(STYLE.len() + 4096);

    html.push_str(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n  <meta charset=\"UTF-8\">\n  \
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n  \
         <title>PDF Diff Report</title>\n",
    );
    html.push_str(STYLE);
    html.push_str("</head>\n<body>\n  <div class=\"container\">\n");

    // Header
    let _ = write!(
        html,
        "    <header>\n      <h1>PDF Diff Report</h1>\n      \
         <div class=\"meta\">Generated on {}</div>\n    </header>\n",
        escape_html(data.generated_at)
    );

    // Files and statistics
    html.push_str("    <section class=\"summary\">\n      <div class=\"files\">\n");
    push_file_card(&mut html, "Original File", &data.original.name, data.original.total_pages());
    push_file_card(&mut html, "Modified File", &data.modified.name, data.modified.total_pages());
    html.push_str("      </div>\n      <div class=\"stats-grid\">\n");
    push_stat_tile(&mut html, "additions", &format!("+{}", stats.additions), "Additions");
    push_stat_tile(&mut html, "deletions", &format!("-{}", stats.deletions), "Deletions");
    push_stat_tile(&mut html, "unchanged", &stats.unchanged.to_string(), "Unchanged");
    push_stat_tile(
        &mut html,
        "percentage",
        &format!("{}%", format_percentage(stats.change_percentage)),
        "Changed",
    );
    html.push_str("      </div>\n    </section>\n");

    // Page index
    let _ = write!(
        html,
        "    <section class=\"page-index\">\n      \
         <h2>Page Overview ({} of {} pages changed)</h2>\n      <div class=\"page-chips\">\n",
        data.changed_pages(),
        data.compared_pages()
    );
    for page in &data.result.pages {
        let _ = writeln!(
            html,
            "        <a href=\"#page-{n}\" class=\"page-chip {class}\">Page {n}{mark}</a>",
            n = page.page_number,
            class = status_class(page),
            mark = if page.has_changes { " ✎" } else { "" },
        );
    }
    html.push_str("      </div>\n    </section>\n");

    // Per-page diffs
    html.push_str("    <section class=\"diff-content\">\n");
    for page in &data.result.pages {
        push_page_diff(&mut html, page);
    }
    html.push_str("    </section>\n");

    html.push_str("    <footer>Generated by pdfdiff</footer>\n  </div>\n</body>\n</html>\n");
    html
}

fn status_class(page: &PageDiff) -> &'static str {
    if page.has_changes {
        "changed"
    } else {
        "unchanged"
    }
}

fn push_file_card(html: &mut String, heading: &str, name: &str, pages: usize) {
    let _ = write!(
        html,
        "        <div class=\"file-card\">\n          <h3>{}</h3>\n          \
         <div class=\"filename\">{}</div>\n          <div class=\"pages\">{} page{}</div>\n        \
         </div>\n",
        heading,
        escape_html(name),
        pages,
        if pages == 1 { "" } else { "s" }
    );
}

fn push_stat_tile(html: &mut String, class: &str, value: &str, label: &str) {
    let _ = write!(
        html,
        "        <div class=\"stat-card {class}\">\n          <div class=\"value\">{value}</div>\n          \
         <div class=\"label\">{label}</div>\n        </div>\n"
    );
}

fn push_page_diff(html: &mut String, page: &PageDiff) {
    let badge = if page.has_changes { "Changed" } else { "Unchanged" };
    let _ = write!(
        html,
        "      <div id=\"page-{n}\" class=\"page-diff\">\n        <div class=\"page-header\">\n          \
         <h3>Page {n}</h3>\n          <span class=\"page-stats\">+{add} / -{del}</span>\n          \
         <span class=\"badge {class}\">{badge}</span>\n        </div>\n        \
         <div class=\"diff-text\">{body}</div>\n      </div>\n",
        n = page.page_number,
        add = page.stats.additions,
        del = page.stats.deletions,
        class = status_class(page),
        body = render_parts(&page.parts),
    );
}

/// Escaped diff text with added and removed runs wrapped in spans.
fn render_parts(parts: &[DiffPart]) -> String {
    parts
        .iter()
        .map(|part| {
            let text = escape_html(&part.value);
            match part.tag {
                DiffTag::Added => format!("<span class=\"diff-added\">{}</span>", text),
                DiffTag::Removed => format!("<span class=\"diff-removed\">{}</span>", text),
                DiffTag::Unchanged => text,
            }
        })
        .collect()
}

const STYLE: &str = r#"  <style>
    * { box-sizing: border-box; margin: 0; padding: 0; }
    body {
      font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Oxygen, Ubuntu, Cantarell, sans-serif;
      line-height: 1.6;
      color: #333;
      background: #f5f5f5;
      padding: 20px;
    }
    .container {
      max-width: 1200px;
      margin: 0 auto;
      background: white;
      border-radius: 8px;
      box-shadow: 0 2px 10px rgba(0,0,0,0.1);
      overflow: hidden;
    }
    header {
      background: linear-gradient(135deg, #6366f1 0%, #8b5cf6 100%);
      color: white;
      padding: 30px;
    }
    header h1 { font-size: 28px; margin-bottom: 10px; }
    header .meta { opacity: 0.9; font-size: 14px; }
    .summary { padding: 30px; border-bottom: 1px solid #e5e7eb; }
    .files { display: grid; grid-template-columns: 1fr 1fr; gap: 20px; margin-bottom: 30px; }
    .file-card { background: #f9fafb; padding: 15px; border-radius: 8px; border: 1px solid #e5e7eb; }
    .file-card h3 { font-size: 12px; text-transform: uppercase; color: #6b7280; margin-bottom: 5px; }
    .file-card .filename { font-weight: 600; word-break: break-all; }
    .file-card .pages { color: #6b7280; font-size: 14px; margin-top: 5px; }
    .stats-grid { display: grid; grid-template-columns: repeat(4, 1fr); gap: 15px; }
    .stat-card { text-align: center; padding: 20px; border-radius: 8px; background: #f9fafb; }
    .stat-card.additions { background: #dcfce7; color: #166534; }
    .stat-card.deletions { background: #fee2e2; color: #991b1b; }
    .stat-card.unchanged { background: #f3f4f6; color: #4b5563; }
    .stat-card.percentage { background: #e0e7ff; color: #3730a3; }
    .stat-card .value { font-size: 32px; font-weight: 700; }
    .stat-card .label { font-size: 12px; text-transform: uppercase; margin-top: 5px; }
    .page-index { padding: 20px 30px; background: #f9fafb; border-bottom: 1px solid #e5e7eb; }
    .page-index h2 { font-size: 18px; margin-bottom: 15px; }
    .page-chips { display: flex; flex-wrap: wrap; gap: 8px; }
    .page-chip { display: inline-block; padding: 6px 12px; border-radius: 20px; font-size: 14px; text-decoration: none; }
    .page-chip.changed { background: #fef3c7; color: #92400e; }
    .page-chip.unchanged { background: #e5e7eb; color: #6b7280; }
    .diff-content { padding: 30px; }
    .page-diff { margin-bottom: 40px; border: 1px solid #e5e7eb; border-radius: 8px; overflow: hidden; }
    .page-header {
      background: #f9fafb;
      padding: 15px 20px;
      border-bottom: 1px solid #e5e7eb;
      display: flex;
      justify-content: space-between;
      align-items: center;
      gap: 12px;
    }
    .page-header h3 { font-size: 16px; flex: 1; }
    .page-header .page-stats { font-size: 12px; color: #6b7280; }
    .page-header .badge { font-size: 12px; padding: 4px 10px; border-radius: 12px; }
    .page-header .badge.changed { background: #fef3c7; color: #92400e; }
    .page-header .badge.unchanged { background: #dcfce7; color: #166534; }
    .diff-text {
      padding: 20px;
      font-family: 'Menlo', 'Monaco', 'Courier New', monospace;
      font-size: 13px;
      white-space: pre-wrap;
      word-wrap: break-word;
      background: #fafafa;
      line-height: 1.8;
    }
    .diff-added { background: #dcfce7; color: #166534; padding: 2px 0; }
    .diff-removed { background: #fee2e2; color: #991b1b; padding: 2px 0; text-decoration: line-through; }
    footer {
      background: #f9fafb;
      padding: 20px 30px;
      text-align: center;
      font-size: 14px;
      color: #6b7280;
      border-top: 1px solid #e5e7eb;
    }
    @media print {
      body { background: white; padding: 0; }
      .container { box-shadow: none; }
      .page-diff { page-break-inside: avoid; }
    }
    @media (max-width: 768px) {
      .files { grid-template-columns: 1fr; }
      .stats-grid { grid-template-columns: repeat(2, 1fr); }
    }
  </style>
"#;
