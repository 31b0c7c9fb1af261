use serde::Serialize;

use super::ReportData;
use crate::diff::DiffStats;

/// Top-level JSON shape: `summary`, `statistics`, `pages`.
///
/// Diff parts are left out on purpose; the JSON output is a summary contract.
#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    summary: JsonSummary<'a>,
    statistics: &'a DiffStats,
    pages: Vec<JsonPage>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonSummary<'a> {
    original_file: &'a str,
    original_pages: usize,
    modified_file: &'a str,
    modified_pages: usize,
    generated_at: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonPage {
    page_number: usize,
    has_changes: bool,
}

/// Machine-readable summary, pretty-printed.
pub fn render_json(data: &ReportData<'_>) -> Result<String, serde_json::Error> {
    let report = JsonReport {
        summary: JsonSummary {
            original_file: &data.original.name,
            original_pages: data.original.total_pages(),
            modified_file: &data.modified.name,
            modified_pages: data.modified.total_pages(),
            generated_at: data.generated_at,
        },
        statistics: &data.result.stats,
        pages: data
            .result
            .pages
            .iter()
            .map(|p| JsonPage {
                page_number: p.page_number,
                has_changes: p.has_changes,
            })
            .collect(),
    };

    serde_json::to_string_pretty(&report)
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::*;
    use super::*;

    fn render_value() -> serde_json::Value {
        let (original, modified, result) = five_pages();
        let data = ReportData::new(&original, &modified, &result, GENERATED_AT);
        serde_json::from_str(&render_json(&data).unwrap()).unwrap()
    }

    #[test]
    fn test_json_top_level_keys() {
        let value = render_value();
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys.len(), 3);
        assert!(value.get("summary").is_some());
        assert!(value.get("statistics").is_some());
        assert!(value.get("pages").is_some());
    }

    #[test]
    fn test_json_summary() {
        let value = render_value();
        let summary = &value["summary"];
        assert_eq!(summary["originalFile"], "contract-v1.pdf");
        assert_eq!(summary["originalPages"], 5);
        assert_eq!(summary["modifiedFile"], "contract-v2.pdf");
        assert_eq!(summary["modifiedPages"], 5);
        assert_eq!(summary["generatedAt"], GENERATED_AT);
    }

    #[test]
    fn test_json_statistics_match_diff_stats_shape() {
        let value = render_value();
        let statistics = value["statistics"].as_object().unwrap();
        let mut keys: Vec<&str> = statistics.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            vec![
                "additions",
                "changePercentage",
                "deletions",
                "totalChanges",
                "unchanged"
            ]
        );

        let parsed: DiffStats = serde_json::from_value(value["statistics"].clone()).unwrap();
        let (_, _, result) = five_pages();
        assert_eq!(parsed, result.stats);
    }

    #[test]
    fn test_json_pages_in_order_without_parts() {
        let value = render_value();
        let pages = value["pages"].as_array().unwrap();
        assert_eq!(pages.len(), 5);
        for (i, page) in pages.iter().enumerate() {
            assert_eq!(page["pageNumber"], i + 1);
            assert!(page.get("parts").is_none());
        }
        assert_eq!(pages[1]["hasChanges"], true);
        assert_eq!(pages[2]["hasChanges"], false);
    }
}
