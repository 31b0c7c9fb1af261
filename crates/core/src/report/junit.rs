use super::ReportData;

const SUITE_NAME: &str = "PDF Diff";
const CLASS_NAME: &str = "pdf-diff";

/// JUnit-XML report: one test case per compared page, changed pages fail.
///
/// `errors` is always zero; a page is either changed or unchanged.
pub fn render_junit(data: &ReportData<'_>) -> String {
    let testcases: Vec<String> = data
        .result
        .pages
        .iter()
        .map(|page| {
            let n = page.page_number;
            if page.has_changes {
                format!(
                    "    <testcase name=\"Page {n}\" classname=\"{CLASS_NAME}\">\n      \
                     <failure message=\"Page {n} has differences\">Changes detected on page {n}</failure>\n    \
                     </testcase>"
                )
            } else {
                format!("    <testcase name=\"Page {n}\" classname=\"{CLASS_NAME}\"/>")
            }
        })
        .collect();

    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str(&format!(
        "<testsuite name=\"{}\" tests=\"{}\" failures=\"{}\" errors=\"0\">\n",
        SUITE_NAME,
        data.compared_pages(),
        data.changed_pages()
    ));
    for testcase in testcases {
        xml.push_str(&testcase);
        xml.push('\n');
    }
    xml.push_str("</testsuite>");
    xml
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::*;
    use super::*;
    use crate::diff::{compare_documents, DiffGranularity};
    use crate::document::Document;

    #[test]
    fn test_junit_counts() {
        let (original, modified, result) = five_pages();
        let data = ReportData::new(&original, &modified, &result, GENERATED_AT);
        let xml = render_junit(&data);

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("tests=\"5\" failures=\"2\" errors=\"0\""));
        assert_eq!(xml.matches("<failure ").count(), 2);
        assert_eq!(xml.matches("<testcase ").count(), 5);
        assert!(xml.ends_with("</testsuite>"));
    }

    #[test]
    fn test_junit_failures_name_the_page() {
        let (original, modified, result) = five_pages();
        let data = ReportData::new(&original, &modified, &result, GENERATED_AT);
        let xml = render_junit(&data);

        assert!(xml.contains("<failure message=\"Page 2 has differences\">"));
        assert!(xml.contains("<failure message=\"Page 4 has differences\">"));
        assert!(xml.contains("<testcase name=\"Page 1\" classname=\"pdf-diff\"/>"));
    }

    #[test]
    fn test_junit_preserves_page_order() {
        let (original, modified, result) = five_pages();
        let data = ReportData::new(&original, &modified, &result, GENERATED_AT);
        let xml = render_junit(&data);

        let positions: Vec<usize> = (1..=5)
            .map(|n| xml.find(&format!("name=\"Page {n}\"")).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_junit_no_pages() {
        let empty = Document::from_texts("a.pdf", Vec::<String>::new());
        let result = compare_documents(&empty, &empty, &[], DiffGranularity::Word);
        let data = ReportData::new(&empty, &empty, &result, GENERATED_AT);
        let xml = render_junit(&data);

        assert!(xml.contains("tests=\"0\" failures=\"0\" errors=\"0\""));
        assert!(!xml.contains("<testcase"));
    }
}
