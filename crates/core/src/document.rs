//! The per-file text model compared by the diff engine.

use serde::{Deserialize, Serialize};

use crate::layout::{reconstruct_page_text, ContentItem, LayoutConfig};

/// The reconstructed text of one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    /// 1-based page number.
    pub page_number: usize,
    pub text: String,
}

/// A document reduced to its ordered page texts.
///
/// `total_pages` always equals `pages.len()`; both are fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub name: String,
    pages: Vec<Page>,
    total_pages: usize,
}

impl Document {
    /// Build a document from page texts given in page order.
    ///
    /// Page numbers are assigned contiguously from 1.
    pub fn from_texts<I, S>(name: impl Into<String>, texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let pages: Vec<Page> = texts
            .into_iter()
            .enumerate()
            .map(|(i, text)| Page {
                page_number: i + 1,
                text: text.into(),
            })
            .collect();
        let total_pages = pages.len();

        Self {
            name: name.into(),
            pages,
            total_pages,
        }
    }

    /// Build a document by running the layout reconstructor over each page's
    /// content items.
    pub fn from_content<I>(name: impl Into<String>, pages: I, config: &LayoutConfig) -> Self
    where
        I: IntoIterator<Item = Vec<ContentItem>>,
    {
        let texts = pages
            .into_iter()
            .map(|items| reconstruct_page_text(&items, config));
        Self::from_texts(name, texts)
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    /// Text of a 1-based page, or `None` past the end of the document.
    pub fn page_text(&self, page_number: usize) -> Option<&str> {
        page_number
            .checked_sub(1)
            .and_then(|i| self.pages.get(i))
            .map(|p| p.text.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::PositionedFragment;

    #[test]
    fn test_from_texts_numbers_pages_from_one() {
        let doc = Document::from_texts("a.pdf", ["first", "second", "third"]);
        assert_eq!(doc.total_pages(), 3);
        let numbers: Vec<usize> = doc.pages().iter().map(|p| p.page_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[test]
    fn test_empty_document() {
        let doc = Document::from_texts("empty.pdf", Vec::<String>::new());
        assert_eq!(doc.total_pages(), 0);
        assert!(doc.pages().is_empty());
        assert_eq!(doc.page_text(1), None);
    }

    #[test]
    fn test_page_text_bounds() {
        let doc = Document::from_texts("a.pdf", ["one", "two"]);
        assert_eq!(doc.page_text(0), None);
        assert_eq!(doc.page_text(1), Some("one"));
        assert_eq!(doc.page_text(2), Some("two"));
        assert_eq!(doc.page_text(3), None);
    }

    #[test]
    fn test_from_content_reconstructs_each_page() {
        let page1 = vec![
            ContentItem::Text(PositionedFragment::new("Hello", 0.0, 100.0, 25.0)),
            ContentItem::Text(PositionedFragment::new("world", 30.0, 100.0, 25.0)),
        ];
        let page2 = vec![];
        let doc = Document::from_content("a.pdf", vec![page1, page2], &LayoutConfig::default());

        assert_eq!(doc.total_pages(), 2);
        assert_eq!(doc.page_text(1), Some("Hello world"));
        assert_eq!(doc.page_text(2), Some(""));
    }

    #[test]
    fn test_serializes_total_pages() {
        let doc = Document::from_texts("a.pdf", ["x"]);
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["totalPages"], 1);
        assert_eq!(json["pages"][0]["pageNumber"], 1);
    }
}
