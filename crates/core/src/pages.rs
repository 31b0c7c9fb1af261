//! Page-range specifications.
//!
//! A specification is a comma-separated list of page numbers and inclusive
//! ranges, e.g. `"1-3,5,7"`. Parsing is lenient: anything that does not name a
//! page inside the document is dropped rather than reported.

use std::collections::BTreeSet;

use thiserror::Error;

/// Parse a page specification into ascending, deduplicated 1-based page
/// numbers within `[1, max_pages]`.
///
/// - `A-B` expands to every page in `[A, B]`; a reversed range is empty.
/// - `N` selects a single page.
/// - Out-of-range numbers and unparsable tokens are dropped.
///
/// An empty or entirely invalid specification yields an empty list.
pub fn parse_page_spec(spec: &str, max_pages: usize) -> Vec<usize> {
    let mut pages = BTreeSet::new();

    for token in spec.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        match token.split_once('-') {
            Some((start, end)) => {
                let (Ok(start), Ok(end)) = (start.trim().parse::<usize>(), end.trim().parse::<usize>())
                else {
                    continue;
                };
                let start = start.max(1);
                let end = end.min(max_pages);
                pages.extend(start..=end);
            }
            None => {
                if let Ok(page) = token.parse::<usize>() {
                    if (1..=max_pages).contains(&page) {
                        pages.insert(page);
                    }
                }
            }
        }
    }

    pages.into_iter().collect()
}

/// Which pages a comparison covers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PageSelection {
    /// No specification given: every page of the longer document.
    #[default]
    All,
    /// An explicit specification such as `"1-3,5"`.
    Spec(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PageSelectionError {
    #[error("No valid pages specified in '{spec}' (documents have {max_pages} pages)")]
    NoPages { spec: String, max_pages: usize },
}

impl PageSelection {
    /// `None` means every page; `Some(spec)` is an explicit specification.
    pub fn from_option(spec: Option<String>) -> Self {
        spec.map_or(PageSelection::All, PageSelection::Spec)
    }

    /// Resolve the selection against a page count.
    ///
    /// An explicit specification that selects nothing is an error. `All` over
    /// zero pages is a valid, empty comparison.
    pub fn resolve(&self, max_pages: usize) -> Result<Vec<usize>, PageSelectionError> {
        match self {
            PageSelection::All => Ok((1..=max_pages).collect()),
            PageSelection::Spec(spec) => {
                let pages = parse_page_spec(spec, max_pages);
                if pages.is_empty() {
                    Err(PageSelectionError::NoPages {
                        spec: spec.clone(),
                        max_pages,
                    })
                } else {
                    Ok(pages)
                }
            }
        }
    }
}
