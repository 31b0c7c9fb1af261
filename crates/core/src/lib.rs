//! Core library for pdfdiff
//!
//! This crate implements the **Functional Core** of the pdfdiff application,
//! following the Functional Core - Imperative Shell architectural pattern.
//!
//! # Architecture Overview
//!
//! The pdfdiff project uses a three-crate architecture to enforce separation of concerns:
//!
//! - **`pdfdiff_core`** (this crate): Pure transformation functions with zero I/O
//! - **`pdf`**: Walks PDF content streams (through `lopdf`) into positioned fragments
//! - **`pdfdiff`**: I/O operations and orchestration (the Imperative Shell)
//!
//! ## Functional Core Principles
//!
//! All functions in this crate adhere to these principles:
//!
//! - **Pure functions**: Same input always produces the same output
//! - **No side effects**: No I/O operations, no external state mutations
//! - **Total**: Layout reconstruction and diffing never fail on well-formed input
//! - **Testable**: Can be tested with simple fixture data, no mocking required
//!
//! # Module Organization
//!
//! - [`layout`]: Positioned fragments to line-broken page text
//! - [`document`]: The `Document` / `Page` model produced once per input file
//! - [`pages`]: Page-range specifications (`"1-3,5,7"`)
//! - [`diff`]: Word and line diffs, statistics, page pairing and the pass/fail gate
//! - [`report`]: Text, JSON, JUnit-XML and HTML projections of one comparison
//!
//! # Example Usage
//!
//! ```rust
//! use pdfdiff_core::diff::{compare_documents, DiffGranularity};
//! use pdfdiff_core::document::Document;
//! use pdfdiff_core::pages::PageSelection;
//!
//! let original = Document::from_texts("a.pdf", ["one two three"]);
//! let modified = Document::from_texts("b.pdf", ["one two three four"]);
//!
//! let pages = PageSelection::All.resolve(1).unwrap();
//! let result = compare_documents(&original, &modified, &pages, DiffGranularity::Word);
//!
//! assert_eq!(result.stats.additions, 1);
//! assert_eq!(result.stats.change_percentage, 25.0);
//! ```

pub mod diff;
pub mod document;
pub mod layout;
pub mod pages;
pub mod report;
