use std::path::{Component, Path};
use std::time::Duration;

use headless_chrome::{types::PrintToPdfOptions, Browser};
use log::debug;

use crate::prelude::*;

const MM_PER_INCH: f64 = 25.4;

/// A4 paper in inches.
const A4_WIDTH_IN: f64 = 8.27;
const A4_HEIGHT_IN: f64 = 11.69;

const MARGIN_VERTICAL_MM: f64 = 20.0;
const MARGIN_HORIZONTAL_MM: f64 = 15.0;

/// Turns an HTML report on disk into a PDF next to it.
pub trait Exporter {
    fn export(&self, html: &Path, pdf: &Path) -> Result<(), Error>;
}

/// Prints the report through headless Chrome.
#[derive(Debug, Clone)]
pub struct ChromeExporter {
    pub timeout: Duration,
}

impl ChromeExporter {
    pub fn new(timeout_secs: u64) -> Self {
        Self {
            timeout: Duration::from_secs(timeout_secs),
        }
    }
}

fn mm_to_inches(mm: f64) -> f64 {
    mm / MM_PER_INCH
}

fn print_options() -> PrintToPdfOptions {
    PrintToPdfOptions {
        print_background: Some(true),
        paper_width: Some(A4_WIDTH_IN),
        paper_height: Some(A4_HEIGHT_IN),
        margin_top: Some(mm_to_inches(MARGIN_VERTICAL_MM)),
        margin_bottom: Some(mm_to_inches(MARGIN_VERTICAL_MM)),
        margin_left: Some(mm_to_inches(MARGIN_HORIZONTAL_MM)),
        margin_right: Some(mm_to_inches(MARGIN_HORIZONTAL_MM)),
        ..Default::default()
    }
}

/// `file://` URL for an absolute path, with every segment percent-encoded.
fn file_url(path: &Path) -> String {
    let segments: Vec<String> = path
        .components()
        .filter_map(|component| match component {
            Component::Prefix(prefix) => Some(
                prefix
                    .as_os_str()
                    .to_string_lossy()
                    .trim_start_matches(r"\\?\")
                    .to_string(),
            ),
            Component::Normal(segment) => {
                Some(urlencoding::encode(&segment.to_string_lossy()).into_owned())
            }
            Component::RootDir | Component::CurDir | Component::ParentDir => None,
        })
        .collect();
    f!("file:///{}", segments.join("/"))
}

impl Exporter for ChromeExporter {
    fn export(&self, html: &Path, pdf: &Path) -> Result<(), Error> {
        let html = html
            .canonicalize()
            .map_err(|e| Error::Export(f!("{}: {}", html.display(), e)))?;
        let url = file_url(&html);
        debug!("printing {} with a {:?} timeout", url, self.timeout);

        let browser = Browser::default().map_err(|e| {
            Error::Export(f!(
                "Failed to launch browser: {}. Make sure Chrome or Chromium is installed.",
                e
            ))
        })?;

        let tab = browser
            .new_tab()
            .map_err(|e| Error::Export(f!("Failed to create new tab: {}", e)))?;

        tab.set_default_timeout(self.timeout);

        tab.navigate_to(&url)
            .map_err(|e| Error::Export(f!("Failed to navigate to {}: {}", url, e)))?
            .wait_until_navigated()
            .map_err(|e| Error::Export(f!("Failed to wait for navigation: {}", e)))?;

        let bytes = tab
            .print_to_pdf(Some(print_options()))
            .map_err(|e| Error::Export(f!("Failed to print page: {}", e)))?;

        std::fs::write(pdf, bytes)
            .map_err(|e| Error::Export(f!("{}: {}", pdf.display(), e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_print_options_a4_with_margins() {
        let options = print_options();
        assert_eq!(options.paper_width, Some(8.27));
        assert_eq!(options.paper_height, Some(11.69));
        assert_eq!(options.print_background, Some(true));

        let top = options.margin_top.unwrap();
        let left = options.margin_left.unwrap();
        assert!((top - 0.787).abs() < 0.001);
        assert!((left - 0.591).abs() < 0.001);
        assert_eq!(options.margin_bottom, options.margin_top);
        assert_eq!(options.margin_right, options.margin_left);
    }

    #[test]
    fn test_file_url_percent_encodes_segments() {
        assert_eq!(
            file_url(Path::new("/tmp/a #1/re%port?.html")),
            "file:///tmp/a%20%231/re%25port%3F.html"
        );
        assert_eq!(
            file_url(Path::new("/srv/reports/index.html")),
            "file:///srv/reports/index.html"
        );
    }

    #[test]
    fn test_export_missing_html_fails_before_launch() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = ChromeExporter::new(5);
        let err = exporter
            .export(&dir.path().join("missing.html"), &dir.path().join("out.pdf"))
            .unwrap_err();

        assert!(matches!(err, Error::Export(_)));
        assert!(!dir.path().join("out.pdf").exists());
    }
}
