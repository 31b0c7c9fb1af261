use std::path::{Path, PathBuf};
use std::time::Duration;

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};

use pdfdiff_core::diff::{comparable_pages, compare_documents, AggregateResult, DiffGranularity, GatePolicy};
use pdfdiff_core::document::Document;
use pdfdiff_core::layout::{LayoutConfig, DEFAULT_LINE_TOLERANCE, DEFAULT_WORD_GAP};
use pdfdiff_core::pages::PageSelection;
use pdfdiff_core::report::{
    format_percentage, render, render_html, OutputFormat, ReportData, ReportKind,
    HTML_REPORT_NAME, PDF_REPORT_NAME,
};

use crate::export::{ChromeExporter, Exporter};
use crate::prelude::{eprintln, println, *};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Report {
    Html,
    Pdf,
    Both,
}

impl From<Report> for ReportKind {
    fn from(report: Report) -> Self {
        match report {
            Report::Html => ReportKind::Html,
            Report::Pdf => ReportKind::Pdf,
            Report::Both => ReportKind::Both,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Format {
    Text,
    Json,
    Junit,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Text => OutputFormat::Text,
            Format::Json => OutputFormat::Json,
            Format::Junit => OutputFormat::Junit,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Granularity {
    Word,
    Line,
}

impl From<Granularity> for DiffGranularity {
    fn from(granularity: Granularity) -> Self {
        match granularity {
            Granularity::Word => DiffGranularity::Word,
            Granularity::Line => DiffGranularity::Line,
        }
    }
}

#[derive(Debug, Clone, clap::Args)]
pub struct Options {
    /// Path to the original PDF
    #[clap(env = "PDFDIFF_ORIGINAL")]
    pub original: PathBuf,

    /// Path to the modified PDF
    #[clap(env = "PDFDIFF_MODIFIED")]
    pub modified: PathBuf,

    /// Report artifacts to write
    #[arg(short, long, env = "PDFDIFF_REPORT", value_enum, default_value = "both")]
    pub report: Report,

    /// Output directory for reports
    #[arg(short, long, env = "PDFDIFF_OUT", default_value = "./pdf-diff-report")]
    pub out: PathBuf,

    /// Open the HTML report in a browser after completion (default)
    #[arg(long, overrides_with = "no_open")]
    pub open: bool,

    /// Do not open the HTML report
    #[arg(long, env = "PDFDIFF_NO_OPEN", overrides_with = "open")]
    pub no_open: bool,

    /// Output format printed to stdout
    #[arg(short, long, env = "PDFDIFF_FORMAT", value_enum, default_value = "text")]
    pub format: Format,

    /// Exit with code 1 if the comparison fails the gate
    #[arg(long, env = "PDFDIFF_FAIL_ON_DIFF")]
    pub fail_on_diff: bool,

    /// Pages to compare (e.g., "1-3,5,7")
    #[arg(short, long, env = "PDFDIFF_PAGES")]
    pub pages: Option<String>,

    /// Change percentage above which the comparison fails
    #[arg(short, long, env = "PDFDIFF_THRESHOLD", value_parser = parse_threshold)]
    pub threshold: Option<f64>,

    /// Diff unit
    #[arg(long, env = "PDFDIFF_GRANULARITY", value_enum, default_value = "word")]
    pub granularity: Granularity,

    /// Vertical distance above which two fragments are on different lines
    #[arg(long, env = "PDFDIFF_LINE_TOLERANCE", default_value_t = DEFAULT_LINE_TOLERANCE)]
    pub line_tolerance: f32,

    /// Horizontal gap above which a space is inserted between fragments
    #[arg(long, env = "PDFDIFF_WORD_GAP", default_value_t = DEFAULT_WORD_GAP)]
    pub word_gap: f32,

    /// Headless Chrome timeout in seconds
    #[arg(long, env = "PDFDIFF_TIMEOUT", default_value = "30")]
    pub timeout: u64,
}

impl Options {
    fn should_open(&self) -> bool {
        !self.no_open
    }

    fn layout(&self) -> LayoutConfig {
        LayoutConfig {
            line_tolerance: self.line_tolerance,
            word_gap: self.word_gap,
        }
    }
}

fn parse_threshold(value: &str) -> std::result::Result<f64, String> {
    let threshold: f64 = value
        .parse()
        .map_err(|_| f!("'{}' is not a number", value))?;
    if !threshold.is_finite() || threshold < 0.0 {
        return Err(f!("'{}' must be a non-negative percentage", value));
    }
    Ok(threshold)
}

/// Run the comparison. Returns whether the gate was exceeded.
pub async fn run(options: Options) -> Result<bool> {
    check_input(&options.original)?;
    check_input(&options.modified)?;

    let spinner = new_spinner("Loading PDF files...")?;
    let layout = options.layout();
    let loaded = tokio::try_join!(
        load(options.original.clone(), layout),
        load(options.modified.clone(), layout),
    );
    let (original, modified) = match loaded {
        Ok(documents) => {
            spinner.finish_with_message(f!("{} PDF files loaded successfully", "✓".green()));
            documents
        }
        Err(err) => {
            spinner.finish_with_message(f!("{} Failed to load PDF files", "✗".red()));
            return Err(err);
        }
    };

    let pages = PageSelection::from_option(options.pages.clone())
        .resolve(comparable_pages(&original, &modified))?;

    let spinner = new_spinner("Computing differences...")?;
    let result = compare_documents(&original, &modified, &pages, options.granularity.into());
    let exceeded = result.exceeds(&GatePolicy::from_threshold(options.threshold));
    spinner.finish_with_message(f!("{} Differences computed", "✓".green()));
    info!(
        "{} of {} pages changed, {}%",
        result.changed_pages(),
        result.pages.len(),
        format_percentage(result.stats.change_percentage)
    );

    let generated_at = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let data = ReportData::new(&original, &modified, &result, &generated_at);

    let format = OutputFormat::from(options.format);
    if format == OutputFormat::Text {
        println!();
    }
    println!("{}", render(format, &data)?);

    let exporter = ChromeExporter::new(options.timeout);
    let artifacts = write_reports(
        options.report.into(),
        &options.out,
        &render_html(&data),
        &exporter,
    )?;

    if options.should_open() {
        if let Some(html) = &artifacts.html {
            eprintln!("{}", "\nOpening report in browser...".cyan());
            if let Err(err) = open_in_browser(html) {
                warn!("could not open {}: {}", html.display(), err);
            }
        }
    }

    eprintln!();
    for line in summary_lines(&result) {
        eprintln!("{}", line);
    }
    eprintln!();

    Ok(exceeded)
}

fn check_input(path: &Path) -> Result<(), Error> {
    if !path.exists() {
        return Err(Error::InputNotFound(path.to_path_buf()));
    }
    if !path.is_file() {
        return Err(Error::NotAFile(path.to_path_buf()));
    }
    Ok(())
}

async fn load(path: PathBuf, layout: LayoutConfig) -> Result<Document> {
    // lopdf is synchronous
    let document = tokio::task::spawn_blocking(move || {
        pdf::read_document(&path, &layout).map_err(|reason| Error::Load { path, reason })
    })
    .await??;
    Ok(document)
}

fn new_spinner(message: &'static str) -> Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message(message);
    Ok(spinner)
}

// ---------------------------------------------------------------------------
// Report artifacts
// ---------------------------------------------------------------------------

/// Report files left in the output directory.
#[derive(Debug, Default, PartialEq)]
pub struct Artifacts {
    pub html: Option<PathBuf>,
    pub pdf: Option<PathBuf>,
}

/// Write the HTML report and, if asked for, print it to PDF.
///
/// The HTML file is always written first since the PDF is rendered from it;
/// it is removed again when only a PDF was requested. A failed export is
/// reported and leaves `pdf` empty.
pub fn write_reports(
    kind: ReportKind,
    out: &Path,
    html: &str,
    exporter: &dyn Exporter,
) -> Result<Artifacts> {
    std::fs::create_dir_all(out)
        .wrap_err_with(|| f!("Failed to create output directory {}", out.display()))?;

    let html_path = out.join(HTML_REPORT_NAME);
    let pdf_path = out.join(PDF_REPORT_NAME);
    let mut artifacts = Artifacts::default();

    std::fs::write(&html_path, html)
        .wrap_err_with(|| f!("Failed to write {}", html_path.display()))?;
    if kind.keeps_html() {
        eprintln!(
            "{} HTML report saved to {}",
            "✓".green(),
            html_path.display().to_string().cyan()
        );
        artifacts.html = Some(html_path.clone());
    }

    if kind.wants_pdf() {
        let spinner = new_spinner("Generating PDF report...")?;
        match exporter.export(&html_path, &pdf_path) {
            Ok(()) => {
                spinner.finish_with_message(f!(
                    "{} PDF report saved to {}",
                    "✓".green(),
                    pdf_path.display().to_string().cyan()
                ));
                artifacts.pdf = Some(pdf_path);
            }
            Err(err) => {
                spinner.finish_with_message(f!("{} Failed to generate PDF report", "✗".red()));
                eprintln!("{}", f!("  Error: {}", err).red());
            }
        }
    }

    if !kind.keeps_html() {
        std::fs::remove_file(&html_path)
            .wrap_err_with(|| f!("Failed to remove {}", html_path.display()))?;
    }

    Ok(artifacts)
}

/// Open a file with the platform's default handler.
fn open_in_browser(path: &Path) -> std::io::Result<()> {
    #[cfg(target_os = "macos")]
    let mut command = std::process::Command::new("open");
    #[cfg(target_os = "windows")]
    let mut command = {
        let mut c = std::process::Command::new("cmd");
        c.args(["/C", "start", ""]);
        c
    };
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    let mut command = std::process::Command::new("xdg-open");

    command.arg(path).spawn()?;
    Ok(())
}

/// Closing lines printed after the reports.
fn summary_lines(result: &AggregateResult) -> Vec<String> {
    if result.has_differences() {
        vec![
            f!(
                "⚠️  {} of {} pages have differences",
                result.changed_pages(),
                result.pages.len()
            )
            .yellow()
            .to_string(),
            f!(
                "   {}% of content changed",
                format_percentage(result.stats.change_percentage)
            )
            .yellow()
            .to_string(),
        ]
    } else {
        vec!["✓ PDFs are identical".green().to_string()]
    }
}
