//! Run reports.
//!
//! Reports are pure functions of a manifest and its findings: the same input
//! always renders the same bytes.
//!
//! - [`HumanFormatter`] - terminal report
//! - [`JsonFormatter`] - machine-readable report
//! - [`usage`] - `TEMPLATE_USAGE.md` for template users

pub mod human;
pub mod json;
pub mod usage;

pub use human::HumanFormatter;
pub use json::JsonFormatter;
pub use usage::{render_usage, write_usage, PlaceholderUsage, USAGE_FILE};

use std::io::Write;

use crate::transfer::GenerationManifest;
use crate::validate::{has_fatal, ValidationFinding};

/// Exit code for a clean run or warnings only.
pub const EXIT_SUCCESS: u8 = 0;
/// Exit code when any finding is fatal.
pub const EXIT_FATAL: u8 = 1;
/// Exit code for invocation and configuration errors.
pub const EXIT_USAGE: u8 = 2;

/// Output format for reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportFormat {
    #[default]
    Human,
    Json,
}

/// What a report describes.
#[derive(Debug, Clone, Copy)]
pub struct Report<'a> {
    pub manifest: &'a GenerationManifest,
    pub findings: &'a [ValidationFinding],
}

impl<'a> Report<'a> {
    pub fn new(manifest: &'a GenerationManifest, findings: &'a [ValidationFinding]) -> Self {
        Self { manifest, findings }
    }

    /// Whether the run produced a usable tree.
    pub fn is_success(&self) -> bool {
        !has_fatal(self.findings)
    }

    /// Process exit code for this report.
    pub fn exit_code(&self) -> u8 {
        if self.is_success() {
            EXIT_SUCCESS
        } else {
            EXIT_FATAL
        }
    }
}

/// Trait for formatting reports.
pub trait ReportFormatter {
    /// Write the report to `writer`.
    fn format<W: Write>(&self, report: &Report<'_>, writer: &mut W) -> std::io::Result<()>;

    /// Render the report to a string.
    fn render(&self, report: &Report<'_>) -> String {
        let mut output = Vec::new();
        // Writing to a Vec cannot fail.
        let _ = self.format(report, &mut output);
        String::from_utf8_lossy(&output).into_owned()
    }
}

/// Render a report in the requested format.
pub fn render_report(
    report: &Report<'_>,
    format: ReportFormat,
    use_color: bool,
    show_info: bool,
) -> String {
    match format {
        ReportFormat::Human => HumanFormatter::new(use_color)
            .show_info(show_info)
            .render(report),
        ReportFormat::Json => JsonFormatter::new().render(report),
    }
}
