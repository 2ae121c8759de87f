//! Human-readable report formatter.

use std::io::Write;

use console::Style;

use super::{Report, ReportFormatter};
use crate::validate::{Severity, SeverityCounts, ValidationFinding};

/// Formats reports for terminal display with optional color support.
pub struct HumanFormatter {
    /// Whether to use colors (ANSI escape codes).
    pub use_color: bool,
    /// Whether informational findings are listed individually.
    pub show_info: bool,
}

impl HumanFormatter {
    /// Create a new human formatter.
    pub fn new(use_color: bool) -> Self {
        Self {
            use_color,
            show_info: false,
        }
    }

    /// List informational findings individually.
    pub fn show_info(mut self, show: bool) -> Self {
        self.show_info = show;
        self
    }

    fn paint(&self, style: Style, text: &str) -> String {
        if self.use_color {
            style.apply_to(text).to_string()
        } else {
            text.to_string()
        }
    }

    fn severity_label(&self, severity: Severity) -> String {
        let style = match severity {
            Severity::Fatal => Style::new().red().bold(),
            Severity::Warning => Style::new().yellow().bold(),
            Severity::Info => Style::new().cyan(),
        };
        self.paint(style, &severity.to_string())
    }

    fn write_finding<W: Write>(&self, f: &ValidationFinding, writer: &mut W) -> std::io::Result<()> {
        // fatal[rule-id]: message
        writeln!(
            writer,
            "{}[{}]: {}",
            self.severity_label(f.severity),
            f.rule_id,
            f.message
        )?;
        if let Some(ref path) = f.path {
            writeln!(writer, "  --> {}", path)?;
        }
        Ok(())
    }
}

impl ReportFormatter for HumanFormatter {
    fn format<W: Write>(&self, report: &Report<'_>, writer: &mut W) -> std::io::Result<()> {
        let manifest = report.manifest;

        writeln!(
            writer,
            "{} {} -> {}{}",
            self.paint(Style::new().bold(), "Decoupled"),
            manifest.source_root.display(),
            manifest.target_root.display(),
            if manifest.dry_run { " (dry run)" } else { "" }
        )?;
        writeln!(
            writer,
            "decoupler {} at {}",
            manifest.tool_version,
            manifest.generated_at.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
        )?;
        writeln!(writer)?;

        let counts = manifest.strategy_counts();
        if !counts.is_empty() {
            for (strategy, count) in &counts {
                writeln!(writer, "  {:<16}{:>6}", strategy.as_str(), count)?;
            }
        }
        let failed = manifest.failed_count();
        if failed > 0 {
            writeln!(writer, "  {:<16}{:>6}", "failed", failed)?;
        }
        writeln!(writer)?;

        // Fatal first, then warnings, then info; stable within a severity.
        for severity in [Severity::Fatal, Severity::Warning, Severity::Info] {
            if severity == Severity::Info && !self.show_info {
                continue;
            }
            for f in report.findings.iter().filter(|f| f.severity == severity) {
                self.write_finding(f, writer)?;
            }
        }

        let totals = SeverityCounts::of(report.findings);
        writeln!(
            writer,
            "{} file(s) written, {} fatal, {} warning(s), {} info",
            manifest.written().count(),
            totals.fatal,
            totals.warning,
            totals.info
        )?;

        if report.is_success() {
            writeln!(
                writer,
                "{}",
                self.paint(Style::new().green().bold(), "Template tree is valid")
            )?;
        } else {
            writeln!(
                writer,
                "{}",
                self.paint(
                    Style::new().red().bold(),
                    "Template tree has fatal findings and must not be published"
                )
            )?;
        }

        Ok(())
    }
}
