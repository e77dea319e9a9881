//! Output formatting for the CLI.

use colored::*;
use ddi_domain::InteractionRecord;
use ddi_ingest::{FileOutcome, IngestReport, ProgressEvent, ProgressObserver};
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
#[derive(Debug, Clone, Copy)]
pub struct Formatter {
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(color_enabled: bool) -> Self {
        Self { color_enabled }
    }

    /// Format an import report as a per-file table plus totals.
    pub fn format_report(&self, report: &IngestReport) -> String {
        if report.files.is_empty() {
            return self.warning("No source files were configured.");
        }

        let mut builder = Builder::default();
        builder.push_record(["File", "Status", "Records", "Rejected"]);

        for file in &report.files {
            let name = file
                .path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| file.path.display().to_string());
            let (status, records, rejected) = match &file.outcome {
                FileOutcome::Ingested { records, rejected } => {
                    ("ingested".to_string(), records.to_string(), rejected.to_string())
                }
                FileOutcome::Skipped { .. } => ("skipped".to_string(), "-".to_string(), "-".to_string()),
            };
            builder.push_record([name, status, records, rejected]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        format!(
            "{}\n{}",
            table,
            self.success(&format!(
                "{} records imported in {} batches ({} rows rejected, {} files skipped)",
                report.total,
                report.flushes,
                report.rejected,
                report.skipped().count()
            ))
        )
    }

    /// Format sample records, one per line.
    pub fn format_samples(&self, records: &[InteractionRecord]) -> String {
        records
            .iter()
            .map(|r| format!("  - {} + {} ({})", r.drug_a, r.drug_b, r.level))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}

/// Prints import progress to stdout.
pub struct ConsoleObserver {
    formatter: Formatter,
}

impl ConsoleObserver {
    /// Create an observer printing through `formatter`.
    pub fn new(formatter: Formatter) -> Self {
        Self { formatter }
    }

    /// Text for one event.
    pub fn render(&self, event: &ProgressEvent<'_>) -> String {
        let f = &self.formatter;
        match event {
            ProgressEvent::FileStarted { path } => f.info(&format!("Processing {}", path.display())),
            ProgressEvent::FileSkipped { path, reason } => {
                f.warning(&format!("Skipping {}: {}", path.display(), reason))
            }
            ProgressEvent::RowRejected { path, line, reason } => {
                f.warning(&format!("{} line {}: {}", path.display(), line, reason))
            }
            ProgressEvent::BatchFlushed { size, total } => {
                format!("  {} records written ({} total)", size, total)
            }
            ProgressEvent::QuotaBackoff { delay, .. } => f.warning(&format!(
                "Quota exceeded, retrying in {}s",
                delay.as_secs_f64()
            )),
            ProgressEvent::FileFinished { path, records, rejected } => f.success(&format!(
                "{}: {} records ({} rejected)",
                path.display(),
                records,
                rejected
            )),
        }
    }
}

impl ProgressObserver for ConsoleObserver {
    fn on_event(&mut self, event: &ProgressEvent<'_>) {
        println!("{}", self.render(event));
    }
}
