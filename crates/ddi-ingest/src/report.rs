//! Run summaries

use std::path::PathBuf;

/// What happened to one source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// The file was read to the end
    Ingested {
        /// Records accepted
        records: u64,
        /// Rows rejected
        rejected: u64,
    },
    /// The file was absent
    Skipped {
        /// Why the file was skipped
        reason: String,
    },
}

/// Per-file entry in an [`IngestReport`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    /// Source file
    pub path: PathBuf,
    /// What happened to it
    pub outcome: FileOutcome,
}

impl FileReport {
    /// Records accepted from this file (0 when skipped)
    pub fn records(&self) -> u64 {
        match self.outcome {
            FileOutcome::Ingested { records, .. } => records,
            FileOutcome::Skipped { .. } => 0,
        }
    }

    /// Whether the file was skipped
    pub fn is_skipped(&self) -> bool {
        matches!(self.outcome, FileOutcome::Skipped { .. })
    }
}

/// Summary of a completed run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// One entry per input file, in input order
    pub files: Vec<FileReport>,
    /// Records persisted
    pub total: u64,
    /// Successful bulk writes
    pub flushes: u64,
    /// Rows rejected across all files
    pub rejected: u64,
}

impl IngestReport {
    /// Files that were skipped
    pub fn skipped(&self) -> impl Iterator<Item = &FileReport> {
        self.files.iter().filter(|f| f.is_skipped())
    }

    /// Number of files read to the end
    pub fn files_ingested(&self) -> usize {
        self.files.iter().filter(|f| !f.is_skipped()).count()
    }

    /// Generate a one-paragraph summary
    pub fn summary(&self) -> String {
        let skipped = self.files.len() - self.files_ingested();
        format!(
            "Ingested {} records from {} files in {} flushes ({} rows rejected, {} files skipped)",
            self.total,
            self.files_ingested(),
            self.flushes,
            self.rejected,
            skipped
        )
    }
}
