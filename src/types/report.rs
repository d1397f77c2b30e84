//! Per-file outcomes and the aggregate run report.

use std::path::PathBuf;

use serde::Serialize;

/// Terminal state of one file task. No outcome is ever dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileOutcome {
    /// The file was transcoded and rewritten in place.
    Converted,
    /// The detector could not decide on an encoding.
    SkippedUnknownEncoding,
    /// Detection succeeded but the result was outside the source allow-list.
    SkippedFilteredEncoding,
    /// The detected encoding has no mapping this tool can use.
    SkippedUnmappedEncoding,
    /// The task failed; the file was left untouched.
    Failed {
        /// Diagnostic for the failure.
        reason: String,
    },
}

/// One file's recorded outcome.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    /// Absolute path of the file.
    pub path: PathBuf,
    /// What happened to it.
    pub outcome: FileOutcome,
}

/// Aggregate result of a conversion run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConversionReport {
    /// Files rewritten with transcoded content.
    pub converted: usize,
    /// Files skipped because detection yielded no result.
    pub skipped_unknown: usize,
    /// Files skipped because the detected encoding was filtered out.
    pub skipped_filtered: usize,
    /// Files skipped because the detected encoding has no usable mapping.
    pub skipped_unmapped: usize,
    /// Files whose task failed.
    pub failed: usize,
    /// Files excluded by the file-name filter (never entered processing).
    pub rejected_by_name: usize,
    /// Per-file outcomes, in completion order.
    pub files: Vec<FileReport>,
}

impl ConversionReport {
    /// Record one file's terminal outcome.
    pub fn record(&mut self, path: PathBuf, outcome: FileOutcome) {
        match outcome {
            FileOutcome::Converted => self.converted += 1,
            FileOutcome::SkippedUnknownEncoding => self.skipped_unknown += 1,
            FileOutcome::SkippedFilteredEncoding => self.skipped_filtered += 1,
            FileOutcome::SkippedUnmappedEncoding => self.skipped_unmapped += 1,
            FileOutcome::Failed { .. } => self.failed += 1,
        }
        self.files.push(FileReport { path, outcome });
    }

    /// Number of files that entered processing.
    pub fn processed(&self) -> usize {
        self.files.len()
    }

    /// Whether any file task failed.
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}
