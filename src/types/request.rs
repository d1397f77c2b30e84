//! Conversion request types.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Immutable description of one conversion run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionRequest {
    /// File or directory to process.
    pub root: PathBuf,

    /// Target encoding, as supplied by the caller (normalized at run start).
    pub target_encoding: String,

    /// Allow-list of acceptable detected source encodings (e.g. `"GBK|GB18030"`).
    pub source_filter: Option<String>,

    /// Allow-list of acceptable file extensions (e.g. `"txt|md|csv"`).
    pub file_filter: Option<String>,
}

impl ConversionRequest {
    /// Request converting everything under `root` to `target_encoding`.
    pub fn new(root: impl Into<PathBuf>, target_encoding: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            target_encoding: target_encoding.into(),
            source_filter: None,
            file_filter: None,
        }
    }

    /// Restrict the run to files whose detected encoding matches the allow-list.
    pub fn with_source_filter(mut self, pattern: impl Into<String>) -> Self {
        self.source_filter = Some(pattern.into());
        self
    }

    /// Restrict the run to files whose extension matches the allow-list.
    pub fn with_file_filter(mut self, pattern: impl Into<String>) -> Self {
        self.file_filter = Some(pattern.into());
        self
    }
}
