//! Error types for the conversion engine.
//!
//! Run-level errors (`UnsupportedTarget`, `InvalidPath`) abort a whole run
//! before any file is touched. Everything else is caught at the file-task
//! boundary and recorded as that file's failure.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result type for conversion operations.
pub type ConvertResult<T> = Result<T, ConvertError>;

/// Errors produced while detecting, transcoding, or rewriting files.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The requested target encoding cannot be resolved to a usable codec.
    #[error("unsupported target encoding: {name}")]
    UnsupportedTarget {
        /// The name as supplied by the caller.
        name: String,
    },

    /// The root path is neither a regular file nor a directory.
    #[error("invalid path: {}", .path.display())]
    InvalidPath {
        /// The offending path.
        path: PathBuf,
    },

    /// An allow-list pattern could not be compiled.
    #[error("invalid filter pattern `{pattern}`: {reason}")]
    Pattern {
        /// The pattern as supplied by the caller.
        pattern: String,
        /// Why compilation was rejected.
        reason: String,
    },

    /// A name that reached the codec is not a recognized encoding.
    #[error("unknown encoding: {name}")]
    UnknownEncoding {
        /// The unrecognized name.
        name: String,
    },

    /// The codec failed to convert between two encodings.
    #[error("cannot transcode {from} -> {to}: {detail}")]
    Codec {
        /// Source encoding name.
        from: String,
        /// Target encoding name.
        to: String,
        /// Diagnostic reported by the codec.
        detail: String,
    },

    /// A filesystem operation on one file failed.
    #[error("{} failed for {}: {}", .operation, .path.display(), .source)]
    Io {
        /// Operation that triggered the failure.
        operation: &'static str,
        /// Path involved in the failure.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },

    /// A dispatched file task could not be joined (concurrent mode only).
    #[error("task for {} could not be joined: {}", .path.display(), .detail)]
    TaskJoin {
        /// Path the lost task was processing.
        path: PathBuf,
        /// Join diagnostic.
        detail: String,
    },
}

impl ConvertError {
    pub(crate) fn pattern(pattern: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Pattern {
            pattern: pattern.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn unknown_encoding(name: impl Into<String>) -> Self {
        Self::UnknownEncoding { name: name.into() }
    }

    pub(crate) fn codec(
        from: impl Into<String>,
        to: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self::Codec {
            from: from.into(),
            to: to.into(),
            detail: detail.into(),
        }
    }

    pub(crate) fn io(operation: &'static str, path: &Path, source: io::Error) -> Self {
        Self::Io {
            operation,
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn task_join(path: &Path, detail: impl Into<String>) -> Self {
        Self::TaskJoin {
            path: path.to_path_buf(),
            detail: detail.into(),
        }
    }

    /// Whether this error aborts a whole run rather than a single file.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedTarget { .. } | Self::InvalidPath { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_errors_are_run_level() {
        assert!(ConvertError::UnsupportedTarget {
            name: "klingon".into()
        }
        .is_fatal());
        assert!(ConvertError::InvalidPath {
            path: PathBuf::from("/nope")
        }
        .is_fatal());
        assert!(!ConvertError::pattern("txt|", "empty alternative").is_fatal());
        assert!(!ConvertError::unknown_encoding("x-unknown").is_fatal());
    }

    #[test]
    fn messages_carry_context() {
        let err = ConvertError::codec("GBK", "UTF-8", "malformed input");
        assert_eq!(err.to_string(), "cannot transcode GBK -> UTF-8: malformed input");

        let err = ConvertError::io("read", Path::new("a.txt"), io::Error::other("denied"));
        assert!(err.to_string().contains("a.txt"));
    }
}
