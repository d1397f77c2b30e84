//! Batch dispatch of file conversions across a directory tree.

use std::path::PathBuf;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use walkdir::WalkDir;

use crate::encoding::{normalize, Codec, Detector, Normalized};
use crate::error::{ConvertError, ConvertResult};
use crate::logging::{default_sink, LogLevel, LogSink};
use crate::processing::{accepts_file_name, FileConverter};
use crate::types::{ConversionReport, ConversionRequest, EngineConfig, FileOutcome};

/// Walks the input path, filters candidates, and fans file conversions out
/// to a bounded worker pool.
///
/// Every file task is independent: its errors are caught at the task
/// boundary, logged, and recorded as that file's `Failed` outcome without
/// affecting siblings. The only synchronization point is the batch join at
/// the end of a concurrent run.
#[derive(Clone)]
pub struct BatchConverter {
    converter: FileConverter,
    config: EngineConfig,
    sink: Arc<dyn LogSink>,
}

impl Default for BatchConverter {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl BatchConverter {
    /// Create a batch converter with the default detector, codec, and sink.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            converter: FileConverter::new(),
            config,
            sink: default_sink(),
        }
    }

    /// Replace the log sink for the dispatcher and its file tasks.
    pub fn with_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.converter = self.converter.with_sink(Arc::clone(&sink));
        self.sink = sink;
        self
    }

    /// Replace the charset detector.
    pub fn with_detector(mut self, detector: Arc<dyn Detector>) -> Self {
        self.converter = self.converter.with_detector(detector);
        self
    }

    /// Replace the codec engine.
    pub fn with_codec(mut self, codec: Arc<dyn Codec>) -> Self {
        self.converter = self.converter.with_codec(codec);
        self
    }

    /// Run a conversion with concurrent per-file tasks.
    ///
    /// In-flight tasks are bounded by `max_workers`; the call returns only
    /// after every dispatched task has been joined. A failure observed while
    /// joining a task (rather than inside it) is recorded against that file.
    pub async fn convert(&self, request: &ConversionRequest) -> ConvertResult<ConversionReport> {
        let (target, candidates, mut report) = self.prepare(request)?;

        let results: Vec<(PathBuf, ConvertResult<FileOutcome>)> =
            stream::iter(candidates.into_iter().map(|path| {
                let converter = self.converter.clone();
                let target = target.clone();
                let source_filter = request.source_filter.clone();
                async move {
                    let task_path = path.clone();
                    let handle = tokio::task::spawn_blocking(move || {
                        converter.convert_file(&task_path, &target, source_filter.as_deref())
                    });
                    let result = match handle.await {
                        Ok(result) => result,
                        Err(join) => Err(ConvertError::task_join(&path, join.to_string())),
                    };
                    (path, result)
                }
            }))
            .buffer_unordered(self.config.max_workers.max(1))
            .collect()
            .await;

        for (path, result) in results {
            self.record(&mut report, path, result);
        }

        self.log_summary(&report);
        Ok(report)
    }

    /// Run a conversion one file at a time, in enumeration order.
    ///
    /// Per-file semantics are identical to [`convert`](Self::convert); this
    /// is the deterministic reference mode.
    pub fn convert_sequential(
        &self,
        request: &ConversionRequest,
    ) -> ConvertResult<ConversionReport> {
        let (target, candidates, mut report) = self.prepare(request)?;

        for path in candidates {
            let result =
                self.converter
                    .convert_file(&path, &target, request.source_filter.as_deref());
            self.record(&mut report, path, result);
        }

        self.log_summary(&report);
        Ok(report)
    }

    /// Validate the target encoding and enumerate candidate files.
    ///
    /// Fails fast, with zero files touched, when the target cannot be
    /// resolved or the root path is unusable.
    fn prepare(
        &self,
        request: &ConversionRequest,
    ) -> ConvertResult<(String, Vec<PathBuf>, ConversionReport)> {
        let target = match normalize(&request.target_encoding) {
            Normalized::Known(name) => {
                self.sink
                    .log(LogLevel::Info, &format!("target encoding mapped: {name}"));
                name.to_string()
            }
            Normalized::Unknown(raw) => {
                self.sink.log(
                    LogLevel::Warn,
                    &format!("unrecognized target encoding {raw}, passing through unmapped"),
                );
                raw
            }
            Normalized::Empty => {
                return Err(ConvertError::UnsupportedTarget {
                    name: request.target_encoding.clone(),
                })
            }
        };

        if !self.converter.codec().supports(&target) {
            return Err(ConvertError::UnsupportedTarget { name: target });
        }

        let mut report = ConversionReport::default();
        let mut candidates = Vec::new();

        if request.root.is_dir() {
            self.sink.log(
                LogLevel::Info,
                &format!("processing directory: {}", request.root.display()),
            );
            for entry in WalkDir::new(&request.root).min_depth(1) {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(err) => {
                        let path = err
                            .path()
                            .map(PathBuf::from)
                            .unwrap_or_else(|| request.root.clone());
                        self.sink.log(
                            LogLevel::Error,
                            &format!("cannot traverse {}: {err}", path.display()),
                        );
                        report.record(
                            path,
                            FileOutcome::Failed {
                                reason: err.to_string(),
                            },
                        );
                        continue;
                    }
                };

                if !entry.file_type().is_file() {
                    self.sink.log(
                        LogLevel::Warn,
                        &format!("skipping non-regular entry: {}", entry.path().display()),
                    );
                    continue;
                }

                let name = entry.file_name().to_string_lossy().into_owned();
                self.screen_candidate(
                    entry.path().to_path_buf(),
                    &name,
                    request.file_filter.as_deref(),
                    &mut candidates,
                    &mut report,
                );
            }
        } else if request.root.is_file() {
            self.sink.log(
                LogLevel::Info,
                &format!("processing single file: {}", request.root.display()),
            );
            let name = request
                .root
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            self.screen_candidate(
                request.root.clone(),
                &name,
                request.file_filter.as_deref(),
                &mut candidates,
                &mut report,
            );
        } else {
            self.sink.log(
                LogLevel::Error,
                &format!("invalid path: {}", request.root.display()),
            );
            return Err(ConvertError::InvalidPath {
                path: request.root.clone(),
            });
        }

        Ok((target, candidates, report))
    }

    /// Apply the file-name filter to one enumerated file.
    fn screen_candidate(
        &self,
        path: PathBuf,
        name: &str,
        pattern: Option<&str>,
        candidates: &mut Vec<PathBuf>,
        report: &mut ConversionReport,
    ) {
        match accepts_file_name(name, pattern) {
            Ok(true) => candidates.push(path),
            Ok(false) => {
                self.sink.log(
                    LogLevel::Warn,
                    &format!("{} does not match the file filter, skipping", path.display()),
                );
                report.rejected_by_name += 1;
            }
            Err(err) => {
                self.sink.log(
                    LogLevel::Error,
                    &format!("cannot filter {}: {err}", path.display()),
                );
                report.record(
                    path,
                    FileOutcome::Failed {
                        reason: err.to_string(),
                    },
                );
            }
        }
    }

    fn record(
        &self,
        report: &mut ConversionReport,
        path: PathBuf,
        result: ConvertResult<FileOutcome>,
    ) {
        match result {
            Ok(outcome) => report.record(path, outcome),
            Err(err) => {
                self.sink.log(
                    LogLevel::Error,
                    &format!("error converting {}: {err}", path.display()),
                );
                report.record(
                    path,
                    FileOutcome::Failed {
                        reason: err.to_string(),
                    },
                );
            }
        }
    }

    fn log_summary(&self, report: &ConversionReport) {
        self.sink.log(
            LogLevel::Info,
            &format!(
                "run complete: {} converted, {} skipped, {} failed, {} rejected by name",
                report.converted,
                report.skipped_unknown + report.skipped_filtered + report.skipped_unmapped,
                report.failed,
                report.rejected_by_name
            ),
        );
    }
}
