//! Single-file conversion: detect, validate, transcode, rewrite in place.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::encoding::{
    detect_source, normalize, Codec, Detection, Detector, Normalized, StatisticalDetector,
    WhatwgCodec,
};
use crate::error::{ConvertError, ConvertResult};
use crate::logging::{default_sink, LogLevel, LogSink};
use crate::types::FileOutcome;

/// Converts one file at a time; the unit of failure isolation.
///
/// Each call is fully self-contained: the whole file is read into memory,
/// its encoding detected and validated, the buffer transcoded, and the file
/// rewritten with a truncate-and-write. Any skip or error leaves the file
/// byte-for-byte untouched; the rewrite itself is the only mutating step and
/// is not crash-atomic (a temp-file-plus-rename layer is a caller concern).
#[derive(Clone)]
pub struct FileConverter {
    detector: Arc<dyn Detector>,
    codec: Arc<dyn Codec>,
    sink: Arc<dyn LogSink>,
}

impl Default for FileConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl FileConverter {
    /// Create a converter with the default detector, codec, and log sink.
    pub fn new() -> Self {
        Self {
            detector: Arc::new(StatisticalDetector),
            codec: Arc::new(WhatwgCodec),
            sink: default_sink(),
        }
    }

    /// Replace the charset detector.
    pub fn with_detector(mut self, detector: Arc<dyn Detector>) -> Self {
        self.detector = detector;
        self
    }

    /// Replace the codec engine.
    pub fn with_codec(mut self, codec: Arc<dyn Codec>) -> Self {
        self.codec = codec;
        self
    }

    /// Replace the log sink.
    pub fn with_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Get the codec engine.
    pub fn codec(&self) -> &dyn Codec {
        self.codec.as_ref()
    }

    /// Convert one file in place to `target` (a canonical encoding name).
    ///
    /// Skip outcomes are returned in `Ok`; IO, pattern, and codec failures
    /// propagate as errors for the dispatcher to catch at the task boundary.
    pub fn convert_file(
        &self,
        path: &Path,
        target: &str,
        source_filter: Option<&str>,
    ) -> ConvertResult<FileOutcome> {
        let bytes = fs::read(path).map_err(|e| ConvertError::io("read", path, e))?;

        let detected = match detect_source(&bytes, source_filter, self.detector.as_ref())? {
            Detection::Detected(name) => name,
            Detection::Unknown => {
                self.sink.log(
                    LogLevel::Warn,
                    &format!("skipping {}: encoding could not be detected", path.display()),
                );
                return Ok(FileOutcome::SkippedUnknownEncoding);
            }
            Detection::Filtered { detected } => {
                self.sink.log(
                    LogLevel::Warn,
                    &format!(
                        "skipping {}: detected encoding {} does not match source filter",
                        path.display(),
                        detected
                    ),
                );
                return Ok(FileOutcome::SkippedFilteredEncoding);
            }
        };

        let source = match normalize(&detected) {
            Normalized::Known(name) => name.to_string(),
            Normalized::Unknown(raw) => {
                self.sink.log(
                    LogLevel::Warn,
                    &format!("unrecognized encoding name {raw}, passing through unmapped"),
                );
                if !self.codec.supports(&raw) {
                    self.sink.log(
                        LogLevel::Warn,
                        &format!(
                            "skipping {}: detected encoding {} is not supported",
                            path.display(),
                            raw
                        ),
                    );
                    return Ok(FileOutcome::SkippedUnmappedEncoding);
                }
                raw
            }
            Normalized::Empty => {
                self.sink.log(
                    LogLevel::Warn,
                    &format!("skipping {}: detector returned an empty encoding name", path.display()),
                );
                return Ok(FileOutcome::SkippedUnmappedEncoding);
            }
        };

        let converted = self.codec.transcode(&bytes, &source, target)?;

        fs::write(path, &converted).map_err(|e| ConvertError::io("write", path, e))?;

        self.sink.log(
            LogLevel::Info,
            &format!("{} | {} -> {}", path.display(), source, target),
        );

        Ok(FileOutcome::Converted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tempfile::tempdir;

    fn write_fixture(dir: &tempfile::TempDir, name: &str, bytes: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, bytes).unwrap();
        path
    }

    #[derive(Default)]
    struct MemorySink(Mutex<Vec<(LogLevel, String)>>);

    impl LogSink for MemorySink {
        fn log(&self, level: LogLevel, message: &str) {
            self.0.lock().unwrap().push((level, message.to_string()));
        }
    }

    #[test]
    fn converts_gbk_file_to_utf8_in_place() {
        let dir = tempdir().unwrap();
        let text = "你好，世界。今天的天气真不错，我们一起去公园散步吧。";
        let (gbk, _, _) = encoding_rs::GBK.encode(text);
        let path = write_fixture(&dir, "a.txt", &gbk);

        let outcome = FileConverter::new()
            .convert_file(&path, "UTF-8", None)
            .unwrap();

        assert_eq!(outcome, FileOutcome::Converted);
        assert_eq!(fs::read(&path).unwrap(), text.as_bytes());
    }

    #[test]
    fn undetectable_file_is_skipped_untouched() {
        let dir = tempdir().unwrap();
        let garbage = [0x00, 0x01, 0x02, 0xFF, 0xFE, 0x00, 0x7F];
        let path = write_fixture(&dir, "blob.bin", &garbage);

        let outcome = FileConverter::new()
            .convert_file(&path, "UTF-8", None)
            .unwrap();

        assert_eq!(outcome, FileOutcome::SkippedUnknownEncoding);
        assert_eq!(fs::read(&path).unwrap(), garbage);
    }

    #[test]
    fn filtered_source_is_skipped_untouched() {
        let dir = tempdir().unwrap();
        let bytes = "Grüße aus München, olá mundo!".as_bytes();
        let path = write_fixture(&dir, "b.txt", bytes);

        let outcome = FileConverter::new()
            .convert_file(&path, "UTF-8", Some("GBK|GB18030"))
            .unwrap();

        assert_eq!(outcome, FileOutcome::SkippedFilteredEncoding);
        assert_eq!(fs::read(&path).unwrap(), bytes);
    }

    #[test]
    fn rerunning_on_converted_output_is_a_stable_no_op() {
        let dir = tempdir().unwrap();
        let text = "编码转换工具的幂等性检查。再跑一次也不能破坏文件。";
        let path = write_fixture(&dir, "idem.txt", text.as_bytes());
        let converter = FileConverter::new();

        let first = converter.convert_file(&path, "UTF-8", None).unwrap();
        let after_first = fs::read(&path).unwrap();
        let second = converter.convert_file(&path, "UTF-8", None).unwrap();

        assert_eq!(first, FileOutcome::Converted);
        assert_eq!(second, FileOutcome::Converted);
        assert_eq!(fs::read(&path).unwrap(), after_first);
        assert_eq!(after_first, text.as_bytes());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempdir().unwrap();
        let err = FileConverter::new()
            .convert_file(&dir.path().join("absent.txt"), "UTF-8", None)
            .unwrap_err();
        assert!(matches!(err, ConvertError::Io { operation: "read", .. }));
    }

    #[test]
    fn invalid_source_filter_is_a_pattern_error() {
        let dir = tempdir().unwrap();
        let bytes = "text with ümlauts so detection has something non-ascii".as_bytes();
        let path = write_fixture(&dir, "c.txt", bytes);

        let err = FileConverter::new()
            .convert_file(&path, "UTF-8", Some("GBK||UTF-8"))
            .unwrap_err();

        assert!(matches!(err, ConvertError::Pattern { .. }));
        assert_eq!(fs::read(&path).unwrap(), bytes);
    }

    #[test]
    fn custom_sink_receives_the_transition_line() {
        let dir = tempdir().unwrap();
        let path = write_fixture(&dir, "d.txt", "Grüße und servus!".as_bytes());
        let sink = Arc::new(MemorySink::default());

        let converter = FileConverter::new().with_sink(sink.clone());
        converter.convert_file(&path, "UTF-8", None).unwrap();

        let lines = sink.0.lock().unwrap();
        assert!(lines
            .iter()
            .any(|(level, msg)| *level == LogLevel::Info && msg.contains("-> UTF-8")));
    }
}
