//! Enconv Engine Library
//!
//! A concurrent text-encoding normalization engine: detects the character
//! encoding of each file under a path, optionally validates the detection
//! against an allow-list, transcodes matching files to a target encoding,
//! and rewrites them in place. One file's failure never aborts the batch.

pub mod batch;
pub mod encoding;
pub mod error;
pub mod logging;
pub mod processing;
pub mod types;

pub use batch::BatchConverter;
pub use encoding::{Codec, Detector, StatisticalDetector, WhatwgCodec};
pub use error::{ConvertError, ConvertResult};
pub use logging::{LogLevel, LogSink, TracingSink};
pub use processing::FileConverter;
pub use types::{ConversionReport, ConversionRequest, EngineConfig, FileOutcome};

/// Expansion headroom for transcode output buffers, in multiples of the
/// input length (plus one byte). Tolerates narrow-to-wide growth.
pub const TRANSCODE_HEADROOM_FACTOR: usize = 4;

/// Leading bytes sampled when deciding whether a buffer looks binary.
pub const BINARY_SNIFF_LEN: usize = 8192;

/// Worker-pool bound used when available parallelism cannot be probed.
pub const DEFAULT_MAX_WORKERS: usize = 4;
