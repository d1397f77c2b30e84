//! Encoding services: name canonicalization, detection, transcoding.

mod alias;
mod detect;
mod transcode;

pub use alias::{normalize, Normalized};
pub use detect::{detect_source, Detection, Detector, StatisticalDetector};
pub use transcode::{Codec, WhatwgCodec};
