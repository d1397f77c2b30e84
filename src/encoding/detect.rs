//! Charset detection adapter.
//!
//! Detection is a black-box service behind the [`Detector`] trait: feed it a
//! whole byte buffer, get back a charset name or an explicit "no result".
//! The adapter layer on top applies the optional source-encoding allow-list
//! and keeps "could not decide" distinct from "decided, but filtered out".

use chardetng::EncodingDetector;
use encoding_rs::Encoding;

use crate::error::ConvertResult;
use crate::processing::filter::AllowList;
use crate::BINARY_SNIFF_LEN;

/// Pluggable statistical charset detector.
pub trait Detector: Send + Sync {
    /// Analyze the full buffer in one pass.
    ///
    /// Returns the detected charset name, or `None` when no usable charset
    /// could be inferred.
    fn detect(&self, bytes: &[u8]) -> Option<String>;
}

/// What detection concluded for one buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Detection {
    /// A charset was detected (name as reported by the detector).
    Detected(String),
    /// The detector could not decide.
    Unknown,
    /// Detection succeeded but the result is outside the allow-list.
    Filtered {
        /// The charset that was detected and then rejected.
        detected: String,
    },
}

/// Default detector: BOM sniffing plus frequency analysis.
///
/// Buffers that look binary (NUL bytes or a high control-character ratio in
/// the leading sample) yield no result instead of a spurious single-byte
/// guess, since frequency analysis always has a "best" answer.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatisticalDetector;

impl Detector for StatisticalDetector {
    fn detect(&self, bytes: &[u8]) -> Option<String> {
        if bytes.is_empty() {
            return None;
        }

        if let Some((encoding, _bom_len)) = Encoding::for_bom(bytes) {
            return Some(encoding.name().to_string());
        }

        if looks_binary(bytes) {
            return None;
        }

        let mut detector = EncodingDetector::new();
        detector.feed(bytes, true);
        let guess = detector.guess(None, true);

        // A guess that cannot cleanly decode its own input is no guess.
        let (_, malformed) = guess.decode_without_bom_handling(bytes);
        if malformed {
            return None;
        }

        Some(guess.name().to_string())
    }
}

/// Heuristic from the leading sample: NUL bytes, or >10% control characters.
fn looks_binary(bytes: &[u8]) -> bool {
    let sample = &bytes[..bytes.len().min(BINARY_SNIFF_LEN)];

    if sample.contains(&0) {
        return true;
    }

    let control = sample
        .iter()
        .filter(|&&b| b < 32 && !matches!(b, b'\t' | b'\n' | b'\r'))
        .count();

    !sample.is_empty() && (control as f64 / sample.len() as f64) > 0.1
}

/// Detect a buffer's charset and apply the source-encoding allow-list.
///
/// The allow-list is only consulted when detection produced a name, so an
/// invalid pattern cannot turn an `Unknown` buffer into an error.
pub fn detect_source(
    bytes: &[u8],
    allow: Option<&str>,
    detector: &dyn Detector,
) -> ConvertResult<Detection> {
    let Some(detected) = detector.detect(bytes) else {
        return Ok(Detection::Unknown);
    };

    if let Some(pattern) = allow.filter(|p| !p.trim().is_empty()) {
        let list = AllowList::exact_names(pattern)?;
        if !list.matches(&detected) {
            return Ok(Detection::Filtered { detected });
        }
    }

    Ok(Detection::Detected(detected))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConvertError;

    #[test]
    fn detects_utf8_text() {
        let detector = StatisticalDetector;
        let text = "Grüße aus München — olá, mundo!";
        assert_eq!(detector.detect(text.as_bytes()).as_deref(), Some("UTF-8"));
    }

    #[test]
    fn detects_gbk_text() {
        let detector = StatisticalDetector;
        let (bytes, _, _) = encoding_rs::GBK.encode("你好，世界。今天的天气真不错，我们一起去公园散步吧。");
        assert_eq!(detector.detect(&bytes).as_deref(), Some("GBK"));
    }

    #[test]
    fn detects_bom_marked_utf16() {
        let detector = StatisticalDetector;
        let mut bytes = vec![0xFF, 0xFE];
        for unit in "hello".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        assert_eq!(detector.detect(&bytes).as_deref(), Some("UTF-16LE"));
    }

    #[test]
    fn binary_and_empty_buffers_are_unknown() {
        let detector = StatisticalDetector;
        assert_eq!(detector.detect(&[]), None);
        assert_eq!(detector.detect(&[0x7F, 0x45, 0x4C, 0x46, 0x00, 0x01]), None);
    }

    #[test]
    fn allow_list_separates_filtered_from_unknown() {
        let detector = StatisticalDetector;
        let text = "Grüße aus München — olá, mundo!";

        let hit = detect_source(text.as_bytes(), Some("UTF-8|GBK"), &detector).unwrap();
        assert_eq!(hit, Detection::Detected("UTF-8".to_string()));

        let miss = detect_source(text.as_bytes(), Some("GBK|GB18030"), &detector).unwrap();
        assert_eq!(
            miss,
            Detection::Filtered {
                detected: "UTF-8".to_string()
            }
        );

        let unknown = detect_source(&[0u8; 16], Some("GBK"), &detector).unwrap();
        assert_eq!(unknown, Detection::Unknown);
    }

    #[test]
    fn allow_list_matching_is_case_insensitive() {
        let detector = StatisticalDetector;
        let text = "Grüße aus München — olá, mundo!";
        let hit = detect_source(text.as_bytes(), Some("utf-8"), &detector).unwrap();
        assert_eq!(hit, Detection::Detected("UTF-8".to_string()));
    }

    #[test]
    fn invalid_allow_list_is_a_pattern_error() {
        let detector = StatisticalDetector;
        let text = "plain text with ümlauts";
        let err = detect_source(text.as_bytes(), Some("UTF-8||GBK"), &detector).unwrap_err();
        assert!(matches!(err, ConvertError::Pattern { .. }));
    }
}
