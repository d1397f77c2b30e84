//! Transcoding adapter.
//!
//! Conversion is a black-box service behind the [`Codec`] trait. The default
//! implementation delegates to the WHATWG Encoding Standard codecs: decode
//! the whole buffer under the declared source encoding, then re-encode into
//! the target. Failures surface as errors; nothing is silently replaced or
//! truncated.

use encoding_rs::{CoderResult, Encoding, UTF_16BE, UTF_16LE};

use crate::error::{ConvertError, ConvertResult};
use crate::TRANSCODE_HEADROOM_FACTOR;

/// Pluggable codec engine.
pub trait Codec: Send + Sync {
    /// Whether `name` resolves to a codec this engine can use.
    fn supports(&self, name: &str) -> bool;

    /// Convert `input` from the `from` encoding into the `to` encoding.
    fn transcode(&self, input: &[u8], from: &str, to: &str) -> ConvertResult<Vec<u8>>;
}

/// Default codec backed by the WHATWG Encoding Standard tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhatwgCodec;

impl WhatwgCodec {
    fn resolve(name: &str) -> ConvertResult<&'static Encoding> {
        Encoding::for_label(name.trim().as_bytes())
            .ok_or_else(|| ConvertError::unknown_encoding(name))
    }
}

impl Codec for WhatwgCodec {
    fn supports(&self, name: &str) -> bool {
        Encoding::for_label(name.trim().as_bytes()).is_some()
    }

    fn transcode(&self, input: &[u8], from: &str, to: &str) -> ConvertResult<Vec<u8>> {
        let from_enc = Self::resolve(from)?;
        let to_enc = Self::resolve(to)?;

        let (text, _, malformed) = from_enc.decode(input);
        if malformed {
            return Err(ConvertError::codec(
                from,
                to,
                format!("input is not valid {}", from_enc.name()),
            ));
        }

        // The Encoding Standard has no UTF-16 encoder; serialize code units
        // directly for those targets.
        if to_enc == UTF_16LE || to_enc == UTF_16BE {
            let mut output = Vec::with_capacity(text.len() * 2);
            for unit in text.encode_utf16() {
                let bytes = if to_enc == UTF_16LE {
                    unit.to_le_bytes()
                } else {
                    unit.to_be_bytes()
                };
                output.extend_from_slice(&bytes);
            }
            return Ok(output);
        }

        // Conservative headroom for narrow-to-wide expansion. Not a hard
        // guarantee for every codec pair, so a full buffer is an error
        // rather than a truncation.
        let mut output = vec![0u8; input.len() * TRANSCODE_HEADROOM_FACTOR + 1];
        let mut encoder = to_enc.new_encoder();
        let (result, _read, written, unmappable) = encoder.encode_from_utf8(&text, &mut output, true);

        if let CoderResult::OutputFull = result {
            return Err(ConvertError::codec(
                from,
                to,
                format!(
                    "output exceeded {}x+1 headroom ({} input bytes)",
                    TRANSCODE_HEADROOM_FACTOR,
                    input.len()
                ),
            ));
        }
        if unmappable {
            return Err(ConvertError::codec(
                from,
                to,
                format!("input contains characters unmappable in {}", to_enc.name()),
            ));
        }

        output.truncate(written);
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn gbk_to_utf8() {
        let codec = WhatwgCodec;
        let (gbk, _, _) = encoding_rs::GBK.encode("编码转换");
        let out = codec.transcode(&gbk, "GBK", "UTF-8").unwrap();
        assert_eq!(out, "编码转换".as_bytes());
    }

    #[test]
    fn utf8_utf16le_round_trip() {
        let codec = WhatwgCodec;
        let original = "Héllo wörld, 你好 ✓".as_bytes();

        let wide = codec.transcode(original, "UTF-8", "UTF-16LE").unwrap();
        assert_ne!(wide, original);

        let narrow = codec.transcode(&wide, "UTF-16LE", "UTF-8").unwrap();
        assert_eq!(narrow, original);
    }

    #[test]
    fn utf16be_target_serializes_big_endian() {
        let codec = WhatwgCodec;
        let out = codec.transcode("Hi".as_bytes(), "UTF-8", "UTF-16BE").unwrap();
        assert_eq!(out, vec![0x00, 0x48, 0x00, 0x69]);
    }

    #[test]
    fn same_encoding_is_a_clean_no_op() {
        let codec = WhatwgCodec;
        let text = "already utf-8: καλημέρα".as_bytes();
        let out = codec.transcode(text, "UTF-8", "UTF-8").unwrap();
        assert_eq!(out, text);
    }

    #[test]
    fn unknown_encoding_is_rejected() {
        let codec = WhatwgCodec;
        let err = codec.transcode(b"abc", "klingon", "UTF-8").unwrap_err();
        assert!(matches!(err, ConvertError::UnknownEncoding { .. }));
        assert!(!codec.supports("klingon"));
        assert!(codec.supports("GB18030"));
        assert!(codec.supports("Big5"));
    }

    #[test]
    fn malformed_input_is_a_codec_error() {
        let codec = WhatwgCodec;
        // Truncated multi-byte sequence presented as UTF-8.
        let err = codec.transcode(&[0xE4, 0xBD], "UTF-8", "GBK").unwrap_err();
        assert!(matches!(err, ConvertError::Codec { .. }));
    }

    #[test]
    fn unmappable_characters_are_not_replaced() {
        let codec = WhatwgCodec;
        let err = codec
            .transcode("你好".as_bytes(), "UTF-8", "windows-1252")
            .unwrap_err();
        match err {
            ConvertError::Codec { detail, .. } => assert!(detail.contains("unmappable")),
            other => panic!("expected codec error, got {other:?}"),
        }
    }
}
