//! Encoding detection and safe decoding for loose text files.
//!
//! Chinese plain-text files arrive in a zoo of encodings (UTF-8, GB2312,
//! GBK, GB18030, Big5), frequently mislabeled or detected with low
//! confidence. This module resolves that ambiguity with an ordered
//! heuristic cascade ([`detect_encoding`]) and then decodes defensively
//! ([`decode_bytes`]): ambiguity is never fatal, and every fallback is
//! reported through the event sink.

mod detect;

pub use detect::{detect_encoding, guess_encoding, EncodingGuess};

use crate::common::{EventSink, Result};
use crate::profile::contains_cjk;
use encoding_rs::{Encoding, GB18030, GBK};
use std::path::Path;

/// Decode `bytes` under `encoding`, recovering from mismatches.
///
/// Policy, in order:
/// 1. A GBK/GB2312 request is first retried under GB18030 in strict mode,
///    since GB18030 is a byte-compatible superset.
/// 2. Strict decode under the requested encoding.
/// 3. Lossy decode (invalid sequences replaced); accepted if the result
///    contains at least one CJK character.
/// 4. Lossy GB18030 decode as the last resort, since a "successful" lossy decode
///    with no CJK output is itself evidence of a wrong encoding.
///
/// The function always produces a string; an empty result for non-empty
/// input means every fallback was exhausted. Every recovery step is logged.
pub fn decode_bytes(bytes: &[u8], encoding: &'static Encoding, sink: &dyn EventSink) -> String {
    if bytes.is_empty() {
        return String::new();
    }

    if encoding == GBK {
        let (text, had_errors) = GB18030.decode_without_bom_handling(bytes);
        if !had_errors {
            return text.into_owned();
        }
        sink.log("strict GB18030 decode failed, falling back to the requested encoding");
    }

    // encoding_rs decoding is lossy with an error flag, so a single call
    // yields both the strict answer and the replacement-character fallback.
    let (text, _, had_errors) = encoding.decode(bytes);
    if !had_errors {
        return text.into_owned();
    }

    sink.log(&format!(
        "strict {} decode failed, kept lossy result",
        encoding.name()
    ));
    if contains_cjk(&text) {
        return text.into_owned();
    }

    sink.log("lossy decode produced no CJK text, retrying as GB18030");
    let (fallback, _, _) = GB18030.decode(bytes);
    fallback.into_owned()
}

/// Read a text file, detect its encoding, and decode it.
///
/// Returns the decoded text together with the encoding the cascade chose.
/// Only I/O failures produce an error; decoding itself never fails.
pub fn read_text_file<P: AsRef<Path>>(
    path: P,
    sink: &dyn EventSink,
) -> Result<(String, &'static Encoding)> {
    let bytes = std::fs::read(path)?;
    let encoding = detect_encoding(&bytes, sink);
    let text = decode_bytes(&bytes, encoding, sink);
    Ok((text, encoding))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::NullSink;
    use encoding_rs::{BIG5, UTF_8};

    #[test]
    fn decode_utf8_text() {
        let text = decode_bytes("中文 text".as_bytes(), UTF_8, &NullSink);
        assert_eq!(text, "中文 text");
    }

    #[test]
    fn gbk_request_upgrades_to_gb18030() {
        let (bytes, _, _) = GB18030.encode("汉字编码");
        let text = decode_bytes(&bytes, GBK, &NullSink);
        assert_eq!(text, "汉字编码");
    }

    #[test]
    fn big5_round_trip() {
        let (bytes, _, had_errors) = BIG5.encode("繁體中文");
        assert!(!had_errors);
        let text = decode_bytes(&bytes, BIG5, &NullSink);
        assert_eq!(text, "繁體中文");
    }

    #[test]
    fn wrong_encoding_recovers_via_gb18030() {
        // GB18030 bytes decoded as UTF-8 fail strictly and produce no CJK
        // through the lossy path, so the GB18030 fallback kicks in.
        let (bytes, _, _) = GB18030.encode("简体中文内容");
        let text = decode_bytes(&bytes, UTF_8, &NullSink);
        assert_eq!(text, "简体中文内容");
    }

    #[test]
    fn empty_input_decodes_to_empty() {
        assert_eq!(decode_bytes(b"", UTF_8, &NullSink), "");
    }
}
