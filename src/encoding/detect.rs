//! Encoding detection cascade.
//!
//! The statistical guesser alone is not good enough for short legacy
//! Chinese files: GB2312 and GBK text is routinely reported as a Western
//! single-byte encoding, and low-confidence guesses are common. The cascade
//! here layers strict trial decodes and a CJK-content check on top of the
//! statistical guess, with a standing bias toward GB18030, the documented
//! superset of GB2312 and GBK, whenever the evidence is ambiguous.

use crate::common::EventSink;
use crate::profile::contains_cjk;
use chardetng::EncodingDetector;
use encoding_rs::{Encoding, BIG5, GB18030, GBK, UTF_8};

/// A statistical encoding guess.
///
/// `confidence` is in `0.0..=1.0`. The underlying detector reports a binary
/// confident/unsure verdict, mapped to 1.0 and 0.6 respectively, so every
/// threshold in the cascade resolves to "was the detector sure".
#[derive(Debug, Clone, Copy)]
pub struct EncodingGuess {
    /// The guessed encoding.
    pub encoding: &'static Encoding,
    /// Detector confidence in `0.0..=1.0`.
    pub confidence: f32,
}

/// How many leading bytes the candidate probe decodes.
const PROBE_LEN: usize = 1000;

/// Chinese candidate encodings, superset first.
static CHINESE_CANDIDATES: [&Encoding; 3] = [GB18030, GBK, BIG5];

/// Statistical stage: BOM, UTF-8 validity, then byte-frequency detection.
///
/// Returns `None` for empty input.
pub fn guess_encoding(bytes: &[u8]) -> Option<EncodingGuess> {
    if bytes.is_empty() {
        return None;
    }

    if let Some((encoding, _bom_len)) = Encoding::for_bom(bytes) {
        return Some(EncodingGuess {
            encoding,
            confidence: 1.0,
        });
    }

    // A buffer that validates as UTF-8 end to end is UTF-8; GB18030 would
    // also decode it cleanly and yield CJK mojibake, so this check must
    // come before any superset probing.
    if std::str::from_utf8(bytes).is_ok() {
        return Some(EncodingGuess {
            encoding: UTF_8,
            confidence: 1.0,
        });
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let (encoding, confident) = detector.guess_assess(None, true);
    Some(EncodingGuess {
        encoding,
        confidence: if confident { 1.0 } else { 0.6 },
    })
}

/// Infer the encoding of a text file's bytes.
///
/// Ordered heuristic cascade; the first matching rule wins:
/// 1. statistical guess (BOM, UTF-8 validity, byte frequency);
/// 2. a low-confidence GBK guess is upgraded to GB18030 when the whole
///    buffer decodes strictly under it;
/// 3. on low confidence or a single-byte Western guess, probe the first
///    1000 bytes under each Chinese candidate and take the first that
///    decodes strictly and yields a CJK character;
/// 4. a low-confidence UTF-8 guess is probed as GB18030 the same way;
/// 5. otherwise keep the guess, or UTF-8 when there is none;
/// 6. a final GBK choice is always upgraded to its GB18030 superset.
///
/// Total: never fails, never panics; unresolved ambiguity degrades to
/// UTF-8. Each decision is logged through the sink.
pub fn detect_encoding(bytes: &[u8], sink: &dyn EventSink) -> &'static Encoding {
    let Some(guess) = guess_encoding(bytes) else {
        return UTF_8;
    };
    sink.log(&format!(
        "encoding guess: {} (confidence {:.2})",
        guess.encoding.name(),
        guess.confidence
    ));

    if guess.encoding == GBK && guess.confidence < 0.95 {
        let (_, had_errors) = GB18030.decode_without_bom_handling(bytes);
        if !had_errors {
            // Even without characters beyond the GBK range, prefer the
            // superset for compatibility.
            sink.log("low-confidence GBK guess, using GB18030");
            return GB18030;
        }
    }

    if guess.confidence < 0.7 || is_single_byte_western(guess.encoding) {
        let probe = &bytes[..bytes.len().min(PROBE_LEN)];
        for candidate in CHINESE_CANDIDATES {
            let (text, had_errors) = candidate.decode_without_bom_handling(probe);
            if !had_errors && contains_cjk(&text) {
                sink.log(&format!("found CJK text under {}", candidate.name()));
                return finish(candidate, sink);
            }
        }
    }

    if guess.encoding == UTF_8 && guess.confidence < 0.9 {
        let (text, had_errors) = GB18030.decode_without_bom_handling(bytes);
        if !had_errors && contains_cjk(&text) {
            sink.log("uncertain UTF-8 guess decodes as GB18030 with CJK text");
            return GB18030;
        }
    }

    finish(guess.encoding, sink)
}

/// Upgrade a legacy 2-byte Chinese choice to its documented superset.
fn finish(encoding: &'static Encoding, sink: &dyn EventSink) -> &'static Encoding {
    if encoding == GBK {
        sink.log("upgrading GBK to GB18030 for compatibility");
        GB18030
    } else {
        encoding
    }
}

/// Single-byte Western encodings that statistical detectors commonly
/// mistake legacy Chinese bytes for.
fn is_single_byte_western(encoding: &'static Encoding) -> bool {
    let name = encoding.name();
    name.starts_with("windows-125")
        || name.starts_with("ISO-8859")
        || matches!(name, "IBM866" | "KOI8-R" | "KOI8-U" | "macintosh" | "x-mac-cyrillic")
}
