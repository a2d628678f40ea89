//! XML text-node rewriting.
//!
//! The primary path streams a part with quick-xml, locates every `<w:t>`
//! text node, and splices converted text back in by byte range; all other
//! bytes of the part, including attributes, namespaces, and whitespace, are
//! carried over untouched. Structured parsing is correctness-preferred; the
//! regex fallback exists because malformed or unusually-namespaced parts
//! occur in the wild, and an imperfect rewrite of a footnote beats leaving
//! it unconverted.

use crate::common::{Error, EventSink, Result};
use crate::profile::{contains_cjk, ConversionProfile};
use once_cell::sync::Lazy;
use quick_xml::escape::{escape, unescape};
use quick_xml::events::Event;
use quick_xml::Reader;
use regex::{Captures, Regex};
use std::ops::Range;
use std::path::Path;

/// Declaration prepended to rewritten parts that lack one.
const XML_DECLARATION: &[u8] = b"<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\r\n";

/// Whether `qname` is the wordprocessing element with the given local name
/// (`w:` prefixed, or unprefixed in a default-namespace part).
pub(crate) fn is_w(qname: &[u8], local: &[u8]) -> bool {
    qname == local
        || (qname.len() == local.len() + 2 && qname.starts_with(b"w:") && &qname[2..] == local)
}

/// Apply non-overlapping byte-range edits to `src`.
pub(crate) fn splice(src: &[u8], mut edits: Vec<(Range<usize>, Vec<u8>)>) -> Vec<u8> {
    edits.sort_by_key(|(range, _)| range.start);
    let mut out = Vec::with_capacity(src.len() + 64);
    let mut last = 0;
    for (range, replacement) in edits {
        out.extend_from_slice(&src[last..range.start]);
        out.extend_from_slice(&replacement);
        last = range.end;
    }
    out.extend_from_slice(&src[last..]);
    out
}

/// Extract the visible text of a fragment: `<w:t>` content with tabs and
/// breaks rendered as `\t` and `\n`.
pub(crate) fn collect_text(xml: &[u8]) -> Result<String> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::with_capacity(512);
    let mut result = String::with_capacity(xml.len() / 8);
    let mut text_start: Option<usize> = None;
    let mut prev = 0usize;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let name = e.name();
                if is_w(name.as_ref(), b"t") {
                    text_start = Some(reader.buffer_position() as usize);
                } else if is_w(name.as_ref(), b"tab") {
                    result.push('\t');
                } else if is_w(name.as_ref(), b"br") || is_w(name.as_ref(), b"cr") {
                    result.push('\n');
                }
            }
            Ok(Event::Empty(ref e)) => {
                let name = e.name();
                if is_w(name.as_ref(), b"tab") {
                    result.push('\t');
                } else if is_w(name.as_ref(), b"br") || is_w(name.as_ref(), b"cr") {
                    result.push('\n');
                }
            }
            Ok(Event::End(ref e)) => {
                if is_w(e.name().as_ref(), b"t") {
                    if let Some(start) = text_start.take() {
                        let raw = std::str::from_utf8(&xml[start..prev])
                            .map_err(|e| Error::Xml(e.to_string()))?;
                        let text =
                            unescape(raw).map_err(|e| Error::Xml(e.to_string()))?;
                        result.push_str(&text);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(e.to_string())),
            _ => {}
        }
        prev = reader.buffer_position() as usize;
        buf.clear();
    }

    Ok(result)
}

/// Rewrite every `<w:t>` text node of `xml` through the profile.
///
/// Returns the rewritten bytes and the number of nodes whose text actually
/// changed. Nodes whose conversion is a no-op are left byte-identical.
pub fn convert_text_nodes(
    xml: &[u8],
    profile: ConversionProfile,
) -> Result<(Vec<u8>, usize)> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::with_capacity(1024);
    let mut edits: Vec<(Range<usize>, Vec<u8>)> = Vec::new();
    let mut text_start: Option<usize> = None;
    let mut prev = 0usize;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) if is_w(e.name().as_ref(), b"t") => {
                text_start = Some(reader.buffer_position() as usize);
            }
            Ok(Event::End(ref e)) if is_w(e.name().as_ref(), b"t") => {
                if let Some(start) = text_start.take() {
                    let raw = std::str::from_utf8(&xml[start..prev])
                        .map_err(|e| Error::Xml(e.to_string()))?;
                    // Nested markup (CDATA, comments) inside a text node is
                    // left alone; splicing plain text over it would corrupt
                    // the part.
                    if !raw.contains('<') {
                        let original =
                            unescape(raw).map_err(|e| Error::Xml(e.to_string()))?;
                        let converted = profile.convert(&original);
                        if converted != original {
                            edits.push((
                                start..prev,
                                escape(&converted).into_owned().into_bytes(),
                            ));
                        }
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(e.to_string())),
            _ => {}
        }
        prev = reader.buffer_position() as usize;
        buf.clear();
    }

    let changed = edits.len();
    Ok((splice(xml, edits), changed))
}

/// Structured rewrite of a whole part, guaranteeing an explicit encoding
/// declaration on the output.
pub fn rewrite_part_bytes(xml: &[u8], profile: ConversionProfile) -> Result<(Vec<u8>, usize)> {
    let (rewritten, changed) = convert_text_nodes(xml, profile)?;
    if rewritten.starts_with(b"<?xml") {
        Ok((rewritten, changed))
    } else {
        let mut declared = Vec::with_capacity(XML_DECLARATION.len() + rewritten.len());
        declared.extend_from_slice(XML_DECLARATION);
        declared.extend_from_slice(&rewritten);
        Ok((declared, changed))
    }
}

static TEXT_BETWEEN_TAGS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r">([^<]+)<").expect("literal pattern is valid"));

/// Delimiter-based fallback rewrite for parts that fail structured parsing.
///
/// Rewrites anything between a `>` and the next `<` that contains at least
/// one CJK character, which keeps whitespace-only and tag-adjacent noise
/// untouched. Best-effort only: in unusual encodings attribute values can
/// be confused with element text, so this path is reserved for parts the
/// XML parser rejected.
pub fn rewrite_part_lossy(content: &str, profile: ConversionProfile) -> String {
    TEXT_BETWEEN_TAGS
        .replace_all(content, |caps: &Captures<'_>| {
            let inner = &caps[1];
            if contains_cjk(inner) {
                format!(">{}<", profile.convert(inner))
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

/// Rewrite one part file in place, degrading from structured parsing to the
/// regex fallback.
///
/// An error is returned only when both paths fail; the caller logs it and
/// leaves the part unconverted rather than aborting the document.
pub fn rewrite_part_file(
    path: &Path,
    profile: ConversionProfile,
    sink: &dyn EventSink,
) -> Result<()> {
    let bytes = std::fs::read(path)?;
    match rewrite_part_bytes(&bytes, profile) {
        Ok((rewritten, changed)) => {
            std::fs::write(path, rewritten)?;
            sink.log(&format!(
                "rewrote {} text node(s) in {}",
                changed,
                path.display()
            ));
            Ok(())
        }
        Err(e) => {
            sink.log(&format!(
                "structured parse of {} failed ({e}), using pattern fallback",
                path.display()
            ));
            let content = String::from_utf8_lossy(&bytes);
            let rewritten = rewrite_part_lossy(&content, profile);
            std::fs::write(path, rewritten.as_bytes())?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PART: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:footnotes xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:footnote w:id="1"><w:p><w:r><w:t>豐收之年</w:t></w:r></w:p></w:footnote></w:footnotes>"#;

    #[test]
    fn converts_text_nodes_only() {
        let (out, changed) =
            convert_text_nodes(PART.as_bytes(), ConversionProfile::ToSimplified).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert_eq!(changed, 1);
        assert!(out.contains("<w:t>丰收之年</w:t>"));
        // Attributes and structure untouched.
        assert!(out.contains(r#"<w:footnote w:id="1">"#));
    }

    #[test]
    fn unchanged_part_is_byte_identical() {
        let xml = r#"<w:p xmlns:w="ns"><w:r><w:t>plain latin</w:t></w:r></w:p>"#;
        let (out, changed) =
            convert_text_nodes(xml.as_bytes(), ConversionProfile::ToSimplified).unwrap();
        assert_eq!(changed, 0);
        assert_eq!(out, xml.as_bytes());
    }

    #[test]
    fn escaped_entities_survive_rewrite() {
        let xml = r#"<w:p><w:r><w:t>豐 &amp; 收</w:t></w:r></w:p>"#;
        let (out, changed) =
            convert_text_nodes(xml.as_bytes(), ConversionProfile::ToSimplified).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert_eq!(changed, 1);
        assert!(out.contains("丰 &amp; 收"));
    }

    #[test]
    fn declaration_is_added_when_missing() {
        let xml = "<w:p><w:r><w:t>豐</w:t></w:r></w:p>";
        let (out, _) = rewrite_part_bytes(xml.as_bytes(), ConversionProfile::ToSimplified).unwrap();
        assert!(out.starts_with(b"<?xml"));
    }

    #[test]
    fn malformed_part_falls_back_to_pattern_rewrite() {
        let broken = "<w:p><w:r><w:t>豐收</w:unclosed></w:p>";
        assert!(convert_text_nodes(broken.as_bytes(), ConversionProfile::ToSimplified).is_err());
        let rewritten = rewrite_part_lossy(broken, ConversionProfile::ToSimplified);
        assert!(rewritten.contains("丰收"));
    }

    #[test]
    fn pattern_fallback_skips_non_cjk_fragments() {
        let content = "<a>latin</a><b>豐</b>";
        let rewritten = rewrite_part_lossy(content, ConversionProfile::ToSimplified);
        assert_eq!(rewritten, "<a>latin</a><b>丰</b>");
    }

    #[test]
    fn collect_text_renders_tabs_and_breaks() {
        let xml = r#"<w:r><w:t>一</w:t><w:tab/><w:t>二</w:t><w:br/><w:t>三</w:t></w:r>"#;
        assert_eq!(collect_text(xml.as_bytes()).unwrap(), "一\t二\n三");
    }

    #[test]
    fn collect_text_unescapes_entities() {
        let xml = r#"<w:r><w:t>a &lt; b &amp; c</w:t></w:r>"#;
        assert_eq!(collect_text(xml.as_bytes()).unwrap(), "a < b & c");
    }
}
