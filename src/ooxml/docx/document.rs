//! The run-preserving document converter.
//!
//! Walks the main document part and every header/footer part, converting
//! text containers in a fixed order: paragraphs before tables within each
//! container, the body before section headers, headers before footers.
//! Formatting is preserved by construction: only located paragraph and
//! table spans are replaced, everything else in a part passes through
//! byte-identical.

use crate::common::{Error, EventSink, Result};
use crate::ooxml::docx::block::element_spans;
use crate::ooxml::docx::package::Package;
use crate::ooxml::docx::paragraph::Paragraph;
use crate::ooxml::docx::table::Table;
use crate::ooxml::rewrite::splice;
use crate::ooxml::DOCUMENT_PART;
use crate::profile::ConversionProfile;

/// Convert a container's topmost paragraphs, then its topmost tables.
///
/// A container is any fragment whose children can be `w:p` and `w:tbl`:
/// the document body, a header or footer part, or a single table cell.
/// Returns the rewritten bytes and whether anything changed.
pub fn convert_container(
    xml: &[u8],
    profile: ConversionProfile,
    sink: &dyn EventSink,
) -> Result<(Vec<u8>, bool)> {
    let spans = element_spans(xml, &[b"p", b"tbl"])?;
    let mut edits = Vec::new();

    for span in spans.iter().filter(|s| s.name_idx == 0) {
        let mut paragraph = Paragraph::new(xml[span.range()].to_vec());
        if paragraph.convert(profile, sink)? {
            edits.push((span.range(), paragraph.into_xml()));
        }
    }
    for span in spans.iter().filter(|s| s.name_idx == 1) {
        let mut table = Table::new(xml[span.range()].to_vec());
        if table.convert(profile, sink)? {
            edits.push((span.range(), table.into_xml()));
        }
    }

    let changed = !edits.is_empty();
    Ok((splice(xml, edits), changed))
}

/// Convert the whole document tree of a package in place.
///
/// The main document part is converted first; a structural failure there
/// is the body-stage failure the orchestrator degrades on, so it
/// propagates. Header and footer parts are each converted independently;
/// a malformed one is logged and left unconverted rather than aborting
/// the rest of the document.
pub fn convert_package(
    package: &mut Package,
    profile: ConversionProfile,
    sink: &dyn EventSink,
) -> Result<()> {
    let (converted, changed) = {
        let body = package
            .part(DOCUMENT_PART)
            .ok_or_else(|| Error::PartNotFound(DOCUMENT_PART.to_string()))?;
        convert_container(body, profile, sink)?
    };
    if changed {
        package.set_part(DOCUMENT_PART, converted);
        sink.log("converted document body");
    }

    let mut headers: Vec<String> = package
        .part_names()
        .filter(|name| is_header_part(name))
        .map(String::from)
        .collect();
    headers.sort();
    let mut footers: Vec<String> = package
        .part_names()
        .filter(|name| is_footer_part(name))
        .map(String::from)
        .collect();
    footers.sort();

    for name in headers.into_iter().chain(footers) {
        let outcome = {
            let Some(part) = package.part(&name) else {
                continue;
            };
            convert_container(part, profile, sink)
        };
        match outcome {
            Ok((converted, changed)) => {
                if changed {
                    package.set_part(&name, converted);
                    sink.log(&format!("converted {name}"));
                }
            }
            Err(e) => sink.log(&format!("{name} left unconverted: {e}")),
        }
    }

    Ok(())
}

fn is_header_part(name: &str) -> bool {
    name.starts_with("word/header") && name.ends_with(".xml")
}

fn is_footer_part(name: &str) -> bool {
    name.starts_with("word/footer") && name.ends_with(".xml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{MemorySink, NullSink};
    use crate::ooxml::rewrite::collect_text;

    #[test]
    fn body_paragraphs_then_tables() {
        let xml = concat!(
            r#"<w:document><w:body>"#,
            r#"<w:p><w:r><w:t>正文豐收</w:t></w:r></w:p>"#,
            r#"<w:tbl><w:tr><w:tc><w:p><w:r><w:t>表格萬</w:t></w:r></w:p></w:tc></w:tr></w:tbl>"#,
            r#"<w:sectPr><w:pgSz w:w="11906"/></w:sectPr>"#,
            r#"</w:body></w:document>"#
        );
        let (out, changed) =
            convert_container(xml.as_bytes(), ConversionProfile::ToSimplified, &NullSink).unwrap();
        assert!(changed);
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("正文丰收"));
        assert!(out.contains("表格万"));
        assert!(out.contains(r#"<w:sectPr><w:pgSz w:w="11906"/></w:sectPr>"#));
    }

    #[test]
    fn unchanged_container_is_byte_identical() {
        let xml = r#"<w:hdr><w:p><w:r><w:t>plain</w:t></w:r></w:p></w:hdr>"#;
        let (out, changed) =
            convert_container(xml.as_bytes(), ConversionProfile::ToSimplified, &NullSink).unwrap();
        assert!(!changed);
        assert_eq!(out, xml.as_bytes());
    }

    #[test]
    fn malformed_header_is_skipped_but_body_converts() {
        use std::io::Write;
        use zip::write::SimpleFileOptions;
        use zip::ZipWriter;

        let mut writer = ZipWriter::new(std::io::Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        writer
            .start_file("word/document.xml", options)
            .unwrap();
        writer
            .write_all(
                concat!(
                    r#"<w:document><w:body><w:p><w:r><w:t>豐</w:t></w:r></w:p>"#,
                    r#"</w:body></w:document>"#
                )
                .as_bytes(),
            )
            .unwrap();
        writer.start_file("word/header1.xml", options).unwrap();
        writer.write_all(b"<w:hdr><w:p></w:hdr>").unwrap();
        let bytes = writer.finish().unwrap().into_inner();

        let mut package = Package::from_bytes(bytes).unwrap();
        let sink = MemorySink::new();
        convert_package(&mut package, ConversionProfile::ToSimplified, &sink).unwrap();

        let body = package.part(DOCUMENT_PART).unwrap();
        assert_eq!(collect_text(body).unwrap(), "丰");
        assert!(sink.contains("word/header1.xml left unconverted"));
    }
}
