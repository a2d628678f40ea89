//! Paragraph and Run structures with run-preserving conversion.
//!
//! A run (`<w:r>`) is the smallest styled unit of text. Conversion must
//! change the text and nothing else: bold, italic, underline, color,
//! highlight, font name, and size all stay byte-identical, and the
//! East-Asian font sub-attribute is pinned to the run's font name so CJK
//! glyphs render in the intended face on platforms that would otherwise
//! substitute one.

use crate::common::{Error, EventSink, Result};
use crate::ooxml::docx::block::element_spans;
use crate::ooxml::rewrite::{collect_text, convert_text_nodes, is_w, splice};
use crate::profile::ConversionProfile;
use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// Formatting properties of a run.
///
/// `None` means the property is not set explicitly and inherits from the
/// paragraph or document style.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunProperties {
    /// Whether the run is bold
    pub bold: Option<bool>,
    /// Whether the run is italic
    pub italic: Option<bool>,
    /// Underline style (`w:u w:val`), "single" when unvalued
    pub underline: Option<String>,
    /// Explicit text color (`w:color w:val`)
    pub color: Option<String>,
    /// Highlight color (`w:highlight w:val`); absence is normal
    pub highlight: Option<String>,
    /// Font name (`w:rFonts w:ascii`, falling back to `w:hAnsi`)
    pub font_name: Option<String>,
    /// East-Asian font name (`w:rFonts w:eastAsia`)
    pub east_asia_font: Option<String>,
    /// Font size in half-points (`w:sz w:val`)
    pub font_size: Option<u32>,
}

/// A run within a paragraph, owning its `<w:r>` XML bytes.
#[derive(Debug, Clone)]
pub struct Run {
    xml: Vec<u8>,
}

impl Run {
    /// Create a new Run from XML bytes.
    pub fn new(xml: Vec<u8>) -> Self {
        Self { xml }
    }

    /// The run's raw XML.
    #[inline]
    pub fn xml_bytes(&self) -> &[u8] {
        &self.xml
    }

    /// Consume the run, returning its XML.
    #[inline]
    pub fn into_xml(self) -> Vec<u8> {
        self.xml
    }

    /// Get the text content of this run.
    ///
    /// `<w:tab/>` renders as a tab and `<w:br/>`/`<w:cr/>` as a newline.
    pub fn text(&self) -> Result<String> {
        collect_text(&self.xml)
    }

    /// Extract all formatting properties in a single pass.
    pub fn properties(&self) -> Result<RunProperties> {
        let mut reader = Reader::from_reader(&self.xml[..]);
        let mut props = RunProperties::default();
        let mut in_r_pr = false;
        let mut buf = Vec::with_capacity(512);

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                    let name = e.local_name();
                    if name.as_ref() == b"rPr" {
                        in_r_pr = true;
                    } else if in_r_pr {
                        match name.as_ref() {
                            b"b" => props.bold = Some(bool_attr(e)),
                            b"i" => props.italic = Some(bool_attr(e)),
                            b"u" => {
                                props.underline =
                                    Some(val_attr(e).unwrap_or_else(|| "single".to_string()));
                            }
                            b"color" => props.color = val_attr(e),
                            b"highlight" => props.highlight = val_attr(e),
                            b"sz" => props.font_size = val_attr(e).and_then(|v| v.parse().ok()),
                            b"rFonts" => {
                                let mut ascii = None;
                                let mut h_ansi = None;
                                for attr in e.attributes().flatten() {
                                    let value = attr.unescape_value().ok();
                                    match attr.key.local_name().as_ref() {
                                        b"ascii" => ascii = value.map(|v| v.into_owned()),
                                        b"hAnsi" => h_ansi = value.map(|v| v.into_owned()),
                                        b"eastAsia" => {
                                            props.east_asia_font = value.map(|v| v.into_owned());
                                        }
                                        _ => {}
                                    }
                                }
                                props.font_name = ascii.or(h_ansi);
                            }
                            _ => {}
                        }
                    }
                }
                Ok(Event::End(ref e)) => {
                    if e.local_name().as_ref() == b"rPr" {
                        // Properties live only in the leading rPr block.
                        return Ok(props);
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(Error::Xml(e.to_string())),
                _ => {}
            }
            buf.clear();
        }

        Ok(props)
    }

    /// Convert this run's text, preserving every style attribute.
    ///
    /// Runs whose trimmed text is empty are skipped. For the rest, the
    /// formatting snapshot is taken up front, text is spliced into the
    /// `<w:t>` nodes (leaving all other bytes of the run untouched), and,
    /// when the run carries an explicit font name, the East-Asian font
    /// sub-attribute is forced to that name, creating `<w:rFonts>` if
    /// needed. A failure in that last step is logged and does not undo the
    /// text change.
    ///
    /// Returns whether the run's XML changed.
    pub fn convert(
        &mut self,
        profile: ConversionProfile,
        sink: &dyn EventSink,
    ) -> Result<bool> {
        let text = self.text()?;
        if text.trim().is_empty() {
            return Ok(false);
        }

        let snapshot = self.properties()?;
        let (rewritten, changed_nodes) = convert_text_nodes(&self.xml, profile)?;
        self.xml = rewritten;

        let mut pinned = false;
        if let Some(font) = snapshot.font_name.as_deref() {
            match self.pin_east_asian_font(font) {
                Ok(did_pin) => pinned = did_pin,
                Err(e) => {
                    sink.log(&format!("could not pin East Asian font {font:?}: {e}"));
                }
            }
        }

        Ok(changed_nodes > 0 || pinned)
    }

    /// Force `w:rFonts/@w:eastAsia` to `font` inside the run's `rPr`.
    ///
    /// Returns whether the XML was modified. A run without an `rPr` block
    /// has no explicit font, so there is nothing to pin.
    fn pin_east_asian_font(&mut self, font: &str) -> Result<bool> {
        let mut reader = Reader::from_reader(&self.xml[..]);
        let mut buf = Vec::with_capacity(512);
        let mut prev = 0usize;
        let mut in_r_pr = false;
        let mut r_pr_content_start = 0usize;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) if is_w(e.name().as_ref(), b"rPr") && !in_r_pr => {
                    in_r_pr = true;
                    r_pr_content_start = reader.buffer_position() as usize;
                }
                Ok(Event::Empty(ref e)) if is_w(e.name().as_ref(), b"rPr") && !in_r_pr => {
                    let replacement = format!(
                        "<w:rPr><w:rFonts w:eastAsia=\"{}\"/></w:rPr>",
                        escape(font)
                    );
                    let end = reader.buffer_position() as usize;
                    self.xml = splice(&self.xml, vec![(prev..end, replacement.into_bytes())]);
                    return Ok(true);
                }
                Ok(Event::Start(ref e)) if in_r_pr && is_w(e.name().as_ref(), b"rFonts") => {
                    if east_asia_matches(e, font) {
                        return Ok(false);
                    }
                    let end = reader.buffer_position() as usize;
                    let tag = rebuild_r_fonts(e, font, false);
                    self.xml = splice(&self.xml, vec![(prev..end, tag)]);
                    return Ok(true);
                }
                Ok(Event::Empty(ref e)) if in_r_pr && is_w(e.name().as_ref(), b"rFonts") => {
                    if east_asia_matches(e, font) {
                        return Ok(false);
                    }
                    let end = reader.buffer_position() as usize;
                    let tag = rebuild_r_fonts(e, font, true);
                    self.xml = splice(&self.xml, vec![(prev..end, tag)]);
                    return Ok(true);
                }
                Ok(Event::End(ref e)) if in_r_pr && is_w(e.name().as_ref(), b"rPr") => {
                    let insert = format!("<w:rFonts w:eastAsia=\"{}\"/>", escape(font));
                    self.xml = splice(
                        &self.xml,
                        vec![(r_pr_content_start..r_pr_content_start, insert.into_bytes())],
                    );
                    return Ok(true);
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(Error::Xml(e.to_string())),
                _ => {}
            }
            prev = reader.buffer_position() as usize;
            buf.clear();
        }

        Ok(false)
    }
}

/// Whether the element already carries `w:eastAsia` equal to `font`.
fn east_asia_matches(e: &BytesStart<'_>, font: &str) -> bool {
    e.attributes().flatten().any(|attr| {
        attr.key.local_name().as_ref() == b"eastAsia"
            && attr.unescape_value().map(|v| v == font).unwrap_or(false)
    })
}

/// Rebuild an `<w:rFonts>` tag with `w:eastAsia` set to `font`, keeping
/// every other attribute verbatim.
fn rebuild_r_fonts(e: &BytesStart<'_>, font: &str, self_closing: bool) -> Vec<u8> {
    let mut tag = Vec::with_capacity(64);
    tag.extend_from_slice(b"<w:rFonts");
    for attr in e.attributes().flatten() {
        if attr.key.local_name().as_ref() == b"eastAsia" {
            continue;
        }
        tag.push(b' ');
        tag.extend_from_slice(attr.key.as_ref());
        tag.extend_from_slice(b"=\"");
        tag.extend_from_slice(&attr.value);
        tag.push(b'"');
    }
    tag.extend_from_slice(b" w:eastAsia=\"");
    tag.extend_from_slice(escape(font).as_bytes());
    tag.extend_from_slice(b"\"");
    tag.extend_from_slice(if self_closing { b"/>" } else { b">" });
    tag
}

fn bool_attr(e: &BytesStart<'_>) -> bool {
    for attr in e.attributes().flatten() {
        if attr.key.local_name().as_ref() == b"val" {
            let value = attr.value.as_ref();
            return value == b"true" || value == b"1";
        }
    }
    // Element present without a val attribute means enabled.
    true
}

fn val_attr(e: &BytesStart<'_>) -> Option<String> {
    for attr in e.attributes().flatten() {
        if attr.key.local_name().as_ref() == b"val" {
            return attr.unescape_value().ok().map(|v| v.into_owned());
        }
    }
    None
}

/// A paragraph in a Word document, owning its `<w:p>` XML bytes.
#[derive(Debug, Clone)]
pub struct Paragraph {
    xml: Vec<u8>,
}

impl Paragraph {
    /// Create a new Paragraph from XML bytes.
    pub fn new(xml: Vec<u8>) -> Self {
        Self { xml }
    }

    /// The paragraph's raw XML.
    #[inline]
    pub fn xml_bytes(&self) -> &[u8] {
        &self.xml
    }

    /// Consume the paragraph, returning its XML.
    #[inline]
    pub fn into_xml(self) -> Vec<u8> {
        self.xml
    }

    /// Concatenated text of all runs in the paragraph.
    pub fn text(&self) -> Result<String> {
        collect_text(&self.xml)
    }

    /// Convert every non-empty run in this paragraph.
    ///
    /// Paragraphs whose trimmed text is empty are pure formatting anchors;
    /// converting them is a no-op and skipping avoids touching their
    /// styling data at all.
    pub fn convert(
        &mut self,
        profile: ConversionProfile,
        sink: &dyn EventSink,
    ) -> Result<bool> {
        if self.text()?.trim().is_empty() {
            return Ok(false);
        }

        let spans = element_spans(&self.xml, &[b"r"])?;
        let mut edits = Vec::new();
        for span in &spans {
            let mut run = Run::new(self.xml[span.range()].to_vec());
            if run.convert(profile, sink)? {
                edits.push((span.range(), run.into_xml()));
            }
        }

        if edits.is_empty() {
            return Ok(false);
        }
        self.xml = splice(&self.xml, edits);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::NullSink;

    const STYLED_RUN: &str = concat!(
        r#"<w:r><w:rPr><w:rFonts w:ascii="Times New Roman" w:hAnsi="Times New Roman"/>"#,
        r#"<w:b/><w:i w:val="0"/><w:u w:val="double"/><w:color w:val="FF0000"/>"#,
        r#"<w:highlight w:val="yellow"/><w:sz w:val="28"/></w:rPr>"#,
        r#"<w:t>豐收</w:t></w:r>"#
    );

    #[test]
    fn properties_snapshot_reads_every_attribute() {
        let run = Run::new(STYLED_RUN.as_bytes().to_vec());
        let props = run.properties().unwrap();
        assert_eq!(props.bold, Some(true));
        assert_eq!(props.italic, Some(false));
        assert_eq!(props.underline.as_deref(), Some("double"));
        assert_eq!(props.color.as_deref(), Some("FF0000"));
        assert_eq!(props.highlight.as_deref(), Some("yellow"));
        assert_eq!(props.font_name.as_deref(), Some("Times New Roman"));
        assert_eq!(props.east_asia_font, None);
        assert_eq!(props.font_size, Some(28));
    }

    #[test]
    fn conversion_preserves_styles_and_pins_east_asian_font() {
        let mut run = Run::new(STYLED_RUN.as_bytes().to_vec());
        let before = run.properties().unwrap();
        assert!(run.convert(ConversionProfile::ToSimplified, &NullSink).unwrap());

        assert_eq!(run.text().unwrap(), "丰收");
        let after = run.properties().unwrap();
        assert_eq!(after.bold, before.bold);
        assert_eq!(after.italic, before.italic);
        assert_eq!(after.underline, before.underline);
        assert_eq!(after.color, before.color);
        assert_eq!(after.highlight, before.highlight);
        assert_eq!(after.font_name, before.font_name);
        assert_eq!(after.font_size, before.font_size);
        assert_eq!(after.east_asia_font.as_deref(), Some("Times New Roman"));
    }

    #[test]
    fn run_without_font_name_is_not_pinned() {
        let xml = r#"<w:r><w:rPr><w:b/></w:rPr><w:t>豐</w:t></w:r>"#;
        let mut run = Run::new(xml.as_bytes().to_vec());
        assert!(run.convert(ConversionProfile::ToSimplified, &NullSink).unwrap());
        assert_eq!(run.text().unwrap(), "丰");
        assert!(!run.xml_bytes().windows(6).any(|w| w == b"rFonts"));
    }

    #[test]
    fn rfonts_without_east_asia_gains_the_attribute() {
        let xml = r#"<w:r><w:rPr><w:rFonts w:ascii="SimSun"/></w:rPr><w:t>字</w:t></w:r>"#;
        let mut run = Run::new(xml.as_bytes().to_vec());
        // Text is unchanged under this profile, but the pin still applies.
        run.convert(ConversionProfile::ToSimplified, &NullSink).unwrap();
        let props = run.properties().unwrap();
        assert_eq!(props.east_asia_font.as_deref(), Some("SimSun"));
        assert_eq!(props.font_name.as_deref(), Some("SimSun"));
    }

    #[test]
    fn existing_east_asia_font_is_overwritten_to_font_name() {
        let xml = concat!(
            r#"<w:r><w:rPr><w:rFonts w:ascii="Arial" w:eastAsia="SimHei"/></w:rPr>"#,
            r#"<w:t>豐年</w:t></w:r>"#
        );
        let mut run = Run::new(xml.as_bytes().to_vec());
        assert!(run.convert(ConversionProfile::ToSimplified, &NullSink).unwrap());
        let props = run.properties().unwrap();
        assert_eq!(props.east_asia_font.as_deref(), Some("Arial"));
    }

    #[test]
    fn whitespace_only_run_is_skipped() {
        let xml = r#"<w:r><w:rPr><w:b/></w:rPr><w:t> </w:t></w:r>"#;
        let mut run = Run::new(xml.as_bytes().to_vec());
        assert!(!run.convert(ConversionProfile::ToSimplified, &NullSink).unwrap());
        assert_eq!(run.xml_bytes(), xml.as_bytes());
    }

    #[test]
    fn empty_paragraph_is_left_untouched() {
        let xml = r#"<w:p><w:pPr><w:jc w:val="center"/></w:pPr></w:p>"#;
        let mut para = Paragraph::new(xml.as_bytes().to_vec());
        assert!(!para.convert(ConversionProfile::ToSimplified, &NullSink).unwrap());
        assert_eq!(para.xml_bytes(), xml.as_bytes());
    }

    #[test]
    fn paragraph_converts_each_run_independently() {
        let xml = concat!(
            r#"<w:p><w:r><w:rPr><w:b/></w:rPr><w:t>豐年</w:t></w:r>"#,
            r#"<w:r><w:t>latin</w:t></w:r>"#,
            r#"<w:r><w:t>萬物</w:t></w:r></w:p>"#
        );
        let mut para = Paragraph::new(xml.as_bytes().to_vec());
        assert!(para.convert(ConversionProfile::ToSimplified, &NullSink).unwrap());
        assert_eq!(para.text().unwrap(), "丰年latin万物");
        // The untouched middle run is byte-identical.
        assert!(para
            .xml_bytes()
            .windows(20)
            .any(|w| w == b"<w:r><w:t>latin</w:t"));
    }

    #[test]
    fn hyperlink_runs_are_converted() {
        let xml = concat!(
            r#"<w:p><w:hyperlink r:id="rId4"><w:r><w:t>豐</w:t></w:r></w:hyperlink></w:p>"#
        );
        let mut para = Paragraph::new(xml.as_bytes().to_vec());
        assert!(para.convert(ConversionProfile::ToSimplified, &NullSink).unwrap());
        assert_eq!(para.text().unwrap(), "丰");
        assert!(para.xml_bytes().windows(11).any(|w| w == b"r:id=\"rId4\""));
    }
}
