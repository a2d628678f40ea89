//! Table conversion.
//!
//! A table is traversed row-major: its topmost `w:tc` cells come back from
//! the span finder in document order, and each cell's content is a
//! container of paragraphs and, possibly, further tables. The recursion
//! bottoms out because the structure is a tree with ownership by
//! containment, so nesting depth is unbounded but finite.

use crate::common::{EventSink, Result};
use crate::ooxml::docx::block::element_spans;
use crate::ooxml::docx::document::convert_container;
use crate::ooxml::rewrite::splice;
use crate::profile::ConversionProfile;

/// A table in a Word document, owning its `<w:tbl>` XML bytes.
#[derive(Debug, Clone)]
pub struct Table {
    xml: Vec<u8>,
}

impl Table {
    /// Create a new Table from XML bytes.
    pub fn new(xml: Vec<u8>) -> Self {
        Self { xml }
    }

    /// The table's raw XML.
    #[inline]
    pub fn xml_bytes(&self) -> &[u8] {
        &self.xml
    }

    /// Consume the table, returning its XML.
    #[inline]
    pub fn into_xml(self) -> Vec<u8> {
        self.xml
    }

    /// Convert every cell of this table, recursing into nested tables.
    ///
    /// Returns whether any cell changed.
    pub fn convert(
        &mut self,
        profile: ConversionProfile,
        sink: &dyn EventSink,
    ) -> Result<bool> {
        // Topmost cells only: cells of a nested table are inside one of
        // these spans and are handled by the recursive container pass.
        let cells = element_spans(&self.xml, &[b"tc"])?;
        let mut edits = Vec::new();
        for cell in &cells {
            let (converted, changed) =
                convert_container(&self.xml[cell.range()], profile, sink)?;
            if changed {
                edits.push((cell.range(), converted));
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
    use crate::ooxml::rewrite::collect_text;

    #[test]
    fn converts_every_cell() {
        let xml = concat!(
            r#"<w:tbl><w:tr>"#,
            r#"<w:tc><w:p><w:r><w:t>豐收</w:t></w:r></w:p></w:tc>"#,
            r#"<w:tc><w:p><w:r><w:t>萬歲</w:t></w:r></w:p></w:tc>"#,
            r#"</w:tr></w:tbl>"#
        );
        let mut table = Table::new(xml.as_bytes().to_vec());
        assert!(table.convert(ConversionProfile::ToSimplified, &NullSink).unwrap());
        let text = collect_text(table.xml_bytes()).unwrap();
        assert_eq!(text, "丰收万岁");
    }

    #[test]
    fn nested_table_leaves_are_converted() {
        let xml = concat!(
            r#"<w:tbl><w:tr><w:tc>"#,
            r#"<w:p><w:r><w:t>外層豐</w:t></w:r></w:p>"#,
            r#"<w:tbl><w:tr><w:tc>"#,
            r#"<w:tbl><w:tr><w:tc><w:p><w:r><w:t>最深萬</w:t></w:r></w:p></w:tc></w:tr></w:tbl>"#,
            r#"</w:tc></w:tr></w:tbl>"#,
            r#"</w:tc></w:tr></w:tbl>"#
        );
        let mut table = Table::new(xml.as_bytes().to_vec());
        assert!(table.convert(ConversionProfile::ToSimplified, &NullSink).unwrap());
        let text = collect_text(table.xml_bytes()).unwrap();
        assert!(text.contains("外层丰"));
        assert!(text.contains("最深万"));
    }

    #[test]
    fn table_properties_are_untouched() {
        let xml = concat!(
            r#"<w:tbl><w:tblPr><w:tblW w:w="5000" w:type="pct"/></w:tblPr>"#,
            r#"<w:tr><w:tc><w:p><w:r><w:t>豐</w:t></w:r></w:p></w:tc></w:tr></w:tbl>"#
        );
        let mut table = Table::new(xml.as_bytes().to_vec());
        assert!(table.convert(ConversionProfile::ToSimplified, &NullSink).unwrap());
        let out = String::from_utf8(table.into_xml()).unwrap();
        assert!(out.contains(r#"<w:tblPr><w:tblW w:w="5000" w:type="pct"/></w:tblPr>"#));
    }
}
