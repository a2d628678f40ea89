//! Byte-range location of structural elements inside a part.
//!
//! Containers are never re-serialized wholesale. Instead the topmost
//! occurrences of the wanted elements (`w:p`, `w:tbl`, `w:r`, `w:tc`) are
//! located as byte spans of the original XML, converted segments are
//! spliced back in, and every byte in between passes through verbatim.

use crate::common::{Error, Result};
use crate::ooxml::rewrite::is_w;
use quick_xml::events::Event;
use quick_xml::Reader;
use smallvec::SmallVec;
use std::ops::Range;

/// A located element: which of the requested names matched, and where.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ElementSpan {
    /// Index into the `names` slice passed to [`element_spans`].
    pub name_idx: usize,
    start: usize,
    end: usize,
}

impl ElementSpan {
    /// Byte range of the whole element, start tag through end tag.
    #[inline]
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Locate the topmost occurrences of the named wordprocessing elements.
///
/// "Topmost" means not nested inside another captured element: a `w:p`
/// inside a captured `w:tbl` belongs to the table's span, while the
/// table's own span is returned here. Spans come back in document order
/// and never overlap.
pub(crate) fn element_spans(
    xml: &[u8],
    names: &[&[u8]],
) -> Result<SmallVec<[ElementSpan; 8]>> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::with_capacity(1024);
    let mut spans = SmallVec::new();
    let mut prev = 0usize;
    let mut depth = 0isize;
    // (name index, span start, depth to close at)
    let mut capture: Option<(usize, usize, isize)> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                depth += 1;
                if capture.is_none() {
                    if let Some(idx) = match_name(e.name().as_ref(), names) {
                        capture = Some((idx, prev, depth - 1));
                    }
                }
            }
            Ok(Event::End(_)) => {
                depth -= 1;
                if let Some((name_idx, start, close_depth)) = capture {
                    if depth == close_depth {
                        spans.push(ElementSpan {
                            name_idx,
                            start,
                            end: reader.buffer_position() as usize,
                        });
                        capture = None;
                    }
                }
            }
            Ok(Event::Empty(ref e)) => {
                if capture.is_none() {
                    if let Some(idx) = match_name(e.name().as_ref(), names) {
                        spans.push(ElementSpan {
                            name_idx: idx,
                            start: prev,
                            end: reader.buffer_position() as usize,
                        });
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

    Ok(spans)
}

fn match_name(qname: &[u8], names: &[&[u8]]) -> Option<usize> {
    names.iter().position(|local| is_w(qname, local))
}
