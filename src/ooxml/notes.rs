//! Footnote and endnote conversion.
//!
//! The document object view does not expose footnotes and endnotes
//! uniformly with the body, so they are converted at the package level:
//! extract the archive, rewrite the well-known note parts, repack. A
//! missing part is normal (most documents have no endnotes) and is logged
//! and skipped, never treated as an error.

use crate::common::{EventSink, Result};
use crate::ooxml::{archive, rewrite, ENDNOTES_PART, FOOTNOTES_PART};
use crate::profile::ConversionProfile;
use std::path::Path;

/// Convert the footnote and endnote parts of the package at `input`,
/// writing the resulting package to `output`.
///
/// Returns `true` on success. On failure the error is logged and `false`
/// is returned so the caller can continue with unconverted notes: a
/// degraded conversion, not a fatal one.
pub fn convert_notes(
    input: &Path,
    output: &Path,
    profile: ConversionProfile,
    sink: &dyn EventSink,
) -> bool {
    match convert_notes_inner(input, output, profile, sink) {
        Ok(()) => true,
        Err(e) => {
            sink.log(&format!(
                "footnote/endnote conversion failed for {}: {e}",
                input.display()
            ));
            false
        }
    }
}

fn convert_notes_inner(
    input: &Path,
    output: &Path,
    profile: ConversionProfile,
    sink: &dyn EventSink,
) -> Result<()> {
    let scratch = archive::extract_package(input)?;

    for (part, label) in [(FOOTNOTES_PART, "footnotes"), (ENDNOTES_PART, "endnotes")] {
        let part_path = scratch.path().join(part);
        if !part_path.exists() {
            sink.log(&format!("document has no {label}"));
            continue;
        }
        match rewrite::rewrite_part_file(&part_path, profile, sink) {
            Ok(()) => sink.log(&format!("converted {label}")),
            // Leaving one note part unconverted beats losing the document.
            Err(e) => sink.log(&format!("{label} left unconverted: {e}")),
        }
    }

    archive::repack_directory(scratch.path(), output)?;
    Ok(())
}
