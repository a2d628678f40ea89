//! Plain-text conversion pipeline.
//!
//! Ties the encoding detector, the safe decoder, and a conversion profile
//! together for `.txt` inputs. Output is always UTF-8 regardless of the
//! source encoding.

use crate::common::{Error, EventSink, Result};
use crate::encoding;
use crate::job::OUTPUT_PREFIX;
use crate::profile::ConversionProfile;
use std::path::{Path, PathBuf};

/// Convert a plain-text file and write the result under `output_dir`.
///
/// The output file keeps the input's name with the `convert_` marker
/// prefixed, and is written as UTF-8. A decode that yields an empty string
/// for a non-empty file is the pipeline's only failure signal; it is logged
/// and reported as [`Error::DecodeFailed`] so a batch caller can skip the
/// item and continue.
pub fn convert_text_file(
    input: &Path,
    output_dir: &Path,
    profile: ConversionProfile,
    sink: &dyn EventSink,
) -> Result<PathBuf> {
    let file_name = input
        .file_name()
        .ok_or_else(|| Error::InputNotFound(input.display().to_string()))?;
    sink.log(&format!(
        "processing text file: {}",
        file_name.to_string_lossy()
    ));

    let bytes = std::fs::read(input)?;
    let detected = encoding::detect_encoding(&bytes, sink);
    sink.log(&format!("decoding as {}", detected.name()));

    let content = encoding::decode_bytes(&bytes, detected, sink);
    if content.is_empty() && !bytes.is_empty() {
        sink.log(&format!(
            "every decode fallback failed for {}",
            input.display()
        ));
        return Err(Error::DecodeFailed(input.display().to_string()));
    }

    let converted = profile.convert(&content);

    std::fs::create_dir_all(output_dir)?;
    let output = output_dir.join(format!(
        "{OUTPUT_PREFIX}{}",
        file_name.to_string_lossy()
    ));
    std::fs::write(&output, converted)?;
    sink.log(&format!("saved: {}", output.display()));
    Ok(output)
}
