//! Conversion jobs: the per-document orchestrator, folder batch mode, and
//! the legacy-format bridge seam.
//!
//! One [`Engine`] serves both headless and interactive callers; everything
//! a front-end needs flows out through the [`EventSink`] passed to each
//! call. A job owns its own temporary package and scratch directories, so
//! concurrent jobs on different inputs are safe by construction.

use crate::common::{Error, EventSink, Result};
use crate::ooxml::docx::{self, Package};
use crate::ooxml::notes;
use crate::profile::ConversionProfile;
use crate::text;
use std::path::{Path, PathBuf};

/// Marker prefixed to every output file name.
pub const OUTPUT_PREFIX: &str = "convert_";

/// Extensions the engine accepts, lower-case.
const SUPPORTED_EXTENSIONS: [&str; 3] = ["docx", "doc", "txt"];

/// Terminal state of a document conversion.
///
/// Both flags set means a full conversion; anything else is a degraded
/// outcome that was logged on the way out. Even a fully degraded job still
/// produced an output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocxOutcome {
    /// Footnote/endnote parts were converted.
    pub footnotes_converted: bool,
    /// The document body (with headers and footers) was converted.
    pub body_converted: bool,
}

impl DocxOutcome {
    /// Whether any stage fell back to a lesser result.
    pub fn is_degraded(&self) -> bool {
        !(self.footnotes_converted && self.body_converted)
    }
}

/// Aggregate result of a batch conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    /// Items that produced a converted output.
    pub succeeded: usize,
    /// Items attempted.
    pub total: usize,
}

/// External bridge that migrates a legacy binary document to a package.
///
/// The conversion itself is a black box (typically a native word-processor
/// automation call). `scratch` is a directory owned by the engine for the
/// duration of the item; the bridge writes the converted package there and
/// returns its path.
pub trait LegacyBridge {
    /// Convert `input` to a package-format document under `scratch`.
    fn convert_to_package(&self, input: &Path, scratch: &Path) -> Result<PathBuf>;
}

/// Removes a temporary file on drop, on every exit path.
struct TempFileGuard {
    path: PathBuf,
}

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        if self.path.exists() {
            let _ = std::fs::remove_file(&self.path);
        }
    }
}

/// Convert one package-format document.
///
/// State machine: footnotes first (into a sibling temporary package), then
/// the body of whichever package the footnote stage produced, then save.
/// Failures degrade instead of aborting:
/// - footnote failure: body conversion proceeds on the original input;
/// - body failure after converted footnotes: the temporary package is
///   copied to the output (footnotes converted, body untouched);
/// - body failure with no temporary package: the original input is copied,
///   so the operation still yields a file.
///
/// The temporary package is deleted on every path. An input that cannot be
/// opened as a package at all is an input error and aborts the item.
pub fn convert_docx_file(
    input: &Path,
    output: &Path,
    profile: ConversionProfile,
    sink: &dyn EventSink,
) -> Result<DocxOutcome> {
    sink.log(&format!(
        "converting document: {} ({})",
        input.display(),
        profile.name()
    ));

    // Validate up front: a file that is not a readable package is an input
    // error for this item, not a degraded conversion.
    let mut original = Some(Package::open(input)?);

    let temp_path = temp_package_path(output);
    let _guard = TempFileGuard {
        path: temp_path.clone(),
    };

    let footnotes_converted = notes::convert_notes(input, &temp_path, profile, sink);
    if !footnotes_converted {
        sink.log("footnote conversion failed, converting body only");
    }

    let body_result = (|| -> Result<()> {
        let mut package = if footnotes_converted {
            Package::open(&temp_path)?
        } else {
            match original.take() {
                Some(package) => package,
                None => Package::open(input)?,
            }
        };
        docx::convert_package(&mut package, profile, sink)?;
        package.save(output)?;
        Ok(())
    })();

    match body_result {
        Ok(()) => {
            sink.log(&format!("saved: {}", output.display()));
            Ok(DocxOutcome {
                footnotes_converted,
                body_converted: true,
            })
        }
        Err(e) => {
            sink.log(&format!("body conversion failed: {e}"));
            if footnotes_converted && temp_path.exists() {
                std::fs::copy(&temp_path, output)?;
                sink.log(&format!(
                    "saved partially converted document (footnotes only): {}",
                    output.display()
                ));
                Ok(DocxOutcome {
                    footnotes_converted: true,
                    body_converted: false,
                })
            } else {
                std::fs::copy(input, output)?;
                sink.log(&format!(
                    "conversion failed, copied original to: {}",
                    output.display()
                ));
                Ok(DocxOutcome {
                    footnotes_converted: false,
                    body_converted: false,
                })
            }
        }
    }
}

fn temp_package_path(output: &Path) -> PathBuf {
    let name = output
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output.docx".to_string());
    output.with_file_name(format!("{name}.tmp"))
}

/// The shared conversion engine.
///
/// Holds the profile chosen for the job and an optional legacy-format
/// bridge. All progress and diagnostics flow through the sink passed to
/// each call; the engine itself never prompts or blocks on input.
pub struct Engine<'a> {
    profile: ConversionProfile,
    bridge: Option<&'a dyn LegacyBridge>,
}

impl<'a> Engine<'a> {
    /// Create an engine for the given profile.
    pub fn new(profile: ConversionProfile) -> Self {
        Self {
            profile,
            bridge: None,
        }
    }

    /// Attach a legacy-format bridge for `.doc` inputs.
    pub fn with_bridge(mut self, bridge: &'a dyn LegacyBridge) -> Self {
        self.bridge = Some(bridge);
        self
    }

    /// Convert a file or a folder of files.
    pub fn convert_path(
        &self,
        input: &Path,
        output_dir: &Path,
        sink: &dyn EventSink,
    ) -> Result<BatchSummary> {
        if input.is_dir() {
            self.convert_folder(input, output_dir, sink)
        } else {
            self.convert_file(input, output_dir, sink)?;
            Ok(BatchSummary {
                succeeded: 1,
                total: 1,
            })
        }
    }

    /// Convert one file, dispatching on its extension.
    ///
    /// Returns the path of the output file.
    pub fn convert_file(
        &self,
        input: &Path,
        output_dir: &Path,
        sink: &dyn EventSink,
    ) -> Result<PathBuf> {
        if !input.exists() {
            sink.log(&format!("input does not exist: {}", input.display()));
            return Err(Error::InputNotFound(input.display().to_string()));
        }
        std::fs::create_dir_all(output_dir)?;

        let extension = input
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "docx" => {
                let output = self.output_path(input, output_dir);
                convert_docx_file(input, &output, self.profile, sink)?;
                Ok(output)
            }
            "doc" => {
                let Some(bridge) = self.bridge else {
                    sink.log(&format!(
                        "no legacy bridge available for {}",
                        input.display()
                    ));
                    return Err(Error::LegacyBridge(
                        "no bridge configured for .doc inputs".to_string(),
                    ));
                };
                sink.log(&format!(
                    "migrating legacy document: {}",
                    input.display()
                ));
                let scratch = tempfile::tempdir()?;
                let package = bridge.convert_to_package(input, scratch.path())?;
                let stem = input
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "document".to_string());
                let output = output_dir.join(format!("{OUTPUT_PREFIX}{stem}.docx"));
                convert_docx_file(&package, &output, self.profile, sink)?;
                Ok(output)
            }
            "txt" => text::convert_text_file(input, output_dir, self.profile, sink),
            other => {
                sink.log(&format!(
                    "unsupported extension {other:?}: {}",
                    input.display()
                ));
                Err(Error::UnsupportedExtension(input.display().to_string()))
            }
        }
    }

    /// Convert every supported file directly under `dir`.
    ///
    /// One file's failure never stops the rest; the summary reports how
    /// many items produced output out of how many were attempted, and the
    /// sink receives a progress notification after each item.
    pub fn convert_folder(
        &self,
        dir: &Path,
        output_dir: &Path,
        sink: &dyn EventSink,
    ) -> Result<BatchSummary> {
        let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && has_supported_extension(path))
            .collect();
        files.sort();

        let total = files.len();
        if total == 0 {
            sink.log("no supported files (.docx, .doc, .txt) found in folder");
            return Ok(BatchSummary {
                succeeded: 0,
                total: 0,
            });
        }
        sink.log(&format!("found {total} file(s) to process"));

        let mut succeeded = 0;
        for (index, file) in files.iter().enumerate() {
            sink.log(&format!(
                "processing file {}/{}: {}",
                index + 1,
                total,
                file.file_name().unwrap_or_default().to_string_lossy()
            ));
            match self.convert_file(file, output_dir, sink) {
                Ok(_) => succeeded += 1,
                Err(e) => sink.log(&format!("error processing {}: {e}", file.display())),
            }
            sink.progress(index + 1, total);
        }

        sink.log(&format!("done: converted {succeeded}/{total} file(s)"));
        Ok(BatchSummary { succeeded, total })
    }

    fn output_path(&self, input: &Path, output_dir: &Path) -> PathBuf {
        let name = input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "output".to_string());
        output_dir.join(format!("{OUTPUT_PREFIX}{name}"))
    }
}

fn has_supported_extension(path: &Path) -> bool {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .map(|e| SUPPORTED_EXTENSIONS.contains(&e.as_str()))
        .unwrap_or(false)
}
