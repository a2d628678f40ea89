//! Longan - format-preserving Chinese character-form conversion for Word
//! documents and plain text.
//!
//! The engine converts the visible Chinese text of a document between
//! character-form conventions (traditional, simplified, and the
//! government-standard glyph set) while leaving everything else of the
//! document alone: run-level formatting, tables, headers and footers,
//! footnotes and endnotes, media, and any part it does not understand.
//!
//! # Features
//!
//! - **Conversion profiles**: named mapping strategies, pure and
//!   idempotent, chosen once per job
//! - **Encoding cascade**: statistical detection plus strict trial decodes
//!   for legacy Chinese text files, biased toward the GB18030 superset
//! - **Run-preserving DOCX conversion**: text changes, styles do not
//! - **Graceful degradation**: a defect in one paragraph, part, or file
//!   never takes down the rest of the job, and every fallback is logged
//!
//! # Example - converting a folder
//!
//! ```no_run
//! use longan::{ConversionProfile, Engine, NullSink};
//! use std::path::Path;
//!
//! # fn main() -> longan::Result<()> {
//! let engine = Engine::new(ConversionProfile::ToSimplified);
//! let summary = engine.convert_path(
//!     Path::new("documents/"),
//!     Path::new("converted/"),
//!     &NullSink,
//! )?;
//! println!("converted {}/{}", summary.succeeded, summary.total);
//! # Ok(())
//! # }
//! ```
//!
//! # Example - converting a single document
//!
//! ```no_run
//! use longan::{job, ConversionProfile, MemorySink};
//! use std::path::Path;
//!
//! # fn main() -> longan::Result<()> {
//! let sink = MemorySink::new();
//! let outcome = job::convert_docx_file(
//!     Path::new("report.docx"),
//!     Path::new("convert_report.docx"),
//!     ConversionProfile::ToGovernmentStandard,
//!     &sink,
//! )?;
//! if outcome.is_degraded() {
//!     eprintln!("degraded conversion:\n{}", sink.lines().join("\n"));
//! }
//! # Ok(())
//! # }
//! ```

/// Shared infrastructure: error type and the event-sink channel.
pub mod common;

/// Encoding detection and safe decoding for loose text files.
pub mod encoding;

/// Conversion jobs: orchestrator, batch mode, and the legacy bridge seam.
pub mod job;

/// OOXML package handling and the document converters.
pub mod ooxml;

/// Character-form conversion profiles.
pub mod profile;

/// Plain-text conversion pipeline.
pub mod text;

// Re-export commonly used types for convenience
pub use common::{Error, EventSink, MemorySink, NullSink, Result};
pub use job::{BatchSummary, DocxOutcome, Engine, LegacyBridge};
pub use profile::ConversionProfile;
