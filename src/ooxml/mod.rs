//! OOXML (zip-of-XML) document package support.
//!
//! A word-processing document is an OPC package: a ZIP archive of XML parts
//! such as `word/document.xml` and `word/footnotes.xml`, plus unrelated
//! parts (media, styles) that must pass through conversion byte-identical.
//!
//! This module provides:
//! - [`archive`]: lossless package extraction to a scratch directory and
//!   repacking, with scoped cleanup;
//! - [`rewrite`]: the XML text-node rewriter with its regex fallback;
//! - [`notes`]: the footnote/endnote converter built on the two above;
//! - [`docx`]: the run-preserving converter for the document body,
//!   headers, and footers.

pub mod archive;
pub mod docx;
pub mod notes;
pub mod rewrite;

/// Main document part name.
pub const DOCUMENT_PART: &str = "word/document.xml";
/// Footnotes part name.
pub const FOOTNOTES_PART: &str = "word/footnotes.xml";
/// Endnotes part name.
pub const ENDNOTES_PART: &str = "word/endnotes.xml";
