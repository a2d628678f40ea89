//! Word (.docx) document conversion support.
//!
//! The module is organized around these types:
//! - `Package`: the .docx file as ordered ZIP entries
//! - `Paragraph` / `Run`: text units with style snapshot and restore
//! - `Table`: row-major cell traversal with unbounded nesting
//! - `document`: the run-preserving converter over body, headers, footers
//!
//! Structural elements own their raw XML bytes, and conversion splices
//! changed ranges back into those bytes, so everything a conversion does
//! not explicitly touch stays byte-identical.

pub mod block;
pub mod document;
pub mod package;
pub mod paragraph;
pub mod table;

pub use document::convert_package;
pub use package::Package;
pub use paragraph::{Paragraph, Run, RunProperties};
pub use table::Table;
