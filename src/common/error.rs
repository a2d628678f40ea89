//! Unified error types for the Longan library.
//!
//! This module provides a single error type that encompasses errors from
//! encoding detection, package handling, and XML rewriting, presenting a
//! consistent API to users.
use thiserror::Error;

/// Main error type for Longan operations.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Input path does not exist
    #[error("Input not found: {0}")]
    InputNotFound(String),

    /// File extension is not one of the supported kinds
    #[error("Unsupported extension: {0}")]
    UnsupportedExtension(String),

    /// XML parsing error
    #[error("XML error: {0}")]
    Xml(String),

    /// ZIP archive error
    #[error("ZIP error: {0}")]
    Zip(String),

    /// Part not found inside a document package
    #[error("Part not found: {0}")]
    PartNotFound(String),

    /// Invalid or corrupted document package
    #[error("Invalid package: {0}")]
    InvalidPackage(String),

    /// Every decode fallback produced an empty result
    #[error("Decoding produced no text: {0}")]
    DecodeFailed(String),

    /// Legacy-format bridge failure (or no bridge configured)
    #[error("Legacy bridge error: {0}")]
    LegacyBridge(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::Xml(err.to_string())
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::Zip(err.to_string())
    }
}

/// Result type for Longan operations.
pub type Result<T> = std::result::Result<T, Error>;
