//! Error types for the manucheck library.

use std::io;
use thiserror::Error;

/// Result type alias for manucheck operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while processing a document package.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The document package cannot be opened.
    ///
    /// Fatal to the whole call: analysis returns the sentinel missing-section
    /// list instead of partial findings.
    #[error("Package parsing error: {0}")]
    PackageParse(String),

    /// A required part is absent from the package. Fatal the same way a
    /// parse failure is.
    #[error("Missing package part: {0}")]
    MissingPart(String),

    /// Error parsing an XML part.
    #[error("XML parsing error: {0}")]
    XmlParse(String),

    /// Error rewriting the document tree.
    #[error("Mutation error: {0}")]
    Mutation(String),
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::PackageParse(err.to_string())
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::XmlParse(err.to_string())
    }
}
