//! Error types for pdfrank.

use std::io;
use thiserror::Error;

/// Result type alias for pdfrank operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while extracting and ranking sections.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file format is not recognized as PDF.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The PDF version is not supported.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// Error parsing PDF structure.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// The PDF document is encrypted.
    #[error("Document is encrypted")]
    Encrypted,

    /// Error decoding a page's content stream.
    #[error("Text extraction error: {0}")]
    TextExtract(String),

    /// Page number is out of range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(u32, u32),

    /// A referenced document could not be opened.
    #[error("Cannot open document '{name}': {source}")]
    Document {
        /// Filename as given in the request
        name: String,
        /// Underlying failure
        #[source]
        source: Box<Error>,
    },

    /// The request record is malformed or missing required fields.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The embedding provider failed.
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Two vectors that must be compared have different lengths.
    #[error("Vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Dimension of the query vector
        expected: usize,
        /// Dimension of the offending vector
        actual: usize,
    },

    /// Error serializing the output record.
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Wrap an error with the name of the document it came from.
    pub fn in_document(self, name: impl Into<String>) -> Self {
        Error::Document {
            name: name.into(),
            source: Box::new(self),
        }
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::PdfParse(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialize(err.to_string())
    }
}
