//! Error types for workbook extraction

use thiserror::Error;

/// Failure to extract one input document.
///
/// Every variant carries the identifier of the document it belongs to, so a
/// batch can report failures next to the records of the documents that succeeded.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("{document}: failed to read input: {source}")]
    Io {
        document: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{document}: malformed workbook XML: {message}")]
    Xml { document: String, message: String },
    #[error("{document}: invalid packaged workbook: {source}")]
    Archive {
        document: String,
        #[source]
        source: zip::result::ZipError,
    },
    #[error("{document}: packaged workbook contains no .twb entry")]
    MissingWorkbook { document: String },
}

impl ExtractError {
    /// Identifier of the document that failed
    pub fn document(&self) -> &str {
        match self {
            ExtractError::Io { document, .. }
            | ExtractError::Xml { document, .. }
            | ExtractError::Archive { document, .. }
            | ExtractError::MissingWorkbook { document } => document,
        }
    }
}
