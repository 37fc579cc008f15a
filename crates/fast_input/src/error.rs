//! Error types that can be emitted from this library

use miette::Diagnostic;
use thiserror::Error;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent wrapper for [`std::io::Error`]
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// the text does not look like a FAST input file, callers may try another reader
    #[error("not a FAST input file: {0}")]
    #[diagnostic(help("too many comment lines or malformed labels were found"))]
    NotThisFormat(String),

    /// the scalar giving the size of a table is missing or unusable
    #[error("line {line}: cannot size table from `{variable}`, {reason}")]
    DimensionUnresolved {
        line: usize,
        variable: String,
        reason: String,
    },

    /// the file ended before all the rows a table declares
    #[error("line {line}: table `{label}` declares {expected} rows but only {found} are available")]
    RowCountMismatch {
        line: usize,
        label: String,
        expected: usize,
        found: usize,
    },

    /// a table was edited apart from the scalar giving its size
    #[error("table `{label}` holds {found} rows but `{variable}` declares {expected}")]
    #[diagnostic(help("set `{variable}` to the new row count before writing"))]
    DimensionMismatch {
        label: String,
        variable: String,
        expected: usize,
        found: usize,
    },

    /// a row of a table could not be parsed
    #[error("line {line}: {message}")]
    BrokenTable { line: usize, message: String },

    /// no entry carries the label
    #[error("variable `{0}` not found")]
    LabelNotFound(String),

    /// the entry exists but holds another kind of value
    #[error("variable `{label}` is not {expected}")]
    TypeMismatch {
        label: String,
        expected: &'static str,
    },
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
