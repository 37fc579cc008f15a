//! Error types that can be emitted from this library

use miette::Diagnostic;
use thiserror::Error;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent wrapper for [`std::io::Error`]
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// Transparent wrapper for [`binrw::Error`]
    #[error(transparent)]
    BinRWError(#[from] binrw::Error),

    /// the leading discriminant is not one of the known sub-formats
    #[error("unsupported file format identifier {0}, is it a FAST binary file?")]
    #[diagnostic(help("known identifiers are 1, 2, 3 and 4"))]
    UnsupportedFormat(i16),

    /// the stream holds fewer bytes than the header declares
    #[error("stream ended before the declared data was read")]
    TruncatedStream(#[from] TruncatedError),

    /// the header holds values no writer would produce
    #[error("invalid header: {0}")]
    InvalidHeader(String),

    /// the data handed to the writer cannot be laid out in the file
    #[error("invalid layout: {0}")]
    InvalidLayout(String),
}

/// Error type to provide further information when a stream is truncated
#[derive(Error, Diagnostic, Debug)]
#[error("stream ended before the declared data was read")]
pub enum TruncatedError {
    /// within the header
    #[error("within the header")]
    Header,

    /// within the sample body
    #[error("within the body: {expected} bytes declared, {available} available")]
    Body {
        /// Bytes required by the header's channel and sample counts
        expected: u64,
        /// Bytes left in the stream
        available: u64,
    },
}

impl Error {
    /// Map reader failures so short reads surface as [`Error::TruncatedStream`].
    pub(crate) fn from_header_read(err: binrw::Error) -> Self {
        if err.is_eof() {
            Error::TruncatedStream(TruncatedError::Header)
        } else {
            Error::BinRWError(err)
        }
    }

    pub(crate) fn from_header_io(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::UnexpectedEof {
            Error::TruncatedStream(TruncatedError::Header)
        } else {
            Error::IOError(err)
        }
    }
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
