//! Error types that can be emitted from this library

use miette::Diagnostic;
use thiserror::Error;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent wrapper for [`fast_outb::error::Error`]
    #[error(transparent)]
    #[diagnostic(transparent)]
    OutbError(#[from] fast_outb::error::Error),

    /// Transparent wrapper for [`fast_input::error::Error`]
    #[error(transparent)]
    #[diagnostic(transparent)]
    InputError(#[from] fast_input::error::Error),

    /// binary output files need time as their first column
    #[error("the first column must be `Time`, found `{0}`")]
    MissingTime(String),

    /// columns of one table hold different numbers of values
    #[error("column `{column}` holds {found} values, expected {expected}")]
    RaggedColumns {
        column: String,
        expected: usize,
        found: usize,
    },

    /// a text column where numbers are required
    #[error("column `{0}` does not hold numbers")]
    NotNumeric(String),

    /// Transparent wrapper for [`polars::error::PolarsError`]
    #[cfg(feature = "polars")]
    #[error(transparent)]
    PolarsError(#[from] polars::error::PolarsError),
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
