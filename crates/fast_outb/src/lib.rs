//! This library handles reading from and creating the binary output (**.outb**) files written by
//! the *FAST* family of wind turbine simulation tools.
//!
//! # Binary Output Format Documentation
//!
//! An output file holds a set of named channels sampled over time. Time is always the first
//! channel. Channel values are usually quantized to 16 bit integers with a scale and offset per
//! channel, time is either derived from a start and increment or stored as packed 32 bit
//! integers.
//!
//! ## File Structure
//!
//! | Field                  | Type                  | Description                                       |
//! |------------------------|-----------------------|---------------------------------------------------|
//! | Format identifier      | `i16`                 | 1, 2, 3 or 4, see below                           |
//! | Name width             | `i16`                 | Only for format 4, 10 otherwise                   |
//! | Channel count          | `i32`                 | Number of channels without time (`n`)             |
//! | Sample count           | `i32`                 | Number of time steps (`m`)                        |
//! | Time scale / start     | `f64`                 | Scale for format 1, first time stamp otherwise    |
//! | Time offset / step     | `f64`                 | Offset for format 1, time increment otherwise     |
//! | Channel scales         | `n` x `f32`           | Absent for format 3                               |
//! | Channel offsets        | `n` x `f32`           | Absent for format 3                               |
//! | Description length     | `i32`                 |                                                   |
//! | Description            | bytes                 | ASCII                                             |
//! | Channel names          | `n + 1` x width bytes | Space padded, `Time` first                        |
//! | Channel units          | `n + 1` x width bytes | Space padded, wrapped in parenthesis              |
//! | Packed time            | `m` x `i32`           | Only for format 1                                 |
//! | Channel data           | `m * n` values        | Row major, `i16` or `f64` for format 3            |
//!
//! ### Formats
//!
//! - `1`: quantized channels, packed time
//! - `2`: quantized channels, uniform time
//! - `3`: raw `f64` channels, uniform time
//! - `4`: like `2`, with an explicit channel name width
//!
//! ### Quantization
//!
//! A stored value `p` maps back to `(p - offset) / scale`. Writers spread each channel over the
//! full `i16` range: `scale = 65535 / (max - min)` and `offset = -32768 - min * scale`, a
//! constant channel using a range of 1. A non finite scale or offset decodes to zero.
//!
//! ## Additional Information
//!
//! - **File Extension**: `.outb`
//! - **Endianness**: Little-endian for all multi-byte values
//!

use std::io::{Cursor, Read, Seek};

pub mod error;
pub mod read;
pub mod types;
pub mod write;

pub use read::OutbReader;
pub use types::{ChannelScaling, FileFormat, OutputFile, Samples, TimeEncoding};
pub use write::{OutbWriter, OutbWriterOptions};

/// Decode a whole binary output file.
pub fn decode<R: Read + Seek>(reader: R) -> error::Result<OutputFile> {
    OutbReader::new(reader)?.decode()
}

/// Encode samples into the default quantized format, time being the first column.
pub fn encode<N: AsRef<str>, U: AsRef<str>>(
    samples: &Samples,
    names: &[N],
    units: &[U],
    description: &str,
) -> error::Result<Vec<u8>> {
    let writer = OutbWriter::new(
        Cursor::new(Vec::new()),
        OutbWriterOptions::builder().description(description).build(),
    );
    Ok(writer.write(samples, names, units)?.into_inner())
}
