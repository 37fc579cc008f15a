//! Types for reading FAST binary output files
//!

use binrw::BinRead;
use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{Read, Seek, SeekFrom};
use tracing::{debug, instrument, trace};

use crate::{
    error::{Error, Result, TruncatedError},
    types::{ChannelScaling, FileFormat, OutbHeader, OutputFile, Samples, TimeEncoding},
};

/// Number of values decoded per chunk unless told otherwise
pub const DEFAULT_CHUNK_VALUES: usize = 4096 * 40;

/// FAST binary output reader
///
/// The header is parsed on construction, the sample body only when [`OutbReader::decode`]
/// is called. The body is decoded in chunks straight into the final matrix, so the extra
/// memory needed is bounded by the chunk size whatever the length of the file.
///
/// ```no_run
/// use std::io::prelude::*;
///
/// fn list_channels(reader: impl Read + Seek) -> fast_outb::error::Result<()> {
///     let outb = fast_outb::OutbReader::new(reader)?;
///
///     for (name, unit) in outb.channel_names().iter().zip(outb.channel_units()) {
///         println!("{name} [{unit}]");
///     }
///
///     let file = outb.decode()?;
///     println!("{} samples", file.sample_count());
///
///     Ok(())
/// }
/// ```
pub struct OutbReader<R> {
    reader: R,
    header: OutbHeader,
    chunk_values: usize,
    body_start: u64,
}

impl<R> OutbReader<R> {
    /// The parsed header
    pub fn header(&self) -> &OutbHeader {
        &self.header
    }

    /// The sub-format of the file
    pub fn format(&self) -> FileFormat {
        self.header.format
    }

    /// Channel names, the first being time
    pub fn channel_names(&self) -> Vec<String> {
        self.header.channel_names()
    }

    /// Channel units without parenthesis
    pub fn channel_units(&self) -> Vec<String> {
        self.header.channel_units()
    }

    /// Set how many values are decoded at once.
    pub fn with_chunk_size(mut self, values: usize) -> Self {
        self.chunk_values = values.max(1);
        self
    }

    /// Unwrap and return the inner reader object
    ///
    /// The position of the reader is undefined.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: Read + Seek> OutbReader<R> {
    /// Read the header of a FAST binary output file.
    #[instrument(skip_all, err)]
    pub fn new(mut reader: R) -> Result<OutbReader<R>> {
        let id = reader
            .read_i16::<LittleEndian>()
            .map_err(Error::from_header_io)?;
        let format = FileFormat::try_from(id)?;

        let header =
            OutbHeader::read_args(&mut reader, (format,)).map_err(Error::from_header_read)?;
        header.validate()?;

        debug!(
            %format,
            channels = header.channel_count,
            samples = header.sample_count,
            "read outb header"
        );

        Ok(OutbReader {
            reader,
            header,
            chunk_values: DEFAULT_CHUNK_VALUES,
            body_start: 0,
        })
    }

    /// Decode the sample body, consuming the reader.
    #[instrument(skip_all, err, fields(format = %self.header.format))]
    pub fn decode(mut self) -> Result<OutputFile> {
        self.check_available()?;

        let rows = self.header.row_count();
        let cols = self.header.column_count();
        let scaling = self.header.scaling();
        let time = self.header.time_encoding();

        let mut samples = Samples::zeros(rows, cols);

        if let TimeEncoding::Packed { .. } = time {
            self.read_packed_time(&mut samples)?;
        }
        self.read_channels(&mut samples, &scaling)?;
        fill_time(&mut samples, time);

        Ok(OutputFile {
            format: self.header.format,
            description: self.header.description_text(),
            channel_names: self.header.channel_names(),
            channel_units: self.header.channel_units(),
            time,
            scaling,
            samples,
        })
    }

    fn check_available(&mut self) -> Result<()> {
        let position = self.reader.stream_position()?;
        self.body_start = position;
        let end = self.reader.seek(SeekFrom::End(0))?;
        self.reader.seek(SeekFrom::Start(position))?;

        let expected = self.header.body_size();
        let available = end.saturating_sub(position);
        if available < expected {
            return Err(TruncatedError::Body {
                expected,
                available,
            }
            .into());
        }
        Ok(())
    }

    /// Packed time values land in column 0 and are scaled once the body is read.
    fn read_packed_time(&mut self, samples: &mut Samples) -> Result<()> {
        let cols = samples.cols();
        let rows = samples.rows();
        let mut buffer = vec![0i32; self.chunk_values.min(rows)];
        let data = samples.as_mut_slice();

        let mut row = 0;
        while row < rows {
            let count = buffer.len().min(rows - row);
            self.reader
                .read_i32_into::<LittleEndian>(&mut buffer[..count])
                .map_err(|e| self.body_error(e))?;
            for (i, packed) in buffer[..count].iter().enumerate() {
                data[(row + i) * cols] = *packed as f64;
            }
            row += count;
        }
        Ok(())
    }

    fn read_channels(&mut self, samples: &mut Samples, scaling: &[ChannelScaling]) -> Result<()> {
        let channels = scaling.len();
        let rows = samples.rows();
        if channels == 0 || rows == 0 {
            return Ok(());
        }

        // Whole rows per chunk keeps the channel index a simple modulo
        let rows_per_chunk = (self.chunk_values / channels).max(1);
        let compressed = self.header.format.is_compressed();

        let mut packed = Vec::new();
        let mut raw = Vec::new();
        if compressed {
            packed.resize(rows_per_chunk.min(rows) * channels, 0i16);
        } else {
            raw.resize(rows_per_chunk.min(rows) * channels, 0f64);
        }

        let cols = channels + 1;
        let mut row = 0;
        while row < rows {
            let chunk_rows = rows_per_chunk.min(rows - row);
            let count = chunk_rows * channels;
            trace!(row, chunk_rows, "decoding chunk");

            if compressed {
                self.reader
                    .read_i16_into::<LittleEndian>(&mut packed[..count])
                    .map_err(|e| self.body_error(e))?;
            } else {
                self.reader
                    .read_f64_into::<LittleEndian>(&mut raw[..count])
                    .map_err(|e| self.body_error(e))?;
            }

            let data = samples.as_mut_slice();
            for r in 0..chunk_rows {
                let target = &mut data[(row + r) * cols + 1..(row + r + 1) * cols];
                for (c, value) in target.iter_mut().enumerate() {
                    let i = r * channels + c;
                    *value = if compressed {
                        scaling[c].dequantize(packed[i] as f64)
                    } else {
                        raw[i]
                    };
                }
            }
            row += chunk_rows;
        }
        Ok(())
    }

    fn body_error(&mut self, err: std::io::Error) -> Error {
        if err.kind() != std::io::ErrorKind::UnexpectedEof {
            return err.into();
        }
        // the stream shrank after the size check, report what is left of the body now
        let available = self
            .reader
            .seek(SeekFrom::End(0))
            .map(|end| end.saturating_sub(self.body_start))
            .unwrap_or_default();
        TruncatedError::Body {
            expected: self.header.body_size(),
            available,
        }
        .into()
    }
}

fn fill_time(samples: &mut Samples, time: TimeEncoding) {
    let cols = samples.cols();
    let data = samples.as_mut_slice();
    for (i, row) in data.chunks_mut(cols.max(1)).enumerate() {
        row[0] = match time {
            TimeEncoding::Packed { scale, offset } => (row[0] - offset) / scale,
            TimeEncoding::Uniform { start, increment } => start + i as f64 * increment,
        };
    }
}
