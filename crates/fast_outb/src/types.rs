//! Base types for structure of FAST binary output files.

use binrw::binrw;
use derive_more::derive::{Constructor, Display};

use crate::error::{Error, Result};

/// Width of the channel name and unit fields for every format but [`FileFormat::ChanLenIn`]
pub const DEFAULT_NAME_WIDTH: i16 = 10;

/// Name of the synthetic channel that always comes first
pub const TIME_CHANNEL: &str = "Time";

/// Identifies the layout of the file following the leading discriminant
///
/// All formats but [`FileFormat::NoCompressWithoutTime`] store the channel data as `i16`
/// quantized with a per channel scale and offset.
#[binrw]
#[brw(repr = i16)]
#[derive(Debug, Display, Copy, Clone, Default, PartialEq, Eq)]
pub enum FileFormat {
    /// Time is stored as a packed `i32` column with its own scale and offset
    #[display("with time")]
    WithTime = 1,

    /// Time is implied by a start time and a constant increment
    #[default]
    #[display("without time")]
    WithoutTime = 2,

    /// Like [`FileFormat::WithoutTime`] but channels are stored as raw `f64`
    #[display("uncompressed without time")]
    NoCompressWithoutTime = 3,

    /// Like [`FileFormat::WithoutTime`] with an explicit name field width
    #[display("with channel name length")]
    ChanLenIn = 4,
}

impl FileFormat {
    /// Whether channels are quantized to `i16`
    pub fn is_compressed(&self) -> bool {
        *self != FileFormat::NoCompressWithoutTime
    }

    /// Whether a packed time column precedes the channel data
    pub fn has_packed_time(&self) -> bool {
        *self == FileFormat::WithTime
    }

    /// Whether the name field width follows the discriminant
    pub fn has_name_width(&self) -> bool {
        *self == FileFormat::ChanLenIn
    }

    /// Size in bytes of one stored channel value
    pub fn value_size(&self) -> u64 {
        if self.is_compressed() {
            2
        } else {
            8
        }
    }
}

impl TryFrom<i16> for FileFormat {
    type Error = Error;

    fn try_from(value: i16) -> Result<Self> {
        match value {
            1 => Ok(FileFormat::WithTime),
            2 => Ok(FileFormat::WithoutTime),
            3 => Ok(FileFormat::NoCompressWithoutTime),
            4 => Ok(FileFormat::ChanLenIn),
            other => Err(Error::UnsupportedFormat(other)),
        }
    }
}

/// How the time column is recovered
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum TimeEncoding {
    /// `time = (packed - offset) / scale` over a packed `i32` column
    Packed { scale: f64, offset: f64 },

    /// `time = start + i * increment` for sample `i`
    Uniform { start: f64, increment: f64 },
}

impl TimeEncoding {
    pub(crate) fn fields(&self) -> (f64, f64) {
        match *self {
            TimeEncoding::Packed { scale, offset } => (scale, offset),
            TimeEncoding::Uniform { start, increment } => (start, increment),
        }
    }
}

/// Affine transform between a stored channel value and its real value
///
/// `real = (packed - offset) / scale`
#[derive(Debug, Constructor, Copy, Clone, PartialEq)]
pub struct ChannelScaling {
    pub scale: f32,
    pub offset: f32,
}

impl ChannelScaling {
    /// Scaling of a channel stored without compression
    pub const IDENTITY: ChannelScaling = ChannelScaling {
        scale: 1.0,
        offset: 0.0,
    };

    /// Compute the scaling using the full `i16` range for values between `min` and `max`.
    ///
    /// A constant channel gets a range of 1 so the scale stays finite.
    ///
    /// Both parameters are stored as `f32`. When the channel sits far from zero compared with
    /// its range, rounding the offset would push `min` or `max` past the ends of the `i16`
    /// range, so the scale gives up as many steps as the offset may move. Decoding then stays
    /// within `range / 65535` of the input as long as the range covers four `f32` steps at
    /// the channel's midpoint. Narrower channels may saturate at either end.
    pub fn for_range(min: f64, max: f64) -> Self {
        let mut range = max - min;
        if range == 0.0 || !range.is_finite() {
            range = 1.0;
        }
        let middle = min + range / 2.0;

        let mut span = I16_SPAN;
        let mut scaling = ChannelScaling::centered(middle, (span / range) as f32);
        for _ in 0..MAX_SCALE_ADJUSTMENTS {
            if scaling.holds(min) && scaling.holds(max) {
                break;
            }
            // one f32 step of the offset on either side, plus a count for the rounding
            let slack = 2.0 * f32::EPSILON as f64 * (scaling.offset as f64).abs() + 1.0;
            if slack > I16_SPAN / 2.0 {
                break;
            }
            span = I16_SPAN - slack;
            scaling = ChannelScaling::centered(middle, (span / range) as f32);
        }
        scaling
    }

    /// Put `middle` on the centre of the `i16` range.
    fn centered(middle: f64, scale: f32) -> Self {
        let offset = (I16_CENTER - middle * scale as f64) as f32;
        ChannelScaling { scale, offset }
    }

    /// Whether `value` is stored without saturating
    fn holds(&self, value: f64) -> bool {
        let packed = (self.scale as f64 * value + self.offset as f64).round();
        (i16::MIN as f64..=i16::MAX as f64).contains(&packed)
    }

    /// A producer dividing by zero leaves NaN behind, such channels read as zero.
    pub fn is_degenerate(&self) -> bool {
        !(self.scale.is_finite() && self.offset.is_finite()) || self.scale == 0.0
    }

    /// Convert a stored value back to its real value
    #[inline]
    pub fn dequantize(&self, packed: f64) -> f64 {
        if self.is_degenerate() {
            return 0.0;
        }
        (packed - self.offset as f64) / self.scale as f64
    }

    /// Convert a real value to its stored `i16`, saturating at the ends of the range
    #[inline]
    pub fn quantize(&self, value: f64) -> i16 {
        (self.scale as f64 * value + self.offset as f64)
            .round()
            .clamp(i16::MIN as f64, i16::MAX as f64) as i16
    }
}

const I16_SPAN: f64 = i16::MAX as f64 - i16::MIN as f64;
const I16_CENTER: f64 = (i16::MAX as f64 + i16::MIN as f64) / 2.0;
const MAX_SCALE_ADJUSTMENTS: usize = 4;

/// FAST binary output header
///
/// Everything between the leading discriminant and the sample body. The discriminant is read
/// first by [`crate::read::OutbReader`] and handed in as an argument, as it decides which
/// fields follow. All data is stored in little endian format.
#[binrw]
#[brw(little)]
#[br(import(format: FileFormat))]
#[derive(Debug, Clone, PartialEq)]
pub struct OutbHeader {
    /// The sub-format of the file
    #[br(calc = format)]
    #[bw(ignore)]
    pub format: FileFormat,

    /// Number of bytes in each channel name and unit field
    #[br(if(format.has_name_width(), DEFAULT_NAME_WIDTH))]
    #[bw(if(format.has_name_width()))]
    pub name_width: i16,

    /// The number of output channels, without time
    pub channel_count: i32,

    /// The number of time steps
    pub sample_count: i32,

    /// Time scale for [`FileFormat::WithTime`], first time stamp otherwise
    pub time_first: f64,

    /// Time offset for [`FileFormat::WithTime`], time increment otherwise
    pub time_second: f64,

    /// Channel scales, empty when the file is not compressed
    #[br(count = if format.is_compressed() { channel_count.max(0) as usize } else { 0 })]
    pub scales: Vec<f32>,

    /// Channel offsets, empty when the file is not compressed
    #[br(count = if format.is_compressed() { channel_count.max(0) as usize } else { 0 })]
    pub offsets: Vec<f32>,

    #[br(temp)]
    #[bw(calc = description.len() as i32)]
    description_len: i32,

    /// ASCII description of the run
    #[br(count = description_len.max(0) as usize)]
    pub description: Vec<u8>,

    /// Space padded channel names, time included
    #[br(count = (channel_count.max(0) as usize + 1) * name_width.max(0) as usize)]
    pub raw_names: Vec<u8>,

    /// Space padded, parenthesis wrapped channel units, time included
    #[br(count = (channel_count.max(0) as usize + 1) * name_width.max(0) as usize)]
    pub raw_units: Vec<u8>,
}

impl OutbHeader {
    /// Check the counts and widths a well formed file would hold.
    pub fn validate(&self) -> Result<()> {
        if self.channel_count < 0 {
            return Err(Error::InvalidHeader(format!(
                "negative channel count {}",
                self.channel_count
            )));
        }
        if self.sample_count < 0 {
            return Err(Error::InvalidHeader(format!(
                "negative sample count {}",
                self.sample_count
            )));
        }
        if self.name_width <= 0 {
            return Err(Error::InvalidHeader(format!(
                "name field width {} is not positive",
                self.name_width
            )));
        }
        Ok(())
    }

    /// Number of channels including time
    pub fn column_count(&self) -> usize {
        self.channel_count.max(0) as usize + 1
    }

    /// Number of rows in the file
    pub fn row_count(&self) -> usize {
        self.sample_count.max(0) as usize
    }

    /// How the time column is encoded
    pub fn time_encoding(&self) -> TimeEncoding {
        if self.format.has_packed_time() {
            TimeEncoding::Packed {
                scale: self.time_first,
                offset: self.time_second,
            }
        } else {
            TimeEncoding::Uniform {
                start: self.time_first,
                increment: self.time_second,
            }
        }
    }

    /// Scaling of each non time channel
    pub fn scaling(&self) -> Vec<ChannelScaling> {
        if !self.format.is_compressed() {
            return vec![ChannelScaling::IDENTITY; self.channel_count.max(0) as usize];
        }
        self.scales
            .iter()
            .zip(&self.offsets)
            .map(|(&scale, &offset)| ChannelScaling::new(scale, offset))
            .collect()
    }

    /// Description decoded as ASCII with surrounding white space removed
    pub fn description_text(&self) -> String {
        ascii_field(&self.description)
    }

    /// Channel names, the first being time
    pub fn channel_names(&self) -> Vec<String> {
        self.fields(&self.raw_names).map(ascii_field).collect()
    }

    /// Channel units stripped of their surrounding parenthesis
    pub fn channel_units(&self) -> Vec<String> {
        self.fields(&self.raw_units)
            .map(|f| strip_unit(&ascii_field(f)))
            .collect()
    }

    /// Bytes of body the header declares
    pub fn body_size(&self) -> u64 {
        let rows = self.row_count() as u64;
        let time = if self.format.has_packed_time() {
            rows * 4
        } else {
            0
        };
        time + rows * self.channel_count.max(0) as u64 * self.format.value_size()
    }

    fn fields<'a>(&self, raw: &'a [u8]) -> impl Iterator<Item = &'a [u8]> {
        raw.chunks(self.name_width.max(1) as usize)
    }
}

/// Bytes are taken one to one as characters, as the producer writes them.
fn ascii_field(raw: &[u8]) -> String {
    raw.iter()
        .map(|&b| b as char)
        .collect::<String>()
        .trim()
        .to_string()
}

/// Remove the brackets FAST puts around units, `(m/s)` becomes `m/s`.
pub fn strip_unit(unit: &str) -> String {
    unit.trim()
        .chars()
        .filter(|c| !matches!(c, '(' | ')' | '[' | ']'))
        .collect()
}

/// Row major matrix of samples
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Samples {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Samples {
    /// Zero filled matrix, allocated once
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Samples {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Build from row major values
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self> {
        if rows * cols != data.len() {
            return Err(Error::InvalidLayout(format!(
                "{} values cannot fill {rows} rows of {cols} columns",
                data.len()
            )));
        }
        Ok(Samples { rows, cols, data })
    }

    /// Build from a list of rows of equal length
    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R]) -> Result<Self> {
        let cols = rows.first().map_or(0, |r| r.as_ref().len());
        let mut data = Vec::with_capacity(rows.len() * cols);
        for (i, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != cols {
                return Err(Error::InvalidLayout(format!(
                    "row {i} has {} values, expected {cols}",
                    row.len()
                )));
            }
            data.extend_from_slice(row);
        }
        Ok(Samples {
            rows: rows.len(),
            cols,
            data,
        })
    }

    /// Build from a list of columns of equal length
    pub fn from_columns<C: AsRef<[f64]>>(columns: &[C]) -> Result<Self> {
        let rows = columns.first().map_or(0, |c| c.as_ref().len());
        let cols = columns.len();
        let mut samples = Samples::zeros(rows, cols);
        for (c, column) in columns.iter().enumerate() {
            let column = column.as_ref();
            if column.len() != rows {
                return Err(Error::InvalidLayout(format!(
                    "column {c} has {} values, expected {rows}",
                    column.len()
                )));
            }
            for (r, value) in column.iter().enumerate() {
                samples.data[r * cols + c] = *value;
            }
        }
        Ok(samples)
    }

    /// `(rows, columns)`
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row < self.rows && col < self.cols {
            Some(self.data[row * self.cols + col])
        } else {
            None
        }
    }

    pub fn row(&self, row: usize) -> Option<&[f64]> {
        if row < self.rows {
            Some(&self.data[row * self.cols..(row + 1) * self.cols])
        } else {
            None
        }
    }

    /// Iterate over the values of one column
    pub fn column(&self, col: usize) -> impl Iterator<Item = f64> + '_ {
        let cols = self.cols;
        self.data
            .iter()
            .skip(col)
            .step_by(cols.max(1))
            .take(if col < cols { self.rows } else { 0 })
            .copied()
    }

    /// Smallest and largest value of a column, ignoring NaN
    pub fn column_range(&self, col: usize) -> Option<(f64, f64)> {
        self.column(col)
            .filter(|v| !v.is_nan())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((min, max)) => Some((min.min(v), max.max(v))),
            })
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.data
    }
}

/// A decoded FAST binary output file
///
/// Time is always the first channel of [`OutputFile::samples`], so names, units and columns
/// line up.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputFile {
    /// Sub-format the file was stored with
    pub format: FileFormat,

    /// Free text description of the run
    pub description: String,

    /// Channel names, `Time` first
    pub channel_names: Vec<String>,

    /// Channel units without parenthesis, time unit first
    pub channel_units: Vec<String>,

    /// How time was stored
    pub time: TimeEncoding,

    /// Scaling of each non time channel as stored in the file
    pub scaling: Vec<ChannelScaling>,

    /// Decoded values, time in column 0
    pub samples: Samples,
}

impl OutputFile {
    /// Number of channels, not counting time
    pub fn channel_count(&self) -> usize {
        self.channel_names.len().saturating_sub(1)
    }

    /// Number of time steps
    pub fn sample_count(&self) -> usize {
        self.samples.rows()
    }

    /// Time column
    pub fn time(&self) -> Vec<f64> {
        self.samples.column(0).collect()
    }

    /// Index of a channel by name, compared without case
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.channel_names
            .iter()
            .position(|n| n.eq_ignore_ascii_case(name))
    }

    /// Values of a channel by name
    pub fn channel(&self, name: &str) -> Option<Vec<f64>> {
        self.index_of(name)
            .map(|i| self.samples.column(i).collect())
    }

    /// Values of column `i`, time being column 0
    pub fn column(&self, i: usize) -> Option<Vec<f64>> {
        (i < self.samples.cols()).then(|| self.samples.column(i).collect())
    }

    /// One time step, time first
    pub fn row(&self, i: usize) -> Option<&[f64]> {
        self.samples.row(i)
    }

    /// `(samples, columns)`, time included in the columns
    pub fn shape(&self) -> (usize, usize) {
        self.samples.shape()
    }
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use binrw::{BinRead, BinWrite};
    use pretty_assertions::assert_eq;

    use crate::error::Result;
    use crate::types::{ChannelScaling, FileFormat, OutbHeader, Samples, TimeEncoding};

    #[rustfmt::skip]
    fn header_bytes() -> Vec<u8> {
        vec![
            // channel count, sample count
            0x01, 0x00, 0x00, 0x00,
            0x02, 0x00, 0x00, 0x00,
            // time start 0.0, increment 0.5
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xE0, 0x3F,
            // scale 1.0, offset 0.0
            0x00, 0x00, 0x80, 0x3F,
            0x00, 0x00, 0x00, 0x00,
            // description
            0x02, 0x00, 0x00, 0x00,
            b'h', b'i',
            // names
            b'T', b'i', b'm', b'e', b' ', b' ', b' ', b' ', b' ', b' ',
            b'W', b'i', b'n', b'd', b' ', b' ', b' ', b' ', b' ', b' ',
            // units
            b'(', b's', b')', b' ', b' ', b' ', b' ', b' ', b' ', b' ',
            b'(', b'm', b'/', b's', b')', b' ', b' ', b' ', b' ', b' ',
        ]
    }

    #[test]
    fn read_header_without_time() -> Result<()> {
        let header = OutbHeader::read_args(
            &mut Cursor::new(header_bytes()),
            (FileFormat::WithoutTime,),
        )?;

        assert_eq!(header.format, FileFormat::WithoutTime);
        assert_eq!(header.name_width, 10);
        assert_eq!(header.channel_count, 1);
        assert_eq!(header.sample_count, 2);
        assert_eq!(
            header.time_encoding(),
            TimeEncoding::Uniform {
                start: 0.0,
                increment: 0.5
            }
        );
        assert_eq!(header.scaling(), vec![ChannelScaling::new(1.0, 0.0)]);
        assert_eq!(header.description_text(), "hi");
        assert_eq!(header.channel_names(), vec!["Time", "Wind"]);
        assert_eq!(header.channel_units(), vec!["s", "m/s"]);
        assert_eq!(header.body_size(), 4);

        Ok(())
    }

    #[test]
    fn write_header_without_time() -> Result<()> {
        let header = OutbHeader::read_args(
            &mut Cursor::new(header_bytes()),
            (FileFormat::WithoutTime,),
        )?;

        let mut actual = Vec::new();
        header.write(&mut Cursor::new(&mut actual))?;

        assert_eq!(actual, header_bytes());

        Ok(())
    }

    #[test]
    fn write_header_with_name_width() -> Result<()> {
        let header = OutbHeader {
            format: FileFormat::ChanLenIn,
            name_width: 12,
            channel_count: 0,
            sample_count: 0,
            time_first: 0.0,
            time_second: 0.0,
            scales: Vec::new(),
            offsets: Vec::new(),
            description: Vec::new(),
            raw_names: b"Time        ".to_vec(),
            raw_units: b"(s)         ".to_vec(),
        };

        let mut actual = Vec::new();
        header.write(&mut Cursor::new(&mut actual))?;

        // The discriminant is not part of the header, the width is
        assert_eq!(&actual[..2], &[0x0C, 0x00]);
        assert_eq!(actual.len(), 2 + 4 + 4 + 16 + 4 + 24);

        let back = OutbHeader::read_args(&mut Cursor::new(actual), (FileFormat::ChanLenIn,))?;
        assert_eq!(back, header);

        Ok(())
    }

    #[test]
    fn unknown_format_is_rejected() {
        assert!(FileFormat::try_from(5).is_err());
        assert!(FileFormat::try_from(0).is_err());
        assert_eq!(FileFormat::try_from(3).ok(), Some(FileFormat::NoCompressWithoutTime));
    }

    #[test]
    fn scaling_uses_full_range() {
        let scaling = ChannelScaling::for_range(0.0, 20.0);
        assert_eq!(scaling.quantize(0.0), i16::MIN);
        assert_eq!(scaling.quantize(20.0), i16::MAX);
        assert!((scaling.dequantize(scaling.quantize(10.0) as f64) - 10.0).abs() <= 20.0 / 65535.0);
    }

    #[test]
    fn narrow_channel_far_from_zero() {
        let (min, max) = (101325.0, 101326.0);
        let scaling = ChannelScaling::for_range(min, max);
        for value in [min, 101325.25, 101325.5, max] {
            let decoded = scaling.dequantize(scaling.quantize(value) as f64);
            assert!(
                (decoded - value).abs() <= (max - min) / 65535.0,
                "{decoded} too far from {value}"
            );
        }
    }

    #[test]
    fn constant_channel_keeps_its_value() {
        let scaling = ChannelScaling::for_range(5.0, 5.0);
        assert!(scaling.scale.is_finite());
        assert_eq!(scaling.dequantize(scaling.quantize(5.0) as f64), 5.0);
    }

    #[test]
    fn nan_scaling_reads_as_zero() {
        let scaling = ChannelScaling::new(f32::NAN, f32::NAN);
        assert_eq!(scaling.dequantize(1234.0), 0.0);
    }

    #[test]
    fn samples_columns() -> Result<()> {
        let samples = Samples::from_rows(&[[0.0, 1.0], [1.0, 2.0], [2.0, 3.0]])?;
        assert_eq!(samples.shape(), (3, 2));
        assert_eq!(samples.column(1).collect::<Vec<_>>(), vec![1.0, 2.0, 3.0]);
        assert_eq!(samples.column(2).count(), 0);
        assert_eq!(samples.column_range(1), Some((1.0, 3.0)));
        assert_eq!(samples.row(2), Some(&[2.0, 3.0][..]));

        let transposed = Samples::from_columns(&[vec![0.0, 1.0, 2.0], vec![1.0, 2.0, 3.0]])?;
        assert_eq!(transposed, samples);

        assert!(Samples::from_rows(&[vec![0.0], vec![1.0, 2.0]]).is_err());
        Ok(())
    }
}
