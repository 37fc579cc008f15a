//! Types for writing FAST binary output files
//!

use binrw::BinWrite;
use bon::Builder;
use byteorder::{LittleEndian, WriteBytesExt};
use std::io::{Seek, Write};
use tracing::{debug, instrument};

use crate::error::{Error, Result};
use crate::types::{
    ChannelScaling, FileFormat, OutbHeader, Samples, DEFAULT_NAME_WIDTH, TIME_CHANNEL,
};

/// Options for how the binary output file should be written
#[derive(Debug, Clone, Builder)]
pub struct OutbWriterOptions {
    /// The sub-format to write, quantized without time by default
    #[builder(default)]
    pub format: FileFormat,

    /// Free text stored in the header
    #[builder(default, into)]
    pub description: String,
}

impl Default for OutbWriterOptions {
    fn default() -> Self {
        OutbWriterOptions::builder().build()
    }
}

/// FAST binary output generator
///
/// ```
/// # fn doit() -> fast_outb::error::Result<()>
/// # {
/// use fast_outb::{FileFormat, OutbWriter, Samples};
/// use fast_outb::write::OutbWriterOptions;
///
/// let samples = Samples::from_rows(&[[0.0, 8.0], [0.1, 8.5], [0.2, 9.0]])?;
///
/// // We use a buffer here, though you'd normally use a `File`
/// let writer = OutbWriter::new(std::io::Cursor::new(Vec::new()), OutbWriterOptions::builder()
///            .format(FileFormat::WithoutTime)
///            .description("turbulent inflow")
///            .build());
///
/// let buffer = writer.write(&samples, &["Time", "Wind1VelX"], &["s", "m/s"])?;
/// assert!(!buffer.get_ref().is_empty());
/// # Ok(())
/// # }
/// # doit().unwrap();
/// ```
pub struct OutbWriter<W: Write + Seek> {
    inner: W,
    options: OutbWriterOptions,
}

impl<W: Write + Seek> OutbWriter<W> {
    /// Initializes the writer.
    pub fn new(inner: W, options: OutbWriterOptions) -> OutbWriter<W> {
        OutbWriter { inner, options }
    }

    /// Write a full file, time being the first column of `samples`.
    ///
    /// Quantized formats are lossy: a value comes back within `range / 65535` of what was
    /// written, `range` being the spread of its channel.
    #[instrument(skip_all, err, fields(format = %self.options.format, shape = ?samples.shape()))]
    pub fn write<N: AsRef<str>, U: AsRef<str>>(
        mut self,
        samples: &Samples,
        names: &[N],
        units: &[U],
    ) -> Result<W> {
        let format = self.options.format;
        check_layout(samples, names, units)?;

        let names: Vec<&str> = names.iter().map(|n| n.as_ref().trim()).collect();
        let units: Vec<String> = units.iter().map(|u| wrap_unit(u.as_ref())).collect();

        let name_width = if format.has_name_width() {
            let longest = names
                .iter()
                .map(|n| n.len())
                .chain(units.iter().map(|u| u.len()))
                .max()
                .unwrap_or_default();
            i16::try_from(longest.max(DEFAULT_NAME_WIDTH as usize)).map_err(|_| {
                Error::InvalidLayout(format!("channel names of {longest} characters"))
            })?
        } else {
            DEFAULT_NAME_WIDTH
        };

        let rows = samples.rows();
        let channels = samples.cols() - 1;
        let time: Vec<f64> = samples.column(0).collect();

        let scaling: Vec<ChannelScaling> = if format.is_compressed() {
            (1..samples.cols())
                .map(|c| {
                    let (min, max) = samples.column_range(c).unwrap_or((0.0, 0.0));
                    ChannelScaling::for_range(min, max)
                })
                .collect()
        } else {
            Vec::new()
        };
        debug!(?scaling, "computed channel scaling");

        let time_scaling = TimeScaling::new(&time);
        let (time_first, time_second) = if format.has_packed_time() {
            (time_scaling.scale, time_scaling.offset)
        } else {
            let start = time.first().copied().unwrap_or_default();
            let increment = if rows > 1 { time[1] - time[0] } else { 0.0 };
            (start, increment)
        };

        let header = OutbHeader {
            format,
            name_width,
            channel_count: count_i32(channels, "channels")?,
            sample_count: count_i32(rows, "samples")?,
            time_first,
            time_second,
            scales: scaling.iter().map(|s| s.scale).collect(),
            offsets: scaling.iter().map(|s| s.offset).collect(),
            description: ascii_bytes(&self.options.description, "description")?,
            raw_names: padded_fields(names.iter().copied(), name_width as usize)?,
            raw_units: padded_fields(units.iter().map(String::as_str), name_width as usize)?,
        };

        self.inner.write_i16::<LittleEndian>(format as i16)?;
        header.write(&mut self.inner)?;

        if format.has_packed_time() {
            for t in &time {
                self.inner
                    .write_i32::<LittleEndian>(time_scaling.quantize(*t))?;
            }
        }

        for row in 0..rows {
            let Some(values) = samples.row(row) else {
                break;
            };
            for (c, value) in values[1..].iter().enumerate() {
                if format.is_compressed() {
                    self.inner
                        .write_i16::<LittleEndian>(scaling[c].quantize(*value))?;
                } else {
                    self.inner.write_f64::<LittleEndian>(*value)?;
                }
            }
        }

        self.inner.flush()?;
        Ok(self.inner)
    }
}

/// Time packed into the full `i32` range
struct TimeScaling {
    scale: f64,
    offset: f64,
}

impl TimeScaling {
    fn new(time: &[f64]) -> Self {
        let min = time.iter().copied().fold(f64::INFINITY, f64::min);
        let max = time.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mut range = max - min;
        if range == 0.0 || !range.is_finite() {
            range = 1.0;
        }
        let min = if min.is_finite() { min } else { 0.0 };
        let scale = (i32::MAX as f64 - i32::MIN as f64) / range;
        TimeScaling {
            scale,
            offset: i32::MIN as f64 - min * scale,
        }
    }

    fn quantize(&self, t: f64) -> i32 {
        (self.scale * t + self.offset)
            .round()
            .clamp(i32::MIN as f64, i32::MAX as f64) as i32
    }
}

fn check_layout<N: AsRef<str>, U: AsRef<str>>(
    samples: &Samples,
    names: &[N],
    units: &[U],
) -> Result<()> {
    match names.first() {
        Some(first) if first.as_ref().trim() == TIME_CHANNEL => {}
        Some(first) => {
            return Err(Error::InvalidLayout(format!(
                "the first channel must be `{TIME_CHANNEL}`, found `{}`",
                first.as_ref()
            )))
        }
        None => return Err(Error::InvalidLayout("no channel names given".into())),
    }
    if names.len() != samples.cols() {
        return Err(Error::InvalidLayout(format!(
            "{} channel names for {} columns",
            names.len(),
            samples.cols()
        )));
    }
    if units.len() != names.len() {
        return Err(Error::InvalidLayout(format!(
            "{} units for {} channel names",
            units.len(),
            names.len()
        )));
    }
    Ok(())
}

/// Units are stored between parenthesis to match the producer
fn wrap_unit(unit: &str) -> String {
    let unit = unit.trim();
    if unit.starts_with('(') {
        unit.to_string()
    } else {
        format!("({unit})")
    }
}

fn ascii_bytes(text: &str, what: &str) -> Result<Vec<u8>> {
    if !text.is_ascii() {
        return Err(Error::InvalidLayout(format!(
            "{what} `{text}` is not ASCII"
        )));
    }
    Ok(text.as_bytes().to_vec())
}

fn padded_fields<'a>(fields: impl Iterator<Item = &'a str>, width: usize) -> Result<Vec<u8>> {
    let mut raw = Vec::new();
    for field in fields {
        let bytes = ascii_bytes(field, "channel field")?;
        if bytes.len() > width {
            return Err(Error::InvalidLayout(format!(
                "`{field}` does not fit in {width} characters"
            )));
        }
        raw.extend_from_slice(&bytes);
        raw.resize(raw.len() + width - bytes.len(), b' ');
    }
    Ok(raw)
}

fn count_i32(count: usize, what: &str) -> Result<i32> {
    i32::try_from(count).map_err(|_| Error::InvalidLayout(format!("too many {what}: {count}")))
}
